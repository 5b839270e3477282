// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Damage: bounded, approximate tracking of changed surface area.
//!
//! A [`Damage`] answers "which pixels of this surface changed since the last
//! frame?" with a hard cap on memory and per-add cost. It trades geometric
//! precision for that cap: the rectangles it reports always cover everything
//! that was added, but may cover more.
//!
//! ## Modes
//!
//! - [`DamageMode::Rectangles`] (default): rectangles are stored exactly until
//!   a budget is reached. The surface is then split into a fixed grid of that
//!   many cells, and each rectangle is unioned into the cell holding its
//!   center, so the count never exceeds the budget.
//! - [`DamageMode::BoundingBox`]: a single rectangle, the union of everything.
//! - [`DamageMode::Full`]: the whole surface. Entered explicitly with
//!   [`Damage::make_full`] or by adding a rectangle that covers the surface,
//!   and never left.
//!
//! The budget comes from [`DamageConfig::max_rectangles`]. Without one, the
//! grid uses [`DEFAULT_CELL_SIZE`] cells and the budget is the cell count.
//!
//! ## Example
//!
//! ```rust
//! use understory_damage::{Damage, DamageMode};
//! use understory_region::{IntRect, IntSize};
//!
//! let mut damage = Damage::new(IntSize::new(1024, 768));
//! damage.add(IntRect::from_xywh(10, 10, 20, 20));
//! damage.add(IntRect::from_xywh(500, 500, 20, 20));
//! assert_eq!(damage.size(), 2);
//! assert_eq!(damage.bounds(), IntRect::new(10, 10, 520, 520));
//!
//! // Exact coverage of what needs repainting.
//! let region = damage.to_region();
//! assert_eq!(region.total_area(), 2 * 20 * 20);
//!
//! // A resize invalidates everything.
//! damage.make_full();
//! assert_eq!(damage.mode(), DamageMode::Full);
//! assert!(!damage.add(IntRect::from_xywh(0, 0, 1, 1)));
//! assert_eq!(damage.bounds(), IntRect::new(0, 0, 1024, 768));
//! ```
//!
//! ## Logging
//!
//! Mode transitions are reported through the [`log`] facade: `debug` when a
//! damage saturates to full, `trace` for grid unification events. No logger
//! is installed by this crate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cells;
mod damage;

pub use damage::{
    DEFAULT_CELL_SIZE, Damage, DamageConfig, DamageDebugInfo, DamageGrid, DamageIter, DamageMode,
};
