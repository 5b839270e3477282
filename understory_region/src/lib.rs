// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Region: exact integer regions with scanline set algebra.
//!
//! A [`Region`] is an arbitrary set of integer points in the plane, represented
//! as a union of axis-aligned rectangles. It supports exact union, intersection
//! and subtraction, containment and intersection predicates, translation, and
//! materialization back into non-overlapping rectangles.
//!
//! - **Geometry** ([`IntPoint`], [`IntVec2`], [`IntSize`], [`IntRect`]): small
//!   `Copy` integer types. Rectangles are half-open: `x0 <= x < x1` and
//!   `y0 <= y < y1`. Conversions to and from Kurbo's float types are provided.
//! - **Regions** ([`Region`]): bounds plus an optional scanline shape. A region
//!   that is a single rectangle stores no shape and does not allocate.
//!
//! Internally, non-rectangular regions use a banded scanline encoding: a sorted
//! list of row-bands, each holding sorted `[x0, x1)` intervals, with adjacent
//! identical bands coalesced. Set operations are a single parity merge over
//! both operands' bands.
//!
//! ## Example
//!
//! ```rust
//! use understory_region::{IntRect, IntVec2, Region};
//!
//! let mut dirty = Region::from_rect(IntRect::new(0, 0, 100, 100));
//! dirty.unite_rect(IntRect::new(150, 0, 200, 50));
//!
//! // Content that was just repainted no longer needs painting.
//! dirty.subtract_rect(IntRect::new(0, 0, 100, 50));
//!
//! assert_eq!(dirty.bounds(), IntRect::new(0, 0, 200, 100));
//! assert_eq!(
//!     dirty.rects().as_slice(),
//!     &[IntRect::new(150, 0, 200, 50), IntRect::new(0, 50, 100, 100)]
//! );
//!
//! dirty.translate(IntVec2::new(10, 10));
//! assert_eq!(dirty.bounds(), IntRect::new(10, 10, 210, 110));
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` float support.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod region;
mod shape;
mod types;

pub use region::Region;
pub use types::{IntPoint, IntRect, IntSize, IntVec2, Rects};
