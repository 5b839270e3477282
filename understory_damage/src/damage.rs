// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Damage`] accumulator and its configuration.

use core::fmt;
use core::mem;
use core::num::NonZeroU32;

use smallvec::{SmallVec, smallvec};
use understory_region::{IntRect, IntSize, Rects, Region};

use crate::cells::{CellSet, CellSetIter};

/// Cell size used when no rectangle budget is configured.
pub const DEFAULT_CELL_SIZE: IntSize = IntSize::new(256, 256);

/// How a [`Damage`] records what was added to it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DamageMode {
    /// Up to a budget of rectangles, grid-unified once the budget is hit.
    #[default]
    Rectangles,
    /// A single rectangle: the bounding box of everything added.
    BoundingBox,
    /// The whole surface is dirty. Adds are ignored.
    Full,
}

/// Construction parameters for a [`Damage`].
///
/// # Example
///
/// ```
/// use understory_damage::{DamageConfig, DamageMode};
///
/// let config = DamageConfig::default().with_max_rectangles(8);
/// assert_eq!(config.mode, DamageMode::Rectangles);
/// assert_eq!(config.max_rectangles.map(|n| n.get()), Some(8));
///
/// // Zero means "no explicit budget".
/// assert_eq!(DamageConfig::default().with_max_rectangles(0).max_rectangles, None);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageConfig {
    /// Initial mode.
    pub mode: DamageMode,
    /// Rectangle budget in [`DamageMode::Rectangles`].
    ///
    /// `None` derives the budget from a grid of [`DEFAULT_CELL_SIZE`] cells
    /// over the surface. Ignored by the other modes.
    pub max_rectangles: Option<NonZeroU32>,
}

impl DamageConfig {
    /// Returns this configuration with `mode` replaced.
    #[must_use]
    pub const fn with_mode(mut self, mode: DamageMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns this configuration with a rectangle budget; `0` removes it.
    #[must_use]
    pub const fn with_max_rectangles(mut self, max_rectangles: u32) -> Self {
        self.max_rectangles = NonZeroU32::new(max_rectangles);
        self
    }
}

/// Geometry of the unification grid laid over a damage surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DamageGrid {
    /// Number of cell columns (at least 1).
    pub columns: u32,
    /// Number of cell rows (at least 1).
    pub rows: u32,
    /// Size of every cell. Cells on the far edges may extend past the surface.
    pub cell_size: IntSize,
}

impl DamageGrid {
    /// Computes the grid for `surface`.
    ///
    /// With a budget `N` the grid has exactly `N` cells, split into rows and
    /// columns that follow the surface's aspect ratio as closely as a divisor
    /// of `N` allows. Without one, cells are [`DEFAULT_CELL_SIZE`].
    #[must_use]
    pub fn for_surface(surface: IntRect, max_rectangles: Option<NonZeroU32>) -> Self {
        let width = u64::try_from(surface.width()).unwrap_or(0);
        let height = u64::try_from(surface.height()).unwrap_or(0);

        let Some(budget) = max_rectangles else {
            let cell_width = u64::from(DEFAULT_CELL_SIZE.width.unsigned_abs());
            let cell_height = u64::from(DEFAULT_CELL_SIZE.height.unsigned_abs());
            return Self {
                columns: u32::try_from(width.div_ceil(cell_width).max(1)).unwrap_or(u32::MAX),
                rows: u32::try_from(height.div_ceil(cell_height).max(1)).unwrap_or(u32::MAX),
                cell_size: DEFAULT_CELL_SIZE,
            };
        };

        let budget = budget.get();
        let n = u64::from(budget);
        let (columns, rows) = if width >= height {
            let ideal = if width == 0 { 1 } else { (n * height / width).isqrt() };
            let rows = largest_divisor_at_most(budget, ideal);
            (budget / rows, rows)
        } else {
            let columns = largest_divisor_at_most(budget, (n * width / height).isqrt());
            (columns, budget / columns)
        };
        let cell_size = IntSize::new(
            i32::try_from(width.div_ceil(u64::from(columns))).unwrap_or(i32::MAX),
            i32::try_from(height.div_ceil(u64::from(rows))).unwrap_or(i32::MAX),
        );
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// Total number of cells, which is also the rectangle budget.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::try_from(u64::from(self.columns) * u64::from(self.rows)).unwrap_or(usize::MAX)
    }
}

/// Largest divisor of `n` that is at most `start` (and at least 1).
fn largest_divisor_at_most(n: u32, start: u64) -> u32 {
    let mut d = u32::try_from(start).unwrap_or(n).clamp(1, n);
    while d > 1 && n % d != 0 {
        d -= 1;
    }
    d
}

#[derive(Clone, Debug)]
enum Store {
    /// Rectangles as added, in insertion order.
    Exact(Rects),
    /// One accumulator per grid cell; only cells in `occupied` are meaningful.
    Unified { cells: Rects, occupied: CellSet },
}

impl Store {
    fn unified(cell_count: usize) -> Self {
        Self::Unified {
            cells: SmallVec::from_elem(IntRect::ZERO, cell_count),
            occupied: CellSet::with_capacity(cell_count),
        }
    }
}

/// A bounded, approximate record of the area of a surface that changed.
///
/// Rectangles added to a `Damage` are kept exactly until the configured budget
/// is reached. After that the surface is divided into a fixed grid with one
/// accumulator per cell, and every rectangle is unioned into the cell holding
/// its center. The stored rectangles always cover everything added; they may
/// cover more, and they may overlap.
///
/// # Example
///
/// ```
/// use understory_damage::{Damage, DamageConfig};
/// use understory_region::{IntRect, IntSize};
///
/// let mut damage = Damage::with_config(
///     IntSize::new(100, 100),
///     DamageConfig::default().with_max_rectangles(4),
/// );
/// for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)] {
///     assert!(damage.add(IntRect::from_xywh(x, y, 1, 1)));
/// }
/// assert_eq!(damage.size(), 4);
/// assert!(!damage.is_unified());
///
/// // The fifth rectangle exceeds the budget: everything is bucketed by cell.
/// damage.add(IntRect::from_xywh(50, 50, 1, 1));
/// assert!(damage.is_unified());
/// assert_eq!(damage.size(), 4);
/// assert_eq!(damage.bounds(), IntRect::new(0, 0, 100, 100));
/// ```
#[derive(Clone, Debug)]
pub struct Damage {
    mode: DamageMode,
    surface: IntRect,
    bounds: IntRect,
    grid: DamageGrid,
    store: Store,
}

impl Damage {
    /// Creates an empty damage over `surface` in [`DamageMode::Rectangles`].
    #[must_use]
    pub fn new(surface: impl Into<IntRect>) -> Self {
        Self::with_config(surface, DamageConfig::default())
    }

    /// Creates an empty damage over `surface` in `mode`.
    #[must_use]
    pub fn with_mode(surface: impl Into<IntRect>, mode: DamageMode) -> Self {
        Self::with_config(surface, DamageConfig::default().with_mode(mode))
    }

    /// Creates an empty damage over `surface`.
    ///
    /// An empty surface yields a damage that stays empty.
    #[must_use]
    pub fn with_config(surface: impl Into<IntRect>, config: DamageConfig) -> Self {
        let surface = surface.into();
        let grid = DamageGrid::for_surface(surface, config.max_rectangles);
        let mut damage = Self {
            mode: config.mode,
            surface,
            bounds: IntRect::ZERO,
            grid,
            store: Store::Exact(Rects::new()),
        };
        damage.store = damage.empty_store();
        damage
    }

    /// Creates an empty damage over a surface of a fractional size, rounded up.
    #[must_use]
    pub fn from_float_size(size: kurbo::Size, config: DamageConfig) -> Self {
        Self::with_config(IntSize::ceiled(size), config)
    }

    /// The current mode.
    #[must_use]
    pub fn mode(&self) -> DamageMode {
        self.mode
    }

    /// The surface rectangle this damage tracks.
    #[must_use]
    pub fn surface(&self) -> IntRect {
        self.surface
    }

    /// Bounding box of everything added; the surface once [`DamageMode::Full`].
    #[must_use]
    pub fn bounds(&self) -> IntRect {
        match self.mode {
            DamageMode::Full => self.surface,
            DamageMode::Rectangles | DamageMode::BoundingBox => self.bounds,
        }
    }

    /// Number of stored rectangles.
    #[must_use]
    pub fn size(&self) -> usize {
        if self.surface.is_empty() {
            return 0;
        }
        match self.mode {
            DamageMode::Rectangles => match &self.store {
                Store::Exact(rects) => rects.len(),
                Store::Unified { occupied, .. } => occupied.len(),
            },
            DamageMode::BoundingBox => usize::from(!self.bounds.is_empty()),
            DamageMode::Full => 1,
        }
    }

    /// Returns `true` if nothing is damaged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns `true` once grid unification is active.
    ///
    /// A single-cell grid is unified from the start.
    #[must_use]
    pub fn is_unified(&self) -> bool {
        self.mode == DamageMode::Rectangles && matches!(self.store, Store::Unified { .. })
    }

    /// The unification grid. Only meaningful in [`DamageMode::Rectangles`].
    #[must_use]
    pub fn grid(&self) -> DamageGrid {
        self.grid
    }

    /// Iterates the stored rectangles.
    ///
    /// Exact rectangles come out in insertion order and unified cells in grid
    /// order (row-major). [`DamageMode::BoundingBox`] yields the bounds and
    /// [`DamageMode::Full`] the surface.
    pub fn iter(&self) -> DamageIter<'_> {
        let inner = if self.surface.is_empty() {
            IterInner::Single(None)
        } else {
            match self.mode {
                DamageMode::Rectangles => match &self.store {
                    Store::Exact(rects) => IterInner::Exact(rects.iter()),
                    Store::Unified { cells, occupied } => IterInner::Cells {
                        cells,
                        occupied: occupied.iter(),
                    },
                },
                DamageMode::BoundingBox => {
                    IterInner::Single((!self.bounds.is_empty()).then_some(self.bounds))
                }
                DamageMode::Full => IterInner::Single(Some(self.surface)),
            }
        };
        DamageIter { inner }
    }

    /// The rectangle at `index` in [`iter`](Self::iter) order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<IntRect> {
        self.iter().nth(index)
    }

    /// Collects the stored rectangles. They may overlap.
    #[must_use]
    pub fn rects(&self) -> Rects {
        self.iter().collect()
    }

    /// The exact union of the stored rectangles.
    #[must_use]
    pub fn to_region(&self) -> Region {
        self.iter().collect()
    }

    /// Marks the whole surface dirty. Irreversible.
    pub fn make_full(&mut self) {
        if self.mode == DamageMode::Full {
            return;
        }
        log::debug!("damage over {} saturated to full", self.surface);
        self.mode = DamageMode::Full;
        self.bounds = IntRect::ZERO;
        self.store = Store::Exact(Rects::new());
    }

    /// Records `rect` as damaged. Returns whether the damage changed.
    ///
    /// Empty rectangles are ignored. A rectangle covering the whole surface
    /// makes the damage [`DamageMode::Full`].
    pub fn add(&mut self, rect: IntRect) -> bool {
        if rect.is_empty() || !self.accepts_adds() {
            return false;
        }
        if rect.contains(self.surface) {
            self.make_full();
            return true;
        }

        let count = self.size();
        if count == 0 || rect.contains(self.bounds) {
            if self.mode == DamageMode::Rectangles {
                self.reset_store(rect);
            }
            self.bounds = rect;
            return true;
        }
        if count == 1 && self.bounds.contains(rect) {
            return false;
        }

        self.bounds = self.bounds.union(rect);
        if self.mode == DamageMode::BoundingBox {
            return true;
        }

        if !self.is_unified() && count == self.grid.cell_count() {
            self.unite_existing_rects();
        }
        if let Store::Exact(rects) = &mut self.store {
            rects.push(rect);
        } else {
            self.unite_into_cell(rect);
        }
        true
    }

    /// Records the smallest integer rectangle enclosing `rect`.
    pub fn add_float_rect(&mut self, rect: kurbo::Rect) -> bool {
        if rect.width() <= 0.0 || rect.height() <= 0.0 || !self.accepts_adds() {
            return false;
        }
        self.add(IntRect::enclosing(rect))
    }

    /// Records every rectangle in `rects`. Returns whether the damage changed.
    ///
    /// A batch larger than the grid added to an empty damage goes straight into
    /// the grid without storing the rectangles exactly first.
    pub fn add_rects(&mut self, rects: &[IntRect]) -> bool {
        if rects.is_empty() || !self.accepts_adds() {
            return false;
        }

        let cell_count = self.grid.cell_count();
        if self.mode == DamageMode::Rectangles && self.is_empty() && rects.len() > cell_count {
            self.store = Store::unified(cell_count);
            for &rect in rects {
                if rect.is_empty() {
                    continue;
                }
                if rect.contains(self.surface) {
                    self.make_full();
                    return true;
                }
                self.bounds = self.bounds.union(rect);
                self.unite_into_cell(rect);
            }
            if self.bounds.is_empty() {
                self.store = self.empty_store();
                return false;
            }
            log::trace!("damage: {} rects unified directly into {cell_count} cells", rects.len());
            return true;
        }

        let mut changed = false;
        for &rect in rects {
            changed |= self.add(rect);
        }
        changed
    }

    /// Records everything `other` has recorded. Returns whether the damage changed.
    pub fn add_damage(&mut self, other: &Self) -> bool {
        if other.is_empty() || !self.accepts_adds() {
            return false;
        }
        if other.mode == DamageMode::Full && other.surface == self.surface {
            self.make_full();
            return true;
        }

        if self.mode == DamageMode::Rectangles
            && other.mode == DamageMode::Rectangles
            && self.surface == other.surface
            && self.grid == other.grid
        {
            if let (
                Store::Unified { cells, occupied },
                Store::Unified {
                    cells: other_cells,
                    occupied: other_occupied,
                },
            ) = (&mut self.store, &other.store)
            {
                for (cell, other_cell) in cells.iter_mut().zip(other_cells) {
                    *cell = cell.union(*other_cell);
                }
                *occupied |= other_occupied;
                self.bounds = self.bounds.union(other.bounds);
                log::trace!("damage: merged unified grids cell by cell");
                return true;
            }
        }

        match other.mode {
            DamageMode::Rectangles => self.add_rects(&other.rects()),
            DamageMode::BoundingBox => self.add(other.bounds),
            DamageMode::Full => self.add(other.surface),
        }
    }

    /// Snapshot of the current state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> DamageDebugInfo {
        DamageDebugInfo {
            mode: self.mode,
            surface: self.surface,
            bounds: self.bounds(),
            size: self.size(),
            unified: self.is_unified(),
            grid: self.grid,
        }
    }

    fn accepts_adds(&self) -> bool {
        !self.surface.is_empty() && self.mode != DamageMode::Full
    }

    fn empty_store(&self) -> Store {
        if self.mode == DamageMode::Rectangles && self.grid.cell_count() == 1 {
            Store::unified(1)
        } else {
            Store::Exact(Rects::new())
        }
    }

    /// Replaces everything stored with `rect`.
    fn reset_store(&mut self, rect: IntRect) {
        if self.grid.cell_count() == 1 {
            let mut occupied = CellSet::with_capacity(1);
            occupied.insert(0);
            self.store = Store::Unified {
                cells: smallvec![rect],
                occupied,
            };
            return;
        }
        if matches!(self.store, Store::Unified { .. }) {
            log::trace!("damage: {rect} covers the bounds, leaving unified mode");
        }
        self.store = Store::Exact(smallvec![rect]);
    }

    /// Switches to unified mode, bucketing the exact rectangles by cell.
    fn unite_existing_rects(&mut self) {
        let cell_count = self.grid.cell_count();
        let previous = mem::replace(&mut self.store, Store::unified(cell_count));
        log::trace!("damage: rectangle budget of {cell_count} reached, unifying");
        if let Store::Exact(rects) = previous {
            for rect in rects {
                self.unite_into_cell(rect);
            }
        }
    }

    /// Unions `rect` into its cell. Requires unified mode and widened bounds.
    fn unite_into_cell(&mut self, rect: IntRect) {
        let index = self.cell_index(rect);
        let bounds = self.bounds;
        let Store::Unified { cells, occupied } = &mut self.store else {
            return;
        };
        if cells.len() == 1 {
            cells[0] = bounds;
            occupied.insert(0);
            return;
        }
        if let Some(cell) = cells.get_mut(index) {
            *cell = cell.union(rect);
            occupied.insert(index);
        }
    }

    /// Row-major index of the cell containing the center of `rect`, clamped to the grid.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "clamped below the cell count, which indexes an allocated vector"
    )]
    fn cell_index(&self, rect: IntRect) -> usize {
        let center = rect.center();
        let DamageGrid {
            columns,
            rows,
            cell_size,
        } = self.grid;
        let column = (i64::from(center.x) - i64::from(self.surface.x0))
            .div_euclid(i64::from(cell_size.width.max(1)))
            .clamp(0, i64::from(columns) - 1);
        let row = (i64::from(center.y) - i64::from(self.surface.y0))
            .div_euclid(i64::from(cell_size.height.max(1)))
            .clamp(0, i64::from(rows) - 1);
        (column + row * i64::from(columns)) as usize
    }

    #[cfg(test)]
    fn stored_slots(&self) -> &[IntRect] {
        match &self.store {
            Store::Exact(rects) => rects,
            Store::Unified { cells, .. } => cells,
        }
    }
}

impl<'a> IntoIterator for &'a Damage {
    type Item = IntRect;
    type IntoIter = DamageIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Prints the stored rectangles as `[r0, r1, ...]`.
impl fmt::Display for Damage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, rect) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{rect}")?;
        }
        f.write_str("]")
    }
}

/// Iterator over the rectangles stored in a [`Damage`].
#[derive(Clone, Debug)]
pub struct DamageIter<'a> {
    inner: IterInner<'a>,
}

#[derive(Clone, Debug)]
enum IterInner<'a> {
    Exact(core::slice::Iter<'a, IntRect>),
    Cells {
        cells: &'a [IntRect],
        occupied: CellSetIter<'a>,
    },
    Single(Option<IntRect>),
}

impl Iterator for DamageIter<'_> {
    type Item = IntRect;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Exact(rects) => rects.next().copied(),
            IterInner::Cells { cells, occupied } => {
                let index = occupied.next()?;
                cells.get(index).copied()
            }
            IterInner::Single(rect) => rect.take(),
        }
    }
}

/// Debug snapshot of a [`Damage`] state.
#[derive(Clone, Copy, Debug)]
pub struct DamageDebugInfo {
    /// Current mode.
    pub mode: DamageMode,
    /// Tracked surface rectangle.
    pub surface: IntRect,
    /// Current bounds, as returned by [`Damage::bounds`].
    pub bounds: IntRect,
    /// Number of stored rectangles.
    pub size: usize,
    /// Whether grid unification is active.
    pub unified: bool,
    /// Unification grid geometry.
    pub grid: DamageGrid,
}
