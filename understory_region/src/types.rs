// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer geometry: points, offsets, sizes, and half-open rectangles.

use core::fmt;
use core::ops::{Add, Neg, Sub};

use smallvec::SmallVec;

/// A materialized list of rectangles.
///
/// Most regions and damage sets hold a single rectangle, so one is stored inline.
pub type Rects = SmallVec<[IntRect; 1]>;

/// Narrows a wide intermediate back to `i32`, clamping instead of wrapping.
#[inline]
#[expect(clippy::cast_possible_truncation, reason = "clamped to the i32 range")]
pub(crate) fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// An integer point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl IntPoint {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<IntVec2> for IntPoint {
    type Output = Self;

    fn add(self, rhs: IntVec2) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for IntPoint {
    type Output = IntVec2;

    fn sub(self, rhs: Self) -> IntVec2 {
        IntVec2::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl From<IntPoint> for kurbo::Point {
    fn from(p: IntPoint) -> Self {
        Self::new(f64::from(p.x), f64::from(p.y))
    }
}

/// An integer offset, used to translate points, rectangles, and regions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntVec2 {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl IntVec2 {
    /// The zero offset.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates an offset.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Neg for IntVec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

/// An integer size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntSize {
    /// Horizontal extent.
    pub width: i32,
    /// Vertical extent.
    pub height: i32,
}

impl IntSize {
    /// The empty size.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a size.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either extent is zero or negative.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Rounds a floating-point size up to whole pixels.
    ///
    /// Values outside the `i32` range saturate; NaN becomes zero.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "float to int casts saturate")]
    pub fn ceiled(size: kurbo::Size) -> Self {
        let size = size.ceil();
        Self::new(size.width as i32, size.height as i32)
    }
}

/// An axis-aligned integer rectangle covering `[x0, x1) × [y0, y1)`.
///
/// The layout mirrors [`kurbo::Rect`]: two corners rather than origin and size.
/// A rectangle whose width or height is zero or negative is empty and contains
/// no points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Minimum x coordinate (inclusive).
    pub x0: i32,
    /// Minimum y coordinate (inclusive).
    pub y0: i32,
    /// Maximum x coordinate (exclusive).
    pub x1: i32,
    /// Maximum y coordinate (exclusive).
    pub y1: i32,
}

impl IntRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its minimum and maximum corners.
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a rectangle from an origin and a size.
    #[must_use]
    pub fn from_origin_size(origin: IntPoint, size: IntSize) -> Self {
        Self::from_xywh(origin.x, origin.y, size.width, size.height)
    }

    /// Creates a rectangle from its origin, width, and height.
    ///
    /// The far edges saturate at `i32::MAX` rather than wrapping.
    #[must_use]
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Returns the smallest integer rectangle covering a floating-point one.
    ///
    /// Minimum edges are floored and maximum edges ceiled; coordinates outside
    /// the `i32` range saturate.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, reason = "float to int casts saturate")]
    pub fn enclosing(rect: kurbo::Rect) -> Self {
        let rect = rect.expand();
        Self::new(rect.x0 as i32, rect.y0 as i32, rect.x1 as i32, rect.y1 as i32)
    }

    /// Width, saturating at the `i32` range.
    #[must_use]
    pub fn width(self) -> i32 {
        saturate(i64::from(self.x1) - i64::from(self.x0))
    }

    /// Height, saturating at the `i32` range.
    #[must_use]
    pub fn height(self) -> i32 {
        saturate(i64::from(self.y1) - i64::from(self.y0))
    }

    /// The minimum corner.
    #[must_use]
    pub const fn origin(self) -> IntPoint {
        IntPoint::new(self.x0, self.y0)
    }

    /// The size of the rectangle.
    #[must_use]
    pub fn size(self) -> IntSize {
        IntSize::new(self.width(), self.height())
    }

    /// Returns `true` if the rectangle covers no points.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// The center point, rounded towards the minimum corner.
    #[must_use]
    pub fn center(self) -> IntPoint {
        let half_w = (i64::from(self.x1) - i64::from(self.x0)) / 2;
        let half_h = (i64::from(self.y1) - i64::from(self.y0)) / 2;
        IntPoint::new(
            saturate(i64::from(self.x0) + half_w),
            saturate(i64::from(self.y0) + half_h),
        )
    }

    /// Number of points covered.
    #[must_use]
    pub fn area(self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let w = (i64::from(self.x1) - i64::from(self.x0)).unsigned_abs();
        let h = (i64::from(self.y1) - i64::from(self.y0)).unsigned_abs();
        w * h
    }

    /// Returns `true` if `other`'s extents lie within this rectangle's extents.
    ///
    /// This is a pure edge comparison; callers that need "the empty set is a
    /// subset of everything" must check [`is_empty`](Self::is_empty) first.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.x0 <= other.x0 && other.x1 <= self.x1 && self.y0 <= other.y0 && other.y1 <= self.y1
    }

    /// Returns `true` if the point lies inside the half-open rectangle.
    #[must_use]
    pub const fn contains_point(self, p: IntPoint) -> bool {
        self.x0 <= p.x && p.x < self.x1 && self.y0 <= p.y && p.y < self.y1
    }

    /// Returns `true` if the two rectangles share at least one point.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }

    /// The smallest rectangle containing both. Empty operands are ignored.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// The overlap of two rectangles, or [`IntRect::ZERO`] if they are disjoint.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        let r = Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        );
        if r.is_empty() { Self::ZERO } else { r }
    }

    /// Moves the rectangle by `offset`, saturating at the `i32` range.
    #[must_use]
    pub fn translate(self, offset: IntVec2) -> Self {
        Self::new(
            self.x0.saturating_add(offset.x),
            self.y0.saturating_add(offset.y),
            self.x1.saturating_add(offset.x),
            self.y1.saturating_add(offset.y),
        )
    }
}

impl From<IntSize> for IntRect {
    fn from(size: IntSize) -> Self {
        Self::from_origin_size(IntPoint::ZERO, size)
    }
}

impl From<IntRect> for kurbo::Rect {
    fn from(r: IntRect) -> Self {
        Self::new(
            f64::from(r.x0),
            f64::from(r.y0),
            f64::from(r.x1),
            f64::from(r.y1),
        )
    }
}

impl fmt::Display for IntRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x0, self.y0, self.x1, self.y1)
    }
}
