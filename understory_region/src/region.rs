// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Region`] value type.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::fmt;
use core::ops::{BitAndAssign, BitOrAssign, SubAssign};

use crate::shape::Shape;
use crate::types::{IntPoint, IntRect, IntVec2, Rects};

/// An exact set of integer points, stored as a union of axis-aligned rectangles.
///
/// A region is its bounding rectangle plus, only when the set is not itself a
/// rectangle, an owned scanline shape. Rectangular regions (the common case)
/// never allocate. Cloning a region deep-copies its shape; two regions never
/// share mutable state.
///
/// # Example
///
/// ```
/// use understory_region::{IntPoint, IntRect, Region};
///
/// let mut region = Region::from_rect(IntRect::new(0, 0, 10, 10));
/// region.subtract(&Region::from_rect(IntRect::new(0, 0, 5, 10)));
/// assert_eq!(region.rects().as_slice(), &[IntRect::new(5, 0, 10, 10)]);
///
/// region.unite(&Region::from_rect(IntRect::new(20, 0, 30, 5)));
/// assert!(!region.is_rect());
/// assert!(region.contains_point(IntPoint::new(25, 2)));
/// assert!(!region.contains_point(IntPoint::new(15, 2)));
/// assert_eq!(region.total_area(), 50 + 50);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Region {
    bounds: IntRect,
    /// Present only for non-rectangular geometry; its bounds equal `bounds`.
    shape: Option<Box<Shape>>,
}

impl Region {
    /// Creates an empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a region covering exactly `rect`.
    ///
    /// An empty rectangle yields the empty region.
    #[must_use]
    pub fn from_rect(rect: IntRect) -> Self {
        Self {
            bounds: if rect.is_empty() { IntRect::ZERO } else { rect },
            shape: None,
        }
    }

    /// The smallest rectangle containing every point of the region.
    #[must_use]
    pub fn bounds(&self) -> IntRect {
        self.bounds
    }

    /// Returns `true` if the region contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Returns `true` if the region is exactly its bounding rectangle.
    ///
    /// The empty region counts as a rectangle.
    #[must_use]
    pub fn is_rect(&self) -> bool {
        self.shape.is_none()
    }

    /// Materializes the region as non-overlapping rectangles.
    ///
    /// Rectangles are ordered by row-band, top to bottom, then left to right.
    #[must_use]
    pub fn rects(&self) -> Rects {
        let mut rects = Rects::new();
        let Some(shape) = &self.shape else {
            if !self.bounds.is_empty() {
                rects.push(self.bounds);
            }
            return rects;
        };
        for (y, max_y, segments) in shape.bands() {
            for pair in segments.chunks_exact(2) {
                rects.push(IntRect::new(pair[0], y, pair[1], max_y));
            }
        }
        rects
    }

    /// Number of points in the region.
    #[must_use]
    pub fn total_area(&self) -> u64 {
        self.rects().iter().map(|r| r.area()).sum()
    }

    /// Returns `true` if every point of `other` is in this region.
    ///
    /// The empty region is contained in every region.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        if !self.bounds.contains(other.bounds) {
            return false;
        }
        let Some(shape) = &self.shape else {
            return true;
        };
        Shape::contains(shape, &other.shape_or_rect())
    }

    /// Returns `true` if `point` is in this region.
    #[must_use]
    pub fn contains_point(&self, point: IntPoint) -> bool {
        if !self.bounds.contains_point(point) {
            return false;
        }
        let Some(shape) = &self.shape else {
            return true;
        };

        for (y, max_y, segments) in shape.bands() {
            if y > point.y {
                break;
            }
            if max_y <= point.y {
                continue;
            }
            for pair in segments.chunks_exact(2) {
                if pair[0] > point.x {
                    break;
                }
                if pair[1] > point.x {
                    return true;
                }
            }
        }
        false
    }

    /// Returns `true` if the two regions share at least one point.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if !self.bounds.intersects(other.bounds) {
            return false;
        }
        if self.shape.is_none() && other.shape.is_none() {
            return true;
        }
        Shape::intersects(&self.shape_or_rect(), &other.shape_or_rect())
    }

    /// Adds every point of `other` to this region.
    pub fn unite(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.clone_from(other);
            return;
        }
        if other.is_rect() && other.bounds.contains(self.bounds) {
            self.bounds = other.bounds;
            self.shape = None;
            return;
        }
        if self.contains(other) {
            return;
        }

        log::trace!("region unite: general merge with {}", other.bounds);
        let shape = Shape::union(&self.shape_or_rect(), &other.shape_or_rect());
        self.set_shape(shape);
    }

    /// Keeps only the points that are also in `other`.
    pub fn intersect(&mut self, other: &Self) {
        if self.is_empty() {
            return;
        }
        if !self.bounds.intersects(other.bounds) {
            *self = Self::new();
            return;
        }
        if self.shape.is_none() && other.shape.is_none() {
            self.bounds = self.bounds.intersect(other.bounds);
            return;
        }
        if other.is_rect() && other.bounds.contains(self.bounds) {
            return;
        }
        if self.is_rect() && self.bounds.contains(other.bounds) {
            self.clone_from(other);
            return;
        }

        log::trace!("region intersect: general merge with {}", other.bounds);
        let shape = Shape::intersection(&self.shape_or_rect(), &other.shape_or_rect());
        self.set_shape(shape);
    }

    /// Removes every point of `other` from this region.
    pub fn subtract(&mut self, other: &Self) {
        if self.is_empty() || other.is_empty() {
            return;
        }
        if !self.bounds.intersects(other.bounds) {
            return;
        }

        log::trace!("region subtract: general merge with {}", other.bounds);
        let shape = Shape::subtraction(&self.shape_or_rect(), &other.shape_or_rect());
        self.set_shape(shape);
    }

    /// Adds a rectangle to the region.
    pub fn unite_rect(&mut self, rect: IntRect) {
        self.unite(&Self::from_rect(rect));
    }

    /// Keeps only the points inside `rect`.
    pub fn intersect_rect(&mut self, rect: IntRect) {
        self.intersect(&Self::from_rect(rect));
    }

    /// Removes a rectangle from the region.
    pub fn subtract_rect(&mut self, rect: IntRect) {
        self.subtract(&Self::from_rect(rect));
    }

    /// Moves every point of the region by `offset`.
    ///
    /// Coordinates clamp to the `i32` range; whatever is squeezed to zero
    /// width or height against the limit is dropped.
    pub fn translate(&mut self, offset: IntVec2) {
        if self.is_empty() {
            return;
        }
        let bounds = self.bounds;
        if self.shape.is_none() {
            *self = Self::from_rect(bounds.translate(offset));
            return;
        }
        let fits = bounds.x0.checked_add(offset.x).is_some()
            && bounds.x1.checked_add(offset.x).is_some()
            && bounds.y0.checked_add(offset.y).is_some()
            && bounds.y1.checked_add(offset.y).is_some();
        if fits {
            self.bounds = bounds.translate(offset);
            if let Some(shape) = &mut self.shape {
                shape.translate(offset);
            }
        } else if let Some(shape) = &self.shape {
            log::trace!("region translate: clamping {bounds} at the coordinate limit");
            let moved = shape.translated_saturating(offset);
            self.set_shape(moved);
        }
    }

    fn shape_or_rect(&self) -> Cow<'_, Shape> {
        match &self.shape {
            Some(shape) => Cow::Borrowed(&**shape),
            None => Cow::Owned(Shape::from_rect(self.bounds)),
        }
    }

    /// Adopts an algebra result, collapsing it when it is a plain rectangle.
    fn set_shape(&mut self, shape: Shape) {
        self.bounds = shape.bounds();
        if shape.is_rect() {
            self.shape = None;
            return;
        }
        match &mut self.shape {
            Some(existing) => **existing = shape,
            None => self.shape = Some(Box::new(shape)),
        }
    }
}

impl From<IntRect> for Region {
    fn from(rect: IntRect) -> Self {
        Self::from_rect(rect)
    }
}

impl FromIterator<IntRect> for Region {
    fn from_iter<I: IntoIterator<Item = IntRect>>(iter: I) -> Self {
        let mut region = Self::new();
        region.extend(iter);
        region
    }
}

impl Extend<IntRect> for Region {
    fn extend<I: IntoIterator<Item = IntRect>>(&mut self, iter: I) {
        for rect in iter {
            self.unite_rect(rect);
        }
    }
}

impl BitOrAssign<&Self> for Region {
    fn bitor_assign(&mut self, rhs: &Self) {
        self.unite(rhs);
    }
}

impl BitAndAssign<&Self> for Region {
    fn bitand_assign(&mut self, rhs: &Self) {
        self.intersect(rhs);
    }
}

impl SubAssign<&Self> for Region {
    fn sub_assign(&mut self, rhs: &Self) {
        self.subtract(rhs);
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("bounds", &self.bounds)
            .field("rects", &self.rects())
            .finish_non_exhaustive()
    }
}

/// One `(rect (x0,y0)-(x1,y1))` line per materialized rectangle.
impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rect in self.rects() {
            writeln!(f, "(rect {rect})")?;
        }
        Ok(())
    }
}
