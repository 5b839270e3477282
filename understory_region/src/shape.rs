// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline encoding of non-rectangular point sets.
//!
//! A [`Shape`] is a list of row-bands ("spans"), each starting at a `y` boundary
//! and owning a run of `x` boundaries ("segments") in one shared vector.
//! Consecutive segment pairs `[x0, x1)` are filled intervals; a band extends from
//! its own `y` to the next span's `y`. The last span always owns no segments and
//! only terminates the previous band.
//!
//! Union, intersection, and subtraction are one parity merge over both operands'
//! bands and boundaries, parameterized by a [`SetOperation`]. Containment and
//! intersection tests reuse the same walk but stop at the first decisive band
//! through a [`CompareOperation`].
//!
//! The algorithm follows "Scanline Coherent Shape Algebra" (Steinhart, Graphics
//! Gems II), with the linked lists replaced by two flat vectors.

use core::cmp::Ordering;
use core::fmt;

use smallvec::SmallVec;

use crate::types::{IntRect, IntVec2};

pub(crate) type Segments = SmallVec<[i32; 32]>;
type Spans = SmallVec<[Span; 16]>;

/// Start of one row-band.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) y: i32,
    /// Index of this band's first segment in [`Shape::segments`].
    pub(crate) segment_index: usize,
}

/// Scanline encoding of a point set. See the module docs for the layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Shape {
    segments: Segments,
    spans: Spans,
}

/// A violated [`Shape`] invariant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ShapeError {
    /// Segments are present but there are no spans to own them, or vice versa.
    Unpaired,
    /// A single span cannot delimit a band.
    LoneSpan,
    /// Segments must come in `[x0, x1)` pairs.
    OddSegmentCount,
    /// A span's segment index points past the end of the segments.
    SegmentIndexOutOfRange { span: usize },
    /// A span's segment index does not start a pair.
    OddSegmentIndex { span: usize },
    /// Span `y` values must strictly increase.
    NonIncreasingY { span: usize },
    /// Segment indices must not decrease from one span to the next.
    DecreasingSegmentIndex { span: usize },
    /// The boundaries inside one band are out of order.
    UnorderedSegments { span: usize },
    /// The last span must own no segments.
    Unterminated,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unpaired => f.write_str("spans and segments must be both empty or both present"),
            Self::LoneSpan => f.write_str("a shape needs at least two spans"),
            Self::OddSegmentCount => f.write_str("odd number of segment boundaries"),
            Self::SegmentIndexOutOfRange { span } => {
                write!(f, "span {span} points past the segment list")
            }
            Self::OddSegmentIndex { span } => write!(f, "span {span} has an odd segment index"),
            Self::NonIncreasingY { span } => write!(f, "span {span} does not increase in y"),
            Self::DecreasingSegmentIndex { span } => {
                write!(f, "span {span} has a smaller segment index than its predecessor")
            }
            Self::UnorderedSegments { span } => write!(f, "span {span} has unordered segments"),
            Self::Unterminated => f.write_str("last span owns segments"),
        }
    }
}

impl Shape {
    /// The empty shape.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A shape covering exactly `rect`.
    pub(crate) fn from_rect(rect: IntRect) -> Self {
        let mut shape = Self::new();
        if rect.is_empty() {
            return shape;
        }
        shape.segments.extend_from_slice(&[rect.x0, rect.x1]);
        shape.spans.push(Span {
            y: rect.y0,
            segment_index: 0,
        });
        shape.spans.push(Span {
            y: rect.y1,
            segment_index: 2,
        });
        shape
    }

    #[cfg(test)]
    pub(crate) fn from_parts(segments: &[i32], spans: &[(i32, usize)]) -> Self {
        let shape = Self {
            segments: segments.iter().copied().collect(),
            spans: spans
                .iter()
                .map(|&(y, segment_index)| Span { y, segment_index })
                .collect(),
        };
        debug_assert_eq!(shape.validate(), Ok(()), "malformed shape {shape:?}");
        shape
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// A shape with at most one band holding one interval is a plain rectangle.
    pub(crate) fn is_rect(&self) -> bool {
        self.spans.len() <= 2 && self.segments.len() <= 2
    }

    /// The boundaries of the band starting at span `i`.
    fn segments_at(&self, i: usize) -> &[i32] {
        let start = self.spans[i].segment_index;
        let end = self
            .spans
            .get(i + 1)
            .map_or(self.segments.len(), |next| next.segment_index);
        &self.segments[start..end]
    }

    /// Iterates `(y, max_y, boundaries)` for every band, top to bottom.
    pub(crate) fn bands(&self) -> impl Iterator<Item = (i32, i32, &[i32])> + '_ {
        self.spans
            .windows(2)
            .enumerate()
            .map(|(i, pair)| (pair[0].y, pair[1].y, self.segments_at(i)))
    }

    /// The smallest rectangle enclosing every band.
    pub(crate) fn bounds(&self) -> IntRect {
        let (Some(first), Some(last)) = (self.spans.first(), self.spans.last()) else {
            return IntRect::ZERO;
        };

        let mut min_x = i32::MAX;
        let mut max_x = i32::MIN;
        for (_, _, segments) in self.bands() {
            if let (Some(&lo), Some(&hi)) = (segments.first(), segments.last()) {
                min_x = min_x.min(lo);
                max_x = max_x.max(hi);
            }
        }
        if min_x > max_x {
            return IntRect::ZERO;
        }
        IntRect::new(min_x, first.y, max_x, last.y)
    }

    /// Moves the shape in place. Every coordinate must stay representable;
    /// use [`translated_saturating`](Self::translated_saturating) otherwise.
    pub(crate) fn translate(&mut self, offset: IntVec2) {
        for x in &mut self.segments {
            *x = x.saturating_add(offset.x);
        }
        for span in &mut self.spans {
            span.y = span.y.saturating_add(offset.y);
        }
    }

    /// A moved copy whose coordinates are clamped to the `i32` range.
    ///
    /// Bands and intervals squeezed to nothing against the limit are dropped.
    pub(crate) fn translated_saturating(&self, offset: IntVec2) -> Self {
        let mut result = Self::new();
        let mut end = None;
        for (y, max_y, segments) in self.bands() {
            let y = y.saturating_add(offset.y);
            let max_y = max_y.saturating_add(offset.y);
            if y >= max_y {
                continue;
            }
            let moved: Segments = segments
                .chunks_exact(2)
                .map(|pair| {
                    (
                        pair[0].saturating_add(offset.x),
                        pair[1].saturating_add(offset.x),
                    )
                })
                .filter(|(x0, x1)| x0 < x1)
                .flat_map(|(x0, x1)| [x0, x1])
                .collect();
            if moved.is_empty() && result.is_empty() {
                continue;
            }
            result.append_span(y, &moved);
            end = Some(max_y);
        }
        if let Some(end) = end {
            result.append_span(end, &[]);
        }
        debug_assert_eq!(result.validate(), Ok(()), "malformed shape {result:?}");
        result
    }

    /// Whether a band with `segments` would repeat the last band.
    fn can_coalesce(&self, segments: &[i32]) -> bool {
        self.spans
            .last()
            .is_some_and(|last| self.segments[last.segment_index..] == *segments)
    }

    fn append_span(&mut self, y: i32, segments: &[i32]) {
        if self.can_coalesce(segments) {
            return;
        }
        self.spans.push(Span {
            y,
            segment_index: self.segments.len(),
        });
        self.segments.extend_from_slice(segments);
    }

    /// Copies `shape`'s bands from span `from` onward.
    fn append_spans(&mut self, shape: &Self, from: usize) {
        for i in from..shape.spans.len() {
            self.append_span(shape.spans[i].y, shape.segments_at(i));
        }
    }

    /// Checks every span/segment invariant.
    pub(crate) fn validate(&self) -> Result<(), ShapeError> {
        let segments = &self.segments;
        let spans = &self.spans;
        if spans.is_empty() || segments.is_empty() {
            return if spans.is_empty() && segments.is_empty() {
                Ok(())
            } else {
                Err(ShapeError::Unpaired)
            };
        }
        if spans.len() == 1 {
            return Err(ShapeError::LoneSpan);
        }
        if segments.len() % 2 != 0 {
            return Err(ShapeError::OddSegmentCount);
        }

        for (i, span) in spans.iter().enumerate() {
            if span.segment_index > segments.len() {
                return Err(ShapeError::SegmentIndexOutOfRange { span: i });
            }
            if span.segment_index % 2 != 0 {
                return Err(ShapeError::OddSegmentIndex { span: i });
            }
            let Some(next) = spans.get(i + 1) else {
                if span.segment_index != segments.len() {
                    return Err(ShapeError::Unterminated);
                }
                break;
            };
            if span.y >= next.y {
                return Err(ShapeError::NonIncreasingY { span: i });
            }
            if span.segment_index > next.segment_index {
                return Err(ShapeError::DecreasingSegmentIndex { span: i });
            }
            let band = segments
                .get(span.segment_index..next.segment_index)
                .ok_or(ShapeError::SegmentIndexOutOfRange { span: i + 1 })?;
            if band.windows(2).any(|w| w[0] > w[1]) {
                return Err(ShapeError::UnorderedSegments { span: i });
            }
        }
        Ok(())
    }

    pub(crate) fn union(a: &Self, b: &Self) -> Self {
        shape_operation::<Union>(a, b)
    }

    pub(crate) fn intersection(a: &Self, b: &Self) -> Self {
        shape_operation::<Intersect>(a, b)
    }

    pub(crate) fn subtraction(a: &Self, b: &Self) -> Self {
        shape_operation::<Subtract>(a, b)
    }

    /// Whether every point of `b` lies in `a`.
    pub(crate) fn contains(a: &Self, b: &Self) -> bool {
        compare_shapes::<Contains>(a, b)
    }

    /// Whether `a` and `b` share a point.
    pub(crate) fn intersects(a: &Self, b: &Self) -> bool {
        compare_shapes::<Intersects>(a, b)
    }
}

/// One of the three set operations expressed as a parity merge.
///
/// While walking the boundaries of a band, bit `1` tracks "inside A" and bit `2`
/// tracks "inside B". A boundary is emitted whenever the state enters or leaves
/// [`OP_CODE`](Self::OP_CODE). The `KEEP_*` flags say what to do with whatever
/// is left of one operand once the other runs out.
pub(crate) trait SetOperation {
    const OP_CODE: u8;
    const KEEP_REMAINING_SEGMENTS_A: bool;
    const KEEP_REMAINING_SEGMENTS_B: bool;
    const KEEP_REMAINING_SPANS_A: bool;
    const KEEP_REMAINING_SPANS_B: bool;

    /// Resolves trivial inputs without merging.
    fn try_simple(_a: &Shape, _b: &Shape) -> Option<Shape> {
        None
    }
}

pub(crate) struct Union;
pub(crate) struct Intersect;
pub(crate) struct Subtract;

impl SetOperation for Union {
    const OP_CODE: u8 = 0;
    const KEEP_REMAINING_SEGMENTS_A: bool = true;
    const KEEP_REMAINING_SEGMENTS_B: bool = true;
    const KEEP_REMAINING_SPANS_A: bool = true;
    const KEEP_REMAINING_SPANS_B: bool = true;

    fn try_simple(a: &Shape, b: &Shape) -> Option<Shape> {
        a.is_empty().then(|| b.clone())
    }
}

impl SetOperation for Intersect {
    const OP_CODE: u8 = 3;
    const KEEP_REMAINING_SEGMENTS_A: bool = false;
    const KEEP_REMAINING_SEGMENTS_B: bool = false;
    const KEEP_REMAINING_SPANS_A: bool = false;
    const KEEP_REMAINING_SPANS_B: bool = false;
}

impl SetOperation for Subtract {
    const OP_CODE: u8 = 1;
    const KEEP_REMAINING_SEGMENTS_A: bool = true;
    const KEEP_REMAINING_SEGMENTS_B: bool = false;
    const KEEP_REMAINING_SPANS_A: bool = true;
    const KEEP_REMAINING_SPANS_B: bool = false;
}

fn shape_operation<Op: SetOperation>(a: &Shape, b: &Shape) -> Shape {
    const {
        assert!(
            Op::KEEP_REMAINING_SEGMENTS_A || !Op::KEEP_REMAINING_SEGMENTS_B,
            "keeping B's leftover segments requires keeping A's"
        );
        assert!(
            Op::KEEP_REMAINING_SPANS_A || !Op::KEEP_REMAINING_SPANS_B,
            "keeping B's leftover spans requires keeping A's"
        );
    }

    if let Some(result) = Op::try_simple(a, b) {
        return result;
    }

    let mut result = Shape::new();
    let mut segments = Segments::new();
    let (mut ai, mut bi) = (0, 0);
    let mut a_segments: &[i32] = &[];
    let mut b_segments: &[i32] = &[];

    while ai < a.spans.len() && bi < b.spans.len() {
        let a_y = a.spans[ai].y;
        let b_y = b.spans[bi].y;
        let mut y = a_y;
        if a_y <= b_y {
            a_segments = a.segments_at(ai);
            ai += 1;
        }
        if a_y >= b_y {
            y = b_y;
            b_segments = b.segments_at(bi);
            bi += 1;
        }

        let mut flag = 0_u8;
        let mut old_flag = 0_u8;
        let (mut s1, mut s2) = (a_segments, b_segments);
        segments.clear();

        while let (Some(&x1), Some(&x2)) = (s1.first(), s2.first()) {
            let x = x1.min(x2);
            if x1 <= x2 {
                flag ^= 1;
                s1 = &s1[1..];
            }
            if x1 >= x2 {
                flag ^= 2;
                s2 = &s2[1..];
            }
            if flag == Op::OP_CODE || old_flag == Op::OP_CODE {
                segments.push(x);
            }
            old_flag = flag;
        }

        if Op::KEEP_REMAINING_SEGMENTS_A && !s1.is_empty() {
            segments.extend_from_slice(s1);
        } else if Op::KEEP_REMAINING_SEGMENTS_B && !s2.is_empty() {
            segments.extend_from_slice(s2);
        }

        // No leading empty bands.
        if !segments.is_empty() || !result.is_empty() {
            result.append_span(y, &segments);
        }
    }

    if Op::KEEP_REMAINING_SPANS_A && ai < a.spans.len() {
        result.append_spans(a, ai);
    } else if Op::KEEP_REMAINING_SPANS_B && bi < b.spans.len() {
        result.append_spans(b, bi);
    }

    debug_assert_eq!(result.validate(), Ok(()), "malformed shape {result:?}");
    result
}

/// Early-exit policy for [`compare_shapes`].
///
/// Each hook is consulted when the walk discovers that kind of configuration;
/// returning `Some(answer)` stops the walk with that answer.
pub(crate) trait CompareOperation {
    /// Answer when the walk completes without stopping.
    const DEFAULT_RESULT: bool;

    /// Part of A lies outside B.
    fn a_outside_b() -> Option<bool> {
        None
    }

    /// Part of B lies outside A.
    fn b_outside_a() -> Option<bool> {
        None
    }

    /// An interval of A overlaps an interval of B.
    fn a_overlaps_b() -> Option<bool> {
        None
    }
}

/// A contains B.
pub(crate) struct Contains;
/// A and B share a point.
pub(crate) struct Intersects;

impl CompareOperation for Contains {
    const DEFAULT_RESULT: bool = true;

    fn b_outside_a() -> Option<bool> {
        Some(false)
    }
}

impl CompareOperation for Intersects {
    const DEFAULT_RESULT: bool = false;

    fn a_overlaps_b() -> Option<bool> {
        Some(true)
    }
}

fn compare_shapes<Op: CompareOperation>(a: &Shape, b: &Shape) -> bool {
    macro_rules! stop_if {
        ($hook:expr) => {
            if let Some(answer) = $hook {
                return answer;
            }
        };
    }

    let (mut ai, mut bi) = (0, 0);
    let mut a_had_segments = false;
    let mut b_had_segments = false;

    while ai + 1 < a.spans.len() && bi + 1 < b.spans.len() {
        let (a_y, a_max_y) = (a.spans[ai].y, a.spans[ai + 1].y);
        let (b_y, b_max_y) = (b.spans[bi].y, b.spans[bi + 1].y);
        let mut a_segments = a.segments_at(ai);
        let mut b_segments = b.segments_at(bi);

        // A band that starts before the other operand's band can only be tested
        // here; if the other operand had segments just above, it already was.
        let a_has_segments = !a_segments.is_empty();
        let b_has_segments = !b_segments.is_empty();
        if a_y < b_y && !b_had_segments && a_has_segments {
            stop_if!(Op::a_outside_b());
        }
        if b_y < a_y && !a_had_segments && b_has_segments {
            stop_if!(Op::b_outside_a());
        }
        a_had_segments = a_has_segments;
        b_had_segments = b_has_segments;

        if b_max_y > a_y && b_y < a_max_y {
            while let ([a_x, a_max_x, ..], [b_x, b_max_x, ..]) = (a_segments, b_segments) {
                let (a_x, a_max_x, b_x, b_max_x) = (*a_x, *a_max_x, *b_x, *b_max_x);
                if b_max_x > a_x && b_x < a_max_x {
                    stop_if!(Op::a_overlaps_b());
                }
                if a_x < b_x {
                    stop_if!(Op::a_outside_b());
                }
                if b_x < a_x {
                    stop_if!(Op::b_outside_a());
                }

                match a_max_x.cmp(&b_max_x) {
                    Ordering::Less => a_segments = &a_segments[2..],
                    Ordering::Greater => b_segments = &b_segments[2..],
                    Ordering::Equal => {
                        a_segments = &a_segments[2..];
                        b_segments = &b_segments[2..];
                    }
                }
            }

            if !a_segments.is_empty() {
                stop_if!(Op::a_outside_b());
            }
            if !b_segments.is_empty() {
                stop_if!(Op::b_outside_a());
            }
        }

        match a_max_y.cmp(&b_max_y) {
            Ordering::Less => ai += 1,
            Ordering::Greater => bi += 1,
            Ordering::Equal => {
                ai += 1;
                bi += 1;
            }
        }
    }

    if ai + 1 < a.spans.len() {
        stop_if!(Op::a_outside_b());
    }
    if bi + 1 < b.spans.len() {
        stop_if!(Op::b_outside_a());
    }
    Op::DEFAULT_RESULT
}
