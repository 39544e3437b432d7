//! Axis-aligned integer rectangles
//!
//! Rectangles are stored as inclusive-left/top, exclusive-right/bottom edges.
//! The `left == right == -1` sentinel marks a rectangle that has never been
//! set; it is the only value allowed to break the `left <= right` invariant
//! checks performed by [`Rect::is_valid`].

use serde::{Deserialize, Serialize};

use super::types::GrabAxis;

/// Integer rectangle in window or screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (exclusive for containment)
    pub right: i32,
    /// Bottom edge (exclusive for containment)
    pub bottom: i32,
}

impl Rect {
    /// The "never set" sentinel
    pub const UNSET: Self = Self { left: -1, top: -1, right: -1, bottom: -1 };

    /// Create a rectangle from its four edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle anchored at the origin
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Overwrite all four edges
    pub fn set(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        *self = Self::new(left, top, right, bottom);
    }

    /// Width, zero for inverted rectangles
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).max(0)
    }

    /// Height, zero for inverted rectangles
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).max(0)
    }

    /// Whether the rectangle has zero width or zero height
    pub fn is_empty(&self) -> bool {
        self.left == self.right || self.top == self.bottom
    }

    /// Whether this is the "never set" sentinel
    pub fn is_unset(&self) -> bool {
        self.left == -1 && self.right == -1
    }

    /// Whether the edges are ordered
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.top <= self.bottom
    }

    /// Copy with swapped edges where they were inverted
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    /// Half-open containment test: the right and bottom edges are outside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Whether the two rectangles share any area
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Intersection with `other`
    ///
    /// Disjoint rectangles clip to an empty rectangle on the nearest edge of
    /// `other`, never to an inverted one.
    pub fn clip(&self, other: &Self) -> Self {
        let other = other.normalized();
        let left = self.left.clamp(other.left, other.right);
        let top = self.top.clamp(other.top, other.bottom);
        let right = self.right.clamp(left, other.right.max(left));
        let bottom = self.bottom.clamp(top, other.bottom.max(top));
        Self::new(left, top, right, bottom)
    }

    /// Smallest rectangle enclosing both; the unset sentinel is ignored
    pub fn union(&self, other: &Self) -> Self {
        if self.is_unset() {
            return *other;
        }
        if other.is_unset() {
            return *self;
        }
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Center point, rounded toward the top-left
    pub fn center(&self) -> (i32, i32) {
        (midpoint(self.left, self.right), midpoint(self.top, self.bottom))
    }

    /// Clamp a point into the rectangle (right/bottom edge exclusive)
    pub fn clamp_point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(self.left, self.right.saturating_sub(1).max(self.left)),
            y.clamp(self.top, self.bottom.saturating_sub(1).max(self.top)),
        )
    }

    /// Wrap a point that left the rectangle around to the opposite edge
    ///
    /// `margin` shrinks the usable area on every side. The result always lies
    /// in `[left + margin, right - margin)` on each wrapped axis, so a point on
    /// the right or bottom edge wraps to the left or top one.
    pub fn wrap_point(&self, x: i32, y: i32, margin: i32, axis: GrabAxis) -> (i32, i32) {
        let margin = i64::from(margin.max(0));
        let x_range = (i64::from(self.left) + margin, i64::from(self.right) - margin);
        let y_range = (i64::from(self.top) + margin, i64::from(self.bottom) - margin);
        if x_range.0 >= x_range.1 || y_range.0 >= y_range.1 {
            return (x, y);
        }

        let x = if axis.contains(GrabAxis::X) { wrap_into(x, x_range) } else { x };
        let y = if axis.contains(GrabAxis::Y) { wrap_into(y, y_range) } else { y };
        (x, y)
    }
}

/// Wrap `value` into the half-open range `[lo, hi)`; `lo < hi` and both lie
/// within the `i32` edges of a rectangle
fn wrap_into(value: i32, (lo, hi): (i64, i64)) -> i32 {
    let wrapped = lo + (i64::from(value) - lo).rem_euclid(hi - lo);
    i32::try_from(wrapped).unwrap_or(value)
}

/// Midpoint of two edges rounded toward `low`; `low` for inverted edges
fn midpoint(low: i32, high: i32) -> i32 {
    let span = (i64::from(high) - i64::from(low)).max(0);
    i32::try_from(i64::from(low) + span / 2).unwrap_or(low)
}

impl Default for Rect {
    fn default() -> Self {
        Self::UNSET
    }
}
