//! Axis-aligned bounding boxes and the metrics the tree is built on.

use geo_traits::{CoordTrait, RectTrait};

use crate::r#type::IndexableNum;

/// An axis-aligned bounding box in two dimensions.
///
/// Boxes are closed: two boxes that share only an edge or a corner intersect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox<N: IndexableNum> {
    /// Minimum `x` value.
    pub min_x: N,
    /// Minimum `y` value.
    pub min_y: N,
    /// Maximum `x` value.
    pub max_x: N,
    /// Maximum `y` value.
    pub max_y: N,
}

impl<N: IndexableNum> BBox<N> {
    /// Create a new box from its bounds.
    pub fn new(min_x: N, min_y: N, max_x: N, max_y: N) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Copy the bounds of any [`RectTrait`] implementation.
    pub fn from_rect(rect: &impl RectTrait<T = N>) -> Self {
        Self::new(
            rect.min().x(),
            rect.min().y(),
            rect.max().x(),
            rect.max().y(),
        )
    }

    /// The inverted box covering nothing. It is the identity for [`BBox::union`].
    pub fn empty() -> Self {
        Self {
            min_x: N::max_value(),
            min_y: N::max_value(),
            max_x: N::min_value(),
            max_y: N::min_value(),
        }
    }

    /// Returns `true` if this box covers nothing.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// The smallest box covering both `self` and `other`.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: partial_min(self.min_x, other.min_x),
            min_y: partial_min(self.min_y, other.min_y),
            max_x: partial_max(self.max_x, other.max_x),
            max_y: partial_max(self.max_y, other.max_y),
        }
    }

    /// Grow this box in place so that it covers `other`.
    #[inline]
    pub fn expand(&mut self, other: &Self) {
        *self = self.union(other);
    }

    /// Returns `true` if the two boxes share at least one point.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.max_x < other.min_x {
            return false;
        }

        if self.max_y < other.min_y {
            return false;
        }

        if self.min_x > other.max_x {
            return false;
        }

        if self.min_y > other.max_y {
            return false;
        }

        true
    }

    /// Returns `true` if `other` lies entirely within this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Width times height. The empty box has zero area.
    #[inline]
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max_x.as_f64() - self.min_x.as_f64()) * (self.max_y.as_f64() - self.min_y.as_f64())
    }

    /// Bound-to-bound distance between two boxes: the sum of the absolute differences of their
    /// four bounds.
    ///
    /// This is symmetric and zero only when both boxes coincide. The linear split uses it to find
    /// the two elements farthest apart.
    #[inline]
    pub fn separation(&self, other: &Self) -> f64 {
        (self.min_x.as_f64() - other.min_x.as_f64()).abs()
            + (self.min_y.as_f64() - other.min_y.as_f64()).abs()
            + (self.max_x.as_f64() - other.max_x.as_f64()).abs()
            + (self.max_y.as_f64() - other.max_y.as_f64()).abs()
    }

    /// Area of the box covering both boxes that neither box covers on its own (counting overlap
    /// twice), used by the quadratic split.
    #[inline]
    pub fn wasted_area(&self, other: &Self) -> f64 {
        self.union(other).area() - (self.area() + other.area())
    }

    /// Squared euclidean distance from a point to the closest point of this box. Zero when the
    /// point lies inside.
    #[inline]
    pub fn distance_squared_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = axis_dist(x, self.min_x.as_f64(), self.max_x.as_f64());
        let dy = axis_dist(y, self.min_y.as_f64(), self.max_y.as_f64());
        dx * dx + dy * dy
    }
}

/// The minimum bounding rectangle of a set of boxes, or [`BBox::empty`] when there are none.
pub fn minimum_covering_box<'a, N: IndexableNum + 'a>(
    boxes: impl IntoIterator<Item = &'a BBox<N>>,
) -> BBox<N> {
    boxes
        .into_iter()
        .fold(BBox::empty(), |acc, bbox| acc.union(bbox))
}

#[inline]
fn partial_min<N: IndexableNum>(a: N, b: N) -> N {
    if b < a {
        b
    } else {
        a
    }
}

#[inline]
fn partial_max<N: IndexableNum>(a: N, b: N) -> N {
    if b > a {
        b
    } else {
        a
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist(k: f64, min: f64, max: f64) -> f64 {
    if k < min {
        min - k
    } else if k <= max {
        0.0
    } else {
        k - max
    }
}

/// A single coordinate.
///
/// Used in the implementation of RectTrait for BBox and tree nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord<N: IndexableNum> {
    pub(crate) x: N,
    pub(crate) y: N,
}

impl<N: IndexableNum> CoordTrait for Coord<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl<N: IndexableNum> RectTrait for BBox<N> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x,
            y: self.min_y,
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x,
            y: self.max_y,
        }
    }
}
