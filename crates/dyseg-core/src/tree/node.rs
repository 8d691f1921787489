use super::arena::NodeId;

/// A range of positions covered by a node
///
/// A leaf has `lo == hi` and covers exactly position `lo`. An internal node covers
/// the half-open interval `[lo, hi)` whose width is a power of two and whose start
/// is a multiple of that width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub lo: u128,
    pub hi: u128,
}

impl Span {
    #[inline]
    pub fn point(pos: u128) -> Self {
        Self { lo: pos, hi: pos }
    }

    #[inline]
    pub fn new(lo: u128, hi: u128) -> Self {
        debug_assert!(lo < hi);
        Self { lo, hi }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    /// Exclusive end, treating a leaf as the unit interval `[lo, lo + 1)`
    #[inline]
    pub fn end(&self) -> u128 {
        if self.is_point() { self.lo + 1 } else { self.hi }
    }

    #[inline]
    pub fn width(&self) -> u128 {
        self.end() - self.lo
    }

    #[inline]
    pub fn mid(&self) -> u128 {
        self.lo + (self.hi - self.lo) / 2
    }

    #[inline]
    pub fn contains(&self, pos: u128) -> bool {
        self.lo <= pos && pos < self.end()
    }

    /// Returns true if the span lies inside the inclusive range `[lo, hi]`
    #[inline]
    pub fn covered_by(&self, lo: u128, hi: u128) -> bool {
        lo <= self.lo && self.end() - 1 <= hi
    }

    /// Returns true if the span shares no position with the inclusive range `[lo, hi]`
    #[inline]
    pub fn disjoint(&self, lo: u128, hi: u128) -> bool {
        self.end() - 1 < lo || self.lo > hi
    }

    /// Smallest aligned block that holds both this span and `pos`
    ///
    /// Used when the span has no parent to bound the search.
    pub fn enclosing(&self, pos: u128) -> Span {
        debug_assert!(!self.contains(pos));
        let distance = self.lo.abs_diff(pos);
        let floor_pow2 = 1u128 << (u128::BITS - 1 - distance.leading_zeros());
        let mut resolution = self.width().max(floor_pow2);
        while self.lo / resolution != pos / resolution {
            resolution <<= 1;
        }
        let lo = (pos / resolution) * resolution;
        Span::new(lo, lo + resolution)
    }

    /// Bisects this (parent) span until `child` and `pos` would end up on
    /// different sides, returning the last span holding both
    pub fn split_towards(&self, child: Span, pos: u128) -> Span {
        let mut lo = self.lo;
        let mut hi = self.end();
        loop {
            let mid = lo + (hi - lo) / 2;
            if pos < mid {
                if child.lo >= mid {
                    break;
                }
                hi = mid;
            } else {
                if child.end() <= mid {
                    break;
                }
                lo = mid;
            }
        }
        Span::new(lo, hi)
    }
}

/// A materialized node of the tree
#[derive(Debug, Clone)]
pub(crate) struct Node<P> {
    pub span: Span,
    pub value: P,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

impl<P> Node<P> {
    pub fn leaf(pos: u128, value: P) -> Self {
        Self {
            span: Span::point(pos),
            value,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub fn internal(span: Span, value: P) -> Self {
        Self {
            span,
            value,
            parent: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.span.is_point()
    }
}
