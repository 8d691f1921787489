mod arena;
mod conf;
mod iter;
mod node;
mod shared;

crate::cfg_profiler! {
    pub(crate) mod stats;
}

use core::{fmt, marker::PhantomData, ops::Bound, ops::RangeBounds};

use tracing::{debug, trace};

use self::{
    arena::{Arena, NodeId},
    node::Node,
};
use crate::{Aggregator, Error, Index};

pub use conf::TreeConf;
pub use iter::Iter;
pub use shared::{SharedTree, TreeRef, TreeRefMut};

#[cfg(feature = "profiler")]
use dyseg_stats::profile_scope;
#[cfg(feature = "profiler")]
pub use stats::Stats;

/// A sparse segment tree over the index domain `I`
///
/// Nodes are only materialized for inserted indices and for the internal nodes
/// needed to join them. Every internal node covers a power-of-two wide, aligned
/// range of one implicit segment tree spanning the whole domain of `I`, so a tree
/// with `k` entries holds at most `2k - 1` nodes no matter how far apart the
/// indices are.
///
/// All operations run in time proportional to the height of the implicit tree
/// (at most the bit width of `I`).
///
/// # Example
///
/// ```
/// use dyseg_core::{Tree, aggregator::sum::U64SumAggregator};
///
/// let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
/// tree.insert(5, 5);
/// tree.insert(1, 1);
/// tree.insert(7, 7);
///
/// assert_eq!(tree.query(0..=10), 13);
/// assert_eq!(tree.query(2..=6), 5);
/// assert_eq!(tree.remove(5), Some(5));
/// assert_eq!(tree.query(..), 8);
/// ```
#[derive(Clone)]
pub struct Tree<I: Index, A: Aggregator> {
    root: Option<NodeId>,
    nodes: Arena<A::PartialAggregate>,
    /// Number of leaves
    len: usize,
    conf: TreeConf,
    #[cfg(feature = "profiler")]
    /// A profiler that records latencies of tree operations
    stats: Stats,
    _marker: PhantomData<fn() -> (I, A)>,
}

impl<I: Index, A: Aggregator> Default for Tree<I, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Index, A: Aggregator> Tree<I, A> {
    /// Creates an empty tree with the default configuration
    pub fn new() -> Self {
        Self::with_conf(TreeConf::default())
    }

    /// Creates an empty tree from the given configuration
    pub fn with_conf(conf: TreeConf) -> Self {
        Self {
            root: None,
            nodes: Arena::with_capacity(conf.capacity),
            len: 0,
            conf,
            #[cfg(feature = "profiler")]
            stats: Stats::default(),
            _marker: PhantomData,
        }
    }

    /// Returns the configuration the tree was created with
    pub fn conf(&self) -> &TreeConf {
        &self.conf
    }

    /// Returns the number of indices holding a value
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of materialized nodes (leaves and internal nodes)
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts `input` at `index`, replacing any value stored there
    ///
    /// Returns the previous partial aggregate at `index`, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use dyseg_core::{Tree, aggregator::sum::I32SumAggregator};
    ///
    /// let mut tree: Tree<i32, I32SumAggregator> = Tree::new();
    /// assert_eq!(tree.insert(-4, 10), None);
    /// assert_eq!(tree.insert(-4, 3), Some(10));
    /// assert_eq!(tree.total(), 3);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: I, input: A::Input) -> Option<A::PartialAggregate> {
        #[cfg(feature = "profiler")]
        profile_scope!(&self.stats.insert);

        self.insert_partial(index.into_position(), A::lift(input))
    }

    /// Inserts `input` at `index` after checking that [Aggregator::IDENTITY] is
    /// neutral for the lifted value
    ///
    /// Returns [Error::IdentityViolation] and leaves the tree untouched otherwise.
    pub fn try_insert(
        &mut self,
        index: I,
        input: A::Input,
    ) -> Result<Option<A::PartialAggregate>, Error> {
        #[cfg(feature = "profiler")]
        profile_scope!(&self.stats.insert);

        let value = A::lift(input);
        if !A::identity_holds(value) {
            return Err(Error::IdentityViolation);
        }
        Ok(self.insert_partial(index.into_position(), value))
    }

    /// Combines `input` into the value stored at `index`
    ///
    /// If `index` holds no value the lifted input is inserted. Returns the new
    /// partial aggregate at `index`.
    ///
    /// # Example
    ///
    /// ```
    /// use dyseg_core::{Tree, aggregator::sum::U32SumAggregator};
    ///
    /// // count occurrences per salary
    /// let mut tree: Tree<u32, U32SumAggregator> = Tree::new();
    /// for salary in [3000, 4500, 3000] {
    ///     tree.apply(salary, 1);
    /// }
    /// assert_eq!(tree.get(3000), Some(2));
    /// assert_eq!(tree.query(2000..4000), 2);
    /// ```
    pub fn apply(&mut self, index: I, input: A::Input) -> A::PartialAggregate {
        #[cfg(feature = "profiler")]
        profile_scope!(&self.stats.insert);

        let pos = index.into_position();
        let delta = A::lift(input);
        match self.find(pos) {
            Some(leaf) => {
                let value = A::combine(self.nodes[leaf].value, delta);
                self.nodes[leaf].value = value;
                self.pull_ancestors(leaf);
                value
            }
            None => {
                self.insert_partial(pos, delta);
                delta
            }
        }
    }

    /// Removes the value at `index` and returns it
    ///
    /// Removing an index that holds no value is a no-op returning `None`.
    pub fn remove(&mut self, index: I) -> Option<A::PartialAggregate> {
        #[cfg(feature = "profiler")]
        profile_scope!(&self.stats.remove);

        let root = self.root?;
        let pos = index.into_position();
        let (root, removed) = self.remove_rec(root, pos);
        self.root = root;
        if let Some(root) = root {
            self.nodes[root].parent = None;
        }
        if removed.is_none() {
            trace!(?index, "remove of absent index");
        }
        removed
    }

    /// Removes all values and releases every node
    pub fn clear(&mut self) {
        debug!(len = self.len, nodes = self.nodes.len(), "clearing tree");
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns `true` if `index` holds a value
    #[inline]
    pub fn contains(&self, index: I) -> bool {
        self.find(index.into_position()).is_some()
    }

    /// Returns the partial aggregate stored at `index`
    #[inline]
    pub fn get(&self, index: I) -> Option<A::PartialAggregate> {
        self.find(index.into_position()).map(|id| self.nodes[id].value)
    }

    /// Returns the partial aggregate stored at `index` or [Aggregator::IDENTITY]
    #[inline]
    pub fn value_at(&self, index: I) -> A::PartialAggregate {
        self.get(index).unwrap_or(A::IDENTITY)
    }

    /// Combines all values within `range` in ascending index order
    ///
    /// Empty ranges and ranges without values return [Aggregator::IDENTITY].
    ///
    /// # Example
    ///
    /// ```
    /// use dyseg_core::{Tree, aggregator::max::I64MaxAggregator};
    ///
    /// let mut tree: Tree<i64, I64MaxAggregator> = Tree::new();
    /// tree.insert(-1_000_000, 4);
    /// tree.insert(12, 9);
    /// tree.insert(1 << 50, 2);
    ///
    /// assert_eq!(tree.query(..0), 4);
    /// assert_eq!(tree.query(-1..=12), 9);
    /// assert_eq!(tree.query(13..), 2);
    /// assert_eq!(tree.query(0..0), i64::MIN);
    /// ```
    pub fn query<R>(&self, range: R) -> A::PartialAggregate
    where
        R: RangeBounds<I>,
    {
        #[cfg(feature = "profiler")]
        profile_scope!(&self.stats.query);

        match into_positions(&range) {
            Some((lo, hi)) => self.query_rec(self.root, lo, hi),
            None => A::IDENTITY,
        }
    }

    /// Combines all values within `range` and lowers the result
    #[inline]
    pub fn query_and_lower<R>(&self, range: R) -> A::Aggregate
    where
        R: RangeBounds<I>,
    {
        A::lower(self.query(range))
    }

    /// Same as [Tree::query] but rejects ranges whose start lies above their end
    pub fn try_query<R>(&self, range: R) -> Result<A::PartialAggregate, Error>
    where
        R: RangeBounds<I>,
    {
        let start = match range.start_bound() {
            Bound::Included(s) | Bound::Excluded(s) => Some(*s),
            Bound::Unbounded => None,
        };
        let end = match range.end_bound() {
            Bound::Included(e) | Bound::Excluded(e) => Some(*e),
            Bound::Unbounded => None,
        };
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(Error::InvalidRange);
            }
        }
        Ok(self.query(range))
    }

    /// Returns the combination of all values in the tree
    #[inline]
    pub fn total(&self) -> A::PartialAggregate {
        self.root
            .map(|root| self.nodes[root].value)
            .unwrap_or(A::IDENTITY)
    }

    /// Returns the lowered combination of all values in the tree
    #[inline]
    pub fn total_and_lower(&self) -> A::Aggregate {
        A::lower(self.total())
    }

    /// Returns an iterator over `(index, partial aggregate)` pairs in ascending index order
    pub fn iter(&self) -> Iter<'_, I, A> {
        Iter::new(&self.nodes, self.root, self.len)
    }

    #[inline]
    fn insert_partial(
        &mut self,
        pos: u128,
        value: A::PartialAggregate,
    ) -> Option<A::PartialAggregate> {
        let (root, old) = self.insert_rec(self.root, pos, value);
        self.nodes[root].parent = None;
        self.root = Some(root);
        old
    }

    fn insert_rec(
        &mut self,
        cur: Option<NodeId>,
        pos: u128,
        value: A::PartialAggregate,
    ) -> (NodeId, Option<A::PartialAggregate>) {
        let Some(mut cur) = cur else {
            self.len += 1;
            return (self.nodes.alloc(Node::leaf(pos, value)), None);
        };

        let span = self.nodes[cur].span;
        if span.is_point() && span.lo == pos {
            let old = core::mem::replace(&mut self.nodes[cur].value, value);
            return (cur, Some(old));
        }
        if !span.contains(pos) {
            cur = self.extend_towards(cur, pos);
        }

        let node = &self.nodes[cur];
        // positions at the midpoint belong to the right half
        let go_left = pos < node.span.mid();
        let child = if go_left { node.left } else { node.right };
        let (child, old) = self.insert_rec(child, pos, value);
        self.nodes[child].parent = Some(cur);
        if go_left {
            self.nodes[cur].left = Some(child);
        } else {
            self.nodes[cur].right = Some(child);
        }
        self.pull(cur);
        (cur, old)
    }

    /// Materializes the node joining `cur` and `pos` and attaches `cur` beneath it
    ///
    /// The other child of the returned node is left empty.
    fn extend_towards(&mut self, cur: NodeId, pos: u128) -> NodeId {
        let Node {
            span,
            value,
            parent,
            ..
        } = self.nodes[cur];
        let range = match parent {
            Some(parent) => self.nodes[parent].span.split_towards(span, pos),
            None => span.enclosing(pos),
        };

        let mut node = Node::internal(range, value);
        node.parent = parent;
        if pos > span.lo {
            node.left = Some(cur);
        } else {
            node.right = Some(cur);
        }
        let id = self.nodes.alloc(node);

        match parent {
            Some(parent) => {
                let parent = &mut self.nodes[parent];
                if parent.left == Some(cur) {
                    parent.left = Some(id);
                } else {
                    parent.right = Some(id);
                }
            }
            None => self.root = Some(id),
        }
        self.nodes[cur].parent = Some(id);

        trace!(lo = ?range.lo, hi = ?range.hi, pos = ?pos, "extended tree");
        id
    }

    fn remove_rec(
        &mut self,
        cur: NodeId,
        pos: u128,
    ) -> (Option<NodeId>, Option<A::PartialAggregate>) {
        let node = &self.nodes[cur];
        let span = node.span;

        if span.is_point() {
            if span.lo != pos {
                return (Some(cur), None);
            }
            let leaf = self.nodes.release(cur);
            self.len -= 1;
            return (None, Some(leaf.value));
        }
        if !span.contains(pos) {
            return (Some(cur), None);
        }

        let go_left = pos < span.mid();
        let Some(child) = (if go_left { node.left } else { node.right }) else {
            return (Some(cur), None);
        };
        let (child, removed) = self.remove_rec(child, pos);
        if removed.is_none() {
            return (Some(cur), None);
        }

        let node = &mut self.nodes[cur];
        if go_left {
            node.left = child;
        } else {
            node.right = child;
        }

        match (node.left, node.right) {
            (Some(_), Some(_)) => {
                self.pull(cur);
                (Some(cur), removed)
            }
            (Some(survivor), None) | (None, Some(survivor)) => {
                let parent = node.parent;
                self.nodes[survivor].parent = parent;
                self.nodes.release(cur);
                trace!(lo = ?span.lo, hi = ?span.hi, "compacted single-child node");
                (Some(survivor), removed)
            }
            (None, None) => {
                self.nodes.release(cur);
                (None, removed)
            }
        }
    }

    fn query_rec(&self, cur: Option<NodeId>, lo: u128, hi: u128) -> A::PartialAggregate {
        let Some(cur) = cur else {
            return A::IDENTITY;
        };
        let node = &self.nodes[cur];
        let span = node.span;

        if span.disjoint(lo, hi) {
            return A::IDENTITY;
        }
        if span.covered_by(lo, hi) {
            return node.value;
        }

        let mid = span.mid();
        if hi < mid {
            self.query_rec(node.left, lo, hi)
        } else if lo >= mid {
            self.query_rec(node.right, lo, hi)
        } else {
            A::combine(
                self.query_rec(node.left, lo, hi),
                self.query_rec(node.right, lo, hi),
            )
        }
    }

    /// Returns the leaf at `pos`, if any
    fn find(&self, pos: u128) -> Option<NodeId> {
        let mut cur = self.root?;
        loop {
            let node = &self.nodes[cur];
            if node.is_leaf() {
                return (node.span.lo == pos).then_some(cur);
            }
            if !node.span.contains(pos) {
                return None;
            }
            cur = if pos < node.span.mid() {
                node.left?
            } else {
                node.right?
            };
        }
    }

    /// Recomputes the value of an internal node from its children
    #[inline]
    fn pull(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let value = |child: Option<NodeId>| child.map_or(A::IDENTITY, |c| self.nodes[c].value);
        let combined = A::combine(value(node.left), value(node.right));
        self.nodes[id].value = combined;
    }

    /// Recomputes the values of all ancestors of `id` following parent links
    fn pull_ancestors(&mut self, id: NodeId) {
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            self.pull(p);
            parent = self.nodes[p].parent;
        }
    }
}

crate::cfg_profiler! {
    impl<I: Index, A: Aggregator> Tree<I, A> {
        /// Returns a reference to the stats of the [Tree]
        pub fn stats(&self) -> &Stats {
            &self.stats
        }

        /// Prints the latency stats of the tree as a table
        pub fn print_stats(&self) {
            use dyseg_stats::Sketch;
            use prettytable::{row, Table};

            let mut table = Table::new();
            table.add_row(row![
                "name", "count", "min", "p50", "p99", "p99.9", "p99.99", "p99.999", "max",
            ]);
            // helper fn to format percentile
            let percentile_fmt = |p: f64| -> String { format!("{:.2}ns", p) };

            // helper fn to add row to the table
            let add_row = |id: &str, table: &mut Table, sketch: &Sketch| {
                let percentiles = sketch.percentiles();
                table.add_row(row![
                    id,
                    percentiles.count(),
                    percentile_fmt(percentiles.min()),
                    percentile_fmt(percentiles.p50()),
                    percentile_fmt(percentiles.p99()),
                    percentile_fmt(percentiles.p99_9()),
                    percentile_fmt(percentiles.p99_99()),
                    percentile_fmt(percentiles.p99_999()),
                    percentile_fmt(percentiles.max()),
                ]);
            };

            add_row("insert", &mut table, &self.stats.insert);
            add_row("remove", &mut table, &self.stats.remove);
            add_row("query", &mut table, &self.stats.query);

            table.printstd();
        }
    }
}

impl<I: Index, A: Aggregator> fmt::Debug for Tree<I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, I: Index, A: Aggregator> IntoIterator for &'a Tree<I, A> {
    type Item = (I, A::PartialAggregate);
    type IntoIter = Iter<'a, I, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<I: Index, A: Aggregator> Extend<(I, A::Input)> for Tree<I, A> {
    fn extend<T: IntoIterator<Item = (I, A::Input)>>(&mut self, iter: T) {
        for (index, input) in iter {
            self.insert(index, input);
        }
    }
}

impl<I: Index, A: Aggregator> FromIterator<(I, A::Input)> for Tree<I, A> {
    fn from_iter<T: IntoIterator<Item = (I, A::Input)>>(iter: T) -> Self {
        let mut tree = Tree::new();
        Extend::extend(&mut tree, iter);
        tree
    }
}

/// Converts range bounds into inclusive positions, `None` if the range is empty
fn into_positions<I: Index>(range: &impl RangeBounds<I>) -> Option<(u128, u128)> {
    let start = match range.start_bound() {
        Bound::Included(&n) => n.into_position(),
        Bound::Excluded(&n) if n == I::MAX => return None,
        Bound::Excluded(&n) => n.into_position() + 1,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&n) => n.into_position(),
        Bound::Excluded(&n) if n == I::MIN => return None,
        Bound::Excluded(&n) => n.into_position() - 1,
        Bound::Unbounded => I::MAX.into_position(),
    };
    (start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::sum::{I64SumAggregator, U64SumAggregator};
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    /// Walks the whole tree and asserts the structural invariants
    fn check_invariants<I: Index, A: Aggregator>(tree: &Tree<I, A>) {
        let Some(root) = tree.root else {
            assert_eq!(tree.len, 0);
            assert_eq!(tree.nodes.len(), 0);
            return;
        };
        assert_eq!(tree.nodes[root].parent, None, "root has a parent");

        let mut leaves = 0;
        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            visited += 1;
            let node = &tree.nodes[id];
            if node.is_leaf() {
                assert!(node.left.is_none() && node.right.is_none());
                leaves += 1;
                continue;
            }
            let span = node.span;
            let width = span.width();
            assert!(width.is_power_of_two(), "unaligned width {:?}", span);
            assert_eq!(span.lo % width, 0, "unaligned start {:?}", span);

            let (Some(left), Some(right)) = (node.left, node.right) else {
                panic!("degenerate internal node {:?}", span);
            };
            let mid = span.mid();
            let (l, r) = (&tree.nodes[left], &tree.nodes[right]);
            assert!(span.lo <= l.span.lo && l.span.end() <= mid, "left child escapes");
            assert!(mid <= r.span.lo && r.span.end() <= span.end(), "right child escapes");
            assert_eq!(l.parent, Some(id));
            assert_eq!(r.parent, Some(id));
            assert_eq!(node.value, A::combine(l.value, r.value));
            stack.push(left);
            stack.push(right);
        }
        assert_eq!(leaves, tree.len());
        assert_eq!(visited, tree.node_count(), "unreachable nodes in arena");
        assert!(tree.node_count() <= 2 * tree.len() - 1);
    }

    /// Non-commutative aggregator tracking (first value, last value, count)
    #[derive(Default, Debug, Clone)]
    struct Concat;

    impl Aggregator for Concat {
        const IDENTITY: Self::PartialAggregate = (0, 0, 0);
        type Input = u32;
        type PartialAggregate = (u32, u32, u32);
        type Aggregate = (u32, u32, u32);

        fn lift(input: Self::Input) -> Self::PartialAggregate {
            (input, input, 1)
        }
        fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate {
            match (a.2, b.2) {
                (0, _) => b,
                (_, 0) => a,
                _ => (a.0, b.1, a.2 + b.2),
            }
        }
        fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
            a
        }
    }

    #[test]
    fn scenario_small_sum() {
        let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
        tree.insert(5, 5);
        tree.insert(1, 1);
        tree.insert(7, 7);
        check_invariants(&tree);

        assert_eq!(tree.query(0..=10), 13);
        assert_eq!(tree.query(2..=6), 5);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn scenario_negative_indices() {
        let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
        tree.insert(-3, -3);
        tree.insert(100, 100);
        check_invariants(&tree);
        assert_eq!(tree.query(-100..=100), 97);
        assert_eq!(tree.query(-100..0), -3);
        assert_eq!(tree.query(0..), 100);
    }

    #[test]
    fn scenario_remove_then_reinsert() {
        let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
        tree.insert(2, 2);
        assert_eq!(tree.remove(2), Some(2));
        assert!(tree.is_empty());
        assert_eq!(tree.query(0..=10), 0);
        tree.insert(2, 9);
        assert_eq!(tree.query(0..=10), 9);
        check_invariants(&tree);
    }

    #[test]
    fn overwrite_updates_ancestors() {
        let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
        for i in [-20, 4, 9, 1000] {
            tree.insert(i, 1);
        }
        let nodes = tree.node_count();
        assert_eq!(tree.insert(9, 50), Some(1));
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.total(), 53);
        assert_eq!(tree.query(5..=9), 50);
        check_invariants(&tree);
    }

    #[test]
    fn remove_absent_index_is_noop() {
        let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
        assert_eq!(tree.remove(3), None);

        for i in [8, 12, 40] {
            tree.insert(i, i);
        }
        let nodes = tree.node_count();
        // inside an internal range, next to a leaf, and outside the root range
        for absent in [9, 13, 10, -5, 1 << 40] {
            assert_eq!(tree.remove(absent), None);
        }
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.total(), 60);
        check_invariants(&tree);
    }

    #[test]
    fn remove_compacts_and_restores_node_count() {
        let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
        tree.insert(16, 1);
        tree.insert(17, 1);
        tree.insert(300, 1);
        let before = tree.node_count();
        tree.insert(1 << 33, 1);
        check_invariants(&tree);
        assert_eq!(tree.remove(1 << 33), Some(1));
        assert_eq!(tree.node_count(), before);
        check_invariants(&tree);

        tree.remove(16);
        tree.remove(300);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.iter().collect::<Vec<_>>(), vec![(17, 1)]);
        check_invariants(&tree);
    }

    #[test]
    fn extreme_indices_coexist() {
        let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
        tree.insert(i64::MIN, 1);
        tree.insert(i64::MAX, 2);
        tree.insert(0, 4);
        tree.insert(-1, 8);
        check_invariants(&tree);

        assert_eq!(tree.total(), 15);
        assert_eq!(tree.query(..), 15);
        assert_eq!(tree.query(i64::MIN..=i64::MIN), 1);
        assert_eq!(tree.query(i64::MAX..), 2);
        assert_eq!(tree.query(-1..=0), 12);
        assert_eq!(tree.query(..i64::MIN), 0);
        assert_eq!(
            tree.query((Bound::Excluded(i64::MAX), Bound::Unbounded)),
            0
        );

        let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
        tree.insert(u64::MAX, 3);
        tree.insert(0, 1);
        check_invariants(&tree);
        assert_eq!(tree.query(1..), 3);
        assert_eq!(tree.remove(u64::MAX), Some(3));
        assert_eq!(tree.total(), 1);
    }

    #[test]
    fn point_queries() {
        let mut tree: Tree<i32, I64SumAggregator> = Tree::new();
        tree.insert(-7, 70);
        assert_eq!(tree.value_at(-7), 70);
        assert_eq!(tree.value_at(7), 0);
        assert_eq!(tree.get(-7), Some(70));
        assert_eq!(tree.get(-6), None);
        assert!(tree.contains(-7));
        assert!(!tree.contains(0));
    }

    #[test]
    fn apply_combines_into_existing() {
        let mut tree: Tree<u32, U64SumAggregator> = Tree::new();
        assert_eq!(tree.apply(3000, 1), 1);
        assert_eq!(tree.apply(4500, 1), 1);
        assert_eq!(tree.apply(3000, 1), 2);
        assert_eq!(tree.apply(3000, 5), 7);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.total(), 8);
        check_invariants(&tree);
    }

    #[test]
    fn try_query_rejects_inverted_ranges() {
        let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
        tree.insert(1, 1);
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = 5..=2;
        assert_eq!(tree.try_query(inverted.clone()), Err(Error::InvalidRange));
        assert_eq!(tree.query(inverted), 0);
        assert_eq!(tree.try_query(1..1), Ok(0));
        assert_eq!(tree.try_query(..=1), Ok(1));
    }

    #[test]
    fn try_insert_checks_identity() {
        #[derive(Default, Debug, Clone)]
        struct Product;
        impl Aggregator for Product {
            // 0 only acts as identity for 0 itself
            const IDENTITY: Self::PartialAggregate = 0;
            type Input = i64;
            type PartialAggregate = i64;
            type Aggregate = i64;
            fn lift(input: Self::Input) -> Self::PartialAggregate {
                input
            }
            fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate {
                a * b
            }
            fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
                a
            }
        }

        let mut tree: Tree<u8, Product> = Tree::new();
        assert_eq!(tree.try_insert(1, 5), Err(Error::IdentityViolation));
        assert!(tree.is_empty());
        assert_eq!(tree.try_insert(1, 0), Ok(None));

        let mut tree: Tree<u8, I64SumAggregator> = Tree::new();
        assert_eq!(tree.try_insert(1, 5), Ok(None));
        assert_eq!(tree.try_insert(1, 6), Ok(Some(5)));
    }

    #[test]
    fn clear_resets() {
        let mut tree: Tree<u16, U64SumAggregator> =
            Tree::with_conf(TreeConf::default().with_entries(8));
        tree.extend((0..8).map(|i| (i * 1000, 1)));
        assert_eq!(tree.len(), 8);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.total(), 0);
        tree.insert(42, 1);
        check_invariants(&tree);
    }

    #[test]
    fn iter_and_debug() {
        let tree: Tree<i8, I64SumAggregator> = [(3, 30), (-128, 1), (127, 2), (-1, 10)]
            .into_iter()
            .collect();
        let entries: Vec<_> = tree.iter().collect();
        assert_eq!(entries, vec![(-128, 1), (-1, 10), (3, 30), (127, 2)]);
        assert_eq!(tree.iter().len(), 4);
        assert_eq!(format!("{:?}", tree), "{-128: 1, -1: 10, 3: 30, 127: 2}");
    }

    #[test]
    fn non_commutative_order() {
        let mut tree: Tree<i32, Concat> = Tree::new();
        for (i, v) in [(50, 5), (-10, 1), (20, 2), (30, 3)] {
            tree.insert(i, v);
        }
        assert_eq!(tree.total(), (1, 5, 4));
        assert_eq!(tree.query(0..40), (2, 3, 2));
        assert_eq!(tree.query(100..), Concat::IDENTITY);
    }

    #[test]
    fn sparsity_bound_on_spread_indices() {
        let mut tree: Tree<u64, U64SumAggregator> = Tree::new();
        let mut rng = fastrand::Rng::with_seed(7);
        let mut inserted = 0;
        for _ in 0..500 {
            if tree.insert(rng.u64(..), 1).is_none() {
                inserted += 1;
            }
        }
        assert_eq!(tree.len(), inserted);
        assert_eq!(tree.node_count(), 2 * inserted - 1);
        check_invariants(&tree);
    }

    /// In-memory sink for formatted log lines
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn structural_changes_are_logged() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut tree: Tree<i16, I64SumAggregator> = Tree::new();
            tree.insert(1, 1);
            assert!(logs.contents().is_empty(), "first insert is not an extension");

            tree.insert(-300, 1);
            assert!(logs.contents().contains("extended tree"));

            tree.remove(5);
            assert!(logs.contents().contains("remove of absent index"));
            assert!(!logs.contents().contains("compacted single-child node"));

            tree.remove(1);
            assert!(logs.contents().contains("compacted single-child node"));

            tree.clear();
            assert!(tree.is_empty());
        });

        let out = logs.contents();
        assert!(out.contains("TRACE"));
        assert!(out.contains("DEBUG"));
        assert!(out.contains("clearing tree"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(i16, u32),
        Apply(i16, u32),
        Remove(i16),
        Query(i16, i16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        // a narrow key band makes collisions and removals of present keys likely
        let key = prop_oneof![-64i16..64, any::<i16>()];
        prop_oneof![
            4 => (key.clone(), 1u32..100).prop_map(|(k, v)| Op::Insert(k, v)),
            1 => (key.clone(), 1u32..100).prop_map(|(k, v)| Op::Apply(k, v)),
            2 => key.clone().prop_map(Op::Remove),
            2 => (key.clone(), key).prop_map(|(a, b)| Op::Query(a.min(b), a.max(b))),
        ]
    }

    type Partial = <Concat as Aggregator>::PartialAggregate;

    fn model_fold(model: &BTreeMap<i16, Partial>, lo: i16, hi: i16) -> Partial {
        model
            .range(lo..=hi)
            .map(|(_, v)| *v)
            .fold(Concat::IDENTITY, Concat::combine)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn matches_btreemap_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
            let mut tree: Tree<i16, Concat> = Tree::new();
            let mut model: BTreeMap<i16, Partial> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(k, v) => {
                        let old = tree.insert(k, v);
                        prop_assert_eq!(old, model.insert(k, Concat::lift(v)));
                    }
                    Op::Apply(k, v) => {
                        let expected = match model.get(&k) {
                            Some(old) => Concat::combine(*old, Concat::lift(v)),
                            None => Concat::lift(v),
                        };
                        model.insert(k, expected);
                        prop_assert_eq!(tree.apply(k, v), expected);
                    }
                    Op::Remove(k) => {
                        prop_assert_eq!(tree.remove(k), model.remove(&k));
                        prop_assert_eq!(tree.value_at(k), Concat::IDENTITY);
                    }
                    Op::Query(lo, hi) => {
                        prop_assert_eq!(tree.query(lo..=hi), model_fold(&model, lo, hi));
                    }
                }
                check_invariants(&tree);
                prop_assert_eq!(tree.len(), model.len());
            }
        }

        #[test]
        fn sum_matches_model(entries in prop::collection::vec((any::<i64>(), -1000i64..1000), 0..100),
                             lo in any::<i64>(), hi in any::<i64>()) {
            let (lo, hi) = (lo.min(hi), lo.max(hi));
            let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
            let mut model = BTreeMap::new();
            for (k, v) in entries {
                tree.insert(k, v);
                model.insert(k, v);
            }
            check_invariants(&tree);
            prop_assert_eq!(tree.query(lo..=hi), model.range(lo..=hi).map(|(_, v)| v).sum::<i64>());
            prop_assert_eq!(tree.total(), model.values().sum::<i64>());
            prop_assert_eq!(tree.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
