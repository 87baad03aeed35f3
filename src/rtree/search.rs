use std::cmp::Reverse;
use std::collections::BinaryHeap;

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;
use crate::rtree::index::RTree;
use crate::rtree::node::{Entry, NodeId, NodeKind};
use crate::rtree::traversal::IntersectionIterator;

impl<N: IndexableNum, T> RTree<N, T> {
    /// Search the tree given the provided bounding box.
    ///
    /// Returns every entry whose box intersects the query, in no particular order.
    pub fn search(&self, min_x: N, min_y: N, max_x: N, max_y: N) -> Vec<&Entry<N, T>> {
        let mut results = vec![];
        self.search_into(&BBox::new(min_x, min_y, max_x, max_y), &mut results);
        results
    }

    /// Search the tree given the provided rectangle.
    pub fn search_rect(&self, rect: &impl RectTrait<T = N>) -> Vec<&Entry<N, T>> {
        let mut results = vec![];
        self.search_into(&BBox::from_rect(rect), &mut results);
        results
    }

    /// Append every entry whose box intersects `region` to `results`.
    ///
    /// Subtrees whose box does not intersect the region are skipped.
    pub fn search_into<'a>(&'a self, region: &BBox<N>, results: &mut Vec<&'a Entry<N, T>>) {
        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[NodeId; 32]> = TinyVec::new();
        stack.push(self.root);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.bbox.intersects(region) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(entries) => results.extend(
                    entries
                        .iter()
                        .filter(|entry| entry.bbox.intersects(region)),
                ),
                NodeKind::Internal(children) => stack.extend(children.iter().copied()),
            }
        }
    }

    /// Search entries in order of distance from the given point.
    ///
    /// Distances are measured from the point to each entry's bounding box, so every entry whose
    /// box contains the point comes first. `max_results` caps the number of returned entries and
    /// `max_distance` drops entries farther away than it.
    ///
    /// ```
    /// use geo_rtree::{BBox, RTree};
    ///
    /// let mut tree = RTree::new();
    /// tree.insert(BBox::new(0., 0., 2., 2.), 0);
    /// tree.insert(BBox::new(1., 1., 3., 3.), 1);
    /// tree.insert(BBox::new(2., 2., 4., 4.), 2);
    ///
    /// let results = tree.neighbors(5., 5., None, None);
    /// let ids: Vec<_> = results.iter().map(|e| *e.data()).collect();
    /// assert_eq!(ids, vec![2, 1, 0]);
    /// ```
    pub fn neighbors(
        &self,
        x: N,
        y: N,
        max_results: Option<usize>,
        max_distance: Option<N>,
    ) -> Vec<&Entry<N, T>> {
        let (x, y) = (x.as_f64(), y.as_f64());
        let max_dist_squared = max_distance.map_or(f64::INFINITY, |max_distance| {
            let max_distance = max_distance.as_f64();
            max_distance * max_distance
        });

        let mut results = vec![];
        let mut queue = BinaryHeap::new();
        if !self.is_empty() {
            queue.push(Reverse(NeighborNode {
                dist: self.nodes[self.root].bbox.distance_squared_to_point(x, y),
                item: Neighbor::Node(self.root),
            }));
        }

        while let Some(Reverse(NeighborNode { dist, item })) = queue.pop() {
            if dist > max_dist_squared
                || max_results.is_some_and(|max_results| results.len() >= max_results)
            {
                break;
            }

            match item {
                Neighbor::Entry(entry) => results.push(entry),
                Neighbor::Node(id) => match &self.nodes[id].kind {
                    NodeKind::Leaf(entries) => {
                        for entry in entries {
                            queue.push(Reverse(NeighborNode {
                                dist: entry.bbox.distance_squared_to_point(x, y),
                                item: Neighbor::Entry(entry),
                            }));
                        }
                    }
                    NodeKind::Internal(children) => {
                        for child in children {
                            queue.push(Reverse(NeighborNode {
                                dist: self.nodes[*child].bbox.distance_squared_to_point(x, y),
                                item: Neighbor::Node(*child),
                            }));
                        }
                    }
                },
            }
        }

        results
    }

    /// Search entries in order of distance from the given coordinate.
    pub fn neighbors_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        max_results: Option<usize>,
        max_distance: Option<N>,
    ) -> Vec<&Entry<N, T>> {
        self.neighbors(coord.x(), coord.y(), max_results, max_distance)
    }

    /// Returns an iterator over the entries in this and another tree whose boxes intersect.
    ///
    /// Each returned pair is of the form `(left, right)`, where `left` comes from this tree and
    /// `right` from `other`.
    pub fn intersection_candidates_with_other_tree<'a, T2>(
        &'a self,
        other: &'a RTree<N, T2>,
    ) -> impl Iterator<Item = (&'a Entry<N, T>, &'a Entry<N, T2>)> + 'a {
        IntersectionIterator::from_trees(self, other)
    }
}

/// Either a node still to expand or an entry ready to be reported.
enum Neighbor<'a, N: IndexableNum, T> {
    Node(NodeId),
    Entry(&'a Entry<N, T>),
}

/// A wrapper around a node or entry and its distance for use in the priority queue.
struct NeighborNode<'a, N: IndexableNum, T> {
    dist: f64,
    item: Neighbor<'a, N, T>,
}

impl<N: IndexableNum, T> PartialEq for NeighborNode<'_, N, T> {
    fn eq(&self, other: &Self) -> bool {
        self.dist.total_cmp(&other.dist).is_eq()
    }
}

impl<N: IndexableNum, T> Eq for NeighborNode<'_, N, T> {}

impl<N: IndexableNum, T> Ord for NeighborNode<'_, N, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist.total_cmp(&other.dist)
    }
}

impl<N: IndexableNum, T> PartialOrd for NeighborNode<'_, N, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
