//! Division of an overflowing node into two.

use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;
use crate::rtree::index::RTree;
use crate::rtree::node::{Entry, NodeId, NodeKind};

/// The heuristic used to choose the two seeds of a node split.
///
/// Both heuristics examine every unordered pair of elements in the node, so a split is quadratic
/// in the fan-out either way. They differ in what they consider the "worst" pair to keep together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitStrategy {
    /// Seed with the two elements whose boxes are farthest apart, by [`BBox::separation`].
    Linear,
    /// Seed with the two elements that would waste the most area if placed in the same node, by
    /// [`BBox::wasted_area`].
    #[default]
    Quadratic,
}

impl SplitStrategy {
    #[inline]
    fn seed_score<N: IndexableNum>(self, a: &BBox<N>, b: &BBox<N>) -> f64 {
        match self {
            SplitStrategy::Linear => a.separation(b),
            SplitStrategy::Quadratic => a.wasted_area(b),
        }
    }

    /// Indices `(i, j)` with `i < j` of the highest scoring pair. The first pair found with a
    /// strictly greater score wins.
    pub(crate) fn pick_seeds<N: IndexableNum>(self, boxes: &[BBox<N>]) -> (usize, usize) {
        debug_assert!(boxes.len() >= 2);
        let mut seeds = (0, 1);
        let mut best = f64::NEG_INFINITY;
        for i in 0..boxes.len() {
            for j in i + 1..boxes.len() {
                let score = self.seed_score(&boxes[i], &boxes[j]);
                if score > best {
                    best = score;
                    seeds = (i, j);
                }
            }
        }
        seeds
    }
}

/// Choose which of two groups (0 or 1) receives an element with box `bbox`.
///
/// A group holding at most `min_occupancy` elements is fed first while the other is above it.
/// Otherwise the group whose box would have the smaller area after adding the element wins, with
/// ties going to the group holding fewer elements.
fn pick_group<N: IndexableNum>(
    group_boxes: [BBox<N>; 2],
    counts: [usize; 2],
    bbox: &BBox<N>,
    min_occupancy: usize,
) -> usize {
    let [count_a, count_b] = counts;
    if count_a <= min_occupancy && count_b > min_occupancy {
        return 0;
    }
    if count_b <= min_occupancy && count_a > min_occupancy {
        return 1;
    }

    let area_a = group_boxes[0].union(bbox).area();
    let area_b = group_boxes[1].union(bbox).area();
    if area_a < area_b {
        0
    } else if area_b < area_a {
        1
    } else if count_a <= count_b {
        0
    } else {
        1
    }
}

impl<N: IndexableNum, T> RTree<N, T> {
    /// Move the content of `id` into two new parentless nodes. `id` is left as an empty leaf for
    /// the caller to release or refill.
    ///
    /// # Panics
    ///
    /// If the node holds fewer than two entries or children.
    pub(crate) fn split_node(&mut self, id: NodeId) -> (NodeId, NodeId) {
        let num_elements = self.nodes[id].kind.direct_len();
        assert!(
            num_elements >= 2,
            "cannot split a node holding {} element(s)",
            num_elements
        );

        let (a, b) = match self.nodes.take_kind(id) {
            NodeKind::Leaf(entries) => self.split_leaf(entries),
            NodeKind::Internal(children) => self.split_internal(children),
        };
        log::trace!(
            "{:?} split of {} elements into nodes holding {} and {} entries",
            self.metadata.split_strategy(),
            num_elements,
            self.nodes[a].len,
            self.nodes[b].len
        );
        (a, b)
    }

    fn split_leaf(&mut self, mut entries: Vec<Entry<N, T>>) -> (NodeId, NodeId) {
        let boxes = entries.iter().map(|entry| entry.bbox).collect::<Vec<_>>();
        let (first, second) = self.metadata.split_strategy().pick_seeds(&boxes);
        let seed_b = entries.remove(second);
        let seed_a = entries.remove(first);

        let groups = [
            self.nodes.alloc(NodeKind::Leaf(vec![seed_a])),
            self.nodes.alloc(NodeKind::Leaf(vec![seed_b])),
        ];
        let mut counts = [1, 1];
        let min_occupancy = self.metadata.min_occupancy();
        for entry in entries {
            let group_boxes = [self.nodes[groups[0]].bbox, self.nodes[groups[1]].bbox];
            let side = pick_group(group_boxes, counts, &entry.bbox, min_occupancy);
            counts[side] += 1;
            // The group has no parent yet, so this may split it in place.
            self.insert_node(groups[side], entry);
        }
        (groups[0], groups[1])
    }

    fn split_internal(&mut self, mut children: Vec<NodeId>) -> (NodeId, NodeId) {
        let boxes = children
            .iter()
            .map(|child| self.nodes[*child].bbox)
            .collect::<Vec<_>>();
        let (first, second) = self.metadata.split_strategy().pick_seeds(&boxes);
        let mut group_boxes = [boxes[first], boxes[second]];
        let seed_b = children.remove(second);
        let seed_a = children.remove(first);

        let mut groups = [vec![seed_a], vec![seed_b]];
        let min_occupancy = self.metadata.min_occupancy();
        for child in children {
            let bbox = self.nodes[child].bbox;
            let counts = [groups[0].len(), groups[1].len()];
            let side = pick_group(group_boxes, counts, &bbox, min_occupancy);
            groups[side].push(child);
            group_boxes[side].expand(&bbox);
        }

        let [group_a, group_b] = groups;
        (self.finish_group(group_a), self.finish_group(group_b))
    }

    /// Wrap a group of children into a new node, or hoist the child of a single-member group so
    /// the tree does not grow a level it doesn't need.
    fn finish_group(&mut self, children: Vec<NodeId>) -> NodeId {
        if let [only] = children[..] {
            self.nodes[only].parent = None;
            return only;
        }
        let id = self.nodes.alloc(NodeKind::Internal(children));
        self.nodes.adopt_children(id);
        id
    }
}
