//! Insertion, subtree selection and the overflow repair that follows each insertion.

use geo_traits::RectTrait;

use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;
use crate::rtree::index::RTree;
use crate::rtree::node::{Entry, NodeId, NodeKind};

impl<N: IndexableNum, T> RTree<N, T> {
    /// Add an entry with the given bounding box and payload.
    ///
    /// The tree may restructure itself; after this returns no node holds more than
    /// [`RTree::max_elements`] entries or children.
    pub fn insert(&mut self, bbox: BBox<N>, data: T) {
        let entry = Entry::new(bbox, data);
        let root = self.root;
        if self.nodes[root].len == 0 {
            self.nodes.set_kind(root, NodeKind::Leaf(vec![entry]));
        } else {
            self.insert_node(root, entry);
        }
    }

    /// Add an entry whose bounding box is taken from any [`RectTrait`] implementation.
    pub fn insert_rect(&mut self, rect: &impl RectTrait<T = N>, data: T) {
        self.insert(BBox::from_rect(rect), data)
    }

    /// Place `entry` in the subtree rooted at `id`, then repair overflow bottom-up.
    ///
    /// A node without a parent that ends up holding more than `max_elements` entries is split in
    /// place: this is how the root grows a level, and how split groups that overflow while they
    /// are being filled get divided again.
    pub(crate) fn insert_node(&mut self, id: NodeId, entry: Entry<N, T>) {
        let pending = match &mut self.nodes[id].kind {
            NodeKind::Leaf(entries) => {
                entries.push(entry);
                None
            }
            NodeKind::Internal(_) => Some(entry),
        };

        if let Some(entry) = pending {
            let child = self.choose_subtree(id, &entry.bbox);
            self.insert_node(child, entry);
            self.split_overflowing_children(id);
        }
        self.nodes.refresh(id);

        if self.nodes[id].parent.is_none() && self.nodes[id].len > self.max_elements() {
            self.split_in_place(id);
        }
    }

    /// Pick the child of internal node `id` that should receive an entry with box `bbox`.
    ///
    /// A child already containing the box wins outright (first match). Otherwise the child whose
    /// box would have the smallest area after covering the entry wins, with ties going to the
    /// child holding fewer entries. This compares resulting areas, not enlargements.
    pub(crate) fn choose_subtree(&self, id: NodeId, bbox: &BBox<N>) -> NodeId {
        let children = self.nodes[id].children();
        debug_assert!(!children.is_empty(), "choose_subtree on a node without children");
        if let [only] = children {
            return *only;
        }

        if let Some(child) = children
            .iter()
            .find(|child| self.nodes[**child].bbox.contains(bbox))
        {
            return *child;
        }

        let mut best = children[0];
        let mut best_area = self.nodes[best].bbox.union(bbox).area();
        for &child in &children[1..] {
            let area = self.nodes[child].bbox.union(bbox).area();
            if area < best_area
                || (area == best_area && self.nodes[child].len < self.nodes[best].len)
            {
                best = child;
                best_area = area;
            }
        }
        best
    }

    /// Replace every child of `id` whose subtree holds more than `max_elements` entries with the
    /// two halves of its split, appended at the end of the child list.
    fn split_overflowing_children(&mut self, id: NodeId) {
        let max_elements = self.max_elements();
        // Visit the latest children first so replacements keep a stable append order.
        let overflowing = self.nodes[id]
            .children()
            .iter()
            .rev()
            .copied()
            .filter(|child| self.nodes[*child].len > max_elements)
            .collect::<Vec<_>>();

        for child in overflowing {
            let (a, b) = self.split_node(child);
            self.nodes.release(child);
            if let NodeKind::Internal(children) = &mut self.nodes[id].kind {
                children.retain(|c| *c != child);
                children.extend([a, b]);
            }
            self.nodes[a].parent = Some(id);
            self.nodes[b].parent = Some(id);
        }
    }

    /// Split a parentless node and make it the parent of both halves.
    fn split_in_place(&mut self, id: NodeId) {
        let was_leaf = self.nodes[id].is_leaf();
        let (a, b) = self.split_node(id);
        self.nodes.set_kind(id, NodeKind::Internal(vec![a, b]));
        if was_leaf && id == self.root {
            log::debug!("root leaf split at {} entries", self.nodes[id].len);
        }
    }
}
