use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;
use crate::rtree::index::RTree;
use crate::rtree::node::{Entry, NodeId, NodeKind};

impl<N: IndexableNum, T: PartialEq> RTree<N, T> {
    /// Remove the first entry whose bounding box and payload both equal the given ones.
    ///
    /// Returns the removed entry, or `None` if no such entry exists.
    ///
    /// Nodes left under-filled are not merged or re-inserted. Empty nodes are dropped, and an
    /// internal node left with a single child is replaced by that child.
    pub fn remove(&mut self, bbox: &BBox<N>, data: &T) -> Option<Entry<N, T>> {
        let root = self.root;
        let entry = self.remove_from(root, bbox, data)?;

        let root_node = &self.nodes[root];
        if root_node.len == 0 {
            self.nodes.set_kind(root, NodeKind::Leaf(Vec::new()));
        } else if let [only] = root_node.children() {
            let only = *only;
            let kind = self.nodes.take_kind(only);
            self.nodes.release(only);
            self.nodes.set_kind(root, kind);
        }

        log::trace!("removed entry, {} remaining", self.len());
        Some(entry)
    }

    fn remove_from(&mut self, id: NodeId, bbox: &BBox<N>, data: &T) -> Option<Entry<N, T>> {
        if !self.nodes[id].bbox.contains(bbox) {
            return None;
        }

        let entry = match &mut self.nodes[id].kind {
            NodeKind::Leaf(entries) => {
                let position = entries
                    .iter()
                    .position(|entry| entry.bbox == *bbox && entry.data == *data)?;
                entries.remove(position)
            }
            NodeKind::Internal(children) => {
                let children = children.clone();
                let (child, entry) = children.into_iter().find_map(|child| {
                    self.remove_from(child, bbox, data)
                        .map(|entry| (child, entry))
                })?;
                self.tidy_child(id, child);
                entry
            }
        };
        self.nodes.refresh(id);
        Some(entry)
    }

    /// Drop `child` from `id` if it is empty, or replace it with its grandchild if it is an
    /// internal node with a single child.
    fn tidy_child(&mut self, id: NodeId, child: NodeId) {
        let child_node = &self.nodes[child];
        let replacement = if child_node.len == 0 {
            None
        } else if let [only] = child_node.children() {
            Some(*only)
        } else {
            return;
        };

        if let NodeKind::Internal(children) = &mut self.nodes[id].kind {
            match replacement {
                Some(grandchild) => {
                    for slot in children.iter_mut().filter(|slot| **slot == child) {
                        *slot = grandchild;
                    }
                }
                None => children.retain(|slot| *slot != child),
            }
        }
        if let Some(grandchild) = replacement {
            self.nodes[grandchild].parent = Some(id);
        }
        self.nodes.release(child);
    }
}
