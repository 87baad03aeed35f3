//! Node storage for the tree.
//!
//! Nodes live in an arena and refer to each other through [`NodeId`]s. Each node caches its
//! bounding box and the number of entries in its subtree; [`NodeArena::refresh`] recomputes both
//! from the node's direct content and must be called after every change to that content.

use std::ops::{Index, IndexMut};

use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;

/// One indexed object: a bounding box plus an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<N: IndexableNum, T> {
    pub(crate) bbox: BBox<N>,
    pub(crate) data: T,
}

impl<N: IndexableNum, T> Entry<N, T> {
    /// Create a new entry.
    pub fn new(bbox: BBox<N>, data: T) -> Self {
        Self { bbox, data }
    }

    /// The bounding box this entry is indexed by.
    pub fn bbox(&self) -> &BBox<N> {
        &self.bbox
    }

    /// The payload of this entry.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consume the entry, returning its payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Handle to a node slot in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct NodeId(usize);

/// The content of a node: either entries or child nodes, never both.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind<N: IndexableNum, T> {
    Leaf(Vec<Entry<N, T>>),
    Internal(Vec<NodeId>),
}

impl<N: IndexableNum, T> NodeKind<N, T> {
    /// Number of entries or children held directly.
    pub(crate) fn direct_len(&self) -> usize {
        match self {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData<N: IndexableNum, T> {
    pub(crate) kind: NodeKind<N, T>,
    pub(crate) parent: Option<NodeId>,
    /// Minimum box covering the direct content.
    pub(crate) bbox: BBox<N>,
    /// Number of entries in the whole subtree.
    pub(crate) len: usize,
}

impl<N: IndexableNum, T> NodeData<N, T> {
    fn empty_leaf() -> Self {
        Self {
            kind: NodeKind::Leaf(Vec::new()),
            parent: None,
            bbox: BBox::empty(),
            len: 0,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Child ids of an internal node; empty for a leaf.
    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal(children) => children,
        }
    }

    /// Entries of a leaf node; empty for an internal node.
    pub(crate) fn entries(&self) -> &[Entry<N, T>] {
        match &self.kind {
            NodeKind::Leaf(entries) => entries,
            NodeKind::Internal(_) => &[],
        }
    }
}

/// Slab of nodes with a free list for reuse of released slots.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<N: IndexableNum, T> {
    slots: Vec<NodeData<N, T>>,
    free: Vec<usize>,
}

impl<N: IndexableNum, T> NodeArena<N, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a new parentless node and compute its box and length.
    pub(crate) fn alloc(&mut self, kind: NodeKind<N, T>) -> NodeId {
        let data = NodeData {
            kind,
            ..NodeData::empty_leaf()
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = data;
                NodeId(slot)
            }
            None => {
                self.slots.push(data);
                NodeId(self.slots.len() - 1)
            }
        };
        self.refresh(id);
        id
    }

    /// Return a slot to the free list. Its content is dropped.
    pub(crate) fn release(&mut self, id: NodeId) {
        self.slots[id.0] = NodeData::empty_leaf();
        self.free.push(id.0);
    }

    /// Move the content out of a node, leaving an empty leaf behind.
    pub(crate) fn take_kind(&mut self, id: NodeId) -> NodeKind<N, T> {
        let kind = std::mem::replace(&mut self.slots[id.0].kind, NodeKind::Leaf(Vec::new()));
        self.refresh(id);
        kind
    }

    /// Replace the content of a node and point every new child back at it.
    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind<N, T>) {
        self.slots[id.0].kind = kind;
        self.adopt_children(id);
        self.refresh(id);
    }

    /// Set the parent of every direct child of `id` to `id`.
    pub(crate) fn adopt_children(&mut self, id: NodeId) {
        let children = self.slots[id.0].children().to_vec();
        for child in children {
            self.slots[child.0].parent = Some(id);
        }
    }

    /// Recompute the cached box and subtree length of `id` from its direct content.
    pub(crate) fn refresh(&mut self, id: NodeId) {
        let (bbox, len) = match &self.slots[id.0].kind {
            NodeKind::Leaf(entries) => entries
                .iter()
                .fold((BBox::empty(), 0), |(bbox, len), entry| {
                    (bbox.union(&entry.bbox), len + 1)
                }),
            NodeKind::Internal(children) => {
                children.iter().fold((BBox::empty(), 0), |(bbox, len), child| {
                    let child = &self.slots[child.0];
                    (bbox.union(&child.bbox), len + child.len)
                })
            }
        };
        let node = &mut self.slots[id.0];
        node.bbox = bbox;
        node.len = len;
    }

    /// Number of live nodes.
    pub(crate) fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<N: IndexableNum, T> Index<NodeId> for NodeArena<N, T> {
    type Output = NodeData<N, T>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.slots[id.0]
    }
}

impl<N: IndexableNum, T> IndexMut<NodeId> for NodeArena<N, T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.slots[id.0]
    }
}
