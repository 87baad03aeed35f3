use crate::error::{RTreeError, Result};
use crate::r#type::IndexableNum;
use crate::rtree::bbox::BBox;
use crate::rtree::node::{Entry, NodeArena, NodeId, NodeKind};
use crate::rtree::split::SplitStrategy;
use crate::rtree::traversal::{Entries, Node};

/// The default fan-out used by [`RTree::new`]
pub const DEFAULT_MAX_ELEMENTS: usize = 16;

/// Construction parameters of an [`RTree`]. Both values are fixed for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RTreeMetadata {
    max_elements: usize,
    split_strategy: SplitStrategy,
}

impl RTreeMetadata {
    /// Validate and create new metadata.
    ///
    /// Fails if `max_elements < 2`: a node must be able to hold at least the two seeds of a
    /// split.
    pub fn try_new(max_elements: usize, split_strategy: SplitStrategy) -> Result<Self> {
        if max_elements < 2 {
            return Err(RTreeError::InvalidMaxElements(max_elements));
        }
        Ok(Self {
            max_elements,
            split_strategy,
        })
    }

    /// The maximum number of entries (leaf) or children (internal) a node may hold.
    pub fn max_elements(&self) -> usize {
        self.max_elements
    }

    /// The heuristic used to divide an overflowing node.
    pub fn split_strategy(&self) -> SplitStrategy {
        self.split_strategy
    }

    /// Number of elements a split result must receive before area-based assignment resumes.
    pub(crate) fn min_occupancy(&self) -> usize {
        (self.max_elements / 3).max(1)
    }
}

impl Default for RTreeMetadata {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
            split_strategy: SplitStrategy::default(),
        }
    }
}

/// A dynamic R-tree over the bounding boxes of entries carrying a payload `T`.
///
/// ```
/// use geo_rtree::{BBox, RTree, SplitStrategy};
///
/// let mut tree = RTree::try_new(4, SplitStrategy::Linear).unwrap();
/// tree.insert(BBox::new(0., 0., 2., 2.), "a");
/// tree.insert(BBox::new(1., 1., 3., 3.), "b");
/// tree.insert(BBox::new(8., 8., 9., 9.), "c");
///
/// let mut found: Vec<_> = tree.search(0., 0., 1.5, 1.5).into_iter().map(|e| *e.data()).collect();
/// found.sort();
/// assert_eq!(found, vec!["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct RTree<N: IndexableNum, T> {
    pub(crate) nodes: NodeArena<N, T>,
    pub(crate) root: NodeId,
    pub(crate) metadata: RTreeMetadata,
}

impl<N: IndexableNum, T> RTree<N, T> {
    /// Create an empty tree with the default fan-out and split strategy.
    pub fn new() -> Self {
        Self::from_metadata(RTreeMetadata::default())
    }

    /// Create an empty tree with the provided fan-out and split strategy.
    pub fn try_new(max_elements: usize, split_strategy: SplitStrategy) -> Result<Self> {
        let metadata = RTreeMetadata::try_new(max_elements, split_strategy)?;
        Ok(Self::from_metadata(metadata))
    }

    /// Create an empty tree from validated metadata.
    pub fn from_metadata(metadata: RTreeMetadata) -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.alloc(NodeKind::Leaf(Vec::new()));
        Self {
            nodes,
            root,
            metadata,
        }
    }

    /// Access the underlying [RTreeMetadata] of this instance.
    pub fn metadata(&self) -> &RTreeMetadata {
        &self.metadata
    }

    /// The maximum number of elements in each node.
    pub fn max_elements(&self) -> usize {
        self.metadata.max_elements()
    }

    /// The total number of entries in the tree.
    pub fn len(&self) -> usize {
        self.nodes[self.root].len
    }

    /// Returns `true` if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of levels on the longest path from the root to a leaf. An empty tree has
    /// height 1.
    ///
    /// Leaves are not guaranteed to sit at a uniform depth: splits that would leave a node with a
    /// single child hoist that child instead.
    pub fn height(&self) -> usize {
        self.depth(self.root)
    }

    fn depth(&self, id: NodeId) -> usize {
        1 + self.nodes[id]
            .children()
            .iter()
            .map(|child| self.depth(*child))
            .max()
            .unwrap_or(0)
    }

    /// The minimum box covering every entry, or `None` for an empty tree.
    pub fn bounds(&self) -> Option<BBox<N>> {
        let bbox = self.nodes[self.root].bbox;
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Iterate over every entry in the tree, in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<N, T>> + '_ {
        Entries::new(self)
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Node<'_, N, T> {
        Node::new(self, self.root)
    }

    /// Remove every entry, keeping the metadata.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(NodeKind::Leaf(Vec::new()));
    }
}

impl<N: IndexableNum, T> Default for RTree<N, T> {
    fn default() -> Self {
        Self::new()
    }
}
