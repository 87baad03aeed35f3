//! Utilities to traverse the RTree structure.

use core::mem::take;

use geo_traits::RectTrait;

use crate::r#type::IndexableNum;
use crate::rtree::bbox::{BBox, Coord};
use crate::rtree::index::RTree;
use crate::rtree::node::{Entry, NodeData, NodeId};

/// A read-only view onto one node of an [`RTree`].
#[derive(Debug)]
pub struct Node<'a, N: IndexableNum, T> {
    /// The tree that this node is a reference onto
    tree: &'a RTree<N, T>,
    id: NodeId,
}

impl<N: IndexableNum, T> Clone for Node<'_, N, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, T> Copy for Node<'_, N, T> {}

impl<'a, N: IndexableNum, T> Node<'a, N, T> {
    pub(crate) fn new(tree: &'a RTree<N, T>, id: NodeId) -> Self {
        Self { tree, id }
    }

    fn data(&self) -> &'a NodeData<N, T> {
        let tree = self.tree;
        &tree.nodes[self.id]
    }

    /// The minimum box covering everything below this node.
    pub fn bbox(&self) -> BBox<N> {
        self.data().bbox
    }

    /// Get the minimum `x` value of this node.
    pub fn min_x(&self) -> N {
        self.data().bbox.min_x
    }

    /// Get the minimum `y` value of this node.
    pub fn min_y(&self) -> N {
        self.data().bbox.min_y
    }

    /// Get the maximum `x` value of this node.
    pub fn max_x(&self) -> N {
        self.data().bbox.max_x
    }

    /// Get the maximum `y` value of this node.
    pub fn max_y(&self) -> N {
        self.data().bbox.max_y
    }

    /// Returns `true` if this is a leaf node holding entries.
    pub fn is_leaf(&self) -> bool {
        self.data().is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The number of entries in this node's subtree.
    pub fn len(&self) -> usize {
        self.data().len
    }

    /// Returns `true` if there are no entries below this node. Only an empty root can be empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if this node intersects another node.
    pub fn intersects<T2>(&self, other: &Node<'_, N, T2>) -> bool {
        self.bbox().intersects(&other.bbox())
    }

    /// Returns an iterator over the child nodes of this node. Empty for a leaf.
    pub fn children(&self) -> impl Iterator<Item = Node<'a, N, T>> + 'a {
        let tree = self.tree;
        self.data()
            .children()
            .iter()
            .map(move |id| Node::new(tree, *id))
    }

    /// The entries held directly by this node. Empty for an intermediate node.
    pub fn entries(&self) -> &'a [Entry<N, T>] {
        self.data().entries()
    }

    /// The node holding this one, or `None` for the root.
    pub fn parent(&self) -> Option<Node<'a, N, T>> {
        self.data().parent.map(|id| Node::new(self.tree, id))
    }
}

impl<N: IndexableNum, T> RectTrait for Node<'_, N, T> {
    type T = N;
    type CoordType<'b>
        = Coord<N>
    where
        Self: 'b;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x(),
            y: self.min_y(),
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x(),
            y: self.max_y(),
        }
    }
}

/// Depth-first iterator over every entry of a tree.
pub(crate) struct Entries<'a, N: IndexableNum, T> {
    tree: &'a RTree<N, T>,
    stack: Vec<NodeId>,
    current: std::slice::Iter<'a, Entry<N, T>>,
}

impl<'a, N: IndexableNum, T> Entries<'a, N, T> {
    pub(crate) fn new(tree: &'a RTree<N, T>) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
            current: Default::default(),
        }
    }
}

impl<'a, N: IndexableNum, T> Iterator for Entries<'a, N, T> {
    type Item = &'a Entry<N, T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            let tree = self.tree;
            let node = &tree.nodes[self.stack.pop()?];
            self.current = node.entries().iter();
            self.stack.extend(node.children().iter().rev());
        }
    }
}

/// A node or an entry of one of the two trees being intersected.
#[derive(Debug, Clone, Copy)]
enum Element {
    Node(NodeId),
    /// Position of an entry within a leaf.
    Entry(NodeId, usize),
}

fn element_bbox<N: IndexableNum, T>(tree: &RTree<N, T>, element: Element) -> &BBox<N> {
    match element {
        Element::Node(id) => &tree.nodes[id].bbox,
        Element::Entry(leaf, position) => &tree.nodes[leaf].entries()[position].bbox,
    }
}

/// The entries of a leaf or the children of an intermediate node.
fn element_children<N: IndexableNum, T>(
    tree: &RTree<N, T>,
    id: NodeId,
) -> impl Iterator<Item = Element> + '_ {
    let node = &tree.nodes[id];
    (0..node.entries().len())
        .map(move |position| Element::Entry(id, position))
        .chain(node.children().iter().map(|child| Element::Node(*child)))
}

// Adapted from rstar under the MIT/Apache 2 license
// https://github.com/georust/rstar/blob/6c23af0f3acc0c4668ce6c368820e0fa986a65b4/rstar/src/algorithm/intersection_iterator.rs
pub(crate) struct IntersectionIterator<'a, N, T1, T2>
where
    N: IndexableNum,
{
    left: &'a RTree<N, T1>,
    right: &'a RTree<N, T2>,
    todo_list: Vec<(Element, Element)>,
    candidates: Vec<Element>,
}

impl<'a, N, T1, T2> IntersectionIterator<'a, N, T1, T2>
where
    N: IndexableNum,
{
    pub(crate) fn from_trees(left: &'a RTree<N, T1>, right: &'a RTree<N, T2>) -> Self {
        let mut intersections = IntersectionIterator {
            left,
            right,
            todo_list: Vec::new(),
            candidates: Vec::new(),
        };
        if !left.is_empty() && !right.is_empty() {
            intersections.add_intersecting_children(left.root, right.root);
        }
        intersections
    }

    fn push_if_intersecting(&mut self, left: Element, right: Element) {
        if element_bbox(self.left, left).intersects(element_bbox(self.right, right)) {
            self.todo_list.push((left, right));
        }
    }

    fn add_intersecting_children(&mut self, parent1: NodeId, parent2: NodeId) {
        let (left, right) = (self.left, self.right);
        let bbox1 = left.nodes[parent1].bbox;
        let bbox2 = right.nodes[parent2].bbox;
        if !bbox1.intersects(&bbox2) {
            return;
        }

        let children1 = element_children(left, parent1)
            .filter(|c1| element_bbox(left, *c1).intersects(&bbox2));

        let mut children2 = take(&mut self.candidates);
        children2.extend(
            element_children(right, parent2)
                .filter(|c2| element_bbox(right, *c2).intersects(&bbox1)),
        );

        for child1 in children1 {
            for child2 in &children2 {
                self.push_if_intersecting(child1, *child2);
            }
        }

        children2.clear();
        self.candidates = children2;
    }
}

impl<'a, N, T1, T2> Iterator for IntersectionIterator<'a, N, T1, T2>
where
    N: IndexableNum,
{
    type Item = (&'a Entry<N, T1>, &'a Entry<N, T2>);

    fn next(&mut self) -> Option<Self::Item> {
        let (left, right) = (self.left, self.right);
        while let Some(pair) = self.todo_list.pop() {
            match pair {
                (Element::Entry(leaf1, pos1), Element::Entry(leaf2, pos2)) => {
                    return Some((
                        &left.nodes[leaf1].entries()[pos1],
                        &right.nodes[leaf2].entries()[pos2],
                    ))
                }
                (entry @ Element::Entry(..), Element::Node(id)) => element_children(right, id)
                    .for_each(|c| self.push_if_intersecting(entry, c)),
                (Element::Node(id), entry @ Element::Entry(..)) => element_children(left, id)
                    .for_each(|c| self.push_if_intersecting(c, entry)),
                (Element::Node(id1), Element::Node(id2)) => {
                    self.add_intersecting_children(id1, id2)
                }
            }
        }
        None
    }
}
