//! A dynamic R-tree over two-dimensional bounding boxes.

pub mod bbox;
mod index;
mod insert;
pub(crate) mod node;
mod remove;
mod search;
mod split;
pub mod traversal;

pub use bbox::{minimum_covering_box, BBox, Coord};
pub use index::{RTree, RTreeMetadata, DEFAULT_MAX_ELEMENTS};
pub use node::Entry;
pub use split::SplitStrategy;
pub use traversal::Node;
