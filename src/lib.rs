#![doc = include_str!("../README.md")]

mod error;
pub mod rtree;
mod r#type;

pub use error::{RTreeError, Result};
pub use r#type::IndexableNum;
pub use rtree::{BBox, Entry, Node, RTree, RTreeMetadata, SplitStrategy};

#[cfg(test)]
pub(crate) mod test;
