//! In-memory B+ tree index over byte-string keys.
//!
//! # Structure
//!
//! The B+ tree consists of:
//! - Inner nodes: store separator keys and child node ids
//! - Leaf nodes: store key-value pairs, linked left to right for range scans
//!
//! Nodes live in a [`NodeArena`] and refer to each other by [`NodeId`].
//! Keys are compared bytewise (lexicographically).
//!
//! # Usage
//!
//! ```
//! use bptree::btree::Tree;
//!
//! let tree = Tree::new(8)?;
//! tree.set(b"apple".to_vec(), b"red".to_vec())?;
//! tree.set(b"banana".to_vec(), b"yellow".to_vec())?;
//! tree.set(b"cherry".to_vec(), b"dark red".to_vec())?;
//!
//! assert_eq!(tree.get(b"banana")?, Some(b"yellow".to_vec()));
//! assert_eq!(
//!     tree.scan(b"apple", b"banana")?,
//!     vec![b"red".to_vec(), b"yellow".to_vec()]
//! );
//!
//! tree.delete(b"apple")?;
//! assert_eq!(tree.get(b"apple")?, None);
//! # Ok::<(), bptree::btree::TreeError>(())
//! ```

mod arena;
mod inner;
mod leaf;
mod node;
mod scan;
mod tree;
mod validate;

pub use arena::{InsertResult, NodeArena};
pub use leaf::LeafInsert;
pub use node::{InnerNode, LeafNode, MIN_ORDER, Node, NodeId, NodeType, Tuple, min_occupancy};
pub use scan::Scan;
pub use tree::{Tree, TreeError};
pub use validate::{StructuralViolation, TreeShape};
