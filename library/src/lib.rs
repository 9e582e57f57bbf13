//! Forest of dynamic-node segment trees over a fixed value domain `[1, V]`,
//! with destructive merge and split, plus a post-order driver that builds one
//! tree per vertex of a rooted tree.
//!
//! ```
//! use segtree_forest::{domain::Count, SegForest, Tree};
//!
//! let mut forest = SegForest::new(5, Count).unwrap();
//! let (mut a, mut b) = (Tree::empty(), Tree::empty());
//! forest.insert(&mut a, 3, 1).unwrap();
//! forest.insert(&mut a, 5, 1).unwrap();
//! forest.insert(&mut b, 3, 1).unwrap();
//! let merged = forest.merge(a, b);
//! assert_eq!(forest.query(&merged, 1..=5).unwrap(), 3);
//! assert_eq!(forest.query(&merged, 3..=3).unwrap(), 2);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod forest;
pub mod math;
pub mod monoid;
pub mod tree;

pub use config::{ForestConfig, Traversal};
pub use error::{Error, Result};
pub use forest::{Forest, TreeId};
pub use monoid::NodeSpec;
pub use tree::arena::NodeRef;
pub use tree::segtree_merge::{MergeRule, Pointwise, SegForest, Tree};
pub use tree::traversal::post_order::{fold_subtrees, SubtreeFold};
