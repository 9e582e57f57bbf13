use thiserror::Error;

use crate::forest::TreeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The node arena reached `ForestConfig::max_nodes`.
    #[error("node arena exhausted: {requested} more nodes requested, {capacity} allowed in total")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("range {start}..={end} lies outside the value domain 1..={domain}")]
    OutOfDomain {
        start: usize,
        end: usize,
        domain: usize,
    },

    #[error("value domain must contain at least one position")]
    EmptyDomain,

    #[error("tree {0} does not exist or was merged away")]
    InvalidTree(TreeId),

    #[error("cannot merge tree {0} into itself")]
    SelfMerge(TreeId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
