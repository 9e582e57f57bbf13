use crate::error::{Error, Result};

// NodeRef is a NonZeroU32, and slot 0 is the dummy
pub const MAX_NODES: usize = u32::MAX as usize - 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Traversal {
    /// Plain recursion on the call stack. Fine for shallow trees.
    Recursive,
    /// Explicit frame stack, safe on chains of any length.
    #[default]
    Iterative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForestConfig {
    /// Positions are `1..=domain`.
    pub domain: usize,
    pub max_nodes: usize,
    /// Nodes to preallocate.
    pub reserve: usize,
    pub traversal: Traversal,
}

impl ForestConfig {
    pub fn new(domain: usize) -> Self {
        Self {
            domain,
            max_nodes: MAX_NODES,
            reserve: 0,
            traversal: Traversal::default(),
        }
    }

    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.min(MAX_NODES);
        self
    }

    pub fn reserve(mut self, reserve: usize) -> Self {
        self.reserve = reserve;
        self
    }

    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    // Number of nodes on a root-to-leaf path.
    pub fn height(&self) -> usize {
        (usize::BITS - (self.domain.max(1) - 1).leading_zeros()) as usize + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.domain == 0 {
            return Err(Error::EmptyDomain);
        }
        Ok(())
    }
}
