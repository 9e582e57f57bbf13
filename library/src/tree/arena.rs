use std::num::NonZeroU32;

use crate::config::ForestConfig;
use crate::error::{Error, Result};
use crate::monoid::NodeSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef(NonZeroU32);

impl NodeRef {
    pub fn get(self) -> usize {
        self.0.get() as usize
    }
}

pub struct Node<S: NodeSpec> {
    pub sum: S::X,
    pub lazy: S::F,
    pub children: [Option<NodeRef>; 2],
}

impl<S: NodeSpec> Node<S> {
    pub fn empty(spec: &S) -> Self {
        Self {
            sum: spec.id(),
            lazy: spec.id_action(),
            children: [None; 2],
        }
    }
}

// Append-only node pool. Handles are never reused, so the length of the pool is
// also the number of nodes ever allocated.
pub struct Arena<S: NodeSpec> {
    pool: Vec<Node<S>>,
    max_nodes: usize,
}

impl<S: NodeSpec> Arena<S> {
    pub fn new(spec: &S, config: &ForestConfig) -> Self {
        let mut pool = Vec::with_capacity(config.reserve.saturating_add(1));
        pool.push(Node::empty(spec)); // dummy, keeps handles non-zero
        Self {
            pool,
            max_nodes: config.max_nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.max_nodes.saturating_sub(self.len())
    }

    pub fn ensure_headroom(&self, requested: usize) -> Result<()> {
        if requested > self.remaining() {
            tracing::warn!(
                requested,
                allocated = self.len(),
                max_nodes = self.max_nodes,
                "node arena exhausted"
            );
            return Err(Error::CapacityExceeded {
                requested,
                capacity: self.max_nodes,
            });
        }
        Ok(())
    }

    pub fn alloc(&mut self, node: Node<S>) -> Result<NodeRef> {
        self.ensure_headroom(1)?;
        if self.pool.len() == self.pool.capacity() {
            tracing::debug!(allocated = self.len(), "growing node pool");
        }
        let idx = self.pool.len() as u32;
        self.pool.push(node);
        match NonZeroU32::new(idx) {
            Some(idx) => Ok(NodeRef(idx)),
            None => unreachable!("slot 0 is reserved for the dummy node"),
        }
    }

    pub fn get(&self, u: NodeRef) -> &Node<S> {
        &self.pool[u.get()]
    }

    pub fn get_mut(&mut self, u: NodeRef) -> &mut Node<S> {
        &mut self.pool[u.get()]
    }

    pub fn children(&self, u: NodeRef) -> [Option<NodeRef>; 2] {
        self.get(u).children
    }
}
