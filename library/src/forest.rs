// Id-addressed front end over `SegForest`, for callers that keep their trees in
// tables rather than owning `Tree` values directly.

use std::fmt;
use std::ops::RangeBounds;

use crate::config::ForestConfig;
use crate::error::{Error, Result};
use crate::monoid::NodeSpec;
use crate::tree::segtree_merge::{MergeRule, Pointwise, SegForest, Tree};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u32);

impl TreeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Forest<S: NodeSpec> {
    engine: SegForest<S>,
    // None once merged away
    slots: Vec<Option<Tree>>,
}

impl<S: NodeSpec> Forest<S> {
    pub fn new(domain: usize, spec: S) -> Result<Self> {
        Self::with_config(ForestConfig::new(domain), spec)
    }

    pub fn with_config(config: ForestConfig, spec: S) -> Result<Self> {
        Ok(Self {
            engine: SegForest::with_config(config, spec)?,
            slots: vec![],
        })
    }

    pub fn engine(&mut self) -> &mut SegForest<S> {
        &mut self.engine
    }

    fn register(&mut self, tree: Tree) -> TreeId {
        let id = TreeId(self.slots.len() as u32);
        self.slots.push(Some(tree));
        id
    }

    pub fn create(&mut self) -> TreeId {
        self.register(Tree::empty())
    }

    fn tree(&self, id: TreeId) -> Result<&Tree> {
        match self.slots.get(id.index()) {
            Some(Some(tree)) => Ok(tree),
            _ => Err(Error::InvalidTree(id)),
        }
    }

    fn tree_mut(&mut self, id: TreeId) -> Result<&mut Tree> {
        match self.slots.get_mut(id.index()) {
            Some(Some(tree)) => Ok(tree),
            _ => Err(Error::InvalidTree(id)),
        }
    }

    pub fn is_live(&self, id: TreeId) -> bool {
        self.tree(id).is_ok()
    }

    pub fn insert(&mut self, id: TreeId, pos: usize, value: S::V) -> Result<()> {
        let tree = match self.slots.get_mut(id.index()) {
            Some(Some(tree)) => tree,
            _ => return Err(Error::InvalidTree(id)),
        };
        self.engine.insert(tree, pos, value)
    }

    pub fn query(&mut self, id: TreeId, range: impl RangeBounds<usize>) -> Result<S::X> {
        let tree = match self.slots.get(id.index()) {
            Some(Some(tree)) => tree,
            _ => return Err(Error::InvalidTree(id)),
        };
        self.engine.query(tree, range)
    }

    pub fn total(&self, id: TreeId) -> Result<S::X> {
        Ok(self.engine.total(self.tree(id)?))
    }

    pub fn leaves(&mut self, id: TreeId) -> Result<Vec<(usize, S::X)>> {
        let tree = match self.slots.get(id.index()) {
            Some(Some(tree)) => tree,
            _ => return Err(Error::InvalidTree(id)),
        };
        Ok(self.engine.leaves(tree))
    }

    pub fn apply_range(
        &mut self,
        id: TreeId,
        range: impl RangeBounds<usize>,
        action: &S::F,
    ) -> Result<()> {
        let tree = match self.slots.get_mut(id.index()) {
            Some(Some(tree)) => tree,
            _ => return Err(Error::InvalidTree(id)),
        };
        self.engine.apply_range(tree, range, action)
    }

    // Folds `other` into `id`; `other` is retired afterwards.
    pub fn merge_into(&mut self, id: TreeId, other: TreeId) -> Result<()> {
        self.merge_into_with(id, other, &Pointwise)
    }

    pub fn merge_into_with<R: MergeRule<S>>(
        &mut self,
        id: TreeId,
        other: TreeId,
        rule: &R,
    ) -> Result<()> {
        if id == other {
            return Err(Error::SelfMerge(id));
        }
        self.tree(id)?;
        self.tree(other)?;
        let rhs = self.slots[other.index()].take().unwrap_or_default();
        let lhs = self.tree_mut(id)?.take();
        let merged = self.engine.merge_with(lhs, rhs, rule);
        self.slots[id.index()] = Some(merged);
        Ok(())
    }

    pub fn split_out(&mut self, id: TreeId, range: impl RangeBounds<usize>) -> Result<TreeId> {
        let tree = match self.slots.get_mut(id.index()) {
            Some(Some(tree)) => tree,
            _ => return Err(Error::InvalidTree(id)),
        };
        let taken = self.engine.split_off(tree, range)?;
        Ok(self.register(taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Count;

    #[test]
    fn four_operations() {
        let mut forest = Forest::new(5, Count).unwrap();
        let a = forest.create();
        let b = forest.create();
        forest.insert(a, 3, 1).unwrap();
        forest.insert(a, 5, 1).unwrap();
        forest.insert(b, 3, 1).unwrap();
        forest.merge_into(a, b).unwrap();
        assert_eq!(forest.query(a, 1..=5).unwrap(), 3);
        assert_eq!(forest.query(a, 3..=3).unwrap(), 2);
        assert_eq!(forest.query(a, 4..=4).unwrap(), 0);

        let c = forest.split_out(a, 4..).unwrap();
        assert_eq!(forest.leaves(c).unwrap(), vec![(5, 1)]);
        assert_eq!(forest.leaves(a).unwrap(), vec![(3, 2)]);
        assert_eq!(forest.total(a).unwrap(), 2);
    }

    #[test]
    fn retired_ids_are_rejected() {
        let mut forest = Forest::new(4, Count).unwrap();
        let a = forest.create();
        let b = forest.create();
        forest.insert(b, 2, 1).unwrap();
        forest.merge_into(a, b).unwrap();
        assert!(!forest.is_live(b));
        assert_eq!(forest.insert(b, 1, 1), Err(Error::InvalidTree(b)));
        assert_eq!(forest.query(b, ..), Err(Error::InvalidTree(b)));
        assert_eq!(forest.merge_into(a, b), Err(Error::InvalidTree(b)));
        assert_eq!(forest.merge_into(a, a), Err(Error::SelfMerge(a)));
        assert_eq!(forest.query(a, ..).unwrap(), 1);
        assert_eq!(forest.query(TreeId(7), ..), Err(Error::InvalidTree(TreeId(7))));
    }
}
