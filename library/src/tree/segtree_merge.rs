// Dynamic-node segment trees over the value domain [1, V], sharing one arena so
// that trees can be merged and split in amortized O(log V).
// https://codeforces.com/blog/entry/83969

use std::ops::{Bound, RangeBounds};

use crate::config::ForestConfig;
use crate::error::{Error, Result};
use crate::monoid::NodeSpec;
use crate::tree::arena::{Arena, Node, NodeRef};

pub mod merge;
pub mod split;

pub use merge::{MergeRule, Pointwise};

/// Owned root of one logical segment tree.
///
/// Deliberately neither `Clone` nor `Copy`: merging and splitting consume
/// trees, so a root that was merged away cannot be used again.
///
/// A `Tree` only means something to the `SegForest` that built it. Handing it
/// to another forest reads that forest's unrelated nodes, or panics on an
/// index past its arena. Callers holding several forests should keep each
/// forest's trees together with it, as `Forest` does.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tree {
    root: Option<NodeRef>,
}

impl Tree {
    pub const fn empty() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeRef> {
        self.root
    }

    pub fn take(&mut self) -> Tree {
        std::mem::take(self)
    }
}

pub struct SegForest<S: NodeSpec> {
    config: ForestConfig,
    arena: Arena<S>,
    spec: S,
}

impl<S: NodeSpec> SegForest<S> {
    pub fn new(domain: usize, spec: S) -> Result<Self> {
        Self::with_config(ForestConfig::new(domain), spec)
    }

    pub fn with_config(config: ForestConfig, spec: S) -> Result<Self> {
        config.validate()?;
        let arena = Arena::new(&spec, &config);
        Ok(Self {
            config,
            arena,
            spec,
        })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn domain(&self) -> usize {
        self.config.domain
    }

    pub fn spec(&self) -> &S {
        &self.spec
    }

    // Number of nodes ever allocated.
    pub fn allocated(&self) -> usize {
        self.arena.len()
    }

    // Inclusive [start, end] inside the domain, or None for an empty range.
    pub(crate) fn resolve(&self, range: impl RangeBounds<usize>) -> Result<Option<(usize, usize)>> {
        let domain = self.domain();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 1,
        };
        let end_excl = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => domain + 1,
        };
        if start >= end_excl {
            return Ok(None);
        }
        if start < 1 || end_excl > domain + 1 {
            return Err(Error::OutOfDomain {
                start,
                end: end_excl - 1,
                domain,
            });
        }
        Ok(Some((start, end_excl - 1)))
    }

    pub(crate) fn sum_or_id(&self, u: Option<NodeRef>) -> S::X {
        match u {
            Some(u) => self.arena.get(u).sum.clone(),
            None => self.spec.id(),
        }
    }

    pub(crate) fn push_up(&mut self, u: NodeRef) {
        let [left, right] = self.arena.children(u);
        let sum = match (left, right) {
            (Some(l), Some(r)) => self
                .spec
                .combine(&self.arena.get(l).sum, &self.arena.get(r).sum),
            (Some(c), None) | (None, Some(c)) => self.arena.get(c).sum.clone(),
            (None, None) => self.spec.id(),
        };
        self.arena.get_mut(u).sum = sum;
    }

    pub(crate) fn apply_node(&mut self, u: NodeRef, action: &S::F) {
        let node = self.arena.get(u);
        let sum = self.spec.apply(action, &node.sum);
        let lazy = self.spec.compose(action, &node.lazy);
        let node = self.arena.get_mut(u);
        node.sum = sum;
        node.lazy = lazy;
    }

    pub(crate) fn push_down(&mut self, u: NodeRef) {
        let id_action = self.spec.id_action();
        if self.arena.get(u).lazy == id_action {
            return;
        }
        let lazy = std::mem::replace(&mut self.arena.get_mut(u).lazy, id_action);
        for c in self.arena.children(u).into_iter().flatten() {
            self.apply_node(c, &lazy);
        }
    }

    pub fn insert(&mut self, tree: &mut Tree, pos: usize, value: S::V) -> Result<()> {
        if pos < 1 || pos > self.domain() {
            return Err(Error::OutOfDomain {
                start: pos,
                end: pos,
                domain: self.domain(),
            });
        }
        self.arena.ensure_headroom(self.missing_on_path(tree.root, pos))?;
        tree.root = Some(self.insert_rec(tree.root, 1, self.domain(), pos, value)?);
        Ok(())
    }

    // Nodes `insert` will allocate: the absent part of the root-to-leaf path.
    fn missing_on_path(&self, mut u: Option<NodeRef>, pos: usize) -> usize {
        let (mut lo, mut hi) = (1, self.domain());
        let mut missing = 0;
        loop {
            if u.is_none() {
                missing += 1;
            }
            if lo == hi {
                return missing;
            }
            let mid = lo + (hi - lo) / 2;
            let side = usize::from(pos > mid);
            u = u.and_then(|v| self.arena.children(v)[side]);
            if side == 0 {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
    }

    fn insert_rec(
        &mut self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        pos: usize,
        value: S::V,
    ) -> Result<NodeRef> {
        let u = match u {
            Some(u) => u,
            None => self.arena.alloc(Node::empty(&self.spec))?,
        };
        if lo == hi {
            let node = self.arena.get_mut(u);
            self.spec.update_leaf(&mut node.sum, pos, value);
            return Ok(u);
        }
        self.push_down(u);
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        if pos <= mid {
            let left = self.insert_rec(left, lo, mid, pos, value)?;
            self.arena.get_mut(u).children[0] = Some(left);
        } else {
            let right = self.insert_rec(right, mid + 1, hi, pos, value)?;
            self.arena.get_mut(u).children[1] = Some(right);
        }
        self.push_up(u);
        Ok(u)
    }

    pub fn total(&self, tree: &Tree) -> S::X {
        self.sum_or_id(tree.root)
    }

    pub fn query(&mut self, tree: &Tree, range: impl RangeBounds<usize>) -> Result<S::X> {
        Ok(match self.resolve(range)? {
            Some((start, end)) => self.query_rec(tree.root, 1, self.domain(), start, end),
            None => self.spec.id(),
        })
    }

    fn query_rec(
        &mut self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        start: usize,
        end: usize,
    ) -> S::X {
        let Some(u) = u else {
            return self.spec.id();
        };
        if end < lo || hi < start {
            return self.spec.id();
        }
        if start <= lo && hi <= end {
            return self.arena.get(u).sum.clone();
        }
        self.push_down(u);
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        if end <= mid {
            self.query_rec(left, lo, mid, start, end)
        } else if mid < start {
            self.query_rec(right, mid + 1, hi, start, end)
        } else {
            let l = self.query_rec(left, lo, mid, start, end);
            let r = self.query_rec(right, mid + 1, hi, start, end);
            self.spec.combine(&l, &r)
        }
    }

    // Applies `action` to every populated position of the tree.
    pub fn apply(&mut self, tree: &mut Tree, action: &S::F) {
        if let Some(root) = tree.root {
            self.apply_node(root, action);
        }
    }

    // Applies `action` to every populated position inside `range`.
    pub fn apply_range(
        &mut self,
        tree: &mut Tree,
        range: impl RangeBounds<usize>,
        action: &S::F,
    ) -> Result<()> {
        if let Some((start, end)) = self.resolve(range)? {
            self.apply_range_rec(tree.root, 1, self.domain(), start, end, action);
        }
        Ok(())
    }

    fn apply_range_rec(
        &mut self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        start: usize,
        end: usize,
        action: &S::F,
    ) {
        let Some(u) = u else { return };
        if end < lo || hi < start {
            return;
        }
        if start <= lo && hi <= end {
            self.apply_node(u, action);
            return;
        }
        self.push_down(u);
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        self.apply_range_rec(left, lo, mid, start, end, action);
        self.apply_range_rec(right, mid + 1, hi, start, end, action);
        self.push_up(u);
    }

    // Populated leaves in increasing position order.
    pub fn leaves(&mut self, tree: &Tree) -> Vec<(usize, S::X)> {
        let mut res = vec![];
        self.leaves_rec(tree.root, 1, self.domain(), &mut res);
        res
    }

    fn leaves_rec(
        &mut self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        res: &mut Vec<(usize, S::X)>,
    ) {
        let Some(u) = u else { return };
        if lo == hi {
            res.push((lo, self.arena.get(u).sum.clone()));
            return;
        }
        self.push_down(u);
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        self.leaves_rec(left, lo, mid, res);
        self.leaves_rec(right, mid + 1, hi, res);
    }
}

impl<S: NodeSpec> SegForest<S>
where
    S::X: PartialEq,
{
    // Every internal node has a child and holds apply(lazy, combine(children)).
    pub fn is_consistent(&self, tree: &Tree) -> bool {
        self.is_consistent_rec(tree.root, 1, self.domain())
    }

    fn is_consistent_rec(&self, u: Option<NodeRef>, lo: usize, hi: usize) -> bool {
        let Some(u) = u else { return true };
        if lo == hi {
            return true;
        }
        let node = self.arena.get(u);
        let [left, right] = node.children;
        if left.is_none() && right.is_none() {
            return false;
        }
        let combined = self
            .spec
            .combine(&self.sum_or_id(left), &self.sum_or_id(right));
        let mid = lo + (hi - lo) / 2;
        self.spec.apply(&node.lazy, &combined) == node.sum
            && self.is_consistent_rec(left, lo, mid)
            && self.is_consistent_rec(right, mid + 1, hi)
    }
}
