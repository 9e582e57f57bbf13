use crate::monoid::NodeSpec;
use crate::tree::arena::NodeRef;

use super::{SegForest, Tree};

// How two trees over the same range fold into one.
//
// `Extra` is whatever a subtree needs to know about the parts of both trees
// outside its own range. Pointwise folds need nothing; branching rules such as
// "max with probability p" need the masses on either side.
pub trait MergeRule<S: NodeSpec> {
    type Extra;

    fn init(&self, spec: &S) -> Self::Extra;

    // Extras for the [left, right] halves, given the children sums of both
    // trees (identity for absent children).
    fn descend(&self, spec: &S, extra: &Self::Extra, lhs: [&S::X; 2], rhs: [&S::X; 2])
        -> [Self::Extra; 2];

    // Tag applied to a lhs subtree whose range is empty on the rhs side.
    fn lone_lhs(&self, spec: &S, extra: &Self::Extra) -> S::F;
    fn lone_rhs(&self, spec: &S, extra: &Self::Extra) -> S::F;

    fn leaves(&self, spec: &S, extra: &Self::Extra, lhs: &S::X, rhs: &S::X) -> S::X;
}

// Plain union: leaves at the same position collapse with `merge_leaves`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pointwise;

impl<S: NodeSpec> MergeRule<S> for Pointwise {
    type Extra = ();

    fn init(&self, _: &S) {}

    fn descend(&self, _: &S, _: &(), _: [&S::X; 2], _: [&S::X; 2]) -> [(); 2] {
        [(), ()]
    }

    fn lone_lhs(&self, spec: &S, _: &()) -> S::F {
        spec.id_action()
    }

    fn lone_rhs(&self, spec: &S, _: &()) -> S::F {
        spec.id_action()
    }

    fn leaves(&self, spec: &S, _: &(), lhs: &S::X, rhs: &S::X) -> S::X {
        spec.merge_leaves(lhs, rhs)
    }
}

impl<S: NodeSpec> SegForest<S> {
    pub fn merge(&mut self, lhs: Tree, rhs: Tree) -> Tree {
        self.merge_with(lhs, rhs, &Pointwise)
    }

    // Destructive: nodes of `rhs` are either spliced into the result or become
    // unreachable. The result reuses the lhs nodes wherever both sides overlap.
    // Total work over a bottom-up fold of n insertions is O(n log V).
    pub fn merge_with<R: MergeRule<S>>(&mut self, lhs: Tree, rhs: Tree, rule: &R) -> Tree {
        let extra = rule.init(&self.spec);
        let root = self.merge_rec(lhs.root, rhs.root, 1, self.domain(), rule, &extra);
        Tree { root }
    }

    fn merge_rec<R: MergeRule<S>>(
        &mut self,
        lhs: Option<NodeRef>,
        rhs: Option<NodeRef>,
        lo: usize,
        hi: usize,
        rule: &R,
        extra: &R::Extra,
    ) -> Option<NodeRef> {
        let (a, b) = match (lhs, rhs) {
            (None, None) => return None,
            (Some(a), None) => {
                let action = rule.lone_lhs(&self.spec, extra);
                if action != self.spec.id_action() {
                    self.apply_node(a, &action);
                }
                return Some(a);
            }
            (None, Some(b)) => {
                let action = rule.lone_rhs(&self.spec, extra);
                if action != self.spec.id_action() {
                    self.apply_node(b, &action);
                }
                return Some(b);
            }
            (Some(a), Some(b)) => (a, b),
        };

        if lo == hi {
            let sum = rule.leaves(
                &self.spec,
                extra,
                &self.arena.get(a).sum,
                &self.arena.get(b).sum,
            );
            let id_action = self.spec.id_action();
            let node = self.arena.get_mut(a);
            node.sum = sum;
            node.lazy = id_action;
            return Some(a);
        }

        self.push_down(a);
        self.push_down(b);
        let [al, ar] = self.arena.children(a);
        let [bl, br] = self.arena.children(b);
        let [extra_left, extra_right] = {
            let sums = [al, ar, bl, br].map(|c| self.sum_or_id(c));
            rule.descend(
                &self.spec,
                extra,
                [&sums[0], &sums[1]],
                [&sums[2], &sums[3]],
            )
        };

        let mid = lo + (hi - lo) / 2;
        let left = self.merge_rec(al, bl, lo, mid, rule, &extra_left);
        let right = self.merge_rec(ar, br, mid + 1, hi, rule, &extra_right);
        self.arena.get_mut(a).children = [left, right];
        self.push_up(a);
        Some(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Count, Mode};

    #[test]
    fn lhs_nodes_survive() {
        let mut forest = SegForest::new(8, Count).unwrap();
        let mut a = Tree::empty();
        let mut b = Tree::empty();
        forest.insert(&mut a, 2, 1).unwrap();
        forest.insert(&mut b, 7, 1).unwrap();
        let root_a = a.root();
        let merged = forest.merge(a, b);
        assert_eq!(merged.root(), root_a);

        let c = Tree::empty();
        let mut d = Tree::empty();
        forest.insert(&mut d, 1, 1).unwrap();
        let root_d = d.root();
        assert_eq!(forest.merge(c, d).root(), root_d);
        assert!(forest.merge(Tree::empty(), Tree::empty()).is_empty());
    }

    #[test]
    fn merge_never_allocates() {
        let mut forest = SegForest::new(64, Count).unwrap();
        let mut trees: Vec<Tree> = (1..=64)
            .map(|pos| {
                let mut tree = Tree::empty();
                forest.insert(&mut tree, pos, 1).unwrap();
                tree
            })
            .collect();
        let allocated = forest.allocated();
        let mut acc = Tree::empty();
        for tree in trees.drain(..) {
            acc = forest.merge(acc, tree);
        }
        assert_eq!(forest.allocated(), allocated);
        assert_eq!(forest.total(&acc), 64);
        assert!(forest.is_consistent(&acc));
    }

    #[test]
    fn mode_prefers_smaller_position_on_ties() {
        let mut forest = SegForest::new(10, Mode).unwrap();
        let mut a = Tree::empty();
        let mut b = Tree::empty();
        forest.insert(&mut a, 7, 2).unwrap();
        forest.insert(&mut a, 3, 1).unwrap();
        forest.insert(&mut b, 3, 1).unwrap();
        forest.insert(&mut b, 9, 2).unwrap();
        let merged = forest.merge(a, b);
        let mode = forest.total(&merged);
        assert_eq!((mode.count, mode.pos), (2, 3));

        let mut c = Tree::empty();
        forest.insert(&mut c, 9, 1).unwrap();
        let merged = forest.merge(merged, c);
        let mode = forest.total(&merged);
        assert_eq!((mode.count, mode.pos), (3, 9));
    }
}
