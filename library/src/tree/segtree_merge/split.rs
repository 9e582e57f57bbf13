use std::ops::RangeBounds;

use crate::error::Result;
use crate::monoid::NodeSpec;
use crate::tree::arena::{Node, NodeRef};

use super::{SegForest, Tree};

impl<S: NodeSpec> SegForest<S> {
    // Moves every populated position inside `range` out of `tree` into a new
    // tree. Fully covered subtrees are transplanted as they are; only the two
    // boundary paths are copied, so at most 2 nodes per level are allocated.
    // The exact count is checked up front, so a failed split changes nothing.
    pub fn split_off(&mut self, tree: &mut Tree, range: impl RangeBounds<usize>) -> Result<Tree> {
        let Some((start, end)) = self.resolve(range)? else {
            return Ok(Tree::empty());
        };
        let (needed, _) = self.split_cost(tree.root, 1, self.domain(), start, end);
        self.arena.ensure_headroom(needed)?;
        let (kept, taken) = self.split_rec(tree.root, 1, self.domain(), start, end)?;
        tree.root = kept;
        Ok(Tree { root: taken })
    }

    // Walks the same nodes as `split_rec` without touching them. Returns how
    // many nodes the split allocates and whether anything below is taken.
    fn split_cost(
        &self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        start: usize,
        end: usize,
    ) -> (usize, bool) {
        let Some(u) = u else {
            return (0, false);
        };
        if end < lo || hi < start {
            return (0, false);
        }
        if start <= lo && hi <= end {
            return (0, true);
        }
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        let (left_cost, left_taken) = self.split_cost(left, lo, mid, start, end);
        let (right_cost, right_taken) = self.split_cost(right, mid + 1, hi, start, end);
        let taken = left_taken || right_taken;
        (left_cost + right_cost + usize::from(taken), taken)
    }

    fn split_rec(
        &mut self,
        u: Option<NodeRef>,
        lo: usize,
        hi: usize,
        start: usize,
        end: usize,
    ) -> Result<(Option<NodeRef>, Option<NodeRef>)> {
        let Some(u) = u else {
            return Ok((None, None));
        };
        if end < lo || hi < start {
            return Ok((Some(u), None));
        }
        if start <= lo && hi <= end {
            return Ok((None, Some(u)));
        }

        self.push_down(u);
        let mid = lo + (hi - lo) / 2;
        let [left, right] = self.arena.children(u);
        let (left_kept, left_taken) = self.split_rec(left, lo, mid, start, end)?;
        let (right_kept, right_taken) = self.split_rec(right, mid + 1, hi, start, end)?;

        let taken = if left_taken.is_some() || right_taken.is_some() {
            let v = self.arena.alloc(Node::empty(&self.spec))?;
            self.arena.get_mut(v).children = [left_taken, right_taken];
            self.push_up(v);
            Some(v)
        } else {
            None
        };

        // an emptied node becomes garbage, like the losing side of a merge
        let kept = if left_kept.is_some() || right_kept.is_some() {
            self.arena.get_mut(u).children = [left_kept, right_kept];
            self.push_up(u);
            Some(u)
        } else {
            None
        };
        Ok((kept, taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::domain::{Count, RangeAdd};
    use crate::error::Error;

    #[test]
    fn split_moves_range() {
        let mut forest = SegForest::new(10, Count).unwrap();
        let mut tree = Tree::empty();
        for pos in [1, 3, 4, 4, 8, 10] {
            forest.insert(&mut tree, pos, 1).unwrap();
        }
        let taken = forest.split_off(&mut tree, 3..=8).unwrap();
        assert_eq!(forest.leaves(&tree), vec![(1, 1), (10, 1)]);
        assert_eq!(forest.leaves(&taken), vec![(3, 1), (4, 2), (8, 1)]);
        assert_eq!(forest.total(&tree), 2);
        assert_eq!(forest.total(&taken), 4);
        assert!(forest.is_consistent(&tree));
        assert!(forest.is_consistent(&taken));
    }

    #[test]
    fn split_whole_and_nothing() {
        let mut forest = SegForest::new(6, Count).unwrap();
        let mut tree = Tree::empty();
        forest.insert(&mut tree, 2, 1).unwrap();
        forest.insert(&mut tree, 5, 1).unwrap();
        let root = tree.root();
        let allocated = forest.allocated();

        let none = forest.split_off(&mut tree, 3..=4).unwrap();
        assert!(none.is_empty());
        assert_eq!(tree.root(), root);

        let empty = forest.split_off(&mut tree, 4..4).unwrap();
        assert!(empty.is_empty());

        let all = forest.split_off(&mut tree, ..).unwrap();
        assert!(tree.is_empty());
        assert_eq!(all.root(), root);
        assert_eq!(forest.total(&all), 2);
        assert_eq!(forest.allocated(), allocated);
    }

    #[test]
    fn split_carries_pending_tags() {
        let mut forest = SegForest::new(16, RangeAdd).unwrap();
        let mut tree = Tree::empty();
        for pos in 1..=16 {
            forest.insert(&mut tree, pos, pos as i64).unwrap();
        }
        forest.apply(&mut tree, &100);
        let taken = forest.split_off(&mut tree, 5..=11).unwrap();
        assert_eq!(
            forest.total(&taken).sum,
            (5..=11i64).map(|x| x + 100).sum::<i64>()
        );
        assert_eq!(
            forest.query(&tree, 12..=16).unwrap().sum,
            (12..=16i64).map(|x| x + 100).sum::<i64>()
        );
        assert_eq!(forest.query(&tree, 5..=11).unwrap().len, 0);
    }

    #[test]
    fn split_checks_capacity_first() {
        let config = ForestConfig::new(4).max_nodes(9);
        let mut forest = SegForest::with_config(config, Count).unwrap();
        let mut tree = Tree::empty();
        for pos in 1..=4 {
            forest.insert(&mut tree, pos, 1).unwrap();
        }
        assert_eq!(forest.allocated(), 7);
        assert!(matches!(
            forest.split_off(&mut tree, 2..=3),
            Err(Error::CapacityExceeded { .. })
        ));
        assert_eq!(forest.total(&tree), 4);
        assert_eq!(forest.query(&tree, 2..=3).unwrap(), 2);
    }

    #[test]
    fn split_uses_the_last_free_node() {
        let config = ForestConfig::new(4).max_nodes(6);
        let mut forest = SegForest::with_config(config, Count).unwrap();
        let mut tree = Tree::empty();
        forest.insert(&mut tree, 1, 1).unwrap();
        forest.insert(&mut tree, 3, 1).unwrap();
        assert_eq!(forest.allocated(), 5);

        // only the root straddles the cut, [3, 4] moves over whole
        let taken = forest.split_off(&mut tree, 3..).unwrap();
        assert_eq!(forest.allocated(), 6);
        assert_eq!(forest.leaves(&tree), vec![(1, 1)]);
        assert_eq!(forest.leaves(&taken), vec![(3, 1)]);

        // cutting out position 1 mirrors the root and [1, 2]
        assert_eq!(
            forest.split_off(&mut tree, 1..=1).unwrap_err(),
            Error::CapacityExceeded {
                requested: 2,
                capacity: 6
            }
        );
    }
}
