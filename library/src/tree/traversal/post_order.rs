// Bottom-up fold of one segment tree per vertex of a rooted tree.
//
// Each vertex starts with an empty tree. Children are folded in one at a time,
// and only after all of them the vertex itself is closed (usually inserting its
// own value). A child's finished tree can be inspected in isolation before it
// is merged into its siblings.

use crate::config::Traversal;
use crate::error::Result;
use crate::monoid::NodeSpec;
use crate::tree::segtree_merge::{SegForest, Tree};

pub trait SubtreeFold<S: NodeSpec> {
    fn visit_child(
        &mut self,
        _forest: &mut SegForest<S>,
        _parent: usize,
        _child: usize,
        _subtree: &Tree,
    ) -> Result<()> {
        Ok(())
    }

    fn fold_child(
        &mut self,
        forest: &mut SegForest<S>,
        _parent: usize,
        _child: usize,
        acc: Tree,
        subtree: Tree,
    ) -> Result<Tree> {
        Ok(forest.merge(acc, subtree))
    }

    fn close(&mut self, forest: &mut SegForest<S>, u: usize, tree: &mut Tree) -> Result<()>;
}

struct Frame {
    u: usize,
    next_child: usize,
    acc: Tree,
}

impl Frame {
    fn open(u: usize) -> Self {
        Self {
            u,
            next_child: 0,
            acc: Tree::empty(),
        }
    }
}

/// Runs the fold over the tree given by `children` lists, returning the tree of
/// `root`. Recursion or an explicit stack is picked by the forest config.
#[tracing::instrument(skip_all, fields(n_verts = children.len(), root = root))]
pub fn fold_subtrees<S, V>(
    forest: &mut SegForest<S>,
    children: &[Vec<usize>],
    root: usize,
    visitor: &mut V,
) -> Result<Tree>
where
    S: NodeSpec,
    V: SubtreeFold<S>,
{
    let mode = forest.config().traversal;
    tracing::debug!(?mode, "folding subtrees");
    let tree = match mode {
        Traversal::Recursive => fold_rec(forest, children, root, visitor)?,
        Traversal::Iterative => fold_iter(forest, children, root, visitor)?,
    };
    tracing::debug!(allocated = forest.allocated(), "fold finished");
    Ok(tree)
}

fn fold_rec<S: NodeSpec, V: SubtreeFold<S>>(
    forest: &mut SegForest<S>,
    children: &[Vec<usize>],
    u: usize,
    visitor: &mut V,
) -> Result<Tree> {
    let mut acc = Tree::empty();
    for &v in &children[u] {
        let subtree = fold_rec(forest, children, v, visitor)?;
        visitor.visit_child(forest, u, v, &subtree)?;
        acc = visitor.fold_child(forest, u, v, acc, subtree)?;
    }
    visitor.close(forest, u, &mut acc)?;
    Ok(acc)
}

fn fold_iter<S: NodeSpec, V: SubtreeFold<S>>(
    forest: &mut SegForest<S>,
    children: &[Vec<usize>],
    root: usize,
    visitor: &mut V,
) -> Result<Tree> {
    let mut stack = vec![Frame::open(root)];
    while let Some(frame) = stack.last_mut() {
        if let Some(&v) = children[frame.u].get(frame.next_child) {
            frame.next_child += 1;
            stack.push(Frame::open(v));
            continue;
        }

        let Some(Frame { u, mut acc, .. }) = stack.pop() else {
            unreachable!()
        };
        visitor.close(forest, u, &mut acc)?;
        let Some(parent) = stack.last_mut() else {
            return Ok(acc);
        };
        visitor.visit_child(forest, parent.u, u, &acc)?;
        let prev = parent.acc.take();
        parent.acc = visitor.fold_child(forest, parent.u, u, prev, acc)?;
    }
    unreachable!("the root frame returns from the loop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::domain::{Count, Mode};
    use rand::prelude::*;

    fn random_tree(rng: &mut StdRng, n: usize) -> Vec<Vec<usize>> {
        let mut children = vec![vec![]; n];
        for v in 1..n {
            let p = rng.random_range(0..v);
            children[p].push(v);
        }
        children
    }

    fn subtree_of(children: &[Vec<usize>], u: usize) -> Vec<usize> {
        let mut res = vec![u];
        let mut i = 0;
        while i < res.len() {
            res.extend_from_slice(&children[res[i]]);
            i += 1;
        }
        res
    }

    // For each vertex, the number of proper descendants with a smaller value.
    struct SmallerBelow<'a> {
        values: &'a [usize],
        answers: Vec<u64>,
    }

    impl SubtreeFold<Count> for SmallerBelow<'_> {
        fn visit_child(
            &mut self,
            forest: &mut SegForest<Count>,
            parent: usize,
            _: usize,
            subtree: &Tree,
        ) -> Result<()> {
            self.answers[parent] += forest.query(subtree, ..self.values[parent])?;
            Ok(())
        }

        fn close(
            &mut self,
            forest: &mut SegForest<Count>,
            u: usize,
            tree: &mut Tree,
        ) -> Result<()> {
            forest.insert(tree, self.values[u], 1)
        }
    }

    #[test]
    fn smaller_descendants_both_modes() {
        let mut rng = StdRng::seed_from_u64(1_844_674_407);
        let n = 300;
        let domain = 40;
        let children = random_tree(&mut rng, n);
        let values: Vec<usize> = (0..n).map(|_| rng.random_range(1..=domain)).collect();
        let expected: Vec<u64> = (0..n)
            .map(|u| {
                subtree_of(&children, u)
                    .iter()
                    .filter(|&&v| values[v] < values[u])
                    .count() as u64
            })
            .collect();

        for mode in [Traversal::Recursive, Traversal::Iterative] {
            let config = ForestConfig::new(domain).traversal(mode);
            let mut forest = SegForest::with_config(config, Count).unwrap();
            let mut visitor = SmallerBelow {
                values: &values,
                answers: vec![0; n],
            };
            let root = fold_subtrees(&mut forest, &children, 0, &mut visitor).unwrap();
            assert_eq!(visitor.answers, expected, "{mode:?}");
            assert_eq!(forest.total(&root), n as u64);
            assert!(forest.is_consistent(&root));
        }
    }

    // Most frequent color of every subtree, smallest color on ties.
    struct Dominant<'a> {
        colors: &'a [usize],
        answers: Vec<usize>,
    }

    impl SubtreeFold<Mode> for Dominant<'_> {
        fn close(
            &mut self,
            forest: &mut SegForest<Mode>,
            u: usize,
            tree: &mut Tree,
        ) -> Result<()> {
            forest.insert(tree, self.colors[u], 1)?;
            self.answers[u] = forest.total(tree).pos;
            Ok(())
        }
    }

    #[test]
    fn dominant_colors() {
        let mut rng = StdRng::seed_from_u64(77_120_551);
        let n = 500;
        let domain = 12;
        let children = random_tree(&mut rng, n);
        let colors: Vec<usize> = (0..n).map(|_| rng.random_range(1..=domain)).collect();

        let mut forest = SegForest::new(domain, Mode).unwrap();
        let mut visitor = Dominant {
            colors: &colors,
            answers: vec![0; n],
        };
        fold_subtrees(&mut forest, &children, 0, &mut visitor).unwrap();

        for u in 0..n {
            let mut freq = vec![0; domain + 1];
            for v in subtree_of(&children, u) {
                freq[colors[v]] += 1;
            }
            let best = (1..=domain)
                .max_by_key(|&c| (freq[c], std::cmp::Reverse(c)))
                .unwrap();
            assert_eq!(visitor.answers[u], best, "vertex {u}");
        }
    }

    struct InsertOwn<'a> {
        values: &'a [usize],
    }

    impl SubtreeFold<Count> for InsertOwn<'_> {
        fn close(
            &mut self,
            forest: &mut SegForest<Count>,
            u: usize,
            tree: &mut Tree,
        ) -> Result<()> {
            forest.insert(tree, self.values[u], 1)
        }
    }

    #[test]
    fn allocations_stay_within_n_log_v() {
        let mut rng = StdRng::seed_from_u64(5_550_123);
        let n = 2000;
        let domain = 1 << 12;
        let children = random_tree(&mut rng, n);
        let values: Vec<usize> = (0..n).map(|_| rng.random_range(1..=domain)).collect();

        let mut forest = SegForest::new(domain, Count).unwrap();
        let root =
            fold_subtrees(&mut forest, &children, 0, &mut InsertOwn { values: &values }).unwrap();
        assert_eq!(forest.total(&root), n as u64);
        assert!(forest.allocated() <= n * forest.config().height());
    }

    #[test]
    fn long_chain_iteratively() {
        let n = 200_000;
        let domain = 1000;
        let children: Vec<Vec<usize>> = (0..n)
            .map(|u| if u + 1 < n { vec![u + 1] } else { vec![] })
            .collect();
        let values: Vec<usize> = (0..n).map(|u| u % domain + 1).collect();

        let config = ForestConfig::new(domain).traversal(Traversal::Iterative);
        let mut forest = SegForest::with_config(config, Count).unwrap();
        let mut root =
            fold_subtrees(&mut forest, &children, 0, &mut InsertOwn { values: &values }).unwrap();
        assert_eq!(forest.total(&root), n as u64);
        assert_eq!(forest.query(&root, 1..=1).unwrap(), (n / domain) as u64);
        assert!(forest.allocated() <= domain * forest.config().height());
        let taken = forest.split_off(&mut root, 501..).unwrap();
        assert_eq!(forest.total(&taken), (n / 2) as u64);
    }
}
