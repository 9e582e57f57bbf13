// Minimax tree: every leaf holds a distinct weight, every internal vertex (at
// most two children) takes the max of its children with probability p and the
// min otherwise. Prints sum of i * V_i * D_i^2 over the i-th smallest weight V_i
// reaching the root with probability D_i, mod 998244353.
//
// Input: n, then parent[1..=n] (0 for the root), then per vertex either its
// weight (leaves) or p * 10000 (internal vertices).

use std::io::{BufWriter, Write};

use anyhow::{bail, ensure, Context};
use clap::{Parser, ValueEnum};
use segtree_forest::domain::{Mass, Minimax};
use segtree_forest::math::modint::ModP;
use segtree_forest::{fold_subtrees, ForestConfig, SegForest, SubtreeFold, Traversal, Tree};
use tracing_subscriber::EnvFilter;

mod simple_io {
    use anyhow::{Context, Result};

    pub struct InputAtOnce<'a> {
        iter: std::str::SplitAsciiWhitespace<'a>,
    }

    impl<'a> InputAtOnce<'a> {
        pub fn new(buf: &'a str) -> Self {
            Self {
                iter: buf.split_ascii_whitespace(),
            }
        }

        pub fn value<T: std::str::FromStr>(&mut self) -> Result<T>
        where
            T::Err: std::error::Error + Send + Sync + 'static,
        {
            let token = self.iter.next().context("unexpected end of input")?;
            token
                .parse()
                .with_context(|| format!("invalid token {token:?}"))
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TraversalArg {
    Recursive,
    Iterative,
}

impl From<TraversalArg> for Traversal {
    fn from(arg: TraversalArg) -> Self {
        match arg {
            TraversalArg::Recursive => Traversal::Recursive,
            TraversalArg::Iterative => Traversal::Iterative,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Root value distribution of a minimax tree")]
struct Args {
    #[arg(long, value_enum, default_value = "iterative")]
    traversal: TraversalArg,

    /// Upper bound on segment tree nodes.
    #[arg(long)]
    max_nodes: Option<usize>,
}

struct MinimaxFold {
    // rank of the leaf weight, or the max probability of an internal vertex
    rank: Vec<usize>,
    p_max: Vec<ModP>,
}

impl SubtreeFold<Mass> for MinimaxFold {
    fn fold_child(
        &mut self,
        forest: &mut SegForest<Mass>,
        parent: usize,
        _: usize,
        acc: Tree,
        subtree: Tree,
    ) -> segtree_forest::Result<Tree> {
        if acc.is_empty() {
            return Ok(subtree);
        }
        Ok(forest.merge_with(acc, subtree, &Minimax::new(self.p_max[parent])))
    }

    fn close(
        &mut self,
        forest: &mut SegForest<Mass>,
        u: usize,
        tree: &mut Tree,
    ) -> segtree_forest::Result<()> {
        if tree.is_empty() {
            forest.insert(tree, self.rank[u], ModP::ONE)?;
        }
        Ok(())
    }
}

fn solve(input: &str, traversal: Traversal, max_nodes: Option<usize>) -> anyhow::Result<ModP> {
    let mut input = simple_io::InputAtOnce::new(input);
    let n: usize = input.value()?;
    ensure!(n > 0, "empty tree");

    let mut children = vec![vec![]; n];
    let mut root = None;
    for u in 0..n {
        let p: usize = input.value()?;
        if p == 0 {
            ensure!(root.is_none(), "more than one root");
            root = Some(u);
        } else {
            ensure!(p <= n, "parent {p} out of range");
            children[p - 1].push(u);
        }
    }
    let root = root.context("no root")?;
    let mut reached = vec![false; n];
    let mut stack = vec![root];
    while let Some(u) = stack.pop() {
        reached[u] = true;
        stack.extend_from_slice(&children[u]);
    }
    if let Some(u) = reached.iter().position(|&r| !r) {
        bail!("vertex {} is not reachable from the root", u + 1);
    }
    let raw: Vec<u64> = (0..n).map(|_| input.value()).collect::<Result<_, _>>()?;

    let mut weights: Vec<u64> = (0..n)
        .filter(|&u| children[u].is_empty())
        .map(|u| raw[u])
        .collect();
    weights.sort_unstable();
    weights.dedup();

    let inv_10000 = ModP::new(10_000).inv();
    let mut rank = vec![0; n];
    let mut p_max = vec![ModP::ZERO; n];
    for u in 0..n {
        if children[u].is_empty() {
            rank[u] = weights.partition_point(|&w| w < raw[u]) + 1;
        } else {
            p_max[u] = ModP::new(raw[u]) * inv_10000;
        }
    }

    // every leaf allocates one root-to-leaf path, merges allocate nothing
    let mut config = ForestConfig::new(weights.len()).traversal(traversal);
    let height = config.height();
    config = config.reserve(weights.len() * height);
    if let Some(max_nodes) = max_nodes {
        config = config.max_nodes(max_nodes);
    }
    let mut forest = SegForest::with_config(config, Mass)?;
    let tree = fold_subtrees(&mut forest, &children, root, &mut MinimaxFold { rank, p_max })?;

    let ans = forest
        .leaves(&tree)
        .into_iter()
        .fold(ModP::ZERO, |acc, (i, d)| {
            acc + ModP::new(i as u64) * ModP::new(weights[i - 1]) * d * d
        });
    tracing::debug!(allocated = forest.allocated(), "done");
    Ok(ans)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let input = std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?;
    let ans = solve(&input, args.traversal.into(), args.max_nodes)?;

    let mut output = BufWriter::new(std::io::stdout());
    writeln!(output, "{}", ans)?;
    Ok(())
}
