use crate::math::modint::ModP;
use crate::monoid::NodeSpec;
use crate::tree::segtree_merge::MergeRule;

// Probability mass per position modulo 998244353, scaled lazily.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mass;

impl NodeSpec for Mass {
    type X = ModP;
    type F = ModP;
    type V = ModP;

    fn id(&self) -> ModP {
        ModP::ZERO
    }
    fn combine(&self, lhs: &ModP, rhs: &ModP) -> ModP {
        *lhs + *rhs
    }
    fn id_action(&self) -> ModP {
        ModP::ONE
    }
    fn compose(&self, outer: &ModP, inner: &ModP) -> ModP {
        *outer * *inner
    }
    fn apply(&self, scale: &ModP, x: &ModP) -> ModP {
        *scale * *x
    }
    fn update_leaf(&self, leaf: &mut ModP, _: usize, value: ModP) {
        *leaf += value;
    }
}

// Joins two independent distributions A and B into the distribution of
// max(A, B) with probability `p_max`, min(A, B) otherwise:
//
//   P(x) = PA(x) (p B(<x) + (1-p) B(>x))
//        + PB(x) (p A(<x) + (1-p) A(>x))
//        + PA(x) PB(x)
#[derive(Clone, Copy, Debug)]
pub struct Minimax {
    pub p_max: ModP,
}

// Masses of each side strictly below and strictly above the current range.
#[derive(Clone, Copy, Debug, Default)]
pub struct Outside {
    lhs_below: ModP,
    lhs_above: ModP,
    rhs_below: ModP,
    rhs_above: ModP,
}

impl Minimax {
    pub fn new(p_max: ModP) -> Self {
        Self { p_max }
    }

    fn weight(&self, below: ModP, above: ModP) -> ModP {
        self.p_max * below + (ModP::ONE - self.p_max) * above
    }
}

impl MergeRule<Mass> for Minimax {
    type Extra = Outside;

    fn init(&self, _: &Mass) -> Outside {
        Outside::default()
    }

    fn descend(&self, _: &Mass, extra: &Outside, lhs: [&ModP; 2], rhs: [&ModP; 2]) -> [Outside; 2] {
        let left = Outside {
            lhs_above: extra.lhs_above + *lhs[1],
            rhs_above: extra.rhs_above + *rhs[1],
            ..*extra
        };
        let right = Outside {
            lhs_below: extra.lhs_below + *lhs[0],
            rhs_below: extra.rhs_below + *rhs[0],
            ..*extra
        };
        [left, right]
    }

    fn lone_lhs(&self, _: &Mass, extra: &Outside) -> ModP {
        self.weight(extra.rhs_below, extra.rhs_above)
    }

    fn lone_rhs(&self, _: &Mass, extra: &Outside) -> ModP {
        self.weight(extra.lhs_below, extra.lhs_above)
    }

    fn leaves(&self, _: &Mass, extra: &Outside, lhs: &ModP, rhs: &ModP) -> ModP {
        *lhs * self.weight(extra.rhs_below, extra.rhs_above)
            + *rhs * self.weight(extra.lhs_below, extra.lhs_above)
            + *lhs * *rhs
    }
}
