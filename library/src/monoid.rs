// Aggregate monoid X (not necessarily commutative) together with a monoid F of
// lazy tags acting on it. F acts by endomorphisms: apply(f, combine(a, b)) ==
// combine(apply(f, a), apply(f, b)), and apply(f, id()) == id(), so absent
// subtrees never have to be materialized to receive a tag.
pub trait NodeSpec {
    type X: Clone;
    type F: Clone + PartialEq;
    // value accepted by a point update
    type V;

    fn id(&self) -> Self::X;
    fn combine(&self, lhs: &Self::X, rhs: &Self::X) -> Self::X;

    fn id_action(&self) -> Self::F;
    // function application is right associative: compose(f, g) = f . g
    fn compose(&self, outer: &Self::F, inner: &Self::F) -> Self::F;
    fn apply(&self, action: &Self::F, x: &Self::X) -> Self::X;

    fn update_leaf(&self, leaf: &mut Self::X, pos: usize, value: Self::V);

    // Two leaves sharing a position collapse into one during a merge.
    fn merge_leaves(&self, lhs: &Self::X, rhs: &Self::X) -> Self::X {
        self.combine(lhs, rhs)
    }
}
