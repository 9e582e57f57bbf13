// Stock aggregate/tag pairings.

use std::cmp::Reverse;

use crate::monoid::NodeSpec;

pub mod probability;

pub use probability::{Mass, Minimax};

// Multiset of positions. Merged leaves add their multiplicities.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl NodeSpec for Count {
    type X = u64;
    type F = ();
    type V = u64;

    fn id(&self) -> u64 {
        0
    }
    fn combine(&self, lhs: &u64, rhs: &u64) -> u64 {
        lhs + rhs
    }
    fn id_action(&self) {}
    fn compose(&self, _: &(), _: &()) {}
    fn apply(&self, _: &(), x: &u64) -> u64 {
        *x
    }
    fn update_leaf(&self, leaf: &mut u64, _: usize, value: u64) {
        *leaf += value;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SumLen {
    pub sum: i64,
    // populated positions
    pub len: u64,
}

// Sum over populated positions, with "add delta to every populated position"
// as the lazy tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeAdd;

impl NodeSpec for RangeAdd {
    type X = SumLen;
    type F = i64;
    type V = i64;

    fn id(&self) -> SumLen {
        SumLen { sum: 0, len: 0 }
    }
    fn combine(&self, lhs: &SumLen, rhs: &SumLen) -> SumLen {
        SumLen {
            sum: lhs.sum + rhs.sum,
            len: lhs.len + rhs.len,
        }
    }
    fn id_action(&self) -> i64 {
        0
    }
    fn compose(&self, outer: &i64, inner: &i64) -> i64 {
        outer + inner
    }
    fn apply(&self, delta: &i64, x: &SumLen) -> SumLen {
        SumLen {
            sum: x.sum + delta * x.len as i64,
            len: x.len,
        }
    }
    fn update_leaf(&self, leaf: &mut SumLen, _: usize, value: i64) {
        leaf.sum += value;
        leaf.len = 1;
    }
    fn merge_leaves(&self, lhs: &SumLen, rhs: &SumLen) -> SumLen {
        SumLen {
            sum: lhs.sum + rhs.sum,
            len: lhs.len.max(rhs.len),
        }
    }
}

// Maximum with additive tags. `None` is the empty aggregate, so every i64 is a
// storable value. Tags saturate at the ends of the i64 range instead of
// wrapping around; a clamped value no longer composes exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max;

impl NodeSpec for Max {
    type X = Option<i64>;
    type F = i64;
    type V = i64;

    fn id(&self) -> Option<i64> {
        None
    }
    fn combine(&self, lhs: &Option<i64>, rhs: &Option<i64>) -> Option<i64> {
        // None orders below every Some
        (*lhs).max(*rhs)
    }
    fn id_action(&self) -> i64 {
        0
    }
    fn compose(&self, outer: &i64, inner: &i64) -> i64 {
        outer.saturating_add(*inner)
    }
    fn apply(&self, delta: &i64, x: &Option<i64>) -> Option<i64> {
        x.map(|x| x.saturating_add(*delta))
    }
    fn update_leaf(&self, leaf: &mut Option<i64>, _: usize, value: i64) {
        *leaf = Some(leaf.map_or(value, |x| x.max(value)));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeEntry {
    pub count: i64,
    pub pos: usize,
}

// Per-position counters, aggregated as the largest counter and its position,
// the smaller position winning ties. Counters may go negative, which is how
// tree-difference updates cancel out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mode;

impl Mode {
    fn key(x: &ModeEntry) -> (i64, Reverse<usize>) {
        (x.count, Reverse(x.pos))
    }
}

impl NodeSpec for Mode {
    type X = ModeEntry;
    type F = ();
    type V = i64;

    fn id(&self) -> ModeEntry {
        ModeEntry {
            count: i64::MIN,
            pos: usize::MAX,
        }
    }
    fn combine(&self, lhs: &ModeEntry, rhs: &ModeEntry) -> ModeEntry {
        if Self::key(rhs) > Self::key(lhs) {
            *rhs
        } else {
            *lhs
        }
    }
    fn id_action(&self) {}
    fn compose(&self, _: &(), _: &()) {}
    fn apply(&self, _: &(), x: &ModeEntry) -> ModeEntry {
        *x
    }
    fn update_leaf(&self, leaf: &mut ModeEntry, pos: usize, value: i64) {
        if leaf.pos != pos {
            *leaf = ModeEntry { count: 0, pos };
        }
        leaf.count += value;
    }
    fn merge_leaves(&self, lhs: &ModeEntry, rhs: &ModeEntry) -> ModeEntry {
        ModeEntry {
            count: lhs.count + rhs.count,
            pos: lhs.pos,
        }
    }
}
