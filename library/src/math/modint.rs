use std::fmt;
use std::ops::*;

pub const P: u64 = 998_244_353;
pub type ModP = ModInt<P>;

// Residue modulo a prime below 2^32, so that products fit in u64.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModInt<const M: u64>(u64);

impl<const M: u64> ModInt<M> {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    pub fn new(n: u64) -> Self {
        Self(n % M)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn pow(self, mut exp: u64) -> Self {
        let mut res = Self::ONE;
        let mut base = self;
        while exp > 0 {
            if exp & 1 == 1 {
                res *= base;
            }
            base *= base;
            exp >>= 1;
        }
        res
    }

    // Fermat; M must be prime and self nonzero
    pub fn inv(self) -> Self {
        debug_assert!(self.0 != 0);
        self.pow(M - 2)
    }
}

impl<const M: u64> AddAssign for ModInt<M> {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        if self.0 >= M {
            self.0 -= M;
        }
    }
}

impl<const M: u64> SubAssign for ModInt<M> {
    fn sub_assign(&mut self, rhs: Self) {
        if self.0 < rhs.0 {
            self.0 += M;
        }
        self.0 -= rhs.0;
    }
}

impl<const M: u64> MulAssign for ModInt<M> {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = self.0 * rhs.0 % M;
    }
}

macro_rules! impl_binop {
    ($($Op:ident $op:ident $op_assign:ident),+) => {
        $(
            impl<const M: u64> $Op for ModInt<M> {
                type Output = Self;
                fn $op(mut self, rhs: Self) -> Self {
                    self.$op_assign(rhs);
                    self
                }
            }
        )+
    };
}
impl_binop!(Add add add_assign, Sub sub sub_assign, Mul mul mul_assign);

impl<const M: u64> Neg for ModInt<M> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::ZERO - self
    }
}

impl<const M: u64> From<u64> for ModInt<M> {
    fn from(n: u64) -> Self {
        Self::new(n)
    }
}

impl<const M: u64> fmt::Display for ModInt<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
