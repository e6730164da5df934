use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::{CryptoRng, Rng, RngCore};
use zeroize::Zeroize;

/// The field modulus: the smallest prime above `u8::MAX`, so every byte maps
/// onto a distinct element without reduction.
pub const PRIME: u16 = 257;

/// An element of `GF(257)`, always held in canonical form `0..PRIME`.
///
/// This is plain modular arithmetic on small integers. It is not constant
/// time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct Fp(u16);

impl Fp {
    /// Additive identity.
    pub const ZERO: Fp = Fp(0);

    /// Multiplicative identity.
    pub const ONE: Fp = Fp(1);

    /// Build an element from any integer, reducing it modulo [`PRIME`].
    pub fn new(value: u16) -> Self {
        Self(value % PRIME)
    }

    /// Build an element only if `value` is already canonical.
    pub fn from_canonical(value: u16) -> Option<Self> {
        (value < PRIME).then_some(Self(value))
    }

    /// Draw a uniformly random non-zero element, i.e. a value in `1..=256`.
    pub fn new_rand_nonzero<R: CryptoRng + RngCore + ?Sized>(r: &mut R) -> Self {
        Self(r.gen_range(1..PRIME))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// The element as a byte, if it is one. Only `256` has no byte form.
    pub fn to_byte(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }

    pub fn pow(self, mut n: u32) -> Self {
        let mut base = self;
        let mut result = Self::ONE;
        while n != 0 {
            if n & 1 == 1 {
                result *= base;
            }
            base *= base;
            n >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem, `a^(p-2)`.
    ///
    /// Zero has no inverse and yields `None`.
    pub fn inverse(self) -> Option<Self> {
        match self {
            Self::ZERO => None,
            _ => Some(self.pow(u32::from(PRIME) - 2)),
        }
    }
}

impl From<u8> for Fp {
    fn from(byte: u8) -> Self {
        Self(u16::from(byte))
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Fp {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        Self::new(u16::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self::new))
    }
}

impl Add for Fp {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for Fp {
    fn add_assign(&mut self, rhs: Self) {
        // Both operands are below 257, so the sum fits comfortably in a u16.
        self.0 = (self.0 + rhs.0) % PRIME;
    }
}

impl Sub for Fp {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self::Output {
        self -= rhs;
        self
    }
}

impl SubAssign for Fp {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = (self.0 + PRIME - rhs.0) % PRIME;
    }
}

impl Neg for Fp {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::ZERO - self
    }
}

impl Mul for Fp {
    type Output = Self;
    fn mul(mut self, rhs: Self) -> Self::Output {
        self *= rhs;
        self
    }
}

impl MulAssign for Fp {
    fn mul_assign(&mut self, rhs: Self) {
        let product = u32::from(self.0) * u32::from(rhs.0) % u32::from(PRIME);
        // Reduced modulo 257, so this always fits.
        self.0 = product as u16;
    }
}
