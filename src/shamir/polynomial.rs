use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::field::Fp;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpolationError {
    #[error("x = {0} appears more than once among the interpolation points")]
    RepeatedX(u16),
}

/// Evaluate the polynomial with coefficients `coeffs` (in *increasing*
/// degree, so `coeffs[0]` is the constant term) at `x`.
pub fn evaluate(coeffs: &[Fp], x: Fp) -> Fp {
    // Horner's method: O(k) multiply-accumulate steps, starting from the
    // highest degree coefficient.
    coeffs
        .iter()
        .rev()
        .fold(Fp::ZERO, |acc, coeff| acc * x + *coeff)
}

/// A polynomial over `GF(257)`, with coefficients in increasing degree.
///
/// Only ever used while dealing shares. The coefficients are wiped when it is
/// dropped.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Polynomial(Vec<Fp>);

impl Polynomial {
    /// Construct a random polynomial of the given `degree` whose constant term
    /// is `constant`.
    ///
    /// Every other coefficient is drawn independently from `1..=256`, so a
    /// dealt polynomial always has exactly `degree` random terms on top of the
    /// secret.
    pub fn new_rand<R: CryptoRng + RngCore + ?Sized>(
        constant: Fp,
        degree: usize,
        r: &mut R,
    ) -> Self {
        let mut coeffs = Vec::with_capacity(degree + 1);
        coeffs.push(constant);
        coeffs.extend((0..degree).map(|_| Fp::new_rand_nonzero(&mut *r)));
        Self(coeffs)
    }

    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn constant(&self) -> Fp {
        self.0[0]
    }

    pub fn coefficients(&self) -> &[Fp] {
        &self.0
    }

    pub fn evaluate(&self, x: Fp) -> Fp {
        evaluate(&self.0, x)
    }
}

/// Compute the Lagrange basis weights at `x = 0` for the points `xs`.
///
/// With the weights `w_j`, the constant term of the unique lowest-degree
/// polynomial through `(xs[j], ys[j])` is `\sum_j w_j y_j`, where
///
///   w_j = \prod_{l != j} (0 - x_l) / \prod_{l != j} (x_j - x_l)
///
/// The weights depend only on the x values, so a caller interpolating many
/// y-vectors over the same xs only pays for `xs.len()` inversions once.
pub fn lagrange_weights(xs: &[Fp]) -> Result<Vec<Fp>, InterpolationError> {
    xs.iter()
        .enumerate()
        .map(|(j, &xj)| {
            let (numerator, denominator) = xs
                .iter()
                .enumerate()
                .filter(|(l, _)| *l != j)
                .fold((Fp::ONE, Fp::ONE), |(num, den), (_, &xl)| {
                    (num * (Fp::ZERO - xl), den * (xj - xl))
                });
            denominator
                .inverse()
                .map(|inv| numerator * inv)
                .ok_or(InterpolationError::RepeatedX(xj.value()))
        })
        .collect()
}

/// Interpolate the constant term of the polynomial through `points`.
pub fn lagrange_constant(points: &[(Fp, Fp)]) -> Result<Fp, InterpolationError> {
    let (xs, ys): (Vec<_>, Vec<_>) = points.iter().copied().unzip();
    let weights = lagrange_weights(&xs)?;
    Ok(weights
        .iter()
        .zip(ys)
        .fold(Fp::ZERO, |acc, (w, y)| acc + *w * y))
}

#[cfg(test)]
impl quickcheck::Arbitrary for Polynomial {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // Keep the degree within what a share set can actually carry.
        let len = 1 + usize::arbitrary(g) % 32;
        Polynomial((0..len).map(|_| Fp::arbitrary(g)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    // Inefficient, but "obviously correct" evaluation to compare against.
    fn manual_poly(poly: &Polynomial, x: Fp) -> Fp {
        poly.coefficients()
            .iter()
            .enumerate()
            .fold(Fp::ZERO, |acc, (n, coeff)| acc + *coeff * x.pow(n as u32))
    }

    #[test]
    fn horner_small_example() {
        // f(x) = 5 + 3x + 2x^2
        let coeffs = [Fp::new(5), Fp::new(3), Fp::new(2)];
        assert_eq!(evaluate(&coeffs, Fp::new(0)), Fp::new(5));
        assert_eq!(evaluate(&coeffs, Fp::new(1)), Fp::new(10));
        assert_eq!(evaluate(&coeffs, Fp::new(10)), Fp::new(235));
        // 5 + 3*20 + 2*400 = 865 = 3*257 + 94
        assert_eq!(evaluate(&coeffs, Fp::new(20)), Fp::new(94));
    }

    #[test]
    fn new_rand_keeps_constant() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let poly = Polynomial::new_rand(Fp::from(b'H'), 4, &mut rng);
        assert_eq!(poly.degree(), 4);
        assert_eq!(poly.constant(), Fp::from(b'H'));
        assert!(poly.coefficients()[1..].iter().all(|c| *c != Fp::ZERO));
    }

    #[test]
    fn repeated_x_is_rejected() {
        let xs = [Fp::new(1), Fp::new(2), Fp::new(1)];
        assert_eq!(
            lagrange_weights(&xs),
            Err(InterpolationError::RepeatedX(1))
        );
    }

    #[test]
    fn single_point_interpolates_to_itself() {
        let points = [(Fp::new(9), Fp::new(42))];
        assert_eq!(lagrange_constant(&points), Ok(Fp::new(42)));
    }

    #[quickcheck]
    fn polynomial_evaluate(poly: Polynomial, x: Fp) -> bool {
        poly.evaluate(x) == manual_poly(&poly, x)
    }

    #[quickcheck]
    fn polynomial_constant(poly: Polynomial) -> bool {
        poly.evaluate(Fp::ZERO) == poly.constant()
    }

    #[quickcheck]
    fn polynomial_lagrange_constant(poly: Polynomial) -> bool {
        let xs = (1..=poly.degree() as u16 + 1).map(Fp::new);
        let points = xs.map(|x| (x, poly.evaluate(x))).collect::<Vec<_>>();
        lagrange_constant(&points) == Ok(poly.constant())
    }

    #[quickcheck]
    fn extra_points_do_not_change_constant(poly: Polynomial, extra: u8) -> bool {
        let count = poly.degree() as u16 + 1 + u16::from(extra % 16);
        let points = (1..=count)
            .map(|x| (Fp::new(x), poly.evaluate(Fp::new(x))))
            .collect::<Vec<_>>();
        lagrange_constant(&points) == Ok(poly.constant())
    }
}
