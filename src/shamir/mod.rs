//! Threshold secret sharing over `GF(257)`.
//!
//! Each byte of the secret becomes the constant term of its own random
//! polynomial of degree `k - 1`; share `x` holds every polynomial evaluated at
//! `x`. Any `k` shares recover the secret by Lagrange interpolation at zero,
//! fewer reveal nothing about it.
//!
//! Shares carry no threshold and no integrity check: handing [`combine`] fewer
//! than `k` shares silently yields a wrong secret, and a tampered share is not
//! detected.

pub mod field;
pub mod polynomial;
pub mod share;

use std::collections::HashMap;
use std::fmt;

use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};
use zeroize::Zeroize;

pub use field::{Fp, PRIME};
pub use polynomial::{InterpolationError, Polynomial};
pub use share::{Share, ShareFormatError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShamirError {
    #[error("invalid threshold parameters (k = {threshold}, n = {shares}): {reason}")]
    Configuration {
        threshold: usize,
        shares: usize,
        reason: &'static str,
    },
    #[error("share at position {index} is malformed: {source}")]
    MalformedShare {
        index: usize,
        #[source]
        source: ShareFormatError,
    },
    #[error("shares disagree on secret length: expected {expected} values, share at position {index} has {found}")]
    InconsistentShares {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("two different shares carry x = {x}")]
    DuplicateXCoordinate { x: u16 },
    #[error("no shares supplied")]
    NoShares,
}

impl From<InterpolationError> for ShamirError {
    fn from(err: InterpolationError) -> Self {
        match err {
            InterpolationError::RepeatedX(x) => ShamirError::DuplicateXCoordinate { x },
        }
    }
}

/// Validated threshold parameters: `k` of `n` shares recover the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheme {
    threshold: usize,
    shares: usize,
}

impl Scheme {
    /// Share x-coordinates are the distinct non-zero field elements.
    pub const MAX_SHARES: usize = PRIME as usize - 1;

    pub fn new(threshold: usize, shares: usize) -> Result<Self, ShamirError> {
        let reason = if threshold < 2 {
            Some("threshold must be at least 2")
        } else if threshold > shares {
            Some("threshold cannot exceed the number of shares")
        } else if shares > Self::MAX_SHARES {
            Some("at most 256 shares can be dealt")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ShamirError::Configuration {
                threshold,
                shares,
                reason,
            }),
            None => Ok(Self { threshold, shares }),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn shares(&self) -> usize {
        self.shares
    }
}

/// Split `secret` into `scheme.shares()` shares, drawing coefficients from a
/// freshly seeded ChaCha20 CSPRNG.
pub fn split(secret: &[u8], scheme: Scheme) -> Vec<Share> {
    split_with_rng(secret, scheme, &mut ChaCha20Rng::from_entropy())
}

/// Split `secret` using coefficients drawn from `rng`.
///
/// Share `i` (0-based) has `x = i + 1`.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(k = scheme.threshold(), n = scheme.shares(), len = secret.len())
)]
pub fn split_with_rng<R: CryptoRng + RngCore + ?Sized>(
    secret: &[u8],
    scheme: Scheme,
    rng: &mut R,
) -> Vec<Share> {
    let xs = (1..=scheme.shares as u16).map(Fp::new).collect::<Vec<_>>();
    let degree = scheme.threshold - 1;

    // The RNG is only touched here, sequentially. Evaluation below is pure.
    let polynomials = secret
        .iter()
        .map(|&byte| Polynomial::new_rand(Fp::from(byte), degree, &mut *rng))
        .collect::<Vec<_>>();
    trace!("drew {} polynomials of degree {}", polynomials.len(), degree);

    let mut evaluations = polynomials
        .par_iter()
        .map(|poly| xs.iter().map(|&x| poly.evaluate(x)).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    drop(polynomials);

    let mut shares = xs
        .iter()
        .map(|&x| Share::new(x, Vec::with_capacity(secret.len())))
        .collect::<Vec<_>>();
    for row in evaluations.iter_mut() {
        for (share, y) in shares.iter_mut().zip(row.iter()) {
            share.ys.push(*y);
        }
        row.zeroize();
    }

    debug!("dealt {} shares", shares.len());
    shares
}

/// Recover the secret from a set of shares.
///
/// All shares must cover the same number of bytes. Exact duplicates are
/// ignored, but two different shares with the same `x` are rejected.
#[tracing::instrument(level = "debug", skip_all, fields(m = shares.len()))]
pub fn combine(shares: &[Share]) -> Result<Recovered, ShamirError> {
    let first = shares.first().ok_or(ShamirError::NoShares)?;
    let expected = first.len();
    if let Some((index, share)) = shares
        .iter()
        .enumerate()
        .find(|(_, share)| share.len() != expected)
    {
        return Err(ShamirError::InconsistentShares {
            index,
            expected,
            found: share.len(),
        });
    }

    let points = distinct_points(shares)?;
    let xs = points.iter().map(|share| share.x).collect::<Vec<_>>();
    let weights = polynomial::lagrange_weights(&xs)?;
    debug!(points = points.len(), len = expected, "interpolating");

    let values = (0..expected)
        .into_par_iter()
        .map(|i| {
            points
                .iter()
                .zip(weights.iter())
                .fold(Fp::ZERO, |acc, (share, w)| acc + *w * share.ys[i])
        })
        .collect::<Vec<_>>();

    Ok(Recovered::from_field_values(values))
}

fn distinct_points(shares: &[Share]) -> Result<Vec<&Share>, ShamirError> {
    let mut seen: HashMap<Fp, &Share> = HashMap::with_capacity(shares.len());
    let mut points = Vec::with_capacity(shares.len());
    for share in shares {
        match seen.get(&share.x) {
            Some(prev) if prev.ys == share.ys => {
                debug!(x = share.x.value(), "ignoring repeated share");
            }
            Some(_) => {
                return Err(ShamirError::DuplicateXCoordinate {
                    x: share.x.value(),
                })
            }
            None => {
                seen.insert(share.x, share);
                points.push(share);
            }
        }
    }
    Ok(points)
}

/// Split a text secret into `shares` transport strings, any `threshold` of
/// which recover it.
pub fn split_secret(
    secret: &str,
    threshold: usize,
    shares: usize,
) -> Result<Vec<String>, ShamirError> {
    let scheme = Scheme::new(threshold, shares)?;
    Ok(split(secret.as_bytes(), scheme)
        .iter()
        .map(Share::encode)
        .collect())
}

/// Decode transport strings and recover the secret they were dealt from.
///
/// Any share that fails to decode aborts the whole reconstruction.
pub fn reconstruct<S: AsRef<str>>(encoded: &[S]) -> Result<Recovered, ShamirError> {
    let shares = encoded
        .iter()
        .enumerate()
        .map(|(index, s)| {
            Share::decode(s.as_ref())
                .map_err(|source| ShamirError::MalformedShare { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    combine(&shares)
}

/// The outcome of a reconstruction.
///
/// Interpolation always produces *some* value per byte position. If those
/// values do not form UTF-8 text (typically because too few or mismatched
/// shares were supplied) the raw field values are kept instead of failing.
#[derive(Clone, PartialEq, Eq)]
pub enum Recovered {
    Text(String),
    Undecodable(Vec<u16>),
}

impl Recovered {
    fn from_field_values(mut values: Vec<Fp>) -> Self {
        let bytes = values
            .iter()
            .map(|v| v.to_byte())
            .collect::<Option<Vec<u8>>>();
        let recovered = match bytes {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Recovered::Text(text),
                Err(err) => {
                    let mut bytes = err.into_bytes();
                    let raw = bytes.iter().map(|&b| u16::from(b)).collect();
                    bytes.zeroize();
                    Recovered::Undecodable(raw)
                }
            },
            None => Recovered::Undecodable(values.iter().map(|v| v.value()).collect()),
        };
        values.zeroize();
        recovered
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Recovered::Text(text) => Some(text),
            Recovered::Undecodable(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Recovered::Text(_))
    }

    /// The recovered bytes, unless some position interpolated to 256 (which
    /// no byte maps to).
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Recovered::Text(text) => Some(text.as_bytes().to_vec()),
            Recovered::Undecodable(raw) => raw.iter().map(|&v| u8::try_from(v).ok()).collect(),
        }
    }
}

impl Zeroize for Recovered {
    fn zeroize(&mut self) {
        match self {
            Recovered::Text(text) => text.zeroize(),
            Recovered::Undecodable(raw) => raw.zeroize(),
        }
    }
}

impl fmt::Display for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovered::Text(text) => f.write_str(text),
            Recovered::Undecodable(raw) => match self.to_bytes() {
                Some(bytes) => write!(f, "[undecodable utf-8, hex: {}]", hex::encode(bytes)),
                None => {
                    f.write_str("[not a byte string, field values: ")?;
                    for (i, v) in raw.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{v}")?;
                    }
                    f.write_str("]")
                }
            },
        }
    }
}

// Keep recovered secrets out of debug logs.
impl fmt::Debug for Recovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovered::Text(text) => write!(f, "Recovered::Text(<{} bytes>)", text.len()),
            Recovered::Undecodable(raw) => write!(f, "Recovered::Undecodable(<{} values>)", raw.len()),
        }
    }
}
