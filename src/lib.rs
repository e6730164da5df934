//! `tshare` splits a secret into `n` shares such that any `k` of them recover
//! it exactly, using Shamir's scheme over `GF(257)`.
//!
//! ```
//! let shares = tshare::split_secret("HELLO", 3, 5).unwrap();
//! let recovered = tshare::reconstruct(&[&shares[0], &shares[2], &shares[4]]).unwrap();
//! assert_eq!(recovered.as_text(), Some("HELLO"));
//! ```

#![forbid(unsafe_code)]

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

pub mod config;
pub mod fingerprint;
pub mod logging;
pub mod shamir;

pub use fingerprint::Fingerprint;
pub use shamir::{
    combine, reconstruct, split, split_secret, split_with_rng, Recovered, Scheme, ShamirError,
    Share,
};
