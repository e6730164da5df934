//! Short, human-comparable fingerprints for transport strings.
//!
//! A fingerprint lets a share holder confirm a transcription without reading
//! the whole share back. It is not an authenticator: anyone can compute the
//! fingerprint of a forged share.

use std::fmt;

/// Four bytes of a BLAKE3 digest, rendered as `xxxx-xxxx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 4]);

impl Fingerprint {
    /// Fingerprint a share's transport string. Surrounding whitespace does
    /// not change the result.
    pub fn of(encoded_share: &str) -> Self {
        let hash = blake3::hash(encoded_share.trim().as_bytes());
        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&hash.as_bytes()[..4]);
        Self(prefix)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", hex::encode(&self.0[..2]), hex::encode(&self.0[2..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shamir;

    #[test]
    fn test_fingerprint_format() {
        let shares = shamir::split_secret("fingerprint me", 2, 3).unwrap();
        for share in &shares {
            let fp = Fingerprint::of(share).to_string();
            assert_eq!(fp.len(), 9);
            assert_eq!(fp.as_bytes()[4], b'-');
            assert!(fp
                .chars()
                .filter(|c| *c != '-')
                .all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_fingerprint_ignores_whitespace() {
        let share = "MTo3Miw2OSw3Niw3Niw3OQ==";
        assert_eq!(Fingerprint::of(share), Fingerprint::of(&format!(" {share}\n")));
    }

    #[test]
    fn test_fingerprint_distinguishes_shares() {
        let shares = shamir::split_secret("distinct", 3, 5).unwrap();
        let prints = shares.iter().map(|s| Fingerprint::of(s)).collect::<Vec<_>>();
        for (i, a) in prints.iter().enumerate() {
            for b in &prints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
