use std::fmt::{self, Write as _};
use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::field::Fp;

/// Reasons a transport string cannot be parsed back into a [`Share`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareFormatError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded payload is not utf-8")]
    Utf8,
    #[error("missing ':' between the x coordinate and the values")]
    MissingSeparator,
    #[error("token {0:?} is not a decimal integer")]
    InvalidInteger(String),
    #[error("x = {0} is outside 1..=256")]
    XOutOfRange(u16),
    #[error("value {0} is outside 0..=256")]
    YOutOfRange(u16),
}

/// A single share: the evaluation point `x` and one evaluation per secret
/// byte.
///
/// On the wire a share is `base64("<x>:<y0>,<y1>,...")` using the standard
/// alphabet, with decimal integers.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    pub x: Fp,
    pub ys: Vec<Fp>,
}

impl Share {
    pub fn new(x: Fp, ys: Vec<Fp>) -> Self {
        Self { x, ys }
    }

    /// Number of secret bytes this share covers.
    pub fn len(&self) -> usize {
        self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }

    /// Render the share as an opaque transport string.
    pub fn encode(&self) -> String {
        // The plaintext form is as sensitive as the share itself.
        let mut plain = Zeroizing::new(String::with_capacity(4 + 4 * self.ys.len()));
        // Writing into a String cannot fail.
        let _ = write!(plain, "{}:", self.x.value());
        for (i, y) in self.ys.iter().enumerate() {
            if i > 0 {
                plain.push(',');
            }
            let _ = write!(plain, "{}", y.value());
        }
        general_purpose::STANDARD.encode(plain.as_bytes())
    }

    /// Parse a transport string produced by [`Share::encode`].
    ///
    /// Leading and trailing whitespace is ignored.
    pub fn decode(encoded: &str) -> Result<Self, ShareFormatError> {
        let raw = Zeroizing::new(general_purpose::STANDARD.decode(encoded.trim())?);
        let plain = std::str::from_utf8(&raw).map_err(|_| ShareFormatError::Utf8)?;
        let (x, ys) = plain
            .split_once(':')
            .ok_or(ShareFormatError::MissingSeparator)?;

        let x = parse_integer(x)?;
        let x = match Fp::from_canonical(x) {
            Some(x) if x != Fp::ZERO => x,
            _ => return Err(ShareFormatError::XOutOfRange(x)),
        };

        // An empty value list is an empty secret.
        let ys = if ys.is_empty() {
            Vec::new()
        } else {
            ys.split(',')
                .map(|token| {
                    let y = parse_integer(token)?;
                    Fp::from_canonical(y).ok_or(ShareFormatError::YOutOfRange(y))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { x, ys })
    }
}

fn parse_integer(token: &str) -> Result<u16, ShareFormatError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ShareFormatError::InvalidInteger(token.to_string()));
    }
    // Anything that overflows a u16 is out of range for the field anyway.
    token.parse::<u16>().or(Ok(u16::MAX))
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Share {
    type Err = ShareFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(plain: &str) -> String {
        general_purpose::STANDARD.encode(plain)
    }

    fn share(x: u16, ys: &[u16]) -> Share {
        Share::new(Fp::new(x), ys.iter().copied().map(Fp::new).collect())
    }

    #[test]
    fn encodes_plain_decimal_format() {
        let s = share(3, &[72, 0, 256]);
        assert_eq!(s.encode(), b64("3:72,0,256"));
        assert_eq!(s.encode(), "Mzo3MiwwLDI1Ng==");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let s = share(256, &[1, 2, 3, 255, 256]);
        assert_eq!(Share::decode(&s.encode()), Ok(s.clone()));
        assert_eq!(s.to_string().parse::<Share>(), Ok(s));
    }

    #[test]
    fn decode_ignores_surrounding_whitespace() {
        let encoded = format!("  {}\n", b64("1:10,20"));
        assert_eq!(Share::decode(&encoded), Ok(share(1, &[10, 20])));
    }

    #[test]
    fn empty_secret_share() {
        let s = share(2, &[]);
        assert_eq!(s.encode(), b64("2:"));
        assert_eq!(Share::decode(&b64("2:")), Ok(s));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(
            Share::decode("not base64!"),
            Err(ShareFormatError::Base64(_))
        ));
        let truncated = b64("1:10,20,30");
        assert!(matches!(
            Share::decode(&truncated[..truncated.len() - 1]),
            Err(ShareFormatError::Base64(_))
        ));
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let encoded = general_purpose::STANDARD.encode([0xff, 0xfe, b':', b'1']);
        assert_eq!(Share::decode(&encoded), Err(ShareFormatError::Utf8));
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(
            Share::decode(&b64("1,2,3")),
            Err(ShareFormatError::MissingSeparator)
        );
    }

    #[test]
    fn rejects_bad_tokens() {
        for plain in ["x:1,2", ":1,2", "1:1,,2", "1:1,2,", "1:-1", "1: 2", "+1:2"] {
            assert!(
                matches!(
                    Share::decode(&b64(plain)),
                    Err(ShareFormatError::InvalidInteger(_))
                ),
                "{plain:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Share::decode(&b64("0:1")),
            Err(ShareFormatError::XOutOfRange(0))
        );
        assert_eq!(
            Share::decode(&b64("257:1")),
            Err(ShareFormatError::XOutOfRange(257))
        );
        assert_eq!(
            Share::decode(&b64("1:5,257")),
            Err(ShareFormatError::YOutOfRange(257))
        );
        assert_eq!(
            Share::decode(&b64("1:99999999")),
            Err(ShareFormatError::YOutOfRange(u16::MAX))
        );
    }
}
