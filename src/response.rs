//! Response decoding.
//!
//! The server answers with a flat list of register readings, each encoded as
//! `#<identifier>[<value>]`, followed by a carriage return:
//!
//! ```text
//! #A@3&valeur[21.5]#A@1&valeur[48.0]#O@1&valeur[1]\r
//! ```
//!
//! Identifiers look like `<letter>@<number>&valeur`. Values are raw strings and
//! may be empty. When an identifier appears twice the last reading wins.
//!
//! # Example
//!
//! ```
//! use iregul::decode;
//!
//! let snapshot = decode("#A@3&valeur[21.5]#O@1&valeur[1]").unwrap();
//! assert_eq!(snapshot.get("A@3&valeur"), Some("21.5"));
//! assert_eq!(snapshot.get("O@1&valeur"), Some("1"));
//! assert_eq!(snapshot.len(), 2);
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Prefix of the response sent when the credentials are rejected.
pub const AUTH_FAILURE_PREFIX: &[u8] = b"PWD}";

/// Byte terminating every response.
pub const RESPONSE_TERMINATOR: u8 = b'\r';

const READING_PATTERN: &str = r"#(\w+@\d+&\w+)\[(.*?)\]";

static READING_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn reading_regex() -> Result<&'static Regex> {
    READING_REGEX
        .get_or_init(|| Regex::new(READING_PATTERN))
        .as_ref()
        .map_err(|err| Error::malformed_response(format!("invalid reading pattern: {err}")))
}

/// Immutable set of readings produced by one successful decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Snapshot {
    values: HashMap<String, String>,
}

impl Snapshot {
    /// Returns the raw value stored for `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Returns whether a value is stored for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the snapshot holds no readings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(identifier, raw value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Decodes a raw response body.
    ///
    /// The body must be valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedResponse` if the body is not UTF-8 or a
    /// reading cannot be extracted.
    ///
    /// # Example
    ///
    /// ```
    /// use iregul::Snapshot;
    ///
    /// let snapshot = Snapshot::from_bytes(b"#M@26&valeur[1234]\r").unwrap();
    /// assert_eq!(snapshot.get("M@26&valeur"), Some("1234"));
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).map_err(|err| {
            Error::malformed_response(format!("payload is not valid UTF-8: {err}"))
        })?;
        decode(text)
    }
}

impl From<HashMap<String, String>> for Snapshot {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

/// Decodes every `#<identifier>[<value>]` reading in `raw`.
///
/// Text between readings is ignored, so an input without readings (including
/// the empty string) yields an empty snapshot.
///
/// # Errors
///
/// Returns `Error::MalformedResponse` if a match does not yield both an
/// identifier and a value. No partial snapshot is returned.
pub fn decode(raw: &str) -> Result<Snapshot> {
    let regex = reading_regex()?;
    let mut values = HashMap::new();

    for captures in regex.captures_iter(raw) {
        match (captures.get(1), captures.get(2)) {
            (Some(id), Some(value)) => {
                values.insert(id.as_str().to_string(), value.as_str().to_string());
            }
            _ => {
                return Err(Error::malformed_response(format!(
                    "incomplete reading at offset {}",
                    captures.get(0).map_or(0, |m| m.start())
                )));
            }
        }
    }

    Ok(Snapshot { values })
}

/// Returns whether the response reports rejected credentials.
pub fn is_auth_failure(data: &[u8]) -> bool {
    data.starts_with(AUTH_FAILURE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_readings() {
        let snapshot = decode("#A@3&valeur[21.5]#O@1&valeur[1]").unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("A@3&valeur"), Some("21.5"));
        assert_eq!(snapshot.get("O@1&valeur"), Some("1"));
    }

    #[test]
    fn test_decode_last_duplicate_wins() {
        let snapshot = decode("#A@1&valeur[10]#A@1&valeur[20]").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("A@1&valeur"), Some("20"));
    }

    #[test]
    fn test_decode_empty_input() {
        let snapshot = decode("").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_decode_no_readings() {
        let snapshot = decode("hello\r").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_decode_is_idempotent() {
        let raw = "#A@3&valeur[21.5]#M@26&valeur[1234]#O@3&valeur[0]\r";
        assert_eq!(decode(raw).unwrap(), decode(raw).unwrap());
    }

    #[test]
    fn test_decode_empty_value() {
        let snapshot = decode("#A@3&valeur[]#A@1&valeur[48]").unwrap();

        assert_eq!(snapshot.get("A@3&valeur"), Some(""));
        assert_eq!(snapshot.get("A@1&valeur"), Some("48"));
    }

    #[test]
    fn test_decode_value_stops_at_first_bracket() {
        let snapshot = decode("#A@3&valeur[1]2]").unwrap();
        assert_eq!(snapshot.get("A@3&valeur"), Some("1"));
    }

    #[test]
    fn test_decode_skips_noise() {
        let snapshot = decode("{10#}#A@3&valeur[-2.5]junk#bad[1]#O@1&valeur[1]\r").unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("A@3&valeur"), Some("-2.5"));
        assert!(!snapshot.contains("bad"));
    }

    #[test]
    fn test_decode_unterminated_value_is_ignored() {
        let snapshot = decode("#A@3&valeur[21.5]#A@1&valeur[48").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains("A@1&valeur"));
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let err = Snapshot::from_bytes(&[b'#', 0xFF, 0xFE, b'\r']).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn test_from_bytes() {
        let snapshot = Snapshot::from_bytes(b"#A@3&valeur[21.5]\r").unwrap();
        assert_eq!(snapshot.get("A@3&valeur"), Some("21.5"));
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(is_auth_failure(b"PWD}\r"));
        assert!(is_auth_failure(b"PWD}"));
        assert!(!is_auth_failure(b"#A@3&valeur[PWD}]\r"));
        assert!(!is_auth_failure(b""));
    }

    #[test]
    fn test_snapshot_iter() {
        let snapshot = decode("#A@3&valeur[21.5]").unwrap();
        let pairs: Vec<_> = snapshot.iter().collect();
        assert_eq!(pairs, vec![("A@3&valeur", "21.5")]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_serialize() {
        let snapshot = decode("#A@3&valeur[21.5]").unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"A@3&valeur":"21.5"}"#);
    }
}
