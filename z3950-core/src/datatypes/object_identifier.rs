//! OBJECT IDENTIFIER value type

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ASN.1 OBJECT IDENTIFIER, stored as its sequence of arcs
///
/// Z39.50 names record syntaxes, attribute sets, diagnostic sets and so on by
/// OIDs below `1.2.840.10003`.
///
/// # Invariants
/// - at least two arcs
/// - the first arc is 0, 1 or 2
/// - the second arc is below 40 unless the first arc is 2
/// - `first * 40 + second` fits in a `u32`, so it can be written as one
///   subidentifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ObjectIdentifier {
    arcs: Vec<u32>,
}

impl ObjectIdentifier {
    /// Create an object identifier from its arcs
    ///
    /// # Errors
    /// Returns `CoreError::InvalidObjectIdentifier` if any invariant is violated.
    pub fn new(arcs: Vec<u32>) -> CoreResult<Self> {
        if arcs.len() < 2 {
            return Err(CoreError::InvalidObjectIdentifier(format!(
                "need at least 2 arcs, got {}",
                arcs.len()
            )));
        }
        match arcs[0] {
            0 | 1 if arcs[1] >= 40 => {
                return Err(CoreError::InvalidObjectIdentifier(format!(
                    "second arc {} must be below 40 under first arc {}",
                    arcs[1], arcs[0]
                )));
            }
            0..=2 => {}
            first => {
                return Err(CoreError::InvalidObjectIdentifier(format!(
                    "first arc must be 0, 1 or 2, got {}",
                    first
                )));
            }
        }
        if arcs[0].checked_mul(40).and_then(|x| x.checked_add(arcs[1])).is_none() {
            return Err(CoreError::InvalidObjectIdentifier(
                "first subidentifier overflows u32".to_string(),
            ));
        }

        Ok(Self { arcs })
    }

    /// Create from a slice of arcs
    pub fn from_slice(arcs: &[u32]) -> CoreResult<Self> {
        Self::new(arcs.to_vec())
    }

    /// The arcs of this identifier
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Value of the first subidentifier on the wire (`first * 40 + second`)
    pub fn first_subidentifier(&self) -> u32 {
        self.arcs[0] * 40 + self.arcs[1]
    }

    /// Check whether `prefix` is an ancestor of (or equal to) this identifier
    pub fn starts_with(&self, prefix: &[u32]) -> bool {
        self.arcs.starts_with(prefix)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = CoreError;

    /// Parse dotted notation, e.g. `1.2.840.10003.5.10`
    fn from_str(s: &str) -> CoreResult<Self> {
        let arcs = s
            .split('.')
            .map(|part| {
                part.parse::<u32>().map_err(|_| {
                    CoreError::InvalidObjectIdentifier(format!("invalid arc '{}' in '{}'", part, s))
                })
            })
            .collect::<CoreResult<Vec<u32>>>()?;
        Self::new(arcs)
    }
}

impl TryFrom<Vec<u32>> for ObjectIdentifier {
    type Error = CoreError;

    fn try_from(arcs: Vec<u32>) -> CoreResult<Self> {
        Self::new(arcs)
    }
}

impl From<ObjectIdentifier> for Vec<u32> {
    fn from(oid: ObjectIdentifier) -> Self {
        oid.arcs
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let oid: ObjectIdentifier = "1.2.840.10003.5.10".parse().unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 10003, 5, 10]);
        assert_eq!(oid.to_string(), "1.2.840.10003.5.10");
        assert_eq!(oid.first_subidentifier(), 42);
        assert!(oid.starts_with(&[1, 2, 840, 10003]));
    }

    #[test]
    fn test_invalid_arcs() {
        assert!(ObjectIdentifier::new(vec![1]).is_err());
        assert!(ObjectIdentifier::new(vec![3, 1]).is_err());
        assert!(ObjectIdentifier::new(vec![1, 40]).is_err());
        assert!(ObjectIdentifier::new(vec![2, 999]).is_ok());
        assert!(ObjectIdentifier::new(vec![2, u32::MAX]).is_err());
        assert!("1.2.x".parse::<ObjectIdentifier>().is_err());
    }

    #[test]
    fn test_serde_validates() {
        let oid: ObjectIdentifier = serde_json::from_str("[1,2,840]").unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840]);
        assert!(serde_json::from_str::<ObjectIdentifier>("[7]").is_err());
    }
}
