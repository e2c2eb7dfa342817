//! Typed identifier for media assets.
//!
//! Asset ids arrive in URL paths and are mapped onto storage keys, so the
//! newtype only admits values that cannot escape the storage root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Maximum accepted length of an asset id.
const MAX_ID_LEN: usize = 128;

/// Unique identifier for a streamable asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AssetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > MAX_ID_LEN {
            return Err(Error::invalid_input(format!(
                "asset id must be 1..={MAX_ID_LEN} characters"
            )));
        }
        if s.starts_with('.') {
            return Err(Error::invalid_input("asset id must not start with '.'"));
        }
        let valid = s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid || s.contains("..") {
            return Err(Error::invalid_input(format!("invalid asset id: {s}")));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AssetId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
