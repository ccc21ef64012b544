//! Set metadata types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static SET_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,8}$").expect("set code pattern is valid"));

/// A set identifier, canonicalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetCode(String);

/// Error returned when a string is not a usable set code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid set code '{0}': expected 1-8 letters or digits")]
pub struct InvalidSetCode(pub String);

impl SetCode {
    /// Parse a set code, ignoring surrounding whitespace and case.
    pub fn parse(raw: &str) -> Result<Self, InvalidSetCode> {
        let trimmed = raw.trim();
        if SET_CODE_PATTERN.is_match(trimmed) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidSetCode(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used in upstream API paths.
    pub fn to_api_form(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for SetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SetCode {
    type Err = InvalidSetCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SetCode {
    type Error = InvalidSetCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SetCode> for String {
    fn from(code: SetCode) -> Self {
        code.0
    }
}

/// Metadata for one card set, as needed to compose its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub code: SetCode,
    pub name: String,
    pub release_date: NaiveDate,
    /// Where the symbol artwork can be downloaded, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_uri: Option<String>,
}

impl SetRecord {
    /// Release date as printed on labels (MM/YYYY).
    pub fn label_date(&self) -> String {
        self.release_date.format("%m/%Y").to_string()
    }
}

/// One entry of the recent-sets listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSummary {
    pub code: String,
    pub name: String,
    pub released_at: NaiveDate,
    /// Upstream set type, e.g. `expansion` or `commander`.
    #[serde(default)]
    pub set_type: String,
}

impl SetSummary {
    /// Set type with underscores replaced and words capitalized.
    pub fn display_type(&self) -> String {
        self.set_type
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
