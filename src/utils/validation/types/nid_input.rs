//! Represents a validated national ID (NID) number.
//!
//! A NID is made of digits, optionally grouped with single dashes or spaces
//! (`123-456-789`, `123 456 789`). Spaces are normalized to dashes so that the
//! value matches the `nid_number` column exactly.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::utils::validation::{MAX_NID_DIGITS, MIN_NID_DIGITS};

// Digits, with optional single separators between groups
static NID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(?:[- ][0-9]+)*$").expect("Failed to compile NID regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NidInput {
    nid: String,
}

impl NidInput {
    pub fn new(nid: &str) -> Result<Self> {
        let trimmed = nid.trim();

        if trimmed.is_empty() {
            bail!("NID number cannot be empty");
        }

        if !NID_REGEX.is_match(trimmed) {
            bail!("NID number may only contain digits and single dashes");
        }

        let digits = trimmed.chars().filter(char::is_ascii_digit).count();
        if !(MIN_NID_DIGITS..=MAX_NID_DIGITS).contains(&digits) {
            bail!(
                "NID number must have between {} and {} digits",
                MIN_NID_DIGITS,
                MAX_NID_DIGITS
            );
        }

        Ok(Self {
            nid: trimmed.replace(' ', "-"),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.nid
    }
}

impl fmt::Display for NidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nid)
    }
}
