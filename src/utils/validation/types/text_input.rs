//! Provides a validated single-line text input, used for staff and employee
//! identifiers on the login forms.
//!
//! This module ensures that the input:
//! - Is not empty once trimmed
//! - Respects the identifier length limit
//! - Contains no control characters
//! - Is Unicode-normalized (NFKC)

use anyhow::{bail, Context, Result};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use validator::ValidateNonControlCharacter;

use crate::utils::validation::MAX_IDENTIFIER_LENGTH;

/// Represents validated textual content that is guaranteed to be safe for use
/// as a lookup key. This type can only be constructed through validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextInput {
    // The validated and normalized text content
    text_content: String,
}

impl TextInput {
    /// Creates a new TextInput for an identifier typed on a login form.
    ///
    /// # Arguments
    /// * `content` - The raw identifier
    pub fn new_identifier(content: &str) -> Result<Self> {
        Self::new(content, MAX_IDENTIFIER_LENGTH).context("Failed to create identifier")
    }

    /// Internal function that performs the actual validation and creation.
    fn new(content: &str, max_length: usize) -> Result<Self> {
        // First, normalize whitespace by trimming
        let trimmed = content.trim();

        if trimmed.is_empty() {
            bail!("Content cannot be empty");
        }

        if trimmed.chars().count() > max_length {
            bail!("Content exceeds maximum length of {} characters", max_length);
        }

        if !trimmed.validate_non_control_character() {
            bail!("Content contains invalid control characters");
        }

        // Normalize Unicode characters to ensure consistent representation
        let normalized = trimmed.nfkc().collect::<String>();

        Ok(Self {
            text_content: normalized,
        })
    }
}

/// Implements Display to allow printing the text content
impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text_content)
    }
}
