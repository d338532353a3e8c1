//! Root module for the validation system.
//! Exposes the public API for form input validation.

mod types;
mod constants;

// Re-export commonly used types and functions
pub use constants::*;
pub use types::{NidInput, PasswordInput, TextInput};
