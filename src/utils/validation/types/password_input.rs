//! Represents a password typed on a login form.
//!
//! The password is checked by the database's sign-in procedure; here we only
//! reject values that cannot possibly be valid. The value is never trimmed or
//! normalized, and `Debug` does not print it.

use anyhow::{bail, Result};
use std::fmt;

use crate::utils::validation::MAX_PASSWORD_LENGTH;

#[derive(Clone, PartialEq, Eq)]
pub struct PasswordInput {
    password: String,
}

impl PasswordInput {
    pub fn new(password: &str) -> Result<Self> {
        if password.is_empty() {
            bail!("Password cannot be empty");
        }

        if password.chars().count() > MAX_PASSWORD_LENGTH {
            bail!("Password exceeds maximum length of {} characters", MAX_PASSWORD_LENGTH);
        }

        Ok(Self {
            password: password.to_string(),
        })
    }

    pub fn expose(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for PasswordInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordInput(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bounds() {
        assert!(PasswordInput::new("").is_err());
        assert!(PasswordInput::new(&"p".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
        assert_eq!(PasswordInput::new(" spaced ").unwrap().expose(), " spaced ");
    }

    #[test]
    fn test_debug_hides_password() {
        let password = PasswordInput::new("hunter2").unwrap();
        assert!(!format!("{:?}", password).contains("hunter2"));
    }
}
