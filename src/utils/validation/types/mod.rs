//! Type definitions for the validation system

mod nid_input;
mod password_input;
mod text_input;

// Re-export commonly used types and functions
pub use nid_input::NidInput;
pub use password_input::PasswordInput;
pub use text_input::TextInput;
