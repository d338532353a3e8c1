//! Constants used throughout the validation system


/// Maximum length for staff and employee identifiers
pub const MAX_IDENTIFIER_LENGTH: usize = 64;
/// Maximum length for a password sent to the sign-in procedure
pub const MAX_PASSWORD_LENGTH: usize = 128;
/// Minimum and maximum number of digits in a national ID number
pub const MIN_NID_DIGITS: usize = 6;
pub const MAX_NID_DIGITS: usize = 16;
