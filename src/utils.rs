//! Utilitaires partagés: messages d'erreur et validation des saisies.
pub mod error_messages;
pub mod validation;
