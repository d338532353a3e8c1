//! Lecture, filtrage et présentation des dossiers médicaux.
pub mod fetcher;
pub mod filter;
pub mod view;
