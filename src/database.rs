//! Accès à la base de données hébergée.
//!
//! La base est un collaborateur externe: ce module ne fait que formuler les
//! requêtes (lecture des dossiers médicaux, procédure de connexion) et
//! interpréter les réponses.

pub mod memory;
pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{HealthRecord, Role};

/// Erreur d'une requête, avec un message lisible par l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// La requête n'a pas pu être transmise (réseau, délai dépassé)
    #[error("{0}")]
    Transport(String),

    /// La base a refusé la requête
    #[error("{0}")]
    Query(String),

    /// Les lignes renvoyées ne correspondent pas au modèle attendu
    #[error("{0}")]
    Decode(String),

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Identifiants saisis sur une page de connexion
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

#[async_trait]
pub trait HealthDatabase: Send + Sync {
    /// `SELECT * FROM health_records WHERE nid_number = :nid ORDER BY issued_date DESC`
    async fn fetch_records(&self, nid_number: &str) -> Result<Vec<HealthRecord>, QueryError>;

    /// Appelle la procédure de connexion du rôle et renvoie la ligne utilisateur
    async fn sign_in(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<serde_json::Value, QueryError>;
}
