//! Base de données en mémoire, chargée depuis un fichier YAML.
//!
//! Utilisée hors ligne (aucune `SUPABASE_URL` configurée) et dans les tests.
//! Elle reproduit la sémantique de la base hébergée: filtre exact sur
//! l'identifiant et tri par date d'émission décroissante.

use std::{fs::File, io::ErrorKind::NotFound, path::Path};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use super::{Credentials, HealthDatabase, QueryError};
use crate::models::{HealthRecord, Role};

/// Un compte de démonstration: mot de passe et ligne utilisateur
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Account {
    pub password: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct MemoryDatabase {
    #[serde(default)]
    pub citizens: Vec<Account>,
    #[serde(default)]
    pub hospitals: Vec<Account>,
    #[serde(default)]
    pub officials: Vec<Account>,
    #[serde(default)]
    pub records: Vec<HealthRecord>,
}

impl MemoryDatabase {
    /// Charge la base depuis le fichier YAML; un fichier absent donne une base vide
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => {
                let database: Self = serde_yaml::from_reader(file)
                    .with_context(|| format!("Failed to parse seed database {}", path.display()))?;
                for role in Role::iter() {
                    info!("{} {} account(s) loaded", database.accounts(role).len(), role);
                }
                info!("{} health record(s) loaded", database.records.len());
                Ok(database)
            }
            Err(not_found) if not_found.kind() == NotFound => {
                info!("Seed database {} not found, starting empty", path.display());
                Ok(Self::default())
            }
            Err(other) => Err(other)
                .with_context(|| format!("Failed to open seed database {}", path.display())),
        }
    }

    fn accounts(&self, role: Role) -> &[Account] {
        match role {
            Role::Citizen => &self.citizens,
            Role::Hospital => &self.hospitals,
            Role::Government => &self.officials,
        }
    }
}

/// Colonne identifiant la ligne utilisateur de chaque rôle
fn identifier_column(role: Role) -> &'static str {
    match role {
        Role::Citizen => "nid_number",
        Role::Hospital => "staff_id",
        Role::Government => "employee_id",
    }
}

fn column_matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        _ => false,
    }
}

#[async_trait]
impl HealthDatabase for MemoryDatabase {
    async fn fetch_records(&self, nid_number: &str) -> Result<Vec<HealthRecord>, QueryError> {
        let mut records: Vec<HealthRecord> = self
            .records
            .iter()
            .filter(|record| record.nid_number == nid_number)
            .cloned()
            .collect();

        records.sort_by(|a, b| b.issued_date.cmp(&a.issued_date));
        Ok(records)
    }

    async fn sign_in(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<Value, QueryError> {
        let column = identifier_column(role);

        self.accounts(role)
            .iter()
            .find(|account| {
                column_matches(account.profile.get(column), &credentials.identifier)
                    && account.password == credentials.password
            })
            .map(|account| Value::Object(account.profile.clone()))
            .ok_or(QueryError::InvalidCredentials)
    }
}
