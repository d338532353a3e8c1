//! Configuration de l'application, lue depuis l'environnement (et `.env`).

use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

use crate::consts;

/// Source des données médicales
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// API REST de la base hébergée
    Remote { url: Url, key: String },
    /// Fichier YAML local, pour le développement hors ligne
    Seed { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http_port: u16,
    pub database: DatabaseConfig,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture des variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_port = match var("HTTP_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .with_context(|| format!("Invalid HTTP_PORT: {port}"))?,
            None => consts::HTTP_PORT,
        };

        let fetch_timeout = match var("FETCH_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("Invalid FETCH_TIMEOUT_SECS: {secs}"))?,
            ),
            None => Duration::from_secs(consts::FETCH_TIMEOUT_SECS),
        };

        let database = match var("SUPABASE_URL") {
            Some(raw) => {
                let mut url = Url::parse(raw.trim())
                    .with_context(|| format!("Invalid SUPABASE_URL: {raw}"))?;
                if url.cannot_be_a_base() {
                    bail!("SUPABASE_URL must be an absolute http(s) URL");
                }
                // Endpoints are joined relative to the base, which needs a trailing slash
                if !url.path().ends_with('/') {
                    let path = format!("{}/", url.path());
                    url.set_path(&path);
                }
                let key = var("SUPABASE_KEY")
                    .ok_or_else(|| anyhow!("SUPABASE_KEY is required when SUPABASE_URL is set"))?;
                DatabaseConfig::Remote { url, key }
            }
            None => DatabaseConfig::Seed {
                path: var("SEED_DB_PATH")
                    .unwrap_or_else(|| consts::SEED_DB_PATH.to_string())
                    .into(),
            },
        };

        Ok(Self {
            http_port,
            database,
            fetch_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_use_seed_database() {
        let config = config(&[]).unwrap();
        assert_eq!(config.http_port, consts::HTTP_PORT);
        assert_eq!(
            config.database,
            DatabaseConfig::Seed {
                path: PathBuf::from(consts::SEED_DB_PATH)
            }
        );
        assert_eq!(config.fetch_timeout, Duration::from_secs(consts::FETCH_TIMEOUT_SECS));
    }

    #[test]
    fn test_remote_database() {
        let config = config(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_KEY", "anon"),
            ("HTTP_PORT", "3000"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 3000);
        match config.database {
            DatabaseConfig::Remote { url, key } => {
                assert_eq!(url.as_str(), "https://abc.supabase.co/");
                assert_eq!(key, "anon");
            }
            other => panic!("unexpected database config: {:?}", other),
        }
    }

    #[test]
    fn test_url_without_key_is_rejected() {
        assert!(config(&[("SUPABASE_URL", "https://abc.supabase.co")]).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config(&[("HTTP_PORT", "eighty")]).is_err());
        assert!(config(&[("SUPABASE_URL", "not a url"), ("SUPABASE_KEY", "k")]).is_err());
    }

    #[test]
    fn test_blank_url_falls_back_to_seed() {
        let config = config(&[("SUPABASE_URL", "  "), ("SEED_DB_PATH", "/tmp/seed.yaml")]).unwrap();
        assert_eq!(
            config.database,
            DatabaseConfig::Seed {
                path: PathBuf::from("/tmp/seed.yaml")
            }
        );
    }
}
