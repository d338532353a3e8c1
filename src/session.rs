//! Persistance de l'utilisateur connecté de chaque portail.
//!
//! Le stockage clé-valeur est celui du navigateur: la session cookie gérée par
//! `tower-sessions`. Chaque rôle a sa propre clé et la valeur est le JSON de
//! l'utilisateur. Une valeur absente ou illisible équivaut à "pas connecté".

use async_trait::async_trait;
use log::warn;
use thiserror::Error;
use tower_sessions::Session;

use crate::models::{CitizenUser, GovUser, HospitalUser, PortalUser, Role};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage failure: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Failed to serialize session value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[cfg(test)]
    #[error("Storage poisoned")]
    Poisoned,
}

/// Stockage clé-valeur durable, à la manière du `localStorage` d'un navigateur
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl KeyValueStorage for Session {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get::<String>(key).await?)
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.insert(key, value).await?;
        // Write through to the store now instead of at the end of the request
        self.save().await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove_value(key).await?;
        self.save().await?;
        Ok(())
    }
}

#[cfg(test)]
use std::{collections::HashMap, sync::RwLock};

/// Stockage en mémoire, utilisé dans les tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

#[cfg(test)]
#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().or(Err(StorageError::Poisoned))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.items.write().or(Err(StorageError::Poisoned))?;
        items.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().or(Err(StorageError::Poisoned))?;
        items.remove(key);
        Ok(())
    }
}

/// Contexte de session passé aux handlers, un accesseur par rôle
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Charge l'utilisateur du rôle `U::ROLE`, ou `None` s'il n'y en a pas
    /// ou si la valeur stockée est illisible.
    pub async fn load<U: PortalUser>(&self) -> Option<U> {
        let key = U::ROLE.storage_key();

        let raw = match self.storage.get_item(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read {key} from session: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding malformed {key} session value: {e}");
                None
            }
        }
    }

    pub async fn save<U: PortalUser>(&self, user: &U) -> Result<(), StorageError> {
        let value = serde_json::to_string(user)?;
        self.storage.set_item(U::ROLE.storage_key(), value).await
    }

    pub async fn clear(&self, role: Role) -> Result<(), StorageError> {
        self.storage.remove_item(role.storage_key()).await
    }

    pub async fn citizen(&self) -> Option<CitizenUser> {
        self.load().await
    }

    pub async fn hospital(&self) -> Option<HospitalUser> {
        self.load().await
    }

    pub async fn government(&self) -> Option<GovUser> {
        self.load().await
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citizen() -> CitizenUser {
        CitizenUser {
            nid_number: "123-456-789".to_string(),
            full_name: "Sita Sharma".to_string(),
            blood_group: Some("O+".to_string()),
            date_of_birth: Some("1990-04-12".to_string()),
            age: Some(34),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_load_returns_last_saved_user() {
        let store = SessionStore::new(MemoryStorage::default());
        assert!(store.citizen().await.is_none());

        store.save(&citizen()).await.unwrap();
        let mut renamed = citizen();
        renamed.full_name = "Sita S.".to_string();
        store.save(&renamed).await.unwrap();

        assert_eq!(store.citizen().await, Some(renamed));
    }

    #[tokio::test]
    async fn test_clear_removes_only_that_role() {
        let store = SessionStore::new(MemoryStorage::default());
        store.save(&citizen()).await.unwrap();
        store
            .save(&GovUser {
                employee_id: "G-1".to_string(),
                full_name: "Ram Thapa".to_string(),
                office: None,
                designation: None,
                phone: None,
            })
            .await
            .unwrap();

        store.clear(Role::Citizen).await.unwrap();

        assert!(store.citizen().await.is_none());
        assert!(store.government().await.is_some());
    }

    #[tokio::test]
    async fn test_malformed_value_is_absent() {
        let store = SessionStore::new(MemoryStorage::default());
        store
            .storage()
            .set_item("citizenUser", "{not json".to_string())
            .await
            .unwrap();
        store
            .storage()
            .set_item("hospitalUser", r#"{"unexpected": true}"#.to_string())
            .await
            .unwrap();

        assert!(store.citizen().await.is_none());
        assert!(store.hospital().await.is_none());
    }

    #[tokio::test]
    async fn test_value_is_json_text_under_role_key() {
        let store = SessionStore::new(MemoryStorage::default());
        store.save(&citizen()).await.unwrap();

        let raw = store.storage().get_item("citizenUser").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["nid_number"], "123-456-789");
    }
}
