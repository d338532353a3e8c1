//! Chargement des dossiers médicaux d'un identifiant.
//!
//! Chaque chargement tourne dans une tâche tokio marquée d'un numéro de
//! génération. Un nouveau déclenchement pour un autre identifiant, ou la
//! destruction du `RecordFetcher`, annule la tâche précédente; un résultat
//! arrivé d'une génération périmée est ignoré.

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex},
};

use futures::FutureExt;
use log::{debug, error};
use tokio::{sync::watch, task::JoinHandle};

use crate::database::HealthDatabase;
use crate::models::HealthRecord;
use crate::utils::error_messages::{FETCH_ERROR_PREFIX, UNEXPECTED_ERROR_PREFIX};

/// Cycle de vie d'un chargement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Loading,
    Loaded(Vec<HealthRecord>),
    Errored(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Dossiers chargés; vide tant que rien n'est chargé ou en cas d'erreur
    pub fn records(&self) -> &[HealthRecord] {
        match self {
            FetchState::Loaded(records) => records,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Errored(message) => Some(message),
            _ => None,
        }
    }
}

struct InFlight {
    identifier: String,
    task: JoinHandle<()>,
}

pub struct RecordFetcher {
    database: Arc<dyn HealthDatabase>,
    state: Arc<watch::Sender<FetchState>>,
    generation: Arc<Mutex<u64>>,
    in_flight: Option<InFlight>,
}

impl RecordFetcher {
    pub fn new(database: Arc<dyn HealthDatabase>) -> Self {
        let (state, _) = watch::channel(FetchState::Loading);
        Self {
            database,
            state: Arc::new(state),
            generation: Arc::new(Mutex::new(0)),
            in_flight: None,
        }
    }

    /// Lance le chargement pour `identifier`.
    ///
    /// Sans effet si le dernier chargement concerne déjà cet identifiant.
    pub fn trigger(&mut self, identifier: &str) {
        if let Some(in_flight) = &self.in_flight {
            if in_flight.identifier == identifier {
                return;
            }
        }
        self.cancel();

        let generation = {
            let mut current = lock(&self.generation);
            *current += 1;
            *current
        };
        self.state.send_replace(FetchState::Loading);

        let task = tokio::spawn(run_fetch(
            self.database.clone(),
            identifier.to_string(),
            self.state.clone(),
            self.generation.clone(),
            generation,
        ));

        self.in_flight = Some(InFlight {
            identifier: identifier.to_string(),
            task,
        });
    }

    /// Annule le chargement en cours; son résultat ne sera jamais publié
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            *lock(&self.generation) += 1;
            debug!("Cancelled health records fetch for {}", in_flight.identifier);
        }
    }

    /// État courant, sans attendre
    pub fn snapshot(&self) -> FetchState {
        self.state.borrow().clone()
    }

    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Attend la fin du chargement en cours et renvoie l'état obtenu.
    /// Sans chargement déclenché, renvoie l'état courant.
    pub async fn settled(&self) -> FetchState {
        if self.in_flight.is_none() {
            return self.snapshot();
        }

        self.state
            .subscribe()
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone())
            .unwrap_or(FetchState::Loading)
    }
}

impl Drop for RecordFetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(generation: &Mutex<u64>) -> std::sync::MutexGuard<'_, u64> {
    generation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_fetch(
    database: Arc<dyn HealthDatabase>,
    identifier: String,
    state: Arc<watch::Sender<FetchState>>,
    generation: Arc<Mutex<u64>>,
    expected: u64,
) {
    let outcome = AssertUnwindSafe(database.fetch_records(&identifier))
        .catch_unwind()
        .await;

    let next = match outcome {
        Ok(Ok(records)) => {
            debug!("Fetched {} health records", records.len());
            FetchState::Loaded(records)
        }
        Ok(Err(e)) => {
            error!("Fetch error: {e:?}");
            FetchState::Errored(format!("{FETCH_ERROR_PREFIX}{e}"))
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Error: health records fetch panicked: {message}");
            FetchState::Errored(format!("{UNEXPECTED_ERROR_PREFIX}{message}"))
        }
    };

    // Publish under the lock so a concurrent cancel cannot interleave
    let current = lock(&generation);
    if *current == expected {
        state.send_replace(next);
    } else {
        debug!("Ignoring stale health records for {identifier}");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown error".to_string()
    }
}
