//! Module principal pour le backend de l'application.
//! Contient les gestionnaires pour les routes, les modèles de données,
//! le routeur, et les middlewares.
pub mod handlers_auth;
mod models;
pub mod middlewares;
pub mod router;
pub mod handlers_unauth;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::database::HealthDatabase;
use crate::utils::error_messages::AppError;

/// État partagé par tous les handlers
#[derive(Clone)]
pub struct AppState {
    pub hbs: Arc<Handlebars<'static>>,
    pub database: Arc<dyn HealthDatabase>,
}

impl AppState {
    pub fn new(hbs: Handlebars<'static>, database: Arc<dyn HealthDatabase>) -> Self {
        Self {
            hbs: Arc::new(hbs),
            database,
        }
    }
}

/// Charge tous les templates `.hbs` du dossier
pub fn load_templates(dir: &Path) -> anyhow::Result<Handlebars<'static>> {
    let mut hbs = Handlebars::new();
    hbs.register_templates_directory(".hbs", dir)
        .with_context(|| format!("Could not register template directory {}", dir.display()))?;
    Ok(hbs)
}

/// Rend un template en page HTML
pub(crate) fn render<T: Serialize>(
    hbs: &Handlebars<'_>,
    name: &str,
    data: &T,
) -> Result<Html<String>, AppError> {
    Ok(Html(hbs.render(name, data)?))
}
