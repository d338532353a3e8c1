//! Point d'entrée principal de l'application.
//! Charge la configuration, choisit la base de données (hébergée ou locale),
//! configure Handlebars pour le rendu des templates et démarre le serveur web avec Axum.

mod backend;
mod config;
mod consts;
mod database;
mod models;
mod records;
mod session;
mod utils;

use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use dotenv::dotenv;
use log::info;

use crate::{
    backend::{load_templates, AppState},
    config::{Config, DatabaseConfig},
    database::{memory::MemoryDatabase, rest::RestDatabase, HealthDatabase},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement
    dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::from_env()?;

    // Choisir la source des dossiers médicaux
    let database: Arc<dyn HealthDatabase> = match &config.database {
        DatabaseConfig::Remote { url, key } => {
            info!("Using hosted database at {}", url);
            Arc::new(RestDatabase::new(url.clone(), key.clone(), config.fetch_timeout)?)
        }
        DatabaseConfig::Seed { path } => {
            info!("SUPABASE_URL not set, using seed database {}", path.display());
            Arc::new(MemoryDatabase::load(path)?)
        }
    };

    let hbs = load_templates(Path::new(consts::TEMPLATES_DIR))?;
    let app = backend::router::get_router(AppState::new(hbs, database));

    // Démarrer le serveur web
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to open web server listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("Failed to bind Axum to listener")?;

    Ok(())
}
