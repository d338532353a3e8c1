//! Represents all possible errors in the application

use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use log::error;
use thiserror::Error;

pub const VALIDATION_ERROR: &str = "Validation failed";

pub const LOGIN_ERROR: &str = "Login failed";

pub const LOOKUP_ERROR: &str = "Invalid national ID number";

pub const FETCH_ERROR_PREFIX: &str = "Error fetching health records: ";

pub const UNEXPECTED_ERROR_PREFIX: &str = "An unexpected error occurred: ";

pub const NO_RECORDS_YET: &str = "You don't have any health records yet";

pub const NO_MATCHING_RECORDS: &str = "Try adjusting your search or filter criteria";

/// Erreurs remontées par les handlers, converties en page d'erreur générique
#[derive(Debug, Error)]
pub enum AppError {
    #[error("template rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error(transparent)]
    Storage(#[from] crate::session::StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal Server Error</h1>".to_string()),
        )
            .into_response()
    }
}
