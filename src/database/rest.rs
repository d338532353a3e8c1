//! Client HTTP pour l'API REST (PostgREST) de la base hébergée.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{Credentials, HealthDatabase, QueryError};
use crate::consts::HEALTH_RECORDS_TABLE;
use crate::models::{HealthRecord, Role};

/// Corps d'erreur renvoyé par PostgREST
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct RestDatabase {
    base_url: Url,
    api_key: String,
    http_client: reqwest::Client,
}

impl RestDatabase {
    pub fn new(base_url: Url, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("health-portal/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            http_client,
        })
    }

    /// URL de lecture des dossiers d'un citoyen, triés du plus récent au plus ancien
    pub fn records_url(&self, nid_number: &str) -> Result<Url, QueryError> {
        let mut url = self.endpoint(&format!("rest/v1/{HEALTH_RECORDS_TABLE}"))?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("nid_number", &format!("eq.{nid_number}"))
            .append_pair("order", "issued_date.desc");
        Ok(url)
    }

    pub fn login_url(&self, role: Role) -> Result<Url, QueryError> {
        self.endpoint(&format!("rest/v1/rpc/{}", role.login_procedure()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, QueryError> {
        self.base_url
            .join(path)
            .map_err(|e| QueryError::Query(format!("invalid database URL: {e}")))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json")
    }
}

#[async_trait]
impl HealthDatabase for RestDatabase {
    async fn fetch_records(&self, nid_number: &str) -> Result<Vec<HealthRecord>, QueryError> {
        let url = self.records_url(nid_number)?;
        debug!("Fetching health records from {}", url.path());

        let response = self
            .authorized(self.http_client.get(url))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        response
            .json::<Vec<HealthRecord>>()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))
    }

    async fn sign_in(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<serde_json::Value, QueryError> {
        let url = self.login_url(role)?;

        let response = self
            .authorized(self.http_client.post(url))
            .json(&json!({
                "identifier": credentials.identifier,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        if matches!(
            response.status(),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Err(QueryError::InvalidCredentials);
        }
        let response = check_status(response).await?;

        let row = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;
        single_row(row)
    }
}

fn transport_error(e: reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Transport("network timeout".to_string())
    } else {
        QueryError::Transport(e.to_string())
    }
}

/// Convertit une réponse non 2xx en erreur portant le message de la base
async fn check_status(response: Response) -> Result<Response, QueryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("Database responded {status}: {body}");

    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| status.to_string());
    Err(QueryError::Query(message))
}

/// Une procédure peut renvoyer un objet ou un tableau d'au plus une ligne
fn single_row(row: serde_json::Value) -> Result<serde_json::Value, QueryError> {
    match row {
        serde_json::Value::Array(mut rows) => match rows.len() {
            0 => Err(QueryError::InvalidCredentials),
            1 => Ok(rows.remove(0)),
            n => Err(QueryError::Decode(format!("expected one user row, got {n}"))),
        },
        serde_json::Value::Null => Err(QueryError::InvalidCredentials),
        object => Ok(object),
    }
}
