//! Gestion des routes nécessitant une authentification utilisateur.
//! Les tableaux de bord citoyen et hôpital sont gardés par l'extracteur `Authenticated`,
//! celui du gouvernement par `guard` sur l'accesseur de session du rôle.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use log::info;
use serde_json::json;
use tower_sessions::Session;

use crate::backend::middlewares::{guard, Access, Authenticated};
use crate::backend::{render, AppState};
use crate::models::{CitizenUser, HospitalUser, Role};
use crate::records::fetcher::RecordFetcher;
use crate::records::view::{RecordsQuery, RecordsView};
use crate::session::SessionStore;
use crate::utils::error_messages::{AppError, LOOKUP_ERROR};
use crate::utils::validation::NidInput;

/// Charge les dossiers de `nid_number` et construit la vue filtrée.
///
/// Le chargement est annulé si la requête est abandonnée avant la réponse.
async fn records_view(app: &AppState, nid_number: &str, query: &RecordsQuery, base_path: &str) -> RecordsView {
    let mut fetcher = RecordFetcher::new(app.database.clone());
    fetcher.trigger(nid_number);
    let state = fetcher.settled().await;
    RecordsView::build(&state, query, base_path)
}

/// Tableau de bord du citoyen: ses propres dossiers médicaux
pub async fn citizen_dashboard(
    State(app): State<AppState>,
    Authenticated(user): Authenticated<CitizenUser>,
    Query(mut query): Query<RecordsQuery>,
) -> Result<impl IntoResponse, AppError> {
    // A citizen only ever sees their own records
    query.nid = None;
    let records = records_view(&app, &user.nid_number, &query, Role::Citizen.dashboard_path()).await;

    render(
        &app.hbs,
        "citizen_dashboard",
        &json!({
            "user": user,
            "records": records,
            "logout": Role::Citizen.logout_path(),
            "dashboard": Role::Citizen.dashboard_path(),
        }),
    )
}

/// Tableau de bord hospitalier: consultation des dossiers d'un patient par NID
pub async fn hospital_dashboard(
    State(app): State<AppState>,
    Authenticated(user): Authenticated<HospitalUser>,
    Query(mut query): Query<RecordsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let base_path = Role::Hospital.dashboard_path();
    let lookup = query.nid.clone().filter(|nid| !nid.trim().is_empty());

    let (records, lookup_error) = match lookup {
        None => (None, None),
        Some(raw) => match NidInput::new(&raw) {
            Ok(nid) => {
                query.nid = Some(nid.to_string());
                (Some(records_view(&app, nid.as_str(), &query, base_path).await), None)
            }
            Err(e) => {
                info!("Rejected patient lookup: {:#}", e);
                (None, Some(LOOKUP_ERROR))
            }
        },
    };

    render(
        &app.hbs,
        "hospital_dashboard",
        &json!({
            "user": user,
            "patient_nid": query.nid,
            "lookup_error": lookup_error,
            "records": records,
            "logout": Role::Hospital.logout_path(),
            "dashboard": base_path,
        }),
    )
}

/// Tableau de bord gouvernemental, gardé directement par l'accesseur de session
pub async fn gov_dashboard(
    State(app): State<AppState>,
    store: SessionStore<Session>,
) -> Result<Response, AppError> {
    let user = match guard(store.government().await, Role::Government.login_path()) {
        Access::Granted(user) => user,
        Access::Redirect(to) => return Ok(Redirect::to(to).into_response()),
    };

    let page = render(
        &app.hbs,
        "gov_dashboard",
        &json!({
            "user": user,
            "logout": Role::Government.logout_path(),
        }),
    )?;
    Ok(page.into_response())
}
