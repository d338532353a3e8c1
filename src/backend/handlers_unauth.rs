//! Gestion des routes accessibles sans authentification.
//! Contient la page de sélection du portail, les pages de connexion de chaque
//! portail et la déconnexion.

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use log::{error, info, warn};
use serde_json::json;
use tower_sessions::Session;

use crate::backend::middlewares::forward_if_authenticated;
use crate::backend::models::{LoginForm, LoginPage};
use crate::backend::{render, AppState};
use crate::database::{Credentials, QueryError};
use crate::models::{PortalUser, Role};
use crate::session::SessionStore;
use crate::utils::error_messages::{AppError, LOGIN_ERROR, VALIDATION_ERROR};
use crate::utils::validation::{NidInput, PasswordInput, TextInput};

/// Affiche la page d'accueil (choix du portail), avec les sessions déjà ouvertes
pub async fn index(
    State(app): State<AppState>,
    store: SessionStore<Session>,
) -> Result<impl IntoResponse, AppError> {
    let citizen = store.citizen().await;
    let hospital = store.hospital().await;

    render(
        &app.hbs,
        "index",
        &json!({
            "citizen": Role::Citizen.login_path(),
            "hospital": Role::Hospital.login_path(),
            "citizen_name": citizen.as_ref().map(|u| u.display_name()),
            "hospital_name": hospital.as_ref().map(|u| u.display_name()),
        }),
    )
}

/// Affiche la page de connexion, ou redirige vers le tableau de bord si déjà connecté
pub async fn login_page<U: PortalUser>(
    State(app): State<AppState>,
    store: SessionStore<Session>,
) -> Result<Response, AppError> {
    if let Some(dashboard) = forward_if_authenticated(&store.load::<U>().await, U::ROLE.dashboard_path()) {
        return Ok(Redirect::to(dashboard).into_response());
    }

    Ok(render(&app.hbs, "login", &LoginPage::new(U::ROLE, "", None))?.into_response())
}

/// Vérifie les identifiants auprès de la base et ouvre la session du portail
pub async fn login<U: PortalUser>(
    State(app): State<AppState>,
    store: SessionStore<Session>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let role = U::ROLE;

    if let Some(dashboard) = forward_if_authenticated(&store.load::<U>().await, role.dashboard_path()) {
        return Ok(Redirect::to(dashboard).into_response());
    }

    let credentials = match validate_credentials(role, &form) {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!("Rejected {} login form: {:#}", role, e);
            return login_failed(&app, role, &form, StatusCode::BAD_REQUEST, VALIDATION_ERROR);
        }
    };

    let row = match app.database.sign_in(role, &credentials).await {
        Ok(row) => row,
        Err(QueryError::InvalidCredentials) => {
            info!("Invalid credentials on the {} portal", role);
            return login_failed(&app, role, &form, StatusCode::UNAUTHORIZED, LOGIN_ERROR);
        }
        Err(e) => {
            error!("Sign-in on the {} portal failed: {:?}", role, e);
            return login_failed(&app, role, &form, StatusCode::SERVICE_UNAVAILABLE, LOGIN_ERROR);
        }
    };

    let user: U = match serde_json::from_value(row) {
        Ok(user) => user,
        Err(e) => {
            error!("Malformed {} user row: {}", role, e);
            return login_failed(&app, role, &form, StatusCode::BAD_GATEWAY, LOGIN_ERROR);
        }
    };

    store.save(&user).await?;
    info!("{} ({}) signed in on the {} portal", user.display_name(), user.identifier(), role);

    Ok(Redirect::to(role.dashboard_path()).into_response())
}

/// Gère la déconnexion de l'utilisateur du portail
pub async fn logout<U: PortalUser>(store: SessionStore<Session>) -> Result<Redirect, AppError> {
    store.clear(U::ROLE).await?;
    info!("Signed out of the {} portal", U::ROLE);
    Ok(Redirect::to(U::ROLE.login_path()))
}

/// Toute autre adresse renvoie à l'accueil
pub async fn fallback() -> Redirect {
    Redirect::to("/")
}

fn validate_credentials(role: Role, form: &LoginForm) -> anyhow::Result<Credentials> {
    let identifier = match role {
        Role::Citizen => NidInput::new(&form.identifier)?.to_string(),
        Role::Hospital | Role::Government => TextInput::new_identifier(&form.identifier)?.to_string(),
    };
    let password = PasswordInput::new(&form.password)?;

    Ok(Credentials {
        identifier,
        password: password.expose().to_string(),
    })
}

fn login_failed(
    app: &AppState,
    role: Role,
    form: &LoginForm,
    status: StatusCode,
    message: &'static str,
) -> Result<Response, AppError> {
    let page = render(&app.hbs, "login", &LoginPage::new(role, &form.identifier, Some(message)))?;
    Ok((status, page).into_response())
}
