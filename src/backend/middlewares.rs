//! Middleware pour gérer les sessions utilisateur.
//! Fournit le contexte de session aux handlers et garde les pages protégées:
//! un visiteur non connecté est redirigé vers la page de connexion du portail.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use log::info;
use tower_sessions::Session;

use crate::models::PortalUser;
use crate::session::SessionStore;

/// État de connexion d'un portail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Anonymous,
    Authenticated,
}

impl LoginState {
    pub fn of<U>(user: &Option<U>) -> Self {
        match user {
            Some(_) => LoginState::Authenticated,
            None => LoginState::Anonymous,
        }
    }
}

/// Décision de la garde d'une page protégée
#[derive(Debug, PartialEq, Eq)]
pub enum Access<U> {
    Granted(U),
    Redirect(&'static str),
}

/// Laisse passer l'utilisateur connecté, sinon redirige vers `redirect_to`
pub fn guard<U>(user: Option<U>, redirect_to: &'static str) -> Access<U> {
    match user {
        Some(user) => Access::Granted(user),
        None => Access::Redirect(redirect_to),
    }
}

/// Garde inverse des pages de connexion: un utilisateur déjà connecté est
/// renvoyé vers son tableau de bord.
pub fn forward_if_authenticated<U>(user: &Option<U>, dashboard: &'static str) -> Option<&'static str> {
    match LoginState::of(user) {
        LoginState::Authenticated => Some(dashboard),
        LoginState::Anonymous => None,
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for SessionStore<Session>
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(SessionStore::new)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing"))
    }
}

/// Utilisateur connecté du portail de `U`; rejette vers la page de connexion
pub struct Authenticated<U>(pub U);

#[async_trait::async_trait]
impl<S, U> FromRequestParts<S> for Authenticated<U>
where
    S: Send + Sync,
    U: PortalUser,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::<Session>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match guard(store.load::<U>().await, U::ROLE.login_path()) {
            Access::Granted(user) => Ok(Authenticated(user)),
            Access::Redirect(to) => {
                info!("Anonymous access to {}, redirecting to {}", parts.uri.path(), to);
                Err(Redirect::to(to).into_response())
            }
        }
    }
}
