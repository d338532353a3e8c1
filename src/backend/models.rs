//! Définitions des structures échangées avec les pages.
//! Contient le formulaire de connexion et les contextes des templates.

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Formulaire de connexion commun aux trois portails
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

/// Contexte de la page de connexion
#[derive(Serialize)]
pub struct LoginPage<'a> {
    pub title: &'static str,
    pub action: &'static str,
    pub identifier_label: &'static str,
    pub identifier: &'a str,
    pub error: Option<&'static str>,
}

impl<'a> LoginPage<'a> {
    pub fn new(role: Role, identifier: &'a str, error: Option<&'static str>) -> Self {
        Self {
            title: role.portal_title(),
            action: role.login_path(),
            identifier_label: role.identifier_label(),
            identifier,
            error,
        }
    }
}
