//! Configuration des routes pour l'application.
//! Définit les routes accessibles avec ou sans authentification et configure les middlewares.

use axum::{routing::{get, post}, Router};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::backend::handlers_auth::{citizen_dashboard, gov_dashboard, hospital_dashboard};
use crate::backend::handlers_unauth::{fallback, index, login, login_page, logout};
use crate::backend::AppState;
use crate::consts;
use crate::models::{CitizenUser, GovUser, HospitalUser};

/// Initialisation du routeur principal et des middlewares
pub fn get_router(state: AppState) -> Router {
    // Configuration des sessions en mémoire; cookie sécurisé hors mode debug
    let store = MemoryStore::default();
    let session_manager = SessionManagerLayer::new(store)
        .with_http_only(true)
        .with_secure(!cfg!(debug_assertions));

    let service = ServiceBuilder::new().layer(session_manager);

    Router::new()
        .merge(unauth_routes())
        .merge(auth_routes())
        .nest_service("/static", ServeDir::new(consts::STATIC_DIR))
        .fallback(fallback) // Toute autre adresse renvoie à l'accueil
        .layer(service)
        .with_state(state)
}

/// Routes accessibles sans authentification
fn unauth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index)) // Choix du portail
        .route("/citizen", get(login_page::<CitizenUser>).post(login::<CitizenUser>))
        .route("/citizen/logout", post(logout::<CitizenUser>))
        .route("/hospital", get(login_page::<HospitalUser>).post(login::<HospitalUser>))
        .route("/hospital/logout", post(logout::<HospitalUser>))
        .route("/gov", get(login_page::<GovUser>).post(login::<GovUser>))
        .route("/gov/logout", post(logout::<GovUser>))
}

/// Routes nécessitant une authentification (gardées par l'extracteur `Authenticated`)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/citizen/dashboard", get(citizen_dashboard))
        .route("/hospital/dashboard", get(hospital_dashboard))
        .route("/gov/dashboard", get(gov_dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::load_templates;
    use crate::database::memory::MemoryDatabase;
    use crate::database::{Credentials, HealthDatabase, QueryError};
    use crate::models::{HealthRecord, Role};
    use async_trait::async_trait;
    use axum::body::Body;
    use http::{header, Request, Response, StatusCode};
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    const SEED: &str = r#"
citizens:
  - password: "s3cret-pass"
    nid_number: "123-456-789"
    full_name: "Sita Sharma"
    blood_group: "O+"
    date_of_birth: "1990-04-12"
    age: 34
    phone: "9800000000"
hospitals:
  - password: "ward-7"
    staff_id: "H-501"
    full_name: "Dr. Hari Koirala"
    institute_id: 12
    institute_name: "Bir Hospital"
officials:
  - password: "ministry"
    employee_id: "G-1"
    full_name: "Ram Thapa"
    office: "Ministry of Health and Population"
records:
  - record_id: 1
    nid_number: "123-456-789"
    record_type: "Lab Report"
    title: "CBC Test"
    description: "Complete blood count"
    diagnosis: "Normal"
    prescription: "None"
    issued_date: "2024-01-10"
    institute_id: 12
  - record_id: 2
    nid_number: "123-456-789"
    record_type: "Vaccination"
    title: "COVID-19 Dose 2"
    diagnosis: "Immunized"
    prescription: "Rest for a day"
    issued_date: "2024-03-05"
    institute_id: 12
  - record_id: 3
    nid_number: "555-555-555"
    record_type: "OPD"
    title: "Sprained ankle"
    diagnosis: "Sprain"
    issued_date: "2024-02-02"
    institute_id: 4
"#;

    fn router_with(database: Arc<dyn HealthDatabase>) -> Router {
        let hbs = load_templates(Path::new(consts::TEMPLATES_DIR)).unwrap();
        get_router(AppState::new(hbs, database))
    }

    fn router() -> Router {
        let database: MemoryDatabase = serde_yaml::from_str(SEED).unwrap();
        router_with(Arc::new(database))
    }

    async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
        router.clone().oneshot(request).await.unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(form.to_string())).unwrap()
    }

    fn location(response: &Response<Body>) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn session_cookie(response: &Response<Body>) -> String {
        let raw = response.headers()[header::SET_COOKIE].to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    async fn body(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn citizen_session(router: &Router) -> String {
        let response = send(
            router,
            post_form("/citizen", "identifier=123-456-789&password=s3cret-pass", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/citizen/dashboard");
        session_cookie(&response)
    }

    #[tokio::test]
    async fn test_protected_views_redirect_anonymous() {
        let router = router();
        for role in [Role::Citizen, Role::Hospital, Role::Government] {
            let response = send(&router, get(role.dashboard_path(), None)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), role.login_path());
        }
    }

    #[tokio::test]
    async fn test_unknown_path_redirects_home() {
        let response = send(&router(), get("/citizen/settings", None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_portal_selection_page() {
        let response = send(&router(), get("/", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body(response).await;
        assert!(page.contains("Citizen Portal"));
        assert!(page.contains("Hospital Portal"));
    }

    #[tokio::test]
    async fn test_citizen_login_then_dashboard_sorted() {
        let router = router();
        let cookie = citizen_session(&router).await;

        // La page de connexion renvoie vers le tableau de bord
        let response = send(&router, get("/citizen", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/citizen/dashboard");

        let response = send(&router, get("/citizen/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body(response).await;
        assert!(page.contains("Sita Sharma"));
        let newest = page.find("COVID-19 Dose 2").unwrap();
        let oldest = page.find("CBC Test").unwrap();
        assert!(newest < oldest, "records must be ordered newest first");
        assert!(!page.contains("Sprained ankle"));
    }

    #[tokio::test]
    async fn test_dashboard_search_and_detail() {
        let router = router();
        let cookie = citizen_session(&router).await;

        let response = send(&router, get("/citizen/dashboard?search=covid", Some(&cookie))).await;
        let page = body(response).await;
        assert!(page.contains("COVID-19 Dose 2"));
        assert!(!page.contains("CBC Test"));

        let response = send(&router, get("/citizen/dashboard?record=1", Some(&cookie))).await;
        let page = body(response).await;
        assert!(page.contains("record-detail"));
        assert!(page.contains("Complete blood count"));
    }

    #[tokio::test]
    async fn test_detail_overlay_closes_to_same_view() {
        let router = router();
        let cookie = citizen_session(&router).await;

        let page = body(send(&router, get("/citizen/dashboard?search=covid&record=2", Some(&cookie))).await).await;
        // Handlebars échappe le `=` de la query string
        let close = "/citizen/dashboard?search&#x3D;covid";

        // Un clic sur le fond ferme la fiche
        assert!(page.contains(&format!(r#"class="overlay" data-close="{close}""#)));
        // Un clic dans la fiche ne remonte pas jusqu'au fond
        assert!(page.contains(r#"class="record-detail" onclick="event.stopPropagation()""#));
        // Le bouton de fermeture retire la sélection mais garde la recherche
        assert!(page.contains(&format!(r#"class="close" href="{close}""#)));
        assert!(page.contains(&format!(r#"class="button-ghost" href="{close}""#)));
    }

    #[tokio::test]
    async fn test_hospital_links_keep_patient_nid() {
        let router = router();
        let response = send(
            &router,
            post_form("/hospital", "identifier=H-501&password=ward-7", None),
        )
        .await;
        let cookie = session_cookie(&response);

        let page = body(
            send(&router, get("/hospital/dashboard?nid=555-555-555&record=3", Some(&cookie))).await,
        )
        .await;
        assert!(page.contains(r#"href="/hospital/dashboard?nid&#x3D;555-555-555&amp;record&#x3D;3""#));
        assert!(page.contains(r#"data-close="/hospital/dashboard?nid&#x3D;555-555-555""#));
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let router = router();
        let cookie = citizen_session(&router).await;

        let response = send(&router, post_form("/citizen/logout", "", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/citizen");

        let response = send(&router, get("/citizen/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/citizen");
    }

    #[tokio::test]
    async fn test_sessions_are_per_role() {
        let router = router();
        let cookie = citizen_session(&router).await;

        let response = send(&router, get("/hospital/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/hospital");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let router = router();

        let response = send(
            &router,
            post_form("/citizen", "identifier=123-456-789&password=nope", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body(response).await.contains("Login failed"));

        let response = send(&router, post_form("/citizen", "identifier=abc&password=x", None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_hospital_patient_lookup() {
        let router = router();
        let response = send(
            &router,
            post_form("/hospital", "identifier=H-501&password=ward-7", None),
        )
        .await;
        assert_eq!(location(&response), "/hospital/dashboard");
        let cookie = session_cookie(&response);

        let page = body(send(&router, get("/hospital/dashboard?nid=555+555+555", Some(&cookie))).await).await;
        assert!(page.contains("Bir Hospital"));
        assert!(page.contains("Sprained ankle"));
        assert!(!page.contains("CBC Test"));

        let page = body(send(&router, get("/hospital/dashboard?nid=12ab", Some(&cookie))).await).await;
        assert!(page.contains("Invalid national ID number"));
        assert!(!page.contains("Sprained ankle"));
    }

    #[tokio::test]
    async fn test_gov_dashboard() {
        let router = router();
        let response = send(&router, post_form("/gov", "identifier=G-1&password=ministry", None)).await;
        let cookie = session_cookie(&response);

        let page = body(send(&router, get("/gov/dashboard", Some(&cookie))).await).await;
        assert!(page.contains("Ram Thapa"));
        assert!(page.contains("Ministry of Health and Population"));
    }

    /// Base dont la lecture des dossiers échoue toujours
    struct UnreachableRecords(MemoryDatabase);

    #[async_trait]
    impl HealthDatabase for UnreachableRecords {
        async fn fetch_records(&self, _: &str) -> Result<Vec<HealthRecord>, QueryError> {
            Err(QueryError::Transport("network timeout".to_string()))
        }

        async fn sign_in(
            &self,
            role: Role,
            credentials: &Credentials,
        ) -> Result<serde_json::Value, QueryError> {
            self.0.sign_in(role, credentials).await
        }
    }

    #[tokio::test]
    async fn test_fetch_error_shows_banner_not_empty_state() {
        let database: MemoryDatabase = serde_yaml::from_str(SEED).unwrap();
        let router = router_with(Arc::new(UnreachableRecords(database)));
        let cookie = citizen_session(&router).await;

        let page = body(send(&router, get("/citizen/dashboard", Some(&cookie))).await).await;
        assert!(page.contains("Error fetching health records: network timeout"));
        assert!(!page.contains("No records found"));
        assert!(!page.contains("Loading health records"));
    }
}
