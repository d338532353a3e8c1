//! Définition des constantes globales pour l'application.

pub const HTTP_PORT: u16 = 8080; // Port par défaut pour le serveur HTTP.
pub const SEED_DB_PATH: &str = "./data/seed.yaml"; // Base de données locale utilisée sans SUPABASE_URL.
pub const TEMPLATES_DIR: &str = "templates/"; // Dossier des templates Handlebars.
pub const STATIC_DIR: &str = "static"; // Dossier des fichiers statiques (CSS).
pub const FETCH_TIMEOUT_SECS: u64 = 15; // Délai maximal d'une requête vers la base distante.

pub const HEALTH_RECORDS_TABLE: &str = "health_records"; // Table des dossiers médicaux.
pub const ALL_RECORD_TYPES: &str = "all"; // Sentinelle du filtre "tous les types".
