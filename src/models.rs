//! Modèle de données

use std::fmt;

use chrono::NaiveDate;
use derive_more::Display;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use strum_macros::EnumIter;

/// Portail d'un utilisateur: Citoyen, Hôpital ou Gouvernement
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Role {
    Citizen,
    Hospital,
    Government,
}

impl Role {
    /// Clé sous laquelle l'utilisateur connecté est stocké dans la session
    pub fn storage_key(self) -> &'static str {
        match self {
            Role::Citizen => "citizenUser",
            Role::Hospital => "hospitalUser",
            Role::Government => "govUser",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Role::Citizen => "/citizen",
            Role::Hospital => "/hospital",
            Role::Government => "/gov",
        }
    }

    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Citizen => "/citizen/dashboard",
            Role::Hospital => "/hospital/dashboard",
            Role::Government => "/gov/dashboard",
        }
    }

    pub fn logout_path(self) -> &'static str {
        match self {
            Role::Citizen => "/citizen/logout",
            Role::Hospital => "/hospital/logout",
            Role::Government => "/gov/logout",
        }
    }

    /// Nom de la procédure de connexion exposée par la base de données
    pub fn login_procedure(self) -> &'static str {
        match self {
            Role::Citizen => "citizen_login",
            Role::Hospital => "hospital_login",
            Role::Government => "gov_login",
        }
    }

    /// Titre affiché sur la page de connexion
    pub fn portal_title(self) -> &'static str {
        match self {
            Role::Citizen => "Citizen Portal",
            Role::Hospital => "Hospital Portal",
            Role::Government => "Government Portal",
        }
    }

    /// Libellé du champ identifiant sur la page de connexion
    pub fn identifier_label(self) -> &'static str {
        match self {
            Role::Citizen => "National ID number",
            Role::Hospital => "Staff ID",
            Role::Government => "Employee ID",
        }
    }
}

/// Un utilisateur authentifié sur l'un des portails.
///
/// Chaque portail a sa propre forme d'utilisateur, mais tous sont
/// sérialisables en JSON pour être conservés dans la session.
pub trait PortalUser: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const ROLE: Role;

    /// Identifiant unique de l'utilisateur dans son portail
    fn identifier(&self) -> &str;

    fn display_name(&self) -> &str;
}

/// Un citoyen, identifié par son numéro national d'identité
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenUser {
    pub nid_number: String,
    pub full_name: String,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl PortalUser for CitizenUser {
    const ROLE: Role = Role::Citizen;

    fn identifier(&self) -> &str {
        &self.nid_number
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }
}

/// Un membre du personnel hospitalier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalUser {
    #[serde(deserialize_with = "string_or_number")]
    pub staff_id: String,
    pub full_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub institute_id: String,
    #[serde(default)]
    pub institute_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl PortalUser for HospitalUser {
    const ROLE: Role = Role::Hospital;

    fn identifier(&self) -> &str {
        &self.staff_id
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }
}

/// Un administrateur du ministère
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovUser {
    #[serde(deserialize_with = "string_or_number")]
    pub employee_id: String,
    pub full_name: String,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl PortalUser for GovUser {
    const ROLE: Role = Role::Government;

    fn identifier(&self) -> &str {
        &self.employee_id
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }
}

/// Catégorie d'un dossier médical.
///
/// Les catégories connues ont une présentation dédiée; toute autre valeur
/// venant de la base est conservée telle quelle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    LabReport,
    Vaccination,
    Prescription,
    Ipd,
    Opd,
    Consultation,
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::LabReport => "Lab Report",
            RecordType::Vaccination => "Vaccination",
            RecordType::Prescription => "Prescription",
            RecordType::Ipd => "IPD",
            RecordType::Opd => "OPD",
            RecordType::Consultation => "Consultation",
            RecordType::Other(other) => other,
        }
    }

    /// Classe CSS du badge associé à la catégorie
    pub fn badge_class(&self) -> &'static str {
        match self {
            RecordType::LabReport => "badge-blue",
            RecordType::Vaccination => "badge-green",
            RecordType::Prescription => "badge-purple",
            RecordType::Ipd => "badge-orange",
            RecordType::Opd => "badge-teal",
            RecordType::Consultation => "badge-pink",
            RecordType::Other(_) => "badge-gray",
        }
    }

    /// Icône associée à la catégorie
    pub fn icon(&self) -> &'static str {
        match self {
            RecordType::Vaccination => "💉",
            RecordType::Ipd | RecordType::Opd => "🏥",
            RecordType::Consultation => "👤",
            _ => "📄",
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Lab Report" => RecordType::LabReport,
            "Vaccination" => RecordType::Vaccination,
            "Prescription" => RecordType::Prescription,
            "IPD" => RecordType::Ipd,
            "OPD" => RecordType::Opd,
            "Consultation" => RecordType::Consultation,
            _ => RecordType::Other(value),
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        RecordType::from(value.to_string())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un dossier médical, en lecture seule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub record_id: String,
    pub nid_number: String,
    pub record_type: RecordType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub diagnosis: String,
    #[serde(default)]
    pub prescription: Option<String>,
    pub issued_date: NaiveDate,
    #[serde(default, deserialize_with = "string_or_number")]
    pub institute_id: String,
}

/// Les colonnes texte de la base sont nullables: `null` devient une chaîne vide
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepte un identifiant encodé en nombre ou en chaîne (`null` donne une chaîne vide)
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Int(int)) => int.to_string(),
        Some(Raw::Float(float)) => float.to_string(),
        None => String::new(),
    })
}
