//! Modèle de présentation de la liste des dossiers.
//!
//! La recherche, le filtre et le dossier sélectionné sont portés par la query
//! string de la page; la vue est une fonction pure de l'état du chargement et
//! de ces paramètres.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::fetcher::FetchState;
use super::filter::{record_categories, visible_records, TypeFilter};
use crate::consts::ALL_RECORD_TYPES;
use crate::models::HealthRecord;
use crate::utils::error_messages::{NO_MATCHING_RECORDS, NO_RECORDS_YET};

/// Paramètres de la vue, lus depuis la query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default, rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub record: Option<String>,
    /// Patient consulté depuis le portail hôpital
    #[serde(default)]
    pub nid: Option<String>,
}

impl RecordsQuery {
    pub fn filter(&self) -> TypeFilter {
        TypeFilter::parse(&self.record_type)
    }

    /// Même vue, avec le dossier `record` sélectionné (ou aucun)
    pub fn with_selection(&self, record: Option<&str>) -> Self {
        Self {
            record: record.map(str::to_string),
            ..self.clone()
        }
    }

    /// Lien vers `base_path` portant ces paramètres; les valeurs vides sont omises
    pub fn to_href(&self, base_path: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(nid) = self.nid.as_deref().filter(|n| !n.is_empty()) {
            query.append_pair("nid", nid);
        }
        if !self.search.is_empty() {
            query.append_pair("search", &self.search);
        }
        if !self.record_type.is_empty() && self.record_type != ALL_RECORD_TYPES {
            query.append_pair("type", &self.record_type);
        }
        if let Some(record) = &self.record {
            query.append_pair("record", record);
        }

        let query = query.finish();
        if query.is_empty() {
            base_path.to_string()
        } else {
            format!("{base_path}?{query}")
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordCard {
    pub record_id: String,
    pub title: String,
    pub summary: String,
    pub record_type: String,
    pub badge_class: &'static str,
    pub icon: &'static str,
    pub issued_date: String,
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct RecordDetail {
    pub record_id: String,
    pub title: String,
    pub record_type: String,
    pub badge_class: &'static str,
    pub icon: &'static str,
    pub description: Option<String>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub issued_date: String,
    pub institute_id: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordsView {
    pub loading: bool,
    pub error: Option<String>,
    pub records: Vec<RecordCard>,
    pub empty_message: Option<&'static str>,
    pub search: String,
    pub categories: Vec<CategoryOption>,
    pub selected: Option<RecordDetail>,
    pub close_href: String,
    pub nid: Option<String>,
}

impl RecordsView {
    pub fn build(state: &FetchState, query: &RecordsQuery, base_path: &str) -> Self {
        let loading = state.is_loading();
        let error = state.error().map(str::to_string);
        let records = state.records();
        let filter = query.filter();

        let visible = if loading {
            Vec::new()
        } else {
            visible_records(records, &query.search, &filter)
        };

        // Error banner takes precedence over the empty state
        let empty_message = if loading || error.is_some() || !visible.is_empty() {
            None
        } else if records.is_empty() {
            Some(NO_RECORDS_YET)
        } else {
            Some(NO_MATCHING_RECORDS)
        };

        let cards = visible
            .iter()
            .map(|record| RecordCard {
                record_id: record.record_id.clone(),
                title: record.title.clone(),
                summary: record
                    .description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| record.diagnosis.clone()),
                record_type: record.record_type.to_string(),
                badge_class: record.record_type.badge_class(),
                icon: record.record_type.icon(),
                issued_date: record.issued_date.to_string(),
                href: query
                    .with_selection(Some(&record.record_id))
                    .to_href(base_path),
            })
            .collect();

        let categories = record_categories(records)
            .into_iter()
            .map(|value| CategoryOption {
                label: if value == ALL_RECORD_TYPES {
                    "All Records".to_string()
                } else {
                    value.clone()
                },
                selected: value == filter.as_str(),
                value,
            })
            .collect();

        let selected = query
            .record
            .as_deref()
            .and_then(|id| records.iter().find(|r| r.record_id == id))
            .map(detail);

        Self {
            loading,
            error,
            records: cards,
            empty_message,
            search: query.search.clone(),
            categories,
            selected,
            close_href: query.with_selection(None).to_href(base_path),
            nid: query.nid.clone(),
        }
    }
}

fn detail(record: &HealthRecord) -> RecordDetail {
    RecordDetail {
        record_id: record.record_id.clone(),
        title: record.title.clone(),
        record_type: record.record_type.to_string(),
        badge_class: record.record_type.badge_class(),
        icon: record.record_type.icon(),
        description: record.description.clone().filter(|d| !d.is_empty()),
        diagnosis: record.diagnosis.clone(),
        prescription: record.prescription.clone(),
        issued_date: record.issued_date.to_string(),
        institute_id: record.institute_id.clone(),
    }
}
