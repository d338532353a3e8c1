//! Recherche et filtre par catégorie sur les dossiers déjà chargés.

use crate::consts::ALL_RECORD_TYPES;
use crate::models::{HealthRecord, RecordType};

/// Filtre de catégorie: tous les dossiers, ou une seule catégorie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    All,
    Only(RecordType),
}

impl TypeFilter {
    /// Interprète la valeur du sélecteur; vide ou "all" signifie tous
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == ALL_RECORD_TYPES {
            TypeFilter::All
        } else {
            TypeFilter::Only(RecordType::from(value))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeFilter::All => ALL_RECORD_TYPES,
            TypeFilter::Only(kind) => kind.as_str(),
        }
    }

    fn accepts(&self, kind: &RecordType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(expected) => expected == kind,
        }
    }
}

/// Vrai si le dossier passe le filtre de catégorie et la recherche.
///
/// La recherche est insensible à la casse et porte sur le titre, la
/// description (si présente) et le diagnostic.
pub fn matches(record: &HealthRecord, search_term: &str, filter: &TypeFilter) -> bool {
    if !filter.accepts(&record.record_type) {
        return false;
    }
    if search_term.is_empty() {
        return true;
    }

    let needle = search_term.to_lowercase();
    record.title.to_lowercase().contains(&needle)
        || record
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || record.diagnosis.to_lowercase().contains(&needle)
}

/// Sous-ensemble visible, dans l'ordre des dossiers chargés
pub fn visible_records<'a>(
    records: &'a [HealthRecord],
    search_term: &str,
    filter: &TypeFilter,
) -> Vec<&'a HealthRecord> {
    records
        .iter()
        .filter(|record| matches(record, search_term, filter))
        .collect()
}

/// Catégories proposées par le sélecteur: "all" puis chaque catégorie présente,
/// sans doublon, dans l'ordre de première apparition.
pub fn record_categories(records: &[HealthRecord]) -> Vec<String> {
    let mut categories = vec![ALL_RECORD_TYPES.to_string()];
    for record in records {
        let kind = record.record_type.as_str();
        if !categories.iter().any(|c| c == kind) {
            categories.push(kind.to_string());
        }
    }
    categories
}
