// ==========================================
// Nutri Hospital - Identity reconciler
// ==========================================
// Resolves the hospital a dependent row belongs to.
// Precedence:
//   1. alias (source id that could not be kept -> persisted id)
//   2. source id equal to a persisted id
//   3. exact normalized name (trim, collapse spaces, uppercase)
//   4. unassociated
// No partial name matching.
// ==========================================

use crate::domain::{normalize_hospital_name, Hospital};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Alias(i64),
    Id(i64),
    Name(i64),
    Unassociated,
}

impl Resolution {
    pub fn hospital_id(self) -> Option<i64> {
        match self {
            Resolution::Alias(id) | Resolution::Id(id) | Resolution::Name(id) => Some(id),
            Resolution::Unassociated => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityReconciler {
    names_by_id: HashMap<i64, String>,
    ids_by_name: HashMap<String, i64>,
    aliases: HashMap<i64, i64>,
}

impl IdentityReconciler {
    /// Build the lookup tables from persisted hospitals.
    ///
    /// When two hospitals share a normalized name the lower id wins.
    pub fn from_hospitals(hospitals: &[Hospital]) -> Self {
        let mut sorted: Vec<&Hospital> = hospitals.iter().collect();
        sorted.sort_by_key(|h| h.id);

        let mut reconciler = Self::default();
        for hospital in sorted {
            reconciler.register(hospital.id, &hospital.nome_hospital);
        }
        reconciler
    }

    /// Add a persisted hospital.
    pub fn register(&mut self, id: i64, name: &str) {
        self.names_by_id.insert(id, name.trim().to_string());
        self.ids_by_name
            .entry(normalize_hospital_name(name))
            .or_insert(id);
    }

    /// Route references to `source_id` to `persisted_id`.
    pub fn add_alias(&mut self, source_id: i64, persisted_id: i64) {
        if source_id != persisted_id {
            self.aliases.insert(source_id, persisted_id);
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<i64> {
        let normalized = normalize_hospital_name(name);
        if normalized.is_empty() {
            return None;
        }
        self.ids_by_name.get(&normalized).copied()
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.names_by_id.contains_key(&id)
    }

    /// Persisted name of a hospital.
    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.names_by_id.get(&id).map(String::as_str)
    }

    pub fn resolve(&self, source_id: Option<i64>, name: &str) -> Resolution {
        if let Some(source_id) = source_id {
            if let Some(&id) = self.aliases.get(&source_id) {
                return Resolution::Alias(id);
            }
            if self.contains_id(source_id) {
                return Resolution::Id(source_id);
            }
        }
        match self.find_by_name(name) {
            Some(id) => Resolution::Name(id),
            None => Resolution::Unassociated,
        }
    }

    pub fn len(&self) -> usize {
        self.names_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewHospital;

    fn hospital(id: i64, name: &str) -> Hospital {
        NewHospital::named(name).into_hospital(id)
    }

    #[test]
    fn test_id_match_takes_precedence_over_name() {
        let r = IdentityReconciler::from_hospitals(&[
            hospital(5, "Hospital Sao Lucas"),
            hospital(6, "Hospital B"),
        ]);
        assert_eq!(r.resolve(Some(5), "Hospital B"), Resolution::Id(5));
    }

    #[test]
    fn test_name_match_is_case_and_whitespace_insensitive() {
        let r = IdentityReconciler::from_hospitals(&[hospital(5, "Hospital Sao Lucas")]);
        assert_eq!(
            r.resolve(Some(42), "  HOSPITAL   sao lucas "),
            Resolution::Name(5)
        );
        assert_eq!(r.resolve(None, "Hospital Sao"), Resolution::Unassociated);
        assert_eq!(r.resolve(None, ""), Resolution::Unassociated);
    }

    #[test]
    fn test_alias_is_checked_first() {
        let mut r = IdentityReconciler::from_hospitals(&[
            hospital(5, "Hospital A"),
            hospital(9, "Hospital B"),
        ]);
        r.add_alias(5, 9);
        assert_eq!(r.resolve(Some(5), "Hospital A"), Resolution::Alias(9));
        assert_eq!(r.resolve(Some(5), "").hospital_id(), Some(9));
    }

    #[test]
    fn test_duplicate_names_resolve_to_lowest_id() {
        let r =
            IdentityReconciler::from_hospitals(&[hospital(8, "Clinica"), hospital(3, "CLINICA")]);
        assert_eq!(r.find_by_name("clinica"), Some(3));
        assert_eq!(r.name_of(8), Some("Clinica"));
        assert_eq!(r.len(), 2);
    }
}
