// ==========================================
// Nutri Hospital - Hospital domain model
// ==========================================
// Table: hospitais
// Rule: nome_hospital is never empty
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Hospital - persisted hospital
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: i64,                    // id_hospital (may come from the source sheet)
    pub nome_hospital: String,      // name (required)
    pub endereco: String,           // street
    pub numero: String,             // street number
    pub complemento: String,        // complement
    pub cep: String,                // postal code
    pub cidade: String,             // city
    pub estado: String,             // region / UF
}

impl Hospital {
    /// Name used for identity matching (see [`normalize_hospital_name`]).
    pub fn normalized_name(&self) -> String {
        normalize_hospital_name(&self.nome_hospital)
    }

    /// "Cidade/UF" label used by listings and reports.
    pub fn city_region(&self) -> String {
        format!("{}/{}", self.cidade.trim(), self.estado.trim())
            .trim_matches('/')
            .to_string()
    }

    /// Street line: "endereco, numero complemento".
    pub fn street_line(&self) -> String {
        let line = format!(
            "{}, {} {}",
            self.endereco.trim(),
            self.numero.trim(),
            self.complemento.trim()
        );
        line.trim().trim_matches(',').trim().to_string()
    }
}

// ==========================================
// NewHospital - hospital to be inserted / updated
// ==========================================
// id = None lets the store assign one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHospital {
    pub id: Option<i64>,
    pub nome_hospital: String,
    pub endereco: String,
    pub numero: String,
    pub complemento: String,
    pub cep: String,
    pub cidade: String,
    pub estado: String,
}

impl NewHospital {
    pub fn named(nome_hospital: impl Into<String>) -> Self {
        Self {
            nome_hospital: nome_hospital.into(),
            ..Default::default()
        }
    }

    /// Attach the persisted id.
    pub fn into_hospital(self, id: i64) -> Hospital {
        Hospital {
            id,
            nome_hospital: self.nome_hospital,
            endereco: self.endereco,
            numero: self.numero,
            complemento: self.complemento,
            cep: self.cep,
            cidade: self.cidade,
            estado: self.estado,
        }
    }
}

/// Normalize a hospital name for identity matching.
///
/// Trims, collapses internal whitespace runs and uppercases. Matching is exact
/// on the normalized form; no partial or fuzzy comparison is done.
pub fn normalize_hospital_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
