// ==========================================
// Nutri Hospital - Product-at-hospital domain model
// ==========================================
// Table: produtos_hospitais
// Rule: quantidade >= 0; same hospital + product + brand is one row
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// NutritionFacts - optional per-product facts
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub embalagem: String,          // packaging
    pub referencia: String,         // reference code
    pub kcal: String,               // calories
    pub ptn: String,                // protein
    pub lip: String,                // lipids
    pub fibras: String,             // fiber
    pub sodio: String,              // sodium
    pub ferro: String,              // iron
    pub potassio: String,           // potassium
    pub vit_b12: String,            // vitamin B12
    pub gordura_saturada: String,   // saturated fat
}

impl NutritionFacts {
    /// Storage keys, in column order. Also accepted as sheet headers.
    pub const KEYS: [&'static str; 11] = [
        "embalagem",
        "referencia",
        "kcal",
        "ptn",
        "lip",
        "fibras",
        "sodio",
        "ferro",
        "potassio",
        "vit_b12",
        "gordura_saturada",
    ];

    pub fn values(&self) -> [&str; 11] {
        [
            &self.embalagem,
            &self.referencia,
            &self.kcal,
            &self.ptn,
            &self.lip,
            &self.fibras,
            &self.sodio,
            &self.ferro,
            &self.potassio,
            &self.vit_b12,
            &self.gordura_saturada,
        ]
    }

    /// Build from values in [`NutritionFacts::KEYS`] order.
    pub fn from_values(values: [String; 11]) -> Self {
        let [
            embalagem,
            referencia,
            kcal,
            ptn,
            lip,
            fibras,
            sodio,
            ferro,
            potassio,
            vit_b12,
            gordura_saturada,
        ] = values;
        Self {
            embalagem,
            referencia,
            kcal,
            ptn,
            lip,
            fibras,
            sodio,
            ferro,
            potassio,
            vit_b12,
            gordura_saturada,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalProduct {
    pub id: i64,
    pub hospital_id: i64,           // owning hospital (required)
    pub nome_hospital: String,      // denormalized hospital name
    pub marca_planilha: String,     // brand / catalog sheet label
    pub produto: String,            // product name (required)
    pub quantidade: i64,            // >= 0
    pub facts: NutritionFacts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHospitalProduct {
    pub hospital_id: i64,
    pub nome_hospital: String,
    pub marca_planilha: String,
    pub produto: String,
    pub quantidade: i64,
    pub facts: NutritionFacts,
}
