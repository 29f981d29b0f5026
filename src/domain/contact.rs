// ==========================================
// Nutri Hospital - Contact domain model
// ==========================================
// Table: contatos
// A contact may be unassociated (hospital_id = NULL) while keeping the
// denormalized hospital name from its source row.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,                    // id_contato
    pub hospital_id: Option<i64>,   // owning hospital (None = unassociated)
    pub hospital_nome: String,      // denormalized hospital name
    pub nome_contato: String,       // contact name (required)
    pub cargo: String,              // role
    pub telefone: String,           // phone
}

impl Contact {
    pub fn is_associated(&self) -> bool {
        self.hospital_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub hospital_id: Option<i64>,
    pub hospital_nome: String,
    pub nome_contato: String,
    pub cargo: String,
    pub telefone: String,
}
