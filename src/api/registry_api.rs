// ==========================================
// Nutri Hospital - Registry API
// ==========================================
// Form-level operations over hospitals, contacts, questionnaires and
// products. Every operation validates its input before touching storage.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_contact, validate_hospital, validate_product};
use crate::domain::{
    Contact, Hospital, HospitalProduct, NewContact, NewHospital, NewHospitalProduct,
    SurveyAnswers, SurveyData,
};
use crate::repository::{ContactRepository, HospitalRepository, ProductRepository, SurveyRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub struct RegistryApi {
    hospital_repo: Arc<HospitalRepository>,
    contact_repo: Arc<ContactRepository>,
    survey_repo: Arc<SurveyRepository>,
    product_repo: Arc<ProductRepository>,
}

impl RegistryApi {
    pub fn new(
        hospital_repo: Arc<HospitalRepository>,
        contact_repo: Arc<ContactRepository>,
        survey_repo: Arc<SurveyRepository>,
        product_repo: Arc<ProductRepository>,
    ) -> Self {
        Self {
            hospital_repo,
            contact_repo,
            survey_repo,
            product_repo,
        }
    }

    /// All four repositories over one shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(HospitalRepository::new(conn.clone())),
            Arc::new(ContactRepository::new(conn.clone())),
            Arc::new(SurveyRepository::new(conn.clone())),
            Arc::new(ProductRepository::new(conn)),
        )
    }

    // ==========================================
    // Hospitals
    // ==========================================

    pub fn create_hospital(&self, hospital: NewHospital) -> ApiResult<Hospital> {
        validate_hospital(&hospital)?;
        if let Some(id) = hospital.id {
            if self.hospital_repo.find_by_id(id)?.is_some() {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "hospital id {} is already in use",
                    id
                )));
            }
        }
        let created = self.hospital_repo.create(&trim_hospital(hospital))?;
        info!(hospital_id = created.id, nome = %created.nome_hospital, "hospital created");
        Ok(created)
    }

    /// Overwrite every field of a hospital. `hospital.id` is ignored.
    pub fn update_hospital(&self, id: i64, hospital: NewHospital) -> ApiResult<Hospital> {
        let hospital = NewHospital {
            id: None,
            ..trim_hospital(hospital)
        };
        validate_hospital(&hospital)?;
        let updated = self.hospital_repo.update(id, &hospital)?;
        debug!(hospital_id = id, "hospital updated");
        Ok(updated)
    }

    pub fn get_hospital(&self, id: i64) -> ApiResult<Hospital> {
        self.hospital_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Hospital(id={})", id)))
    }

    /// Hospitals ordered by name.
    pub fn list_hospitals(&self) -> ApiResult<Vec<Hospital>> {
        Ok(self.hospital_repo.list()?)
    }

    /// Delete a hospital with its contacts, questionnaire and products.
    pub fn delete_hospital(&self, id: i64) -> ApiResult<()> {
        if !self.hospital_repo.delete(id)? {
            return Err(ApiError::NotFound(format!("Hospital(id={})", id)));
        }
        info!(hospital_id = id, "hospital deleted");
        Ok(())
    }

    // ==========================================
    // Contacts
    // ==========================================

    /// Create a contact. When linked, the hospital name is taken from the
    /// hospital record.
    pub fn create_contact(&self, contact: NewContact) -> ApiResult<Contact> {
        validate_contact(&contact)?;
        let hospital_nome = match contact.hospital_id {
            Some(hospital_id) => self.get_hospital(hospital_id)?.nome_hospital,
            None => contact.hospital_nome.trim().to_string(),
        };
        let contact = NewContact {
            hospital_nome,
            nome_contato: contact.nome_contato.trim().to_string(),
            cargo: contact.cargo.trim().to_string(),
            telefone: contact.telefone.trim().to_string(),
            ..contact
        };
        Ok(self.contact_repo.create(&contact)?)
    }

    pub fn list_contacts(&self) -> ApiResult<Vec<Contact>> {
        Ok(self.contact_repo.list()?)
    }

    pub fn list_contacts_for(&self, hospital_id: i64) -> ApiResult<Vec<Contact>> {
        self.get_hospital(hospital_id)?;
        Ok(self.contact_repo.list_by_hospital(hospital_id)?)
    }

    pub fn list_unassociated_contacts(&self) -> ApiResult<Vec<Contact>> {
        Ok(self.contact_repo.list_unassociated()?)
    }

    pub fn delete_contact(&self, id: i64) -> ApiResult<()> {
        if !self.contact_repo.delete(id)? {
            return Err(ApiError::NotFound(format!("Contact(id={})", id)));
        }
        Ok(())
    }

    // ==========================================
    // Questionnaire
    // ==========================================

    /// Questionnaire of a hospital, created empty on first access.
    pub fn survey_for(&self, hospital_id: i64) -> ApiResult<SurveyData> {
        self.get_hospital(hospital_id)?;
        Ok(self.survey_repo.get_or_create(hospital_id)?)
    }

    /// Overwrite every answer of a hospital's questionnaire.
    pub fn save_survey(&self, hospital_id: i64, answers: &SurveyAnswers) -> ApiResult<SurveyData> {
        self.get_hospital(hospital_id)?;
        Ok(self.survey_repo.save(hospital_id, answers)?)
    }

    // ==========================================
    // Products
    // ==========================================

    /// Add a product to a hospital, or increase the quantity of the row with
    /// the same product and brand.
    pub fn add_product(&self, product: NewHospitalProduct) -> ApiResult<HospitalProduct> {
        validate_product(&product)?;
        let hospital = self.get_hospital(product.hospital_id)?;
        let product = NewHospitalProduct {
            nome_hospital: hospital.nome_hospital,
            marca_planilha: product.marca_planilha.trim().to_string(),
            produto: product.produto.trim().to_string(),
            ..product
        };
        let saved = self.product_repo.add_or_increment(&product)?;
        debug!(
            hospital_id = saved.hospital_id,
            produto = %saved.produto,
            quantidade = saved.quantidade,
            "product saved"
        );
        Ok(saved)
    }

    pub fn list_products(&self, hospital_id: i64) -> ApiResult<Vec<HospitalProduct>> {
        self.get_hospital(hospital_id)?;
        Ok(self.product_repo.list_by_hospital(hospital_id)?)
    }

    /// Remove a product row; it must belong to `hospital_id`.
    pub fn remove_product(&self, hospital_id: i64, product_id: i64) -> ApiResult<()> {
        if !self.product_repo.delete_for_hospital(hospital_id, product_id)? {
            return Err(ApiError::NotFound(format!(
                "HospitalProduct(id={}) of Hospital(id={})",
                product_id, hospital_id
            )));
        }
        Ok(())
    }
}

fn trim_hospital(hospital: NewHospital) -> NewHospital {
    NewHospital {
        id: hospital.id,
        nome_hospital: hospital.nome_hospital.trim().to_string(),
        endereco: hospital.endereco.trim().to_string(),
        numero: hospital.numero.trim().to_string(),
        complemento: hospital.complemento.trim().to_string(),
        cep: hospital.cep.trim().to_string(),
        cidade: hospital.cidade.trim().to_string(),
        estado: hospital.estado.trim().to_string(),
    }
}
