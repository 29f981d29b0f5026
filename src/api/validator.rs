// ==========================================
// Nutri Hospital - Form validator
// ==========================================
// Collects every failing field of a submission before rejecting it, so a
// form can mark all of them at once.
// ==========================================

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::{NewContact, NewHospital, NewHospitalProduct};

#[derive(Debug, Default)]
pub struct FormValidator {
    violations: Vec<ValidationViolation>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_text(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.violations
                .push(ValidationViolation::new(field, "required"));
        }
        self
    }

    pub fn require_positive_id(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if let Some(id) = value {
            if id <= 0 {
                self.violations.push(ValidationViolation::new(
                    field,
                    format!("must be a positive id, got {}", id),
                ));
            }
        }
        self
    }

    pub fn require_non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 0 {
            self.violations.push(ValidationViolation::new(
                field,
                format!("must not be negative, got {}", value),
            ));
        }
        self
    }

    pub fn violations(&self) -> &[ValidationViolation] {
        &self.violations
    }

    /// Ok when no rule failed, otherwise a ValidationError listing them.
    pub fn finish(&mut self, form: &str) -> ApiResult<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        let violations = std::mem::take(&mut self.violations);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        Err(ApiError::ValidationError {
            reason: format!("{} form has invalid fields: {}", form, fields.join(", ")),
            violations,
        })
    }
}

pub fn validate_hospital(hospital: &NewHospital) -> ApiResult<()> {
    FormValidator::new()
        .require_text("nome_hospital", &hospital.nome_hospital)
        .require_positive_id("id", hospital.id)
        .finish("hospital")
}

pub fn validate_contact(contact: &NewContact) -> ApiResult<()> {
    FormValidator::new()
        .require_text("nome_contato", &contact.nome_contato)
        .require_positive_id("hospital_id", contact.hospital_id)
        .finish("contact")
}

pub fn validate_product(product: &NewHospitalProduct) -> ApiResult<()> {
    FormValidator::new()
        .require_text("produto", &product.produto)
        .require_non_negative("quantidade", product.quantidade)
        .finish("product")
}
