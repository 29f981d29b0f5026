// ==========================================
// Nutri Hospital - Hospital report
// ==========================================
// Plain-text rendering of one hospital: identification, contacts,
// questionnaire (one labelled paragraph per question) and products.
// Empty values print as "-".
// ==========================================

use crate::domain::{Contact, Hospital, HospitalProduct, SurveyData, SurveyField};
use serde::Serialize;
use std::fmt;

const EMPTY: &str = "-";

fn or_dash(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        EMPTY
    } else {
        value
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalReport {
    pub hospital: Hospital,
    pub contacts: Vec<Contact>,
    pub survey: Option<SurveyData>,
    pub products: Vec<HospitalProduct>,
}

impl HospitalReport {
    /// Units of all product rows.
    pub fn total_units(&self) -> i64 {
        self.products.iter().map(|p| p.quantidade).sum()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn line(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "{:<16} {}", format!("{label}:"), or_dash(value))
}

fn paragraph(f: &mut fmt::Formatter<'_>, label: &str, value: &str) -> fmt::Result {
    writeln!(f, "{label}:")?;
    for text in or_dash(value).lines() {
        writeln!(f, "  {}", text.trim_end())?;
    }
    writeln!(f)
}

fn title(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    writeln!(f, "{text}")?;
    writeln!(f, "{}", "=".repeat(text.chars().count()))
}

impl fmt::Display for HospitalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.hospital;
        title(f, "RELATÓRIO DO HOSPITAL")?;
        line(f, "ID", &h.id.to_string())?;
        line(f, "Nome", &h.nome_hospital)?;
        line(f, "Endereço", &h.street_line())?;
        line(f, "CEP", &h.cep)?;
        line(f, "Cidade/Estado", &h.city_region())?;
        writeln!(f)?;

        title(f, "CONTATOS")?;
        if self.contacts.is_empty() {
            line(f, "Contatos", "")?;
        }
        for contact in &self.contacts {
            line(
                f,
                "Contato",
                &format!(
                    "{} | {} | {}",
                    contact.nome_contato,
                    or_dash(&contact.cargo),
                    or_dash(&contact.telefone)
                ),
            )?;
        }
        writeln!(f)?;

        title(f, "DADOS DO HOSPITAL")?;
        match &self.survey {
            None => {
                line(f, "Dados", "")?;
                writeln!(f)?;
            }
            Some(survey) => {
                for field in SurveyField::ALL {
                    paragraph(f, field.label(), survey.get(field))?;
                }
                for (header, value) in &survey.data.extras {
                    paragraph(f, header, value)?;
                }
            }
        }

        title(f, "PRODUTOS DO HOSPITAL")?;
        if self.products.is_empty() {
            line(f, "Produtos", "")?;
        }
        for product in &self.products {
            line(
                f,
                "Produto",
                &format!(
                    "{} | {} | Qtd: {}",
                    or_dash(&product.marca_planilha),
                    product.produto,
                    product.quantidade
                ),
            )?;
        }
        Ok(())
    }
}
