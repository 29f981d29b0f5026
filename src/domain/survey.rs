// ==========================================
// Nutri Hospital - Survey ("dados do hospital") domain model
// ==========================================
// Table: dados_hospitais (one row per hospital)
// Known questionnaire fields are a fixed set; headers that match none of
// them are kept in an overflow map so no source column is silently lost.
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// SurveyField - one questionnaire prompt
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyField {
    Especialidade,
    Leitos,
    LeitosUti,
    FatoresDecisorios,
    PrioridadesAtendimento,
    Certificacao,
    Emtn,
    EmtnMembros,
    ComissaoFeridas,
    ComissaoFeridasMembros,
    NutricaoEnteralDia,
    PacientesTnoDia,
    AltasOrientadas,
    QuemOrientaAlta,
    ProtocoloEvolucaoDieta,
    ProtocoloEvolucaoDietaQual,
    ProtocoloLesaoPressao,
    ProtocoloLesaoPressaoQual,
    MaiorDesafio,
    DietaPadrao,
    BombaInfusaoModelo,
    Fornecedor,
    ConvenioEmpresas,
    ConvenioEmpresasModeloPagamento,
    Reembolso,
    ModeloCompras,
    ContratoTipo,
    NovaEtapaNegociacao,
}

impl SurveyField {
    /// All fields, in questionnaire (and column) order.
    pub const ALL: [SurveyField; 28] = [
        SurveyField::Especialidade,
        SurveyField::Leitos,
        SurveyField::LeitosUti,
        SurveyField::FatoresDecisorios,
        SurveyField::PrioridadesAtendimento,
        SurveyField::Certificacao,
        SurveyField::Emtn,
        SurveyField::EmtnMembros,
        SurveyField::ComissaoFeridas,
        SurveyField::ComissaoFeridasMembros,
        SurveyField::NutricaoEnteralDia,
        SurveyField::PacientesTnoDia,
        SurveyField::AltasOrientadas,
        SurveyField::QuemOrientaAlta,
        SurveyField::ProtocoloEvolucaoDieta,
        SurveyField::ProtocoloEvolucaoDietaQual,
        SurveyField::ProtocoloLesaoPressao,
        SurveyField::ProtocoloLesaoPressaoQual,
        SurveyField::MaiorDesafio,
        SurveyField::DietaPadrao,
        SurveyField::BombaInfusaoModelo,
        SurveyField::Fornecedor,
        SurveyField::ConvenioEmpresas,
        SurveyField::ConvenioEmpresasModeloPagamento,
        SurveyField::Reembolso,
        SurveyField::ModeloCompras,
        SurveyField::ContratoTipo,
        SurveyField::NovaEtapaNegociacao,
    ];

    /// Storage key (column name in dados_hospitais).
    pub fn key(self) -> &'static str {
        match self {
            SurveyField::Especialidade => "especialidade",
            SurveyField::Leitos => "leitos",
            SurveyField::LeitosUti => "leitos_uti",
            SurveyField::FatoresDecisorios => "fatores_decisorios",
            SurveyField::PrioridadesAtendimento => "prioridades_atendimento",
            SurveyField::Certificacao => "certificacao",
            SurveyField::Emtn => "emtn",
            SurveyField::EmtnMembros => "emtn_membros",
            SurveyField::ComissaoFeridas => "comissao_feridas",
            SurveyField::ComissaoFeridasMembros => "comissao_feridas_membros",
            SurveyField::NutricaoEnteralDia => "nutricao_enteral_dia",
            SurveyField::PacientesTnoDia => "pacientes_tno_dia",
            SurveyField::AltasOrientadas => "altas_orientadas",
            SurveyField::QuemOrientaAlta => "quem_orienta_alta",
            SurveyField::ProtocoloEvolucaoDieta => "protocolo_evolucao_dieta",
            SurveyField::ProtocoloEvolucaoDietaQual => "protocolo_evolucao_dieta_qual",
            SurveyField::ProtocoloLesaoPressao => "protocolo_lesao_pressao",
            SurveyField::ProtocoloLesaoPressaoQual => "protocolo_lesao_pressao_qual",
            SurveyField::MaiorDesafio => "maior_desafio",
            SurveyField::DietaPadrao => "dieta_padrao",
            SurveyField::BombaInfusaoModelo => "bomba_infusao_modelo",
            SurveyField::Fornecedor => "fornecedor",
            SurveyField::ConvenioEmpresas => "convenio_empresas",
            SurveyField::ConvenioEmpresasModeloPagamento => "convenio_empresas_modelo_pagamento",
            SurveyField::Reembolso => "reembolso",
            SurveyField::ModeloCompras => "modelo_compras",
            SurveyField::ContratoTipo => "contrato_tipo",
            SurveyField::NovaEtapaNegociacao => "nova_etapa_negociacao",
        }
    }

    /// Literal question text as it appears in the survey sheet header.
    pub fn question(self) -> &'static str {
        match self {
            SurveyField::Especialidade => "Qual a especialidade do hospital?",
            SurveyField::Leitos => "Quantos leitos o hospital possui?",
            SurveyField::LeitosUti => "Quantos leitos de UTI o hospital possui?",
            SurveyField::FatoresDecisorios => {
                "Quais os fatores decisórios na escolha de um produto?"
            }
            SurveyField::PrioridadesAtendimento => {
                "Quais as prioridades para a excelência no atendimento?"
            }
            SurveyField::Certificacao => "O hospital possui certificação? Qual?",
            SurveyField::Emtn => {
                "O hospital possui Equipe Multiprofissional de Terapia Nutricional (EMTN)?"
            }
            SurveyField::EmtnMembros => "Quais profissionais compõem a EMTN?",
            SurveyField::ComissaoFeridas => "O hospital possui comissão de feridas?",
            SurveyField::ComissaoFeridasMembros => {
                "Quais profissionais compõem a comissão de feridas?"
            }
            SurveyField::NutricaoEnteralDia => "Quantos pacientes em nutrição enteral por dia?",
            SurveyField::PacientesTnoDia => {
                "Quantos pacientes em terapia nutricional oral (TNO) por dia?"
            }
            SurveyField::AltasOrientadas => "Quantas altas são orientadas por período?",
            SurveyField::QuemOrientaAlta => "Quem orienta a alta?",
            SurveyField::ProtocoloEvolucaoDieta => "Existe protocolo de evolução de dieta?",
            SurveyField::ProtocoloEvolucaoDietaQual => "Qual o protocolo de evolução de dieta?",
            SurveyField::ProtocoloLesaoPressao => {
                "Existe protocolo de suplementação para lesão por pressão?"
            }
            SurveyField::ProtocoloLesaoPressaoQual => "Qual o protocolo para lesão por pressão?",
            SurveyField::MaiorDesafio => "Qual o maior desafio da terapia nutricional no hospital?",
            SurveyField::DietaPadrao => "Qual a dieta padrão utilizada?",
            SurveyField::BombaInfusaoModelo => "Qual o modelo de bomba de infusão utilizado?",
            SurveyField::Fornecedor => "Qual o fornecedor atual?",
            SurveyField::ConvenioEmpresas => "O hospital possui convênio com empresas? Quais?",
            SurveyField::ConvenioEmpresasModeloPagamento => {
                "Qual o modelo de pagamento do convênio?"
            }
            SurveyField::Reembolso => "O hospital trabalha com reembolso?",
            SurveyField::ModeloCompras => "Qual o modelo de compras do hospital?",
            SurveyField::ContratoTipo => "O contrato é anual ou semestral?",
            SurveyField::NovaEtapaNegociacao => "Quando será a nova etapa de negociação?",
        }
    }

    /// Short label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            SurveyField::Especialidade => "Especialidade",
            SurveyField::Leitos => "Leitos",
            SurveyField::LeitosUti => "Leitos UTI",
            SurveyField::FatoresDecisorios => "Fatores decisórios",
            SurveyField::PrioridadesAtendimento => "Prioridades (excelência)",
            SurveyField::Certificacao => "Certificação",
            SurveyField::Emtn => "EMTN",
            SurveyField::EmtnMembros => "EMTN (membros)",
            SurveyField::ComissaoFeridas => "Comissão de feridas",
            SurveyField::ComissaoFeridasMembros => "Comissão de feridas (membros)",
            SurveyField::NutricaoEnteralDia => "Nutrição enteral/dia",
            SurveyField::PacientesTnoDia => "Pacientes em TNO/dia",
            SurveyField::AltasOrientadas => "Altas orientadas",
            SurveyField::QuemOrientaAlta => "Quem orienta alta",
            SurveyField::ProtocoloEvolucaoDieta => "Protocolo evolução dieta",
            SurveyField::ProtocoloEvolucaoDietaQual => "Qual (evolução dieta)",
            SurveyField::ProtocoloLesaoPressao => "Protocolo lesão/feridas",
            SurveyField::ProtocoloLesaoPressaoQual => "Qual (lesão/feridas)",
            SurveyField::MaiorDesafio => "Maior desafio",
            SurveyField::DietaPadrao => "Dieta padrão",
            SurveyField::BombaInfusaoModelo => "Bomba de infusão (modelo)",
            SurveyField::Fornecedor => "Fornecedor",
            SurveyField::ConvenioEmpresas => "Convênio",
            SurveyField::ConvenioEmpresasModeloPagamento => "Convênio (modelo pagamento)",
            SurveyField::Reembolso => "Reembolso",
            SurveyField::ModeloCompras => "Modelo de compras",
            SurveyField::ContratoTipo => "Contrato (anual/semestral)",
            SurveyField::NovaEtapaNegociacao => "Nova etapa de negociação",
        }
    }

    pub fn from_key(key: &str) -> Option<SurveyField> {
        let key = key.trim();
        SurveyField::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for SurveyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// SurveyAnswers - answers + overflow (no identity)
// ==========================================
// Shared by the import pipeline and the survey form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub answers: BTreeMap<SurveyField, String>,
    pub extras: BTreeMap<String, String>, // header -> value, unrecognized columns
}

impl SurveyAnswers {
    /// Answer for a field, "" when unanswered.
    pub fn get(&self, field: SurveyField) -> &str {
        self.answers.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Set an answer; blank values remove it.
    pub fn set(&mut self, field: SurveyField, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.answers.remove(&field);
        } else {
            self.answers.insert(field, trimmed.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.extras.is_empty()
    }
}

// ==========================================
// SurveyData - persisted questionnaire
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyData {
    pub id: i64,
    pub hospital_id: i64,           // unique: one questionnaire per hospital
    pub data: SurveyAnswers,
}

impl SurveyData {
    pub fn get(&self, field: SurveyField) -> &str {
        self.data.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_and_questions_are_unique() {
        let keys: HashSet<_> = SurveyField::ALL.iter().map(|f| f.key()).collect();
        let questions: HashSet<_> = SurveyField::ALL.iter().map(|f| f.question()).collect();
        assert_eq!(keys.len(), SurveyField::ALL.len());
        assert_eq!(questions.len(), SurveyField::ALL.len());
    }

    #[test]
    fn test_from_key() {
        assert_eq!(SurveyField::from_key("LEITOS_UTI"), Some(SurveyField::LeitosUti));
        assert_eq!(SurveyField::from_key(" fornecedor "), Some(SurveyField::Fornecedor));
        assert_eq!(SurveyField::from_key("id_hospital"), None);
    }

    #[test]
    fn test_set_blank_removes_answer() {
        let mut answers = SurveyAnswers::default();
        answers.set(SurveyField::Leitos, " 120 ");
        assert_eq!(answers.get(SurveyField::Leitos), "120");

        answers.set(SurveyField::Leitos, "  ");
        assert_eq!(answers.get(SurveyField::Leitos), "");
        assert!(answers.is_empty());
    }
}
