// ==========================================
// Nutri Hospital - Hospitals sheet loader
// ==========================================
// Mandatory: hospital name. The source id is optional and kept when
// positive so dependent sheets can reference it.
// ==========================================

use crate::domain::NewHospital;
use crate::importer::column_resolver::ColumnSpec;
use crate::importer::file_parser::Sheet;
use crate::importer::importer_trait::SheetLoader;
use crate::importer::loaders::{normalize_rows, SheetLoad};

const ID: &str = "id";
const NAME: &str = "nome_hospital";
const STREET: &str = "endereco";
const NUMBER: &str = "numero";
const COMPLEMENT: &str = "complemento";
const POSTAL_CODE: &str = "cep";
const CITY: &str = "cidade";
const REGION: &str = "estado";

fn column_specs() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(ID, &["ID_HOSPITAL", "ID"]).contains(&["ID_HOSP"]),
        ColumnSpec::new(NAME, &["NOME_HOSPITAL", "HOSPITAL", "NOME"])
            .contains(&["NOME"])
            .critical(),
        ColumnSpec::new(STREET, &["ENDERECO", "ENDEREÇO"]).contains(&["ENDERE"]),
        ColumnSpec::new(NUMBER, &["NUMERO", "NÚMERO"]).contains(&["NUM"]),
        ColumnSpec::new(COMPLEMENT, &["COMPLEMENTO"]).contains(&["COMPLE"]),
        ColumnSpec::new(POSTAL_CODE, &["CEP"]),
        ColumnSpec::new(CITY, &["CIDADE"]).contains(&["CIDAD"]),
        ColumnSpec::new(REGION, &["ESTADO", "UF"]).contains(&["UF", "ESTAD"]),
    ]
}

pub struct HospitalSheetLoader {
    file_stem: String,
}

impl HospitalSheetLoader {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
        }
    }
}

impl SheetLoader for HospitalSheetLoader {
    type Record = NewHospital;

    fn file_stem(&self) -> &str {
        &self.file_stem
    }

    fn load_sheet(&self, sheet: &Sheet) -> SheetLoad<NewHospital> {
        normalize_rows(sheet, &column_specs(), NAME, |row| NewHospital {
            id: row.id(ID),
            nome_hospital: row.text(NAME),
            endereco: row.text(STREET),
            numero: row.text(NUMBER),
            complemento: row.text(COMPLEMENT),
            cep: row.text(POSTAL_CODE),
            cidade: row.text(CITY),
            estado: row.text(REGION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::Cell;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_loads_hospitals_with_optional_id() {
        let sheet = Sheet {
            name: "hospitais".to_string(),
            headers: [
                "ID_HOSPITAL",
                "Nome do Hospital",
                "Endereço",
                "Número",
                "CEP",
                "Cidade",
                "UF",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            rows: vec![
                vec![
                    Cell::Number(5.0),
                    text(" Hospital Sao Lucas "),
                    text("Rua A"),
                    Cell::Number(100.0),
                    text("50000-000"),
                    text("Recife"),
                    text("PE"),
                ],
                vec![text(""), text("Hospital Sem Id")],
                vec![text("7"), text("nan")],
            ],
        };

        let load = HospitalSheetLoader::new("hospitais").load_sheet(&sheet);
        assert_eq!(load.total_rows, 3);
        assert_eq!(load.dropped_rows, 1);

        let first = &load.records[0];
        assert_eq!(first.id, Some(5));
        assert_eq!(first.nome_hospital, "Hospital Sao Lucas");
        assert_eq!(first.endereco, "Rua A");
        assert_eq!(first.numero, "100");
        assert_eq!(first.estado, "PE");

        assert_eq!(load.records[1].id, None);
        assert_eq!(load.records[1].cidade, "");
    }
}
