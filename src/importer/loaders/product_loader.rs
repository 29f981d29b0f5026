// ==========================================
// Nutri Hospital - Products sheet loader
// ==========================================
// Mandatory: product name. Quantity defaults to 0; nutrition facts are
// read when their storage-key columns are present.
// ==========================================

use crate::domain::NutritionFacts;
use crate::importer::column_resolver::ColumnSpec;
use crate::importer::file_parser::Sheet;
use crate::importer::importer_trait::SheetLoader;
use crate::importer::loaders::{normalize_rows, SheetLoad};

const HOSPITAL_ID: &str = "hospital_id";
const HOSPITAL_NAME: &str = "nome_hospital";
const BRAND: &str = "marca_planilha";
const PRODUCT: &str = "produto";
const QUANTITY: &str = "quantidade";

fn column_specs() -> Vec<ColumnSpec> {
    let mut specs = vec![
        ColumnSpec::new(HOSPITAL_ID, &["HOSPITAL_ID", "ID_HOSPITAL"]).contains(&["ID_HOSP"]),
        ColumnSpec::new(HOSPITAL_NAME, &["NOME_HOSPITAL", "HOSPITAL_NOME"]).contains(&["HOSPITAL"]),
        ColumnSpec::new(BRAND, &["MARCA_PLANILHA", "MARCA"]).contains(&["MARCA"]),
        ColumnSpec::new(PRODUCT, &["PRODUTO"]).contains(&["PROD"]).critical(),
        ColumnSpec::new(QUANTITY, &["QUANTIDADE", "QTD"]).contains(&["QTD", "QUANT"]),
    ];
    specs.extend(
        NutritionFacts::KEYS
            .iter()
            .map(|key| ColumnSpec::new(format!("facts.{key}"), &[*key])),
    );
    specs
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub hospital_id: Option<i64>,
    pub nome_hospital: String,
    pub marca_planilha: String,
    pub produto: String,
    pub quantidade: i64,
    pub facts: NutritionFacts,
}

pub struct ProductSheetLoader {
    file_stem: String,
}

impl ProductSheetLoader {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
        }
    }
}

impl SheetLoader for ProductSheetLoader {
    type Record = ProductRecord;

    fn file_stem(&self) -> &str {
        &self.file_stem
    }

    fn load_sheet(&self, sheet: &Sheet) -> SheetLoad<ProductRecord> {
        normalize_rows(sheet, &column_specs(), PRODUCT, |row| ProductRecord {
            hospital_id: row.id(HOSPITAL_ID),
            nome_hospital: row.text(HOSPITAL_NAME),
            marca_planilha: row.text(BRAND),
            produto: row.text(PRODUCT),
            quantidade: row.quantity(QUANTITY),
            facts: NutritionFacts::from_values(
                NutritionFacts::KEYS.map(|key| row.text(&format!("facts.{key}"))),
            ),
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
    fn test_quantity_normalization() {
        let sheet = Sheet {
            name: "produtoshospitais".to_string(),
            headers: ["hospital_id", "Marca", "Produto", "Quantidade", "KCAL"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: vec![
                vec![text("5"), text("PRODIET"), text("Formula X"), text("12.0"), text("1,5")],
                vec![text("5"), text("PRODIET"), text("Formula Y"), text("")],
                vec![text("5"), text("PRODIET"), text(""), text("3")],
            ],
        };

        let load = ProductSheetLoader::new("produtoshospitais").load_sheet(&sheet);
        assert_eq!(load.dropped_rows, 1);
        assert_eq!(load.records.len(), 2);

        assert_eq!(load.records[0].hospital_id, Some(5));
        assert_eq!(load.records[0].quantidade, 12);
        assert_eq!(load.records[0].facts.kcal, "1,5");
        assert_eq!(load.records[1].quantidade, 0);
        assert!(load.records[1].facts.is_empty());
    }

    #[test]
    fn test_alternate_hospital_id_header() {
        let sheet = Sheet {
            name: "produtoshospitais".to_string(),
            headers: vec!["ID_HOSPITAL".to_string(), "PRODUTO".to_string()],
            rows: vec![vec![Cell::Number(999.0), text("Formula X")]],
        };
        let load = ProductSheetLoader::new("produtoshospitais").load_sheet(&sheet);
        assert_eq!(load.records[0].hospital_id, Some(999));
        assert_eq!(load.records[0].quantidade, 0);
    }
}
