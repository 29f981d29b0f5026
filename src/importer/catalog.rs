// ==========================================
// Nutri Hospital - Product catalog
// ==========================================
// Catalog workbook: one worksheet per brand, each with a product column.
// Feeds the brand/product selection lists; nothing here is persisted.
// ==========================================

use crate::importer::column_resolver::{resolve_column, ColumnSpec};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{find_sheet_file, Sheet};
use crate::importer::row_normalizer::normalize_text;
use crate::importer::sheet_cache::SheetCache;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CatalogEntry {
    pub brand: String,
    pub produto: String,
}

fn product_column(sheet: &Sheet) -> Option<usize> {
    let spec = ColumnSpec::new("produto", &["PRODUTO"])
        .contains(&["PROD"])
        .critical();
    resolve_column(&sheet.headers, &spec)
}

fn sheet_products(sheet: &Sheet) -> BTreeSet<String> {
    let Some(idx) = product_column(sheet) else {
        return BTreeSet::new();
    };
    sheet
        .rows
        .iter()
        .map(|row| normalize_text(row.get(idx)))
        .filter(|name| !name.is_empty())
        .collect()
}

pub struct ProductCatalog {
    path: Option<PathBuf>,
    cache: SheetCache,
}

impl ProductCatalog {
    /// Catalog read from an explicit workbook path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: SheetCache::new(),
        }
    }

    /// Catalog looked up as `<dir>/<stem>.{xlsx,xls,csv}`.
    ///
    /// A missing file gives an empty catalog.
    pub fn discover(dir: &Path, stem: &str) -> Self {
        let path = find_sheet_file(dir, stem);
        if path.is_none() {
            warn!(dir = %dir.display(), stem, "catalog workbook not found");
        }
        Self {
            path,
            cache: SheetCache::new(),
        }
    }

    fn sheets(&self) -> ImportResult<Arc<Vec<Sheet>>> {
        match &self.path {
            Some(path) => self.cache.get_or_load(path),
            None => Ok(Arc::new(Vec::new())),
        }
    }

    /// Brand names (worksheet names), sorted, blanks skipped.
    pub fn brands(&self) -> ImportResult<Vec<String>> {
        let brands: BTreeSet<String> = self
            .sheets()?
            .iter()
            .map(|sheet| sheet.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Ok(brands.into_iter().collect())
    }

    /// Products of one brand, trimmed, de-duplicated and sorted.
    ///
    /// The brand is matched case-insensitively; an unknown brand gives an
    /// empty list.
    pub fn products_for_brand(&self, brand: &str) -> ImportResult<Vec<String>> {
        let wanted = brand.trim().to_uppercase();
        let mut products = BTreeSet::new();
        for sheet in self.sheets()?.iter() {
            if sheet.name.trim().to_uppercase() == wanted {
                products.extend(sheet_products(sheet));
            }
        }
        Ok(products.into_iter().collect())
    }

    /// Every brand/product pair.
    pub fn entries(&self) -> ImportResult<Vec<CatalogEntry>> {
        let mut entries = BTreeSet::new();
        for sheet in self.sheets()?.iter() {
            let brand = sheet.name.trim();
            if brand.is_empty() {
                continue;
            }
            for produto in sheet_products(sheet) {
                entries.insert(CatalogEntry {
                    brand: brand.to_string(),
                    produto,
                });
            }
        }
        Ok(entries.into_iter().collect())
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_catalog_is_a_single_brand() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("PRODIET.csv"),
            "Produto,Embalagem\n Formula X ,1L\nFormula A,\nFormula X,500ml\nnan,\n",
        )
        .unwrap();

        let catalog = ProductCatalog::discover(dir.path(), "PRODIET");
        assert_eq!(catalog.brands().unwrap(), vec!["PRODIET"]);
        assert_eq!(
            catalog.products_for_brand("prodiet").unwrap(),
            vec!["Formula A", "Formula X"]
        );
        assert!(catalog.products_for_brand("DANONE").unwrap().is_empty());
        assert_eq!(catalog.entries().unwrap().len(), 2);
        assert_eq!(catalog.cache().loads(), 1);
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = ProductCatalog::discover(dir.path(), "produtos");
        assert!(catalog.brands().unwrap().is_empty());
        assert!(catalog.entries().unwrap().is_empty());
    }
}
