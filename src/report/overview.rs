// ==========================================
// Nutri Hospital - Overview report
// ==========================================

use crate::domain::{Contact, HospitalProduct};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Brand label for product rows without a brand.
pub const NO_BRAND: &str = "(sem marca)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverviewReport {
    pub hospitals: usize,
    pub contacts: usize,
    pub unassociated_contacts: usize,
    pub product_rows: usize,
    pub product_units: i64,
    pub units_by_brand: BTreeMap<String, i64>,
}

impl OverviewReport {
    pub fn from_records(
        hospitals: usize,
        contacts: &[Contact],
        products: &[HospitalProduct],
    ) -> Self {
        let mut units_by_brand = BTreeMap::new();
        for product in products {
            let brand = match product.marca_planilha.trim() {
                "" => NO_BRAND.to_string(),
                brand => brand.to_uppercase(),
            };
            *units_by_brand.entry(brand).or_insert(0) += product.quantidade;
        }
        Self {
            hospitals,
            contacts: contacts.len(),
            unassociated_contacts: contacts.iter().filter(|c| !c.is_associated()).count(),
            product_rows: products.len(),
            product_units: products.iter().map(|p| p.quantidade).sum(),
            units_by_brand,
        }
    }
}

impl fmt::Display for OverviewReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hospitais:              {}", self.hospitals)?;
        writeln!(f, "Contatos:               {}", self.contacts)?;
        writeln!(f, "  sem hospital:         {}", self.unassociated_contacts)?;
        writeln!(f, "Produtos (linhas):      {}", self.product_rows)?;
        writeln!(f, "Produtos (unidades):    {}", self.product_units)?;
        if !self.units_by_brand.is_empty() {
            writeln!(f, "Unidades por marca:")?;
            for (brand, units) in &self.units_by_brand {
                writeln!(f, "  {:<22}{}", brand, units)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NutritionFacts;

    fn product(brand: &str, quantidade: i64) -> HospitalProduct {
        HospitalProduct {
            id: 0,
            hospital_id: 1,
            nome_hospital: "Hospital A".to_string(),
            marca_planilha: brand.to_string(),
            produto: "Formula".to_string(),
            quantidade,
            facts: NutritionFacts::default(),
        }
    }

    #[test]
    fn test_units_grouped_by_brand() {
        let contacts = vec![Contact {
            id: 1,
            hospital_id: None,
            hospital_nome: "Hospital Fantasma".to_string(),
            nome_contato: "Bruno".to_string(),
            cargo: String::new(),
            telefone: String::new(),
        }];
        let products = vec![product("Prodiet", 3), product("PRODIET ", 4), product("", 2)];

        let overview = OverviewReport::from_records(1, &contacts, &products);
        assert_eq!(overview.unassociated_contacts, 1);
        assert_eq!(overview.product_rows, 3);
        assert_eq!(overview.product_units, 9);
        assert_eq!(overview.units_by_brand.get("PRODIET"), Some(&7));
        assert_eq!(overview.units_by_brand.get(NO_BRAND), Some(&2));
        assert!(overview.to_string().contains("PRODIET"));
    }
}
