// ==========================================
// Nutri Hospital - Product-at-hospital repository
// ==========================================
// Table: produtos_hospitais
// One row per hospital + product + brand (case-insensitive, trimmed);
// re-submitting the pair increments quantidade.
// ==========================================

use crate::domain::{HospitalProduct, NewHospitalProduct, NutritionFacts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "id, hospital_id, nome_hospital, marca_planilha, produto, quantidade, \
     embalagem, referencia, kcal, ptn, lip, fibras, sodio, ferro, potassio, vit_b12, \
     gordura_saturada";

/// Result of [`ProductRepository::add_or_increment_tx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductWrite {
    Created(i64),
    Incremented(i64),
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<HospitalProduct> {
    let mut facts = Vec::with_capacity(NutritionFacts::KEYS.len());
    for idx in 0..NutritionFacts::KEYS.len() {
        facts.push(row.get::<_, String>(idx + 6)?);
    }
    let facts: [String; 11] = facts
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnIndex(6))?;

    Ok(HospitalProduct {
        id: row.get(0)?,
        hospital_id: row.get(1)?,
        nome_hospital: row.get(2)?,
        marca_planilha: row.get(3)?,
        produto: row.get(4)?,
        quantidade: row.get(5)?,
        facts: NutritionFacts::from_values(facts),
    })
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn list_by_hospital_tx(
        conn: &Connection,
        hospital_id: i64,
    ) -> RepositoryResult<Vec<HospitalProduct>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM produtos_hospitais WHERE hospital_id = ?1 \
             ORDER BY produto COLLATE NOCASE, id"
        ))?;
        let rows = stmt.query_map([hospital_id], map_product)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Insert a product row, or add the quantity to the existing row of the
    /// same hospital + product + brand.
    ///
    /// Non-empty nutrition facts replace the stored ones.
    pub fn add_or_increment_tx(
        conn: &Connection,
        product: &NewHospitalProduct,
    ) -> RepositoryResult<ProductWrite> {
        let existing = Self::list_by_hospital_tx(conn, product.hospital_id)?
            .into_iter()
            .find(|p| {
                same_text(&p.produto, &product.produto)
                    && same_text(&p.marca_planilha, &product.marca_planilha)
            });

        if let Some(existing) = existing {
            conn.execute(
                "UPDATE produtos_hospitais SET quantidade = quantidade + ?2 WHERE id = ?1",
                params![existing.id, product.quantidade],
            )?;
            if !product.facts.is_empty() {
                Self::write_facts_tx(conn, existing.id, &product.facts)?;
            }
            return Ok(ProductWrite::Incremented(existing.id));
        }

        let f = &product.facts;
        conn.execute(
            &format!(
                "INSERT INTO produtos_hospitais \
                 (hospital_id, nome_hospital, marca_planilha, produto, quantidade, {}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                NutritionFacts::KEYS.join(", ")
            ),
            params![
                product.hospital_id,
                product.nome_hospital,
                product.marca_planilha.trim(),
                product.produto.trim(),
                product.quantidade,
                f.embalagem,
                f.referencia,
                f.kcal,
                f.ptn,
                f.lip,
                f.fibras,
                f.sodio,
                f.ferro,
                f.potassio,
                f.vit_b12,
                f.gordura_saturada,
            ],
        )?;
        Ok(ProductWrite::Created(conn.last_insert_rowid()))
    }

    fn write_facts_tx(conn: &Connection, id: i64, f: &NutritionFacts) -> RepositoryResult<()> {
        let assignments = NutritionFacts::KEYS
            .iter()
            .enumerate()
            .map(|(idx, key)| format!("{key} = ?{}", idx + 2))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(
            &format!("UPDATE produtos_hospitais SET {assignments} WHERE id = ?1"),
            params![
                id,
                f.embalagem,
                f.referencia,
                f.kcal,
                f.ptn,
                f.lip,
                f.fibras,
                f.sodio,
                f.ferro,
                f.potassio,
                f.vit_b12,
                f.gordura_saturada,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<HospitalProduct> {
        conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM produtos_hospitais WHERE id = ?1"),
            [id],
            map_product,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "HospitalProduct".to_string(),
                id: id.to_string(),
            },
            other => other.into(),
        })
    }

    pub fn add_or_increment(
        &self,
        product: &NewHospitalProduct,
    ) -> RepositoryResult<HospitalProduct> {
        let conn = self.get_conn()?;
        let id = match Self::add_or_increment_tx(&conn, product)? {
            ProductWrite::Created(id) | ProductWrite::Incremented(id) => id,
        };
        Self::find_by_id_tx(&conn, id)
    }

    /// Products of a hospital ordered by product name.
    pub fn list_by_hospital(&self, hospital_id: i64) -> RepositoryResult<Vec<HospitalProduct>> {
        let conn = self.get_conn()?;
        Self::list_by_hospital_tx(&conn, hospital_id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<HospitalProduct>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM produtos_hospitais \
             ORDER BY hospital_id, produto COLLATE NOCASE, id"
        ))?;
        let rows = stmt.query_map([], map_product)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Delete a product row that belongs to `hospital_id`.
    pub fn delete_for_hospital(&self, hospital_id: i64, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM produtos_hospitais WHERE id = ?1 AND hospital_id = ?2",
            params![id, hospital_id],
        )?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count =
            conn.query_row("SELECT COUNT(*) FROM produtos_hospitais", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::NewHospital;
    use crate::repository::HospitalRepository;

    fn setup() -> (HospitalRepository, ProductRepository) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (
            HospitalRepository::new(conn.clone()),
            ProductRepository::new(conn),
        )
    }

    fn product(hospital_id: i64, name: &str, brand: &str, qty: i64) -> NewHospitalProduct {
        NewHospitalProduct {
            hospital_id,
            nome_hospital: "H1".to_string(),
            marca_planilha: brand.to_string(),
            produto: name.to_string(),
            quantidade: qty,
            facts: NutritionFacts::default(),
        }
    }

    #[test]
    fn test_resubmission_increments_quantity() {
        let (hospitals, products) = setup();
        let h = hospitals.create(&NewHospital::named("H1")).unwrap();

        products.add_or_increment(&product(h.id, "Formula X", "PRODIET", 3)).unwrap();
        let second = products
            .add_or_increment(&product(h.id, " formula x ", "prodiet", 4))
            .unwrap();

        assert_eq!(second.quantidade, 7);
        assert_eq!(products.count().unwrap(), 1);

        // Other brand is another row
        products.add_or_increment(&product(h.id, "Formula X", "DANONE", 1)).unwrap();
        assert_eq!(products.list_by_hospital(h.id).unwrap().len(), 2);
    }

    #[test]
    fn test_facts_are_stored() {
        let (hospitals, products) = setup();
        let h = hospitals.create(&NewHospital::named("H1")).unwrap();

        let mut new = product(h.id, "Formula X", "PRODIET", 1);
        new.facts.kcal = "150".to_string();
        new.facts.vit_b12 = "0,4".to_string();
        let stored = products.add_or_increment(&new).unwrap();

        assert_eq!(stored.facts.kcal, "150");
        assert_eq!(stored.facts.vit_b12, "0,4");
    }

    #[test]
    fn test_negative_quantity_is_rejected_by_store() {
        let (hospitals, products) = setup();
        let h = hospitals.create(&NewHospital::named("H1")).unwrap();
        let result = products.add_or_increment(&product(h.id, "Formula X", "", -1));
        assert!(matches!(result, Err(RepositoryError::CheckConstraintViolation(_))));
    }

    #[test]
    fn test_delete_requires_owning_hospital() {
        let (hospitals, products) = setup();
        let h1 = hospitals.create(&NewHospital::named("H1")).unwrap();
        let h2 = hospitals.create(&NewHospital::named("H2")).unwrap();
        let p = products.add_or_increment(&product(h1.id, "Formula X", "", 1)).unwrap();

        assert!(!products.delete_for_hospital(h2.id, p.id).unwrap());
        assert!(products.delete_for_hospital(h1.id, p.id).unwrap());
    }
}
