//! Prescription database operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::Prescription;

impl Database {
    /// Insert a prescription against a visit (GP action).
    pub fn insert_prescription(&self, prescription: &Prescription) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO prescriptions (id, booking_id, drug_name, quantity, instructions)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                prescription.id,
                prescription.booking_id,
                prescription.drug_name,
                prescription.quantity,
                prescription.instructions,
            ],
        )?;
        Ok(())
    }

    /// List prescriptions written against a visit.
    pub fn list_prescriptions(&self, booking_id: &str) -> DbResult<Vec<Prescription>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, booking_id, drug_name, quantity, instructions \
             FROM prescriptions WHERE booking_id = ? ORDER BY drug_name",
        )?;

        let rows = stmt.query_map([booking_id], |row| {
            Ok(Prescription {
                id: row.get(0)?,
                booking_id: row.get(1)?,
                drug_name: row.get(2)?,
                quantity: row.get(3)?,
                instructions: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
