//! Available-slot database operations.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{from_sql_ts, to_sql_ts, Database, DbResult};
use crate::models::{Slot, SlotListing};

impl Database {
    /// Publish a slot into the available inventory (GP schedule publishing).
    pub fn publish_slot(&self, slot: &Slot) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO available_slots (staff_id, timeslot) VALUES (?1, ?2)",
            params![slot.staff_id, to_sql_ts(&slot.timeslot)],
        )?;
        Ok(())
    }

    /// Whether a slot is currently in the available inventory. Advisory only:
    /// the allocator re-validates inside its transaction.
    pub fn slot_is_available(&self, slot: &Slot) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM available_slots WHERE staff_id = ?1 AND timeslot = ?2",
            params![slot.staff_id, to_sql_ts(&slot.timeslot)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List available slots joined with GP identity, ordered by time then GP.
    ///
    /// `gp_filter` narrows the listing to one GP; `from`/`to` bound the
    /// timeslot (inclusive/exclusive).
    pub fn list_available_slots(
        &self,
        gp_filter: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SlotListing>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.staff_id, s.timeslot, u.first_name, u.last_name
            FROM available_slots s JOIN users u ON s.staff_id = u.id
            WHERE s.timeslot >= ?1 AND s.timeslot < ?2
              AND (?3 IS NULL OR s.staff_id = ?3)
            ORDER BY s.timeslot, u.last_name
            "#,
        )?;

        let rows = stmt.query_map(
            params![to_sql_ts(&from), to_sql_ts(&to), gp_filter],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )?;

        let mut listings = Vec::new();
        for row in rows {
            let (staff_id, timeslot, gp_first_name, gp_last_name) = row?;
            listings.push(SlotListing {
                slot: Slot::new(staff_id, from_sql_ts(&timeslot)?),
                gp_first_name,
                gp_last_name,
            });
        }
        Ok(listings)
    }
}
