//! Slot allocator: converts an available slot into a pending visit.

use chrono::Utc;
use rusqlite::params;
use tracing::{debug, info, warn};

use super::{is_constraint_violation, is_foreign_key_violation, EngineError, EngineResult};
use crate::db::{to_sql_ts, Database};
use crate::models::{Slot, Visit};

/// The primary write path of the engine. Allocation is one transaction:
/// insert the visit, delete the available-slot row, and abort the whole
/// thing if the delete touches nothing - the slot the caller saw is gone.
pub struct SlotAllocator<'a> {
    db: &'a mut Database,
}

impl<'a> SlotAllocator<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Allocate `slot` to `patient_id`, returning the generated booking ID.
    ///
    /// The caller's view of availability is advisory; the slot's existence is
    /// re-validated at commit time. At most one visit can ever exist for a
    /// given `(staff_id, timeslot)`.
    pub fn allocate(&mut self, patient_id: &str, slot: &Slot) -> EngineResult<String> {
        debug!(patient_id, staff_id = %slot.staff_id, "allocating slot");

        if slot.timeslot <= Utc::now() {
            warn!(staff_id = %slot.staff_id, "refusing to allocate a slot in the past");
            return Err(EngineError::SlotUnavailable);
        }

        let visit = Visit::new(patient_id, slot);
        let tx = self.db.transaction()?;

        tx.execute(
            "INSERT INTO visits (booking_id, patient_id, staff_id, timeslot, confirmation, \
             attendance, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, 'pending', 'not_attended', ?5, ?6)",
            params![
                visit.booking_id,
                visit.patient_id,
                visit.staff_id,
                to_sql_ts(&visit.timeslot),
                visit.created_at,
                visit.updated_at,
            ],
        )
        .map_err(|e| {
            // A foreign-key failure is a bad patient reference, not a slot
            // race; the unique (staff_id, timeslot) index firing means a
            // visit already holds this slot.
            if is_foreign_key_violation(&e) {
                EngineError::NotFound(format!("patient {}", patient_id))
            } else if is_constraint_violation(&e) {
                EngineError::SlotUnavailable
            } else {
                e.into()
            }
        })?;

        let removed = tx.execute(
            "DELETE FROM available_slots WHERE staff_id = ?1 AND timeslot = ?2",
            params![slot.staff_id, to_sql_ts(&slot.timeslot)],
        )?;
        if removed == 0 {
            // Slot never existed or a concurrent allocation consumed it.
            // Dropping the transaction rolls the insert back.
            warn!(staff_id = %slot.staff_id, "slot vanished before commit");
            return Err(EngineError::SlotUnavailable);
        }

        tx.commit()?;
        info!(booking_id = %visit.booking_id, staff_id = %slot.staff_id, "slot allocated");
        Ok(visit.booking_id)
    }

    /// Attach patient pre-visit notes to a booking. Best-effort and
    /// deliberately not atomic with allocation; the payload is an opaque
    /// codec output.
    pub fn attach_notes(&mut self, booking_id: &str, encoded_notes: &str) -> EngineResult<()> {
        let rows_affected = self.db.conn().execute(
            "UPDATE visits SET patient_notes = ?2, updated_at = ?3 WHERE booking_id = ?1",
            params![booking_id, encoded_notes, Utc::now().to_rfc3339()],
        )?;
        if rows_affected == 0 {
            return Err(EngineError::NotFound(format!("visit {}", booking_id)));
        }
        debug!(booking_id, "patient notes attached");
        Ok(())
    }
}
