//! Lifecycle manager: check-in and cancellation of a visit.

use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::{debug, info, warn};

use super::{cancellation_notice, check_in_window, EngineError, EngineResult};
use crate::db::{to_sql_ts, visit_by_booking_id, Database};
use crate::models::{AttendanceState, ConfirmationState};

/// Advances a visit along the attendance axis. Check-in flips the record to
/// attended; cancellation is a compensating action that deletes the visit and
/// restores the slot to the available inventory, both inside one transaction.
pub struct LifecycleManager<'a> {
    db: &'a mut Database,
}

impl<'a> LifecycleManager<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Check the patient in for a confirmed visit.
    ///
    /// Allowed only within `[timeslot - 1h, timeslot + 1h]` and only once the
    /// GP has confirmed. Attendance is final.
    pub fn check_in(&mut self, booking_id: &str, now: DateTime<Utc>) -> EngineResult<()> {
        debug!(booking_id, "check-in requested");
        let tx = self.db.transaction()?;

        let visit = visit_by_booking_id(&tx, booking_id)?
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", booking_id)))?;

        if visit.attendance == AttendanceState::Attended {
            warn!(booking_id, "check-in on an already attended visit");
            return Err(EngineError::Conflict);
        }
        match visit.confirmation {
            ConfirmationState::Confirmed => {}
            ConfirmationState::Pending | ConfirmationState::Rejected => {
                warn!(booking_id, "check-in on an unconfirmed visit");
                return Err(EngineError::NotConfirmed);
            }
        }

        let window = check_in_window();
        if now < visit.timeslot - window || now > visit.timeslot + window {
            warn!(booking_id, "check-in outside the allowed window");
            return Err(EngineError::OutsideCheckInWindow);
        }

        let rows_affected = tx.execute(
            "UPDATE visits SET attendance = 'attended', updated_at = ?2 \
             WHERE booking_id = ?1 AND attendance = 'not_attended'",
            params![booking_id, Utc::now().to_rfc3339()],
        )?;
        if rows_affected == 0 {
            return Err(EngineError::Conflict);
        }

        tx.commit()?;
        info!(booking_id, "patient checked in");
        Ok(())
    }

    /// Cancel a visit and restore its slot to the available inventory.
    ///
    /// Requires `now < timeslot - 5 days`. Delete and restore are one
    /// transaction, so the slot can neither be duplicated nor lost; a second
    /// cancel finds no visit and fails with `NotFound`.
    pub fn cancel(&mut self, booking_id: &str, now: DateTime<Utc>) -> EngineResult<()> {
        debug!(booking_id, "cancellation requested");
        let tx = self.db.transaction()?;

        let visit = visit_by_booking_id(&tx, booking_id)?
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", booking_id)))?;

        if visit.attendance == AttendanceState::Attended {
            warn!(booking_id, "cancel on an attended visit");
            return Err(EngineError::Conflict);
        }
        if now >= visit.timeslot - cancellation_notice() {
            warn!(booking_id, "cancellation deadline passed");
            return Err(EngineError::CancellationWindowClosed);
        }

        let removed = tx.execute("DELETE FROM visits WHERE booking_id = ?", [booking_id])?;
        if removed == 0 {
            return Err(EngineError::Conflict);
        }
        tx.execute(
            "INSERT INTO available_slots (staff_id, timeslot) VALUES (?1, ?2)",
            params![visit.staff_id, to_sql_ts(&visit.timeslot)],
        )?;

        tx.commit()?;
        info!(booking_id, staff_id = %visit.staff_id, "visit cancelled, slot restored");
        Ok(())
    }
}
