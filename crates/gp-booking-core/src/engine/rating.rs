//! Rating aggregator: folds one rating per attended visit into the GP's
//! running average.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use super::{EngineError, EngineResult};
use crate::db::Database;
use crate::models::AttendanceState;

/// Applies a patient rating to a visit exactly once and updates the GP's
/// stored average incrementally. The read of the current average and rated
/// count happens inside the same transaction as the writes, so concurrent
/// raters cannot produce a lost update.
pub struct RatingAggregator<'a> {
    db: &'a mut Database,
}

impl<'a> RatingAggregator<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Rate an attended, unrated visit with `score` in `1..=5`. Returns the
    /// GP's new average, rounded to two decimal places.
    pub fn rate(&mut self, booking_id: &str, score: u8) -> EngineResult<f64> {
        if !(1..=5).contains(&score) {
            return Err(EngineError::InvalidRating(score));
        }
        debug!(booking_id, score, "rating requested");

        let tx = self.db.transaction()?;

        let visit = crate::db::visit_by_booking_id(&tx, booking_id)?
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", booking_id)))?;

        if visit.attendance != AttendanceState::Attended {
            warn!(booking_id, "rating on an unattended visit");
            return Err(EngineError::NotYetAttended);
        }
        if visit.rating.is_some() {
            warn!(booking_id, "visit already rated");
            return Err(EngineError::AlreadyRated);
        }

        let current_average = gp_average(&tx, &visit.staff_id)?;
        let rated_count = rated_visit_count(&tx, &visit.staff_id)?;

        let new_average = if rated_count == 0 {
            f64::from(score)
        } else {
            round2((current_average * rated_count as f64 + f64::from(score)) / (rated_count + 1) as f64)
        };

        tx.execute(
            "UPDATE visits SET rating = ?2, updated_at = ?3 WHERE booking_id = ?1",
            params![booking_id, score, Utc::now().to_rfc3339()],
        )?;
        tx.execute(
            "UPDATE users SET rating = ?2 WHERE id = ?1",
            params![visit.staff_id, new_average],
        )?;

        tx.commit()?;
        info!(booking_id, staff_id = %visit.staff_id, new_average, "rating recorded");
        Ok(new_average)
    }
}

/// The GP's stored running average.
fn gp_average(conn: &Connection, staff_id: &str) -> EngineResult<f64> {
    conn.query_row("SELECT rating FROM users WHERE id = ?", [staff_id], |row| {
        row.get(0)
    })
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            EngineError::NotFound(format!("GP {}", staff_id))
        }
        other => other.into(),
    })
}

/// Count of already-rated attended visits for the GP.
fn rated_visit_count(conn: &Connection, staff_id: &str) -> EngineResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(rating) FROM visits \
         WHERE staff_id = ? AND attendance = 'attended' AND rating IS NOT NULL",
        [staff_id],
        |row| row.get(0),
    )?)
}

/// Round to two decimal places, the precision of the stored average.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
