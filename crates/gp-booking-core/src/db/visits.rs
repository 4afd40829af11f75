//! Visit database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{from_sql_ts, to_sql_ts, Database, DbError, DbResult};
use crate::models::{AttendanceState, ConfirmationState, Visit, VisitFilter};

const VISIT_COLUMNS: &str = "booking_id, patient_id, staff_id, timeslot, confirmation, \
                             attendance, patient_notes, diagnosis, clinical_notes, rating, \
                             created_at, updated_at";

impl Database {
    /// Get a visit by booking ID.
    pub fn get_visit(&self, booking_id: &str) -> DbResult<Option<Visit>> {
        visit_by_booking_id(&self.conn, booking_id)
    }

    /// List a patient's visits, newest timeslot first. `now` anchors the
    /// Upcoming/Attended/Unattended views.
    pub fn list_visits(
        &self,
        patient_id: &str,
        filter: VisitFilter,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<Visit>> {
        let condition = match filter {
            VisitFilter::All => "1 = 1",
            VisitFilter::Upcoming => "timeslot >= ?2",
            VisitFilter::Attended => "attendance = 'attended'",
            // Confirmed past visits the patient missed
            VisitFilter::Unattended => {
                "confirmation = 'confirmed' AND attendance = 'not_attended' AND timeslot <= ?2"
            }
        };

        let sql = format!(
            "SELECT {} FROM visits WHERE patient_id = ?1 AND {} ORDER BY timeslot DESC",
            VISIT_COLUMNS, condition
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let map = |row: &rusqlite::Row<'_>| VisitRow::from_row(row);
        let rows = match filter {
            VisitFilter::All | VisitFilter::Attended => stmt.query_map([patient_id], map)?,
            _ => stmt.query_map(params![patient_id, to_sql_ts(&now)], map)?,
        };

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row?.try_into()?);
        }
        Ok(visits)
    }

    /// Record the GP's confirm/reject decision on a pending visit. The
    /// decision is one-shot: only a pending visit can move, and never after
    /// the patient has checked in, keeping Attended implying Confirmed.
    pub fn set_confirmation(&self, booking_id: &str, state: ConfirmationState) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE visits SET confirmation = ?2, updated_at = ?3 \
             WHERE booking_id = ?1 AND confirmation = 'pending' \
               AND attendance = 'not_attended'",
            params![
                booking_id,
                confirmation_to_string(&state),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Record the GP-authored outcome of an attended visit. The payloads are
    /// opaque to the engine; callers encode them with the codec collaborator.
    pub fn record_outcome(
        &self,
        booking_id: &str,
        diagnosis: &str,
        clinical_notes: &str,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE visits SET diagnosis = ?2, clinical_notes = ?3, updated_at = ?4 \
             WHERE booking_id = ?1 AND attendance = 'attended'",
            params![
                booking_id,
                diagnosis,
                clinical_notes,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(rows_affected > 0)
    }
}

/// Look up a visit on a raw connection, usable inside an open transaction.
pub(crate) fn visit_by_booking_id(conn: &Connection, booking_id: &str) -> DbResult<Option<Visit>> {
    let sql = format!("SELECT {} FROM visits WHERE booking_id = ?", VISIT_COLUMNS);
    conn.query_row(&sql, [booking_id], VisitRow::from_row)
        .optional()?
        .map(|row| row.try_into())
        .transpose()
}

/// Intermediate row struct for database mapping.
struct VisitRow {
    booking_id: String,
    patient_id: String,
    staff_id: String,
    timeslot: String,
    confirmation: String,
    attendance: String,
    patient_notes: Option<String>,
    diagnosis: Option<String>,
    clinical_notes: Option<String>,
    rating: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl VisitRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(VisitRow {
            booking_id: row.get(0)?,
            patient_id: row.get(1)?,
            staff_id: row.get(2)?,
            timeslot: row.get(3)?,
            confirmation: row.get(4)?,
            attendance: row.get(5)?,
            patient_notes: row.get(6)?,
            diagnosis: row.get(7)?,
            clinical_notes: row.get(8)?,
            rating: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<VisitRow> for Visit {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(Visit {
            booking_id: row.booking_id,
            patient_id: row.patient_id,
            staff_id: row.staff_id,
            timeslot: from_sql_ts(&row.timeslot)?,
            confirmation: string_to_confirmation(&row.confirmation)?,
            attendance: string_to_attendance(&row.attendance)?,
            patient_notes: row.patient_notes,
            diagnosis: row.diagnosis,
            clinical_notes: row.clinical_notes,
            rating: row.rating.map(|r| r as u8),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn confirmation_to_string(state: &ConfirmationState) -> &'static str {
    match state {
        ConfirmationState::Pending => "pending",
        ConfirmationState::Confirmed => "confirmed",
        ConfirmationState::Rejected => "rejected",
    }
}

fn string_to_confirmation(s: &str) -> Result<ConfirmationState, DbError> {
    match s {
        "pending" => Ok(ConfirmationState::Pending),
        "confirmed" => Ok(ConfirmationState::Confirmed),
        "rejected" => Ok(ConfirmationState::Rejected),
        _ => Err(DbError::Constraint(format!(
            "Unknown confirmation state: {}",
            s
        ))),
    }
}

fn string_to_attendance(s: &str) -> Result<AttendanceState, DbError> {
    match s {
        "not_attended" => Ok(AttendanceState::NotAttended),
        "attended" => Ok(AttendanceState::Attended),
        _ => Err(DbError::Constraint(format!(
            "Unknown attendance state: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Slot, User};
    use chrono::Duration;

    fn setup() -> (Database, User, User) {
        let db = Database::open_in_memory().unwrap();
        let gp = User::new_gp("Alice", "Wong");
        let patient = User::new_patient("Carol", "Diaz");
        db.insert_user(&gp).unwrap();
        db.insert_user(&patient).unwrap();
        (db, gp, patient)
    }

    fn insert_visit(db: &Database, visit: &Visit) {
        db.conn()
            .execute(
                "INSERT INTO visits (booking_id, patient_id, staff_id, timeslot, confirmation, \
                 attendance, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    visit.booking_id,
                    visit.patient_id,
                    visit.staff_id,
                    to_sql_ts(&visit.timeslot),
                    confirmation_to_string(&visit.confirmation),
                    "not_attended",
                    visit.created_at,
                    visit.updated_at,
                ],
            )
            .unwrap();
    }

    #[test]
    fn test_get_visit_round_trip() {
        let (db, gp, patient) = setup();
        let slot = Slot::new(&gp.id, Utc::now() + Duration::days(10));
        let visit = Visit::new(&patient.id, &slot);
        insert_visit(&db, &visit);

        let retrieved = db.get_visit(&visit.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.booking_id, visit.booking_id);
        assert_eq!(retrieved.staff_id, gp.id);
        assert_eq!(retrieved.confirmation, ConfirmationState::Pending);
        assert_eq!(retrieved.attendance, AttendanceState::NotAttended);
        assert!(retrieved.rating.is_none());

        assert!(db.get_visit("missing").unwrap().is_none());
    }

    #[test]
    fn test_set_confirmation() {
        let (db, gp, patient) = setup();
        let slot = Slot::new(&gp.id, Utc::now() + Duration::days(10));
        let visit = Visit::new(&patient.id, &slot);
        insert_visit(&db, &visit);

        assert!(db
            .set_confirmation(&visit.booking_id, ConfirmationState::Confirmed)
            .unwrap());
        let retrieved = db.get_visit(&visit.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.confirmation, ConfirmationState::Confirmed);

        assert!(!db
            .set_confirmation("missing", ConfirmationState::Confirmed)
            .unwrap());
    }

    #[test]
    fn test_set_confirmation_only_moves_pending_visits() {
        let (db, gp, patient) = setup();
        let slot = Slot::new(&gp.id, Utc::now() + Duration::days(10));
        let visit = Visit::new(&patient.id, &slot);
        insert_visit(&db, &visit);

        assert!(db
            .set_confirmation(&visit.booking_id, ConfirmationState::Confirmed)
            .unwrap());

        // The decision is one-shot: a confirmed visit cannot be rejected
        assert!(!db
            .set_confirmation(&visit.booking_id, ConfirmationState::Rejected)
            .unwrap());
        let retrieved = db.get_visit(&visit.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.confirmation, ConfirmationState::Confirmed);

        // Nor can a rejected visit be resurrected
        let other = Visit::new(&patient.id, &Slot::new(&gp.id, Utc::now() + Duration::days(11)));
        insert_visit(&db, &other);
        assert!(db
            .set_confirmation(&other.booking_id, ConfirmationState::Rejected)
            .unwrap());
        assert!(!db
            .set_confirmation(&other.booking_id, ConfirmationState::Confirmed)
            .unwrap());
        let retrieved = db.get_visit(&other.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.confirmation, ConfirmationState::Rejected);
    }

    #[test]
    fn test_set_confirmation_refused_after_check_in() {
        let (db, gp, patient) = setup();
        let slot = Slot::new(&gp.id, Utc::now() + Duration::days(10));
        let visit = Visit::new(&patient.id, &slot);
        insert_visit(&db, &visit);

        db.conn()
            .execute(
                "UPDATE visits SET attendance = 'attended', confirmation = 'confirmed' \
                 WHERE booking_id = ?",
                [&visit.booking_id],
            )
            .unwrap();

        // A late reject must not break Attended implying Confirmed
        assert!(!db
            .set_confirmation(&visit.booking_id, ConfirmationState::Rejected)
            .unwrap());
        let retrieved = db.get_visit(&visit.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.confirmation, ConfirmationState::Confirmed);
        assert_eq!(retrieved.attendance, AttendanceState::Attended);
    }

    #[test]
    fn test_record_outcome_requires_attendance() {
        let (db, gp, patient) = setup();
        let slot = Slot::new(&gp.id, Utc::now() + Duration::days(10));
        let visit = Visit::new(&patient.id, &slot);
        insert_visit(&db, &visit);

        // Not attended yet
        assert!(!db
            .record_outcome(&visit.booking_id, "enc-diagnosis", "enc-notes")
            .unwrap());

        db.conn()
            .execute(
                "UPDATE visits SET attendance = 'attended', confirmation = 'confirmed' \
                 WHERE booking_id = ?",
                [&visit.booking_id],
            )
            .unwrap();

        assert!(db
            .record_outcome(&visit.booking_id, "enc-diagnosis", "enc-notes")
            .unwrap());
        let retrieved = db.get_visit(&visit.booking_id).unwrap().unwrap();
        assert_eq!(retrieved.diagnosis.as_deref(), Some("enc-diagnosis"));
        assert_eq!(retrieved.clinical_notes.as_deref(), Some("enc-notes"));
    }

    #[test]
    fn test_list_visits_filters() {
        let (db, gp, patient) = setup();
        let now = Utc::now();

        // Upcoming confirmed visit
        let future = Visit::new(&patient.id, &Slot::new(&gp.id, now + Duration::days(10)));
        insert_visit(&db, &future);

        // Past confirmed visit that was missed
        let mut missed = Visit::new(&patient.id, &Slot::new(&gp.id, now - Duration::days(3)));
        missed.confirmation = ConfirmationState::Confirmed;
        insert_visit(&db, &missed);

        // Past attended visit
        let attended = Visit::new(&patient.id, &Slot::new(&gp.id, now - Duration::days(7)));
        insert_visit(&db, &attended);
        db.conn()
            .execute(
                "UPDATE visits SET attendance = 'attended', confirmation = 'confirmed' \
                 WHERE booking_id = ?",
                [&attended.booking_id],
            )
            .unwrap();

        let all = db.list_visits(&patient.id, VisitFilter::All, now).unwrap();
        assert_eq!(all.len(), 3);
        // Newest timeslot first
        assert_eq!(all[0].booking_id, future.booking_id);

        let upcoming = db
            .list_visits(&patient.id, VisitFilter::Upcoming, now)
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].booking_id, future.booking_id);

        let attended_visits = db
            .list_visits(&patient.id, VisitFilter::Attended, now)
            .unwrap();
        assert_eq!(attended_visits.len(), 1);
        assert_eq!(attended_visits[0].booking_id, attended.booking_id);

        let unattended = db
            .list_visits(&patient.id, VisitFilter::Unattended, now)
            .unwrap();
        assert_eq!(unattended.len(), 1);
        assert_eq!(unattended[0].booking_id, missed.booking_id);
    }
}
