//! SQLite schema definition.

/// Complete database schema for the booking engine.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Users (patients and GPs)
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('gp', 'patient')),
    rating REAL NOT NULL DEFAULT 0,              -- GP running average, unused for patients
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

-- ============================================================================
-- Available Slots (GP-published inventory, consumed by allocation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS available_slots (
    staff_id TEXT NOT NULL REFERENCES users(id),
    timeslot TEXT NOT NULL,                      -- RFC 3339, UTC
    PRIMARY KEY (staff_id, timeslot)
);

CREATE INDEX IF NOT EXISTS idx_available_slots_timeslot ON available_slots(timeslot);

-- ============================================================================
-- Visits (the appointment record)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visits (
    booking_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES users(id),
    staff_id TEXT NOT NULL REFERENCES users(id),
    timeslot TEXT NOT NULL,                      -- RFC 3339, UTC
    confirmation TEXT NOT NULL DEFAULT 'pending'
        CHECK (confirmation IN ('pending', 'confirmed', 'rejected')),
    attendance TEXT NOT NULL DEFAULT 'not_attended'
        CHECK (attendance IN ('not_attended', 'attended')),
    patient_notes TEXT,                          -- opaque codec payload
    diagnosis TEXT,                              -- opaque codec payload
    clinical_notes TEXT,                         -- opaque codec payload
    rating INTEGER CHECK (rating BETWEEN 1 AND 5),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- At most one visit may ever exist per slot
CREATE UNIQUE INDEX IF NOT EXISTS idx_visits_slot ON visits(staff_id, timeslot);
CREATE INDEX IF NOT EXISTS idx_visits_patient ON visits(patient_id);
CREATE INDEX IF NOT EXISTS idx_visits_staff ON visits(staff_id);

-- ============================================================================
-- Prescriptions (child records of a visit, GP-authored)
-- ============================================================================

CREATE TABLE IF NOT EXISTS prescriptions (
    id TEXT PRIMARY KEY,
    booking_id TEXT NOT NULL REFERENCES visits(booking_id) ON DELETE CASCADE,
    drug_name TEXT NOT NULL,
    quantity REAL NOT NULL,
    instructions TEXT                            -- opaque codec payload
);

CREATE INDEX IF NOT EXISTS idx_prescriptions_booking ON prescriptions(booking_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_visit_slot_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO users (id, first_name, last_name, role) VALUES ('gp-1', 'A', 'B', 'gp')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, role) VALUES ('p-1', 'C', 'D', 'patient')",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO visits (booking_id, patient_id, staff_id, timeslot, created_at, updated_at) \
                      VALUES (?, 'p-1', 'gp-1', '2030-05-01T09:00:00Z', 'now', 'now')";
        conn.execute(insert, ["b-1"]).unwrap();

        // Second visit for the same (staff, timeslot) must be rejected
        let result = conn.execute(insert, ["b-2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rating_range_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO users (id, first_name, last_name, role) VALUES ('gp-1', 'A', 'B', 'gp')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, role) VALUES ('p-1', 'C', 'D', 'patient')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO visits (booking_id, patient_id, staff_id, timeslot, created_at, updated_at) \
             VALUES ('b-1', 'p-1', 'gp-1', '2030-05-01T09:00:00Z', 'now', 'now')",
            [],
        )
        .unwrap();

        let result = conn.execute("UPDATE visits SET rating = 6 WHERE booking_id = 'b-1'", []);
        assert!(result.is_err());

        let result = conn.execute("UPDATE visits SET rating = 5 WHERE booking_id = 'b-1'", []);
        assert!(result.is_ok());
    }
}
