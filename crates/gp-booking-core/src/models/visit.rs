//! Visit models: the appointment record and its two state axes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Slot;

/// GP's decision on a pending visit. Mutated by the GP front end; the
/// lifecycle manager only reads it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfirmationState {
    /// Awaiting the GP's decision
    Pending,
    /// GP accepted the booking
    Confirmed,
    /// GP rejected the booking
    Rejected,
}

/// Whether the patient has checked in. Attendance is final: an attended
/// visit can no longer be cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttendanceState {
    NotAttended,
    Attended,
}

/// The appointment record, created by the slot allocator and advanced by the
/// lifecycle manager.
///
/// Invariants held by the engine:
/// - `timeslot` lies in the future at creation time
/// - `attendance == Attended` implies `confirmation == Confirmed`
/// - `rating` is set at most once, and only on an attended visit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Unique booking ID, generated at allocation time
    pub booking_id: String,
    pub patient_id: String,
    pub staff_id: String,
    pub timeslot: DateTime<Utc>,
    pub confirmation: ConfirmationState,
    pub attendance: AttendanceState,
    /// Patient-authored pre-visit notes, opaque codec payload
    pub patient_notes: Option<String>,
    /// GP-authored diagnosis, opaque codec payload
    pub diagnosis: Option<String>,
    /// GP-authored clinical notes, opaque codec payload
    pub clinical_notes: Option<String>,
    /// Patient satisfaction score in 1..=5, unset until rated
    pub rating: Option<u8>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Visit {
    /// Create a new pending visit for an allocated slot.
    pub fn new(patient_id: impl Into<String>, slot: &Slot) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            booking_id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.into(),
            staff_id: slot.staff_id.clone(),
            timeslot: slot.timeslot,
            confirmation: ConfirmationState::Pending,
            attendance: AttendanceState::NotAttended,
            patient_notes: None,
            diagnosis: None,
            clinical_notes: None,
            rating: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The slot this visit consumed (restored on cancellation).
    pub fn slot(&self) -> Slot {
        Slot::new(self.staff_id.clone(), self.timeslot)
    }
}

/// Read filter for a patient's visit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitFilter {
    /// Every visit on record
    All,
    /// Visits whose timeslot has not yet passed
    Upcoming,
    /// Attended past visits (ratable, prescriptions viewable)
    Attended,
    /// Confirmed past visits the patient missed
    Unattended,
}
