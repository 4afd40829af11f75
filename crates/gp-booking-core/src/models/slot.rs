//! Slot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bookable unit of a GP's time.
///
/// A `(staff_id, timeslot)` pair lives in exactly one of the available-slot
/// set and the active-visit set at any point in time. The allocator moves it
/// from the former to the latter; cancellation moves it back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    /// GP identity owning this slot
    pub staff_id: String,
    /// Start of the appointment, unique per GP
    pub timeslot: DateTime<Utc>,
}

impl Slot {
    pub fn new(staff_id: impl Into<String>, timeslot: DateTime<Utc>) -> Self {
        Self {
            staff_id: staff_id.into(),
            timeslot,
        }
    }
}

/// An available slot joined with the owning GP's identity, as presented to
/// patients choosing an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotListing {
    pub slot: Slot,
    /// GP first name
    pub gp_first_name: String,
    /// GP last name
    pub gp_last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slot_equality_is_by_key() {
        let ts = Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(Slot::new("gp-1", ts), Slot::new("gp-1", ts));
        assert_ne!(Slot::new("gp-1", ts), Slot::new("gp-2", ts));
    }
}
