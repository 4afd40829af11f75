//! Prescription models.

use serde::{Deserialize, Serialize};

/// A prescription written against a visit. Created by the GP front end,
/// read-only from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: String,
    /// The visit this prescription belongs to
    pub booking_id: String,
    pub drug_name: String,
    pub quantity: f64,
    /// Dosage instructions, opaque codec payload
    pub instructions: Option<String>,
}

impl Prescription {
    pub fn new(booking_id: impl Into<String>, drug_name: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking_id.into(),
            drug_name: drug_name.into(),
            quantity,
            instructions: None,
        }
    }
}
