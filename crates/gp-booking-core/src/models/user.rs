//! User models (patients and GPs share one table).

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Gp,
    Patient,
}

/// A clinic user. The `rating` field is the GP's running rating aggregate and
/// stays at its default for patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Stable user ID
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Running mean of ratings across the GP's rated, attended visits.
    /// Zero until the first rating lands.
    pub rating: f64,
}

impl User {
    /// Create a GP account.
    pub fn new_gp(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::new(first_name, last_name, Role::Gp)
    }

    /// Create a patient account.
    pub fn new_patient(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self::new(first_name, last_name, Role::Patient)
    }

    fn new(first_name: impl Into<String>, last_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            rating: 0.0,
        }
    }
}
