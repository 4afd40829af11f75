//! GP Booking Core Library
//!
//! Appointment slot-allocation and lifecycle engine for a clinic: GPs publish
//! timeslots, patients book, check in to, cancel and rate them.
//!
//! # Architecture
//!
//! ```text
//! GP publishes slots          Patient picks a slot
//!         │                           │
//!         ▼                           ▼
//!   [available_slots] ──────► Slot Allocator ──────► [visits] (pending)
//!                     one transaction:                   │
//!                     insert visit + delete slot         │ GP confirms/rejects
//!                                                        ▼
//!                                              Lifecycle Manager
//!                                              ├─ check-in (timeslot ± 1h)
//!                                              │      └─► attended
//!                                              └─ cancel (5+ days notice)
//!                                                     └─► visit deleted,
//!                                                         slot restored
//!                                                        │
//!                                                        ▼
//!                                              Rating Aggregator
//!                                              one rating per attended visit,
//!                                              GP running average updated in
//!                                              the same transaction
//! ```
//!
//! # Core Principle
//!
//! **The store transaction boundary is the only concurrency mechanism.** The
//! engine holds no state between calls and never trusts an earlier read: slot
//! existence, visit state and the rating count are all re-validated inside
//! the transaction that acts on them. At most one visit can ever exist for a
//! given `(staff_id, timeslot)`.
//!
//! Personal-data fields (patient notes, diagnosis, clinical notes,
//! prescription instructions) are opaque payloads: callers run them through
//! the codec collaborator before attaching and after reading.
//!
//! # Modules
//!
//! - [`db`]: SQLite store - schema, row mapping, read queries and the
//!   collaborator surface (slot publishing, GP confirmation, outcomes,
//!   prescriptions)
//! - [`models`]: Domain types (Slot, Visit, User, Prescription) with explicit
//!   state enums
//! - [`engine`]: Slot allocator, lifecycle manager, rating aggregator and the
//!   typed error taxonomy

pub mod db;
pub mod engine;
pub mod models;

// Re-export commonly used types
pub use db::Database;
pub use engine::{
    EngineError, EngineResult, LifecycleManager, RatingAggregator, SlotAllocator,
};
pub use models::{
    AttendanceState, ConfirmationState, Prescription, Role, Slot, SlotListing, User, Visit,
    VisitFilter,
};
