//! Domain models for the booking engine.

mod prescription;
mod slot;
mod user;
mod visit;

pub use prescription::*;
pub use slot::*;
pub use user::*;
pub use visit::*;
