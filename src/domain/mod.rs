//! Domain layer types and invariants.

pub mod contact;
pub mod content;
pub mod countries;
pub mod error;
pub mod forms;
pub mod plans;
pub mod records;
pub mod topics;
pub mod uploads;
