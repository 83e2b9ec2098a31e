//! Domain layer - pure business rules with no I/O.

pub mod foundation;
pub mod tracking;
