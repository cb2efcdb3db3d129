//! Command implementations.

pub mod batch;
pub mod generate;
pub mod templates;
pub mod validate;
