//! Reference data
//!
//! The label catalog offering valid choices per field.

pub mod catalog;

pub use catalog::LabelCatalog;
