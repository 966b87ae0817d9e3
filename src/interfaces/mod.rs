//! Adapters between the payroll core and external formats.

pub mod csv;
pub mod json;
