//! Application layer containing the business logic orchestration.
//!
//! `PayrollEngine` is the entry point for computing and reading payroll;
//! `Registry` validates the administrative records the engine reads. Both
//! talk to storage only through the ports in [`crate::domain::ports`].

pub mod engine;
pub mod registry;
