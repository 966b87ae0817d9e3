//! Domain layer: records, value objects, the pure payroll calculation and
//! the storage ports the application layer depends on.

pub mod conversion;
pub mod money;
pub mod payroll;
pub mod ports;
pub mod records;
