//! Pure attendance and payroll arithmetic. Nothing in here touches a store.

pub mod payroll;
pub mod status;
pub mod time;
