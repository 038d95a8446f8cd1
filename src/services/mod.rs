//! Operations behind the HTTP handlers: role checks, validation, store
//! calls and the pure calculations from `calc`.

pub mod attendance;
pub mod employee;
pub mod leave;
pub mod payroll;
pub mod timecard;
