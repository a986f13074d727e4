//! softkey Bridge library target.
//!
//! Exposes the driver's logic for integration tests. The binary entry point
//! is in `main.rs`.

pub mod script;
pub mod session;
pub mod settings;
