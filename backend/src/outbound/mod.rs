//! Driven adapters: the stores behind the repository ports.
//!
//! [`persistence`] is the PostgreSQL deployment target. [`memory`] keeps the
//! same constraint semantics in process for local runs and HTTP tests.

pub mod memory;
pub mod persistence;
