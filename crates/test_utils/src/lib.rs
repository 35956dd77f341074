//! Test Utilities Crate
//!
//! Shared test infrastructure for the claim routing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Ready-made answer sets for each route
//! - `builders`: Builder that drives a wizard to a chosen state
//! - `assertions`: Assertion helpers for routes and wizard signals
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
