//! Core Kernel - Foundational types shared by the claim routing crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for wizard sessions and claims
//! - Port error and marker types for collaborator adapters

pub mod identifiers;
pub mod ports;

pub use identifiers::{ClaimId, SessionId};
pub use ports::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
