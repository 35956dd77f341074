//! Adapters for the claim record port
//!
//! # Available Adapters
//!
//! - **InMemoryClaimStore**: keeps records in process memory; used by the
//!   development server and tests
//!
//! ```rust,ignore
//! use domain_claims::adapters::InMemoryClaimStore;
//! use domain_claims::ClaimRecordPort;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn ClaimRecordPort> = Arc::new(InMemoryClaimStore::new());
//! ```

pub mod in_memory;

pub use in_memory::InMemoryClaimStore;
