//! Claim Routing Domain
//!
//! This crate decides which customs or tax route a duty/VAT refund claim
//! takes and drives the wizard that collects the answers for it.
//!
//! # Components
//!
//! ```text
//! AnswerPatch -> WizardController -> AnswerModel
//!                      │
//!                      ├── step completion (derived)
//!                      ├── branch screens (BOR286, VAT return)
//!                      └── RoutingResolver -> RouteResult -> ClaimRecord -> ClaimRecordPort
//! ```

pub mod answers;
pub mod routing;
pub mod evidence;
pub mod wizard;
pub mod record;
pub mod adapters;
pub mod error;

pub use answers::{AnswerField, AnswerModel, AnswerPatch, Channel, ClaimType, Courier, Patch};
pub use routing::{resolve_route, ClaimRoute, RouteResult, RoutingConfig, RoutingResolver};
pub use evidence::EvidenceType;
pub use wizard::{BranchKind, Transition, WizardController, WizardDraft, WizardStep};
pub use record::{ClaimRecord, ClaimRecordPort};
pub use error::{RoutingError, WizardError};
