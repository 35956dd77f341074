//! Claim routing domain errors
//!
//! Every variant here is a recoverable signal for the presentation layer.

use thiserror::Error;

use crate::answers::AnswerField;
use crate::wizard::{BranchKind, WizardStep};

/// Errors produced by the routing resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// A field the decision depends on has not been answered yet
    #[error("Incomplete answers: {field} is required to choose a claim route")]
    IncompleteAnswers { field: AnswerField },

    /// No precedence rule matched the answers
    #[error("No claim route matches the given answers; contact support")]
    UnroutableAnswers,
}

/// Errors produced by the wizard controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The current step is not complete
    #[error("Cannot advance past step {step}: missing {}", join_fields(.missing))]
    CannotAdvance {
        step: WizardStep,
        missing: Vec<AnswerField>,
    },

    /// The open branch screen still needs its field
    #[error("Branch {branch} cannot close until {field} is provided")]
    BranchIncomplete {
        branch: BranchKind,
        field: AnswerField,
    },

    /// The terminal step could not produce a route
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The wizard already produced a route and accepts no further changes
    #[error("Wizard is already complete")]
    WizardCompleted,
}

impl WizardError {
    /// Returns true when the user cannot fix this by changing answers
    /// and should be pointed at support instead
    pub fn needs_support(&self) -> bool {
        matches!(self, WizardError::Routing(RoutingError::UnroutableAnswers))
    }
}

fn join_fields(fields: &[AnswerField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
