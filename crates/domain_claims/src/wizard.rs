//! Claim wizard controller
//!
//! Owns the answers for one in-progress claim and sequences the user through
//! the wizard steps. Branch screens are a modal layer on top of the current
//! step; at most one is open at a time.
//!
//! # Steps
//!
//! ```text
//! Channel -> Carrier -> VatStatus -> ClaimType -> Declaration -> Review -> (complete)
//! ```
//!
//! Step completion is derived from the answers after every mutation and is
//! never set directly.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answers::{AnswerField, AnswerModel, AnswerPatch, Channel, ClaimType};
use crate::error::{RoutingError, WizardError};
use crate::record::ClaimRecord;
use crate::routing::{RouteResult, RoutingResolver};

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Channel,
    Carrier,
    VatStatus,
    ClaimType,
    Declaration,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Channel,
        WizardStep::Carrier,
        WizardStep::VatStatus,
        WizardStep::ClaimType,
        WizardStep::Declaration,
        WizardStep::Review,
    ];

    pub const FIRST: WizardStep = WizardStep::Channel;
    pub const LAST: WizardStep = WizardStep::Review;

    /// 1-based position of the step
    pub fn index(self) -> usize {
        self as usize + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Channel => "channel",
            WizardStep::Carrier => "carrier",
            WizardStep::VatStatus => "vat_status",
            WizardStep::ClaimType => "claim_type",
            WizardStep::Declaration => "declaration",
            WizardStep::Review => "review",
        }
    }

    /// Fields that must be answered before the step counts as complete
    ///
    /// `Review` is complete when the resolver produces a route; this only
    /// reports the field the resolver is waiting on.
    pub fn missing_fields(self, answers: &AnswerModel, resolver: &RoutingResolver) -> Vec<AnswerField> {
        let mut missing = Vec::new();
        let mut require = |field: AnswerField| {
            if !answers.is_answered(field) {
                missing.push(field);
            }
        };

        match self {
            WizardStep::Channel => require(AnswerField::Channel),
            WizardStep::Carrier => match answers.channel() {
                Some(Channel::Courier) => require(AnswerField::Courier),
                Some(Channel::Postal) => require(AnswerField::ChargeReference),
                None => require(AnswerField::Channel),
            },
            WizardStep::VatStatus => require(AnswerField::VatRegistered),
            WizardStep::ClaimType => require(AnswerField::ClaimType),
            WizardStep::Declaration => {
                let needs_mrn = answers.channel() != Some(Channel::Postal)
                    && answers.claim_type() != Some(ClaimType::Withdrawal);
                if needs_mrn {
                    require(AnswerField::Mrn);
                }
                if answers.vat_registered() == Some(true) {
                    require(AnswerField::Eori);
                }
            }
            WizardStep::Review => {
                if let Err(RoutingError::IncompleteAnswers { field }) = resolver.resolve(answers) {
                    require(field);
                }
            }
        }

        missing
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.as_str())
    }
}

/// Modal side screens layered over the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    /// Explains the postal form and collects the charge reference
    Bor286,
    /// Explains reclaiming through the VAT return
    VatReturn,
}

impl BranchKind {
    /// Field the branch collects before it may close
    pub fn required_field(self) -> Option<AnswerField> {
        match self {
            BranchKind::Bor286 => Some(AnswerField::ChargeReference),
            BranchKind::VatReturn => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Bor286 => "bor286",
            BranchKind::VatReturn => "vat_return",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to the given step
    Moved(WizardStep),
    /// The terminal step was passed and the claim was routed
    Completed(RouteResult),
}

/// Serializable wizard state for draft persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardDraft {
    pub answers: AnswerModel,
    pub current_step: WizardStep,
    pub open_branch: Option<BranchKind>,
    #[serde(default)]
    pub outcome: Option<RouteResult>,
    pub saved_at: DateTime<Utc>,
}

/// State machine driving one claim through the wizard
#[derive(Debug, Clone)]
pub struct WizardController {
    answers: AnswerModel,
    current_step: WizardStep,
    open_branch: Option<BranchKind>,
    step_completion: BTreeMap<WizardStep, bool>,
    outcome: Option<RouteResult>,
    resolver: RoutingResolver,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new(RoutingResolver::default())
    }
}

impl WizardController {
    /// Starts a wizard at step 1 with no answers and no branch open
    pub fn new(resolver: RoutingResolver) -> Self {
        let mut controller = Self {
            answers: AnswerModel::new(),
            current_step: WizardStep::FIRST,
            open_branch: None,
            step_completion: BTreeMap::new(),
            outcome: None,
            resolver,
        };
        controller.recompute_completion();
        controller
    }

    /// Rebuilds a wizard from a saved draft
    pub fn restore(draft: WizardDraft, resolver: RoutingResolver) -> Self {
        let mut answers = draft.answers;
        answers.normalize(false, false);

        let mut controller = Self {
            answers,
            current_step: draft.current_step,
            open_branch: draft.open_branch,
            step_completion: BTreeMap::new(),
            outcome: draft.outcome,
            resolver,
        };
        controller.recompute_completion();
        controller
    }

    pub fn snapshot(&self) -> WizardDraft {
        WizardDraft {
            answers: self.answers.clone(),
            current_step: self.current_step,
            open_branch: self.open_branch,
            outcome: self.outcome.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn answers(&self) -> &AnswerModel {
        &self.answers
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn open_branch(&self) -> Option<BranchKind> {
        self.open_branch
    }

    pub fn step_completion(&self) -> &BTreeMap<WizardStep, bool> {
        &self.step_completion
    }

    pub fn is_step_complete(&self, step: WizardStep) -> bool {
        self.step_completion.get(&step).copied().unwrap_or(false)
    }

    /// Route produced when the wizard completed
    pub fn outcome(&self) -> Option<&RouteResult> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn resolver(&self) -> &RoutingResolver {
        &self.resolver
    }

    /// Fields still needed to finish the current step
    pub fn missing_for_current_step(&self) -> Vec<AnswerField> {
        self.current_step.missing_fields(&self.answers, &self.resolver)
    }

    /// Merges `patch` into the answers and re-derives step completion
    ///
    /// Switching the channel to postal opens the BOR286 branch and answering
    /// "VAT registered" opens the VAT return branch, unless a branch is
    /// already open.
    ///
    /// # Returns
    ///
    /// The branch opened by this update, if any
    pub fn update_answers(&mut self, patch: AnswerPatch) -> Result<Option<BranchKind>, WizardError> {
        self.ensure_in_progress()?;

        let before = (self.answers.channel(), self.answers.vat_registered());
        self.answers.update(patch);
        self.recompute_completion();

        let triggered = match (before, (self.answers.channel(), self.answers.vat_registered())) {
            ((prev, _), (Some(Channel::Postal), _)) if prev != Some(Channel::Postal) => {
                Some(BranchKind::Bor286)
            }
            ((_, prev), (_, Some(true))) if prev != Some(true) => Some(BranchKind::VatReturn),
            _ => None,
        };

        let opened = match (self.open_branch, triggered) {
            (None, Some(kind)) => {
                self.open_branch = Some(kind);
                debug!(branch = %kind, "branch opened by answer");
                Some(kind)
            }
            _ => None,
        };

        Ok(opened)
    }

    /// Moves to the next step, or routes the claim from the terminal step
    pub fn advance(&mut self) -> Result<Transition, WizardError> {
        self.ensure_in_progress()?;

        if self.current_step == WizardStep::LAST {
            // Answers may have been cleared after the earlier steps were passed
            if let Some(step) = self.first_incomplete_step() {
                let missing = step.missing_fields(&self.answers, &self.resolver);
                debug!(step = %step, ?missing, "completion rejected");
                return Err(WizardError::CannotAdvance { step, missing });
            }

            let result = self.resolver.resolve(&self.answers)?;
            debug!(route = %result.route, "wizard completed");
            self.outcome = Some(result.clone());
            return Ok(Transition::Completed(result));
        }

        if !self.is_step_complete(self.current_step) {
            let missing = self.missing_for_current_step();
            debug!(step = %self.current_step, ?missing, "advance rejected");
            return Err(WizardError::CannotAdvance {
                step: self.current_step,
                missing,
            });
        }

        // LAST was handled above, so there is always a next step here
        if let Some(next) = self.current_step.next() {
            self.current_step = next;
        }
        debug!(step = %self.current_step, "advanced");
        Ok(Transition::Moved(self.current_step))
    }

    /// Moves back one step; a no-op on the first step. Answers are kept.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_in_progress()?;

        if let Some(previous) = self.current_step.previous() {
            self.current_step = previous;
            debug!(step = %self.current_step, "retreated");
        }
        Ok(self.current_step)
    }

    /// Opens a branch screen, replacing any open one. The step is unchanged.
    pub fn open_branch_screen(&mut self, kind: BranchKind) -> Result<(), WizardError> {
        self.ensure_in_progress()?;
        self.open_branch = Some(kind);
        debug!(branch = %kind, "branch opened");
        Ok(())
    }

    /// Closes the open branch screen once its field is answered
    ///
    /// # Returns
    ///
    /// The branch that was closed, or `None` if nothing was open
    pub fn close_branch(&mut self) -> Result<Option<BranchKind>, WizardError> {
        self.ensure_in_progress()?;

        let Some(branch) = self.open_branch else {
            return Ok(None);
        };

        if let Some(field) = branch.required_field() {
            if !self.answers.is_recorded(field) {
                return Err(WizardError::BranchIncomplete { branch, field });
            }
        }

        self.open_branch = None;
        debug!(branch = %branch, "branch closed");
        Ok(Some(branch))
    }

    /// Routes the current answers without changing wizard state
    pub fn preview_route(&self) -> Result<RouteResult, RoutingError> {
        self.resolver.resolve(&self.answers)
    }

    /// Claim record for the persistence collaborator, once complete
    pub fn completed_claim(&self) -> Option<ClaimRecord> {
        self.outcome
            .as_ref()
            .map(|route| ClaimRecord::new(self.answers.clone(), route.clone()))
    }

    /// First step before Review whose answers are incomplete
    fn first_incomplete_step(&self) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .filter(|step| *step != WizardStep::LAST)
            .find(|step| !self.is_step_complete(*step))
    }

    fn ensure_in_progress(&self) -> Result<(), WizardError> {
        if self.is_complete() {
            return Err(WizardError::WizardCompleted);
        }
        Ok(())
    }

    fn recompute_completion(&mut self) {
        self.step_completion = WizardStep::ALL
            .iter()
            .map(|step| {
                let complete = match step {
                    WizardStep::Review => self.resolver.resolve(&self.answers).is_ok(),
                    other => other.missing_fields(&self.answers, &self.resolver).is_empty(),
                };
                (*step, complete)
            })
            .collect();
    }
}
