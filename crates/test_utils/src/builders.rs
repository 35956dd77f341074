//! Test Data Builders
//!
//! Drives a real `WizardController` through its public operations so tests
//! start from a reachable state instead of poking private fields.

use domain_claims::{
    AnswerPatch, RoutingConfig, RoutingResolver, WizardController, WizardStep,
};

/// Builder for a wizard positioned at a given step
pub struct WizardBuilder {
    config: RoutingConfig,
    patches: Vec<AnswerPatch>,
    target_step: WizardStep,
    keep_branch_open: bool,
}

impl Default for WizardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardBuilder {
    /// Creates a builder for a fresh wizard on step 1
    pub fn new() -> Self {
        Self {
            config: RoutingConfig::default(),
            patches: Vec::new(),
            target_step: WizardStep::FIRST,
            keep_branch_open: false,
        }
    }

    /// Sets the routing configuration
    pub fn with_config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    /// Queues answers to apply before navigating
    pub fn with_answers(mut self, patch: AnswerPatch) -> Self {
        self.patches.push(patch);
        self
    }

    /// Sets the step to advance to
    pub fn at_step(mut self, step: WizardStep) -> Self {
        self.target_step = step;
        self
    }

    /// Leaves any answer-triggered branch open
    pub fn keep_branch_open(mut self) -> Self {
        self.keep_branch_open = true;
        self
    }

    /// Builds the wizard
    ///
    /// # Panics
    ///
    /// Panics if the queued answers do not allow reaching the target step
    pub fn build(self) -> WizardController {
        let mut wizard = WizardController::new(RoutingResolver::new(self.config));

        for patch in self.patches {
            wizard.update_answers(patch).expect("answers rejected");
        }

        if !self.keep_branch_open {
            wizard.close_branch().expect("branch could not close");
        }

        while wizard.current_step() < self.target_step {
            wizard.advance().expect("could not reach target step");
        }

        wizard
    }
}
