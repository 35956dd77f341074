//! Wizard session DTOs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::SessionId;
use domain_claims::{
    AnswerField, AnswerModel, AnswerPatch, BranchKind, Channel, ClaimRoute, ClaimType, Courier,
    EvidenceType, Patch, RouteResult, WizardController, WizardStep,
};

/// Longest identifier accepted for MRN, EORI, or charge reference
pub const MAX_IDENTIFIER_LEN: usize = 35;

/// Body of `PATCH /wizards/:id/answers`
///
/// Omitted keys are left unchanged and `null` clears the answer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct AnswerPatchRequest {
    pub channel: Patch<Channel>,
    pub vat_registered: Patch<bool>,
    pub claim_type: Patch<ClaimType>,
    #[validate(custom(function = "validate_identifier"))]
    pub mrn: Patch<String>,
    #[validate(custom(function = "validate_identifier"))]
    pub eori: Patch<String>,
    pub courier: Patch<Courier>,
    #[validate(custom(function = "validate_identifier"))]
    pub charge_reference: Patch<String>,
    pub import_date: Patch<NaiveDate>,
}

fn validate_identifier(value: &Patch<String>) -> Result<(), ValidationError> {
    match value.as_set() {
        Some(text) if text.trim().chars().count() > MAX_IDENTIFIER_LEN => {
            let mut err = ValidationError::new("length");
            err.message = Some(format!("must be at most {MAX_IDENTIFIER_LEN} characters").into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl From<AnswerPatchRequest> for AnswerPatch {
    fn from(req: AnswerPatchRequest) -> Self {
        AnswerPatch {
            channel: req.channel,
            vat_registered: req.vat_registered,
            claim_type: req.claim_type,
            mrn: trimmed(req.mrn),
            eori: trimmed(req.eori),
            courier: req.courier,
            charge_reference: trimmed(req.charge_reference),
            import_date: req.import_date,
        }
    }
}

fn trimmed(value: Patch<String>) -> Patch<String> {
    match value {
        Patch::Set(text) => Patch::Set(text.trim().to_string()),
        other => other,
    }
}

/// Body of `POST /wizards/:id/branch`
#[derive(Debug, Clone, Deserialize)]
pub struct OpenBranchRequest {
    pub kind: BranchKind,
}

/// One document the claimant has to provide
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceView {
    pub tag: &'static str,
    pub label: &'static str,
}

impl From<EvidenceType> for EvidenceView {
    fn from(evidence: EvidenceType) -> Self {
        Self {
            tag: evidence.tag(),
            label: evidence.label(),
        }
    }
}

/// A resolved route with its evidence list
#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    pub route: ClaimRoute,
    pub required_evidence: Vec<EvidenceView>,
}

impl From<&RouteResult> for RouteView {
    fn from(result: &RouteResult) -> Self {
        Self {
            route: result.route,
            required_evidence: result
                .required_evidence
                .iter()
                .copied()
                .map(EvidenceView::from)
                .collect(),
        }
    }
}

/// Snapshot of a wizard session returned by every wizard endpoint
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub session_id: String,
    pub current_step: WizardStep,
    pub step_index: usize,
    pub total_steps: usize,
    pub open_branch: Option<BranchKind>,
    pub step_completion: BTreeMap<WizardStep, bool>,
    pub missing: Vec<AnswerField>,
    pub answers: AnswerModel,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RouteView>,
}

impl WizardView {
    pub fn new(session_id: SessionId, wizard: &WizardController) -> Self {
        Self {
            session_id: session_id.to_string(),
            current_step: wizard.current_step(),
            step_index: wizard.current_step().index(),
            total_steps: WizardStep::ALL.len(),
            open_branch: wizard.open_branch(),
            step_completion: wizard.step_completion().clone(),
            missing: wizard.missing_for_current_step(),
            answers: wizard.answers().clone(),
            complete: wizard.is_complete(),
            outcome: wizard.outcome().map(RouteView::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlong_identifier_is_rejected() {
        let req: AnswerPatchRequest =
            serde_json::from_value(serde_json::json!({ "mrn": "X".repeat(40) })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_null_clears_and_passes_validation() {
        let req: AnswerPatchRequest =
            serde_json::from_value(serde_json::json!({ "eori": null, "channel": "postal" })).unwrap();
        assert!(req.validate().is_ok());

        let patch = AnswerPatch::from(req);
        assert_eq!(patch.eori, Patch::Clear);
        assert_eq!(patch.channel, Patch::Set(Channel::Postal));
        assert!(patch.mrn.is_keep());
    }

    #[test]
    fn test_identifiers_are_trimmed() {
        let req: AnswerPatchRequest =
            serde_json::from_value(serde_json::json!({ "charge_reference": "  RM-1  " })).unwrap();
        let patch = AnswerPatch::from(req);
        assert_eq!(patch.charge_reference, Patch::Set("RM-1".to_string()));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: Result<AnswerPatchRequest, _> =
            serde_json::from_value(serde_json::json!({ "postcode": "SW1A 1AA" }));
        assert!(result.is_err());
    }
}
