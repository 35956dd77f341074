//! Claim Routing
//!
//! Maps a set of answers to the regulatory route the claim must take and
//! the evidence that route needs.
//!
//! # Precedence
//!
//! Rules are evaluated in order and the first match wins:
//!
//! ```text
//! 1. withdrawal claim        -> SELLER_REFUND
//! 2. postal channel          -> BOR286
//! 3. VAT registered          -> VAT_RETURN
//! 4. courier + low value     -> CE1179
//! 5. courier                 -> C285 (CDS on or after the configured cutover)
//! 6. nothing matched         -> UnroutableAnswers
//! ```
//!
//! New routes are inserted at their precedence position in
//! [`standard_rules`], never appended blindly.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_claims::answers::{AnswerModel, AnswerPatch, Channel, ClaimType};
//! use domain_claims::routing::{resolve_route, ClaimRoute};
//!
//! let answers = AnswerModel::from_patch(
//!     AnswerPatch::new()
//!         .channel(Channel::Postal)
//!         .vat_registered(false)
//!         .claim_type(ClaimType::Overpayment),
//! );
//! assert_eq!(resolve_route(&answers)?.route, ClaimRoute::Bor286);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::answers::{AnswerField, AnswerModel, Channel, ClaimType};
use crate::error::RoutingError;
use crate::evidence::EvidenceType;

/// Regulatory route (form or reclaim mechanism) for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimRoute {
    /// Repayment claim through the Customs Declaration Service
    #[serde(rename = "CDS")]
    Cds,
    /// Legacy repayment form for courier imports
    #[serde(rename = "C285")]
    C285,
    /// Postal-channel repayment form
    #[serde(rename = "BOR286")]
    Bor286,
    /// Low-value consignment relief
    #[serde(rename = "CE1179")]
    Ce1179,
    /// Reclaimed as input VAT on the claimant's VAT return
    #[serde(rename = "VAT_RETURN")]
    VatReturn,
    /// Refund handled by the retailer, not the customs authority
    #[serde(rename = "SELLER_REFUND")]
    SellerRefund,
}

impl ClaimRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimRoute::Cds => "CDS",
            ClaimRoute::C285 => "C285",
            ClaimRoute::Bor286 => "BOR286",
            ClaimRoute::Ce1179 => "CE1179",
            ClaimRoute::VatReturn => "VAT_RETURN",
            ClaimRoute::SellerRefund => "SELLER_REFUND",
        }
    }

    /// Evidence the claimant must supply for this route
    pub fn required_evidence(&self) -> BTreeSet<EvidenceType> {
        use EvidenceType::*;
        let evidence: &[EvidenceType] = match self {
            ClaimRoute::SellerRefund => &[Invoice, ProofOfReturn],
            ClaimRoute::Bor286 => &[Invoice, PostalChargeProof],
            ClaimRoute::VatReturn => &[Invoice, TransportDocument],
            ClaimRoute::Ce1179 => &[Invoice, CourierChargeNotice],
            ClaimRoute::C285 | ClaimRoute::Cds => {
                &[Invoice, ImportDeclaration, CourierChargeNotice]
            }
        };
        evidence.iter().copied().collect()
    }

    /// True for routes filed with the customs authority
    pub fn is_customs_claim(&self) -> bool {
        !matches!(self, ClaimRoute::SellerRefund | ClaimRoute::VatReturn)
    }
}

impl fmt::Display for ClaimRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of routing a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub route: ClaimRoute,
    pub required_evidence: BTreeSet<EvidenceType>,
}

impl RouteResult {
    pub fn new(route: ClaimRoute) -> Self {
        Self {
            route,
            required_evidence: route.required_evidence(),
        }
    }
}

/// A test against the answers
///
/// Evaluation returns `Err(field)` when the answer needed to decide is unset,
/// so the resolver can report exactly what is missing instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    ClaimTypeIs(ClaimType),
    ChannelIs(Channel),
    VatRegistered,
    /// All conditions hold; stops at the first one that is false
    All(Vec<Condition>),
}

impl Condition {
    pub fn evaluate(&self, answers: &AnswerModel) -> Result<bool, AnswerField> {
        match self {
            Condition::ClaimTypeIs(expected) => answers
                .claim_type()
                .map(|actual| actual == *expected)
                .ok_or(AnswerField::ClaimType),
            Condition::ChannelIs(expected) => answers
                .channel()
                .map(|actual| actual == *expected)
                .ok_or(AnswerField::Channel),
            Condition::VatRegistered => answers.vat_registered().ok_or(AnswerField::VatRegistered),
            Condition::All(conditions) => {
                for condition in conditions {
                    if !condition.evaluate(answers)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// One row of the precedence table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub name: &'static str,
    pub when: Condition,
    pub route: ClaimRoute,
}

impl RouteRule {
    pub fn new(name: &'static str, when: Condition, route: ClaimRoute) -> Self {
        Self { name, when, route }
    }
}

/// The production precedence table, highest priority first
pub fn standard_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new(
            "withdrawal",
            Condition::ClaimTypeIs(ClaimType::Withdrawal),
            ClaimRoute::SellerRefund,
        ),
        RouteRule::new(
            "postal_channel",
            Condition::ChannelIs(Channel::Postal),
            ClaimRoute::Bor286,
        ),
        RouteRule::new("vat_registered", Condition::VatRegistered, ClaimRoute::VatReturn),
        RouteRule::new(
            "courier_low_value",
            Condition::All(vec![
                Condition::ChannelIs(Channel::Courier),
                Condition::ClaimTypeIs(ClaimType::LowValue),
            ]),
            ClaimRoute::Ce1179,
        ),
        RouteRule::new(
            "courier",
            Condition::ChannelIs(Channel::Courier),
            ClaimRoute::C285,
        ),
    ]
}

/// External configuration the resolver reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// First import date filed through CDS instead of C285.
    /// `None` keeps every courier claim on C285.
    pub cds_cutover: Option<NaiveDate>,
}

impl RoutingConfig {
    pub fn with_cds_cutover(cutover: NaiveDate) -> Self {
        Self {
            cds_cutover: Some(cutover),
        }
    }

    /// Whether a courier claim imported on `import_date` goes through CDS
    ///
    /// An unknown import date stays on C285.
    pub fn uses_cds(&self, import_date: Option<NaiveDate>) -> bool {
        match (self.cds_cutover, import_date) {
            (Some(cutover), Some(date)) => date >= cutover,
            _ => false,
        }
    }
}

/// Evaluates the precedence table against answers
#[derive(Debug, Clone)]
pub struct RoutingResolver {
    rules: Vec<RouteRule>,
    config: RoutingConfig,
}

impl Default for RoutingResolver {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl RoutingResolver {
    /// Creates a resolver over the standard precedence table
    pub fn new(config: RoutingConfig) -> Self {
        Self::with_rules(standard_rules(), config)
    }

    /// Creates a resolver over a custom table
    pub fn with_rules(rules: Vec<RouteRule>, config: RoutingConfig) -> Self {
        Self { rules, config }
    }

    /// Resolves the route for `answers`
    ///
    /// # Returns
    ///
    /// The route of the first matching rule, or
    /// - `IncompleteAnswers` if a rule needs an unanswered field before any
    ///   rule matched
    /// - `UnroutableAnswers` if every rule was decided and none matched
    pub fn resolve(&self, answers: &AnswerModel) -> Result<RouteResult, RoutingError> {
        for rule in &self.rules {
            let matched = rule
                .when
                .evaluate(answers)
                .map_err(|field| RoutingError::IncompleteAnswers { field })?;

            if matched {
                let route = self.apply_cutover(rule.route, answers);
                debug!(rule = rule.name, route = %route, "claim routed");
                return Ok(RouteResult::new(route));
            }
        }

        warn!(?answers, "no routing rule matched");
        Err(RoutingError::UnroutableAnswers)
    }

    fn apply_cutover(&self, route: ClaimRoute, answers: &AnswerModel) -> ClaimRoute {
        match route {
            ClaimRoute::C285 if self.config.uses_cds(answers.import_date()) => ClaimRoute::Cds,
            other => other,
        }
    }
}

/// Resolves with the standard table and no CDS cutover
pub fn resolve_route(answers: &AnswerModel) -> Result<RouteResult, RoutingError> {
    RoutingResolver::default().resolve(answers)
}
