//! Pre-built Test Fixtures
//!
//! Answer sets covering each claim route. Every fixture is a patch, so tests
//! can feed it to a wizard or build an `AnswerModel` from it directly.

use chrono::NaiveDate;
use domain_claims::{AnswerModel, AnswerPatch, Channel, ClaimType, Courier};

/// Fixture for identifier strings
pub struct IdentifierFixtures;

impl IdentifierFixtures {
    /// A well-formed movement reference number
    pub fn mrn() -> &'static str {
        "24GB1A2B3C4D5E6F70"
    }

    /// A well-formed GB EORI
    pub fn eori() -> &'static str {
        "GB123456789000"
    }

    /// A Royal Mail fee card reference
    pub fn charge_reference() -> &'static str {
        "RM-FEE-55012"
    }
}

/// Fixture for dates around the CDS cutover
pub struct DateFixtures;

impl DateFixtures {
    pub fn cds_cutover() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    pub fn before_cutover() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    pub fn after_cutover() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }
}

/// Fixture for answer sets
pub struct AnswerFixtures;

impl AnswerFixtures {
    /// Postal, not VAT registered, overpayment: routes to BOR286
    pub fn postal_overpayment() -> AnswerPatch {
        AnswerPatch::new()
            .channel(Channel::Postal)
            .vat_registered(false)
            .claim_type(ClaimType::Overpayment)
    }

    /// Courier, VAT registered, overpayment: routes to VAT_RETURN
    pub fn courier_vat_registered() -> AnswerPatch {
        AnswerPatch::new()
            .channel(Channel::Courier)
            .vat_registered(true)
            .claim_type(ClaimType::Overpayment)
    }

    /// Courier, private individual, low value: routes to CE1179
    pub fn courier_low_value() -> AnswerPatch {
        AnswerPatch::new()
            .channel(Channel::Courier)
            .vat_registered(false)
            .claim_type(ClaimType::LowValue)
    }

    /// Courier, private individual, overpayment: routes to C285
    pub fn courier_overpayment() -> AnswerPatch {
        AnswerPatch::new()
            .channel(Channel::Courier)
            .vat_registered(false)
            .claim_type(ClaimType::Overpayment)
    }

    /// Withdrawal on a postal, VAT-registered claim: routes to SELLER_REFUND
    pub fn postal_withdrawal_vat_registered() -> AnswerPatch {
        AnswerPatch::new()
            .claim_type(ClaimType::Withdrawal)
            .channel(Channel::Postal)
            .vat_registered(true)
    }

    /// Every field a courier journey collects, for walking the full wizard
    pub fn complete_courier_journey() -> AnswerPatch {
        Self::courier_overpayment()
            .courier(Courier::Dhl)
            .mrn(IdentifierFixtures::mrn())
            .import_date(DateFixtures::before_cutover())
    }

    /// Every field a postal journey collects, for walking the full wizard
    pub fn complete_postal_journey() -> AnswerPatch {
        Self::postal_overpayment().charge_reference(IdentifierFixtures::charge_reference())
    }

    pub fn model(patch: AnswerPatch) -> AnswerModel {
        AnswerModel::from_patch(patch)
    }
}
