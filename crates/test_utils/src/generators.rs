//! Property-Based Test Generators
//!
//! Proptest strategies for answer models. Generated models go through
//! `AnswerModel::update`, so they satisfy the same invariants as real ones.

use chrono::NaiveDate;
use domain_claims::{AnswerModel, AnswerPatch, Channel, ClaimType, Courier};
use proptest::prelude::*;

/// Strategy for generating channels
pub fn channel_strategy() -> impl Strategy<Value = Channel> {
    prop_oneof![Just(Channel::Courier), Just(Channel::Postal)]
}

/// Strategy for generating claim types
pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![
        Just(ClaimType::Overpayment),
        Just(ClaimType::RejectedImport),
        Just(ClaimType::Withdrawal),
        Just(ClaimType::LowValue),
    ]
}

/// Strategy for generating claim types other than withdrawal
pub fn non_withdrawal_claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    claim_type_strategy().prop_filter("not a withdrawal", |t| *t != ClaimType::Withdrawal)
}

/// Strategy for generating couriers
pub fn courier_strategy() -> impl Strategy<Value = Courier> {
    prop_oneof![
        Just(Courier::Dhl),
        Just(Courier::FedEx),
        Just(Courier::Ups),
        Just(Courier::RoyalMail),
    ]
}

/// Strategy for generating identifier strings, including blank ones
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[0-9]{2}GB[A-Z0-9]{14}",
    ]
}

/// Strategy for generating import dates across 2023-2025
pub fn import_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..1096i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(days)
    })
}

/// Strategy for generating patches where every field may be absent
pub fn answer_patch_strategy() -> impl Strategy<Value = AnswerPatch> {
    (
        proptest::option::of(channel_strategy()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(claim_type_strategy()),
        proptest::option::of(identifier_strategy()),
        proptest::option::of(identifier_strategy()),
        proptest::option::of(courier_strategy()),
        proptest::option::of(identifier_strategy()),
        proptest::option::of(import_date_strategy()),
    )
        .prop_map(
            |(channel, vat, claim_type, mrn, eori, courier, charge_reference, import_date)| {
                let mut patch = AnswerPatch::new();
                if let Some(v) = channel {
                    patch = patch.channel(v);
                }
                if let Some(v) = vat {
                    patch = patch.vat_registered(v);
                }
                if let Some(v) = claim_type {
                    patch = patch.claim_type(v);
                }
                if let Some(v) = mrn {
                    patch = patch.mrn(v);
                }
                if let Some(v) = eori {
                    patch = patch.eori(v);
                }
                if let Some(v) = courier {
                    patch = patch.courier(v);
                }
                if let Some(v) = charge_reference {
                    patch = patch.charge_reference(v);
                }
                if let Some(v) = import_date {
                    patch = patch.import_date(v);
                }
                patch
            },
        )
}

/// Strategy for generating answer models, possibly incomplete
pub fn answer_model_strategy() -> impl Strategy<Value = AnswerModel> {
    proptest::collection::vec(answer_patch_strategy(), 1..4).prop_map(|patches| {
        let mut model = AnswerModel::new();
        for patch in patches {
            model.update(patch);
        }
        model
    })
}

/// Strategy for generating answer models with the three routing fields set
pub fn routable_answer_model_strategy() -> impl Strategy<Value = AnswerModel> {
    (answer_model_strategy(), channel_strategy(), any::<bool>(), claim_type_strategy()).prop_map(
        |(mut model, channel, vat, claim_type)| {
            model.update(
                AnswerPatch::new()
                    .channel(channel)
                    .vat_registered(vat)
                    .claim_type(claim_type),
            );
            model
        },
    )
}
