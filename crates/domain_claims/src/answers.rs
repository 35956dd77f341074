//! Answer model for one in-progress claim
//!
//! Answers accumulate as the user moves through the wizard. The only way to
//! change them is [`AnswerModel::update`], which merges an [`AnswerPatch`]
//! and then drops whichever of `courier` / `charge_reference` does not apply
//! to the selected channel.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// How the package reached the claimant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Courier,
    Postal,
}

/// Carrier that handled a courier-channel import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Courier {
    #[serde(rename = "dhl")]
    Dhl,
    #[serde(rename = "fedex")]
    FedEx,
    #[serde(rename = "ups")]
    Ups,
    #[serde(rename = "royal_mail")]
    RoyalMail,
}

/// Why the claimant believes duty or VAT should be repaid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Charged more than was due
    Overpayment,
    /// Goods refused or rejected on import
    RejectedImport,
    /// Order withdrawn and refunded by the seller
    Withdrawal,
    /// Charges applied to a consignment under the low-value threshold
    LowValue,
}

/// Names of the answer fields, used when reporting what is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerField {
    Channel,
    VatRegistered,
    ClaimType,
    Mrn,
    Eori,
    Courier,
    ChargeReference,
    ImportDate,
}

impl AnswerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerField::Channel => "channel",
            AnswerField::VatRegistered => "vat_registered",
            AnswerField::ClaimType => "claim_type",
            AnswerField::Mrn => "mrn",
            AnswerField::Eori => "eori",
            AnswerField::Courier => "courier",
            AnswerField::ChargeReference => "charge_reference",
            AnswerField::ImportDate => "import_date",
        }
    }
}

impl fmt::Display for AnswerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field update inside an [`AnswerPatch`]
///
/// On the wire a missing key is `Keep`, `null` is `Clear`, and a value is
/// `Set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            _ => None,
        }
    }

    fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            _ => serializer.serialize_none(),
        }
    }
}

/// Partial update merged into an [`AnswerModel`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPatch {
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub channel: Patch<Channel>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub vat_registered: Patch<bool>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub claim_type: Patch<ClaimType>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub mrn: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub eori: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub courier: Patch<Courier>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub charge_reference: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub import_date: Patch<NaiveDate>,
}

impl AnswerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Patch::Set(channel);
        self
    }

    pub fn vat_registered(mut self, registered: bool) -> Self {
        self.vat_registered = Patch::Set(registered);
        self
    }

    pub fn claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = Patch::Set(claim_type);
        self
    }

    pub fn mrn(mut self, mrn: impl Into<String>) -> Self {
        self.mrn = Patch::Set(mrn.into());
        self
    }

    pub fn eori(mut self, eori: impl Into<String>) -> Self {
        self.eori = Patch::Set(eori.into());
        self
    }

    pub fn courier(mut self, courier: Courier) -> Self {
        self.courier = Patch::Set(courier);
        self
    }

    pub fn charge_reference(mut self, reference: impl Into<String>) -> Self {
        self.charge_reference = Patch::Set(reference.into());
        self
    }

    pub fn import_date(mut self, date: NaiveDate) -> Self {
        self.import_date = Patch::Set(date);
        self
    }

    /// Returns true if applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Accumulated answers for one claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerModel {
    channel: Option<Channel>,
    vat_registered: Option<bool>,
    claim_type: Option<ClaimType>,
    mrn: Option<String>,
    eori: Option<String>,
    courier: Option<Courier>,
    charge_reference: Option<String>,
    import_date: Option<NaiveDate>,
}

impl AnswerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model by applying a single patch to an empty one
    pub fn from_patch(patch: AnswerPatch) -> Self {
        let mut model = Self::new();
        model.update(patch);
        model
    }

    /// Merges `patch` into the model
    ///
    /// Never fails. A carrier on a postal claim, or a charge reference on a
    /// courier claim, is accepted and then dropped.
    pub fn update(&mut self, patch: AnswerPatch) {
        let courier_written = patch.courier.is_set();
        let charge_written = patch.charge_reference.is_set();

        patch.channel.apply_to(&mut self.channel);
        patch.vat_registered.apply_to(&mut self.vat_registered);
        patch.claim_type.apply_to(&mut self.claim_type);
        patch.mrn.apply_to(&mut self.mrn);
        patch.eori.apply_to(&mut self.eori);
        patch.courier.apply_to(&mut self.courier);
        patch.charge_reference.apply_to(&mut self.charge_reference);
        patch.import_date.apply_to(&mut self.import_date);

        self.normalize(courier_written, charge_written);
    }

    /// Enforces that at most one of `courier` / `charge_reference` is held
    ///
    /// With a channel selected the channel decides. Without one the field
    /// written most recently survives; a patch writing both keeps the courier.
    pub(crate) fn normalize(&mut self, courier_written: bool, charge_written: bool) {
        match self.channel {
            Some(Channel::Postal) => self.courier = None,
            Some(Channel::Courier) => self.charge_reference = None,
            None => {
                if self.courier.is_some() && self.charge_reference.is_some() {
                    if charge_written && !courier_written {
                        self.courier = None;
                    } else {
                        self.charge_reference = None;
                    }
                }
            }
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub fn vat_registered(&self) -> Option<bool> {
        self.vat_registered
    }

    pub fn claim_type(&self) -> Option<ClaimType> {
        self.claim_type
    }

    pub fn mrn(&self) -> Option<&str> {
        self.mrn.as_deref()
    }

    pub fn eori(&self) -> Option<&str> {
        self.eori.as_deref()
    }

    pub fn import_date(&self) -> Option<NaiveDate> {
        self.import_date
    }

    /// Carrier, only when the claim is on the courier channel
    pub fn courier(&self) -> Option<Courier> {
        match self.channel {
            Some(Channel::Courier) => self.courier,
            _ => None,
        }
    }

    /// Postal charge reference, only when the claim is on the postal channel
    pub fn charge_reference(&self) -> Option<&str> {
        match self.channel {
            Some(Channel::Postal) => self.charge_reference.as_deref(),
            _ => None,
        }
    }

    /// True if the field holds a usable value (strings must be non-blank)
    pub fn is_answered(&self, field: AnswerField) -> bool {
        match field {
            AnswerField::Channel => self.channel.is_some(),
            AnswerField::VatRegistered => self.vat_registered.is_some(),
            AnswerField::ClaimType => self.claim_type.is_some(),
            AnswerField::Mrn => has_text(self.mrn()),
            AnswerField::Eori => has_text(self.eori()),
            AnswerField::Courier => self.courier().is_some(),
            AnswerField::ChargeReference => has_text(self.charge_reference()),
            AnswerField::ImportDate => self.import_date.is_some(),
        }
    }

    /// True if the field holds a usable stored value, even one the selected
    /// channel hides
    ///
    /// Differs from [`is_answered`](Self::is_answered) only while no channel
    /// is chosen, when a carrier or charge reference may be held ahead of it.
    pub fn is_recorded(&self, field: AnswerField) -> bool {
        match field {
            AnswerField::Courier => self.courier.is_some(),
            AnswerField::ChargeReference => has_text(self.charge_reference.as_deref()),
            other => self.is_answered(other),
        }
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_merges_only_present_fields() {
        let mut answers = AnswerModel::from_patch(AnswerPatch::new().channel(Channel::Courier));
        answers.update(AnswerPatch::new().vat_registered(false));

        assert_eq!(answers.channel(), Some(Channel::Courier));
        assert_eq!(answers.vat_registered(), Some(false));
        assert_eq!(answers.claim_type(), None);
    }

    #[test]
    fn test_clear_unsets_field() {
        let mut answers = AnswerModel::from_patch(AnswerPatch::new().mrn("24GB12345678901234"));
        answers.update(AnswerPatch {
            mrn: Patch::Clear,
            ..AnswerPatch::default()
        });
        assert_eq!(answers.mrn(), None);
    }

    #[test]
    fn test_courier_on_postal_claim_is_dropped() {
        let mut answers = AnswerModel::from_patch(AnswerPatch::new().channel(Channel::Postal));
        answers.update(AnswerPatch::new().courier(Courier::Dhl));
        assert_eq!(answers.courier(), None);
        assert!(!answers.is_answered(AnswerField::Courier));
    }

    #[test]
    fn test_switching_channel_drops_inapplicable_field() {
        let mut answers = AnswerModel::from_patch(
            AnswerPatch::new().channel(Channel::Courier).courier(Courier::Ups),
        );
        answers.update(AnswerPatch::new().channel(Channel::Postal).charge_reference("PF-991"));

        assert_eq!(answers.courier(), None);
        assert_eq!(answers.charge_reference(), Some("PF-991"));

        // Switching back does not resurrect the carrier
        answers.update(AnswerPatch::new().channel(Channel::Courier));
        assert_eq!(answers.courier(), None);
        assert_eq!(answers.charge_reference(), None);
    }

    #[test]
    fn test_without_channel_latest_write_wins() {
        let mut answers = AnswerModel::from_patch(AnswerPatch::new().courier(Courier::FedEx));
        answers.update(AnswerPatch::new().charge_reference("PF-1"));
        assert_eq!(answers.courier, None);
        assert_eq!(answers.charge_reference.as_deref(), Some("PF-1"));
    }

    #[test]
    fn test_charge_reference_recorded_before_channel() {
        let answers = AnswerModel::from_patch(AnswerPatch::new().charge_reference("PF-991"));
        assert!(!answers.is_answered(AnswerField::ChargeReference));
        assert!(answers.is_recorded(AnswerField::ChargeReference));

        let courier = AnswerModel::from_patch(
            AnswerPatch::new().channel(Channel::Courier).charge_reference("PF-991"),
        );
        assert!(!courier.is_recorded(AnswerField::ChargeReference));
    }

    #[test]
    fn test_blank_strings_are_not_answers() {
        let answers = AnswerModel::from_patch(
            AnswerPatch::new().channel(Channel::Postal).charge_reference("   "),
        );
        assert!(!answers.is_answered(AnswerField::ChargeReference));
    }

    #[test]
    fn test_patch_wire_format() {
        let patch: AnswerPatch =
            serde_json::from_str(r#"{"channel":"postal","mrn":null}"#).unwrap();
        assert_eq!(patch.channel, Patch::Set(Channel::Postal));
        assert_eq!(patch.mrn, Patch::Clear);
        assert!(patch.eori.is_keep());
    }
}
