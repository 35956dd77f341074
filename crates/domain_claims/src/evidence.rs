//! Evidence types requested from the claimant for each route

use std::fmt;

use serde::{Deserialize, Serialize};

/// A document the claimant has to upload before the claim is filed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Seller's invoice or order confirmation
    Invoice,
    /// Royal Mail / Parcelforce fee card or receipt for the charge paid
    PostalChargeProof,
    /// Air waybill or other transport document
    TransportDocument,
    /// The courier's duty/VAT charge notice
    CourierChargeNotice,
    /// Import declaration (C88 / CDS declaration) for the consignment
    ImportDeclaration,
    /// Proof the goods were returned and the order withdrawn
    ProofOfReturn,
}

impl EvidenceType {
    /// Stable tag used by the export and upload collaborators
    pub fn tag(&self) -> &'static str {
        match self {
            EvidenceType::Invoice => "invoice",
            EvidenceType::PostalChargeProof => "postal_charge_proof",
            EvidenceType::TransportDocument => "transport_document",
            EvidenceType::CourierChargeNotice => "courier_charge_notice",
            EvidenceType::ImportDeclaration => "import_declaration",
            EvidenceType::ProofOfReturn => "proof_of_return",
        }
    }

    /// Prompt shown next to the upload control
    pub fn label(&self) -> &'static str {
        match self {
            EvidenceType::Invoice => "Invoice or order confirmation",
            EvidenceType::PostalChargeProof => "Proof of the postal charge you paid",
            EvidenceType::TransportDocument => "Transport document (air waybill or consignment note)",
            EvidenceType::CourierChargeNotice => "Courier's duty and VAT charge notice",
            EvidenceType::ImportDeclaration => "Import declaration for the shipment",
            EvidenceType::ProofOfReturn => "Proof the goods were returned to the seller",
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
