//! Acknowledgment records: what the site reported receiving.

use serde::{Deserialize, Serialize};

use super::inventory::{Drug, DrugGroup, ExcelRow};

/// Reconciliation outcome for one shipped item. The backend may grow new
/// statuses; anything unrecognized lands on `Unknown` and renders gray.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// Full quantity received
    Received,
    /// Some received, some missing or damaged
    Partial,
    /// Nothing arrived
    Missing,
    /// Arrived unusable
    Damaged,
    /// Not yet reconciled
    Pending,
    /// Unrecognized status string
    #[serde(other)]
    Unknown,
}

impl AckStatus {
    /// Wire/display form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AckStatus::Received => "received",
            AckStatus::Partial => "partial",
            AckStatus::Missing => "missing",
            AckStatus::Damaged => "damaged",
            AckStatus::Pending => "pending",
            AckStatus::Unknown => "unknown",
        }
    }
}

/// One acknowledgment entry on a shipment, with its item reference
/// expanded by the detail endpoint. Drug shipments populate `drug`,
/// group shipments populate `drug_group` and `drug` (one entry per
/// member drug), randomization shipments populate `excel_row`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Owning shipment id
    #[serde(default)]
    pub shipment: Option<String>,
    /// Shipped drug, expanded
    #[serde(default)]
    pub drug: Option<Drug>,
    /// Shipped group, expanded
    #[serde(default)]
    pub drug_group: Option<DrugGroup>,
    /// Shipped randomization row, expanded
    #[serde(default)]
    pub excel_row: Option<ExcelRow>,
    /// Quantity the shipment dispatched
    #[serde(default)]
    pub acknowledged_quantity: u32,
    /// Quantity the site reports received
    #[serde(default)]
    pub received_quantity: u32,
    /// Quantity the site reports missing
    #[serde(default)]
    pub missing_quantity: u32,
    /// Quantity the site reports damaged
    #[serde(default)]
    pub damaged_quantity: u32,
    /// Reconciliation status
    pub status: AckStatus,
}

/// One line of an acknowledgment submission, referencing the shipped
/// item by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeItem {
    /// Drug id, for drug and group shipments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug: Option<String>,
    /// Group id, for group shipments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drug_group: Option<String>,
    /// Row id, for randomization shipments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excel_row: Option<String>,
    /// Quantity received in good condition
    pub received_quantity: u32,
    /// Quantity that never arrived
    pub missing_quantity: u32,
    /// Quantity that arrived unusable
    pub damaged_quantity: u32,
    /// Status the site assigns this line
    pub status: AckStatus,
}

/// Body of the acknowledge endpoint. The receiving screen that builds
/// this lives outside this crate; the wrapper keeps the wire shape in
/// one place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgePayload {
    /// One line per shipped item
    pub acknowledgments: Vec<AcknowledgeItem>,
}
