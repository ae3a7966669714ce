//! Shipment records and the create/update wire payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::acknowledgment::Acknowledgment;

/// Item category of a shipment. Closed set; the wire carries the
/// variant name verbatim.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectType {
    /// Individual drugs, each with a quantity
    Drug,
    /// Drug groups; quantities apply to every member drug
    DrugGroup,
    /// Randomization rows; no quantities
    Randomization,
}

impl SelectType {
    /// All variants, in dropdown order.
    pub const ALL: [SelectType; 3] = [
        SelectType::Drug,
        SelectType::DrugGroup,
        SelectType::Randomization,
    ];

    /// Wire form of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectType::Drug => "Drug",
            SelectType::DrugGroup => "DrugGroup",
            SelectType::Randomization => "Randomization",
        }
    }

    /// Human-readable label for table cells and dropdowns.
    pub fn label(&self) -> &'static str {
        match self {
            SelectType::Drug => "Drug",
            SelectType::DrugGroup => "Drug Group",
            SelectType::Randomization => "Randomization",
        }
    }

    /// Singular noun for messages ("drug", "drug group", ...).
    pub fn item_noun(&self) -> &'static str {
        match self {
            SelectType::Drug => "drug",
            SelectType::DrugGroup => "drug group",
            SelectType::Randomization => "randomization row",
        }
    }

    /// Parse the wire form.
    pub fn parse(s: &str) -> Option<SelectType> {
        match s {
            "Drug" => Some(SelectType::Drug),
            "DrugGroup" => Some(SelectType::DrugGroup),
            "Randomization" => Some(SelectType::Randomization),
            _ => None,
        }
    }

    /// Whether items of this category carry per-item quantities.
    pub fn uses_quantities(&self) -> bool {
        !matches!(self, SelectType::Randomization)
    }
}

impl std::fmt::Display for SelectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shipment as the backend returns it. The detail endpoint expands
/// `acknowledgments`; the list endpoint leaves it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Server-generated shipment number, read-only
    #[serde(default)]
    pub shipment_number: Option<String>,
    /// Dispatch date (backend-formatted string)
    #[serde(default)]
    pub shipment_date: String,
    /// Owning study id
    #[serde(default)]
    pub study: String,
    /// Destination site id
    #[serde(default)]
    pub site_number: String,
    /// Item category
    pub select_type: SelectType,
    /// Drug ids, populated when `select_type` is `Drug`
    #[serde(default)]
    pub drug: Vec<String>,
    /// Group ids, populated when `select_type` is `DrugGroup`
    #[serde(default)]
    pub group_name: Vec<String>,
    /// Row ids, populated when `select_type` is `Randomization`
    #[serde(default)]
    pub excel_rows: Vec<String>,
    /// Dispatched quantity per item id; empty for randomization
    #[serde(default)]
    pub quantities: BTreeMap<String, u32>,
    /// Whether the site has completed reconciliation
    #[serde(default)]
    pub is_acknowledged: bool,
    /// Reconciliation entries, expanded by the detail endpoint
    #[serde(default)]
    pub acknowledgments: Vec<Acknowledgment>,
    /// Creation timestamp
    #[serde(default)]
    pub date_created: Option<String>,
    /// Last update timestamp
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Shipment {
    /// The selection array matching this shipment's category.
    pub fn selection_ids(&self) -> &[String] {
        match self.select_type {
            SelectType::Drug => &self.drug,
            SelectType::DrugGroup => &self.group_name,
            SelectType::Randomization => &self.excel_rows,
        }
    }

    /// True when exactly the matching selection array is populated.
    pub fn selection_matches_type(&self) -> bool {
        let (drug, group, rows) = (
            !self.drug.is_empty(),
            !self.group_name.is_empty(),
            !self.excel_rows.is_empty(),
        );
        match self.select_type {
            SelectType::Drug => drug && !group && !rows,
            SelectType::DrugGroup => group && !drug && !rows,
            SelectType::Randomization => rows && !drug && !group,
        }
    }

    /// True when the detail endpoint returned reconciliation entries.
    pub fn has_acknowledgments(&self) -> bool {
        !self.acknowledgments.is_empty()
    }
}

/// Body of the create and update endpoints. Exactly one selection array
/// is populated; the others are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPayload {
    /// Owning study id
    pub study: String,
    /// Destination site id
    pub site_number: String,
    /// Dispatch date
    pub shipment_date: String,
    /// Item category
    pub select_type: SelectType,
    /// Drug ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drug: Vec<String>,
    /// Group ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_name: Vec<String>,
    /// Row ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excel_rows: Vec<String>,
    /// Quantity per item id; omitted for randomization
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quantities: BTreeMap<String, u32>,
}

impl ShipmentPayload {
    /// The selection array matching the payload's category.
    pub fn selection_ids(&self) -> &[String] {
        match self.select_type {
            SelectType::Drug => &self.drug,
            SelectType::DrugGroup => &self.group_name,
            SelectType::Randomization => &self.excel_rows,
        }
    }
}
