//! Shipment item candidates: drugs, drug groups, and randomization rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A drug available for shipment within a study.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Drug name shown in the item list
    pub name: String,
    /// Server-tracked stock snapshot at fetch time. The backend remains
    /// the final authority; this bound is enforced again on submit.
    #[serde(default)]
    pub remaining_quantity: u32,
}

/// A named grouping of drugs shipped together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugGroup {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Group name shown in the item list
    pub name: String,
    /// Member drugs; selecting the group selects all of them
    #[serde(default)]
    pub drugs: Vec<Drug>,
}

/// One uploaded randomization row. Columns vary per study, so anything
/// beyond the id is kept as a dynamic field map; the study's header list
/// gives the display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcelRow {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Dynamic columns keyed by header name
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Drug {
    /// Create a drug with a stock snapshot.
    pub fn new(id: String, name: String, remaining_quantity: u32) -> Self {
        Self {
            id,
            name,
            remaining_quantity,
        }
    }
}

impl DrugGroup {
    /// Create an empty group.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            drugs: Vec::new(),
        }
    }

    /// Ids of all member drugs.
    pub fn drug_ids(&self) -> Vec<String> {
        self.drugs.iter().map(|d| d.id.clone()).collect()
    }

    /// Look up a member drug by id.
    pub fn drug(&self, drug_id: &str) -> Option<&Drug> {
        self.drugs.iter().find(|d| d.id == drug_id)
    }
}

impl ExcelRow {
    /// The kit number column, when the upload had one.
    pub fn kit_number(&self) -> Option<String> {
        self.fields
            .get("kitNumber")
            .map(|v| field_text(v))
            .filter(|s| !s.is_empty())
    }

    /// Label for tables: the kit number, or a positional fallback.
    pub fn display_label(&self) -> String {
        self.kit_number()
            .unwrap_or_else(|| format!("Row {}", self.id))
    }

    /// Field value rendered as plain text, empty string when absent.
    pub fn field_text(&self, header: &str) -> String {
        self.fields.get(header).map(field_text).unwrap_or_default()
    }
}

/// Render a dynamic cell as display text. Strings come through bare,
/// everything else via its JSON form, null as empty.
fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(id: &str, pairs: &[(&str, &str)]) -> ExcelRow {
        let mut fields = BTreeMap::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        ExcelRow {
            id: id.into(),
            fields,
        }
    }

    #[test]
    fn test_group_drug_ids() {
        let mut group = DrugGroup::new("grp-1".into(), "Kit A".into());
        group.drugs.push(Drug::new("d1".into(), "Drug 1".into(), 10));
        group.drugs.push(Drug::new("d2".into(), "Drug 2".into(), 20));

        assert_eq!(group.drug_ids(), vec!["d1".to_string(), "d2".to_string()]);
        assert_eq!(group.drug("d2").unwrap().remaining_quantity, 20);
        assert!(group.drug("d3").is_none());
    }

    #[test]
    fn test_kit_number_label() {
        let row = make_row("row-9", &[("kitNumber", "KIT-0042"), ("arm", "Placebo")]);
        assert_eq!(row.display_label(), "KIT-0042");

        let bare = make_row("row-9", &[("arm", "Placebo")]);
        assert_eq!(bare.display_label(), "Row row-9");
    }

    #[test]
    fn test_dynamic_fields_roundtrip() {
        let json = r#"{"_id":"row-1","kitNumber":"KIT-1","dose":5}"#;
        let row: ExcelRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.kit_number().as_deref(), Some("KIT-1"));
        assert_eq!(row.field_text("dose"), "5");
        assert_eq!(row.field_text("missing"), "");
    }

    #[test]
    fn test_drug_remaining_defaults() {
        let drug: Drug = serde_json::from_str(r#"{"_id":"d1","name":"Drug 1"}"#).unwrap();
        assert_eq!(drug.remaining_quantity, 0);
    }
}
