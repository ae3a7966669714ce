//! Study-scoped candidates for composing a shipment.

use serde::{Deserialize, Serialize};

use super::inventory::{Drug, DrugGroup, ExcelRow};
use super::study::Site;

/// Response of the related-fields lookup for one study. Every category
/// defaults to empty, so a missing or oddly-shaped section degrades to
/// "nothing to pick" instead of an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedFields {
    /// Sites the study ships to
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Drugs with current stock snapshots
    #[serde(default)]
    pub drugs: Vec<Drug>,
    /// Drug groups with member drugs expanded
    #[serde(default)]
    pub drug_groups: Vec<DrugGroup>,
    /// Uploaded randomization rows
    #[serde(default)]
    pub excel_rows: Vec<ExcelRow>,
    /// Column order for randomization rows
    #[serde(default)]
    pub headers: Vec<String>,
}

impl RelatedFields {
    /// True when the study has no candidates in any category.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.drugs.is_empty()
            && self.drug_groups.is_empty()
            && self.excel_rows.is_empty()
    }

    /// Look up a drug by id, searching loose drugs then group members.
    pub fn find_drug(&self, drug_id: &str) -> Option<&Drug> {
        self.drugs
            .iter()
            .find(|d| d.id == drug_id)
            .or_else(|| self.drug_groups.iter().find_map(|g| g.drug(drug_id)))
    }

    /// Look up a group by id.
    pub fn find_group(&self, group_id: &str) -> Option<&DrugGroup> {
        self.drug_groups.iter().find(|g| g.id == group_id)
    }

    /// Look up a randomization row by id.
    pub fn find_row(&self, row_id: &str) -> Option<&ExcelRow> {
        self.excel_rows.iter().find(|r| r.id == row_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_defaults_empty() {
        let json = r#"{"sites":[{"_id":"s1","name":"Site 1"}]}"#;
        let fields: RelatedFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.sites.len(), 1);
        assert!(fields.drugs.is_empty());
        assert!(fields.drug_groups.is_empty());
        assert!(fields.excel_rows.is_empty());
        assert!(fields.headers.is_empty());
        assert!(!fields.is_empty());
    }

    #[test]
    fn test_find_drug_inside_group() {
        let json = r#"{
            "drugs": [{"_id":"d1","name":"Loose","remainingQuantity":5}],
            "drugGroups": [{
                "_id":"g1","name":"Kit",
                "drugs":[{"_id":"d2","name":"Member","remainingQuantity":9}]
            }]
        }"#;
        let fields: RelatedFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.find_drug("d1").unwrap().name, "Loose");
        assert_eq!(fields.find_drug("d2").unwrap().remaining_quantity, 9);
        assert!(fields.find_drug("d3").is_none());
    }
}
