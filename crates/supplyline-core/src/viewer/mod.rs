//! Acknowledgment tables for the shipment detail view.

mod status;

pub use status::*;

use serde::{Deserialize, Serialize};

use crate::models::{AckStatus, Acknowledgment, SelectType, Shipment};

/// Row of the drug acknowledgment table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugAckRow {
    /// Drug name
    pub drug_name: String,
    /// Quantity dispatched
    pub sent: u32,
    /// Quantity received
    pub received: u32,
    /// Quantity missing
    pub missing: u32,
    /// Quantity damaged
    pub damaged: u32,
    /// Reconciliation status
    pub status: AckStatus,
    /// Badge color for the status cell
    pub badge: BadgeColor,
}

/// Row of the drug-group acknowledgment table, one per (group, drug)
/// pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupAckRow {
    /// Group name
    pub group_name: String,
    /// Member drug name
    pub drug_name: String,
    /// Quantity dispatched
    pub sent: u32,
    /// Quantity received
    pub received: u32,
    /// Quantity missing
    pub missing: u32,
    /// Quantity damaged
    pub damaged: u32,
    /// Reconciliation status
    pub status: AckStatus,
    /// Badge color for the status cell
    pub badge: BadgeColor,
}

/// Row of the randomization acknowledgment table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RandomizationAckRow {
    /// Kit number, or "Row {id}" when the upload had none
    pub label: String,
    /// Row data as "Header: value" lines, in header order
    pub details: Vec<String>,
    /// Reconciliation status
    pub status: AckStatus,
    /// Badge color for the status cell
    pub badge: BadgeColor,
}

/// Acknowledgment table for one shipment, shaped by its select type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AcknowledgmentView {
    /// Drug shipment table
    Drug { rows: Vec<DrugAckRow> },
    /// Drug-group shipment table
    DrugGroup { rows: Vec<GroupAckRow> },
    /// Randomization shipment table
    Randomization { rows: Vec<RandomizationAckRow> },
}

impl AcknowledgmentView {
    /// Build the table for a shipment. Returns `None` when the backend
    /// sent no acknowledgment entries: the detail view renders nothing
    /// rather than an empty table.
    ///
    /// `headers` orders the randomization detail lines; when empty, the
    /// rows' own field order is used.
    pub fn build(shipment: &Shipment, headers: &[String]) -> Option<Self> {
        if shipment.acknowledgments.is_empty() {
            return None;
        }
        let view = match shipment.select_type {
            SelectType::Drug => AcknowledgmentView::Drug {
                rows: shipment
                    .acknowledgments
                    .iter()
                    .map(drug_row)
                    .collect(),
            },
            SelectType::DrugGroup => AcknowledgmentView::DrugGroup {
                rows: shipment
                    .acknowledgments
                    .iter()
                    .map(group_row)
                    .collect(),
            },
            SelectType::Randomization => AcknowledgmentView::Randomization {
                rows: shipment
                    .acknowledgments
                    .iter()
                    .map(|ack| randomization_row(ack, headers))
                    .collect(),
            },
        };
        Some(view)
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        match self {
            AcknowledgmentView::Drug { rows } => rows.len(),
            AcknowledgmentView::DrugGroup { rows } => rows.len(),
            AcknowledgmentView::Randomization { rows } => rows.len(),
        }
    }

    /// Table shape.
    pub fn select_type(&self) -> SelectType {
        match self {
            AcknowledgmentView::Drug { .. } => SelectType::Drug,
            AcknowledgmentView::DrugGroup { .. } => SelectType::DrugGroup,
            AcknowledgmentView::Randomization { .. } => SelectType::Randomization,
        }
    }

    /// Serialize for the shell.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn drug_row(ack: &Acknowledgment) -> DrugAckRow {
    DrugAckRow {
        drug_name: ack.drug.as_ref().map(|d| d.name.clone()).unwrap_or_default(),
        sent: ack.acknowledged_quantity,
        received: ack.received_quantity,
        missing: ack.missing_quantity,
        damaged: ack.damaged_quantity,
        status: ack.status,
        badge: badge_for(ack.status, SelectType::Drug),
    }
}

fn group_row(ack: &Acknowledgment) -> GroupAckRow {
    GroupAckRow {
        group_name: ack
            .drug_group
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_default(),
        drug_name: ack.drug.as_ref().map(|d| d.name.clone()).unwrap_or_default(),
        sent: ack.acknowledged_quantity,
        received: ack.received_quantity,
        missing: ack.missing_quantity,
        damaged: ack.damaged_quantity,
        status: ack.status,
        badge: badge_for(ack.status, SelectType::DrugGroup),
    }
}

fn randomization_row(ack: &Acknowledgment, headers: &[String]) -> RandomizationAckRow {
    let (label, details) = match &ack.excel_row {
        Some(row) => {
            let details = if headers.is_empty() {
                row.fields
                    .keys()
                    .map(|key| format!("{}: {}", key, row.field_text(key)))
                    .collect()
            } else {
                headers
                    .iter()
                    .map(|header| format!("{}: {}", header, row.field_text(header)))
                    .collect()
            };
            (row.display_label(), details)
        }
        None => (String::new(), Vec::new()),
    };
    RandomizationAckRow {
        label,
        details,
        status: ack.status,
        badge: badge_for(ack.status, SelectType::Randomization),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Drug, DrugGroup, ExcelRow};

    fn make_ack(status: AckStatus) -> Acknowledgment {
        Acknowledgment {
            id: uuid::Uuid::new_v4().to_string(),
            shipment: Some("ship-1".into()),
            drug: None,
            drug_group: None,
            excel_row: None,
            acknowledged_quantity: 10,
            received_quantity: 8,
            missing_quantity: 2,
            damaged_quantity: 0,
            status,
        }
    }

    fn make_shipment(select_type: SelectType, acks: Vec<Acknowledgment>) -> Shipment {
        let mut shipment: Shipment = serde_json::from_str(
            r#"{"_id":"ship-1","selectType":"Drug","study":"study-1"}"#,
        )
        .unwrap();
        shipment.select_type = select_type;
        shipment.acknowledgments = acks;
        shipment
    }

    #[test]
    fn test_no_acknowledgments_renders_nothing() {
        let shipment = make_shipment(SelectType::Drug, Vec::new());
        assert!(AcknowledgmentView::build(&shipment, &[]).is_none());
    }

    #[test]
    fn test_drug_table_rows() {
        let mut ack = make_ack(AckStatus::Partial);
        ack.drug = Some(Drug::new("d1".into(), "Alpha".into(), 50));
        let shipment = make_shipment(SelectType::Drug, vec![ack]);

        let view = AcknowledgmentView::build(&shipment, &[]).unwrap();
        let AcknowledgmentView::Drug { rows } = &view else {
            panic!("expected drug table, got {view:?}");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drug_name, "Alpha");
        assert_eq!(rows[0].sent, 10);
        assert_eq!(rows[0].received, 8);
        assert_eq!(rows[0].missing, 2);
        assert_eq!(rows[0].badge, BadgeColor::Yellow);
    }

    #[test]
    fn test_group_table_denormalizes_per_pair() {
        let group = DrugGroup::new("g1".into(), "Starter Kit".into());
        let mut acks = Vec::new();
        for (i, name) in ["Gamma", "Delta", "Epsilon"].iter().enumerate() {
            let mut ack = make_ack(AckStatus::Received);
            ack.drug_group = Some(group.clone());
            ack.drug = Some(Drug::new(format!("gd{i}"), name.to_string(), 30));
            acks.push(ack);
        }
        let shipment = make_shipment(SelectType::DrugGroup, acks);

        let view = AcknowledgmentView::build(&shipment, &[]).unwrap();
        assert_eq!(view.row_count(), 3);
        let AcknowledgmentView::DrugGroup { rows } = &view else {
            panic!("expected group table, got {view:?}");
        };
        assert!(rows.iter().all(|r| r.group_name == "Starter Kit"));
        assert_eq!(rows[1].drug_name, "Delta");
    }

    #[test]
    fn test_randomization_rows_use_header_order() {
        let row: ExcelRow = serde_json::from_str(
            r#"{"_id":"r1","kitNumber":"KIT-7","arm":"Placebo","dose":"5mg"}"#,
        )
        .unwrap();
        let mut ack = make_ack(AckStatus::Damaged);
        ack.excel_row = Some(row);
        let shipment = make_shipment(SelectType::Randomization, vec![ack]);

        let headers = vec!["arm".to_string(), "kitNumber".to_string()];
        let view = AcknowledgmentView::build(&shipment, &headers).unwrap();
        let AcknowledgmentView::Randomization { rows } = &view else {
            panic!("expected randomization table, got {view:?}");
        };
        assert_eq!(rows[0].label, "KIT-7");
        assert_eq!(
            rows[0].details,
            vec!["arm: Placebo".to_string(), "kitNumber: KIT-7".to_string()]
        );
        assert_eq!(rows[0].badge, BadgeColor::Orange);
    }

    #[test]
    fn test_randomization_fallback_label() {
        let row: ExcelRow = serde_json::from_str(r#"{"_id":"r9","arm":"Active"}"#).unwrap();
        let mut ack = make_ack(AckStatus::Pending);
        ack.excel_row = Some(row);
        let shipment = make_shipment(SelectType::Randomization, vec![ack]);

        let view = AcknowledgmentView::build(&shipment, &[]).unwrap();
        let AcknowledgmentView::Randomization { rows } = &view else {
            panic!("expected randomization table, got {view:?}");
        };
        assert_eq!(rows[0].label, "Row r9");
        assert_eq!(rows[0].badge, BadgeColor::Gray);
    }

    #[test]
    fn test_missing_refs_become_blank_cells() {
        let shipment = make_shipment(SelectType::Drug, vec![make_ack(AckStatus::Received)]);
        let view = AcknowledgmentView::build(&shipment, &[]).unwrap();
        let AcknowledgmentView::Drug { rows } = &view else {
            panic!("expected drug table, got {view:?}");
        };
        assert_eq!(rows[0].drug_name, "");
        assert_eq!(rows[0].badge, BadgeColor::Green);
    }
}
