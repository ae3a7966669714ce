//! Console flow tests over a scripted backend.

use std::collections::BTreeMap;

use proptest::prelude::*;

use supplyline_core::composer::{ComposerError, Transition};
use supplyline_core::models::{
    AckStatus, Acknowledgment, Drug, ExcelRow, RelatedFields, SelectType, Shipment, ShipmentPage,
    ShipmentQuery, Site,
};
use supplyline_rest::{
    ApiError, ConsoleError, MockApi, MockCall, ShipmentConsole, SubmitOutcome,
};

fn make_fields() -> RelatedFields {
    RelatedFields {
        sites: vec![Site::new("site-1".into(), "Boston General".into())],
        drugs: vec![
            Drug::new("d1".into(), "Alpha".into(), 50),
            Drug::new("d2".into(), "Beta".into(), 5),
        ],
        drug_groups: Vec::new(),
        excel_rows: Vec::new(),
        headers: vec!["kitNumber".into()],
    }
}

fn make_drug_shipment(id: &str, is_acknowledged: bool) -> Shipment {
    let mut quantities = BTreeMap::new();
    quantities.insert("d1".to_string(), 10);
    Shipment {
        id: id.into(),
        shipment_number: Some("S-0009".into()),
        shipment_date: "2024-03-01".into(),
        study: "study-1".into(),
        site_number: "site-1".into(),
        select_type: SelectType::Drug,
        drug: vec!["d1".into()],
        group_name: Vec::new(),
        excel_rows: Vec::new(),
        quantities,
        is_acknowledged,
        acknowledgments: Vec::new(),
        date_created: None,
        last_updated: None,
    }
}

fn make_group_shipment(id: &str) -> Shipment {
    let mut quantities = BTreeMap::new();
    quantities.insert("gd1".to_string(), 3);
    quantities.insert("gd2".to_string(), 2);
    Shipment {
        id: id.into(),
        shipment_number: None,
        shipment_date: "2024-03-02".into(),
        study: "study-1".into(),
        site_number: "site-1".into(),
        select_type: SelectType::DrugGroup,
        drug: Vec::new(),
        group_name: vec!["g1".into()],
        excel_rows: Vec::new(),
        quantities,
        is_acknowledged: false,
        acknowledgments: Vec::new(),
        date_created: None,
        last_updated: None,
    }
}

fn make_randomization_shipment(id: &str) -> Shipment {
    let mut fields = BTreeMap::new();
    fields.insert(
        "kitNumber".to_string(),
        serde_json::Value::String("KIT-1".into()),
    );
    let ack = Acknowledgment {
        id: "ack-1".into(),
        shipment: Some(id.to_string()),
        drug: None,
        drug_group: None,
        excel_row: Some(ExcelRow {
            id: "r1".into(),
            fields,
        }),
        acknowledged_quantity: 1,
        received_quantity: 1,
        missing_quantity: 0,
        damaged_quantity: 0,
        status: AckStatus::Received,
    };
    Shipment {
        id: id.into(),
        shipment_number: None,
        shipment_date: "2024-03-03".into(),
        study: "study-1".into(),
        site_number: "site-1".into(),
        select_type: SelectType::Randomization,
        drug: Vec::new(),
        group_name: Vec::new(),
        excel_rows: vec!["r1".into()],
        quantities: BTreeMap::new(),
        is_acknowledged: true,
        acknowledgments: vec![ack],
        date_created: None,
        last_updated: None,
    }
}

fn fill_drug_form(console: &mut ShipmentConsole<MockApi>, quantity: u32) {
    let composer = console.composer_mut();
    composer.select_site("site-1").unwrap();
    composer.set_shipment_date("2024-03-01").unwrap();
    composer.select_type(SelectType::Drug).unwrap();
    composer.toggle_drug("d1").unwrap();
    composer.set_quantity("d1", quantity).unwrap();
}

#[test]
fn test_compose_and_submit_flow() {
    let api = MockApi::new().queue_related_fields(make_fields());
    let mut console = ShipmentConsole::new(api);

    console.change_study("study-1").unwrap();
    fill_drug_form(&mut console, 10);

    let outcome = console.submit().unwrap();
    let SubmitOutcome::Created(saved) = outcome else {
        panic!("expected a create");
    };
    assert_eq!(saved.drug, vec!["d1".to_string()]);

    let created = console.client().created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].study, "study-1");
    assert_eq!(created[0].drug, vec!["d1".to_string()]);
    assert_eq!(created[0].quantities.get("d1"), Some(&10));
    assert!(created[0].group_name.is_empty());
    assert!(created[0].excel_rows.is_empty());

    // A successful save starts the next draft.
    assert!(console.composer().is_locked());
}

#[test]
fn test_over_stock_submit_is_blocked_before_any_request() {
    let api = MockApi::new().queue_related_fields(make_fields());
    let mut console = ShipmentConsole::new(api);

    console.change_study("study-1").unwrap();
    fill_drug_form(&mut console, 60);

    let err = console.submit().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Quantity for Alpha exceeds remaining stock (60 > 50)"
    );
    assert!(!console
        .client()
        .calls()
        .iter()
        .any(|call| matches!(call, MockCall::CreateShipment(_))));
}

#[test]
fn test_edit_flow_sends_update() {
    let api = MockApi::new()
        .queue_shipment(make_drug_shipment("shp-9", false))
        .queue_related_fields(make_fields());
    let mut console = ShipmentConsole::new(api);

    let transition = console.edit("shp-9").unwrap();
    assert!(matches!(transition, Transition::RelatedLoaded { .. }));
    assert_eq!(console.composer().editing(), Some("shp-9"));

    console.composer_mut().set_quantity("d1", 25).unwrap();

    let outcome = console.submit().unwrap();
    assert!(matches!(outcome, SubmitOutcome::Updated(_)));

    let updated: Vec<_> = console
        .client()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            MockCall::UpdateShipment(id, payload) => Some((id, payload)),
            _ => None,
        })
        .collect();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, "shp-9");
    assert_eq!(updated[0].1.quantities.get("d1"), Some(&25));
}

#[test]
fn test_edit_with_failed_fetch_blocks_submit() {
    let api = MockApi::new()
        .queue_shipment(make_group_shipment("shp-9"))
        .queue_related_failure(ApiError::Timeout(30));
    let mut console = ShipmentConsole::new(api);

    let transition = console.edit("shp-9").unwrap();
    assert!(matches!(transition, Transition::RelatedUnavailable { .. }));

    // Without candidates the seeded group quantities cannot be
    // verified; no update may go out that would save the shipment
    // without them.
    let err = console.submit().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please reselect the study to reload its items"
    );
    assert!(!console
        .client()
        .calls()
        .iter()
        .any(|call| matches!(call, MockCall::UpdateShipment(_, _))));

    // The draft survives for a retry.
    assert_eq!(console.composer().editing(), Some("shp-9"));
    assert_eq!(console.composer().quantities().get("gd1"), Some(&3));
}

#[test]
fn test_edit_refuses_acknowledged_shipment() {
    let api = MockApi::new().queue_shipment(make_drug_shipment("shp-9", true));
    let mut console = ShipmentConsole::new(api);

    let err = console.edit("shp-9").unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::Composer(ComposerError::AlreadyAcknowledged(_))
    ));
}

#[test]
fn test_backend_refusal_message_surfaces_and_form_survives() {
    let api = MockApi::new()
        .queue_related_fields(make_fields())
        .queue_write_failure(ApiError::Backend {
            status: 400,
            message: "Shipment date cannot be in the past".into(),
        });
    let mut console = ShipmentConsole::new(api);

    console.change_study("study-1").unwrap();
    fill_drug_form(&mut console, 10);

    let err = console.submit().unwrap_err();
    assert_eq!(err.to_string(), "Shipment date cannot be in the past");

    // The draft is kept so the user can correct and resubmit.
    assert!(!console.composer().is_locked());
    assert_eq!(console.composer().study(), Some("study-1"));
    assert_eq!(console.composer().quantities().get("d1"), Some(&10));
}

#[test]
fn test_roster_passes_filters_through() {
    let api = MockApi::new().queue_page(ShipmentPage::default());
    let console = ShipmentConsole::new(api);

    let query = ShipmentQuery::new()
        .page(2)
        .study("study-1")
        .select_type(SelectType::Drug);
    console.roster(&query).unwrap();

    assert_eq!(
        console.client().calls(),
        vec![MockCall::ListShipments(query)]
    );
}

#[test]
fn test_acknowledgment_view_uses_study_headers_for_randomization() {
    let api = MockApi::new()
        .queue_shipment(make_randomization_shipment("shp-3"))
        .queue_related_fields(make_fields());
    let console = ShipmentConsole::new(api);

    let view = console
        .acknowledgment_view("shp-3")
        .unwrap()
        .expect("acknowledged shipment should produce a table");
    assert_eq!(view.row_count(), 1);
    assert_eq!(view.select_type(), SelectType::Randomization);

    assert_eq!(
        console.client().calls(),
        vec![
            MockCall::GetShipment("shp-3".into()),
            MockCall::RelatedFields("study-1".into()),
        ]
    );
}

#[test]
fn test_acknowledgment_view_skips_header_lookup_for_drug_tables() {
    let mut shipment = make_drug_shipment("shp-5", true);
    shipment.acknowledgments.push(Acknowledgment {
        id: "ack-1".into(),
        shipment: Some("shp-5".into()),
        drug: Some(Drug::new("d1".into(), "Alpha".into(), 40)),
        drug_group: None,
        excel_row: None,
        acknowledged_quantity: 10,
        received_quantity: 10,
        missing_quantity: 0,
        damaged_quantity: 0,
        status: AckStatus::Received,
    });
    let api = MockApi::new().queue_shipment(shipment);
    let console = ShipmentConsole::new(api);

    let view = console.acknowledgment_view("shp-5").unwrap().unwrap();
    assert_eq!(view.row_count(), 1);

    // Only the detail fetch; drug tables need no header lookup.
    assert_eq!(
        console.client().calls(),
        vec![MockCall::GetShipment("shp-5".into())]
    );
}

#[test]
fn test_acknowledgment_view_header_lookup_failure_falls_back() {
    // No related-fields response queued: the lookup fails, the table
    // still renders with the rows' own field order.
    let api = MockApi::new().queue_shipment(make_randomization_shipment("shp-3"));
    let console = ShipmentConsole::new(api);

    let view = console.acknowledgment_view("shp-3").unwrap().unwrap();
    assert_eq!(view.row_count(), 1);
}

#[test]
fn test_no_acknowledgments_views_nothing() {
    let api = MockApi::new().queue_shipment(make_drug_shipment("shp-6", false));
    let console = ShipmentConsole::new(api);

    assert!(console.acknowledgment_view("shp-6").unwrap().is_none());
}

// =========================================================================
// Backend message passthrough
// =========================================================================

proptest! {
    /// Whatever the backend writes in its refusal, the screens toast
    /// it unchanged.
    #[test]
    fn prop_backend_refusals_surface_verbatim(message in ".+") {
        let body = serde_json::json!({ "message": &message }).to_string();
        let err = ApiError::from_status(422, &body);
        prop_assert_eq!(err.to_string(), message);
    }
}
