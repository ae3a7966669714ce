//! Scripted backend for testing without a server.

use std::collections::VecDeque;
use std::sync::Mutex;

use supplyline_core::models::{
    AcknowledgePayload, RelatedFields, Shipment, ShipmentPage, ShipmentPayload, ShipmentQuery,
    Site, Study,
};

use crate::client::ShipmentApi;
use crate::error::{ApiError, ApiResult};

/// One backend call as the console issued it, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListShipments(ShipmentQuery),
    GetShipment(String),
    CreateShipment(ShipmentPayload),
    UpdateShipment(String, ShipmentPayload),
    DeleteShipment(String),
    AcknowledgeShipment(String, AcknowledgePayload),
    RelatedFields(String),
    ListStudies,
    ListSites(String),
}

/// Mock [`ShipmentApi`] for testing the console without a backend.
///
/// Responses are queued per endpoint with the `queue_*` methods and
/// consumed in order; an exhausted queue answers with a connection
/// error. Writes succeed by echoing the payload back as a stored
/// shipment unless a failure was queued. Every call is recorded and
/// available through [`calls`](MockApi::calls).
pub struct MockApi {
    related: Mutex<VecDeque<ApiResult<RelatedFields>>>,
    details: Mutex<VecDeque<ApiResult<Shipment>>>,
    pages: Mutex<VecDeque<ApiResult<ShipmentPage>>>,
    write_errors: Mutex<VecDeque<ApiError>>,
    studies: Vec<Study>,
    sites: Vec<Site>,
    next_id: Mutex<u32>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            related: Mutex::new(VecDeque::new()),
            details: Mutex::new(VecDeque::new()),
            pages: Mutex::new(VecDeque::new()),
            write_errors: Mutex::new(VecDeque::new()),
            studies: Vec::new(),
            sites: Vec::new(),
            next_id: Mutex::new(1),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful related-fields response.
    pub fn queue_related_fields(self, fields: RelatedFields) -> Self {
        self.related.lock().unwrap().push_back(Ok(fields));
        self
    }

    /// Queue a failing related-fields response.
    pub fn queue_related_failure(self, error: ApiError) -> Self {
        self.related.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a shipment for the detail endpoint.
    pub fn queue_shipment(self, shipment: Shipment) -> Self {
        self.details.lock().unwrap().push_back(Ok(shipment));
        self
    }

    /// Queue a page for the list endpoint.
    pub fn queue_page(self, page: ShipmentPage) -> Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    /// Queue a failure for the next write (create, update, delete or
    /// acknowledge).
    pub fn queue_write_failure(self, error: ApiError) -> Self {
        self.write_errors.lock().unwrap().push_back(error);
        self
    }

    pub fn with_studies(mut self, studies: Vec<Study>) -> Self {
        self.studies = studies;
        self
    }

    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Payloads of recorded create calls, in order.
    pub fn created(&self) -> Vec<ShipmentPayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::CreateShipment(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_write_error(&self) -> Option<ApiError> {
        self.write_errors.lock().unwrap().pop_front()
    }

    fn fresh_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        let id = format!("shp-{}", *next);
        *next += 1;
        id
    }

    fn exhausted(endpoint: &str) -> ApiError {
        ApiError::Connection(format!("mock: no response queued for {}", endpoint))
    }

    fn echo(id: String, payload: &ShipmentPayload) -> Shipment {
        Shipment {
            id,
            shipment_number: None,
            shipment_date: payload.shipment_date.clone(),
            study: payload.study.clone(),
            site_number: payload.site_number.clone(),
            select_type: payload.select_type,
            drug: payload.drug.clone(),
            group_name: payload.group_name.clone(),
            excel_rows: payload.excel_rows.clone(),
            quantities: payload.quantities.clone(),
            is_acknowledged: false,
            acknowledgments: Vec::new(),
            date_created: None,
            last_updated: None,
        }
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ShipmentApi for MockApi {
    fn list_shipments(&self, query: &ShipmentQuery) -> ApiResult<ShipmentPage> {
        self.record(MockCall::ListShipments(query.clone()));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("list_shipments")))
    }

    fn get_shipment(&self, id: &str) -> ApiResult<Shipment> {
        self.record(MockCall::GetShipment(id.to_string()));
        self.details
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("get_shipment")))
    }

    fn create_shipment(&self, payload: &ShipmentPayload) -> ApiResult<Shipment> {
        self.record(MockCall::CreateShipment(payload.clone()));
        match self.take_write_error() {
            Some(error) => Err(error),
            None => Ok(Self::echo(self.fresh_id(), payload)),
        }
    }

    fn update_shipment(&self, id: &str, payload: &ShipmentPayload) -> ApiResult<Shipment> {
        self.record(MockCall::UpdateShipment(id.to_string(), payload.clone()));
        match self.take_write_error() {
            Some(error) => Err(error),
            None => Ok(Self::echo(id.to_string(), payload)),
        }
    }

    fn delete_shipment(&self, id: &str) -> ApiResult<()> {
        self.record(MockCall::DeleteShipment(id.to_string()));
        match self.take_write_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn acknowledge_shipment(
        &self,
        id: &str,
        payload: &AcknowledgePayload,
    ) -> ApiResult<Shipment> {
        self.record(MockCall::AcknowledgeShipment(id.to_string(), payload.clone()));
        match self.take_write_error() {
            Some(error) => Err(error),
            None => self
                .details
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Self::exhausted("acknowledge_shipment"))),
        }
    }

    fn related_fields(&self, study_id: &str) -> ApiResult<RelatedFields> {
        self.record(MockCall::RelatedFields(study_id.to_string()));
        self.related
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::exhausted("related_fields")))
    }

    fn list_studies(&self) -> ApiResult<Vec<Study>> {
        self.record(MockCall::ListStudies);
        Ok(self.studies.clone())
    }

    fn list_sites(&self, study_id: &str) -> ApiResult<Vec<Site>> {
        self.record(MockCall::ListSites(study_id.to_string()));
        Ok(self
            .sites
            .iter()
            .filter(|site| site.belongs_to(study_id))
            .cloned()
            .collect())
    }
}
