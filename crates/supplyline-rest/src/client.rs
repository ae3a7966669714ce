//! HTTP client for the shipment backend.

use serde::de::DeserializeOwned;

use supplyline_core::models::{
    AcknowledgePayload, RelatedFields, Shipment, ShipmentPage, ShipmentPayload, ShipmentQuery,
    Site, Study,
};

use crate::error::{ApiError, ApiResult};

/// Operations the shipment screens need from the backend. One method
/// per endpoint; no retries, no backoff, every failure surfaces to the
/// caller.
pub trait ShipmentApi {
    /// `GET /shipments` with paging and filters.
    fn list_shipments(&self, query: &ShipmentQuery) -> ApiResult<ShipmentPage>;

    /// `GET /shipments/:id`, acknowledgments expanded.
    fn get_shipment(&self, id: &str) -> ApiResult<Shipment>;

    /// `POST /shipments`.
    fn create_shipment(&self, payload: &ShipmentPayload) -> ApiResult<Shipment>;

    /// `PUT /shipments/:id`.
    fn update_shipment(&self, id: &str, payload: &ShipmentPayload) -> ApiResult<Shipment>;

    /// `DELETE /shipments/:id`. Irreversible; callers confirm first.
    fn delete_shipment(&self, id: &str) -> ApiResult<()>;

    /// `POST /shipments/:id/acknowledge`.
    fn acknowledge_shipment(&self, id: &str, payload: &AcknowledgePayload)
        -> ApiResult<Shipment>;

    /// `GET /shipments/related-fields/:studyId`. Never called with an
    /// empty study id.
    fn related_fields(&self, study_id: &str) -> ApiResult<RelatedFields>;

    /// `GET /studies`.
    fn list_studies(&self) -> ApiResult<Vec<Study>>;

    /// `GET /sites?study=:id`.
    fn list_sites(&self, study_id: &str) -> ApiResult<Vec<Site>>;
}

/// Blocking HTTP implementation of [`ShipmentApi`].
pub struct RestClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl RestClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Local development backend with a 30-second timeout.
    pub fn default_local() -> Self {
        Self::new("http://localhost:5000/api", 30)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Http(e.to_string())
        }
    }

    fn read_json<T: DeserializeOwned>(&self, response: reqwest::blocking::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn read_empty(&self, response: reqwest::blocking::Response) -> ApiResult<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(())
    }
}

impl ShipmentApi for RestClient {
    fn list_shipments(&self, query: &ShipmentQuery) -> ApiResult<ShipmentPage> {
        let url = self.url("/shipments");
        tracing::debug!(url = %url, page = query.page, "listing shipments");
        let response = self
            .client
            .get(&url)
            .query(&query.to_query_pairs())
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn get_shipment(&self, id: &str) -> ApiResult<Shipment> {
        let url = self.url(&format!("/shipments/{}", id));
        tracing::debug!(url = %url, "fetching shipment");
        let response = self.client.get(&url).send().map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn create_shipment(&self, payload: &ShipmentPayload) -> ApiResult<Shipment> {
        let url = self.url("/shipments");
        tracing::info!(study = %payload.study, select_type = %payload.select_type, "creating shipment");
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn update_shipment(&self, id: &str, payload: &ShipmentPayload) -> ApiResult<Shipment> {
        let url = self.url(&format!("/shipments/{}", id));
        tracing::info!(shipment = %id, "updating shipment");
        let response = self
            .client
            .put(&url)
            .json(payload)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn delete_shipment(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/shipments/{}", id));
        tracing::info!(shipment = %id, "deleting shipment");
        let response = self
            .client
            .delete(&url)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_empty(response)
    }

    fn acknowledge_shipment(
        &self,
        id: &str,
        payload: &AcknowledgePayload,
    ) -> ApiResult<Shipment> {
        let url = self.url(&format!("/shipments/{}/acknowledge", id));
        tracing::info!(shipment = %id, lines = payload.acknowledgments.len(), "acknowledging shipment");
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn related_fields(&self, study_id: &str) -> ApiResult<RelatedFields> {
        if study_id.trim().is_empty() {
            return Err(ApiError::InvalidRequest("study id must not be empty".into()));
        }
        let url = self.url(&format!("/shipments/related-fields/{}", study_id));
        tracing::debug!(url = %url, "fetching related fields");
        let response = self.client.get(&url).send().map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn list_studies(&self) -> ApiResult<Vec<Study>> {
        let url = self.url("/studies");
        tracing::debug!(url = %url, "listing studies");
        let response = self.client.get(&url).send().map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }

    fn list_sites(&self, study_id: &str) -> ApiResult<Vec<Site>> {
        let url = self.url("/sites");
        tracing::debug!(url = %url, study = %study_id, "listing sites");
        let response = self
            .client
            .get(&url)
            .query(&[("study", study_id)])
            .send()
            .map_err(|e| self.send_error(e))?;
        self.read_json(response)
    }
}
