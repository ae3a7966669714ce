//! Orchestration of the shipment form against the backend.

use thiserror::Error;

use supplyline_core::composer::{
    ComposerError, RelatedRequest, ShipmentComposer, SubmitTarget, Transition, ValidationError,
};
use supplyline_core::models::{
    AcknowledgePayload, SelectType, Shipment, ShipmentPage, ShipmentQuery, Site, Study,
};
use supplyline_core::viewer::AcknowledgmentView;

use crate::client::ShipmentApi;
use crate::error::ApiError;

/// Console-level errors. Validation and backend messages display
/// verbatim so the shell can toast them unchanged.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Composer(#[from] ComposerError),

    #[error("{0}")]
    Api(#[from] ApiError),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Shipment),
    Updated(Shipment),
}

/// One admin screen's worth of state: the shipment form plus the
/// backend calls it needs. Generic over [`ShipmentApi`] so flows can be
/// tested against [`MockApi`](crate::mock::MockApi).
pub struct ShipmentConsole<C: ShipmentApi> {
    client: C,
    composer: ShipmentComposer,
}

impl<C: ShipmentApi> ShipmentConsole<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            composer: ShipmentComposer::new(),
        }
    }

    /// The form under composition.
    pub fn composer(&self) -> &ShipmentComposer {
        &self.composer
    }

    /// Mutable form access for edits that need no backend call.
    pub fn composer_mut(&mut self) -> &mut ShipmentComposer {
        &mut self.composer
    }

    /// The backend client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Drop the current draft and start a new one.
    pub fn start_new(&mut self) {
        self.composer = ShipmentComposer::new();
    }

    /// Pick a study: reset the form, then fetch and install its related
    /// fields. A failed fetch leaves the form usable with empty
    /// candidates and reports `RelatedUnavailable`.
    pub fn change_study(&mut self, study_id: &str) -> ConsoleResult<Transition> {
        let transition = self.composer.select_study(study_id)?;
        let Transition::StudySelected { fetch } = transition else {
            return Ok(transition);
        };
        Ok(self.run_fetch(fetch))
    }

    /// Load an existing shipment into the form. Refuses acknowledged
    /// shipments.
    pub fn edit(&mut self, shipment_id: &str) -> ConsoleResult<Transition> {
        let shipment = self.client.get_shipment(shipment_id)?;
        let (composer, fetch) = ShipmentComposer::for_edit(&shipment)?;
        self.composer = composer;
        Ok(self.run_fetch(fetch))
    }

    /// Validate and send the current form. On success the draft is
    /// replaced with a fresh one; on failure the form stays intact.
    pub fn submit(&mut self) -> ConsoleResult<SubmitOutcome> {
        let submission = self.composer.build_submission()?;
        let outcome = match &submission.target {
            SubmitTarget::Create => {
                let saved = self.client.create_shipment(&submission.payload)?;
                tracing::info!(shipment = %saved.id, "shipment created");
                SubmitOutcome::Created(saved)
            }
            SubmitTarget::Update(id) => {
                let saved = self.client.update_shipment(id, &submission.payload)?;
                tracing::info!(shipment = %saved.id, "shipment updated");
                SubmitOutcome::Updated(saved)
            }
        };
        self.start_new();
        Ok(outcome)
    }

    /// One page of the shipment roster.
    pub fn roster(&self, query: &ShipmentQuery) -> ConsoleResult<ShipmentPage> {
        Ok(self.client.list_shipments(query)?)
    }

    /// Delete a shipment.
    pub fn delete(&self, shipment_id: &str) -> ConsoleResult<()> {
        self.client.delete_shipment(shipment_id)?;
        Ok(())
    }

    /// Record a site's reconciliation of a shipment.
    pub fn acknowledge(
        &self,
        shipment_id: &str,
        payload: &AcknowledgePayload,
    ) -> ConsoleResult<Shipment> {
        Ok(self.client.acknowledge_shipment(shipment_id, payload)?)
    }

    /// Fetch a shipment and shape its acknowledgment table. `None` when
    /// the shipment has no acknowledgment entries.
    pub fn acknowledgment_view(
        &self,
        shipment_id: &str,
    ) -> ConsoleResult<Option<AcknowledgmentView>> {
        let shipment = self.client.get_shipment(shipment_id)?;
        let headers = self.headers_for(&shipment);
        Ok(AcknowledgmentView::build(&shipment, &headers))
    }

    /// Studies for the study dropdown.
    pub fn studies(&self) -> ConsoleResult<Vec<Study>> {
        Ok(self.client.list_studies()?)
    }

    /// Sites for the site dropdown, scoped to a study.
    pub fn sites(&self, study_id: &str) -> ConsoleResult<Vec<Site>> {
        Ok(self.client.list_sites(study_id)?)
    }

    fn run_fetch(&mut self, fetch: RelatedRequest) -> Transition {
        match self.client.related_fields(&fetch.study_id) {
            Ok(fields) => self.composer.apply_related_fields(fetch.generation, fields),
            Err(e) => {
                tracing::warn!(study = %fetch.study_id, "related-fields fetch failed: {e}");
                self.composer
                    .apply_related_failure(fetch.generation, &e.to_string())
            }
        }
    }

    // Randomization tables format row data in header order; the headers
    // live in the study's related fields. Other shapes need none, and a
    // failed lookup falls back to the rows' own field order.
    fn headers_for(&self, shipment: &Shipment) -> Vec<String> {
        if shipment.select_type != SelectType::Randomization || shipment.study.is_empty() {
            return Vec::new();
        }
        match self.client.related_fields(&shipment.study) {
            Ok(fields) => fields.headers,
            Err(e) => {
                tracing::warn!(study = %shipment.study, "header lookup failed: {e}");
                Vec::new()
            }
        }
    }
}
