//! Supplyline Core Library
//!
//! Shipment composition and acknowledgment tracking for clinical-trial
//! drug supply consoles.
//!
//! # Architecture
//!
//! ```text
//! Study picker → Related fields → Type → Items + quantities
//!                                            │
//!                            [STAGING: shipment composer]
//!                                            │
//!                               validate (first failing rule)
//!                                            │
//!                            ┌───────────────▼───────────────┐
//!                            │  POST /shipments   (create)   │
//!                            │  PUT  /shipments/:id (edit)   │
//!                            └───────────────┬───────────────┘
//!                                            │
//!                          site reconciles → acknowledgments
//!                                            │
//!                                  Acknowledgment tables
//!                            (Drug / DrugGroup / Randomization)
//! ```
//!
//! # Core Principle
//!
//! **The backend owns the quantity ledger.** The composer checks entered
//! quantities against the stock snapshot it fetched; the server
//! re-validates every submission and stays the final authority.
//!
//! # Modules
//!
//! - [`models`]: Wire types (Study, Drug, Shipment, Acknowledgment, etc.)
//! - [`composer`]: Shipment form state machine with submit validation
//! - [`viewer`]: Acknowledgment table shaping and status badges

pub mod composer;
pub mod models;
pub mod viewer;

// Re-export commonly used types
pub use composer::{
    ComposerError, ComposerResult, ComposerSnapshot, RelatedRequest, Selection,
    ShipmentComposer, Submission, SubmitTarget, Transition, ValidationError,
};
pub use models::{
    AckStatus, AcknowledgePayload, Acknowledgment, Drug, DrugGroup, ExcelRow, Pagination,
    RelatedFields, SelectType, Shipment, ShipmentPage, ShipmentPayload, ShipmentQuery, Site,
    Study,
};
pub use viewer::{badge_for, AcknowledgmentView, BadgeColor};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SupplylineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation not allowed: {0}")]
    OperationNotAllowed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State error: {0}")]
    StateError(String),
}

impl From<ComposerError> for SupplylineError {
    fn from(e: ComposerError) -> Self {
        SupplylineError::OperationNotAllowed(e.to_string())
    }
}

impl From<ValidationError> for SupplylineError {
    fn from(e: ValidationError) -> Self {
        SupplylineError::ValidationFailed(e.to_string())
    }
}

impl From<serde_json::Error> for SupplylineError {
    fn from(e: serde_json::Error) -> Self {
        SupplylineError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for SupplylineError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        SupplylineError::StateError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Start composing a new shipment.
#[uniffi::export]
pub fn new_composer() -> Arc<ComposerSession> {
    Arc::new(ComposerSession {
        inner: Mutex::new(ShipmentComposer::new()),
    })
}

/// Start editing an existing shipment, passed as the JSON body the
/// detail endpoint returned. Fails for acknowledged shipments.
#[uniffi::export]
pub fn composer_for_edit(shipment_json: String) -> Result<Arc<ComposerSession>, SupplylineError> {
    let shipment: Shipment = serde_json::from_str(&shipment_json)?;
    let (composer, _fetch) = ShipmentComposer::for_edit(&shipment)?;
    Ok(Arc::new(ComposerSession {
        inner: Mutex::new(composer),
    }))
}

/// Build the acknowledgment table for a shipment detail JSON body.
/// Returns `None` when the shipment has no acknowledgment entries.
#[uniffi::export]
pub fn acknowledgment_view_json(
    shipment_json: String,
    headers: Vec<String>,
) -> Result<Option<String>, SupplylineError> {
    let shipment: Shipment = serde_json::from_str(&shipment_json)?;
    match AcknowledgmentView::build(&shipment, &headers) {
        Some(view) => Ok(Some(view.to_json()?)),
        None => Ok(None),
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe composer wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ComposerSession {
    inner: Mutex<ShipmentComposer>,
}

#[uniffi::export]
impl ComposerSession {
    // =====================================================================
    // Study and Related Fields
    // =====================================================================

    /// Pick a study. Resets the whole form and returns the
    /// related-fields fetch the shell must issue.
    pub fn select_study(&self, study_id: String) -> Result<FfiRelatedRequest, SupplylineError> {
        let mut composer = self.inner.lock()?;
        match composer.select_study(&study_id)? {
            Transition::StudySelected { fetch } => Ok(fetch.into()),
            other => Err(SupplylineError::StateError(format!(
                "unexpected transition: {:?}",
                other
            ))),
        }
    }

    /// The fetch for the currently selected study, if any. Used after
    /// `composer_for_edit` to load candidates for the seeded study.
    pub fn related_request(&self) -> Result<Option<FfiRelatedRequest>, SupplylineError> {
        let composer = self.inner.lock()?;
        Ok(composer.study().map(|study_id| FfiRelatedRequest {
            study_id: study_id.to_string(),
            generation: composer.generation(),
        }))
    }

    /// Install a related-fields response body. Stale responses are
    /// discarded and reported as such.
    pub fn apply_related_fields(
        &self,
        generation: u64,
        fields_json: String,
    ) -> Result<FfiTransition, SupplylineError> {
        let fields: RelatedFields = serde_json::from_str(&fields_json)?;
        let mut composer = self.inner.lock()?;
        Ok(composer.apply_related_fields(generation, fields).into())
    }

    /// Record a failed related-fields fetch.
    pub fn apply_related_failure(
        &self,
        generation: u64,
        message: String,
    ) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.apply_related_failure(generation, &message).into())
    }

    // =====================================================================
    // Form Fields
    // =====================================================================

    /// Pick the destination site.
    pub fn select_site(&self, site_id: String) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.select_site(&site_id)?.into())
    }

    /// Enter the shipment date. An empty string clears it.
    pub fn set_shipment_date(&self, date: String) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.set_shipment_date(&date)?.into())
    }

    /// Pick the item category by its wire name.
    pub fn select_type(&self, select_type: String) -> Result<FfiTransition, SupplylineError> {
        let parsed = SelectType::parse(&select_type).ok_or_else(|| {
            SupplylineError::InvalidInput(format!("unknown select type: {}", select_type))
        })?;
        let mut composer = self.inner.lock()?;
        Ok(composer.select_type(parsed)?.into())
    }

    // =====================================================================
    // Item Selection
    // =====================================================================

    /// Check or uncheck a drug.
    pub fn toggle_drug(&self, drug_id: String) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.toggle_drug(&drug_id)?.into())
    }

    /// Check or uncheck a group.
    pub fn set_group_selected(
        &self,
        group_id: String,
        selected: bool,
    ) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.set_group_selected(&group_id, selected)?.into())
    }

    /// Expand or collapse a selected group.
    pub fn set_group_expanded(
        &self,
        group_id: String,
        expanded: bool,
    ) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.set_group_expanded(&group_id, expanded)?.into())
    }

    /// Check or uncheck a randomization row.
    pub fn toggle_row(&self, row_id: String) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.toggle_row(&row_id)?.into())
    }

    // =====================================================================
    // Quantities
    // =====================================================================

    /// Enter a quantity for a selected drug.
    pub fn set_quantity(&self, item_id: String, quantity: u32) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.set_quantity(&item_id, quantity)?.into())
    }

    /// Empty a quantity input.
    pub fn clear_quantity(&self, item_id: String) -> Result<FfiTransition, SupplylineError> {
        let mut composer = self.inner.lock()?;
        Ok(composer.clear_quantity(&item_id)?.into())
    }

    // =====================================================================
    // Submission and State
    // =====================================================================

    /// Validate the form and produce the request to send. The error
    /// carries the first failing rule's message, ready for a toast.
    pub fn build_submission(&self) -> Result<FfiSubmission, SupplylineError> {
        let composer = self.inner.lock()?;
        let submission = composer.build_submission()?;
        let payload_json = serde_json::to_string(&submission.payload)?;
        let (target_kind, shipment_id) = match submission.target {
            SubmitTarget::Create => ("create".to_string(), None),
            SubmitTarget::Update(id) => ("update".to_string(), Some(id)),
        };
        Ok(FfiSubmission {
            target_kind,
            shipment_id,
            payload_json,
        })
    }

    /// Full form state as JSON, for rendering.
    pub fn snapshot_json(&self) -> Result<String, SupplylineError> {
        let composer = self.inner.lock()?;
        Ok(serde_json::to_string(&composer.snapshot())?)
    }

    /// True until a study is selected.
    pub fn is_locked(&self) -> Result<bool, SupplylineError> {
        let composer = self.inner.lock()?;
        Ok(composer.is_locked())
    }

    /// Draft identity for logging.
    pub fn draft_id(&self) -> Result<String, SupplylineError> {
        let composer = self.inner.lock()?;
        Ok(composer.draft_id().to_string())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe related-fields fetch instruction.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRelatedRequest {
    pub study_id: String,
    pub generation: u64,
}

impl From<RelatedRequest> for FfiRelatedRequest {
    fn from(fetch: RelatedRequest) -> Self {
        Self {
            study_id: fetch.study_id,
            generation: fetch.generation,
        }
    }
}

/// FFI-safe transition report. `kind` carries the variant name; the
/// optional fields are present for the variants that produce them.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTransition {
    pub kind: String,
    pub fetch: Option<FfiRelatedRequest>,
    pub message: Option<String>,
    pub over_stock: Option<bool>,
}

impl From<Transition> for FfiTransition {
    fn from(transition: Transition) -> Self {
        let kind = transition_kind(&transition).to_string();
        let mut ffi = Self {
            kind,
            fetch: None,
            message: None,
            over_stock: None,
        };
        match transition {
            Transition::StudySelected { fetch } => ffi.fetch = Some(fetch.into()),
            Transition::RelatedUnavailable { message, .. } => ffi.message = Some(message),
            Transition::QuantitySet { over_stock, .. } => ffi.over_stock = Some(over_stock),
            _ => {}
        }
        ffi
    }
}

fn transition_kind(transition: &Transition) -> &'static str {
    match transition {
        Transition::StudySelected { .. } => "StudySelected",
        Transition::RelatedLoaded { .. } => "RelatedLoaded",
        Transition::RelatedUnavailable { .. } => "RelatedUnavailable",
        Transition::StaleRelatedDiscarded { .. } => "StaleRelatedDiscarded",
        Transition::SiteSelected { .. } => "SiteSelected",
        Transition::DateSet { .. } => "DateSet",
        Transition::TypeSelected { .. } => "TypeSelected",
        Transition::DrugToggled { .. } => "DrugToggled",
        Transition::GroupToggled { .. } => "GroupToggled",
        Transition::GroupExpansion { .. } => "GroupExpansion",
        Transition::RowToggled { .. } => "RowToggled",
        Transition::QuantitySet { .. } => "QuantitySet",
        Transition::QuantityCleared { .. } => "QuantityCleared",
    }
}

/// FFI-safe submission: where to send it and the JSON body to send.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub target_kind: String,
    pub shipment_id: Option<String>,
    pub payload_json: String,
}
