//! Shipment composition state machine.
//!
//! Flow: study → related fields → type → items and quantities → submit

mod selection;
mod validation;

pub use selection::*;
pub use validation::*;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::{RelatedFields, SelectType, Shipment, ShipmentPayload};

/// Composer errors: operations attempted out of order or against items
/// the current study does not offer. Shells disable the matching
/// controls; the core still refuses the operation explicitly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposerError {
    #[error("study id must not be empty")]
    EmptyStudyId,

    #[error("no study selected")]
    NoStudy,

    #[error("related fields not loaded yet")]
    CandidatesNotLoaded,

    #[error("no select type chosen")]
    NoSelectType,

    #[error("operation applies to {expected} shipments, current type is {actual}")]
    WrongSelectType {
        expected: SelectType,
        actual: SelectType,
    },

    #[error("randomization shipments do not carry quantities")]
    QuantitiesNotApplicable,

    #[error("unknown site: {0}")]
    UnknownSite(String),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("group {0} is not selected")]
    GroupNotSelected(String),

    #[error("shipment {0} is acknowledged and can no longer be edited")]
    AlreadyAcknowledged(String),
}

pub type ComposerResult<T> = Result<T, ComposerError>;

/// Instruction to fetch related fields for a study. The generation tags
/// the response so answers to superseded requests can be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedRequest {
    /// Study to fetch candidates for
    pub study_id: String,
    /// Composer generation at request time
    pub generation: u64,
}

/// What a composer operation did. Every state change surfaces as one of
/// these so the shell can render notifications without the core knowing
/// about toasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Study picked; the caller should issue the enclosed fetch
    StudySelected { fetch: RelatedRequest },
    /// Candidates installed for the current study
    RelatedLoaded { study_id: String },
    /// Candidate fetch failed; empty candidates installed
    RelatedUnavailable { study_id: String, message: String },
    /// A response for a superseded study arrived and was ignored
    StaleRelatedDiscarded { study_id: String, generation: u64 },
    /// Destination site picked
    SiteSelected { site_id: String },
    /// Shipment date entered
    DateSet { date: String },
    /// Item category picked; all selections and quantities cleared
    TypeSelected { select_type: SelectType },
    /// Drug checked or unchecked
    DrugToggled { drug_id: String, selected: bool },
    /// Group checked or unchecked
    GroupToggled { group_id: String, selected: bool },
    /// Group expanded or collapsed; quantities untouched either way
    GroupExpansion { group_id: String, expanded: bool },
    /// Randomization row checked or unchecked
    RowToggled { row_id: String, selected: bool },
    /// Quantity entered; `over_stock` flags a value above the snapshot
    QuantitySet {
        item_id: String,
        quantity: u32,
        over_stock: bool,
    },
    /// Quantity input emptied
    QuantityCleared { item_id: String },
}

/// Where a successful submission goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    /// New shipment
    Create,
    /// Update of an existing shipment
    Update(String),
}

/// A validated submission, ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Create or update
    pub target: SubmitTarget,
    /// Request body
    pub payload: ShipmentPayload,
}

/// Serializable view of the composer for rendering.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComposerSnapshot {
    /// Draft identity for logging and shell correlation
    pub draft_id: String,
    /// Shipment id when editing, absent for a new shipment
    pub editing: Option<String>,
    /// Selected study id
    pub study: Option<String>,
    /// Selected site id
    pub site: Option<String>,
    /// Entered shipment date
    pub shipment_date: Option<String>,
    /// Active item category
    pub select_type: Option<SelectType>,
    /// Checked item ids for the active category
    pub selected_items: Vec<String>,
    /// Expanded group ids (group category only)
    pub expanded_groups: Vec<String>,
    /// Entered quantities
    pub quantities: BTreeMap<String, u32>,
    /// Item ids whose entered quantity exceeds the stock snapshot
    pub over_stock: Vec<String>,
    /// Candidates for the selected study, when loaded
    pub candidates: Option<RelatedFields>,
    /// True until a study is selected; the form is inert while locked
    pub locked: bool,
    /// Last mutation timestamp
    pub updated_at: String,
}

/// Mutable staging area for one shipment form. All mutations go through
/// transition methods; each returns the `Transition` it performed or a
/// `ComposerError` when the operation is not available in the current
/// state.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentComposer {
    /// Draft identity, client-generated
    draft_id: String,
    /// Shipment id when editing an existing record
    editing: Option<String>,
    /// Selected study id
    study: Option<String>,
    /// Selected site id
    site: Option<String>,
    /// Entered shipment date
    shipment_date: Option<String>,
    /// Active item category
    select_type: Option<SelectType>,
    /// Checked items for the active category
    selection: Selection,
    /// Entered quantity per drug id
    quantities: BTreeMap<String, u32>,
    /// Candidates for the selected study
    candidates: Option<RelatedFields>,
    /// Bumped on every study change; tags related-fields requests
    generation: u64,
    /// Creation timestamp
    created_at: String,
    /// Last mutation timestamp
    updated_at: String,
}

impl ShipmentComposer {
    /// Fresh form with nothing selected.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            draft_id: uuid::Uuid::new_v4().to_string(),
            editing: None,
            study: None,
            site: None,
            shipment_date: None,
            select_type: None,
            selection: Selection::None,
            quantities: BTreeMap::new(),
            candidates: None,
            generation: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Form seeded from an existing shipment, plus the candidate fetch
    /// the caller must issue before the form is interactive.
    /// Acknowledged shipments are closed to editing.
    pub fn for_edit(shipment: &Shipment) -> ComposerResult<(Self, RelatedRequest)> {
        if shipment.is_acknowledged {
            return Err(ComposerError::AlreadyAcknowledged(shipment.id.clone()));
        }
        if shipment.study.is_empty() {
            return Err(ComposerError::EmptyStudyId);
        }

        let mut composer = Self::new();
        composer.editing = Some(shipment.id.clone());
        composer.study = Some(shipment.study.clone());
        composer.site = Some(shipment.site_number.clone()).filter(|s| !s.is_empty());
        composer.shipment_date =
            Some(shipment.shipment_date.clone()).filter(|d| !d.is_empty());
        composer.select_type = Some(shipment.select_type);

        composer.selection = match shipment.select_type {
            SelectType::Drug => Selection::Drugs(shipment.drug.iter().cloned().collect()),
            SelectType::DrugGroup => Selection::Groups {
                selected: shipment.group_name.iter().cloned().collect(),
                expanded: BTreeSet::new(),
            },
            SelectType::Randomization => {
                Selection::Rows(shipment.excel_rows.iter().cloned().collect())
            }
        };
        composer.quantities = shipment.quantities.clone();
        composer.generation = 1;

        let fetch = RelatedRequest {
            study_id: shipment.study.clone(),
            generation: composer.generation,
        };
        Ok((composer, fetch))
    }

    /// Pick a study. Always a wholesale reset: site, date, type,
    /// selections and quantities are cleared and a fresh candidate
    /// fetch is requested, even when the same study is picked again.
    pub fn select_study(&mut self, study_id: &str) -> ComposerResult<Transition> {
        if study_id.trim().is_empty() {
            return Err(ComposerError::EmptyStudyId);
        }
        self.study = Some(study_id.to_string());
        self.site = None;
        self.shipment_date = None;
        self.select_type = None;
        self.selection = Selection::None;
        self.quantities.clear();
        self.candidates = None;
        self.generation += 1;
        self.touch();

        Ok(Transition::StudySelected {
            fetch: RelatedRequest {
                study_id: study_id.to_string(),
                generation: self.generation,
            },
        })
    }

    /// Install a related-fields response. Responses tagged with a
    /// superseded generation are discarded untouched.
    pub fn apply_related_fields(&mut self, generation: u64, fields: RelatedFields) -> Transition {
        let Some(study_id) = self.study.clone() else {
            return Transition::StaleRelatedDiscarded {
                study_id: String::new(),
                generation,
            };
        };
        if generation != self.generation {
            return Transition::StaleRelatedDiscarded {
                study_id,
                generation,
            };
        }
        self.candidates = Some(fields);
        self.touch();
        Transition::RelatedLoaded { study_id }
    }

    /// Record a failed related-fields fetch. The current generation
    /// gets empty candidates so the form renders an empty state; stale
    /// failures are discarded like stale successes.
    pub fn apply_related_failure(&mut self, generation: u64, message: &str) -> Transition {
        let Some(study_id) = self.study.clone() else {
            return Transition::StaleRelatedDiscarded {
                study_id: String::new(),
                generation,
            };
        };
        if generation != self.generation {
            return Transition::StaleRelatedDiscarded {
                study_id,
                generation,
            };
        }
        self.candidates = Some(RelatedFields::default());
        self.touch();
        Transition::RelatedUnavailable {
            study_id,
            message: message.to_string(),
        }
    }

    /// Pick the destination site from the loaded candidates.
    pub fn select_site(&mut self, site_id: &str) -> ComposerResult<Transition> {
        let candidates = self.require_candidates()?;
        if !candidates.sites.iter().any(|s| s.id == site_id) {
            return Err(ComposerError::UnknownSite(site_id.to_string()));
        }
        self.site = Some(site_id.to_string());
        self.touch();
        Ok(Transition::SiteSelected {
            site_id: site_id.to_string(),
        })
    }

    /// Enter the shipment date. An empty string clears it.
    pub fn set_shipment_date(&mut self, date: &str) -> ComposerResult<Transition> {
        if self.study.is_none() {
            return Err(ComposerError::NoStudy);
        }
        self.shipment_date = Some(date.to_string()).filter(|d| !d.trim().is_empty());
        self.touch();
        Ok(Transition::DateSet {
            date: date.to_string(),
        })
    }

    /// Pick the item category. Clears every selection and quantity,
    /// also when re-picking the current category.
    pub fn select_type(&mut self, select_type: SelectType) -> ComposerResult<Transition> {
        self.require_candidates()?;
        self.select_type = Some(select_type);
        self.selection = Selection::for_type(select_type);
        self.quantities.clear();
        self.touch();
        Ok(Transition::TypeSelected { select_type })
    }

    /// Check or uncheck a drug. Unchecking drops its quantity.
    pub fn toggle_drug(&mut self, drug_id: &str) -> ComposerResult<Transition> {
        self.require_type(SelectType::Drug)?;
        let known = self
            .candidates
            .as_ref()
            .map_or(false, |c| c.drugs.iter().any(|d| d.id == drug_id));
        if !known {
            return Err(ComposerError::UnknownItem(drug_id.to_string()));
        }

        let selected = match self.selection.as_drugs_mut() {
            Some(ids) => {
                if ids.remove(drug_id) {
                    false
                } else {
                    ids.insert(drug_id.to_string());
                    true
                }
            }
            None => return Err(ComposerError::NoSelectType),
        };
        if !selected {
            self.quantities.remove(drug_id);
        }
        self.touch();
        Ok(Transition::DrugToggled {
            drug_id: drug_id.to_string(),
            selected,
        })
    }

    /// Check or uncheck a group. Checking expands it so its member
    /// inputs show; unchecking drops member quantities, except for
    /// drugs another selected group still carries.
    /// Unchecking is the transition that destroys data, not collapsing.
    pub fn set_group_selected(
        &mut self,
        group_id: &str,
        selected: bool,
    ) -> ComposerResult<Transition> {
        self.require_type(SelectType::DrugGroup)?;
        let member_ids: Vec<String> = match self.candidates.as_ref().and_then(|c| c.find_group(group_id)) {
            Some(group) => group.drug_ids(),
            None => return Err(ComposerError::UnknownItem(group_id.to_string())),
        };

        let Some((selected_set, expanded_set)) = self.selection.as_groups_mut() else {
            return Err(ComposerError::NoSelectType);
        };
        if selected {
            selected_set.insert(group_id.to_string());
            expanded_set.insert(group_id.to_string());
        } else {
            selected_set.remove(group_id);
            expanded_set.remove(group_id);
            let retained = self.reachable_quantity_ids();
            for id in member_ids.iter().filter(|id| !retained.contains(*id)) {
                self.quantities.remove(id);
            }
        }
        self.touch();
        Ok(Transition::GroupToggled {
            group_id: group_id.to_string(),
            selected,
        })
    }

    /// Expand or collapse a selected group. View state only: member
    /// quantities survive a collapse and still reach the submission.
    pub fn set_group_expanded(
        &mut self,
        group_id: &str,
        expanded: bool,
    ) -> ComposerResult<Transition> {
        self.require_type(SelectType::DrugGroup)?;
        let Some((selected_set, expanded_set)) = self.selection.as_groups_mut() else {
            return Err(ComposerError::NoSelectType);
        };
        if !selected_set.contains(group_id) {
            return Err(ComposerError::GroupNotSelected(group_id.to_string()));
        }
        if expanded {
            expanded_set.insert(group_id.to_string());
        } else {
            expanded_set.remove(group_id);
        }
        self.touch();
        Ok(Transition::GroupExpansion {
            group_id: group_id.to_string(),
            expanded,
        })
    }

    /// Check or uncheck a randomization row.
    pub fn toggle_row(&mut self, row_id: &str) -> ComposerResult<Transition> {
        self.require_type(SelectType::Randomization)?;
        let known = self
            .candidates
            .as_ref()
            .map_or(false, |c| c.find_row(row_id).is_some());
        if !known {
            return Err(ComposerError::UnknownItem(row_id.to_string()));
        }

        let selected = match self.selection.as_rows_mut() {
            Some(ids) => {
                if ids.remove(row_id) {
                    false
                } else {
                    ids.insert(row_id.to_string());
                    true
                }
            }
            None => return Err(ComposerError::NoSelectType),
        };
        self.touch();
        Ok(Transition::RowToggled {
            row_id: row_id.to_string(),
            selected,
        })
    }

    /// Enter a quantity for a selected drug. Values above the stock
    /// snapshot are accepted and flagged; submit is where they block.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> ComposerResult<Transition> {
        self.require_quantity_type()?;
        if !self.reachable_quantity_ids().contains(item_id) {
            return Err(ComposerError::UnknownItem(item_id.to_string()));
        }
        let over_stock = self
            .candidates
            .as_ref()
            .and_then(|c| c.find_drug(item_id))
            .map_or(false, |d| quantity > d.remaining_quantity);
        self.quantities.insert(item_id.to_string(), quantity);
        self.touch();
        Ok(Transition::QuantitySet {
            item_id: item_id.to_string(),
            quantity,
            over_stock,
        })
    }

    /// Empty a quantity input. Distinct from entering zero: a cleared
    /// input fails submit as missing, a zero as invalid.
    pub fn clear_quantity(&mut self, item_id: &str) -> ComposerResult<Transition> {
        self.require_quantity_type()?;
        self.quantities.remove(item_id);
        self.touch();
        Ok(Transition::QuantityCleared {
            item_id: item_id.to_string(),
        })
    }

    /// Validate the whole form and produce the wire payload. Stops at
    /// the first failing rule; nothing is produced on failure, so no
    /// request can be issued from an invalid form.
    pub fn build_submission(&self) -> Result<Submission, ValidationError> {
        validation::validate(self)?;

        let select_type = self
            .select_type
            .ok_or(ValidationError::MissingSelectType)?;
        let reachable = self.reachable_quantity_ids();
        let quantities: BTreeMap<String, u32> = self
            .quantities
            .iter()
            .filter(|(id, _)| reachable.contains(id.as_str()))
            .map(|(id, qty)| (id.clone(), *qty))
            .collect();

        let mut payload = ShipmentPayload {
            study: self.study.clone().ok_or(ValidationError::MissingStudy)?,
            site_number: self.site.clone().ok_or(ValidationError::MissingSite)?,
            shipment_date: self
                .shipment_date
                .clone()
                .ok_or(ValidationError::MissingDate)?,
            select_type,
            drug: Vec::new(),
            group_name: Vec::new(),
            excel_rows: Vec::new(),
            quantities,
        };
        match select_type {
            SelectType::Drug => payload.drug = self.selection.ids(),
            SelectType::DrugGroup => payload.group_name = self.selection.ids(),
            SelectType::Randomization => {
                payload.excel_rows = self.selection.ids();
                payload.quantities.clear();
            }
        }

        let target = match &self.editing {
            Some(id) => SubmitTarget::Update(id.clone()),
            None => SubmitTarget::Create,
        };
        Ok(Submission { target, payload })
    }

    /// Serializable view for rendering.
    pub fn snapshot(&self) -> ComposerSnapshot {
        ComposerSnapshot {
            draft_id: self.draft_id.clone(),
            editing: self.editing.clone(),
            study: self.study.clone(),
            site: self.site.clone(),
            shipment_date: self.shipment_date.clone(),
            select_type: self.select_type,
            selected_items: self.selection.ids(),
            expanded_groups: self.selection.expanded_ids(),
            quantities: self.quantities.clone(),
            over_stock: self.over_stock_items(),
            candidates: self.candidates.clone(),
            locked: self.is_locked(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Drug ids whose entered quantity exceeds the stock snapshot.
    pub fn over_stock_items(&self) -> Vec<String> {
        let Some(candidates) = &self.candidates else {
            return Vec::new();
        };
        self.quantities
            .iter()
            .filter(|(id, qty)| {
                candidates
                    .find_drug(id)
                    .map_or(false, |d| **qty > d.remaining_quantity)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// True until a study is selected. A locked form rejects every
    /// site, date, type and item operation.
    pub fn is_locked(&self) -> bool {
        self.study.is_none()
    }

    /// Draft identity.
    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    /// Shipment id under edit, if any.
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Selected study id.
    pub fn study(&self) -> Option<&str> {
        self.study.as_deref()
    }

    /// Selected site id.
    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    /// Entered shipment date.
    pub fn shipment_date(&self) -> Option<&str> {
        self.shipment_date.as_deref()
    }

    /// Active item category.
    pub fn current_type(&self) -> Option<SelectType> {
        self.select_type
    }

    /// Current selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Entered quantities.
    pub fn quantities(&self) -> &BTreeMap<String, u32> {
        &self.quantities
    }

    /// Loaded candidates, if any.
    pub fn candidates(&self) -> Option<&RelatedFields> {
        self.candidates.as_ref()
    }

    /// Current related-fields generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drug ids a quantity may target: checked drugs, or members of
    /// checked groups whether expanded or collapsed.
    fn reachable_quantity_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        match &self.selection {
            Selection::Drugs(selected) => ids.extend(selected.iter().cloned()),
            Selection::Groups { selected, .. } => {
                if let Some(candidates) = &self.candidates {
                    for group_id in selected {
                        if let Some(group) = candidates.find_group(group_id) {
                            ids.extend(group.drug_ids());
                        }
                    }
                }
            }
            Selection::None | Selection::Rows(_) => {}
        }
        ids
    }

    fn require_candidates(&self) -> ComposerResult<&RelatedFields> {
        if self.study.is_none() {
            return Err(ComposerError::NoStudy);
        }
        self.candidates
            .as_ref()
            .ok_or(ComposerError::CandidatesNotLoaded)
    }

    fn require_type(&self, expected: SelectType) -> ComposerResult<()> {
        self.require_candidates()?;
        match self.select_type {
            None => Err(ComposerError::NoSelectType),
            Some(actual) if actual != expected => {
                Err(ComposerError::WrongSelectType { expected, actual })
            }
            Some(_) => Ok(()),
        }
    }

    fn require_quantity_type(&self) -> ComposerResult<()> {
        match self.select_type {
            None => Err(ComposerError::NoSelectType),
            Some(t) if !t.uses_quantities() => Err(ComposerError::QuantitiesNotApplicable),
            Some(_) => Ok(()),
        }
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for ShipmentComposer {
    fn default() -> Self {
        Self::new()
    }
}
