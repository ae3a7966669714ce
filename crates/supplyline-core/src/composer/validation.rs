//! Submit validation for the shipment form.

use thiserror::Error;

use crate::models::{RelatedFields, SelectType};

use super::ShipmentComposer;

/// Why a submission was refused. Checks run in form order and stop at
/// the first failure, so one submit attempt produces one message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a study")]
    MissingStudy,

    #[error("Please select a site")]
    MissingSite,

    #[error("Please select a shipment date")]
    MissingDate,

    #[error("Please select a type")]
    MissingSelectType,

    #[error("Please select at least one {}", .select_type.item_noun())]
    EmptySelection { select_type: SelectType },

    #[error("Please enter a quantity for {name}")]
    MissingQuantity { name: String },

    #[error("Quantity for {name} must be greater than zero")]
    ZeroQuantity { name: String },

    #[error("Quantity for {name} exceeds remaining stock ({requested} > {remaining})")]
    ExceedsStock {
        name: String,
        requested: u32,
        remaining: u32,
    },

    #[error("Please reselect the study to reload its items")]
    CandidatesUnavailable,
}

/// Check the whole form, stopping at the first failing rule.
pub(super) fn validate(composer: &ShipmentComposer) -> Result<(), ValidationError> {
    if composer.study.is_none() {
        return Err(ValidationError::MissingStudy);
    }
    if composer.site.is_none() {
        return Err(ValidationError::MissingSite);
    }
    if composer
        .shipment_date
        .as_deref()
        .map_or(true, |d| d.trim().is_empty())
    {
        return Err(ValidationError::MissingDate);
    }
    let select_type = composer
        .select_type
        .ok_or(ValidationError::MissingSelectType)?;
    if composer.selection.is_empty() {
        return Err(ValidationError::EmptySelection { select_type });
    }

    if select_type.uses_quantities() {
        let candidates = composer
            .candidates
            .as_ref()
            .ok_or(ValidationError::CandidatesUnavailable)?;
        check_selection_resolves(composer, candidates, select_type)?;
        check_quantities(composer, candidates, select_type)?;
    }
    Ok(())
}

/// Quantity rules need the stock snapshots, so every selected id must
/// resolve against the loaded candidates. Edit drafts sit in this state
/// until their related-fields fetch answers; a failed fetch leaves the
/// candidates empty and the draft unsubmittable rather than letting an
/// update go out with its quantities stripped.
fn check_selection_resolves(
    composer: &ShipmentComposer,
    candidates: &RelatedFields,
    select_type: SelectType,
) -> Result<(), ValidationError> {
    let resolved = match select_type {
        SelectType::Drug => composer
            .selection
            .ids()
            .iter()
            .all(|id| candidates.drugs.iter().any(|d| &d.id == id)),
        SelectType::DrugGroup => composer
            .selection
            .ids()
            .iter()
            .all(|id| candidates.find_group(id).is_some()),
        SelectType::Randomization => true,
    };
    if !resolved {
        return Err(ValidationError::CandidatesUnavailable);
    }
    Ok(())
}

/// Per-item quantity rules, walked in candidate-list order so the first
/// reported item is the first one on the form.
fn check_quantities(
    composer: &ShipmentComposer,
    candidates: &RelatedFields,
    select_type: SelectType,
) -> Result<(), ValidationError> {
    match select_type {
        SelectType::Drug => {
            for drug in &candidates.drugs {
                if !composer.selection.contains(&drug.id) {
                    continue;
                }
                check_one(composer, &drug.id, &drug.name, drug.remaining_quantity)?;
            }
        }
        SelectType::DrugGroup => {
            for group in &candidates.drug_groups {
                if !composer.selection.contains(&group.id) {
                    continue;
                }
                for drug in &group.drugs {
                    check_one(composer, &drug.id, &drug.name, drug.remaining_quantity)?;
                }
            }
        }
        SelectType::Randomization => {}
    }
    Ok(())
}

fn check_one(
    composer: &ShipmentComposer,
    drug_id: &str,
    name: &str,
    remaining: u32,
) -> Result<(), ValidationError> {
    match composer.quantities.get(drug_id) {
        None => Err(ValidationError::MissingQuantity { name: name.into() }),
        Some(0) => Err(ValidationError::ZeroQuantity { name: name.into() }),
        Some(&qty) if qty > remaining => Err(ValidationError::ExceedsStock {
            name: name.into(),
            requested: qty,
            remaining,
        }),
        Some(_) => Ok(()),
    }
}
