//! Selection state, one variant per item category.

use std::collections::BTreeSet;

use crate::models::SelectType;

/// What the user has picked for the active select type. Holding the
/// selection in a single enum makes cross-category picks
/// unrepresentable: switching category replaces the whole variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No select type chosen yet
    None,
    /// Checked drug ids
    Drugs(BTreeSet<String>),
    /// Checked group ids, plus which of them are expanded in the form.
    /// Expansion is view state only; collapsing never drops data.
    Groups {
        selected: BTreeSet<String>,
        expanded: BTreeSet<String>,
    },
    /// Checked randomization row ids
    Rows(BTreeSet<String>),
}

impl Selection {
    /// Empty selection for the given category.
    pub fn for_type(select_type: SelectType) -> Self {
        match select_type {
            SelectType::Drug => Selection::Drugs(BTreeSet::new()),
            SelectType::DrugGroup => Selection::Groups {
                selected: BTreeSet::new(),
                expanded: BTreeSet::new(),
            },
            SelectType::Randomization => Selection::Rows(BTreeSet::new()),
        }
    }

    /// Category this selection belongs to.
    pub fn kind(&self) -> Option<SelectType> {
        match self {
            Selection::None => None,
            Selection::Drugs(_) => Some(SelectType::Drug),
            Selection::Groups { .. } => Some(SelectType::DrugGroup),
            Selection::Rows(_) => Some(SelectType::Randomization),
        }
    }

    /// True when nothing is checked.
    pub fn is_empty(&self) -> bool {
        match self {
            Selection::None => true,
            Selection::Drugs(ids) => ids.is_empty(),
            Selection::Groups { selected, .. } => selected.is_empty(),
            Selection::Rows(ids) => ids.is_empty(),
        }
    }

    /// True when the given item id is checked.
    pub fn contains(&self, item_id: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::Drugs(ids) => ids.contains(item_id),
            Selection::Groups { selected, .. } => selected.contains(item_id),
            Selection::Rows(ids) => ids.contains(item_id),
        }
    }

    /// Checked ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        match self {
            Selection::None => Vec::new(),
            Selection::Drugs(ids) => ids.iter().cloned().collect(),
            Selection::Groups { selected, .. } => selected.iter().cloned().collect(),
            Selection::Rows(ids) => ids.iter().cloned().collect(),
        }
    }

    /// Drug set, when this is a drug selection.
    pub fn as_drugs_mut(&mut self) -> Option<&mut BTreeSet<String>> {
        match self {
            Selection::Drugs(ids) => Some(ids),
            _ => None,
        }
    }

    /// Selected and expanded group sets, when this is a group selection.
    pub fn as_groups_mut(&mut self) -> Option<(&mut BTreeSet<String>, &mut BTreeSet<String>)> {
        match self {
            Selection::Groups { selected, expanded } => Some((selected, expanded)),
            _ => None,
        }
    }

    /// Row set, when this is a randomization selection.
    pub fn as_rows_mut(&mut self) -> Option<&mut BTreeSet<String>> {
        match self {
            Selection::Rows(ids) => Some(ids),
            _ => None,
        }
    }

    /// Expanded group ids, empty for other variants.
    pub fn expanded_ids(&self) -> Vec<String> {
        match self {
            Selection::Groups { expanded, .. } => expanded.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
