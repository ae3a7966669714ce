//! Status badge colors for acknowledgment tables.

use serde::{Deserialize, Serialize};

use crate::models::{AckStatus, SelectType};

/// Badge color rendered next to an acknowledgment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Yellow,
    Red,
    Orange,
    Gray,
}

impl BadgeColor {
    /// Color name for the shell's badge styling.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Yellow => "yellow",
            BadgeColor::Red => "red",
            BadgeColor::Orange => "orange",
            BadgeColor::Gray => "gray",
        }
    }
}

/// Map a status to its badge color for the given table shape. Only the
/// randomization table has an orange mapping for damaged; the drug and
/// group tables fall through to gray for it.
pub fn badge_for(status: AckStatus, select_type: SelectType) -> BadgeColor {
    match status {
        AckStatus::Received => BadgeColor::Green,
        AckStatus::Partial => BadgeColor::Yellow,
        AckStatus::Missing => BadgeColor::Red,
        AckStatus::Damaged if select_type == SelectType::Randomization => BadgeColor::Orange,
        AckStatus::Damaged => BadgeColor::Gray,
        AckStatus::Pending | AckStatus::Unknown => BadgeColor::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_statuses_same_in_every_table() {
        for t in SelectType::ALL {
            assert_eq!(badge_for(AckStatus::Received, t), BadgeColor::Green);
            assert_eq!(badge_for(AckStatus::Partial, t), BadgeColor::Yellow);
            assert_eq!(badge_for(AckStatus::Missing, t), BadgeColor::Red);
            assert_eq!(badge_for(AckStatus::Pending, t), BadgeColor::Gray);
            assert_eq!(badge_for(AckStatus::Unknown, t), BadgeColor::Gray);
        }
    }

    #[test]
    fn test_damaged_orange_only_for_randomization() {
        assert_eq!(
            badge_for(AckStatus::Damaged, SelectType::Randomization),
            BadgeColor::Orange
        );
        assert_eq!(badge_for(AckStatus::Damaged, SelectType::Drug), BadgeColor::Gray);
        assert_eq!(
            badge_for(AckStatus::Damaged, SelectType::DrugGroup),
            BadgeColor::Gray
        );
    }
}
