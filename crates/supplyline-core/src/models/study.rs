//! Study and site models.

use serde::{Deserialize, Serialize};

/// A clinical study, the top-level scope for every shipment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Study name shown in the study dropdown
    pub name: String,
    /// Protocol number
    #[serde(default)]
    pub protocol_number: Option<String>,
    /// Full study title
    #[serde(default)]
    pub title: Option<String>,
    /// Planned start date (backend-formatted string)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Planned end date (backend-formatted string)
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A trial site that receives shipments, scoped to one study.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Site name shown in the site dropdown
    pub name: String,
    /// Owning study id
    #[serde(default)]
    pub study: Option<String>,
}

impl Study {
    /// Create a study with the fields the console needs.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            protocol_number: None,
            title: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl Site {
    /// Create a site record.
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            study: None,
        }
    }

    /// Check whether this site belongs to the given study.
    pub fn belongs_to(&self, study_id: &str) -> bool {
        self.study.as_deref() == Some(study_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_belongs_to() {
        let mut site = Site::new("site-1".into(), "Boston General".into());
        assert!(!site.belongs_to("study-1"));

        site.study = Some("study-1".into());
        assert!(site.belongs_to("study-1"));
        assert!(!site.belongs_to("study-2"));
    }

    #[test]
    fn test_study_wire_names() {
        let json = r#"{"_id":"study-1","name":"ONC-204","protocolNumber":"P-204"}"#;
        let study: Study = serde_json::from_str(json).unwrap();
        assert_eq!(study.id, "study-1");
        assert_eq!(study.protocol_number.as_deref(), Some("P-204"));
        assert!(study.start_date.is_none());
    }
}
