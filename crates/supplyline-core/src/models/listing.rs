//! Shipment list query and response envelope.

use serde::{Deserialize, Serialize};

use super::shipment::{SelectType, Shipment};

/// First page number. The backend pages from 1, not 0.
pub const FIRST_PAGE: u32 = 1;

/// Default rows per page in the shipment table.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Query parameters of the shipment list endpoint. Unset filters are
/// omitted from the request entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentQuery {
    /// Page number, 1-based
    pub page: u32,
    /// Rows per page
    pub limit: u32,
    /// Filter by study id
    pub study: Option<String>,
    /// Filter by site id
    pub site: Option<String>,
    /// Filter by item category
    pub select_type: Option<SelectType>,
}

impl Default for ShipmentQuery {
    fn default() -> Self {
        Self {
            page: FIRST_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            study: None,
            site: None,
            select_type: None,
        }
    }
}

impl ShipmentQuery {
    /// First page with default size and no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same filters, different page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(FIRST_PAGE);
        self
    }

    /// Same filters, different page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Keep this study filter.
    pub fn study(mut self, study_id: impl Into<String>) -> Self {
        self.study = Some(study_id.into());
        self
    }

    /// Keep this site filter.
    pub fn site(mut self, site_id: impl Into<String>) -> Self {
        self.site = Some(site_id.into());
        self
    }

    /// Keep this category filter.
    pub fn select_type(mut self, select_type: SelectType) -> Self {
        self.select_type = Some(select_type);
        self
    }

    /// Key/value pairs for the request query string.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(study) = &self.study {
            pairs.push(("study".to_string(), study.clone()));
        }
        if let Some(site) = &self.site {
            pairs.push(("site".to_string(), site.clone()));
        }
        if let Some(select_type) = &self.select_type {
            pairs.push(("selectType".to_string(), select_type.as_str().to_string()));
        }
        pairs
    }
}

/// Paging block of the list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page, 1-based
    #[serde(default)]
    pub page: u32,
    /// Rows per page
    #[serde(default)]
    pub limit: u32,
    /// Total page count
    #[serde(default)]
    pub total_pages: u32,
}

/// Response envelope of the shipment list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPage {
    /// Rows for the requested page
    #[serde(default)]
    pub shipments: Vec<Shipment>,
    /// Paging block
    #[serde(default)]
    pub pagination: Pagination,
    /// Total matching shipments across all pages
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_pairs() {
        let pairs = ShipmentQuery::new().to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_filtered_query_pairs() {
        let pairs = ShipmentQuery::new()
            .page(3)
            .limit(25)
            .study("study-1")
            .site("site-2")
            .select_type(SelectType::DrugGroup)
            .to_query_pairs();
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "25".to_string())));
        assert!(pairs.contains(&("study".to_string(), "study-1".to_string())));
        assert!(pairs.contains(&("site".to_string(), "site-2".to_string())));
        assert!(pairs.contains(&("selectType".to_string(), "DrugGroup".to_string())));
    }

    #[test]
    fn test_page_and_limit_floors() {
        assert_eq!(ShipmentQuery::new().page(0).page, FIRST_PAGE);
        assert_eq!(ShipmentQuery::new().limit(0).limit, 1);
    }

    #[test]
    fn test_envelope_defaults() {
        let page: ShipmentPage = serde_json::from_str("{}").unwrap();
        assert!(page.shipments.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.pagination.page, 0);
    }
}
