//! Vendor search.
//!
//! The storefront lookup goes through a trait so the HTTP layer never knows
//! whether hits come from a dedicated index or a store scan. Backend faults
//! surface as 503s, not 500s.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Approval, VendorSummary};
use crate::repository::StoreState;

#[derive(Debug)]
pub struct SearchError(pub String);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError::Upstream(format!("Search backend unavailable.\r\n{}", err.0))
    }
}

/// SearchIndex
///
/// Ranked vendor lookup. `from`/`size` page through the hit list.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn vendors(
        &self,
        query: &str,
        from: usize,
        size: usize,
    ) -> Result<Vec<VendorSummary>, SearchError>;
}

pub type SearchState = Arc<dyn SearchIndex>;

/// StoreSearch
///
/// Store-backed index: scans vendor records and ranks by how the query
/// matches the business or domain name. Rejected vendors never appear.
pub struct StoreSearch {
    store: StoreState,
}

impl StoreSearch {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }
}

fn score(query: &str, business_name: &str, domain_name: &str) -> Option<f32> {
    let business = business_name.to_lowercase();
    let domain = domain_name.to_lowercase();
    if business == query || domain == query {
        Some(2.0)
    } else if business.starts_with(query) || domain.starts_with(query) {
        Some(1.5)
    } else if business.contains(query) || domain.contains(query) {
        Some(1.0)
    } else {
        None
    }
}

#[async_trait]
impl SearchIndex for StoreSearch {
    async fn vendors(
        &self,
        query: &str,
        from: usize,
        size: usize,
    ) -> Result<Vec<VendorSummary>, SearchError> {
        let query = query.trim().to_lowercase();
        let vendors = self
            .store
            .list_vendors()
            .await
            .map_err(|e| SearchError(format!("{e:?}")))?;

        let mut hits: Vec<VendorSummary> = vendors
            .iter()
            .filter(|v| v.approval != Approval::Rejected)
            .filter_map(|v| {
                score(&query, &v.business_name, &v.domain_name).map(|score| VendorSummary {
                    id: v.id,
                    business_name: v.business_name.clone(),
                    domain_name: v.domain_name.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits.into_iter().skip(from).take(size).collect())
    }
}

/// MockSearch
///
/// Canned hits or a forced failure, for handler tests.
#[derive(Default)]
pub struct MockSearch {
    pub results: Vec<VendorSummary>,
    pub should_fail: bool,
}

#[async_trait]
impl SearchIndex for MockSearch {
    async fn vendors(
        &self,
        _query: &str,
        from: usize,
        size: usize,
    ) -> Result<Vec<VendorSummary>, SearchError> {
        if self.should_fail {
            return Err(SearchError("mock index offline".to_string()));
        }
        Ok(self
            .results
            .iter()
            .cloned()
            .skip(from)
            .take(size)
            .collect())
    }
}
