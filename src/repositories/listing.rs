//! Repository listing queries and display helpers.
//!
//! The repository step reads three server listings:
//!
//! - the *initial* listing: every repository selected when the step mounted,
//!   used to notice repositories that disappeared server side;
//! - the *main* listing: one filtered, paginated page of custom repositories;
//! - the *template* listing: the repositories of the selected content template.

use std::time::{Duration, Instant};

use crate::api::models::RepositoryParameters;
use crate::types::{Architecture, ContentOrigin};

/// Upper bound for the initial-selection listing, which is never paginated
pub const INITIAL_LISTING_LIMIT: u64 = 999;
pub const DEFAULT_PER_PAGE: u64 = 10;
pub const DEFAULT_FILTER_DEBOUNCE: Duration = Duration::from_millis(500);
/// Only RPM repositories can back a blueprint
pub const RPM_CONTENT_TYPE: &str = "rpm";

/// Query parameters of the content-sources repository listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRepositoriesQuery {
    pub available_for_arch: Option<String>,
    pub available_for_version: Option<String>,
    pub content_type: Option<String>,
    pub origin: Option<String>,
    pub limit: u64,
    pub offset: u64,
    pub search: Option<String>,
    /// Restrict the listing to these repository uuids
    pub uuids: Vec<String>,
}

impl ListRepositoriesQuery {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }

    pub fn available_for(mut self, arch: Architecture, version: &str) -> Self {
        self.available_for_arch = Some(arch.to_string());
        self.available_for_version = Some(version.to_string());
        self
    }

    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Only user-managed (external and uploaded) repositories
    pub fn custom_origin(mut self) -> Self {
        self.origin = Some(ContentOrigin::CUSTOM_FILTER.to_string());
        self
    }

    pub fn search(mut self, search: &str) -> Self {
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn uuids<I, S>(mut self, uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uuids = uuids.into_iter().map(Into::into).collect();
        self
    }

    /// Flatten into `key=value` pairs; empty filters are left out
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(arch) = &self.available_for_arch {
            pairs.push(("available_for_arch", arch.clone()));
        }
        if let Some(version) = &self.available_for_version {
            pairs.push(("available_for_version", version.clone()));
        }
        if let Some(content_type) = &self.content_type {
            pairs.push(("content_type", content_type.clone()));
        }
        if let Some(origin) = &self.origin {
            pairs.push(("origin", origin.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if !self.uuids.is_empty() {
            pairs.push(("uuid", self.uuids.join(",")));
        }
        pairs
    }
}

/// 1-based page position of a paginated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(per_page: u64) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        self.per_page.saturating_mul(self.page.saturating_sub(1))
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    pub fn set_per_page(&mut self, per_page: u64, page: u64) {
        self.per_page = per_page.max(1);
        self.set_page(page);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

/// Readable architecture name; falls back to the label, or `-` when absent.
pub fn readable_architecture(params: Option<&RepositoryParameters>, label: Option<&str>) -> String {
    let Some(label) = label.filter(|l| !l.is_empty()) else {
        return "-".to_string();
    };
    params
        .and_then(|p| p.distribution_arches.iter().find(|a| a.label == label))
        .filter(|a| !a.name.is_empty())
        .map_or_else(|| label.to_string(), |a| a.name.clone())
}

/// Readable, comma separated version names; `-` when absent.
pub fn readable_versions(params: Option<&RepositoryParameters>, labels: Option<&[String]>) -> String {
    let Some(labels) = labels.filter(|l| !l.is_empty()) else {
        return "-".to_string();
    };
    labels
        .iter()
        .map(|label| {
            params
                .and_then(|p| p.distribution_versions.iter().find(|v| &v.label == label))
                .filter(|v| !v.name.is_empty())
                .map_or_else(|| label.clone(), |v| v.name.clone())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Package count for display; unknown or zero reads as `-`.
pub fn display_package_count(count: Option<u64>) -> String {
    match count {
        Some(n) if n > 0 => n.to_string(),
        _ => "-".to_string(),
    }
}

/// Settles free-text input once it has been stable for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: String::new(),
        }
    }

    /// Record new input observed at `now`
    pub fn set(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now));
    }

    /// Promote pending input that has been stable long enough; returns true
    /// when the settled value changed
    pub fn poll(&mut self, now: Instant) -> bool {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.delay);
        if !ready {
            return false;
        }
        match self.pending.take() {
            Some((value, _)) if value != self.settled => {
                self.settled = value;
                true
            }
            _ => false,
        }
    }

    /// Drop pending input and clear the settled value immediately
    pub fn clear(&mut self) {
        self.pending = None;
        self.settled.clear();
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    /// The most recent input, settled or not
    pub fn current(&self) -> &str {
        self.pending
            .as_ref()
            .map_or(self.settled.as_str(), |(value, _)| value.as_str())
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::NameLabel;

    fn params() -> RepositoryParameters {
        RepositoryParameters {
            distribution_arches: vec![NameLabel {
                name: "x86_64".to_string(),
                label: "x86_64".to_string(),
            }],
            distribution_versions: vec![
                NameLabel {
                    name: "el9".to_string(),
                    label: "9".to_string(),
                },
                NameLabel {
                    name: "el8".to_string(),
                    label: "8".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_query_pairs_leave_out_empty_filters() {
        let query = ListRepositoriesQuery::new(10, 20)
            .available_for(Architecture::X86_64, "9")
            .content_type(RPM_CONTENT_TYPE)
            .custom_origin()
            .search("");
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("origin", "external,upload".to_string())));
        assert!(pairs.contains(&("offset", "20".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "search" || *k == "uuid"));
    }

    #[test]
    fn test_query_joins_uuids() {
        let query = ListRepositoriesQuery::new(999, 0).uuids(["a", "b"]);
        assert!(query.to_query_pairs().contains(&("uuid", "a,b".to_string())));
    }

    #[test]
    fn test_pagination_offset() {
        let mut pagination = Pagination::new(25);
        assert_eq!(pagination.offset(), 0);
        pagination.set_page(3);
        assert_eq!(pagination.offset(), 50);
        pagination.set_page(0);
        assert_eq!(pagination.page, 1);
    }

    #[test]
    fn test_pagination_offset_saturates_on_huge_page() {
        let mut pagination = Pagination::new(100);
        pagination.set_page(u64::MAX);
        assert_eq!(pagination.offset(), u64::MAX);
        assert_eq!(
            ListRepositoriesQuery::new(pagination.per_page, pagination.offset()).offset,
            u64::MAX
        );
    }

    #[test]
    fn test_readable_labels() {
        let p = params();
        assert_eq!(readable_architecture(Some(&p), Some("x86_64")), "x86_64");
        assert_eq!(readable_architecture(Some(&p), Some("s390x")), "s390x");
        assert_eq!(readable_architecture(None, None), "-");
        let versions = vec!["9".to_string(), "8".to_string(), "10".to_string()];
        assert_eq!(readable_versions(Some(&p), Some(&versions)), "el9, el8, 10");
        assert_eq!(readable_versions(Some(&p), None), "-");
        assert_eq!(display_package_count(Some(0)), "-");
        assert_eq!(display_package_count(Some(12)), "12");
    }

    #[test]
    fn test_debouncer_settles_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.set("ep", start);
        debouncer.set("epel", start + Duration::from_millis(100));
        assert!(!debouncer.poll(start + Duration::from_millis(400)));
        assert_eq!(debouncer.settled(), "");
        assert_eq!(debouncer.current(), "epel");
        assert!(debouncer.poll(start + Duration::from_millis(600)));
        assert_eq!(debouncer.settled(), "epel");
        assert!(!debouncer.poll(start + Duration::from_millis(700)));
    }
}
