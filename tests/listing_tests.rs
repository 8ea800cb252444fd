//! Tests for the repository listing round-trips
//!
//! These tests verify:
//! - The initial-selection listing drops repositories gone server side
//! - An empty selection needs no listing at all
//! - Template mode fetches the template and applies its repositories
//! - The table page honours the settled filter and the page offset
//! - Backend errors propagate and leave the selection untouched

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use blueprint_composer::api::client::RepositoryBackend;
use blueprint_composer::api::models::{
    ApiRepository, CollectionMeta, ContentTemplate, RepositoryCollection, RepositoryParameters,
};
use blueprint_composer::repositories::listing::ListRepositoriesQuery;
use blueprint_composer::repositories::{
    convert_schema_to_custom_repo, convert_schema_to_payload_repo, load_initial_selection,
    load_listing, load_template_listing, select_selected_repositories, RepositoryReconciler,
};
use blueprint_composer::types::ContentOrigin;
use blueprint_composer::wizard::draft::SnapshotMode;
use blueprint_composer::wizard::{Action, Store};
use blueprint_composer::{ComposerError, Result};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// In-memory content-sources service recording every query
#[derive(Default)]
struct MemoryRepositories {
    catalogue: Vec<ApiRepository>,
    templates: Vec<ContentTemplate>,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<ListRepositoriesQuery>>,
}

impl MemoryRepositories {
    fn with(catalogue: Vec<ApiRepository>) -> Self {
        Self {
            catalogue,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn last_query(&self) -> ListRepositoriesQuery {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl RepositoryBackend for MemoryRepositories {
    async fn list_repositories(&self, query: &ListRepositoriesQuery) -> Result<RepositoryCollection> {
        self.calls.lock().unwrap().push("list".to_string());
        self.queries.lock().unwrap().push(query.clone());
        let matching: Vec<ApiRepository> = self
            .catalogue
            .iter()
            .filter(|r| {
                query.uuids.is_empty()
                    || r.uuid.as_ref().is_some_and(|uuid| query.uuids.contains(uuid))
            })
            .filter(|r| query.search.as_ref().is_none_or(|s| r.name.contains(s.as_str())))
            .cloned()
            .collect();
        let count = matching.len() as u64;
        Ok(RepositoryCollection {
            data: matching
                .into_iter()
                .skip(query.offset as usize)
                .take(query.limit as usize)
                .collect(),
            meta: CollectionMeta {
                count,
                limit: query.limit,
                offset: query.offset,
            },
        })
    }

    async fn list_repository_parameters(&self) -> Result<RepositoryParameters> {
        Ok(RepositoryParameters::default())
    }

    async fn get_template(&self, uuid: &str) -> Result<ContentTemplate> {
        self.calls.lock().unwrap().push(format!("template {}", uuid));
        self.templates
            .iter()
            .find(|t| t.uuid == uuid)
            .cloned()
            .ok_or_else(|| ComposerError::api(404, "template not found"))
    }
}

fn repo(uuid: &str) -> ApiRepository {
    ApiRepository {
        uuid: Some(uuid.to_string()),
        name: format!("Repository {}", uuid),
        url: Some(format!("https://mirror.example.com/{}/", uuid)),
        status: Some("Valid".to_string()),
        snapshot: true,
        origin: Some(ContentOrigin::External),
        ..Default::default()
    }
}

fn store_with(selected: &[&str]) -> Store {
    let mut store = Store::default();
    store.dispatch_all([
        Action::ChangeCustomRepositories(
            selected.iter().map(|id| convert_schema_to_custom_repo(&repo(id))).collect(),
        ),
        Action::ChangePayloadRepositories(
            selected.iter().map(|id| convert_schema_to_payload_repo(&repo(id))).collect(),
        ),
    ]);
    store
}

fn mount(store: &Store) -> RepositoryReconciler {
    RepositoryReconciler::mount(store.state(), 10, DEBOUNCE)
}

// =============================================================================
// test_initial_selection
// =============================================================================

#[tokio::test]
async fn test_initial_selection_drops_vanished_repositories() {
    let backend = MemoryRepositories::with(vec![repo("a"), repo("b")]);
    let mut store = store_with(&["a", "b", "gone"]);
    let mut reconciler = mount(&store);

    let unavailable = load_initial_selection(&backend, &mut reconciler, &mut store)
        .await
        .unwrap();

    assert_eq!(unavailable, 1);
    assert_eq!(reconciler.unavailable_count(), 1);
    let selected = select_selected_repositories(store.state());
    assert_eq!(selected.len(), 2);
    assert!(!selected.contains("gone"));
    assert_eq!(backend.last_query().uuids.len(), 3);
}

#[tokio::test]
async fn test_empty_selection_skips_the_listing() {
    let backend = MemoryRepositories::with(vec![repo("a")]);
    let mut store = Store::default();
    let mut reconciler = mount(&store);

    let unavailable = load_initial_selection(&backend, &mut reconciler, &mut store)
        .await
        .unwrap();

    assert_eq!(unavailable, 0);
    assert!(backend.calls().is_empty());
}

// =============================================================================
// test_template_listing
// =============================================================================

#[tokio::test]
async fn test_template_repositories_replace_selection() {
    let baseos = ApiRepository {
        origin: Some(ContentOrigin::RedHat),
        ..repo("baseos")
    };
    let backend = MemoryRepositories {
        catalogue: vec![baseos, repo("tools"), repo("other")],
        templates: vec![ContentTemplate {
            uuid: "tpl".to_string(),
            name: "Q1 snapshot".to_string(),
            repository_uuids: vec!["baseos".to_string(), "tools".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    };
    let mut store = store_with(&["manual"]);
    let mut reconciler = mount(&store);
    store.dispatch(Action::ChangeSnapshot(SnapshotMode::Template("tpl".to_string())));

    let listing = load_listing(&backend, &mut reconciler, &mut store).await.unwrap();

    assert!(reconciler.is_template_mode());
    assert_eq!(listing.data.len(), 2);
    assert_eq!(backend.calls(), vec!["template tpl".to_string(), "list".to_string()]);
    let draft = &store.state().draft;
    assert_eq!(draft.red_hat_repositories.len(), 1);
    assert_eq!(draft.custom_repositories.len(), 1);
    assert_eq!(draft.custom_repositories[0].id, "tools");
    assert_eq!(draft.payload_repositories.len(), 1);
}

#[tokio::test]
async fn test_missing_template_keeps_selection() {
    let backend = MemoryRepositories::with(vec![repo("manual")]);
    let mut store = store_with(&["manual"]);
    store.dispatch(Action::ChangeSnapshot(SnapshotMode::Template("tpl".to_string())));
    let reconciler = mount(&store);

    let err = load_template_listing(&backend, &reconciler, &mut store)
        .await
        .unwrap_err();

    assert!(matches!(err, ComposerError::Api { status: 404, .. }));
    assert_eq!(store.state().draft.custom_repositories.len(), 1);
}

#[tokio::test]
async fn test_template_listing_skipped_outside_template_mode() {
    let backend = MemoryRepositories::default();
    let mut store = Store::default();
    let reconciler = mount(&store);

    let listing = load_template_listing(&backend, &reconciler, &mut store).await.unwrap();
    assert!(listing.is_none());
    assert!(backend.calls().is_empty());
}

// =============================================================================
// test_main_listing
// =============================================================================

#[tokio::test]
async fn test_table_page_uses_settled_filter_and_offset() {
    let catalogue: Vec<ApiRepository> = (0..25)
        .map(|i| {
            let mut r = repo(&format!("r{}", i));
            if i % 2 == 0 {
                r.name = format!("epel mirror {}", i);
            }
            r
        })
        .collect();
    let backend = MemoryRepositories::with(catalogue);
    let mut store = Store::default();
    let mut reconciler = mount(&store);

    let now = Instant::now();
    reconciler.set_filter("epel", now);
    assert!(reconciler.poll_filter(now + DEBOUNCE));
    reconciler.set_page(2);

    let listing = load_listing(&backend, &mut reconciler, &mut store).await.unwrap();

    let query = backend.last_query();
    assert_eq!(query.search.as_deref(), Some("epel"));
    assert_eq!(query.offset, 10);
    assert_eq!(listing.meta.count, 13);
    assert_eq!(listing.data.len(), 3);
    assert!(!reconciler.is_fetching());
}

#[tokio::test]
async fn test_unsettled_filter_is_not_sent() {
    let backend = MemoryRepositories::with(vec![repo("a")]);
    let mut store = Store::default();
    let mut reconciler = mount(&store);

    reconciler.set_filter("epel", Instant::now());
    load_listing(&backend, &mut reconciler, &mut store).await.unwrap();

    assert!(backend.last_query().search.is_none());
}
