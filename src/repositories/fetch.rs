//! Listing round-trips for the repository step.
//!
//! Each helper asks the reconciler for the query it needs, runs it against a
//! [`RepositoryBackend`] and feeds the answer back: the initial-selection
//! listing drops repositories that vanished server side, the template
//! listing replaces the selection with the template's repositories.

use tracing::debug;

use crate::api::client::RepositoryBackend;
use crate::api::models::RepositoryCollection;
use crate::error::Result;
use crate::repositories::reconciler::RepositoryReconciler;
use crate::wizard::store::Store;

/// Re-fetch the initially selected repositories and reconcile the
/// selection. Returns how many are no longer available.
pub async fn load_initial_selection<R: RepositoryBackend>(
    backend: &R,
    reconciler: &mut RepositoryReconciler,
    store: &mut Store,
) -> Result<usize> {
    let Some(query) = reconciler.initial_listing_query(store.state()) else {
        return Ok(0);
    };
    if query.uuids.is_empty() {
        return Ok(reconciler.reconcile_initial_listing(store, &[]));
    }
    let listing = backend.list_repositories(&query).await?;
    debug!(found = listing.data.len(), "initial selection listed");
    Ok(reconciler.reconcile_initial_listing(store, &listing.data))
}

/// Fetch the selected template, list its repositories and apply them.
///
/// `None` outside template mode.
pub async fn load_template_listing<R: RepositoryBackend>(
    backend: &R,
    reconciler: &RepositoryReconciler,
    store: &mut Store,
) -> Result<Option<RepositoryCollection>> {
    let Some(uuid) = reconciler.template() else {
        return Ok(None);
    };
    let template = backend.get_template(uuid).await?;
    let Some(query) = reconciler.template_listing_query(&template) else {
        return Ok(None);
    };
    let listing = backend.list_repositories(&query).await?;
    reconciler.apply_template_listing(store, &listing.data);
    Ok(Some(listing))
}

/// Fetch the current page of the repository table.
///
/// `None` in template mode. Rows read as fetching while the request runs.
pub async fn load_main_listing<R: RepositoryBackend>(
    backend: &R,
    reconciler: &mut RepositoryReconciler,
    store: &Store,
) -> Result<Option<RepositoryCollection>> {
    let Some(query) = reconciler.main_listing_query(store.state()) else {
        return Ok(None);
    };
    reconciler.set_fetching(true);
    let listing = backend.list_repositories(&query).await;
    reconciler.set_fetching(false);
    listing.map(Some)
}

/// Follow the store's template choice, then load whichever listing the
/// step shows: the template's repositories or the table page.
pub async fn load_listing<R: RepositoryBackend>(
    backend: &R,
    reconciler: &mut RepositoryReconciler,
    store: &mut Store,
) -> Result<RepositoryCollection> {
    reconciler.sync_template(store.state());
    let listing = match load_template_listing(backend, reconciler, store).await? {
        Some(listing) => Some(listing),
        None => load_main_listing(backend, reconciler, store).await?,
    };
    Ok(listing.unwrap_or_default())
}
