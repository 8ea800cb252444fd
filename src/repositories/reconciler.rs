//! Repository Selection Reconciler
//!
//! Keeps the set of selected custom repositories stable while the listings
//! behind the repository step are re-fetched, filtered, paginated or replaced
//! by a content template.
//!
//! # State
//!
//! - **selected**: `custom ∪ payload ∪ recommended` identifiers, always
//!   derived from the store, never stored
//! - **initial selection**: snapshot of `selected` taken once when the step
//!   mounts; removing any of these needs explicit confirmation
//! - **pending removal**: identifiers waiting on that confirmation
//! - **template**: while a content template is selected the lists are
//!   read-only and mirror the template
//!
//! # Invariants
//!
//! - Every identifier appears at most once in the custom and payload lists
//! - Nothing in the initial selection is removed by a user action without
//!   `confirm_removal`
//! - Repositories that disappeared server side are dropped without asking

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::api::models::{
    ApiRepository, ContentTemplate, CustomRepository, PayloadRepository,
};
use crate::error::{ComposerError, Result};
use crate::repositories::convert::{convert_schema_to_custom_repo, convert_schema_to_payload_repo};
use crate::repositories::listing::{
    Debouncer, ListRepositoriesQuery, Pagination, INITIAL_LISTING_LIMIT, RPM_CONTENT_TYPE,
};
use crate::repositories::policy::{is_repo_disabled, DisableContext, DisabledReason};
use crate::types::{ListToggle, WizardMode};
use crate::wizard::selectors::{
    select_architecture, select_custom_repositories, select_distribution,
    select_payload_repositories, select_recommended_repositories, select_template,
    select_wizard_mode,
};
use crate::wizard::store::{Action, Store, WizardState};

/// Shown above the table while editing an existing blueprint
pub const EDIT_MODE_WARNING: &str =
    "Removing previously added repositories may lead to issues with selected packages";

/// Identifiers considered selected: `custom ∪ payload ∪ recommended`.
///
/// Empty identifiers are skipped.
pub fn selected_repository_ids(
    custom: &[CustomRepository],
    payload: &[PayloadRepository],
    recommended: &[ApiRepository],
) -> BTreeSet<String> {
    custom
        .iter()
        .map(|r| Some(r.id.as_str()))
        .chain(payload.iter().map(|r| r.id.as_deref()))
        .chain(recommended.iter().map(|r| r.uuid.as_deref()))
        .flatten()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// [`selected_repository_ids`] read from the wizard state
pub fn select_selected_repositories(state: &WizardState) -> BTreeSet<String> {
    selected_repository_ids(
        select_custom_repositories(state),
        select_payload_repositories(state),
        select_recommended_repositories(state),
    )
}

type SelectionKey = (Vec<String>, Vec<Option<String>>, Vec<Option<String>>);

/// Caches the derived selected set until one of its three inputs changes.
#[derive(Debug, Clone, Default)]
pub struct SelectionMemo {
    key: Option<SelectionKey>,
    value: BTreeSet<String>,
}

impl SelectionMemo {
    pub fn get(&mut self, state: &WizardState) -> &BTreeSet<String> {
        let key: SelectionKey = (
            select_custom_repositories(state).iter().map(|r| r.id.clone()).collect(),
            select_payload_repositories(state).iter().map(|r| r.id.clone()).collect(),
            select_recommended_repositories(state)
                .iter()
                .map(|r| r.uuid.clone())
                .collect(),
        );
        if self.key.as_ref() != Some(&key) {
            self.value = select_selected_repositories(state);
            self.key = Some(key);
        }
        &self.value
    }
}

/// Result of asking to remove repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Removed right away; carries the number of identifiers requested
    Removed(usize),
    /// Some identifier was part of the initial selection; waiting on
    /// [`RepositoryReconciler::confirm_removal`]
    ConfirmationRequired,
}

/// Selection state of the repository step.
#[derive(Debug, Clone)]
pub struct RepositoryReconciler {
    initial_selection: BTreeSet<String>,
    pending_removal: Option<Vec<String>>,
    template: Option<String>,
    toggle: ListToggle,
    pagination: Pagination,
    filter: Debouncer,
    is_fetching: bool,
    unavailable_count: usize,
    memo: SelectionMemo,
}

impl RepositoryReconciler {
    /// Mount the step: snapshot the initial selection and pick up the template.
    pub fn mount(state: &WizardState, per_page: u64, debounce: Duration) -> Self {
        let initial_selection = select_selected_repositories(state);
        let template = select_template(state).map(str::to_string);
        debug!(
            initial = initial_selection.len(),
            template = template.as_deref().unwrap_or(""),
            "repository step mounted"
        );
        Self {
            initial_selection,
            pending_removal: None,
            template,
            toggle: ListToggle::All,
            pagination: Pagination::new(per_page),
            filter: Debouncer::new(debounce),
            is_fetching: false,
            unavailable_count: 0,
            memo: SelectionMemo::default(),
        }
    }

    pub fn initial_selection(&self) -> &BTreeSet<String> {
        &self.initial_selection
    }

    /// Memoized selected set
    pub fn selected(&mut self, state: &WizardState) -> &BTreeSet<String> {
        self.memo.get(state)
    }

    pub fn is_selected(&mut self, state: &WizardState, uuid: &str) -> bool {
        self.selected(state).contains(uuid)
    }

    // ------------------------------------------------------------------
    // Template mode
    // ------------------------------------------------------------------

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn is_template_mode(&self) -> bool {
        self.template.is_some()
    }

    /// Enter template mode for `template`, or leave it with `None`.
    /// Returns true on change.
    pub fn set_template(&mut self, template: Option<&str>) -> bool {
        if template == self.template.as_deref() {
            return false;
        }
        info!(template = template.unwrap_or(""), "content template changed");
        self.template = template.map(str::to_string);
        self.pending_removal = None;
        self.pagination.reset();
        true
    }

    /// Follow the template selected in the state
    pub fn sync_template(&mut self, state: &WizardState) -> bool {
        self.set_template(select_template(state))
    }

    /// Manual add/remove controls are only live outside template mode
    pub fn selection_controls_enabled(&self) -> bool {
        !self.is_template_mode()
    }

    fn ensure_editable(&self) -> Result<()> {
        match &self.template {
            Some(uuid) => Err(ComposerError::TemplateReadOnly(uuid.clone())),
            None => Ok(()),
        }
    }

    /// Replace the custom, payload and Red Hat lists with the template's
    /// repositories, split by origin. Returns false when nothing was applied.
    pub fn apply_template_listing(&self, store: &mut Store, repos: &[ApiRepository]) -> bool {
        if !self.is_template_mode() || repos.is_empty() {
            return false;
        }
        let (red_hat, custom): (Vec<&ApiRepository>, Vec<&ApiRepository>) =
            repos.iter().partition(|r| r.is_red_hat());

        info!(
            custom = custom.len(),
            red_hat = red_hat.len(),
            "applying content template repositories"
        );
        store.dispatch_all([
            Action::ChangeCustomRepositories(
                custom.iter().map(|r| convert_schema_to_custom_repo(r)).collect(),
            ),
            Action::ChangePayloadRepositories(
                custom.iter().map(|r| convert_schema_to_payload_repo(r)).collect(),
            ),
            Action::ChangeRedHatRepositories(
                red_hat.iter().map(|r| convert_schema_to_payload_repo(r)).collect(),
            ),
        ]);
        true
    }

    // ------------------------------------------------------------------
    // Disablement
    // ------------------------------------------------------------------

    /// Mark a listing re-fetch as in flight (or finished)
    pub fn set_fetching(&mut self, is_fetching: bool) {
        self.is_fetching = is_fetching;
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn disable_context<'a>(&self, state: &'a WizardState) -> DisableContext<'a> {
        DisableContext::from_state(state, self.is_fetching)
    }

    /// Why the row cannot be toggled, if it cannot
    pub fn row_disabled(&mut self, state: &WizardState, repo: &ApiRepository) -> Option<DisabledReason> {
        let is_selected = repo
            .uuid
            .as_deref()
            .is_some_and(|uuid| self.selected(state).contains(uuid));
        is_repo_disabled(repo, is_selected, &self.disable_context(state))
    }

    /// Bulk select is off while fetching, when there is nothing to act on, or
    /// when every row on the page is disabled
    pub fn bulk_select_disabled(&mut self, state: &WizardState, page: &[ApiRepository]) -> bool {
        if self.is_fetching || !self.selection_controls_enabled() {
            return true;
        }
        if self.selected(state).is_empty() && page.is_empty() {
            return true;
        }
        page.iter()
            .filter(|repo| repo.uuid.is_some())
            .all(|repo| self.row_disabled(state, repo).is_some())
    }

    // ------------------------------------------------------------------
    // Add / remove
    // ------------------------------------------------------------------

    /// Select every record that has an identifier, is not yet selected and is
    /// not disabled. Returns the number of repositories added.
    pub fn add_selected(&mut self, store: &mut Store, repos: &[ApiRepository]) -> Result<usize> {
        self.ensure_editable()?;

        let state = store.state();
        let mut selected = select_selected_repositories(state);
        let ctx = self.disable_context(state);
        let accepted: Vec<&ApiRepository> = repos
            .iter()
            .filter(|repo| {
                let Some(uuid) = repo.uuid.as_deref().filter(|u| !u.is_empty()) else {
                    return false;
                };
                !selected.contains(uuid)
                    && is_repo_disabled(repo, false, &ctx).is_none()
                    && selected.insert(uuid.to_string())
            })
            .collect();

        if accepted.is_empty() {
            debug!(requested = repos.len(), "no repositories eligible to add");
            return Ok(0);
        }

        let mut custom = state.draft.custom_repositories.clone();
        let mut payload = state.draft.payload_repositories.clone();
        custom.extend(accepted.iter().map(|r| convert_schema_to_custom_repo(r)));
        payload.extend(accepted.iter().map(|r| convert_schema_to_payload_repo(r)));
        let added = accepted.len();

        store.dispatch_all([
            Action::ChangeCustomRepositories(custom),
            Action::ChangePayloadRepositories(payload),
        ]);
        info!(added, requested = repos.len(), "repositories selected");
        Ok(added)
    }

    /// Remove the identifiers from both lists, without any confirmation.
    pub fn remove_selected(&mut self, store: &mut Store, ids: &[String]) -> Result<usize> {
        self.ensure_editable()?;
        remove_ids(store, ids);
        Ok(ids.len())
    }

    /// Remove the identifiers, asking for confirmation first when any of them
    /// was already part of the blueprint when the step mounted.
    pub fn request_removal(&mut self, store: &mut Store, ids: &[String]) -> Result<RemovalOutcome> {
        self.ensure_editable()?;
        if ids.iter().any(|id| self.initial_selection.contains(id)) {
            debug!(count = ids.len(), "removal of initially selected repositories needs confirmation");
            self.pending_removal = Some(ids.to_vec());
            return Ok(RemovalOutcome::ConfirmationRequired);
        }
        remove_ids(store, ids);
        Ok(RemovalOutcome::Removed(ids.len()))
    }

    /// Deselect everything except recommended repositories.
    pub fn clear_selected(&mut self, store: &mut Store) -> Result<RemovalOutcome> {
        self.ensure_editable()?;
        let state = store.state();
        let selected = select_selected_repositories(state);
        if selected.iter().any(|id| self.initial_selection.contains(id)) {
            self.pending_removal = Some(selected.into_iter().collect());
            return Ok(RemovalOutcome::ConfirmationRequired);
        }

        let recommended: BTreeSet<&str> = select_recommended_repositories(state)
            .iter()
            .filter_map(|r| r.uuid.as_deref())
            .collect();
        let removable: Vec<String> = selected
            .into_iter()
            .filter(|id| !recommended.contains(id.as_str()))
            .collect();
        remove_ids(store, &removable);
        Ok(RemovalOutcome::Removed(removable.len()))
    }

    /// Identifiers waiting on confirmation, if the modal is open
    pub fn pending_removal(&self) -> Option<&[String]> {
        self.pending_removal.as_deref()
    }

    /// "Remove anyway": drop the pending identifiers and close the modal
    pub fn confirm_removal(&mut self, store: &mut Store) -> usize {
        let Some(ids) = self.pending_removal.take() else {
            return 0;
        };
        warn!(count = ids.len(), "removing previously added repositories");
        remove_ids(store, &ids);
        ids.len()
    }

    /// "Back": close the modal, keep the selection
    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    // ------------------------------------------------------------------
    // Server-side unavailability
    // ------------------------------------------------------------------

    /// Digest a successful initial-selection listing.
    ///
    /// A listing strictly smaller than the initial selection means some
    /// repositories are gone server side: they are deselected without
    /// confirmation and their count is reported.
    pub fn reconcile_initial_listing(&mut self, store: &mut Store, listing: &[ApiRepository]) -> usize {
        if self.is_template_mode() || listing.len() >= self.initial_selection.len() {
            self.unavailable_count = 0;
            return 0;
        }

        let available: BTreeSet<&str> = listing.iter().filter_map(|r| r.uuid.as_deref()).collect();
        let missing: Vec<String> = self
            .initial_selection
            .iter()
            .filter(|uuid| !available.contains(uuid.as_str()))
            .cloned()
            .collect();
        remove_ids(store, &missing);

        self.unavailable_count = self.initial_selection.len() - listing.len();
        warn!(
            unavailable = self.unavailable_count,
            "previously selected repositories are no longer available"
        );
        self.unavailable_count
    }

    /// Repositories dropped by the last initial-listing reconciliation
    pub fn unavailable_count(&self) -> usize {
        self.unavailable_count
    }

    // ------------------------------------------------------------------
    // Listing state
    // ------------------------------------------------------------------

    pub fn toggle(&self) -> ListToggle {
        self.toggle
    }

    pub fn set_toggle(&mut self, toggle: ListToggle) {
        self.pagination.reset();
        self.toggle = toggle;
    }

    /// The "selected" view falls back to "all" once nothing is selected
    pub fn sync_toggle(&mut self, state: &WizardState) {
        if self.toggle == ListToggle::Selected && self.selected(state).is_empty() {
            self.toggle = ListToggle::All;
        }
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn set_page(&mut self, page: u64) {
        self.pagination.set_page(page);
    }

    pub fn set_per_page(&mut self, per_page: u64, page: u64) {
        self.pagination.set_per_page(per_page, page);
    }

    /// Record filter input; the listing picks it up once it settles
    pub fn set_filter(&mut self, value: &str, now: Instant) {
        self.pagination.reset();
        self.filter.set(value, now);
    }

    pub fn poll_filter(&mut self, now: Instant) -> bool {
        self.filter.poll(now)
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    pub fn filter_value(&self) -> &str {
        self.filter.current()
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.settled().is_empty()
    }

    /// Listing of the initially selected repositories; skipped in template mode
    pub fn initial_listing_query(&self, state: &WizardState) -> Option<ListRepositoriesQuery> {
        if self.is_template_mode() {
            return None;
        }
        Some(
            ListRepositoriesQuery::new(INITIAL_LISTING_LIMIT, 0)
                .available_for(select_architecture(state), select_distribution(state).version())
                .custom_origin()
                .uuids(self.initial_selection.iter().cloned()),
        )
    }

    /// The current page of the repository table; skipped in template mode
    pub fn main_listing_query(&mut self, state: &WizardState) -> Option<ListRepositoriesQuery> {
        if self.is_template_mode() {
            return None;
        }
        self.sync_toggle(state);
        let uuids: Vec<String> = match self.toggle {
            ListToggle::Selected => self.selected(state).iter().cloned().collect(),
            ListToggle::All => Vec::new(),
        };
        Some(
            ListRepositoriesQuery::new(self.pagination.per_page, self.pagination.offset())
                .available_for(select_architecture(state), select_distribution(state).version())
                .content_type(RPM_CONTENT_TYPE)
                .custom_origin()
                .search(self.filter.settled())
                .uuids(uuids),
        )
    }

    /// The current page of the template's repositories; template mode only
    pub fn template_listing_query(&self, template: &ContentTemplate) -> Option<ListRepositoriesQuery> {
        if !self.is_template_mode() {
            return None;
        }
        Some(
            ListRepositoriesQuery::new(self.pagination.per_page, self.pagination.offset())
                .content_type(RPM_CONTENT_TYPE)
                .uuids(template.repository_uuids.iter().cloned()),
        )
    }

    /// Warning to show above the table, if any
    pub fn warning(&self, state: &WizardState) -> Option<&'static str> {
        (select_wizard_mode(state) == WizardMode::Edit && !self.is_template_mode())
            .then_some(EDIT_MODE_WARNING)
    }
}

fn remove_ids<S: AsRef<str>>(store: &mut Store, ids: &[S]) {
    if ids.is_empty() {
        return;
    }
    let doomed: BTreeSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let state = store.state();
    let custom: Vec<CustomRepository> = state
        .draft
        .custom_repositories
        .iter()
        .filter(|r| !doomed.contains(r.id.as_str()))
        .cloned()
        .collect();
    let payload: Vec<PayloadRepository> = state
        .draft
        .payload_repositories
        .iter()
        .filter(|r| !doomed.contains(r.id.as_deref().unwrap_or_default()))
        .cloned()
        .collect();
    store.dispatch_all([
        Action::ChangeCustomRepositories(custom),
        Action::ChangePayloadRepositories(payload),
    ]);
}
