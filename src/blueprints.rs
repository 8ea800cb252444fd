//! Save & delete flows
//!
//! The review-footer save (create or update, optionally followed by a build)
//! and the delete-blueprint confirmation over the blueprint list state.

use strum::Display;
use tracing::info;

use crate::api::client::BlueprintBackend;
use crate::api::dispatch::{MutationDispatcher, MutationKind};
use crate::api::models::{BlueprintsQuery, BlueprintsResponse, ComposeResponse};
use crate::error::Result;
use crate::logic::mapper::{map_request_from_state, ServerContext};
use crate::types::WizardMode;
use crate::wizard::store::{Action, Store};

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_OFFSET: u32 = 0;

// ============================================================================
// Save
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SaveAction {
    #[strum(serialize = "Save changes")]
    Save,
    #[strum(serialize = "Save and build images")]
    SaveAndBuild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub blueprint_id: String,
    /// Builds started by "save and build"; empty for a plain save
    pub composes: Vec<ComposeResponse>,
}

/// Submit the wizard: create or update the blueprint, build it when asked,
/// then reset the mutation statuses and the draft.
///
/// Nothing is sent without an organization id. On failure the draft is kept
/// so the user can retry.
pub async fn save_blueprint<B: BlueprintBackend>(
    dispatcher: &mut MutationDispatcher<B>,
    store: &mut Store,
    org_id: Option<&str>,
    server: &ServerContext,
    action: SaveAction,
) -> Result<SaveOutcome> {
    let state = store.state();
    let request = map_request_from_state(state, org_id, server)?;

    let blueprint_id = match (state.mode, state.blueprint_id.clone()) {
        (WizardMode::Edit, Some(id)) => {
            dispatcher.update(&id, &request).await?;
            id
        }
        _ => dispatcher.create(&request).await?.id,
    };

    let composes = match action {
        SaveAction::Save => Vec::new(),
        SaveAction::SaveAndBuild => dispatcher.compose(&blueprint_id).await?,
    };

    info!(id = %blueprint_id, %action, builds = composes.len(), "blueprint saved");
    dispatcher.reset(MutationKind::Create);
    dispatcher.reset(MutationKind::Update);
    store.dispatch(Action::Reset);

    Ok(SaveOutcome {
        blueprint_id,
        composes,
    })
}

// ============================================================================
// Blueprint list & delete
// ============================================================================

/// Selection, search and paging of the blueprint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintListState {
    pub selected: Option<String>,
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for BlueprintListState {
    fn default() -> Self {
        Self {
            selected: None,
            search: String::new(),
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl BlueprintListState {
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// New search text starts from the first page
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.offset = DEFAULT_OFFSET;
    }

    /// Listing query; a zero limit falls back to the default
    pub fn query(&self) -> BlueprintsQuery {
        BlueprintsQuery {
            search: (!self.search.is_empty()).then(|| self.search.clone()),
            limit: if self.limit == 0 { DEFAULT_LIMIT } else { self.limit },
            offset: self.offset,
        }
    }

    /// Name of the selected blueprint in the current listing
    pub fn selected_name<'a>(&self, listing: &'a BlueprintsResponse) -> Option<&'a str> {
        let selected = self.selected.as_deref()?;
        listing
            .data
            .iter()
            .find(|bp| bp.id == selected)
            .map(|bp| bp.name.as_str())
    }
}

/// Body of the delete confirmation
pub fn delete_description(name: &str) -> String {
    format!(
        "All versions of {} and its associated images will be deleted.",
        name
    )
}

/// Delete the selected blueprint, if any, and clear the selection.
///
/// Returns the deleted id, or `None` when nothing was selected.
pub async fn delete_selected_blueprint<B: BlueprintBackend>(
    dispatcher: &mut MutationDispatcher<B>,
    list: &mut BlueprintListState,
) -> Result<Option<String>> {
    let Some(id) = list.selected.take() else {
        return Ok(None);
    };
    dispatcher.delete(&id).await?;
    info!(%id, "blueprint deleted");
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::BlueprintItem;

    #[test]
    fn test_list_state_defaults_and_query() {
        let mut list = BlueprintListState {
            offset: 30,
            ..Default::default()
        };
        assert_eq!(list.limit, 10);
        list.set_search("web");
        let query = list.query();
        assert_eq!(query.offset, 0);
        assert_eq!(query.search.as_deref(), Some("web"));
    }

    #[test]
    fn test_selected_name_and_description() {
        let listing = BlueprintsResponse {
            data: vec![BlueprintItem {
                id: "bp-1".to_string(),
                name: "web".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut list = BlueprintListState::default();
        assert_eq!(list.selected_name(&listing), None);
        list.select("bp-1");
        assert_eq!(list.selected_name(&listing), Some("web"));
        assert_eq!(
            delete_description("web"),
            "All versions of web and its associated images will be deleted."
        );
    }
}
