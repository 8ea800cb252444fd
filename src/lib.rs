//! Blueprint Composer Library
//!
//! Wizard state, request mapping and repository selection for composing OS
//! image blueprints against the image-builder API.

pub mod api;
pub mod blueprints;
pub mod cli;
pub mod config_file;
pub mod error;
pub mod logic;
pub mod repositories;
pub mod types;
pub mod wizard;

// Re-export main types for convenience
pub use api::{BlueprintBackend, HttpBackend, MutationDispatcher, MutationStatus, RepositoryBackend};
pub use blueprints::{delete_selected_blueprint, save_blueprint, BlueprintListState, SaveAction};
pub use config_file::Settings;
pub use error::{ComposerError, Result};
pub use logic::{map_request_from_state, map_request_to_state, ServerContext};
pub use repositories::{is_repo_disabled, DisabledReason, RemovalOutcome, RepositoryReconciler};
pub use types::{
    Architecture, ContentOrigin, Distribution, ImageType, ListToggle, RegistrationType, WizardMode,
};
pub use wizard::{Action, BlueprintDraft, Store, WizardState, WizardStep};
