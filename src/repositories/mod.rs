//! Custom repository selection for the repository step.

pub mod convert;
pub mod fetch;
pub mod listing;
pub mod policy;
pub mod reconciler;

pub use convert::{convert_schema_to_custom_repo, convert_schema_to_payload_repo};
pub use fetch::{load_initial_selection, load_listing, load_main_listing, load_template_listing};
pub use policy::{is_repo_disabled, DisableContext, DisabledReason};
pub use reconciler::{
    select_selected_repositories, selected_repository_ids, RemovalOutcome, RepositoryReconciler,
    SelectionMemo,
};
