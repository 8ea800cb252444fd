//! Wizard state and navigation
//!
//! - `draft` - the blueprint draft and its sub-configs
//! - `store` - `WizardState`, actions and the reducer
//! - `selectors` - pure accessors over the state
//! - `steps` - step order, visibility and per-step validity
//! - `validation` - field validators

pub mod draft;
pub mod selectors;
pub mod steps;
pub mod store;
pub mod validation;

pub use draft::{generate_default_name, BlueprintDraft, SnapshotMode};
pub use steps::WizardStep;
pub use store::{reduce, Action, Store, WizardState};
