//! Pure accessors over [`WizardState`].
//!
//! Components read the store only through these, never by reaching into the
//! draft directly, so the draft layout can change without touching callers.

use crate::api::models::{ApiRepository, CustomRepository, PayloadRepository};
use crate::types::{Architecture, Distribution, ImageType, WizardMode};
use crate::wizard::draft::{
    AwsShare, AzureTarget, FilesystemMode, FirewallConfig, GcpTarget, KernelConfig,
    LocaleConfig, Registration, ServicesConfig, SnapshotMode, TimezoneConfig, UserConfig,
};
use crate::wizard::store::WizardState;

pub fn select_wizard_mode(state: &WizardState) -> WizardMode {
    state.mode
}

pub fn select_blueprint_id(state: &WizardState) -> Option<&str> {
    state.blueprint_id.as_deref()
}

pub fn select_blueprint_name(state: &WizardState) -> &str {
    &state.draft.name
}

pub fn select_blueprint_description(state: &WizardState) -> &str {
    &state.draft.description
}

pub fn select_is_custom_name(state: &WizardState) -> bool {
    state.draft.is_custom_name
}

pub fn select_distribution(state: &WizardState) -> Distribution {
    state.draft.distribution
}

pub fn select_architecture(state: &WizardState) -> Architecture {
    state.draft.architecture
}

pub fn select_image_types(state: &WizardState) -> &[ImageType] {
    &state.draft.image_types
}

pub fn select_aws_share(state: &WizardState) -> &AwsShare {
    &state.draft.aws
}

pub fn select_gcp_target(state: &WizardState) -> &GcpTarget {
    &state.draft.gcp
}

pub fn select_azure_target(state: &WizardState) -> &AzureTarget {
    &state.draft.azure
}

pub fn select_packages(state: &WizardState) -> &[String] {
    &state.draft.packages
}

pub fn select_groups(state: &WizardState) -> &[String] {
    &state.draft.groups
}

pub fn select_custom_repositories(state: &WizardState) -> &[CustomRepository] {
    &state.draft.custom_repositories
}

pub fn select_payload_repositories(state: &WizardState) -> &[PayloadRepository] {
    &state.draft.payload_repositories
}

pub fn select_red_hat_repositories(state: &WizardState) -> &[PayloadRepository] {
    &state.draft.red_hat_repositories
}

pub fn select_recommended_repositories(state: &WizardState) -> &[ApiRepository] {
    &state.draft.recommended_repositories
}

pub fn select_snapshot(state: &WizardState) -> &SnapshotMode {
    &state.draft.snapshot
}

/// True when the image takes the newest content rather than a snapshot
pub fn select_use_latest(state: &WizardState) -> bool {
    matches!(state.draft.snapshot, SnapshotMode::UseLatest)
}

pub fn select_snapshot_date(state: &WizardState) -> Option<&str> {
    match &state.draft.snapshot {
        SnapshotMode::SnapshotDate(date) => Some(date.as_str()),
        _ => None,
    }
}

/// Content template uuid, if one is selected
pub fn select_template(state: &WizardState) -> Option<&str> {
    match &state.draft.snapshot {
        SnapshotMode::Template(uuid) if !uuid.is_empty() => Some(uuid.as_str()),
        _ => None,
    }
}

pub fn select_registration(state: &WizardState) -> &Registration {
    &state.draft.registration
}

pub fn select_openscap_profile(state: &WizardState) -> Option<&str> {
    state.draft.openscap_profile.as_deref()
}

pub fn select_filesystem(state: &WizardState) -> &FilesystemMode {
    &state.draft.filesystem
}

pub fn select_users(state: &WizardState) -> &[UserConfig] {
    &state.draft.users
}

pub fn select_timezone(state: &WizardState) -> &TimezoneConfig {
    &state.draft.timezone
}

pub fn select_locale(state: &WizardState) -> &LocaleConfig {
    &state.draft.locale
}

pub fn select_hostname(state: &WizardState) -> &str {
    &state.draft.hostname
}

pub fn select_kernel(state: &WizardState) -> &KernelConfig {
    &state.draft.kernel
}

pub fn select_firewall(state: &WizardState) -> &FirewallConfig {
    &state.draft.firewall
}

pub fn select_services(state: &WizardState) -> &ServicesConfig {
    &state.draft.services
}

pub fn select_first_boot_script(state: &WizardState) -> &str {
    &state.draft.first_boot_script
}
