//! Wizard state store
//!
//! `WizardState` is the single source of truth for a wizard session. It is
//! changed only through field-scoped [`Action`]s applied by the pure
//! [`reduce`] function; [`Store`] owns the current value and applies actions
//! in place for callers that hold it by `&mut`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::debug;

use crate::api::models::{ApiRepository, CustomRepository, PayloadRepository};
use crate::types::{Architecture, Distribution, ImageType, WizardMode};
use crate::wizard::draft::{
    generate_default_name, AwsShare, AzureTarget, BlueprintDraft, FilesystemMode, FirewallConfig,
    GcpTarget, Partition, Registration, ServicesConfig, SnapshotMode, UserConfig,
};

/// Complete state of one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardState {
    pub mode: WizardMode,
    /// Server id of the blueprint being edited (edit mode only)
    pub blueprint_id: Option<String>,
    pub draft: BlueprintDraft,
}

impl WizardState {
    /// A fresh create-mode state
    pub fn new() -> Self {
        Self::default()
    }
}

/// Field-scoped updates to the wizard state.
///
/// Payloads can carry passwords and activation keys, so only the variant
/// name (via `<&'static str>::from`) is fit for logs.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Action {
    /// Replace the whole state (edit-mode hydration)
    Load(WizardState),
    /// Discard the draft and return to a fresh create-mode state
    Reset,

    ChangeBlueprintName(String),
    ChangeBlueprintDescription(String),
    /// Name the blueprint automatically; ignored once the user picked a name
    ApplyDefaultName(String),
    ChangeDistribution(Distribution),
    ChangeArchitecture(Architecture),
    AddImageType(ImageType),
    RemoveImageType(ImageType),
    ChangeAwsShare(AwsShare),
    ChangeGcpTarget(GcpTarget),
    ChangeAzureTarget(AzureTarget),

    AddPackage(String),
    RemovePackage(String),
    AddGroup(String),
    RemoveGroup(String),
    ChangeCustomRepositories(Vec<CustomRepository>),
    ChangePayloadRepositories(Vec<PayloadRepository>),
    ChangeRedHatRepositories(Vec<PayloadRepository>),
    AddRecommendedRepository(ApiRepository),
    RemoveRecommendedRepository(String),
    ChangeSnapshot(SnapshotMode),

    ChangeRegistration(Registration),
    ChangeOpenScapProfile(Option<String>),

    ChangeFilesystemMode(FilesystemMode),
    AddPartition(Partition),
    RemovePartition(String),
    AddUser(UserConfig),
    RemoveUser(String),
    ChangeTimezone(String),
    AddNtpServer(String),
    RemoveNtpServer(String),
    AddLanguage(String),
    RemoveLanguage(String),
    ChangeKeyboard(String),
    ChangeHostname(String),
    ChangeKernelName(String),
    AddKernelArg(String),
    RemoveKernelArg(String),
    ChangeFirewall(FirewallConfig),
    ChangeServices(ServicesConfig),
    ChangeFirstBootScript(String),
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

fn remove_value(list: &mut Vec<String>, value: &str) {
    list.retain(|v| v != value);
}

/// Apply one action, returning the next state.
pub fn reduce(mut state: WizardState, action: Action) -> WizardState {
    let draft = &mut state.draft;
    match action {
        Action::Load(loaded) => return loaded,
        Action::Reset => return WizardState::default(),

        Action::ChangeBlueprintName(name) => {
            draft.name = name;
            draft.is_custom_name = true;
        }
        Action::ChangeBlueprintDescription(description) => draft.description = description,
        Action::ApplyDefaultName(name) => {
            if !draft.is_custom_name {
                draft.name = name;
            }
        }
        Action::ChangeDistribution(distribution) => draft.distribution = distribution,
        Action::ChangeArchitecture(architecture) => draft.architecture = architecture,
        Action::AddImageType(image_type) => {
            if !draft.image_types.contains(&image_type) {
                draft.image_types.push(image_type);
            }
        }
        Action::RemoveImageType(image_type) => draft.image_types.retain(|t| *t != image_type),
        Action::ChangeAwsShare(share) => draft.aws = share,
        Action::ChangeGcpTarget(target) => draft.gcp = target,
        Action::ChangeAzureTarget(target) => draft.azure = target,

        Action::AddPackage(name) => push_unique(&mut draft.packages, name),
        Action::RemovePackage(name) => remove_value(&mut draft.packages, &name),
        Action::AddGroup(name) => push_unique(&mut draft.groups, name),
        Action::RemoveGroup(name) => remove_value(&mut draft.groups, &name),
        Action::ChangeCustomRepositories(repos) => draft.custom_repositories = repos,
        Action::ChangePayloadRepositories(repos) => draft.payload_repositories = repos,
        Action::ChangeRedHatRepositories(repos) => draft.red_hat_repositories = repos,
        Action::AddRecommendedRepository(repo) => {
            let known = draft
                .recommended_repositories
                .iter()
                .any(|r| r.uuid.is_some() && r.uuid == repo.uuid);
            if !known {
                draft.recommended_repositories.push(repo);
            }
        }
        Action::RemoveRecommendedRepository(uuid) => draft
            .recommended_repositories
            .retain(|r| r.uuid.as_deref() != Some(uuid.as_str())),
        Action::ChangeSnapshot(snapshot) => draft.snapshot = snapshot,

        Action::ChangeRegistration(registration) => draft.registration = registration,
        Action::ChangeOpenScapProfile(profile) => draft.openscap_profile = profile,

        Action::ChangeFilesystemMode(mode) => draft.filesystem = mode,
        Action::AddPartition(partition) => match &mut draft.filesystem {
            FilesystemMode::Custom(partitions) => {
                partitions.retain(|p| p.mountpoint != partition.mountpoint);
                partitions.push(partition);
            }
            FilesystemMode::Automatic => {
                draft.filesystem = FilesystemMode::Custom(vec![partition]);
            }
        },
        Action::RemovePartition(mountpoint) => {
            if let FilesystemMode::Custom(partitions) = &mut draft.filesystem {
                partitions.retain(|p| p.mountpoint != mountpoint);
            }
        }
        Action::AddUser(user) => {
            draft.users.retain(|u| u.name != user.name);
            draft.users.push(user);
        }
        Action::RemoveUser(name) => draft.users.retain(|u| u.name != name),
        Action::ChangeTimezone(timezone) => draft.timezone.timezone = timezone,
        Action::AddNtpServer(server) => push_unique(&mut draft.timezone.ntp_servers, server),
        Action::RemoveNtpServer(server) => remove_value(&mut draft.timezone.ntp_servers, &server),
        Action::AddLanguage(language) => push_unique(&mut draft.locale.languages, language),
        Action::RemoveLanguage(language) => remove_value(&mut draft.locale.languages, &language),
        Action::ChangeKeyboard(keyboard) => draft.locale.keyboard = keyboard,
        Action::ChangeHostname(hostname) => draft.hostname = hostname,
        Action::ChangeKernelName(name) => draft.kernel.name = name,
        Action::AddKernelArg(arg) => push_unique(&mut draft.kernel.append, arg),
        Action::RemoveKernelArg(arg) => remove_value(&mut draft.kernel.append, &arg),
        Action::ChangeFirewall(firewall) => draft.firewall = firewall,
        Action::ChangeServices(services) => draft.services = services,
        Action::ChangeFirstBootScript(script) => draft.first_boot_script = script,
    }
    state
}

/// Source of the timestamp baked into default names
pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Owner of the current wizard state.
#[derive(Debug, Clone)]
pub struct Store {
    state: WizardState,
    clock: Clock,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(WizardState::default())
    }
}

impl Store {
    pub fn new(state: WizardState) -> Self {
        Self::with_clock(state, local_now)
    }

    /// Store whose default names are stamped by `clock`
    pub fn with_clock(state: WizardState, clock: Clock) -> Self {
        Self { state, clock }
    }

    /// Current state
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Apply an action through the reducer.
    ///
    /// A new distribution or architecture re-derives the default name.
    pub fn dispatch(&mut self, action: Action) {
        let kind: &'static str = (&action).into();
        debug!(action = kind, "dispatch");
        let rename = matches!(
            action,
            Action::ChangeDistribution(_) | Action::ChangeArchitecture(_)
        );
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        if rename {
            self.refresh_default_name((self.clock)());
        }
    }

    /// Apply several actions in order
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Re-derive the default name from distribution and architecture.
    ///
    /// A user-chosen name is left alone.
    pub fn refresh_default_name(&mut self, now: NaiveDateTime) {
        let draft = &self.state.draft;
        let default_name = generate_default_name(draft.distribution, draft.architecture, now);
        if !draft.is_custom_name && draft.name != default_name {
            self.dispatch(Action::ApplyDefaultName(default_name));
        }
    }

    /// Give up ownership of the state
    pub fn into_state(self) -> WizardState {
        self.state
    }
}
