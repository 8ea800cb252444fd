//! Wizard step sequence
//!
//! The wizard walks these steps in order. Target-environment steps only
//! appear for selected targets, and hosted-only steps disappear on premise.
//!
//! ```text
//! ImageOutput -> [Aws] -> [Gcp] -> [Azure] -> {Registration} -> {OpenScap}
//!   -> FileSystem -> {RepeatableBuild} -> {Repositories} -> Packages -> Users
//!   -> Timezone -> Locale -> Hostname -> Kernel -> Firewall -> Services
//!   -> {FirstBoot} -> Details -> Review
//! ```
//!
//! `[..]` steps depend on the selected targets, `{..}` steps are hosted-only.

use crate::types::ImageType;
use crate::wizard::draft::{BlueprintDraft, FilesystemMode};
use crate::wizard::validation::{
    are_partitions_valid, is_aws_share_valid, is_azure_target_valid,
    is_blueprint_description_valid, is_blueprint_name_valid, is_hostname_valid,
    is_kernel_argument_valid, is_kernel_name_valid, is_ntp_server_valid, is_port_valid,
    is_registration_valid, is_service_valid, is_ssh_key_valid, is_user_name_valid,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    ImageOutput,
    TargetAws,
    TargetGcp,
    TargetAzure,
    Registration,
    OpenScap,
    FileSystem,
    RepeatableBuild,
    Repositories,
    Packages,
    Users,
    Timezone,
    Locale,
    Hostname,
    Kernel,
    Firewall,
    Services,
    FirstBoot,
    Details,
    Review,
}

impl WizardStep {
    /// Every step in wizard order, visible or not
    pub const ALL: [Self; 20] = [
        Self::ImageOutput,
        Self::TargetAws,
        Self::TargetGcp,
        Self::TargetAzure,
        Self::Registration,
        Self::OpenScap,
        Self::FileSystem,
        Self::RepeatableBuild,
        Self::Repositories,
        Self::Packages,
        Self::Users,
        Self::Timezone,
        Self::Locale,
        Self::Hostname,
        Self::Kernel,
        Self::Firewall,
        Self::Services,
        Self::FirstBoot,
        Self::Details,
        Self::Review,
    ];

    /// Navigation label of the step
    pub fn title(&self) -> &'static str {
        match self {
            Self::ImageOutput => "Image output",
            Self::TargetAws => "Amazon Web Services",
            Self::TargetGcp => "Google Cloud Platform",
            Self::TargetAzure => "Microsoft Azure",
            Self::Registration => "Register",
            Self::OpenScap => "OpenSCAP",
            Self::FileSystem => "File system configuration",
            Self::RepeatableBuild => "Repeatable build",
            Self::Repositories => "Custom repositories",
            Self::Packages => "Additional packages",
            Self::Users => "Users",
            Self::Timezone => "Timezone",
            Self::Locale => "Locale",
            Self::Hostname => "Hostname",
            Self::Kernel => "Kernel",
            Self::Firewall => "Firewall",
            Self::Services => "Systemd services",
            Self::FirstBoot => "First boot script configuration",
            Self::Details => "Details",
            Self::Review => "Review",
        }
    }

    /// Steps that only exist in the hosted service
    pub fn is_hosted_only(&self) -> bool {
        matches!(
            self,
            Self::Registration
                | Self::OpenScap
                | Self::RepeatableBuild
                | Self::Repositories
                | Self::FirstBoot
        )
    }

    /// Whether the step is part of the wizard for this draft
    pub fn is_visible(&self, draft: &BlueprintDraft, on_premise: bool) -> bool {
        if on_premise && self.is_hosted_only() {
            return false;
        }
        match self {
            Self::TargetAws => draft.image_types.contains(&ImageType::Aws),
            Self::TargetGcp => draft.image_types.contains(&ImageType::Gcp),
            Self::TargetAzure => draft.image_types.contains(&ImageType::Azure),
            _ => true,
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Next visible step, or `None` from Review
    pub fn next(&self, draft: &BlueprintDraft, on_premise: bool) -> Option<Self> {
        Self::ALL[self.position() + 1..]
            .iter()
            .copied()
            .find(|s| s.is_visible(draft, on_premise))
    }

    /// Previous visible step, or `None` from ImageOutput
    pub fn previous(&self, draft: &BlueprintDraft, on_premise: bool) -> Option<Self> {
        Self::ALL[..self.position()]
            .iter()
            .rev()
            .copied()
            .find(|s| s.is_visible(draft, on_premise))
    }

    /// Steps shown in the navigation, in order
    pub fn visible_steps(draft: &BlueprintDraft, on_premise: bool) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.is_visible(draft, on_premise))
            .collect()
    }

    /// Whether the step's fields allow moving on
    pub fn is_valid(&self, draft: &BlueprintDraft) -> bool {
        match self {
            Self::ImageOutput => !draft.image_types.is_empty(),
            Self::TargetAws => is_aws_share_valid(&draft.aws),
            Self::TargetGcp => !draft.gcp.principal.trim().is_empty(),
            Self::TargetAzure => is_azure_target_valid(&draft.azure),
            Self::Registration => is_registration_valid(&draft.registration),
            Self::FileSystem => match &draft.filesystem {
                FilesystemMode::Automatic => true,
                FilesystemMode::Custom(partitions) => are_partitions_valid(partitions),
            },
            Self::Users => draft.users.iter().all(|u| {
                is_user_name_valid(&u.name) && (u.ssh_key.is_empty() || is_ssh_key_valid(&u.ssh_key))
            }),
            Self::Timezone => draft.timezone.ntp_servers.iter().all(|s| is_ntp_server_valid(s)),
            Self::Hostname => is_hostname_valid(&draft.hostname),
            Self::Kernel => {
                is_kernel_name_valid(&draft.kernel.name)
                    && draft.kernel.append.iter().all(|a| is_kernel_argument_valid(a))
            }
            Self::Firewall => {
                let fw = &draft.firewall;
                fw.ports.iter().all(|p| is_port_valid(p))
                    && fw
                        .enabled_services
                        .iter()
                        .chain(&fw.disabled_services)
                        .all(|s| is_service_valid(s))
            }
            Self::Services => {
                let sv = &draft.services;
                sv.enabled
                    .iter()
                    .chain(&sv.disabled)
                    .chain(&sv.masked)
                    .all(|s| is_service_valid(s))
            }
            Self::Details => {
                is_blueprint_name_valid(&draft.name)
                    && is_blueprint_description_valid(&draft.description)
            }
            Self::OpenScap
            | Self::RepeatableBuild
            | Self::Repositories
            | Self::Packages
            | Self::Locale
            | Self::FirstBoot
            | Self::Review => true,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
