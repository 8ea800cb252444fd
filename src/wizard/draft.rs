//! The blueprint draft: everything the wizard collects before it is mapped
//! into a request payload.
//!
//! Drafts are plain serde data so the CLI can read them from JSON; every field
//! defaults, which makes partial drafts valid input.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::models::{ApiRepository, CustomRepository, PayloadRepository};
use crate::types::{
    Architecture, Distribution, GcpAccountType, ImageType, RegistrationType, SizeUnit,
};

/// How the AWS image is shared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum AwsShare {
    /// Share with the account behind a configured cloud source
    Source { source_id: String },
    /// Share with an explicit account id
    Manual { account_id: String },
}

impl Default for AwsShare {
    fn default() -> Self {
        Self::Manual {
            account_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpTarget {
    pub account_type: GcpAccountType,
    /// Email (or domain for `Domain`) of the principal the image is shared with
    pub principal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureTarget {
    pub source_id: Option<String>,
    pub tenant_id: String,
    pub subscription_id: String,
    pub resource_group: String,
}

/// Point in time the image content is taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "kebab-case")]
pub enum SnapshotMode {
    UseLatest,
    /// `YYYY-MM-DD`
    SnapshotDate(String),
    /// Content template uuid
    Template(String),
}

impl Default for SnapshotMode {
    fn default() -> Self {
        Self::UseLatest
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub kind: RegistrationType,
    pub activation_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub mountpoint: String,
    pub min_size: u64,
    #[serde(default)]
    pub unit: SizeUnit,
}

impl Partition {
    pub fn size_in_bytes(&self) -> u64 {
        self.min_size.saturating_mul(self.unit.multiplier())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "partitions", rename_all = "kebab-case")]
pub enum FilesystemMode {
    /// Let the image builder pick the layout
    #[default]
    Automatic,
    Custom(Vec<Partition>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub name: String,
    pub password: String,
    pub ssh_key: String,
    pub is_administrator: bool,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    pub timezone: String,
    pub ntp_servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub languages: Vec<String>,
    pub keyboard: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub name: String,
    pub append: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    pub ports: Vec<String>,
    pub enabled_services: Vec<String>,
    pub disabled_services: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub masked: Vec<String>,
}

/// In-memory blueprint under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintDraft {
    // Image output
    pub name: String,
    pub description: String,
    /// Set once the user types a name; stops the default name from tracking
    /// distribution and architecture changes
    pub is_custom_name: bool,
    pub distribution: Distribution,
    pub architecture: Architecture,
    pub image_types: Vec<ImageType>,
    pub aws: AwsShare,
    pub gcp: GcpTarget,
    pub azure: AzureTarget,

    // Content
    pub packages: Vec<String>,
    pub groups: Vec<String>,
    pub custom_repositories: Vec<CustomRepository>,
    pub payload_repositories: Vec<PayloadRepository>,
    pub red_hat_repositories: Vec<PayloadRepository>,
    pub recommended_repositories: Vec<ApiRepository>,
    pub snapshot: SnapshotMode,

    // Registration & security
    pub registration: Registration,
    pub openscap_profile: Option<String>,

    // System
    pub filesystem: FilesystemMode,
    pub users: Vec<UserConfig>,
    pub timezone: TimezoneConfig,
    pub locale: LocaleConfig,
    pub hostname: String,
    pub kernel: KernelConfig,
    pub firewall: FirewallConfig,
    pub services: ServicesConfig,
    pub first_boot_script: String,
}

/// Default blueprint name: `<distribution>-<arch>-<MMDDYYYY>-<HHMM>`.
pub fn generate_default_name(
    distribution: Distribution,
    architecture: Architecture,
    now: NaiveDateTime,
) -> String {
    format!(
        "{}-{}-{}",
        distribution,
        architecture,
        now.format("%m%d%Y-%H%M")
    )
}
