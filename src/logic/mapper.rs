//! Blueprint Request Mapper
//!
//! Turns the wizard state into the image-builder create/update payload.
//!
//! # Design
//!
//! - **Pure**: no I/O; the same state, organization and server context always
//!   produce the same payload
//! - **Omit empty**: sub-configs the user left blank are not sent at all
//! - **Server values merged**: kernel arguments and services required by the
//!   chosen OpenSCAP profile are merged in, deduplicated, order preserved
//!
//! # Mapping Rules
//!
//! | Draft field | Payload |
//! |-------------|---------|
//! | `image_types` | one `image_requests` entry per target |
//! | `packages` + `groups` | `packages`, groups prefixed with `@` |
//! | custom / payload + recommended | `custom_repositories` / `payload_repositories` |
//! | `filesystem` (custom) | `filesystem`, sizes in bytes |
//! | `registration` | `subscription` (omitted for "register later") |
//! | `first_boot_script` | two `files` entries + `custom-first-boot` service |

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::models::{
    CreateBlueprintRequest, CustomRepository, Customizations, File, FilesystemPartition, Firewall,
    FirewallServices, ImageRequest, Kernel, Locale, OpenScap, PayloadRepository, Services,
    Subscription, Timezone, UploadOptions, UploadRequest, UploadType, User,
};
use crate::error::{ComposerError, Result};
use crate::repositories::convert::{convert_schema_to_custom_repo, convert_schema_to_payload_repo};
use crate::types::{ImageType, RegistrationType};
use crate::wizard::draft::{
    AwsShare, BlueprintDraft, FilesystemMode, SnapshotMode, UserConfig,
};
use crate::wizard::store::WizardState;

pub const RHSM_SERVER_URL: &str = "subscription.rhsm.redhat.com";
pub const RHSM_BASE_URL: &str = "https://cdn.redhat.com/";

pub const FIRST_BOOT_SERVICE: &str = "custom-first-boot";
pub const FIRST_BOOT_SCRIPT_PATH: &str = "/usr/local/sbin/custom-first-boot";
pub const FIRST_BOOT_SERVICE_PATH: &str = "/etc/systemd/system/custom-first-boot.service";
pub const ADMIN_GROUP: &str = "wheel";

/// Unit that runs the first-boot script once, after the network is up
pub const FIRST_BOOT_UNIT: &str = "[Unit]
Description=Custom first boot script
ConditionFileIsExecutable=/usr/local/sbin/custom-first-boot
ConditionPathExists=!/var/local/.custom-first-boot-done
Wants=network-online.target
After=network-online.target
After=osbuild-first-boot.service

[Service]
Type=oneshot
ExecStart=/usr/local/sbin/custom-first-boot
ExecStartPost=/usr/bin/touch /var/local/.custom-first-boot-done

[Install]
WantedBy=multi-user.target
";

/// Server-fetched values the form does not own.
///
/// Filled from the selected OpenSCAP profile's customizations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerContext {
    pub kernel_append: Vec<String>,
    pub enabled_services: Vec<String>,
    pub disabled_services: Vec<String>,
    pub masked_services: Vec<String>,
}

// ============================================================================
// Entry point
// ============================================================================

/// Build the create/update request for the current wizard state.
///
/// # Errors
///
/// - [`ComposerError::MissingOrganization`] when `org_id` is absent or blank
/// - [`ComposerError::InvalidOrganization`] when registration is requested and
///   `org_id` is not numeric
pub fn map_request_from_state(
    state: &WizardState,
    org_id: Option<&str>,
    server: &ServerContext,
) -> Result<CreateBlueprintRequest> {
    let org_id = org_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ComposerError::MissingOrganization)?;
    let draft = &state.draft;
    debug!(
        name = %draft.name,
        targets = draft.image_types.len(),
        mode = %state.mode,
        "mapping blueprint request"
    );

    Ok(CreateBlueprintRequest {
        name: draft.name.clone(),
        description: draft.description.clone(),
        distribution: draft.distribution,
        image_requests: map_image_requests(draft),
        customizations: map_customizations(draft, org_id, server)?,
    })
}

// ============================================================================
// Image requests
// ============================================================================

fn map_image_requests(draft: &BlueprintDraft) -> Vec<ImageRequest> {
    let (snapshot_date, content_template) = match &draft.snapshot {
        SnapshotMode::UseLatest => (None, None),
        SnapshotMode::SnapshotDate(date) => (Some(date.clone()), None),
        SnapshotMode::Template(uuid) => (None, Some(uuid.clone())),
    };

    draft
        .image_types
        .iter()
        .map(|&image_type| ImageRequest {
            architecture: draft.architecture,
            image_type,
            upload_request: map_upload_request(draft, image_type),
            snapshot_date: snapshot_date.clone(),
            content_template: content_template.clone(),
        })
        .collect()
}

fn map_upload_request(draft: &BlueprintDraft, image_type: ImageType) -> UploadRequest {
    let (upload_type, options) = match image_type {
        ImageType::Aws => {
            let options = match &draft.aws {
                AwsShare::Source { source_id } => UploadOptions {
                    share_with_sources: Some(vec![source_id.clone()]),
                    ..Default::default()
                },
                AwsShare::Manual { account_id } => UploadOptions {
                    share_with_accounts: Some(vec![account_id.clone()]),
                    ..Default::default()
                },
            };
            (UploadType::Aws, options)
        }
        ImageType::Gcp => {
            let gcp = &draft.gcp;
            let principal = format!("{}:{}", gcp.account_type.prefix(), gcp.principal);
            let options = UploadOptions {
                share_with_accounts: Some(vec![principal]),
                ..Default::default()
            };
            (UploadType::Gcp, options)
        }
        ImageType::Azure => {
            let azure = &draft.azure;
            let options = match &azure.source_id {
                Some(source_id) => UploadOptions {
                    source_id: Some(source_id.clone()),
                    resource_group: Some(azure.resource_group.clone()),
                    ..Default::default()
                },
                None => UploadOptions {
                    tenant_id: Some(azure.tenant_id.clone()),
                    subscription_id: Some(azure.subscription_id.clone()),
                    resource_group: Some(azure.resource_group.clone()),
                    ..Default::default()
                },
            };
            (UploadType::Azure, options)
        }
        ImageType::Oci => (UploadType::OciObjectStorage, UploadOptions::default()),
        _ => (UploadType::AwsS3, UploadOptions::default()),
    };
    UploadRequest {
        upload_type,
        options,
    }
}

// ============================================================================
// Customizations
// ============================================================================

fn map_customizations(
    draft: &BlueprintDraft,
    org_id: &str,
    server: &ServerContext,
) -> Result<Customizations> {
    let has_first_boot = !draft.first_boot_script.trim().is_empty();

    Ok(Customizations {
        custom_repositories: non_empty(map_custom_repositories(draft)),
        payload_repositories: non_empty(map_payload_repositories(draft)),
        packages: non_empty(map_packages(draft)),
        filesystem: map_filesystem(&draft.filesystem),
        users: non_empty(draft.users.iter().map(map_user).collect()),
        timezone: map_timezone(draft),
        locale: map_locale(draft),
        hostname: non_blank(&draft.hostname),
        kernel: map_kernel(draft, server),
        firewall: map_firewall(draft),
        services: map_services(draft, server, has_first_boot),
        subscription: map_subscription(draft, org_id)?,
        openscap: draft
            .openscap_profile
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|profile_id| OpenScap {
                profile_id: profile_id.to_string(),
            }),
        files: has_first_boot.then(|| map_first_boot_files(&draft.first_boot_script)),
    })
}

fn map_packages(draft: &BlueprintDraft) -> Vec<String> {
    draft
        .packages
        .iter()
        .cloned()
        .chain(draft.groups.iter().map(|group| format!("@{}", group)))
        .collect()
}

/// Custom list plus recommended repositories not already in it
fn map_custom_repositories(draft: &BlueprintDraft) -> Vec<CustomRepository> {
    let mut repos = draft.custom_repositories.clone();
    for recommended in &draft.recommended_repositories {
        let Some(uuid) = recommended.uuid.as_deref() else {
            continue;
        };
        if !repos.iter().any(|r| r.id == uuid) {
            repos.push(convert_schema_to_custom_repo(recommended));
        }
    }
    repos
}

/// Payload list plus recommended repositories not already in it
fn map_payload_repositories(draft: &BlueprintDraft) -> Vec<PayloadRepository> {
    let mut repos = draft.payload_repositories.clone();
    for recommended in &draft.recommended_repositories {
        let Some(uuid) = recommended.uuid.as_deref() else {
            continue;
        };
        if !repos.iter().any(|r| r.id.as_deref() == Some(uuid)) {
            repos.push(convert_schema_to_payload_repo(recommended));
        }
    }
    repos
}

fn map_filesystem(mode: &FilesystemMode) -> Option<Vec<FilesystemPartition>> {
    match mode {
        FilesystemMode::Automatic => None,
        FilesystemMode::Custom(partitions) => non_empty(
            partitions
                .iter()
                .map(|p| FilesystemPartition {
                    mountpoint: p.mountpoint.clone(),
                    min_size: p.size_in_bytes(),
                })
                .collect(),
        ),
    }
}

fn map_user(user: &UserConfig) -> User {
    let mut groups = user.groups.clone();
    if user.is_administrator && !groups.iter().any(|g| g == ADMIN_GROUP) {
        groups.push(ADMIN_GROUP.to_string());
    }
    User {
        name: user.name.clone(),
        password: non_blank(&user.password),
        ssh_key: non_blank(&user.ssh_key),
        groups,
        has_password: Some(!user.password.is_empty()),
    }
}

fn map_timezone(draft: &BlueprintDraft) -> Option<Timezone> {
    let tz = &draft.timezone;
    if tz.timezone.is_empty() && tz.ntp_servers.is_empty() {
        return None;
    }
    Some(Timezone {
        timezone: non_blank(&tz.timezone),
        ntpservers: non_empty(tz.ntp_servers.clone()),
    })
}

fn map_locale(draft: &BlueprintDraft) -> Option<Locale> {
    let locale = &draft.locale;
    if locale.languages.is_empty() && locale.keyboard.is_empty() {
        return None;
    }
    Some(Locale {
        languages: non_empty(locale.languages.clone()),
        keyboard: non_blank(&locale.keyboard),
    })
}

fn map_kernel(draft: &BlueprintDraft, server: &ServerContext) -> Option<Kernel> {
    let append = merge_unique(&draft.kernel.append, &server.kernel_append);
    if draft.kernel.name.is_empty() && append.is_empty() {
        return None;
    }
    Some(Kernel {
        name: non_blank(&draft.kernel.name),
        append: (!append.is_empty()).then(|| append.join(" ")),
    })
}

fn map_firewall(draft: &BlueprintDraft) -> Option<Firewall> {
    let fw = &draft.firewall;
    let services = (!fw.enabled_services.is_empty() || !fw.disabled_services.is_empty()).then(
        || FirewallServices {
            enabled: non_empty(fw.enabled_services.clone()),
            disabled: non_empty(fw.disabled_services.clone()),
        },
    );
    if fw.ports.is_empty() && services.is_none() {
        return None;
    }
    Some(Firewall {
        ports: non_empty(fw.ports.clone()),
        services,
    })
}

fn map_services(
    draft: &BlueprintDraft,
    server: &ServerContext,
    has_first_boot: bool,
) -> Option<Services> {
    let mut enabled = merge_unique(&draft.services.enabled, &server.enabled_services);
    if has_first_boot && !enabled.iter().any(|s| s == FIRST_BOOT_SERVICE) {
        enabled.push(FIRST_BOOT_SERVICE.to_string());
    }
    let disabled = merge_unique(&draft.services.disabled, &server.disabled_services);
    let masked = merge_unique(&draft.services.masked, &server.masked_services);

    if enabled.is_empty() && disabled.is_empty() && masked.is_empty() {
        return None;
    }
    Some(Services {
        enabled: non_empty(enabled),
        disabled: non_empty(disabled),
        masked: non_empty(masked),
    })
}

fn map_subscription(draft: &BlueprintDraft, org_id: &str) -> Result<Option<Subscription>> {
    let registration = &draft.registration;
    if registration.kind == RegistrationType::RegisterLater {
        return Ok(None);
    }
    let organization: i64 = org_id
        .parse()
        .map_err(|_| ComposerError::InvalidOrganization(org_id.to_string()))?;

    Ok(Some(Subscription {
        activation_key: registration.activation_key.clone().unwrap_or_default(),
        organization,
        server_url: RHSM_SERVER_URL.to_string(),
        base_url: RHSM_BASE_URL.to_string(),
        insights: registration.kind.insights(),
        rhc: registration.kind.rhc(),
    }))
}

fn map_first_boot_files(script: &str) -> Vec<File> {
    vec![
        File {
            path: FIRST_BOOT_SERVICE_PATH.to_string(),
            data: STANDARD.encode(FIRST_BOOT_UNIT),
            data_encoding: Some("base64".to_string()),
            ensure_parents: true,
        },
        File {
            path: FIRST_BOOT_SCRIPT_PATH.to_string(),
            data: STANDARD.encode(script),
            data_encoding: Some("base64".to_string()),
            ensure_parents: true,
        },
    ]
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// `base` followed by the entries of `extra` it does not already contain
fn merge_unique(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(base.len() + extra.len());
    for item in base.iter().chain(extra) {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}
