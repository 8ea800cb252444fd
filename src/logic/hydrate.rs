//! Blueprint hydration
//!
//! Turns a fetched blueprint back into a wizard state in edit mode, the
//! inverse of [`map_request_from_state`](super::mapper::map_request_from_state)
//! for every field the server returns.
//!
//! Lossy where the server is: passwords are never returned, and
//! recommended repositories come back as ordinary custom repositories.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::api::models::{BlueprintResponse, Customizations, FilesystemPartition, ImageRequest, User};
use crate::error::{ComposerError, Result};
use crate::logic::mapper::{ADMIN_GROUP, FIRST_BOOT_SCRIPT_PATH, FIRST_BOOT_SERVICE};
use crate::types::{GcpAccountType, ImageType, RegistrationType, SizeUnit, WizardMode};
use crate::wizard::draft::{
    AwsShare, AzureTarget, BlueprintDraft, FilesystemMode, FirewallConfig, GcpTarget,
    KernelConfig, LocaleConfig, Partition, Registration, ServicesConfig, SnapshotMode,
    TimezoneConfig, UserConfig,
};
use crate::wizard::store::WizardState;

/// Build an edit-mode wizard state from a fetched blueprint.
///
/// # Errors
///
/// Fails when the stored first-boot script is not valid base64 or UTF-8.
pub fn map_request_to_state(response: &BlueprintResponse) -> Result<WizardState> {
    let blueprint = &response.blueprint;
    let requests = &blueprint.image_requests;
    let c = &blueprint.customizations;
    debug!(id = %response.id, name = %blueprint.name, "hydrating blueprint");

    let (packages, groups) = split_packages(c.packages.as_deref().unwrap_or_default());

    let draft = BlueprintDraft {
        name: blueprint.name.clone(),
        description: blueprint.description.clone(),
        is_custom_name: true,
        distribution: blueprint.distribution,
        architecture: requests.first().map(|r| r.architecture).unwrap_or_default(),
        image_types: requests.iter().map(|r| r.image_type).collect(),
        aws: find_request(requests, ImageType::Aws).map(aws_share).unwrap_or_default(),
        gcp: find_request(requests, ImageType::Gcp).map(gcp_target).unwrap_or_default(),
        azure: find_request(requests, ImageType::Azure).map(azure_target).unwrap_or_default(),
        packages,
        groups,
        custom_repositories: c.custom_repositories.clone().unwrap_or_default(),
        payload_repositories: c.payload_repositories.clone().unwrap_or_default(),
        red_hat_repositories: Vec::new(),
        recommended_repositories: Vec::new(),
        snapshot: snapshot_mode(requests),
        registration: registration(c),
        openscap_profile: c.openscap.as_ref().map(|o| o.profile_id.clone()),
        filesystem: filesystem(c.filesystem.as_deref()),
        users: c.users.iter().flatten().map(user_config).collect(),
        timezone: c
            .timezone
            .as_ref()
            .map(|tz| TimezoneConfig {
                timezone: tz.timezone.clone().unwrap_or_default(),
                ntp_servers: tz.ntpservers.clone().unwrap_or_default(),
            })
            .unwrap_or_default(),
        locale: c
            .locale
            .as_ref()
            .map(|l| LocaleConfig {
                languages: l.languages.clone().unwrap_or_default(),
                keyboard: l.keyboard.clone().unwrap_or_default(),
            })
            .unwrap_or_default(),
        hostname: c.hostname.clone().unwrap_or_default(),
        kernel: c
            .kernel
            .as_ref()
            .map(|k| KernelConfig {
                name: k.name.clone().unwrap_or_default(),
                append: k
                    .append
                    .as_deref()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            })
            .unwrap_or_default(),
        firewall: firewall(c),
        services: services(c),
        first_boot_script: first_boot_script(c)?,
    };

    Ok(WizardState {
        mode: WizardMode::Edit,
        blueprint_id: Some(response.id.clone()),
        draft,
    })
}

fn find_request(requests: &[ImageRequest], image_type: ImageType) -> Option<&ImageRequest> {
    requests.iter().find(|r| r.image_type == image_type)
}

fn split_packages(entries: &[String]) -> (Vec<String>, Vec<String>) {
    let mut packages = Vec::new();
    let mut groups = Vec::new();
    for entry in entries {
        match entry.strip_prefix('@') {
            Some(group) => groups.push(group.to_string()),
            None => packages.push(entry.clone()),
        }
    }
    (packages, groups)
}

fn aws_share(request: &ImageRequest) -> AwsShare {
    let options = &request.upload_request.options;
    if let Some(source_id) = options.share_with_sources.as_ref().and_then(|s| s.first()) {
        return AwsShare::Source {
            source_id: source_id.clone(),
        };
    }
    AwsShare::Manual {
        account_id: options
            .share_with_accounts
            .as_ref()
            .and_then(|a| a.first())
            .cloned()
            .unwrap_or_default(),
    }
}

fn gcp_target(request: &ImageRequest) -> GcpTarget {
    let Some(account) = request
        .upload_request
        .options
        .share_with_accounts
        .as_ref()
        .and_then(|a| a.first())
    else {
        return GcpTarget::default();
    };
    match account.split_once(':') {
        Some((prefix, principal)) => GcpTarget {
            account_type: prefix.parse::<GcpAccountType>().unwrap_or_default(),
            principal: principal.to_string(),
        },
        None => GcpTarget {
            account_type: GcpAccountType::default(),
            principal: account.clone(),
        },
    }
}

fn azure_target(request: &ImageRequest) -> AzureTarget {
    let options = &request.upload_request.options;
    AzureTarget {
        source_id: options.source_id.clone(),
        tenant_id: options.tenant_id.clone().unwrap_or_default(),
        subscription_id: options.subscription_id.clone().unwrap_or_default(),
        resource_group: options.resource_group.clone().unwrap_or_default(),
    }
}

fn snapshot_mode(requests: &[ImageRequest]) -> SnapshotMode {
    let Some(first) = requests.first() else {
        return SnapshotMode::UseLatest;
    };
    if let Some(template) = &first.content_template {
        SnapshotMode::Template(template.clone())
    } else if let Some(date) = &first.snapshot_date {
        SnapshotMode::SnapshotDate(date.clone())
    } else {
        SnapshotMode::UseLatest
    }
}

fn registration(c: &Customizations) -> Registration {
    let Some(subscription) = &c.subscription else {
        return Registration::default();
    };
    let kind = match (subscription.insights, subscription.rhc) {
        (_, true) => RegistrationType::RegisterNowRhc,
        (true, false) => RegistrationType::RegisterNowInsights,
        (false, false) => RegistrationType::RegisterNow,
    };
    Registration {
        kind,
        activation_key: Some(subscription.activation_key.clone()).filter(|k| !k.is_empty()),
    }
}

/// Largest unit that expresses the size exactly; KiB rounds up
fn partition(fs: &FilesystemPartition) -> Partition {
    let unit = [SizeUnit::GiB, SizeUnit::MiB]
        .into_iter()
        .find(|unit| fs.min_size != 0 && fs.min_size % unit.multiplier() == 0)
        .unwrap_or(SizeUnit::KiB);
    Partition {
        mountpoint: fs.mountpoint.clone(),
        min_size: fs.min_size.div_ceil(unit.multiplier()),
        unit,
    }
}

fn filesystem(partitions: Option<&[FilesystemPartition]>) -> FilesystemMode {
    match partitions {
        Some(partitions) if !partitions.is_empty() => {
            FilesystemMode::Custom(partitions.iter().map(partition).collect())
        }
        _ => FilesystemMode::Automatic,
    }
}

fn user_config(user: &User) -> UserConfig {
    UserConfig {
        name: user.name.clone(),
        password: String::new(),
        ssh_key: user.ssh_key.clone().unwrap_or_default(),
        is_administrator: user.groups.iter().any(|g| g == ADMIN_GROUP),
        groups: user
            .groups
            .iter()
            .filter(|g| *g != ADMIN_GROUP)
            .cloned()
            .collect(),
    }
}

fn firewall(c: &Customizations) -> FirewallConfig {
    let Some(fw) = &c.firewall else {
        return FirewallConfig::default();
    };
    let services = fw.services.clone().unwrap_or_default();
    FirewallConfig {
        ports: fw.ports.clone().unwrap_or_default(),
        enabled_services: services.enabled.unwrap_or_default(),
        disabled_services: services.disabled.unwrap_or_default(),
    }
}

fn services(c: &Customizations) -> ServicesConfig {
    let Some(services) = &c.services else {
        return ServicesConfig::default();
    };
    ServicesConfig {
        enabled: services
            .enabled
            .iter()
            .flatten()
            .filter(|s| *s != FIRST_BOOT_SERVICE)
            .cloned()
            .collect(),
        disabled: services.disabled.clone().unwrap_or_default(),
        masked: services.masked.clone().unwrap_or_default(),
    }
}

fn first_boot_script(c: &Customizations) -> Result<String> {
    let Some(file) = c
        .files
        .iter()
        .flatten()
        .find(|f| f.path == FIRST_BOOT_SCRIPT_PATH)
    else {
        return Ok(String::new());
    };
    if file.data_encoding.as_deref() != Some("base64") {
        return Ok(file.data.clone());
    }
    let bytes = STANDARD
        .decode(&file.data)
        .map_err(|e| ComposerError::general(format!("{}: invalid base64: {}", FIRST_BOOT_SCRIPT_PATH, e)))?;
    String::from_utf8(bytes)
        .map_err(|e| ComposerError::general(format!("{}: invalid UTF-8: {}", FIRST_BOOT_SCRIPT_PATH, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{CreateBlueprintRequest, UploadOptions, UploadRequest, UploadType};
    use crate::logic::mapper::{map_request_from_state, ServerContext};
    use crate::types::{Architecture, Distribution};

    fn response(blueprint: CreateBlueprintRequest) -> BlueprintResponse {
        BlueprintResponse {
            id: "bp-1".to_string(),
            blueprint,
        }
    }

    #[test]
    fn test_hydrated_state_is_edit_mode() {
        let request = CreateBlueprintRequest {
            name: "web".to_string(),
            description: String::new(),
            distribution: Distribution::Rhel8,
            image_requests: vec![ImageRequest {
                architecture: Architecture::Aarch64,
                image_type: ImageType::Gcp,
                upload_request: UploadRequest {
                    upload_type: UploadType::Gcp,
                    options: UploadOptions {
                        share_with_accounts: Some(vec!["group:ops@example.com".to_string()]),
                        ..Default::default()
                    },
                },
                snapshot_date: Some("2024-01-01".to_string()),
                content_template: None,
            }],
            customizations: Customizations {
                packages: Some(vec!["vim".to_string(), "@core".to_string()]),
                ..Default::default()
            },
        };
        let state = map_request_to_state(&response(request)).unwrap();
        assert_eq!(state.mode, WizardMode::Edit);
        assert_eq!(state.blueprint_id.as_deref(), Some("bp-1"));
        assert_eq!(state.draft.architecture, Architecture::Aarch64);
        assert_eq!(state.draft.gcp.account_type, GcpAccountType::Group);
        assert_eq!(state.draft.gcp.principal, "ops@example.com");
        assert_eq!(state.draft.groups, vec!["core".to_string()]);
        assert_eq!(
            state.draft.snapshot,
            SnapshotMode::SnapshotDate("2024-01-01".to_string())
        );
    }

    #[test]
    fn test_partition_unit_choice() {
        let gib = partition(&FilesystemPartition {
            mountpoint: "/".to_string(),
            min_size: 3 * 1024 * 1024 * 1024,
        });
        assert_eq!((gib.min_size, gib.unit), (3, SizeUnit::GiB));
        let mib = partition(&FilesystemPartition {
            mountpoint: "/var".to_string(),
            min_size: 1536 * 1024 * 1024,
        });
        assert_eq!((mib.min_size, mib.unit), (1536, SizeUnit::MiB));
        let odd = partition(&FilesystemPartition {
            mountpoint: "/tmp".to_string(),
            min_size: 1025,
        });
        assert_eq!((odd.min_size, odd.unit), (2, SizeUnit::KiB));
    }

    #[test]
    fn test_mapped_customizations_survive_hydration() {
        let mut draft = BlueprintDraft {
            name: "edge".to_string(),
            hostname: "edge-01".to_string(),
            first_boot_script: "#!/bin/sh\ntrue\n".to_string(),
            ..Default::default()
        };
        draft.users.push(UserConfig {
            name: "ops".to_string(),
            is_administrator: true,
            ssh_key: "ssh-ed25519 AAAA ops".to_string(),
            ..Default::default()
        });
        draft.services.enabled = vec!["sshd".to_string()];
        draft.registration = Registration {
            kind: RegistrationType::RegisterNowInsights,
            activation_key: Some("ak".to_string()),
        };
        let state = WizardState {
            draft,
            ..Default::default()
        };
        let request = map_request_from_state(&state, Some("7"), &ServerContext::default()).unwrap();

        let hydrated = map_request_to_state(&response(request)).unwrap();
        let d = &hydrated.draft;
        assert_eq!(d.hostname, "edge-01");
        assert_eq!(d.first_boot_script, "#!/bin/sh\ntrue\n");
        assert_eq!(d.services.enabled, vec!["sshd".to_string()]);
        assert!(d.users[0].is_administrator);
        assert!(d.users[0].groups.is_empty());
        assert_eq!(d.registration.kind, RegistrationType::RegisterNowInsights);
        assert_eq!(d.registration.activation_key.as_deref(), Some("ak"));
    }
}
