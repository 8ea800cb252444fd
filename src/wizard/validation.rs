//! Field validation for blueprint drafts.
//!
//! Each validator is a plain predicate so wizard steps can grey out their
//! "Next" button; [`validate_draft`] runs them all and reports the first
//! failure as a [`ComposerError::Validation`].

use crate::error::{ComposerError, Result};
use crate::types::{ImageType, RegistrationType};
use crate::wizard::draft::{
    AwsShare, AzureTarget, BlueprintDraft, FilesystemMode, Partition, Registration,
};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 250;
pub const MAX_HOSTNAME_LENGTH: usize = 64;
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Mountpoints a custom partition may use (or live under)
pub const ALLOWED_MOUNTPOINTS: &[&str] = &[
    "/", "/app", "/boot", "/data", "/home", "/opt", "/srv", "/tmp", "/usr", "/var",
];

pub fn is_blueprint_name_valid(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && name.chars().count() <= MAX_NAME_LENGTH
}

pub fn is_blueprint_description_valid(description: &str) -> bool {
    description.chars().count() <= MAX_DESCRIPTION_LENGTH
}

fn is_dns_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

/// Empty means "keep the default hostname"
pub fn is_hostname_valid(hostname: &str) -> bool {
    hostname.is_empty()
        || (hostname.len() <= MAX_HOSTNAME_LENGTH && hostname.split('.').all(is_dns_label))
}

pub fn is_user_name_valid(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_USERNAME_LENGTH
        && first.is_ascii_alphanumeric()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !name.chars().all(|c| c.is_ascii_digit())
}

pub fn is_ssh_key_valid(key: &str) -> bool {
    const KEY_TYPES: &[&str] = &[
        "ssh-rsa",
        "ssh-ed25519",
        "ssh-dss",
        "ecdsa-sha2-nistp256",
        "ecdsa-sha2-nistp384",
        "ecdsa-sha2-nistp521",
        "sk-ssh-ed25519@openssh.com",
        "sk-ecdsa-sha2-nistp256@openssh.com",
    ];
    let mut parts = key.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(kind), Some(body)) => KEY_TYPES.contains(&kind) && !body.is_empty(),
        _ => false,
    }
}

/// Empty means "default kernel"
pub fn is_kernel_name_valid(name: &str) -> bool {
    name.is_empty()
        || name
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

pub fn is_kernel_argument_valid(arg: &str) -> bool {
    !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '-' | '_' | ',' | '.' | '"' | '\'' | '/' | ':'))
}

/// Hostname or IPv4/IPv6 address
pub fn is_ntp_server_valid(server: &str) -> bool {
    !server.is_empty()
        && (server.parse::<std::net::IpAddr>().is_ok() || server.split('.').all(is_dns_label))
}

fn is_port_number(value: &str) -> bool {
    (1..=5).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

fn is_port_name(value: &str) -> bool {
    (1..=6).contains(&value.len()) && value.chars().all(|c| c.is_ascii_lowercase())
}

/// `port:protocol`, `start-end:protocol` or `service:protocol`
pub fn is_port_valid(port: &str) -> bool {
    let Some((range, protocol)) = port.split_once(':') else {
        return false;
    };
    if !is_port_name(protocol) {
        return false;
    }
    match range.split_once('-') {
        Some((start, end)) => is_port_number(start) && is_port_number(end),
        None => is_port_number(range) || is_port_name(range),
    }
}

pub fn is_service_valid(service: &str) -> bool {
    (1..=256).contains(&service.len())
        && service
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '\\' | '-'))
}

pub fn is_mountpoint_valid(mountpoint: &str) -> bool {
    ALLOWED_MOUNTPOINTS.iter().any(|allowed| {
        mountpoint == *allowed
            || (*allowed != "/"
                && mountpoint
                    .strip_prefix(allowed)
                    .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1))
    }) && !mountpoint.ends_with("/..")
        && !mountpoint.contains("/../")
}

/// Custom layouts need a root partition, unique mountpoints and non-zero sizes
pub fn are_partitions_valid(partitions: &[Partition]) -> bool {
    let has_root = partitions.iter().any(|p| p.mountpoint == "/");
    let unique = partitions
        .iter()
        .enumerate()
        .all(|(i, p)| partitions[..i].iter().all(|q| q.mountpoint != p.mountpoint));
    has_root
        && unique
        && partitions
            .iter()
            .all(|p| p.min_size > 0 && is_mountpoint_valid(&p.mountpoint))
}

/// Source id, or a 12 digit account id
pub fn is_aws_share_valid(share: &AwsShare) -> bool {
    match share {
        AwsShare::Source { source_id } => !source_id.is_empty(),
        AwsShare::Manual { account_id } => {
            account_id.len() == 12 && account_id.chars().all(|c| c.is_ascii_digit())
        }
    }
}

/// A resource group plus either a source or a tenant/subscription pair
pub fn is_azure_target_valid(azure: &AzureTarget) -> bool {
    !azure.resource_group.is_empty()
        && (azure.source_id.as_deref().is_some_and(|s| !s.is_empty())
            || (!azure.tenant_id.is_empty() && !azure.subscription_id.is_empty()))
}

/// Registering needs an activation key
pub fn is_registration_valid(registration: &Registration) -> bool {
    registration.kind == RegistrationType::RegisterLater
        || registration
            .activation_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
}

/// Validate the complete draft, reporting the first problem found
pub fn validate_draft(draft: &BlueprintDraft) -> Result<()> {
    if !is_blueprint_name_valid(&draft.name) {
        return Err(ComposerError::validation(format!(
            "Blueprint name must be 1-{} characters long",
            MAX_NAME_LENGTH
        )));
    }
    if !is_blueprint_description_valid(&draft.description) {
        return Err(ComposerError::validation(format!(
            "Blueprint description must be at most {} characters long",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    if draft.image_types.is_empty() {
        return Err(ComposerError::validation(
            "At least one target environment must be selected",
        ));
    }
    if draft.image_types.contains(&ImageType::Aws) && !is_aws_share_valid(&draft.aws) {
        return Err(ComposerError::validation(
            "AWS target needs a source or a 12 digit account id",
        ));
    }
    if draft.image_types.contains(&ImageType::Gcp) && draft.gcp.principal.trim().is_empty() {
        return Err(ComposerError::validation(
            "Google Cloud target needs a principal to share the image with",
        ));
    }
    if draft.image_types.contains(&ImageType::Azure) && !is_azure_target_valid(&draft.azure) {
        return Err(ComposerError::validation(
            "Azure target needs a tenant, subscription and resource group",
        ));
    }
    if !is_registration_valid(&draft.registration) {
        return Err(ComposerError::validation(
            "An activation key is required to register the image",
        ));
    }
    if let FilesystemMode::Custom(partitions) = &draft.filesystem {
        if !are_partitions_valid(partitions) {
            return Err(ComposerError::validation(
                "Custom partitions need a root partition, unique allowed mountpoints and a size",
            ));
        }
    }
    for user in &draft.users {
        if !is_user_name_valid(&user.name) {
            return Err(ComposerError::validation(format!(
                "Invalid user name: {:?}",
                user.name
            )));
        }
        if !user.ssh_key.is_empty() && !is_ssh_key_valid(&user.ssh_key) {
            return Err(ComposerError::validation(format!(
                "Invalid SSH key for user {}",
                user.name
            )));
        }
    }
    if let Some(server) = draft
        .timezone
        .ntp_servers
        .iter()
        .find(|s| !is_ntp_server_valid(s))
    {
        return Err(ComposerError::validation(format!("Invalid NTP server: {}", server)));
    }
    if !is_hostname_valid(&draft.hostname) {
        return Err(ComposerError::validation(format!(
            "Invalid hostname: {}",
            draft.hostname
        )));
    }
    if !is_kernel_name_valid(&draft.kernel.name) {
        return Err(ComposerError::validation(format!(
            "Invalid kernel name: {}",
            draft.kernel.name
        )));
    }
    if let Some(arg) = draft.kernel.append.iter().find(|a| !is_kernel_argument_valid(a)) {
        return Err(ComposerError::validation(format!("Invalid kernel argument: {}", arg)));
    }
    if let Some(port) = draft.firewall.ports.iter().find(|p| !is_port_valid(p)) {
        return Err(ComposerError::validation(format!("Invalid firewall port: {}", port)));
    }
    let services = &draft.services;
    let firewall = &draft.firewall;
    if let Some(service) = services
        .enabled
        .iter()
        .chain(&services.disabled)
        .chain(&services.masked)
        .chain(&firewall.enabled_services)
        .chain(&firewall.disabled_services)
        .find(|s| !is_service_valid(s))
    {
        return Err(ComposerError::validation(format!("Invalid service name: {}", service)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SizeUnit;

    fn partition(mountpoint: &str, min_size: u64) -> Partition {
        Partition {
            mountpoint: mountpoint.to_string(),
            min_size,
            unit: SizeUnit::GiB,
        }
    }

    #[test]
    fn test_blueprint_name() {
        assert!(is_blueprint_name_valid("web"));
        assert!(!is_blueprint_name_valid("   "));
        assert!(!is_blueprint_name_valid(&"a".repeat(101)));
    }

    #[test]
    fn test_hostname() {
        assert!(is_hostname_valid(""));
        assert!(is_hostname_valid("web-01.example.com"));
        assert!(!is_hostname_valid("-web"));
        assert!(!is_hostname_valid("web_01"));
        assert!(!is_hostname_valid(&"a".repeat(65)));
    }

    #[test]
    fn test_user_name() {
        assert!(is_user_name_valid("alice"));
        assert!(is_user_name_valid("a.b-c_d"));
        assert!(!is_user_name_valid("1234"));
        assert!(!is_user_name_valid("-alice"));
        assert!(!is_user_name_valid(""));
    }

    #[test]
    fn test_ports() {
        assert!(is_port_valid("22:tcp"));
        assert!(is_port_valid("8000-8080:udp"));
        assert!(is_port_valid("ssh:tcp"));
        assert!(!is_port_valid("22"));
        assert!(!is_port_valid("22:TCP"));
        assert!(!is_port_valid("123456:tcp"));
    }

    #[test]
    fn test_kernel() {
        assert!(is_kernel_name_valid(""));
        assert!(is_kernel_name_valid("kernel-debug"));
        assert!(!is_kernel_name_valid("kernel--debug"));
        assert!(is_kernel_argument_valid("console=ttyS0,115200"));
        assert!(!is_kernel_argument_valid("quiet splash"));
    }

    #[test]
    fn test_ntp_and_ssh() {
        assert!(is_ntp_server_valid("0.pool.ntp.org"));
        assert!(is_ntp_server_valid("192.168.0.1"));
        assert!(!is_ntp_server_valid("not a host"));
        assert!(is_ssh_key_valid("ssh-ed25519 AAAAC3Nza user@host"));
        assert!(!is_ssh_key_valid("AAAAC3Nza"));
    }

    #[test]
    fn test_partitions() {
        assert!(are_partitions_valid(&[partition("/", 10), partition("/var/log", 1)]));
        assert!(!are_partitions_valid(&[partition("/home", 1)]));
        assert!(!are_partitions_valid(&[partition("/", 1), partition("/", 2)]));
        assert!(!are_partitions_valid(&[partition("/", 0)]));
        assert!(!are_partitions_valid(&[partition("/", 1), partition("/etc", 1)]));
        assert!(!is_mountpoint_valid("/var/../etc"));
    }

    #[test]
    fn test_validate_draft_reports_first_problem() {
        let mut draft = BlueprintDraft::default();
        let err = validate_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("Blueprint name"));

        draft.name = "web".to_string();
        let err = validate_draft(&draft).unwrap_err();
        assert!(err.to_string().contains("target environment"));

        draft.image_types.push(ImageType::GuestImage);
        assert!(validate_draft(&draft).is_ok());

        draft.registration.kind = RegistrationType::RegisterNow;
        assert!(validate_draft(&draft).is_err());
        draft.registration.activation_key = Some("key".to_string());
        assert!(validate_draft(&draft).is_ok());
    }
}
