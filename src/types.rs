//! Type-safe domain types for blueprints
//!
//! Closed value sets from the image-builder and content-sources APIs as Rust
//! enums. The strum serialization matches the wire spelling so that
//! `to_string()` / `parse()` and serde agree.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Distribution release an image is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum Distribution {
    #[strum(serialize = "rhel-8")]
    #[serde(rename = "rhel-8")]
    Rhel8,
    #[default]
    #[strum(serialize = "rhel-9")]
    #[serde(rename = "rhel-9")]
    Rhel9,
    #[strum(serialize = "rhel-10")]
    #[serde(rename = "rhel-10")]
    Rhel10,
    #[strum(serialize = "centos-9")]
    #[serde(rename = "centos-9")]
    Centos9,
    #[strum(serialize = "centos-10")]
    #[serde(rename = "centos-10")]
    Centos10,
}

impl Distribution {
    /// Major version label used by the content-sources API (`rhel-9` → `9`)
    pub fn version(&self) -> &'static str {
        match self {
            Self::Rhel8 => "8",
            Self::Rhel9 | Self::Centos9 => "9",
            Self::Rhel10 | Self::Centos10 => "10",
        }
    }

    /// CentOS streams need an explicit acknowledgement in the image output step
    pub fn is_centos(&self) -> bool {
        matches!(self, Self::Centos9 | Self::Centos10)
    }
}

/// CPU architecture of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum Architecture {
    #[default]
    #[strum(serialize = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
    #[strum(serialize = "aarch64")]
    #[serde(rename = "aarch64")]
    Aarch64,
}

/// Target environment (image type) for a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum ImageType {
    #[strum(serialize = "aws")]
    #[serde(rename = "aws")]
    Aws,
    #[strum(serialize = "gcp")]
    #[serde(rename = "gcp")]
    Gcp,
    #[strum(serialize = "azure")]
    #[serde(rename = "azure")]
    Azure,
    #[strum(serialize = "oci")]
    #[serde(rename = "oci")]
    Oci,
    #[strum(serialize = "vsphere")]
    #[serde(rename = "vsphere")]
    Vsphere,
    #[strum(serialize = "vsphere-ova")]
    #[serde(rename = "vsphere-ova")]
    VsphereOva,
    #[strum(serialize = "guest-image")]
    #[serde(rename = "guest-image")]
    GuestImage,
    #[strum(serialize = "image-installer")]
    #[serde(rename = "image-installer")]
    ImageInstaller,
    #[strum(serialize = "wsl")]
    #[serde(rename = "wsl")]
    Wsl,
}

impl ImageType {
    /// Human readable name shown in the target environment tiles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aws => "Amazon Web Services",
            Self::Gcp => "Google Cloud Platform",
            Self::Azure => "Microsoft Azure",
            Self::Oci => "Oracle Cloud Infrastructure",
            Self::Vsphere => "VMware vSphere",
            Self::VsphereOva => "VMware vSphere (.ova)",
            Self::GuestImage => "Virtualization guest image",
            Self::ImageInstaller => "Bare metal installer",
            Self::Wsl => "WSL",
        }
    }

    /// Whether this target has its own configuration step in the wizard
    pub fn has_target_step(&self) -> bool {
        matches!(self, Self::Aws | Self::Gcp | Self::Azure)
    }
}

/// Where a repository comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum ContentOrigin {
    #[strum(serialize = "red_hat")]
    #[serde(rename = "red_hat")]
    RedHat,
    #[default]
    #[strum(serialize = "external")]
    #[serde(rename = "external")]
    External,
    #[strum(serialize = "upload")]
    #[serde(rename = "upload")]
    Upload,
    #[strum(serialize = "community")]
    #[serde(rename = "community")]
    Community,
}

impl ContentOrigin {
    /// Origin filter selecting user-managed ("custom") repositories
    pub const CUSTOM_FILTER: &'static str = "external,upload";
}

/// Whether the wizard creates a new blueprint or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WizardMode {
    #[default]
    Create,
    Edit,
}

/// Registration choice for built images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationType {
    #[default]
    RegisterLater,
    RegisterNow,
    RegisterNowInsights,
    RegisterNowRhc,
}

impl RegistrationType {
    /// Insights is enabled for every registration except the plain one
    pub fn insights(&self) -> bool {
        matches!(self, Self::RegisterNowInsights | Self::RegisterNowRhc)
    }

    pub fn rhc(&self) -> bool {
        matches!(self, Self::RegisterNowRhc)
    }
}

/// Which rows the repository table lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ListToggle {
    #[default]
    All,
    Selected,
}

/// Unit of a custom partition size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum SizeUnit {
    KiB,
    MiB,
    #[default]
    GiB,
}

impl SizeUnit {
    /// Bytes per unit
    pub const fn multiplier(&self) -> u64 {
        match self {
            Self::KiB => 1024,
            Self::MiB => 1024 * 1024,
            Self::GiB => 1024 * 1024 * 1024,
        }
    }
}

/// Google Cloud principal kind an image is shared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum GcpAccountType {
    #[default]
    User,
    ServiceAccount,
    Group,
    Domain,
}

impl GcpAccountType {
    /// Prefix the image-builder API expects in `share_with_accounts`
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ServiceAccount => "serviceAccount",
            Self::Group => "group",
            Self::Domain => "domain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_distribution_version_labels() {
        assert_eq!(Distribution::Rhel8.version(), "8");
        assert_eq!(Distribution::Centos9.version(), "9");
        assert_eq!(Distribution::Rhel10.version(), "10");
        assert!(Distribution::Centos10.is_centos());
        assert!(!Distribution::Rhel9.is_centos());
    }

    #[test]
    fn test_strum_matches_serde() {
        for dist in Distribution::iter() {
            let json = serde_json::to_string(&dist).unwrap();
            assert_eq!(json, format!("\"{}\"", dist));
        }
        for target in ImageType::iter() {
            let json = serde_json::to_string(&target).unwrap();
            assert_eq!(json, format!("\"{}\"", target));
        }
        for origin in ContentOrigin::iter() {
            let json = serde_json::to_string(&origin).unwrap();
            assert_eq!(json, format!("\"{}\"", origin));
        }
    }

    #[test]
    fn test_registration_flags() {
        assert!(!RegistrationType::RegisterNow.insights());
        assert!(RegistrationType::RegisterNowInsights.insights());
        assert!(RegistrationType::RegisterNowRhc.rhc());
        assert_eq!(
            "register-now-rhc".parse::<RegistrationType>().unwrap(),
            RegistrationType::RegisterNowRhc
        );
    }

    #[test]
    fn test_size_unit_multiplier() {
        assert_eq!(SizeUnit::MiB.multiplier(), 1_048_576);
        assert_eq!(SizeUnit::GiB.multiplier(), 1_073_741_824);
    }
}
