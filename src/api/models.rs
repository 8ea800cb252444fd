//! Wire types for the image-builder and content-sources APIs.
//!
//! Optional server fields stay `Option` and are defaulted at display time,
//! never rejected.

use serde::{Deserialize, Serialize};

use crate::types::{Architecture, ContentOrigin, Distribution, ImageType};

// ============================================================================
// Content sources: repositories, parameters, templates
// ============================================================================

/// A repository record as listed by the content-sources API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRepository {
    pub uuid: Option<String>,
    pub name: String,
    pub url: Option<String>,
    /// Uploaded repositories are only reachable through their snapshot
    pub latest_snapshot_url: Option<String>,
    pub status: Option<String>,
    pub origin: Option<ContentOrigin>,
    pub snapshot: bool,
    pub content_type: Option<String>,
    pub distribution_arch: Option<String>,
    pub distribution_versions: Option<Vec<String>>,
    pub package_count: Option<u64>,
    pub gpg_key: Option<String>,
    pub metadata_verification: bool,
    pub module_hotfixes: bool,
    pub last_introspection_time: Option<String>,
    pub failed_introspections_count: Option<u32>,
}

impl ApiRepository {
    /// The only status under which a repository may be selected
    pub const STATUS_VALID: &'static str = "Valid";

    pub fn is_valid(&self) -> bool {
        self.status.as_deref() == Some(Self::STATUS_VALID)
    }

    /// Status label for display; missing status reads as "Unavailable"
    pub fn display_status(&self) -> &str {
        match self.status.as_deref() {
            Some(status) if !status.is_empty() => status,
            _ => "Unavailable",
        }
    }

    pub fn is_red_hat(&self) -> bool {
        self.origin == Some(ContentOrigin::RedHat)
    }
}

/// Pagination metadata returned alongside every listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionMeta {
    pub count: u64,
    pub limit: u64,
    pub offset: u64,
}

/// One page of repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryCollection {
    pub data: Vec<ApiRepository>,
    pub meta: CollectionMeta,
}

/// A `label` (technical) to `name` (readable) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameLabel {
    pub name: String,
    pub label: String,
}

/// Label maps for architectures and distribution versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryParameters {
    pub distribution_arches: Vec<NameLabel>,
    pub distribution_versions: Vec<NameLabel>,
}

/// A content template: a curated, fixed set of repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentTemplate {
    pub uuid: String,
    pub name: String,
    pub arch: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
    pub use_latest: bool,
    pub repository_uuids: Vec<String>,
}

// ============================================================================
// Image builder: blueprint payload
// ============================================================================

/// A custom repository as stored in blueprint customizations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRepository {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpgkey: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_gpg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_repo_gpg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_hotfixes: Option<bool>,
}

/// A repository packages are installed from during the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRepository {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<String>,
    #[serde(default)]
    pub rhsm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpgkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_gpg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_repo_gpg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_hotfixes: Option<bool>,
}

/// Where a finished image is uploaded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadType {
    #[serde(rename = "aws")]
    Aws,
    #[serde(rename = "gcp")]
    Gcp,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "aws.s3")]
    AwsS3,
    #[serde(rename = "oci.objectstorage")]
    OciObjectStorage,
}

/// Upload options; which fields are meaningful depends on the upload type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_with_accounts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_with_sources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(rename = "type")]
    pub upload_type: UploadType,
    #[serde(default)]
    pub options: UploadOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub architecture: Architecture,
    pub image_type: ImageType,
    pub upload_request: UploadRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemPartition {
    pub mountpoint: String,
    pub min_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(rename = "hasPassword", default, skip_serializing_if = "Option::is_none")]
    pub has_password: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timezone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntpservers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kernel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Space separated kernel command line arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallServices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firewall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<FirewallServices>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Services {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub activation_key: String,
    pub organization: i64,
    pub server_url: String,
    pub base_url: String,
    pub insights: bool,
    #[serde(default)]
    pub rhc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenScap {
    pub profile_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub path: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_encoding: Option<String>,
    #[serde(default)]
    pub ensure_parents: bool,
}

/// Everything the image is customized with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customizations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_repositories: Option<Vec<CustomRepository>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_repositories: Option<Vec<PayloadRepository>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Vec<FilesystemPartition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Timezone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Kernel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall: Option<Firewall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Services>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openscap: Option<OpenScap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<File>>,
}

/// The request body for creating or updating a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBlueprintRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub distribution: Distribution,
    pub image_requests: Vec<ImageRequest>,
    #[serde(default)]
    pub customizations: Customizations,
}

// ============================================================================
// Image builder: responses
// ============================================================================

/// A full blueprint as fetched for editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintResponse {
    pub id: String,
    #[serde(flatten)]
    pub blueprint: CreateBlueprintRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBlueprintResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeResponse {
    pub id: String,
}

/// A row of the blueprint list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: u32,
    pub last_modified_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintsResponse {
    pub data: Vec<BlueprintItem>,
    pub meta: CollectionMeta,
}

/// Query parameters for the blueprint list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlueprintsQuery {
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl BlueprintsQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_tolerates_partial_records() {
        let repo: ApiRepository = serde_json::from_str(r#"{"uuid":"r1"}"#).unwrap();
        assert_eq!(repo.uuid.as_deref(), Some("r1"));
        assert!(!repo.snapshot);
        assert_eq!(repo.display_status(), "Unavailable");
        assert!(!repo.is_valid());
    }

    #[test]
    fn test_upload_request_serializes_type_field() {
        let request = UploadRequest {
            upload_type: UploadType::AwsS3,
            options: UploadOptions::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"type": "aws.s3", "options": {}}));
    }

    #[test]
    fn test_blueprint_response_flattens_request() {
        let json = serde_json::json!({
            "id": "bp-1",
            "name": "web",
            "description": "",
            "distribution": "rhel-9",
            "image_requests": [],
            "customizations": {"hostname": "web01"}
        });
        let response: BlueprintResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.id, "bp-1");
        assert_eq!(response.blueprint.customizations.hostname.as_deref(), Some("web01"));
    }

    #[test]
    fn test_blueprints_query_skips_empty_search() {
        let query = BlueprintsQuery {
            search: Some(String::new()),
            limit: 10,
            offset: 0,
        };
        assert_eq!(query.to_query_pairs().len(), 2);
    }
}
