//! Conversion from content-sources repository records to the two shapes a
//! blueprint stores them in.

use crate::api::models::{ApiRepository, CustomRepository, PayloadRepository};
use crate::types::ContentOrigin;

/// Uploaded repositories have no upstream URL; they are served from their
/// latest snapshot.
fn base_url(repo: &ApiRepository) -> Option<String> {
    if repo.origin == Some(ContentOrigin::Upload) {
        repo.latest_snapshot_url.clone()
    } else {
        repo.url.clone()
    }
}

fn gpg_key(repo: &ApiRepository) -> Option<String> {
    repo.gpg_key.clone().filter(|key| !key.trim().is_empty())
}

/// Record the repository under `customizations.custom_repositories`.
pub fn convert_schema_to_custom_repo(repo: &ApiRepository) -> CustomRepository {
    let gpgkey = gpg_key(repo);
    let has_key = gpgkey.is_some();
    CustomRepository {
        id: repo.uuid.clone().unwrap_or_default(),
        name: Some(repo.name.clone()),
        baseurl: base_url(repo).map(|url| vec![url]),
        check_gpg: Some(has_key),
        check_repo_gpg: has_key.then_some(repo.metadata_verification),
        gpgkey: gpgkey.map(|key| vec![key]),
        enabled: None,
        module_hotfixes: repo.module_hotfixes.then_some(true),
    }
}

/// Record the repository under `customizations.payload_repositories`.
pub fn convert_schema_to_payload_repo(repo: &ApiRepository) -> PayloadRepository {
    let gpgkey = gpg_key(repo);
    let has_key = gpgkey.is_some();
    PayloadRepository {
        id: repo.uuid.clone(),
        baseurl: base_url(repo),
        rhsm: false,
        check_gpg: Some(has_key),
        check_repo_gpg: has_key.then_some(repo.metadata_verification),
        gpgkey,
        module_hotfixes: repo.module_hotfixes.then_some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epel() -> ApiRepository {
        ApiRepository {
            uuid: Some("epel-9".to_string()),
            name: "EPEL 9".to_string(),
            url: Some("https://dl.fedoraproject.org/pub/epel/9/Everything/x86_64/".to_string()),
            gpg_key: Some("-----BEGIN PGP PUBLIC KEY BLOCK-----".to_string()),
            metadata_verification: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_custom_repo_carries_gpg_settings() {
        let custom = convert_schema_to_custom_repo(&epel());
        assert_eq!(custom.id, "epel-9");
        assert_eq!(custom.name.as_deref(), Some("EPEL 9"));
        assert_eq!(custom.check_gpg, Some(true));
        assert_eq!(custom.check_repo_gpg, Some(true));
        assert_eq!(custom.gpgkey.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_payload_repo_without_key_skips_gpg_check() {
        let repo = ApiRepository {
            gpg_key: Some("   ".to_string()),
            ..epel()
        };
        let payload = convert_schema_to_payload_repo(&repo);
        assert_eq!(payload.id.as_deref(), Some("epel-9"));
        assert_eq!(payload.check_gpg, Some(false));
        assert_eq!(payload.check_repo_gpg, None);
        assert!(payload.gpgkey.is_none());
        assert!(!payload.rhsm);
    }

    #[test]
    fn test_upload_repo_uses_snapshot_url() {
        let repo = ApiRepository {
            origin: Some(ContentOrigin::Upload),
            url: None,
            latest_snapshot_url: Some("https://cdn.example.com/snap/".to_string()),
            ..epel()
        };
        assert_eq!(
            convert_schema_to_payload_repo(&repo).baseurl.as_deref(),
            Some("https://cdn.example.com/snap/")
        );
        assert_eq!(
            convert_schema_to_custom_repo(&repo).baseurl,
            Some(vec!["https://cdn.example.com/snap/".to_string()])
        );
    }
}
