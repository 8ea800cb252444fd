//! Backend access for the image-builder and content-sources APIs.
//!
//! The traits are the seam the dispatchers and the CLI are written against;
//! [`HttpBackend`] is the `reqwest` implementation, tests use in-memory ones.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::models::{
    BlueprintResponse, BlueprintsQuery, BlueprintsResponse, ComposeResponse,
    ContentTemplate, CreateBlueprintRequest, CreateBlueprintResponse, RepositoryCollection,
    RepositoryParameters,
};
use crate::config_file::Settings;
use crate::error::{ComposerError, Result};
use crate::repositories::listing::ListRepositoriesQuery;

const USER_AGENT: &str = concat!("blueprint-composer/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blueprint CRUD and build requests
#[async_trait]
pub trait BlueprintBackend: Send + Sync {
    async fn create_blueprint(&self, request: &CreateBlueprintRequest) -> Result<CreateBlueprintResponse>;

    async fn update_blueprint(
        &self,
        id: &str,
        request: &CreateBlueprintRequest,
    ) -> Result<CreateBlueprintResponse>;

    async fn delete_blueprint(&self, id: &str) -> Result<()>;

    /// Start a build of every image request of the blueprint
    async fn compose_blueprint(&self, id: &str) -> Result<Vec<ComposeResponse>>;

    async fn get_blueprint(&self, id: &str) -> Result<BlueprintResponse>;

    async fn list_blueprints(&self, query: &BlueprintsQuery) -> Result<BlueprintsResponse>;
}

/// Repository listings and content templates
#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    async fn list_repositories(&self, query: &ListRepositoriesQuery) -> Result<RepositoryCollection>;

    async fn list_repository_parameters(&self) -> Result<RepositoryParameters>;

    async fn get_template(&self, uuid: &str) -> Result<ContentTemplate>;
}

/// HTTP implementation of both backends.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    image_builder_url: String,
    content_sources_url: String,
    token: Option<String>,
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("image_builder_url", &self.image_builder_url)
            .field("content_sources_url", &self.content_sources_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            image_builder_url: settings.image_builder_url.trim_end_matches('/').to_string(),
            content_sources_url: settings.content_sources_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        })
    }

    fn image_builder(&self, path: &str) -> String {
        format!("{}/{}", self.image_builder_url, path)
    }

    fn content_sources(&self, path: &str) -> String {
        format!("{}/{}", self.content_sources_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send, turn non-success statuses into errors
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "api response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(%status, body = %body, "api request failed");
        Err(ComposerError::api(status.as_u16(), body))
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BlueprintBackend for HttpBackend {
    async fn create_blueprint(&self, request: &CreateBlueprintRequest) -> Result<CreateBlueprintResponse> {
        self.execute_json(self.client.post(self.image_builder("blueprints")).json(request))
            .await
    }

    async fn update_blueprint(
        &self,
        id: &str,
        request: &CreateBlueprintRequest,
    ) -> Result<CreateBlueprintResponse> {
        let url = self.image_builder(&format!("blueprints/{}", id));
        self.execute_json(self.client.put(url).json(request)).await
    }

    async fn delete_blueprint(&self, id: &str) -> Result<()> {
        let url = self.image_builder(&format!("blueprints/{}", id));
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn compose_blueprint(&self, id: &str) -> Result<Vec<ComposeResponse>> {
        let url = self.image_builder(&format!("blueprints/{}/compose", id));
        self.execute_json(self.client.post(url)).await
    }

    async fn get_blueprint(&self, id: &str) -> Result<BlueprintResponse> {
        let url = self.image_builder(&format!("blueprints/{}", id));
        self.execute_json(self.client.get(url)).await
    }

    async fn list_blueprints(&self, query: &BlueprintsQuery) -> Result<BlueprintsResponse> {
        let request = self
            .client
            .get(self.image_builder("blueprints"))
            .query(&query.to_query_pairs());
        self.execute_json(request).await
    }
}

#[async_trait]
impl RepositoryBackend for HttpBackend {
    async fn list_repositories(&self, query: &ListRepositoriesQuery) -> Result<RepositoryCollection> {
        let request = self
            .client
            .get(self.content_sources("repositories/"))
            .query(&query.to_query_pairs());
        self.execute_json(request).await
    }

    async fn list_repository_parameters(&self) -> Result<RepositoryParameters> {
        self.execute_json(self.client.get(self.content_sources("repository_parameters/")))
            .await
    }

    async fn get_template(&self, uuid: &str) -> Result<ContentTemplate> {
        let url = self.content_sources(&format!("templates/{}", uuid));
        self.execute_json(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_join_without_double_slash() {
        let settings = Settings {
            image_builder_url: "https://ib.example.com/api/v1/".to_string(),
            content_sources_url: "https://cs.example.com/api/v1".to_string(),
            ..Default::default()
        };
        let backend = HttpBackend::new(&settings).unwrap();
        assert_eq!(
            backend.image_builder("blueprints/abc"),
            "https://ib.example.com/api/v1/blueprints/abc"
        );
        assert_eq!(
            backend.content_sources("repositories/"),
            "https://cs.example.com/api/v1/repositories/"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = Settings {
            token: Some("bearer-secret-token".to_string()),
            ..Default::default()
        };
        let backend = HttpBackend::new(&settings).unwrap();
        let printed = format!("{:?}", backend);
        assert!(!printed.contains("bearer-secret-token"));
        assert!(printed.contains("<redacted>"));

        let anonymous = HttpBackend::new(&Settings::default()).unwrap();
        assert!(format!("{:?}", anonymous).contains("token: None"));
    }
}
