//! Implements ArtifactSource over HTTP(S). Artifacts are static files under a base URL.

use crate::domain::DomainError;
use crate::ports::ArtifactSource;
use std::time::Duration;
use tracing::debug;

pub struct HttpArtifactSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpArtifactSource {
    /// `timeout` bounds each whole request (connect + body).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Artifact(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            name.trim_start_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let url = self.url_for(name);
        debug!(url = %url, "fetching artifact");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Artifact(format!("GET {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Artifact(format!("GET {}: HTTP {}", url, status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::Artifact(format!("GET {} body: {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
