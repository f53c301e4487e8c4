//! SLIMS REST client for the duplicate-sample lookup.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::SampleRegistry;
use crate::error::DuplicateCheckError;

/// SLIMS content type for fastq objects
pub const FASTQ_CONTENT_TYPE: u32 = 22;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings, usually taken from the environment
#[derive(Clone)]
pub struct SlimsCredentials {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for SlimsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlimsCredentials")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SlimsCredentials {
    /// Read `SLIMS_URL`, `SLIMS_USER` and `SLIMS_PASSWORD`
    pub fn from_env() -> Result<Self, DuplicateCheckError> {
        let var = |name: &'static str| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or(DuplicateCheckError::MissingCredential(name))
        };

        Ok(Self {
            url: var("SLIMS_URL")?,
            user: var("SLIMS_USER")?,
            password: var("SLIMS_PASSWORD")?,
        })
    }
}

/// Blocking SLIMS lookup of existing fastq records
pub struct SlimsRegistry {
    client: Client,
    credentials: SlimsCredentials,
    content_type: u32,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    entities: Vec<serde_json::Value>,
}

impl SlimsRegistry {
    pub fn new(credentials: SlimsCredentials) -> Result<Self, DuplicateCheckError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            credentials,
            content_type: FASTQ_CONTENT_TYPE,
        })
    }

    pub fn from_env() -> Result<Self, DuplicateCheckError> {
        Self::new(SlimsCredentials::from_env()?)
    }

    fn content_url(&self) -> String {
        format!("{}/rest/Content", self.credentials.url.trim_end_matches('/'))
    }
}

impl SampleRegistry for SlimsRegistry {
    fn exists(&self, sample_id: &str) -> Result<bool, DuplicateCheckError> {
        let content_type = self.content_type.to_string();
        let response = self
            .client
            .get(self.content_url())
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .query(&[
                ("cntn_id", sample_id),
                ("cntn_fk_contentType", content_type.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(DuplicateCheckError::Status { status, body });
        }

        let content: ContentResponse = response.json()?;
        log::debug!(
            "SLIMS returned {} fastq record(s) for {}",
            content.entities.len(),
            sample_id
        );
        Ok(!content.entities.is_empty())
    }
}
