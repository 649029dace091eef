//! Object storage backends.
//!
//! Seal images are persisted to Supabase Storage under user-scoped keys and
//! served back through the bucket's public-object URL space.

use async_trait::async_trait;
use std::env;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub bucket_name: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Option<Self> {
        let supabase_url = env::var("SUPABASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| v.trim_end_matches('/').to_string())?;
        let supabase_anon_key = env::var("SUPABASE_SERVICE_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| env::var("SUPABASE_ANON_KEY").ok().filter(|v| !v.is_empty()))?;
        let bucket_name = env::var("SUPABASE_BUCKET").unwrap_or_else(|_| "hanko".to_string());

        Some(Self {
            supabase_url,
            supabase_anon_key,
            bucket_name,
        })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("storage returned status {0}: {1}")]
    Status(reqwest::StatusCode, String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes under `key` and return the public URL.
    async fn upload_file(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    fn public_url(&self, key: &str) -> String;
}

pub struct SupabaseStorage {
    config: SupabaseConfig,
    http: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload_file(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let endpoint = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.supabase_url, self.config.bucket_name, key
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.config.supabase_anon_key)
            .header("apikey", &self.config.supabase_anon_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("storage upload for {key} failed ({status}): {body}");
            return Err(StorageError::Status(status, body));
        }

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.supabase_url, self.config.bucket_name, key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SupabaseConfig {
        SupabaseConfig {
            supabase_url: "https://test.supabase.co".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            bucket_name: "hanko".to_string(),
        }
    }

    #[test]
    fn public_url_uses_public_object_path() {
        let storage = SupabaseStorage::new(test_config(), reqwest::Client::new());
        assert_eq!(
            storage.public_url("hanko/user-1/stamp.png"),
            "https://test.supabase.co/storage/v1/object/public/hanko/hanko/user-1/stamp.png"
        );
    }

    #[test]
    fn config_is_cloneable_and_debuggable() {
        let config = test_config();
        let cloned = config.clone();
        assert_eq!(config.supabase_url, cloned.supabase_url);
        assert!(format!("{:?}", config).contains("SupabaseConfig"));
    }
}
