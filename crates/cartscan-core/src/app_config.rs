use std::path::PathBuf;

use crate::ConfigError;

/// Where uploaded row blobs land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Storage bucket named by `GCS_BUCKET_NAME`.
    Gcs,
    /// Subdirectory of a local root, for runs without cloud credentials.
    Local,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Gcs => write!(f, "gcs"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    /// `None` when `GCS_BUCKET_NAME` is unset on the GCS backend.
    pub bucket_name: Option<String>,
    pub bucket_path: String,
    pub credentials_path: Option<PathBuf>,
    pub local_root: PathBuf,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub request_delay_secs: u64,
    pub max_retries: u32,
    pub plan_path: PathBuf,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("storage_backend", &self.storage_backend)
            .field("bucket_name", &self.bucket_name)
            .field("bucket_path", &self.bucket_path)
            .field(
                "credentials_path",
                &self.credentials_path.as_ref().map(|_| "[redacted]"),
            )
            .field("local_root", &self.local_root)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("request_delay_secs", &self.request_delay_secs)
            .field("max_retries", &self.max_retries)
            .field("plan_path", &self.plan_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    /// The bucket uploads go to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if no bucket name is configured.
    pub fn require_bucket_name(&self) -> Result<&str, ConfigError> {
        self.bucket_name
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("GCS_BUCKET_NAME".to_string()))
    }
}
