//! Bucket resolution for the object stores rows are uploaded to.
//!
//! A [`BucketProvider`] turns a bucket name into an [`ObjectStore`] handle.
//! Credentials and roots are passed in by the caller; nothing here reads the
//! process environment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;

use crate::error::StorageError;

/// Resolves bucket names to object stores.
pub trait BucketProvider: Send + Sync {
    /// Opens `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the bucket is known not to exist or the
    /// client for it cannot be built.
    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError>;
}

/// Google Cloud Storage buckets, authenticated with an optional service
/// account file. Without one the ambient application-default credentials apply.
#[derive(Debug, Clone, Default)]
pub struct GcsBuckets {
    credentials_path: Option<PathBuf>,
}

impl GcsBuckets {
    #[must_use]
    pub fn new(credentials_path: Option<PathBuf>) -> Self {
        Self { credentials_path }
    }
}

impl BucketProvider for GcsBuckets {
    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(name);

        if let Some(path) = &self.credentials_path {
            if !path.is_file() {
                return Err(StorageError::Credentials {
                    bucket: name.to_owned(),
                    reason: format!("service account file {} not found", path.display()),
                });
            }
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        let store = builder.build().map_err(|source| StorageError::Client {
            bucket: name.to_owned(),
            source,
        })?;
        Ok(Arc::new(store))
    }
}

/// Buckets that are existing subdirectories of `root` on the local disk.
#[derive(Debug, Clone)]
pub struct LocalBuckets {
    root: PathBuf,
}

impl LocalBuckets {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BucketProvider for LocalBuckets {
    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(StorageError::BucketNotFound {
                bucket: name.to_owned(),
            });
        }

        let store =
            LocalFileSystem::new_with_prefix(&dir).map_err(|source| StorageError::Client {
                bucket: name.to_owned(),
                source,
            })?;
        Ok(Arc::new(store))
    }
}

/// Named in-memory buckets. Only buckets created up front exist.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuckets {
    buckets: HashMap<String, Arc<InMemory>>,
}

impl MemoryBuckets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bucket(mut self, name: &str) -> Self {
        self.buckets
            .insert(name.to_owned(), Arc::new(InMemory::new()));
        self
    }

    /// The concrete store behind `name`, for inspecting uploads.
    #[must_use]
    pub fn store(&self, name: &str) -> Option<Arc<InMemory>> {
        self.buckets.get(name).cloned()
    }
}

impl BucketProvider for MemoryBuckets {
    fn bucket(&self, name: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        match self.buckets.get(name) {
            Some(store) => Ok(Arc::clone(store) as Arc<dyn ObjectStore>),
            None => Err(StorageError::BucketNotFound {
                bucket: name.to_owned(),
            }),
        }
    }
}
