use thiserror::Error;

/// Errors raised while resolving a bucket or uploading an object to it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error("credentials rejected for bucket '{bucket}': {reason}")]
    Credentials { bucket: String, reason: String },

    #[error("failed to open bucket '{bucket}': {source}")]
    Client {
        bucket: String,
        #[source]
        source: object_store::Error,
    },

    #[error("invalid object key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("failed to serialize payload for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("upload of '{key}' to bucket '{bucket}' failed: {source}")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: object_store::Error,
    },
}
