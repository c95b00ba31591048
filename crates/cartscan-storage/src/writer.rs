use object_store::path::Path;
use object_store::PutPayload;
use serde::Serialize;

use crate::buckets::BucketProvider;
use crate::error::StorageError;

/// Serializes `data` as JSON and uploads it to `bucket` at `key`.
///
/// The object is written with a single put, replacing anything already
/// stored at `key`. Failures are not retried.
///
/// # Errors
///
/// - [`StorageError::BucketNotFound`] if the bucket does not exist.
/// - [`StorageError::Credentials`] if the store refuses our credentials.
/// - [`StorageError::InvalidKey`] if `key` is not a valid object path.
/// - [`StorageError::Serialize`] if `data` cannot be encoded as JSON.
/// - [`StorageError::Upload`] for any other rejected upload.
pub async fn write_json<P, T>(
    buckets: &P,
    data: &T,
    bucket: &str,
    key: &str,
) -> Result<(), StorageError>
where
    P: BucketProvider + ?Sized,
    T: Serialize + ?Sized,
{
    let location = Path::parse(key).map_err(|e| StorageError::InvalidKey {
        key: key.to_owned(),
        reason: e.to_string(),
    })?;
    let bytes = serde_json::to_vec(data).map_err(|source| StorageError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    let size = bytes.len();

    let store = buckets.bucket(bucket)?;
    store
        .put(&location, PutPayload::from(bytes))
        .await
        .map_err(|err| upload_error(bucket, key, err))?;

    tracing::info!(bucket, key, bytes = size, "uploaded object");
    Ok(())
}

fn upload_error(bucket: &str, key: &str, err: object_store::Error) -> StorageError {
    match err {
        // Plain object puts never require the key to exist beforehand, so a
        // not-found here means the bucket itself is missing.
        object_store::Error::NotFound { .. } => StorageError::BucketNotFound {
            bucket: bucket.to_owned(),
        },
        object_store::Error::PermissionDenied { source, .. }
        | object_store::Error::Unauthenticated { source, .. } => StorageError::Credentials {
            bucket: bucket.to_owned(),
            reason: source.to_string(),
        },
        source => StorageError::Upload {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            source,
        },
    }
}
