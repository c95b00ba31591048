//! Term-by-term fetch → extract → upload loop.
//!
//! Each term is fetched, flattened, and uploaded as its own object before the
//! next term starts. Nothing is aggregated across terms.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;

use cartscan_core::{extract_rows, ExtractError, SearchPlan};
use cartscan_search::{FetchError, SearchClient, SearchQuery};
use cartscan_storage::{write_json, BucketProvider, StorageError};

/// Timestamp format embedded in object keys.
pub(crate) const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// What to do when a term fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FailurePolicy {
    /// Stop at the first failing term.
    #[default]
    Abort,
    /// Log the failure, process the remaining terms, fail at the end.
    Continue,
}

/// Bucket and key prefix that uploads go to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StorageTarget<'a> {
    pub bucket: &'a str,
    pub base_path: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UploadedObject {
    pub term: String,
    pub key: String,
    pub rows: usize,
}

#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub uploaded: Vec<UploadedObject>,
}

#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("fetch failed for term '{term}': {source}")]
    Fetch {
        term: String,
        #[source]
        source: FetchError,
    },

    #[error("row extraction failed for term '{term}': {source}")]
    Extract {
        term: String,
        #[source]
        source: ExtractError,
    },

    #[error("upload failed for term '{term}': {source}")]
    Store {
        term: String,
        #[source]
        source: StorageError,
    },

    #[error("{} of {total} terms failed: {}", .failed.len(), .failed.join(", "))]
    TermsFailed { failed: Vec<String>, total: usize },
}

/// Builds `{base_path}/{term}_{postal}_{country}_{YYYYMMDD_HHMMSS}.json`.
///
/// An empty `base_path` yields a key at the bucket root.
pub(crate) fn object_key(
    base_path: &str,
    term: &str,
    postal_code: &str,
    country_code: &str,
    at: NaiveDateTime,
) -> String {
    let timestamp = at.format(KEY_TIMESTAMP_FORMAT);
    let name = format!("{term}_{postal_code}_{country_code}_{timestamp}.json");
    let base_path = base_path.trim_matches('/');
    if base_path.is_empty() {
        name
    } else {
        format!("{base_path}/{name}")
    }
}

/// Runs every term of `plan` through fetch → extract → upload, in order.
///
/// # Errors
///
/// With [`FailurePolicy::Abort`] the first term error is returned and later
/// terms are skipped. With [`FailurePolicy::Continue`] all terms are tried
/// and [`PipelineError::TermsFailed`] is returned if any of them failed.
pub(crate) async fn run_pipeline<P>(
    client: &SearchClient,
    buckets: &P,
    plan: &SearchPlan,
    target: StorageTarget<'_>,
    delay: Duration,
    failure_policy: FailurePolicy,
) -> Result<RunSummary, PipelineError>
where
    P: BucketProvider + ?Sized,
{
    let mut summary = RunSummary::default();
    let mut failed = Vec::new();

    for term in &plan.terms {
        match process_term(client, buckets, plan, term, target, delay).await {
            Ok(uploaded) => {
                tracing::info!(
                    term = %uploaded.term,
                    key = %uploaded.key,
                    rows = uploaded.rows,
                    "term collected"
                );
                summary.uploaded.push(uploaded);
            }
            Err(err) => match failure_policy {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Continue => {
                    tracing::error!(term = %term, error = %err, "term failed, continuing");
                    failed.push(term.clone());
                }
            },
        }
    }

    if failed.is_empty() {
        Ok(summary)
    } else {
        Err(PipelineError::TermsFailed {
            failed,
            total: plan.terms.len(),
        })
    }
}

async fn process_term<P>(
    client: &SearchClient,
    buckets: &P,
    plan: &SearchPlan,
    term: &str,
    target: StorageTarget<'_>,
    delay: Duration,
) -> Result<UploadedObject, PipelineError>
where
    P: BucketProvider + ?Sized,
{
    let query = SearchQuery::new(term, &plan.postal_code, &plan.country_code);
    let response = client
        .fetch(&query, delay)
        .await
        .map_err(|source| PipelineError::Fetch {
            term: term.to_owned(),
            source,
        })?;

    let rows = extract_rows(std::slice::from_ref(&response)).map_err(|source| {
        PipelineError::Extract {
            term: term.to_owned(),
            source,
        }
    })?;

    let key = object_key(
        target.base_path,
        term,
        &plan.postal_code,
        &plan.country_code,
        Local::now().naive_local(),
    );

    write_json(buckets, &rows, target.bucket, &key)
        .await
        .map_err(|source| PipelineError::Store {
            term: term.to_owned(),
            source,
        })?;

    Ok(UploadedObject {
        term: term.to_owned(),
        key,
        rows: rows.len(),
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
