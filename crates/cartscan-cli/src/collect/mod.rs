//! `collect` command handler.
//!
//! Resolves the search plan, builds the search client and bucket provider
//! from [`cartscan_core::AppConfig`], and hands off to [`pipeline::run_pipeline`].

pub(crate) mod pipeline;

use std::path::Path;
use std::time::Duration;

use chrono::Local;

use cartscan_core::{load_plan, AppConfig, SearchPlan, StorageBackend};
use cartscan_search::{RetryPolicy, SearchClient};
use cartscan_storage::{BucketProvider, GcsBuckets, LocalBuckets};

use pipeline::{object_key, run_pipeline, FailurePolicy, StorageTarget};

/// Plan values given on the command line. They win over the plan file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PlanOverrides {
    pub terms: Vec<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

/// Merge the plan file at `plan_path` (when present) with `overrides`.
///
/// Without a plan file the overrides must supply terms, postal code, and
/// country.
///
/// # Errors
///
/// Returns an error if the plan file is unreadable or invalid, if required
/// values are missing, or if the merged plan fails validation.
pub(crate) fn resolve_plan(
    plan_path: &Path,
    overrides: PlanOverrides,
) -> anyhow::Result<SearchPlan> {
    let plan = if plan_path.exists() {
        let mut plan = load_plan(plan_path)?;
        if !overrides.terms.is_empty() {
            plan.terms = overrides.terms;
        }
        if let Some(postal_code) = overrides.postal_code {
            plan.postal_code = postal_code;
        }
        if let Some(country_code) = overrides.country_code {
            plan.country_code = country_code;
        }
        plan
    } else {
        let missing = |what: &str| {
            anyhow::anyhow!(
                "plan file {} not found and no --{what} given",
                plan_path.display()
            )
        };
        if overrides.terms.is_empty() {
            return Err(missing("term"));
        }
        SearchPlan {
            postal_code: overrides.postal_code.ok_or_else(|| missing("postal"))?,
            country_code: overrides.country_code.ok_or_else(|| missing("country"))?,
            terms: overrides.terms,
        }
    };

    plan.validate()?;
    Ok(plan)
}

/// Build the bucket provider for the configured storage backend.
fn build_buckets(config: &AppConfig) -> Box<dyn BucketProvider> {
    match config.storage_backend {
        StorageBackend::Gcs => Box::new(GcsBuckets::new(config.credentials_path.clone())),
        StorageBackend::Local => Box::new(LocalBuckets::new(&config.local_root)),
    }
}

/// Build the search client from config.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the base URL is invalid.
pub(crate) fn build_search_client(config: &AppConfig) -> anyhow::Result<SearchClient> {
    SearchClient::with_base_url(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
        RetryPolicy::with_max_retries(config.max_retries),
    )
    .map_err(|e| anyhow::anyhow!("failed to build search client: {e}"))
}

/// Fetch every planned term and upload its rows.
///
/// When `dry_run` is `true` the object keys that would be written are printed
/// and no request is made.
///
/// # Errors
///
/// Returns an error if the plan cannot be resolved, no bucket is configured,
/// the client cannot be built, or any term fails (see [`FailurePolicy`]).
pub(crate) async fn run_collect(
    config: &AppConfig,
    overrides: PlanOverrides,
    keep_going: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let plan = resolve_plan(&config.plan_path, overrides)?;

    if dry_run {
        let bucket = config.bucket_name.as_deref().unwrap_or("<unset>");
        let now = Local::now().naive_local();
        for term in &plan.terms {
            let key = object_key(
                &config.bucket_path,
                term,
                &plan.postal_code,
                &plan.country_code,
                now,
            );
            println!(
                "dry-run: would write {key} to {} bucket '{bucket}'",
                config.storage_backend
            );
        }
        return Ok(());
    }

    let bucket = config.require_bucket_name()?;
    let client = build_search_client(config)?;
    let buckets = build_buckets(config);
    let failure_policy = if keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    tracing::info!(
        terms = plan.terms.len(),
        postal_code = %plan.postal_code,
        country = %plan.country_code,
        backend = %config.storage_backend,
        bucket = %bucket,
        "starting collection"
    );

    let summary = run_pipeline(
        &client,
        buckets.as_ref(),
        &plan,
        StorageTarget {
            bucket,
            base_path: &config.bucket_path,
        },
        Duration::from_secs(config.request_delay_secs),
        failure_policy,
    )
    .await?;

    let total_rows: usize = summary.uploaded.iter().map(|u| u.rows).sum();
    tracing::info!(
        objects = summary.uploaded.len(),
        rows = total_rows,
        "collection finished"
    );

    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
