use chrono::NaiveDate;
use object_store::path::Path;
use object_store::ObjectStore;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartscan_core::Row;
use cartscan_search::RetryPolicy;
use cartscan_storage::MemoryBuckets;

use super::*;

const BUCKET: &str = "grocery-raw";
const BASE_PATH: &str = "raw/cornershop";
const SEARCH_PATH: &str = "/api/v2/branches/search";

fn plan(terms: &[&str]) -> SearchPlan {
    SearchPlan {
        postal_code: "88010560".to_string(),
        country_code: "BR".to_string(),
        terms: terms.iter().map(|t| (*t).to_string()).collect(),
    }
}

fn target() -> StorageTarget<'static> {
    StorageTarget {
        bucket: BUCKET,
        base_path: BASE_PATH,
    }
}

fn client(server: &MockServer, retry: RetryPolicy) -> SearchClient {
    SearchClient::with_base_url(&server.uri(), 5, "cartscan-test/0.1", retry)
        .expect("client construction should not fail")
}

fn haribo_body() -> serde_json::Value {
    json!({
        "results": [{
            "search_result": {
                "search_term": "haribo",
                "aisles": [{
                    "aisle_name": "Candy",
                    "products": [{
                        "name": "Gummy Bears",
                        "brand": { "name": "Haribo" },
                        "pricing": { "price": { "amount": 9.99 } },
                        "package": "200g"
                    }]
                }]
            },
            "store": {
                "name": "Market A",
                "closest_branch": { "city": "São Paulo" }
            }
        }]
    })
}

async fn mount_term(server: &MockServer, term: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("query", term))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn stored_keys(buckets: &MemoryBuckets) -> Vec<String> {
    let listed = buckets
        .store(BUCKET)
        .unwrap()
        .list_with_delimiter(Some(&Path::from(BASE_PATH)))
        .await
        .unwrap();
    listed
        .objects
        .into_iter()
        .map(|meta| meta.location.to_string())
        .collect()
}

async fn stored_bytes(buckets: &MemoryBuckets, key: &str) -> Vec<u8> {
    buckets
        .store(BUCKET)
        .unwrap()
        .get(&Path::from(key))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap()
        .to_vec()
}

#[test]
fn object_key_has_expected_layout() {
    let at = NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(9, 5, 2)
        .unwrap();
    assert_eq!(
        object_key("raw/cornershop", "haribo", "88010560", "BR", at),
        "raw/cornershop/haribo_88010560_BR_20240307_090502.json"
    );
}

#[test]
fn object_key_without_base_path_sits_at_bucket_root() {
    let at = NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        object_key("", "fini", "88010560", "BR", at),
        "fini_88010560_BR_20240307_000000.json"
    );
    assert_eq!(
        object_key("/raw/", "fini", "88010560", "BR", at),
        "raw/fini_88010560_BR_20240307_000000.json"
    );
}

#[test]
fn object_keys_differ_one_second_apart() {
    let first = NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap();
    let second = first + chrono::Duration::seconds(1);
    assert_ne!(
        object_key(BASE_PATH, "haribo", "88010560", "BR", first),
        object_key(BASE_PATH, "haribo", "88010560", "BR", second)
    );
}

#[tokio::test]
async fn single_product_response_uploads_one_row() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "haribo",
        ResponseTemplate::new(200).set_body_json(haribo_body()),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let summary = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .expect("run should succeed");

    assert_eq!(summary.uploaded.len(), 1);
    let uploaded = &summary.uploaded[0];
    assert_eq!(uploaded.rows, 1);
    assert!(uploaded
        .key
        .starts_with("raw/cornershop/haribo_88010560_BR_"));
    assert!(uploaded.key.ends_with(".json"));

    let rows: Vec<Row> = serde_json::from_slice(&stored_bytes(&buckets, &uploaded.key).await)
        .expect("object should hold rows");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.aisle_name.as_deref(), Some("Candy"));
    assert_eq!(row.product_name.as_deref(), Some("Gummy Bears"));
    assert_eq!(row.brand.as_deref(), Some("Haribo"));
    assert_eq!(row.price, Some(9.99));
    assert_eq!(row.package.as_deref(), Some("200g"));
    assert_eq!(row.store_name.as_deref(), Some("Market A"));
    assert_eq!(row.store_city.as_deref(), Some("São Paulo"));
    assert_eq!(row.search_term.as_deref(), Some("haribo"));
    assert_eq!(row.date.len(), "07-03-2024".len());
}

#[tokio::test]
async fn empty_results_still_upload_an_empty_array() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "fini",
        ResponseTemplate::new(200).set_body_json(json!({ "results": [] })),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let summary = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["fini"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap();

    assert_eq!(summary.uploaded[0].rows, 0);
    assert_eq!(stored_bytes(&buckets, &summary.uploaded[0].key).await, b"[]");
}

#[tokio::test]
async fn exhausted_retries_abort_without_uploading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let err = run_pipeline(
        &client(&server, RetryPolicy::default()),
        &buckets,
        &plan(&["haribo"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(
        matches!(
            err,
            PipelineError::Fetch {
                ref term,
                source: FetchError::Upstream { status: 503, .. }
            } if term == "haribo"
        ),
        "expected Fetch(Upstream 503), got: {err:?}"
    );
    assert!(stored_keys(&buckets).await.is_empty());
}

#[tokio::test]
async fn abort_policy_skips_remaining_terms() {
    let server = MockServer::start().await;
    mount_term(&server, "haribo", ResponseTemplate::new(500)).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("query", "fini"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let err = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo", "fini"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch { .. }));
    assert!(stored_keys(&buckets).await.is_empty());
}

#[tokio::test]
async fn continue_policy_processes_remaining_terms_and_reports_failures() {
    let server = MockServer::start().await;
    mount_term(&server, "haribo", ResponseTemplate::new(500)).await;
    mount_term(
        &server,
        "fini",
        ResponseTemplate::new(200).set_body_json(json!({ "results": [] })),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let err = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo", "fini"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Continue,
    )
    .await
    .unwrap_err();

    match &err {
        PipelineError::TermsFailed { failed, total } => {
            assert_eq!(failed, &["haribo".to_string()]);
            assert_eq!(*total, 2);
        }
        other => panic!("expected TermsFailed, got: {other:?}"),
    }
    assert_eq!(err.to_string(), "1 of 2 terms failed: haribo");

    let keys = stored_keys(&buckets).await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("raw/cornershop/fini_88010560_BR_"));
}

#[tokio::test]
async fn each_term_is_uploaded_as_its_own_object() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "haribo",
        ResponseTemplate::new(200).set_body_json(haribo_body()),
    )
    .await;
    mount_term(
        &server,
        "fini",
        ResponseTemplate::new(200).set_body_json(json!({ "results": [] })),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let summary = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo", "fini"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap();

    let terms: Vec<_> = summary.uploaded.iter().map(|u| u.term.as_str()).collect();
    assert_eq!(terms, ["haribo", "fini"]);
    assert_eq!(summary.uploaded[0].rows, 1);
    assert_eq!(summary.uploaded[1].rows, 0);
    assert_eq!(stored_keys(&buckets).await.len(), 2);
}

#[tokio::test]
async fn malformed_results_fail_extraction() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "haribo",
        ResponseTemplate::new(200).set_body_json(json!({ "results": "nope" })),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let err = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PipelineError::Extract { .. }));
    assert!(stored_keys(&buckets).await.is_empty());
}

#[tokio::test]
async fn non_object_body_fails_extraction_without_uploading() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "haribo",
        ResponseTemplate::new(200).set_body_json(json!("maintenance")),
    )
    .await;
    let buckets = MemoryBuckets::new().with_bucket(BUCKET);

    let err = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Extract {
            source: ExtractError::NotAnObject { .. },
            ..
        }
    ));
    assert!(stored_keys(&buckets).await.is_empty());
}

#[tokio::test]
async fn missing_bucket_is_a_store_error() {
    let server = MockServer::start().await;
    mount_term(
        &server,
        "haribo",
        ResponseTemplate::new(200).set_body_json(haribo_body()),
    )
    .await;
    let buckets = MemoryBuckets::new();

    let err = run_pipeline(
        &client(&server, RetryPolicy::no_retries()),
        &buckets,
        &plan(&["haribo"]),
        target(),
        Duration::ZERO,
        FailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Store {
            source: StorageError::BucketNotFound { .. },
            ..
        }
    ));
}
