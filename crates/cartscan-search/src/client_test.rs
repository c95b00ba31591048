use super::*;

fn test_client(base_url: &str) -> SearchClient {
    SearchClient::with_base_url(base_url, 30, "cartscan-test/0.1", RetryPolicy::no_retries())
        .expect("client construction should not fail")
}

fn haribo() -> SearchQuery {
    SearchQuery::new("haribo", "88010560", "BR")
}

#[test]
fn build_url_constructs_correct_query_string() {
    let client = test_client("https://cornershopapp.com");
    let url = client.build_url(&haribo());
    assert_eq!(
        url.as_str(),
        "https://cornershopapp.com/api/v2/branches/search?query=haribo&locality=88010560&country=BR"
    );
}

#[test]
fn new_targets_production_host() {
    let client = SearchClient::new(30, "cartscan-test/0.1", RetryPolicy::default())
        .expect("client construction should not fail");
    assert_eq!(
        client.search_url.as_str(),
        "https://cornershopapp.com/api/v2/branches/search"
    );
    assert_eq!(client.retry_policy().max_retries, 3);
}

#[test]
fn build_url_strips_trailing_slash() {
    let client = test_client("https://cornershopapp.com/");
    let url = client.build_url(&haribo());
    assert!(url
        .as_str()
        .starts_with("https://cornershopapp.com/api/v2/branches/search?"));
}

#[test]
fn build_url_keeps_base_path_prefix() {
    let client = test_client("http://127.0.0.1:8080/proxy");
    let url = client.build_url(&haribo());
    assert_eq!(url.path(), "/proxy/api/v2/branches/search");
}

#[test]
fn build_url_encodes_special_characters() {
    let client = test_client("https://cornershopapp.com");
    let url = client.build_url(&SearchQuery::new("m&m peanut", "88010-560", "BR"));
    assert!(
        url.as_str().contains("query=m%26m+peanut"),
        "query param should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = SearchClient::with_base_url("not a url", 30, "ua", RetryPolicy::default());
    assert!(matches!(result, Err(FetchError::InvalidBaseUrl { .. })));
}
