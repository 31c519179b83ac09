//! Tests for pagination module

use super::*;
use crate::http::{ApiClient, HttpClientConfig};
use crate::types::{endpoint_link, Key, LinkMap, QueryData};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Arc<ApiClient> {
    let config = HttpClientConfig::builder().base_url(server.uri()).build();
    Arc::new(ApiClient::with_config(config).unwrap())
}

fn page(ids: &[u64], links: &str) -> ResponseTemplate {
    let body: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    let template = ResponseTemplate::new(200).set_body_json(body);
    if links.is_empty() {
        template
    } else {
        template.insert_header("Links", links)
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        if request_count(server).await >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Expected {count} requests");
}

fn ids(items: &[Value]) -> Vec<u64> {
    items.iter().filter_map(|item| item["id"].as_u64()).collect()
}

// ============================================================================
// Link Header Tests
// ============================================================================

#[test]
fn test_parse_links_example() {
    let links = parse_links(Some(
        "<https://x/a?after=5>; rel=\"next\",<https://x/a?before=2>; rel=\"prev\"",
    ));

    let mut expected = LinkMap::new();
    expected.insert("next".to_string(), "https://x/a?after=5".to_string());
    expected.insert("prev".to_string(), "https://x/a?before=2".to_string());
    assert_eq!(links, expected);
}

#[test_case("</api/v1/players/?after=5>; rel=\"next\"", 1 ; "single entry")]
#[test_case("</a?after=5>;rel=next, </a?before=1>;rel=prev", 2 ; "unquoted without spaces")]
#[test_case("</a?after=5>; rel=\"next\", </a?before=1>; rel=\"prev\", </a>; rel=\"first\"", 3 ; "three relations")]
fn test_parse_links_one_entry_per_segment(header: &str, expected: usize) {
    let links = parse_links(Some(header));
    assert_eq!(links.len(), expected);
    assert!(links.keys().all(|rel| !rel.contains('"')));
}

#[test]
fn test_parse_links_absent_or_empty() {
    assert!(parse_links(None).is_empty());
    assert!(parse_links(Some("")).is_empty());
}

#[test]
fn test_parse_links_skips_malformed_entries() {
    let links = parse_links(Some("garbage, </a?after=5>; rel=\"next\", </b>"));
    assert_eq!(links.len(), 1);
    assert_eq!(links["next"], "/a?after=5");
}

#[test]
fn test_parse_link_header_strict() {
    let links = parse_link_header_strict("</a?after=5>; rel=\"next\"").unwrap();
    assert_eq!(links["next"], "/a?after=5");

    let err = parse_link_header_strict("</a?after=5>; rel=\"next\", </b>").unwrap_err();
    assert!(err.to_string().contains("missing rel parameter"));

    let err = parse_link_header_strict("/a; rel=\"next\"").unwrap_err();
    assert!(err.to_string().contains("<...>"));
}

// ============================================================================
// Paginator Config Tests
// ============================================================================

#[test]
fn test_paginator_config_builder() {
    let config = PaginatorConfig::new("/players/")
        .query("limit", "25")
        .filter("name")
        .debounce_ms(250);

    assert_eq!(config.endpoint, "/players/");
    assert_eq!(config.query.get("limit"), Some(&"25".to_string()));
    assert_eq!(config.filter_param.as_deref(), Some("name"));
    assert_eq!(config.debounce_ms, 250);
}

#[test]
fn test_paginator_config_defaults_from_yaml() {
    let config: PaginatorConfig = serde_yaml::from_str("endpoint: /demons/").unwrap();
    assert!(config.query.is_empty());
    assert!(config.filter_param.is_none());
    assert_eq!(config.debounce_ms, DEFAULT_DEBOUNCE_MS);
}

// ============================================================================
// Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_initialize_renders_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("limit", "2"))
        .respond_with(page(&[1, 2], "</api/v1/players/?after=2&limit=2>; rel=\"next\""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PaginatorConfig::new("/players/").query("limit", "2");
    let paginator = Paginator::json(client_for(&mock_server), &config);

    assert!(!paginator.is_loaded().await);
    assert_eq!(paginator.current_link().await, "/players/?limit=2");

    assert!(paginator.initialize().await);
    assert!(paginator.is_loaded().await);
    assert_eq!(ids(&paginator.items().await), vec![1, 2]);
    assert!(paginator.has_next().await);
    assert!(!paginator.has_prev().await);
}

#[tokio::test]
async fn test_current_link_tracks_query_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[], ""))
        .mount(&mock_server)
        .await;

    let config = PaginatorConfig::new("/players/").query("limit", "10");
    let paginator = Paginator::json(client_for(&mock_server), &config);
    paginator.initialize().await;

    paginator.update_query_data("name", "stard ust").await;
    let query = paginator.query_data().await;
    assert_eq!(query.len(), 2);
    assert_eq!(
        paginator.current_link().await,
        endpoint_link("/players/", &query)
    );
    assert_eq!(
        paginator.current_link().await,
        "/players/?limit=10&name=stard+ust"
    );

    let mut replacement = QueryData::new();
    replacement.insert("nation".to_string(), "DE".to_string());
    paginator.set_query_data(replacement.clone()).await;

    assert_eq!(paginator.query_data().await, replacement);
    assert_eq!(paginator.current_link().await, "/players/?nation=DE");
    assert_eq!(request_count(&mock_server).await, 3);
}

#[tokio::test]
async fn test_next_and_prev_follow_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("after", "2"))
        .respond_with(page(
            &[3, 4],
            "</api/v1/players/?before=3&limit=2>; rel=\"prev\"",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("limit", "2"))
        .respond_with(page(&[1, 2], "</api/v1/players/?after=2&limit=2>; rel=\"next\""))
        .mount(&mock_server)
        .await;

    let config = PaginatorConfig::new("/players/").query("limit", "2");
    let paginator = Paginator::json(client_for(&mock_server), &config);
    paginator.initialize().await;

    assert!(paginator.next().await);
    assert_eq!(ids(&paginator.items().await), vec![3, 4]);
    // Following a link leaves the query data and current link alone
    assert_eq!(paginator.current_link().await, "/players/?limit=2");
    assert!(!paginator.has_next().await);
    assert!(paginator.has_prev().await);

    assert!(paginator.prev().await);
    assert_eq!(ids(&paginator.items().await), vec![1, 2]);
    assert_eq!(paginator.pages_loaded().await, 3);
}

#[tokio::test]
async fn test_next_without_link_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[1], ""))
        .expect(1)
        .mount(&mock_server)
        .await;

    let paginator = Paginator::json(client_for(&mock_server), &PaginatorConfig::new("/players/"));
    paginator.initialize().await;

    assert!(!paginator.next().await);
    assert!(!paginator.prev().await);
    assert_eq!(request_count(&mock_server).await, 1);
}

#[tokio::test]
async fn test_links_replaced_not_merged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("after", "1"))
        .respond_with(page(&[2], "</api/v1/players/?before=2>; rel=\"prev\""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[1], "</api/v1/players/?after=1>; rel=\"next\""))
        .mount(&mock_server)
        .await;

    let paginator = Paginator::json(client_for(&mock_server), &PaginatorConfig::new("/players/"));
    paginator.initialize().await;
    paginator.next().await;

    let links = paginator.links().await;
    assert_eq!(links.len(), 1);
    assert!(links.contains_key("prev"));
}

#[tokio::test]
async fn test_item_constructor_and_select_hook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/demons/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Bloodbath"},
            {"id": 2, "name": "Sonic Wave"}
        ])))
        .mount(&mock_server)
        .await;

    let paginator = Paginator::new(
        client_for(&mock_server),
        &PaginatorConfig::new("/demons/"),
        |value: &Value| value["name"].as_str().unwrap_or_default().to_string(),
    );
    paginator.initialize().await;
    assert_eq!(paginator.items().await, vec!["Bloodbath", "Sonic Wave"]);

    // No hook installed yet
    assert!(!paginator.select(0).await);

    let selected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&selected);
    paginator
        .on_select(move |name: &String| sink.lock().unwrap().push(name.clone()))
        .await;

    assert!(paginator.select(1).await);
    assert!(!paginator.select(5).await);
    assert_eq!(*selected.lock().unwrap(), vec!["Sonic Wave".to_string()]);
}

#[tokio::test]
async fn test_non_array_body_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"players": []})))
        .mount(&mock_server)
        .await;

    let paginator = Paginator::json(client_for(&mock_server), &PaginatorConfig::new("/players/"));

    assert!(!paginator.initialize().await);
    assert!(!paginator.is_loaded().await);
    assert!(paginator.error_output().is_visible());
    assert!(paginator.error_output().text().contains("expected a JSON array"));
}

#[tokio::test]
async fn test_failed_refresh_keeps_current_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("name", "boom"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[1, 2], ""))
        .mount(&mock_server)
        .await;

    let paginator = Paginator::json(client_for(&mock_server), &PaginatorConfig::new("/players/"));
    paginator.initialize().await;

    assert!(!paginator.update_query_data("name", "boom").await);
    assert_eq!(ids(&paginator.items().await), vec![1, 2]);
    assert_eq!(
        paginator.error_output().text(),
        "Server unexpectedly returned 500 (Internal Server Error)"
    );
}

#[tokio::test]
async fn test_attached_controls_and_stop() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .and(query_param("after", "1"))
        .respond_with(page(&[2], "</api/v1/players/?before=2>; rel=\"prev\""))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[1], "</api/v1/players/?after=1>; rel=\"next\""))
        .mount(&mock_server)
        .await;

    let paginator = Paginator::json(client_for(&mock_server), &PaginatorConfig::new("/players/"));
    paginator.initialize().await;

    let controls = paginator.attach();
    assert!(paginator.is_listening());

    controls.send(Control::Next).unwrap();
    wait_for_requests(&mock_server, 2).await;
    for _ in 0..200 {
        if paginator.has_prev().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(ids(&paginator.items().await), vec![2]);

    paginator.stop();
    paginator.stop();
    assert!(!paginator.is_listening());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let _ = controls.send(Control::Prev);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(request_count(&mock_server).await, 2);
    assert_eq!(ids(&paginator.items().await), vec![2]);
}

// ============================================================================
// Filtered Paginator Tests
// ============================================================================

fn filtered_config(debounce_ms: u64) -> PaginatorConfig {
    PaginatorConfig::new("/players/")
        .filter("name")
        .debounce_ms(debounce_ms)
}

#[tokio::test]
async fn test_rapid_input_applies_filter_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[], ""))
        .mount(&mock_server)
        .await;

    let filtered = FilteredPaginator::json(client_for(&mock_server), &filtered_config(100)).unwrap();
    filtered.paginator().initialize().await;

    filtered.on_input("s");
    filtered.on_input("st");
    filtered.on_input("sta");
    assert!(filtered.has_pending_input());

    wait_for_requests(&mock_server, 2).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url.query(), Some("name=sta"));
    assert_eq!(
        filtered.paginator().query_data().await.get("name"),
        Some(&"sta".to_string())
    );
}

#[tokio::test]
async fn test_enter_and_change_apply_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[], ""))
        .mount(&mock_server)
        .await;

    let filtered = FilteredPaginator::json(client_for(&mock_server), &filtered_config(60_000)).unwrap();
    assert_eq!(filtered.param(), "name");

    filtered.set_value("dust");
    assert!(!filtered.on_key(Key::Char('t')).await);
    assert!(filtered.on_key(Key::Enter).await);
    assert_eq!(
        filtered.paginator().current_link().await,
        "/players/?name=dust"
    );

    filtered.set_value("star");
    assert!(filtered.on_change().await);
    assert_eq!(filtered.value(), "star");
    assert_eq!(
        filtered.paginator().current_link().await,
        "/players/?name=star"
    );
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_enter_while_typing_cancels_pending_input() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[], ""))
        .mount(&mock_server)
        .await;

    let filtered = FilteredPaginator::json(client_for(&mock_server), &filtered_config(100)).unwrap();

    filtered.on_input("stard");
    assert!(filtered.has_pending_input());
    assert!(filtered.on_key(Key::Enter).await);
    assert!(!filtered.has_pending_input());

    tokio::time::sleep(Duration::from_millis(300)).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("name=stard"));
}

#[tokio::test]
async fn test_abandoned_wait_does_not_duplicate_filter_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/players/"))
        .respond_with(page(&[], ""))
        .mount(&mock_server)
        .await;

    let filtered = FilteredPaginator::json(client_for(&mock_server), &filtered_config(100)).unwrap();

    filtered.on_input("s");
    let waited = tokio::time::timeout(Duration::from_millis(10), filtered.settled()).await;
    assert!(waited.is_err());

    filtered.on_input("st");
    filtered.settled().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("name=st"));
}

#[test]
fn test_filtered_requires_filter_param() {
    let config = HttpClientConfig::default();
    let client = Arc::new(ApiClient::with_config(config).unwrap());

    let result = FilteredPaginator::json(client, &PaginatorConfig::new("/players/"));
    assert!(result.is_err());
}
