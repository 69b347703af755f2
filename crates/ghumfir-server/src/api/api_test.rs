use std::path::PathBuf;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use ghumfir_core::Environment;
use ghumfir_nearby::{MemoryCache, ResultCache};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const POPULAR_YAML: &str = r"
destinations:
  - name: Swayambhunath
    category: Temple
    latitude: 27.7149
    longitude: 85.2904
    rating: 4.8
  - name: Phewa Lake
    category: Lake
    latitude: 28.2153
    longitude: 83.9456
    rating: 4.7
";

fn test_config(primary_source_url: String) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "info".to_string(),
        popular_path: PathBuf::from("config/popular.yaml"),
        user_agent: "ghumfir-test".to_string(),
        primary_source_url,
        fallback_source_url: None,
        primary_timeout_secs: 5,
        fallback_timeout_secs: 5,
        location_timeout_secs: 1,
        location_hard_stop_margin_secs: 1,
        result_limit: 20,
        closest_anyway_count: 2,
        rate_limit_max_requests: 120,
        rate_limit_window_secs: 60,
    }
}

fn test_state(server: &MockServer, cache: Arc<dyn ResultCache>) -> AppState {
    let url = format!("{}/nearby", server.uri());
    let config = test_config(url.clone());
    let source = HttpSource::new("primary", &url, config.primary_timeout_secs, &config.user_agent)
        .expect("source");
    AppState {
        resolver: Arc::new(Resolver::new(vec![source]).with_rating_seed(1)),
        popular: Arc::new(ghumfir_core::parse_popular(POPULAR_YAML).expect("catalog")),
        cache,
        config: Arc::new(config),
    }
}

fn app(state: AppState) -> Router {
    let rate_limit = RateLimitState::from_config(&state.config);
    build_app(state, rate_limit)
}

fn post_nearby(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/nearby")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn pokhara_body() -> serde_json::Value {
    serde_json::json!({ "latitude": 28.2096, "longitude": 83.9856 })
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None, 20), 20);
    assert_eq!(normalize_limit(Some(0), 20), 1);
    assert_eq!(normalize_limit(Some(1_000), 20), 100);
    assert_eq!(normalize_limit(Some(5), 20), 5);
}

#[test]
fn error_codes_map_to_statuses() {
    let cases = [
        (ErrorCode::ValidationError, StatusCode::BAD_REQUEST),
        (ErrorCode::RateLimited, StatusCode::TOO_MANY_REQUESTS),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "boom").into_response();
        assert_eq!(response.status(), status);
    }
}

#[tokio::test]
async fn health_returns_ok_and_echoes_request_id() {
    let server = MockServer::start().await;
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["sources"], serde_json::json!(["primary"]));
    assert_eq!(json["data"]["popularCount"], 2);
    assert_eq!(json["meta"]["requestId"], "req-abc");
}

#[tokio::test]
async fn popular_is_sorted_when_origin_given() {
    let server = MockServer::start().await;
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(
            Request::builder()
                .uri("/api/v1/destinations/popular?latitude=28.2096&longitude=83.9856")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Phewa Lake");
    assert!(data[0]["distanceKm"].as_f64().expect("distance") < 10.0);
}

#[tokio::test]
async fn popular_rejects_half_a_coordinate() {
    let server = MockServer::start().await;
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(
            Request::builder()
                .uri("/api/v1/destinations/popular?latitude=28.2")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nearby_returns_matched_destinations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nearbyAttractions": [
                { "name": "Sarangkot Viewpoint", "latitude": 28.2096, "longitude": 83.9856, "rating": 4.8 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "matched");
    assert_eq!(json["data"]["source"], "primary");
    assert_eq!(json["data"]["destinations"][0]["category"], "Viewpoint");
    assert_eq!(json["data"]["destinations"][0]["distanceKm"], 0.0);
    assert!(json["data"].get("fallbackReason").is_none());
}

#[tokio::test]
async fn nearby_location_error_serves_popular() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(serde_json::json!({
            "locationError": { "code": 1, "message": "User denied Geolocation" }
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "popular");
    assert_eq!(json["data"]["destinations"].as_array().map(Vec::len), Some(2));
    let reason = json["data"]["fallbackReason"].as_str().expect("reason");
    assert!(reason.contains("permission_denied"), "reason was {reason}");
}

#[tokio::test]
async fn nearby_empty_location_error_is_unknown() {
    let server = MockServer::start().await;
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(serde_json::json!({ "locationError": {} })))
        .await
        .expect("response");

    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "popular");
    assert!(json["data"]["fallbackReason"]
        .as_str()
        .expect("reason")
        .contains("unknown"));
}

#[tokio::test]
async fn nearby_exhausted_sources_serve_popular_sorted_by_distance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "popular");
    assert_eq!(json["data"]["destinations"][0]["name"], "Phewa Lake");
    assert!(json["data"]["fallbackReason"]
        .as_str()
        .expect("reason")
        .contains("all nearby sources exhausted"));
}

#[tokio::test]
async fn nearby_serves_cache_after_sources_fail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Bindhyabasini Temple", "latitude": 28.2385, "longitude": 83.9856, "rating": 4.6 }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let router = app(test_state(&server, Arc::new(MemoryCache::new())));

    let first = router
        .clone()
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");
    assert_eq!(json_body(first).await["data"]["outcome"], "matched");

    let second = router
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");
    let json = json_body(second).await;
    assert_eq!(json["data"]["outcome"], "cached");
    assert_eq!(json["data"]["source"], "cache");
    assert_eq!(json["data"]["destinations"][0]["name"], "Bindhyabasini Temple");
}

#[tokio::test]
async fn nearby_cached_replay_respects_request_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Bindhyabasini Temple", "latitude": 28.2385, "longitude": 83.9856, "rating": 4.6 },
            { "name": "Phewa Lake", "latitude": 28.2153, "longitude": 83.9456, "rating": 4.7 },
            { "name": "Sarangkot Viewpoint", "latitude": 28.2439, "longitude": 83.9486, "rating": 4.8 }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let router = app(test_state(&server, Arc::new(MemoryCache::new())));

    let first = router
        .clone()
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");
    let json = json_body(first).await;
    assert_eq!(json["data"]["outcome"], "matched");
    assert_eq!(json["data"]["destinations"].as_array().expect("list").len(), 3);

    let mut limited = pokhara_body();
    limited["limit"] = serde_json::json!(1);
    let second = router
        .oneshot(post_nearby(limited))
        .await
        .expect("response");
    let json = json_body(second).await;
    assert_eq!(json["data"]["outcome"], "cached");
    assert_eq!(json["data"]["destinations"].as_array().expect("list").len(), 1);
}

#[tokio::test]
async fn nearby_location_error_popular_has_placeholder_images() {
    let server = MockServer::start().await;
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(serde_json::json!({ "locationError": { "code": 1 } })))
        .await
        .expect("response");

    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "popular");
    let destinations = json["data"]["destinations"].as_array().expect("list");
    assert!(!destinations.is_empty());
    for dest in destinations {
        let image = dest["imageUrl"].as_str().expect("imageUrl");
        assert!(image.starts_with("/images/placeholders/"), "got {image}");
    }
}

#[tokio::test]
async fn nearby_without_matches_shows_closest_anyway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Far Spot", "distance": 9.0, "rating": 3.0 },
            { "name": "Near Spot", "distance": 1.0, "rating": 3.0 },
            { "name": "Mid Spot", "distance": 4.0, "rating": 3.0 }
        ])))
        .mount(&server)
        .await;

    let mut body = pokhara_body();
    body["minRating"] = serde_json::json!(4.5);
    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(body))
        .await
        .expect("response");

    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "closest_anyway");
    let names: Vec<_> = json["data"]["destinations"]
        .as_array()
        .expect("destinations")
        .iter()
        .map(|d| d["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Near Spot", "Mid Spot"]);
}

#[tokio::test]
async fn nearby_empty_sources_report_no_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })))
        .mount(&server)
        .await;

    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(pokhara_body()))
        .await
        .expect("response");

    let json = json_body(response).await;
    assert_eq!(json["data"]["outcome"], "no_candidates");
    assert_eq!(json["data"]["destinations"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn nearby_invalid_filter_is_bad_request() {
    let server = MockServer::start().await;
    let mut body = pokhara_body();
    body["radiusKm"] = serde_json::json!(-5.0);

    let response = app(test_state(&server, Arc::new(MemoryCache::new())))
        .oneshot(post_nearby(body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests_per_client() {
    let server = MockServer::start().await;
    let router = build_app(
        test_state(&server, Arc::new(MemoryCache::new())),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let popular_from = |client: &str| {
        Request::builder()
            .uri("/api/v1/destinations/popular")
            .header("x-forwarded-for", client)
            .header("x-request-id", "req-limit")
            .body(Body::empty())
            .expect("request")
    };

    let first = router
        .clone()
        .oneshot(popular_from("10.0.0.1"))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .clone()
        .oneshot(popular_from("10.0.0.1"))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));
    let json = json_body(second).await;
    assert_eq!(json["error"]["code"], "rate_limited");
    assert_eq!(json["meta"]["requestId"], "req-limit");

    let other_client = router
        .oneshot(popular_from("10.0.0.2"))
        .await
        .expect("response");
    assert_eq!(other_client.status(), StatusCode::OK);
}
