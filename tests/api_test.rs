// API tests that exercise the Axum router end to end
// The report service is preloaded with a parsed snapshot instead of fetching

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt; // For `.collect()`
use mockito::{Matcher, Server};
use serde_json::Value;
use tower::ServiceExt; // For `oneshot`

use teller_report_service::api::{create_router, AppState};
use teller_report_service::fetcher::{ProxyEndpoint, ProxyKind, SheetFetcher};
use teller_report_service::parser::parse_csv;
use teller_report_service::services::ReportService;

/// Two units over 14 date columns; deterministic values so window sums are
/// easy to assert by hand.
fn sample_csv() -> String {
    let dates: Vec<String> = (1..=14).map(|d| format!("01/{:02}", d)).collect();
    let mut csv = format!("Branch North,Teller,{}\n", dates.join(","));
    // Alice: 10 per day -> prev 70, curr 70
    csv.push_str(&format!(
        "Alice,,{}\n",
        vec!["10"; 14].join(",")
    ));
    // Bob: 0 in the first week, 20 in the second -> prev 0, curr 140
    let mut bob: Vec<&str> = vec!["0"; 7];
    bob.extend(vec!["20"; 7]);
    csv.push_str(&format!("Bob,,{}\n", bob.join(",")));
    csv.push_str("Ghost,,0,0,0,0,0,0,0,0,0,0,0,0,0,0\n");
    csv.push_str("Total,,999\n");
    csv.push_str(&format!("Branch South,Teller,{}\n", dates.join(",")));
    csv.push_str(&format!("Eve,,{}\n", vec!["5"; 14].join(",")));
    csv
}

fn empty_service() -> ReportService {
    ReportService::new(SheetFetcher::with_proxies(
        "https://example.com/sheet.csv".to_string(),
        Vec::new(),
        50,
    ))
}

async fn loaded_state() -> AppState {
    let service = empty_service();
    let model = parse_csv(&sample_csv()).unwrap();
    service.replace_snapshot(model).await;
    AppState {
        report_service: service,
    }
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, Option<Value>) {
    let app = create_router(state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).ok();
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let state = AppState {
        report_service: empty_service(),
    };
    let (status, json) = get_json(state, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn test_endpoints_unavailable_before_first_fetch() {
    for uri in [
        "/api/v1/summary",
        "/api/v1/units",
        "/api/v1/tellers",
        "/api/v1/trend",
        "/api/v1/comparison",
    ] {
        let state = AppState {
            report_service: empty_service(),
        };
        let (status, _) = get_json(state, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_summary() {
    let (status, json) = get_json(loaded_state().await, "/api/v1/summary").await;
    let json = json.unwrap();

    assert_eq!(status, StatusCode::OK);
    // Alice 140 + Bob 140 + Eve 70; Ghost's all-zero row is dropped
    assert_eq!(json["overall_total"], 350.0);
    assert_eq!(json["total_tellers"], 3);
    assert_eq!(json["avg_daily"], 25.0);
    assert_eq!(json["date_range"], "01/01 - 01/14");
    assert!(json["last_synced_at"].is_string());
}

#[tokio::test]
async fn test_units_cards() {
    let (status, json) = get_json(loaded_state().await, "/api/v1/units").await;
    let cards = json.unwrap();

    assert_eq!(status, StatusCode::OK);
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["name"], "Branch North");
    assert_eq!(cards[0]["teller_count"], 2);
    assert_eq!(cards[0]["top_tellers"][0]["name"], "Alice");
    assert_eq!(cards[0]["more_tellers"], 0);
}

#[tokio::test]
async fn test_tellers_search_filter() {
    let (status, json) = get_json(loaded_state().await, "/api/v1/tellers?search=south").await;
    let rows = json.unwrap();

    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["teller"], "Eve");
    assert_eq!(rows[0]["unit"], "Branch South");
    assert_eq!(rows[0]["total"], 70.0);
}

#[tokio::test]
async fn test_trend_series() {
    let (status, json) = get_json(loaded_state().await, "/api/v1/trend").await;
    let json = json.unwrap();

    assert_eq!(status, StatusCode::OK);
    let totals = json["daily_totals"].as_array().unwrap();
    assert_eq!(totals.len(), 14);
    // First week: Alice 10 + Eve 5; second week adds Bob's 20
    assert_eq!(totals[0], 15.0);
    assert_eq!(totals[13], 35.0);
}

#[tokio::test]
async fn test_comparison_report() {
    let (status, json) = get_json(loaded_state().await, "/api/v1/comparison").await;
    let json = json.unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_prev"], 105.0);
    assert_eq!(json["total_curr"], 245.0);
    // (245 - 105) / 105 * 100
    let growth = json["growth"].as_f64().unwrap();
    assert!((growth - 133.333).abs() < 0.01);

    // Units sorted descending by current-window sum
    let units = json["units"].as_array().unwrap();
    assert_eq!(units[0]["name"], "Branch North");
    assert_eq!(units[0]["curr"], 210.0);
    assert_eq!(units[1]["name"], "Branch South");
}

#[tokio::test]
async fn test_comparison_unavailable_with_single_date() {
    let service = empty_service();
    let model = parse_csv("Branch North,Teller,01/01\nAlice,,10\n").unwrap();
    service.replace_snapshot(model).await;
    let state = AppState {
        report_service: service,
    };

    let (status, _) = get_json(state, "/api/v1/comparison").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_installs_snapshot() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/proxy")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(sample_csv())
        .create_async()
        .await;

    let fetcher = SheetFetcher::with_proxies(
        "https://example.com/sheet.csv".to_string(),
        vec![ProxyEndpoint::new(
            server.url() + "/proxy",
            ProxyKind::CodeTabs,
        )],
        50,
    );
    let service = ReportService::new(fetcher);
    let app = create_router(AppState {
        report_service: service.clone(),
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["overall_total"], 350.0);

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.units.len(), 2);
}

#[tokio::test]
async fn test_refresh_reports_bad_gateway_when_exhausted() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/proxy")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let fetcher = SheetFetcher::with_proxies(
        "https://example.com/sheet.csv".to_string(),
        vec![ProxyEndpoint::new(
            server.url() + "/proxy",
            ProxyKind::CodeTabs,
        )],
        50,
    );
    let app = create_router(AppState {
        report_service: ReportService::new(fetcher),
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
