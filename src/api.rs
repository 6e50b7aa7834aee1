use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::comparison::{compare_periods, daily_trend};
use crate::model::{ComparisonReport, SummaryResponse, TellerRow, TrendResponse, UnitCard};
use crate::services::report_service::{build_teller_rows, build_unit_cards};
use crate::services::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TellerParams {
    #[serde(default)]
    pub search: String,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/summary", get(get_summary))
        .route("/units", get(get_units))
        .route("/tellers", get(get_tellers))
        .route("/trend", get(get_trend))
        .route("/comparison", get(get_comparison))
        .route("/refresh", post(refresh))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, StatusCode> {
    debug!("Fetching summary stats");
    let summary = state.report_service.summary().await.ok_or_else(|| {
        warn!("No report snapshot available yet");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    info!(
        "Summary: overall total {:.2}, {} tellers, avg daily {:.2}",
        summary.overall_total, summary.total_tellers, summary.avg_daily
    );
    Ok(Json(summary))
}

#[instrument(skip(state))]
async fn get_units(State(state): State<AppState>) -> Result<Json<Vec<UnitCard>>, StatusCode> {
    debug!("Fetching unit cards");
    let model = state.report_service.snapshot().await.ok_or_else(|| {
        warn!("No report snapshot available yet");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let cards = build_unit_cards(&model);
    info!("Retrieved {} unit cards", cards.len());
    Ok(Json(cards))
}

#[instrument(skip(state), fields(search = %params.search))]
async fn get_tellers(
    State(state): State<AppState>,
    Query(params): Query<TellerParams>,
) -> Result<Json<Vec<TellerRow>>, StatusCode> {
    debug!("Fetching teller table rows");
    let model = state.report_service.snapshot().await.ok_or_else(|| {
        warn!("No report snapshot available yet");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let rows = build_teller_rows(&model, &params.search);
    info!("Retrieved {} teller rows", rows.len());
    Ok(Json(rows))
}

#[instrument(skip(state))]
async fn get_trend(State(state): State<AppState>) -> Result<Json<TrendResponse>, StatusCode> {
    debug!("Fetching daily trend series");
    let model = state.report_service.snapshot().await.ok_or_else(|| {
        warn!("No report snapshot available yet");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(TrendResponse {
        dates: model.dates.clone(),
        daily_totals: daily_trend(&model),
    }))
}

#[instrument(skip(state))]
async fn get_comparison(
    State(state): State<AppState>,
) -> Result<Json<ComparisonReport>, StatusCode> {
    debug!("Fetching period comparison");
    let model = state.report_service.snapshot().await.ok_or_else(|| {
        warn!("No report snapshot available yet");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    let report = compare_periods(&model).ok_or_else(|| {
        warn!(
            "Comparison unavailable: only {} date columns",
            model.dates.len()
        );
        StatusCode::NOT_FOUND
    })?;

    info!(
        "Comparison: prev {:.2} vs curr {:.2} ({:+.1}%)",
        report.total_prev, report.total_curr, report.growth
    );
    Ok(Json(report))
}

#[instrument(skip(state))]
async fn refresh(State(state): State<AppState>) -> Result<Json<SummaryResponse>, StatusCode> {
    info!("Manual refresh requested");
    state.report_service.refresh().await.map_err(|e| {
        error!("Refresh failed: {}", e);
        StatusCode::BAD_GATEWAY
    })?;

    // refresh() just installed a snapshot, so summary is always present here
    state
        .report_service
        .summary()
        .await
        .map(Json)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}
