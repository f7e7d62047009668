use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::models::{ApiResponse, NormalizedMatch, PredictionRequest, PredictionResponse, Sport};
use crate::services::{DataFetcher, PredictionEngine, PromptContext};

#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub fetcher: Arc<DataFetcher>,
    pub engine: Arc<PredictionEngine>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            app_name: Arc::from(config.app_name.as_str()),
            fetcher: Arc::new(DataFetcher::new(config)),
            engine: Arc::new(PredictionEngine::new(config)),
        }
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message.into())))
}

pub async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(config);

    if !state.engine.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, prediction endpoints will fail");
    }

    spawn_cache_purge(state.fetcher.clone(), config.cache_ttl);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("{} listening on port {}", config.app_name, port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drop expired cache entries so per-match keys do not accumulate.
fn spawn_cache_purge(fetcher: Arc<DataFetcher>, ttl: Duration) {
    let period = ttl.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = fetcher.purge_expired();
            if removed > 0 {
                tracing::debug!(
                    "Purged {} expired cache entries, {} remaining",
                    removed,
                    fetcher.cached_entries()
                );
            }
        }
    });
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/predict/{sport}/predict", post(predict_handler))
        .route("/predict/{sport}/live", get(live_matches_handler))
        .route("/predict/{sport}/live/{match_id}", get(live_match_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn parse_sport(raw: &str) -> Result<Sport, ApiError> {
    raw.parse::<Sport>()
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    app: String,
}

// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "healthy",
        app: state.app_name.to_string(),
    }))
}

// POST /predict/{sport}/predict - Live data + model prediction for a match
async fn predict_handler(
    State(state): State<AppState>,
    Path(sport): Path<String>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<ApiResponse<PredictionResponse>>, ApiError> {
    let sport = parse_sport(&sport)?;
    let match_data = state.fetcher.get_live_match_data(sport, &request.match_id).await;

    let context = PromptContext {
        prediction_type: Some(request.prediction_type.as_str()),
        recent_form: request.recent_form.as_deref(),
    };

    match state.engine.generate_prediction(&match_data, &context).await {
        Ok(prediction) => Ok(Json(ApiResponse::success(PredictionResponse {
            match_id: request.match_id,
            prediction: prediction.prediction,
            confidence: prediction.confidence,
            timestamp: prediction.timestamp,
            match_data,
        }))),
        Err(e) => {
            tracing::error!("Error in {} prediction: {}", sport, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

// GET /predict/{sport}/live/{match_id} - Normalized live record
async fn live_match_handler(
    State(state): State<AppState>,
    Path((sport, match_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<NormalizedMatch>>, ApiError> {
    let sport = parse_sport(&sport)?;
    let match_data = state.fetcher.get_live_match_data(sport, &match_id).await;
    Ok(Json(ApiResponse::success(match_data)))
}

// GET /predict/{sport}/live - Every in-progress match for the sport
async fn live_matches_handler(
    State(state): State<AppState>,
    Path(sport): Path<String>,
) -> Result<Json<ApiResponse<Vec<NormalizedMatch>>>, ApiError> {
    let sport = parse_sport(&sport)?;
    let matches = state.fetcher.get_live_matches(sport).await;
    Ok(Json(ApiResponse::success(matches)))
}
