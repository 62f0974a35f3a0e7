use crate::clock::{Clock, SystemClock};
use crate::error::HubError;
use crate::pipeline::CollectionOrchestrator;
use crate::storage::Store;
use crate::tasks::{build_schedule, ScheduleParams};
use crate::types::{Category, RecordFilter, Source};
use axum::{
    extract::{Path, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub orchestrator: Arc<CollectionOrchestrator>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, orchestrator: Arc<CollectionOrchestrator>) -> Self {
        Self { store, orchestrator, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// JSON `{error}` body with a status derived from the error kind
pub struct ApiError(HubError);

impl From<HubError> for ApiError {
    fn from(e: HubError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            HubError::InvalidCategory(_) | HubError::InvalidStatus(_) | HubError::InvalidSchedule(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

async fn health(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let database = match state.store.list_sources("__health__").await {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };
    Json(json!({
        "status": "healthy",
        "timestamp": state.clock.now().to_rfc3339(),
        "collectors": state.orchestrator.collectors().names(),
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn dashboard(Extension(state): Extension<AppState>, Path(user_id): Path<String>) -> ApiResult {
    let counts = state.store.aggregate_counts(&user_id).await?;
    Ok(Json(counts).into_response())
}

async fn list_sources(Extension(state): Extension<AppState>, Path(user_id): Path<String>) -> ApiResult {
    let mut sources = state.store.list_sources(&user_id).await?;
    sources.reverse();
    Ok(Json(sources).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSource {
    user_id: String,
    name: String,
    url: String,
    #[serde(rename = "type")]
    kind: String,
}

async fn create_source(Extension(state): Extension<AppState>, Json(body): Json<NewSource>) -> ApiResult {
    let category: Category = body.kind.parse()?;
    let source = Source::new(&body.user_id, &body.name, &body.url, category);
    state.store.insert_source(&source).await?;
    info!("Created {} source {} for {}", category, source.name, source.user_id);
    Ok((StatusCode::CREATED, Json(source)).into_response())
}

async fn collect(Extension(state): Extension<AppState>, Path(user_id): Path<String>) -> ApiResult {
    let summary = state.orchestrator.run(&user_id).await?;
    Ok(Json(json!({
        "success": true,
        "collected": summary.collected,
        "verified": summary.verified,
        "sources": summary.active_sources,
    }))
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
struct DataQuery {
    category: Option<String>,
    status: Option<String>,
    limit: Option<u32>,
}

async fn data(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DataQuery>,
) -> ApiResult {
    let filter = RecordFilter::parse(query.category.as_deref(), query.status.as_deref(), query.limit)?;
    let records = state.store.query_records(&user_id, &filter).await?;
    Ok(Json(records).into_response())
}

async fn schedule(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<String>,
    Json(params): Json<ScheduleParams>,
) -> ApiResult {
    let schedule = build_schedule(&user_id, &params, state.clock.now())?;
    state.store.upsert_schedule(&schedule).await?;
    info!("Scheduled {} collection for {} next at {}", schedule.frequency, user_id, schedule.next_run);
    Ok(Json(json!({
        "success": true,
        "schedule": {
            "frequency": schedule.frequency,
            "time": schedule.time,
            "timezone": schedule.timezone,
            "enabled": schedule.enabled,
            "nextRun": schedule.next_run.to_rfc3339(),
        },
    }))
    .into_response())
}

async fn metrics_text() -> impl IntoResponse {
    let body = crate::metrics::render().unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Router with every API route, CORS open for GET/POST
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboard/:user_id", get(dashboard))
        .route("/api/sources", post(create_source))
        .route("/api/sources/:user_id", get(list_sources))
        .route("/api/collect/:user_id", post(collect))
        .route("/api/data/:user_id", get(data))
        .route("/api/schedule/:user_id", post(schedule))
        .route("/metrics", get(metrics_text))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

pub async fn start_server(state: AppState, bind: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| HubError::Config(format!("invalid bind address '{}': {}", bind, e)))?;
    let app = create_server(state);

    info!("HTTP server running on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);
    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
