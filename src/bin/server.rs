//! NutriPlan Plan Server
//!
//! Stores one weekly meal plan per user so that every device a user plans
//! on sees the same week.
//!
//! # Configuration
//!
//! Environment variables:
//! - `NUTRIPLAN_PORT`: Port to listen on (default: 5000)
//! - `NUTRIPLAN_DATA_DIR`: Directory to store plans (default: ~/.local/share/nutriplan-server)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint
//! - `GET /plans?user_id=ID`: The user's stored plan record, or `null`
//! - `POST /plans`: Replace the user's plan (`{"user_id", "plan_data"}`)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nutriplan_core::{PlanRecord, SavePlanResponse, WeeklyPlan};

// ============================================================================
// Configuration
// ============================================================================

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// Directory to store plans
    data_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("NUTRIPLAN_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let data_dir = std::env::var("NUTRIPLAN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("nutriplan-server")
            });

        Self { port, data_dir }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Plan files on disk, one `<user_id>.json` per user.
///
/// Saves are serialized through a lock and written via a temp file, so a
/// reader never sees a half-written record. The last save wins.
struct PlanFiles {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl PlanFiles {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    fn path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }

    async fn load(&self, user_id: &str) -> Result<Option<PlanRecord>, ApiError> {
        let path = self.path(user_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ApiError::storage(&path, e)),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| ApiError::storage(&path, e))?;
        Ok(Some(record))
    }

    async fn save(&self, user_id: &str, plan: WeeklyPlan) -> Result<PlanRecord, ApiError> {
        let record = PlanRecord {
            user_id: user_id.to_string(),
            plan_data: Some(plan),
            updated_at: Some(Utc::now()),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(|e| ApiError::Internal(e.to_string()))?;

        let path = self.path(user_id);
        let tmp = path.with_extension("json.tmp");

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::storage(&self.dir, e))?;
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| ApiError::storage(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| ApiError::storage(&path, e))?;

        Ok(record)
    }
}

/// Returns true if `user_id` can be used as a file name.
fn valid_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= 128
        && !user_id.starts_with('.')
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
enum ApiError {
    BadRequest(&'static str),
    Internal(String),
}

impl ApiError {
    fn storage(path: &Path, e: impl std::fmt::Display) -> Self {
        ApiError::Internal(format!("{}: {}", path.display(), e))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    plans: Arc<PlanFiles>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct PlanQuery {
    user_id: Option<String>,
}

/// Both fields are optional so that a missing one is a 400, not a rejection.
#[derive(Deserialize)]
struct SaveBody {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    plan_data: Option<WeeklyPlan>,
}

fn require_user_id(user_id: Option<String>) -> Result<String, ApiError> {
    let user_id = user_id
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest("User ID required"))?;
    if !valid_user_id(&user_id) {
        return Err(ApiError::BadRequest("Invalid user ID"));
    }
    Ok(user_id)
}

async fn get_plan(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<Option<PlanRecord>>, ApiError> {
    let user_id = require_user_id(query.user_id)?;
    let record = state.plans.load(&user_id).await?;
    tracing::debug!("Fetched plan for {} (found: {})", user_id, record.is_some());
    Ok(Json(record))
}

async fn save_plan(
    State(state): State<AppState>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SavePlanResponse>, ApiError> {
    let user_id = require_user_id(body.user_id)?;
    let plan = body
        .plan_data
        .ok_or(ApiError::BadRequest("Plan data required"))?;

    let meals = plan.meal_count();
    state.plans.save(&user_id, plan).await?;
    tracing::info!("Saved plan for {} ({} meals)", user_id, meals);

    Ok(Json(SavePlanResponse {
        message: "Plan saved".to_string(),
    }))
}

fn app(data_dir: PathBuf) -> Router {
    let state = AppState {
        plans: Arc::new(PlanFiles::new(data_dir)),
    };

    Router::new()
        .route("/health", get(health))
        .route("/plans", get(get_plan).post(save_plan))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nutriplan_server=info,nutriplan_core=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Data directory: {}", config.data_dir.display());

    let app = app(config.data_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
