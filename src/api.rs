// 🌐 REST API - axum router and handlers
//
//   GET    /v1/swift-codes/:code
//   GET    /v1/swift-codes/country/:iso2
//   POST   /v1/swift-codes
//   DELETE /v1/swift-codes/:code
//   GET    /health

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rusqlite::Connection;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{self, NewSwiftCode, StoreError, StoreResult};
use crate::operations::{self, CreateOutcome, DeleteOutcome};
use crate::schema::{
    self, CountrySwiftCodes, MessageResponse, SwiftCodeDetail, ValidationError,
};

pub const CODE_NOT_FOUND: &str = "SWIFT code not found";
pub const COUNTRY_NOT_FOUND: &str = "No SWIFT codes found for this country";
pub const CODE_EXISTS: &str = "SWIFT code already exists.";
pub const CODE_ADDED: &str = "SWIFT code added successfully.";
pub const CODE_DELETED: &str = "SWIFT code deleted successfully.";

/// Shared application state
///
/// Only the database location is shared; every request opens and drops its
/// own connection.
#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    /// Run `f` on a fresh connection in the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = db::connect(&db_path)?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Request task failed: {0}")]
    Task(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!(msg)),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ApiError::InvalidBody(msg) => (StatusCode::UNPROCESSABLE_ENTITY, json!(msg)),
            ApiError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal server error"))
            }
            ApiError::Task(e) => {
                tracing::error!(error = %e, "request task failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal server error"))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// JSON create payload that has passed shape validation
///
/// Rejections (missing field, wrong type, bad countryISO2) are answered with
/// 422 before any handler code runs.
#[derive(Debug)]
pub struct ValidatedSwiftCode(pub NewSwiftCode);

#[async_trait]
impl<S> FromRequest<S> for ValidatedSwiftCode
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<NewSwiftCode>::from_request(req, state).await?;
        let data = schema::normalize_new_swift_code(data);

        schema::validate_new_swift_code(&data).map_err(ApiError::Validation)?;

        Ok(ValidatedSwiftCode(data))
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// GET /v1/swift-codes/:code - One code, with branches when it is a headquarter
async fn get_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SwiftCodeDetail>, ApiError> {
    let detail = state
        .with_conn(move |conn| {
            let Some(record) = operations::get_by_code(conn, &code)? else {
                return Ok(None);
            };

            let branches = if record.is_headquarter {
                operations::get_branches_for_headquarter(conn, &code)?
            } else {
                Vec::new()
            };

            Ok(Some(SwiftCodeDetail::new(record, branches)))
        })
        .await?;

    detail.map(Json).ok_or(ApiError::NotFound(CODE_NOT_FOUND))
}

/// GET /v1/swift-codes/country/:iso2 - All codes of a country
async fn get_by_country(
    State(state): State<AppState>,
    Path(iso2): Path<String>,
) -> Result<Json<CountrySwiftCodes>, ApiError> {
    let query = iso2.clone();
    let records = state
        .with_conn(move |conn| operations::get_by_country(conn, &query))
        .await?;

    CountrySwiftCodes::from_records(&iso2, records)
        .map(Json)
        .ok_or(ApiError::NotFound(COUNTRY_NOT_FOUND))
}

/// POST /v1/swift-codes - Add a code
async fn create_swift_code(
    State(state): State<AppState>,
    ValidatedSwiftCode(data): ValidatedSwiftCode,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = state
        .with_conn(move |conn| operations::create(conn, &data))
        .await?;

    match outcome {
        CreateOutcome::Created(record) => {
            tracing::info!(code = %record.swift_code, "SWIFT code added");
            Ok(Json(MessageResponse::new(CODE_ADDED)))
        }
        CreateOutcome::AlreadyExists => Err(ApiError::Conflict(CODE_EXISTS)),
    }
}

/// DELETE /v1/swift-codes/:code - Remove a code
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target = code.clone();
    let outcome = state
        .with_conn(move |conn| operations::delete(conn, &target))
        .await?;

    match outcome {
        DeleteOutcome::Deleted => {
            tracing::info!(%code, "SWIFT code deleted");
            Ok(Json(MessageResponse::new(CODE_DELETED)))
        }
        DeleteOutcome::NotFound => Err(ApiError::NotFound(CODE_NOT_FOUND)),
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let api_routes: Router<AppState> = Router::new()
        .route("/swift-codes", post(create_swift_code))
        .route(
            "/swift-codes/:code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/swift-codes/country/:iso2", get(get_by_country));

    Router::new()
        .route("/health", get(health_check))
        .nest("/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
