//! HTTP server for the SWIFT code registry.
//!
//! # API Endpoints
//!
//! | Method | Path                                | Description                        |
//! |--------|-------------------------------------|------------------------------------|
//! | GET    | `/health`                           | Health check                       |
//! | GET    | `/v1/swift-codes/{swift_code}`      | One code, headquarters with branches |
//! | GET    | `/v1/swift-codes/country/{iso2}`    | All codes of a country             |
//! | POST   | `/v1/swift-codes`                   | Add one code                       |
//! | DELETE | `/v1/swift-codes/{swift_code}`      | Remove one code                    |
//! | POST   | `/v1/swift-codes/upload`            | Import a CSV feed (multipart)      |
//! | GET    | `/v1/logs`                          | SSE stream of import logs          |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        Json, Sse,
    },
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::logs::{log_error, log_info, log_success, log_warning, LOG_BROADCASTER};
use super::types::{
    error_response, parse_error_response, BranchResponse, CountryResponse, ImportResponse,
    MessageResponse, SwiftCodeResponse,
};
use crate::dataset::{check_extension, normalize_text, parse_swift_bytes, ParseOptions};
use crate::error::{ParseError, ServerResult, StoreError};
use crate::models::NewSwiftCode;
use crate::store::SwiftCodeStore;

/// Upload size limit (50 MB).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<T, ApiError>;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<SwiftCodeStore>>,
}

impl AppState {
    pub fn new(store: SwiftCodeStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    pub fn store(&self) -> &Arc<RwLock<SwiftCodeStore>> {
        &self.store
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/v1/swift-codes", post(create_swift_code))
        .route("/v1/swift-codes/upload", post(upload_csv))
        .route("/v1/swift-codes/country/{country_iso2}", get(get_by_country))
        .route(
            "/v1/swift-codes/{swift_code}",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/v1/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(addr: SocketAddr, store: SwiftCodeStore) -> ServerResult<()> {
    let records = store.len();
    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, records, "SWIFT code server running");

    axum::serve(listener, app).await?;
    Ok(())
}

fn error(status: StatusCode, detail: &str) -> ApiError {
    (status, Json(error_response(detail)))
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %err, "request failed");
    error(StatusCode::INTERNAL_SERVER_ERROR, &format!("Store error occurred: {err}"))
}

fn rejected(err: ParseError) -> ApiError {
    log_error(format!("Import rejected: {err}"));
    (StatusCode::BAD_REQUEST, Json(parse_error_response(&err)))
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let records = state.store.read().await.len();
    Json(json!({
        "status": "ok",
        "service": "swiftcodes",
        "version": env!("CARGO_PKG_VERSION"),
        "records": records,
    }))
}

/// One SWIFT code; headquarters include their branches
async fn get_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> ApiResult<Json<SwiftCodeResponse>> {
    let swift_code = normalize_text(&swift_code);
    let store = state.store.read().await;

    let record = store
        .get(&swift_code)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "No data found."))?;

    let branches = record.is_headquarter.then(|| {
        store
            .branches(&swift_code)
            .into_iter()
            .map(BranchResponse::from)
            .collect()
    });

    Ok(Json(SwiftCodeResponse::new(record, branches)))
}

/// All SWIFT codes of one country
async fn get_by_country(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
) -> ApiResult<Json<CountryResponse>> {
    let country_iso2 = normalize_text(&country_iso2);
    let store = state.store.read().await;

    let records = store.by_country(&country_iso2);
    let first = records.first().ok_or_else(|| {
        error(
            StatusCode::NOT_FOUND,
            "No data found for the specified country code.",
        )
    })?;

    Ok(Json(CountryResponse {
        country_name: first.country_name.clone(),
        swift_codes: records.iter().copied().map(BranchResponse::from).collect(),
        country_iso2,
    }))
}

/// Add one SWIFT code
async fn create_swift_code(
    State(state): State<AppState>,
    Json(payload): Json<NewSwiftCode>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let record = payload
        .into_record()
        .map_err(|e| error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()))?;

    let mut store = state.store.write().await;
    store.insert_and_save(record).map_err(|e| match e {
        StoreError::AlreadyExists(_) => error(
            StatusCode::CONFLICT,
            "SWIFT code already exists in the database",
        ),
        other => internal(other),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("SWIFT code record created successfully.")),
    ))
}

/// Remove one SWIFT code
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let swift_code = normalize_text(&swift_code);
    let mut store = state.store.write().await;

    store.remove_and_save(&swift_code).map_err(|e| match e {
        StoreError::NotFound(_) => error(StatusCode::NOT_FOUND, "SWIFT code not found."),
        other => internal(other),
    })?;

    Ok(Json(MessageResponse::new(
        "SWIFT code record deleted successfully",
    )))
}

/// SSE endpoint for real-time import logs
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Import a CSV feed
///
/// The whole file is validated before anything touches the store, and a
/// failed snapshot write leaves the store as it was.
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportResponse>> {
    let mut file_data = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error(StatusCode::BAD_REQUEST, &format!("Multipart error: {e}"))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(str::to_string);
            file_data = Some(field.bytes().await.map_err(|e| {
                error(StatusCode::BAD_REQUEST, &format!("Read error: {e}"))
            })?);
        }
    }

    let bytes = file_data.ok_or_else(|| error(StatusCode::BAD_REQUEST, "No file provided"))?;

    log_info(format!(
        "Importing {} ({} bytes)",
        file_name.as_deref().unwrap_or("upload"),
        bytes.len()
    ));

    // a part without a file name has no extension either
    let name = std::path::Path::new(file_name.as_deref().unwrap_or(""));
    check_extension(name).map_err(rejected)?;

    let dataset =
        tokio::task::spawn_blocking(move || parse_swift_bytes(&bytes, &ParseOptions::default()))
            .await
            .map_err(internal)?
            .map_err(rejected)?;

    log_success(format!(
        "Validated {} records ({} headquarters)",
        dataset.len(),
        dataset.headquarter_count()
    ));

    let total = dataset.len();
    let headquarters = dataset.headquarter_count();
    let encoding = dataset.encoding.clone();
    let delimiter = dataset.delimiter;

    let summary = state
        .store
        .write()
        .await
        .load_and_save(dataset.into_records())
        .map_err(internal)?;

    if summary.skipped > 0 {
        log_warning(format!(
            "{} records already present, skipped",
            summary.skipped
        ));
    }
    log_success(format!("Inserted {} records", summary.inserted));

    Ok(Json(ImportResponse::new(
        file_name,
        encoding,
        delimiter,
        total,
        headquarters,
        summary,
    )))
}
