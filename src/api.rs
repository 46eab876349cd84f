use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::analysis::filter::ALL;
use crate::analysis::FilterCriteria;
use crate::dashboard_error::DashboardError;
use crate::models::{
    CategoryChart, CategoryPoint, ConsumptionEstimate, ConsumptionRanking, ConsumptionReport,
    DashboardView, DatasetOverview, FilterOptions, MonthlyChart, MonthlyPoint, RecordTable,
    RefuelingRecord, SheetStats, Source, SourceTotals, SourceView, SummaryMetrics,
};
use crate::services::DashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub max_upload_bytes: usize,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<DashboardError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::NoWorkbookLoaded => StatusCode::NOT_FOUND,
            DashboardError::Import(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, err.to_string())
    }
}

/// Filter selection shared by the dashboard endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// First day of the period (inclusive, YYYY-MM-DD)
    pub start: Option<NaiveDate>,
    /// Last day of the period (inclusive, YYYY-MM-DD)
    pub end: Option<NaiveDate>,
    /// Vehicle plate or "all"
    pub plate: Option<String>,
    /// Fuel type or "all"
    pub fuel_type: Option<String>,
}

impl DashboardQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_bounds(
            self.start,
            self.end,
            self.plate.as_deref().unwrap_or(ALL),
            self.fuel_type.as_deref().unwrap_or(ALL),
        )
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadParams {
    /// Original file name, reported back in the overview
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "upload.xlsx".to_string()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        upload_workbook,
        get_workbook,
        get_filters,
        get_dashboard,
        get_records,
        get_consumption
    ),
    components(schemas(
        HealthResponse,
        ErrorResponse,
        DatasetOverview,
        SheetStats,
        FilterOptions,
        DashboardView,
        SummaryMetrics,
        SourceTotals,
        SourceView,
        MonthlyChart,
        MonthlyPoint,
        CategoryChart,
        CategoryPoint,
        ConsumptionRanking,
        ConsumptionEstimate,
        ConsumptionReport,
        RecordTable,
        RefuelingRecord,
        Source
    )),
    tags((name = "fuel-dashboard", description = "Fuel consumption dashboard"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    let api_routes = Router::new()
        .route("/health", get(health))
        .route(
            "/workbook",
            get(get_workbook)
                .post(upload_workbook)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/filters", get(get_filters))
        .route("/dashboard", get(get_dashboard))
        .route("/records/{source}", get(get_records))
        .route("/consumption", get(get_consumption))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "fuel-dashboard",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/workbook",
    tag = "fuel-dashboard",
    params(UploadParams),
    request_body(content = Vec<u8>, description = "Spreadsheet file contents", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Workbook loaded", body = DatasetOverview),
        (status = 413, description = "Upload too large"),
        (status = 422, description = "Unreadable workbook or missing sheets", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(file_name = %params.file_name, size = body.len()))]
async fn upload_workbook(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<DatasetOverview>, ApiError> {
    if body.is_empty() {
        warn!("Rejected empty upload");
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "empty upload: send the spreadsheet file as the request body",
        ));
    }

    let overview = state
        .dashboard_service
        .load_workbook_bytes(params.file_name.clone(), body.to_vec())
        .await
        .map_err(|e| {
            warn!("Rejected workbook {}: {}", params.file_name, e);
            ApiError::from(e)
        })?;

    info!(
        "Workbook {} loaded: {} internal, {} external records",
        overview.file_name, overview.internal.rows_kept, overview.external.rows_kept
    );
    Ok(Json(overview))
}

#[utoipa::path(
    get,
    path = "/api/v1/workbook",
    tag = "fuel-dashboard",
    responses(
        (status = 200, description = "Current workbook", body = DatasetOverview),
        (status = 404, description = "No workbook loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_workbook(State(state): State<AppState>) -> Result<Json<DatasetOverview>, ApiError> {
    let overview = state.dashboard_service.overview().await.map_err(|e| {
        warn!("Workbook overview unavailable: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(overview))
}

#[utoipa::path(
    get,
    path = "/api/v1/filters",
    tag = "fuel-dashboard",
    responses(
        (status = 200, description = "Selectable plates, fuel types and date bounds", body = FilterOptions),
        (status = 404, description = "No workbook loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_filters(State(state): State<AppState>) -> Result<Json<FilterOptions>, ApiError> {
    let options = state.dashboard_service.filter_options().await.map_err(|e| {
        warn!("Filter options unavailable: {}", e);
        ApiError::from(e)
    })?;
    debug!(
        "Filter options: {} plates, {} fuel types",
        options.plates.len(),
        options.fuel_types.len()
    );
    Ok(Json(options))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "fuel-dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Metrics, charts and consumption rankings", body = DashboardView),
        (status = 404, description = "No workbook loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let view = state
        .dashboard_service
        .dashboard(&query.criteria())
        .await
        .map_err(|e| {
            warn!("Dashboard unavailable: {}", e);
            ApiError::from(e)
        })?;

    info!(
        "Dashboard built: {:.2} l internal, {:.2} l external",
        view.metrics.internal.total_liters, view.metrics.external.total_liters
    );
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/records/{source}",
    tag = "fuel-dashboard",
    params(
        ("source" = String, Path, description = "internal or external"),
        DashboardQuery
    ),
    responses(
        (status = 200, description = "Filtered records", body = RecordTable),
        (status = 400, description = "Unknown source", body = ErrorResponse),
        (status = 404, description = "No workbook loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_records(
    State(state): State<AppState>,
    Path(source): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<RecordTable>, ApiError> {
    let source: Source = source.parse().map_err(|e: String| {
        warn!("{}", e);
        api_error(StatusCode::BAD_REQUEST, e)
    })?;

    let table = state
        .dashboard_service
        .records(source, &query.criteria())
        .await
        .map_err(|e| {
            warn!("Records unavailable: {}", e);
            ApiError::from(e)
        })?;

    info!("Returning {} {} records", table.total, source);
    Ok(Json(table))
}

#[utoipa::path(
    get,
    path = "/api/v1/consumption",
    tag = "fuel-dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Average km/l per vehicle and fuel type", body = ConsumptionReport),
        (status = 404, description = "No workbook loaded", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
async fn get_consumption(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ConsumptionReport>, ApiError> {
    let report = state
        .dashboard_service
        .consumption(&query.criteria())
        .await
        .map_err(|e| {
            error!("Consumption report failed: {}", e);
            ApiError::from(e)
        })?;
    Ok(Json(report))
}
