//! # API REST
//!
//! REST API implementation for HPR.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, status codes, CORS)
//!
//! Uses `api-shared` for wire types and `hpr-core` for data operations.

#![warn(rust_2018_idioms)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    CreatePatientReq, CreatePatientRes, DeletePatientRes, ErrorRes, GetPatientRes, HealthRes,
    HealthService, ListBucketsRes, ListPatientsRes, PatientRes,
};
use hpr_core::{PatientError, PatientInput, PatientResult, PatientService};

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorRes>);

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        get_patient,
        create_patient,
        delete_patient,
        list_buckets,
    ),
    components(schemas(
        HealthRes,
        PatientRes,
        ListPatientsRes,
        GetPatientRes,
        CreatePatientReq,
        CreatePatientRes,
        DeletePatientRes,
        ListBucketsRes,
        api_shared::BucketRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router.
///
/// Routes live under `/api`; the OpenAPI document is served at `/api-docs/openapi.json` and
/// Swagger UI at `/swagger-ui`. CORS is permissive because the browser front-end is served from
/// a different origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/patients", get(list_patients).post(create_patient))
        .route("/api/patients/:pid", get(get_patient).delete(delete_patient))
        .route("/api/buckets", get(list_buckets))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error to its HTTP status and error body.
///
/// Client errors are logged at `warn`, everything else at `error` with the internal detail kept
/// out of the response.
pub fn api_error(e: PatientError) -> ApiError {
    let status = match &e {
        PatientError::Validation(_) => StatusCode::BAD_REQUEST,
        PatientError::DuplicateKey { .. } => StatusCode::CONFLICT,
        PatientError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Patient store error: {:?}", e);
        return (status, Json(ErrorRes::new("Internal error")));
    }

    tracing::warn!("Rejected request: {}", e);
    (status, Json(ErrorRes::new(e.to_string())))
}

/// Runs a store mutation on the blocking pool.
///
/// Mutations hold the store's write lock while the snapshot file is written, which must not
/// stall an async worker.
async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> PatientResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result.map_err(api_error),
        Err(e) => {
            tracing::error!("Patient store task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorRes::new("Internal error")),
            ))
        }
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorRes::new(message)))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Patient store is healthy", body = HealthRes),
        (status = 503, description = "Patient store is unavailable", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthRes>) {
    let res = HealthService::check_health(&state.patient_service);
    let status = if res.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(res))
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "All patients, bucket 0 to 9 then insertion order", body = ListPatientsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all patients in the system
///
/// # Errors
/// Returns `500 Internal Server Error` if the store is unavailable.
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Result<Json<ListPatientsRes>, ApiError> {
    let patients = state.patient_service.list_patients().map_err(api_error)?;
    Ok(Json(ListPatientsRes::new(&patients)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{pid}",
    params(("pid" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient found", body = GetPatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
/// Fetch one patient by ID
///
/// # Errors
/// Returns `404 Not Found` if no patient has this ID.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<GetPatientRes>, ApiError> {
    let patient = state.patient_service.get_patient(&pid).map_err(api_error)?;
    Ok(Json(GetPatientRes {
        success: true,
        data: PatientRes::from(&patient),
    }))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = CreatePatientRes),
        (status = 400, description = "Missing or invalid field", body = ErrorRes),
        (status = 409, description = "Patient ID already exists", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a new patient record
///
/// All six fields are required. `age` may be a number or a numeric string and must be between
/// 1 and 150. The response includes the computed `hash_index`. The body is read as JSON whatever
/// its `Content-Type`.
///
/// # Errors
/// Returns:
/// - `400 Bad Request` if the body is empty, malformed, or fails validation
/// - `409 Conflict` if the patient ID is already stored
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatePatientRes>), ApiError> {
    let req = match CreatePatientReq::from_json_body(&body) {
        Ok(Some(req)) => req,
        Ok(None) => {
            tracing::warn!("Rejected request: empty patient body");
            return Err(bad_request("No data provided"));
        }
        Err(e) => {
            tracing::warn!("Rejected request body: {}", e);
            return Err(bad_request(format!("Invalid request body: {e}")));
        }
    };

    let service = state.patient_service.clone();
    let input = PatientInput::from(req);
    let patient = run_blocking(move || service.add_patient(&input)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePatientRes {
            success: true,
            message: "Patient added successfully".into(),
            data: PatientRes::from(&patient),
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{pid}",
    params(("pid" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = DeletePatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Delete a patient by ID
///
/// # Errors
/// Returns `404 Not Found` if no patient has this ID.
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<DeletePatientRes>, ApiError> {
    let service = state.patient_service.clone();
    run_blocking(move || service.delete_patient(&pid)).await?;
    Ok(Json(DeletePatientRes {
        success: true,
        message: "Patient deleted successfully".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/buckets",
    responses(
        (status = 200, description = "Occupancy of all ten hash buckets", body = ListBucketsRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Show how patients are spread across hash buckets
#[axum::debug_handler]
async fn list_buckets(State(state): State<AppState>) -> Result<Json<ListBucketsRes>, ApiError> {
    let buckets = state.patient_service.bucket_summary().map_err(api_error)?;
    Ok(Json(ListBucketsRes {
        success: true,
        data: buckets.into_iter().map(Into::into).collect(),
    }))
}
