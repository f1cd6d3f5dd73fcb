// 🌐 REST API - calculator and finder over HTTP (axum)
// Every response is wrapped as { success, data, error? }

use crate::conversion::convert_grade_to_points;
use crate::courses::CourseEntry;
use crate::gpa::{compute_gpa, format_gpa};
use crate::grading::{GradeSystemEntry, ScaleRow};
use crate::service::GradingService;
use crate::source::GradeTableSource;
use crate::universities::{universities, KindFilter, University, UniversityFilter};
use crate::validation::{validate_course, CourseErrors};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
pub struct AppState<S> {
    pub service: Arc<GradingService<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            service: self.service.clone(),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::error(message))).into_response()
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemResponse {
    pub country: String,
    pub modes: Vec<String>,
    pub entries: Vec<GradeSystemEntry>,
    pub scale: Vec<ScaleRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GpaRequest {
    pub country: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseResult {
    pub id: String,
    pub points: Option<f64>,
    pub errors: CourseErrors,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GpaResponse {
    pub gpa: Option<f64>,
    pub formatted: String,
    pub courses: Vec<CourseResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UniversityQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub max_tuition: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/countries - Sorted country names
async fn get_countries<S: GradeTableSource + 'static>(State(state): State<AppState<S>>) -> Response {
    match state.service.countries().await {
        Ok(countries) => (StatusCode::OK, Json(ApiResponse::ok(countries.as_ref().clone()))).into_response(),
        Err(e) => failure(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}

/// GET /api/systems/:country - Grading table, modes and display scale
async fn get_system<S: GradeTableSource + 'static>(
    State(state): State<AppState<S>>,
    Path(country): Path<String>,
) -> Response {
    let catalog = match state.service.grading_systems().await {
        Ok(catalog) => catalog,
        Err(e) => return failure(StatusCode::BAD_GATEWAY, e.to_string()),
    };

    match catalog.table(&country) {
        Some(table) => {
            let response = SystemResponse {
                country: country.clone(),
                modes: table.modes(),
                entries: table.entries().to_vec(),
                scale: table.scale(),
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        None => failure(StatusCode::NOT_FOUND, format!("unknown country: {}", country)),
    }
}

/// POST /api/gpa - Validate rows and compute the cumulative GPA
async fn post_gpa<S: GradeTableSource + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<GpaRequest>,
) -> Response {
    let catalog = match state.service.grading_systems().await {
        Ok(catalog) => catalog,
        Err(e) => return failure(StatusCode::BAD_GATEWAY, e.to_string()),
    };

    let table = catalog
        .table(&request.country)
        .map(|t| t.for_mode(&request.mode))
        .unwrap_or_default();

    let courses = request
        .courses
        .iter()
        .map(|c| CourseResult {
            id: c.id.clone(),
            points: convert_grade_to_points(&c.grade, table.entries()),
            errors: validate_course(c, table.entries()),
        })
        .collect();

    let gpa = compute_gpa(&request.courses, table.entries());
    let response = GpaResponse {
        gpa,
        formatted: format_gpa(gpa),
        courses,
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/universities - Static listing, filtered
async fn get_universities(Query(query): Query<UniversityQuery>) -> Response {
    let kind = match KindFilter::parse(&query.kind) {
        Some(kind) => kind,
        None => return failure(StatusCode::BAD_REQUEST, format!("unknown kind: {}", query.kind)),
    };

    let filter = UniversityFilter {
        search: query.search,
        kind,
        max_tuition: query.max_tuition.trim().parse().ok(),
    };

    let list = universities();
    let found: Vec<University> = filter.apply(&list).into_iter().cloned().collect();
    (StatusCode::OK, Json(ApiResponse::ok(found))).into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn router<S: GradeTableSource + 'static>(service: Arc<GradingService<S>>) -> Router {
    let state = AppState { service };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/countries", get(get_countries::<S>))
        .route("/systems/:country", get(get_system::<S>))
        .route("/gpa", post(post_gpa::<S>))
        .route("/universities", get(get_universities))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use crate::validation::ErrorKind;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn app() -> Router {
        let rows = vec![
            GradeSystemEntry::new("United States", "Percent", "A", 90.0, 100.0, 4.0),
            GradeSystemEntry::new("United States", "Percent", "B", 80.0, 89.99, 3.0),
            GradeSystemEntry::new("United States", "Letter", "A", 4.0, 4.0, 4.0),
            GradeSystemEntry::new("France", "Twenty", "TB", 16.0, 20.0, 4.0),
        ];
        router(Arc::new(GradingService::new(StaticSource::new(rows))))
    }

    async fn call<T: DeserializeOwned>(app: Router, request: Request<Body>) -> (StatusCode, ApiResponse<T>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call::<String>(app(), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.data, "OK");
    }

    #[tokio::test]
    async fn test_countries() {
        let (status, body) = call::<Vec<String>>(app(), get_request("/api/countries")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data, vec!["France", "United States"]);
    }

    #[tokio::test]
    async fn test_system_with_encoded_name() {
        let (status, body) = call::<SystemResponse>(app(), get_request("/api/systems/United%20States")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.modes, vec!["Percent", "Letter"]);
        assert_eq!(body.data.entries.len(), 3);
        assert_eq!(body.data.scale[0].points, 4.0);
    }

    #[tokio::test]
    async fn test_unknown_system_is_404() {
        let (status, body) = call::<()>(app(), get_request("/api/systems/Narnia")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert!(body.error.unwrap().contains("Narnia"));
    }

    #[tokio::test]
    async fn test_gpa_endpoint() {
        let request = post_json(
            "/api/gpa",
            serde_json::json!({
                "country": "United States",
                "mode": "Percent",
                "courses": [
                    {"id": "1", "course": "Math", "credits": "3", "grade": "95"},
                    {"id": "2", "course": "Art", "credits": "4", "grade": "B"}
                ]
            }),
        );

        let (status, body) = call::<GpaResponse>(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.data.formatted, "3.43");
        assert_eq!(body.data.courses[0].points, Some(4.0));
        assert!(body.data.courses.iter().all(|c| c.errors.is_ok()));
    }

    #[tokio::test]
    async fn test_gpa_endpoint_reports_row_errors() {
        let request = post_json(
            "/api/gpa",
            serde_json::json!({
                "country": "United States",
                "courses": [{"credits": "-1", "grade": "Z"}]
            }),
        );

        let (_, body) = call::<GpaResponse>(app(), request).await;
        assert_eq!(body.data.gpa, None);
        assert_eq!(body.data.formatted, "0.00");
        assert_eq!(body.data.courses[0].errors.credits, Some(ErrorKind::NonPositive));
        assert_eq!(body.data.courses[0].errors.grade, Some(ErrorKind::Unrecognized));
    }

    #[tokio::test]
    async fn test_gpa_body_shape() {
        let request = post_json(
            "/api/gpa",
            serde_json::json!({
                "country": "United States",
                "mode": "Percent",
                "courses": [{"id": "row1", "credits": "3", "grade": "95%"}]
            }),
        );

        let (_, body) = call::<serde_json::Value>(app(), request).await;
        assert_eq!(body.data["formatted"], "4.00");
        assert_eq!(body.data["courses"][0]["id"], "row1");
        assert_eq!(body.data["courses"][0]["points"], 4.0);
        assert!(body.data["courses"][0]["errors"]["credits"].is_null());
        assert!(body.data["courses"][0]["errors"]["grade"].is_null());
    }

    #[tokio::test]
    async fn test_universities_filters() {
        let (_, body) = call::<Vec<University>>(app(), get_request("/api/universities?search=cambridge&max_tuition=55000")).await;
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].name, "Harvard University");

        let (status, _) = call::<()>(app(), get_request("/api/universities?kind=state")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
