//! # API REST
//!
//! REST API implementation for the export service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, CORS, mapping export errors to status codes)
//!
//! Uses `api-shared` for wire messages and `export-core` for the export itself.

#![warn(rust_2018_idioms)]

use api_shared::{
    ErrorRes, ExportReq, FormatInfo, FormatsRes, HealthRes, HealthService, PlanRes,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use export_core::{ExportError, ExportOptions, ExportService};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub export_service: ExportService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_formats, plan_export, export),
    components(schemas(ExportReq, PlanRes, FormatsRes, FormatInfo, HealthRes, ErrorRes))
)]
pub struct ApiDoc;

/// Errors returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Export(ExportError::InvalidInput(_) | ExportError::InvalidExtension(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Export(ExportError::NodeNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Export(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Export(e) => e.code(),
            ApiError::Task(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // I/O and codec failures are logged in full but not echoed to the client.
        let message = if code == "internal" {
            tracing::error!("Export error: {:?}", self);
            "Internal error".to_string()
        } else {
            tracing::warn!("Export request rejected: {}", self);
            self.to_string()
        };

        (
            status,
            Json(ErrorRes {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Builds the REST router with all export routes and the Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/export", post(export))
        .route("/export/plan", post(plan_export))
        .route("/export/formats", get(list_formats))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST API until the server stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Export REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/export/formats",
    responses(
        (status = 200, description = "Formats this server can export", body = FormatsRes)
    )
)]
/// Lists the export formats that are enabled and supported by the running engine.
#[axum::debug_handler]
async fn list_formats(State(state): State<AppState>) -> Json<FormatsRes> {
    let formats = state
        .export_service
        .supported_extensions()
        .into_iter()
        .map(FormatInfo::from)
        .collect();
    Json(FormatsRes { formats })
}

#[utoipa::path(
    post,
    path = "/export/plan",
    request_body = ExportReq,
    responses(
        (status = 200, description = "Resolved export plan", body = PlanRes),
        (status = 400, description = "Invalid request", body = ErrorRes)
    )
)]
/// Validates an export request without rendering it.
///
/// Returns the file name, content type and width the export would use.
///
/// # Errors
/// Returns `400 Bad Request` if the node id is missing or any field is invalid.
#[axum::debug_handler]
async fn plan_export(
    State(state): State<AppState>,
    Json(req): Json<ExportReq>,
) -> Result<Json<PlanRes>, ApiError> {
    let options = ExportOptions::from(req);
    let plan = state.export_service.plan(&options)?;
    Ok(Json(PlanRes::from(&plan)))
}

#[utoipa::path(
    post,
    path = "/export",
    request_body = ExportReq,
    responses(
        (status = 200, description = "Rendered file; Content-Type follows the requested format"),
        (status = 400, description = "Invalid request or unsupported extension", body = ErrorRes),
        (status = 404, description = "Node not found", body = ErrorRes),
        (status = 500, description = "Rendering failed", body = ErrorRes)
    )
)]
/// Exports a node and returns the rendered file as an attachment.
///
/// Rendering runs on the blocking thread pool since engines read node files synchronously.
///
/// # Errors
/// - `400 Bad Request` for invalid fields or an unavailable `exportExt`
/// - `404 Not Found` if `nodeId` does not resolve
/// - `500 Internal Server Error` if rendering fails
#[axum::debug_handler]
async fn export(
    State(state): State<AppState>,
    Json(req): Json<ExportReq>,
) -> Result<Response, ApiError> {
    let options = ExportOptions::from(req);
    let service = state.export_service.clone();
    let file = tokio::task::spawn_blocking(move || service.export(&options)).await??;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use export_core::{
        CoreConfig, DocumentEngine, ExportEngine, ExportExtension, ExportPlan, ExportResult,
        MemoryNodeStore, Node,
    };
    use http_body_util::BodyExt;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store: MemoryNodeStore = [
            Node::new("root", "# Root\nHello").with_children(["child"]),
            Node::new("child", "# Child"),
        ]
        .into_iter()
        .collect();
        let cfg = Arc::new(CoreConfig::with_defaults(PathBuf::from("unused")));
        let export_service = ExportService::new(cfg, Arc::new(DocumentEngine::new(store)));
        router(AppState { export_service })
    }

    /// Engine that accepts markdown plans and fails every render with the given error.
    struct FailingEngine(fn() -> ExportError);

    impl ExportEngine for FailingEngine {
        fn supported_extensions(&self) -> &[ExportExtension] {
            &[ExportExtension::Md]
        }

        fn render(&self, _plan: &ExportPlan) -> ExportResult<Vec<u8>> {
            Err((self.0)())
        }
    }

    fn failing_app(error: fn() -> ExportError) -> Router {
        let cfg = Arc::new(CoreConfig::with_defaults(PathBuf::from("unused")));
        let export_service = ExportService::new(cfg, Arc::new(FailingEngine(error)));
        router(AppState { export_service })
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let res: HealthRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert!(res.ok);
    }

    #[tokio::test]
    async fn test_export_markdown_with_headers() {
        let response = test_app()
            .oneshot(post_json(
                "/export",
                r#"{"nodeId":"root","exportExt":"md","fileName":"book","dividerLine":true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/markdown"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"book.md\""
        );
        let body = String::from_utf8(body_bytes(response).await).unwrap();
        assert_eq!(body, "# Root\nHello\n\n---\n\n# Child\n");
    }

    #[tokio::test]
    async fn test_export_unknown_node_is_404() {
        let response = test_app()
            .oneshot(post_json("/export", r#"{"nodeId":"ghost","exportExt":"md"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let err: ErrorRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(err.error, "node_not_found");
    }

    #[tokio::test]
    async fn test_export_unknown_extension_is_400() {
        let response = test_app()
            .oneshot(post_json("/export", r#"{"nodeId":"root","exportExt":"docx"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: ErrorRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(err.error, "invalid_extension");
    }

    #[tokio::test]
    async fn test_export_missing_node_id_is_400() {
        let response = test_app()
            .oneshot(post_json("/export", r#"{"exportExt":"md"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err: ErrorRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(err.error, "invalid_input");
    }

    #[tokio::test]
    async fn test_render_error_is_500_with_message() {
        let response = failing_app(|| ExportError::RenderError("template missing".into()))
            .oneshot(post_json("/export", r#"{"nodeId":"root","exportExt":"md"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ErrorRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(err.error, "render_error");
        assert!(err.message.contains("template missing"));
    }

    #[tokio::test]
    async fn test_internal_error_is_500_and_sanitised() {
        let response = failing_app(|| {
            ExportError::FileRead(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "/srv/nodes/root.yaml: permission denied",
            ))
        })
        .oneshot(post_json("/export", r#"{"nodeId":"root","exportExt":"md"}"#))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ErrorRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(err.error, "internal");
        assert_eq!(err.message, "Internal error");
    }

    #[tokio::test]
    async fn test_export_accepts_null_string_fields() {
        let response = test_app()
            .oneshot(post_json(
                "/export",
                r#"{"nodeId":"root","exportExt":"md","fileName":null,"contentType":null,"contentWidth":null}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"root.md\""
        );
    }

    #[tokio::test]
    async fn test_plan_endpoint() {
        let response = test_app()
            .oneshot(post_json(
                "/export/plan",
                r#"{"nodeId":"root","exportExt":"HTML","contentWidth":"42em"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let plan: PlanRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(plan.node_id, "root");
        assert_eq!(plan.export_ext, "html");
        assert_eq!(plan.file_name, "root.html");
        assert_eq!(plan.content_type, "text/html");
        assert_eq!(plan.content_width, "42em");
    }

    #[tokio::test]
    async fn test_formats_endpoint() {
        let response = test_app()
            .oneshot(Request::get("/export/formats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let res: FormatsRes = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let exts: Vec<&str> = res.formats.iter().map(|f| f.ext.as_str()).collect();
        assert_eq!(exts, vec!["md", "html", "json"]);
    }

    #[test]
    fn test_openapi_document_lists_export_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/export"));
        assert!(doc.paths.paths.contains_key("/export/plan"));
    }
}
