use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::errors::{AppError, PDF_FAILURE, SOURCE_FAILURE};
use crate::models::deedy::RawDeedyResume;
use crate::models::resume::RawResume;
use crate::render::deedy::render_deedy_source;
use crate::render::render_source;
use crate::state::AppState;

/// POST /api/generate-pdf
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let raw: RawResume = parse_payload(payload)?;
    let source = render_source(raw).map_err(|e| AppError::internal(PDF_FAILURE, e))?;
    let pdf = state.compiler.compile(&source).await?;
    Ok(pdf_response(pdf, "inline; filename=\"resume.pdf\""))
}

/// POST /api/generate-deedy-pdf
/// Two-column CV compiled with xelatex; 503 when the class file is not configured.
pub async fn handle_generate_deedy_pdf(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let compiler = state.deedy_compiler.clone().ok_or_else(|| {
        AppError::Unavailable("Deedy resume style is not configured".to_string())
    })?;
    let raw: RawDeedyResume = parse_payload(payload)?;
    let source = render_deedy_source(raw).map_err(|e| AppError::internal(PDF_FAILURE, e))?;
    let pdf = compiler.compile(&source).await?;
    Ok(pdf_response(pdf, "attachment; filename=\"deedy-resume.pdf\""))
}

/// POST /api/generate-resume
/// Same pipeline, stopping before compilation; returns the LaTeX source.
pub async fn handle_generate_source(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let raw: RawResume = parse_payload(payload)?;
    let source = render_source(raw).map_err(|e| AppError::internal(SOURCE_FAILURE, e))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/x-latex"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"resume.tex\""),
        ],
        source,
    )
        .into_response())
}

/// GET /api/generate-resume
pub async fn handle_generate_source_info() -> Json<Value> {
    Json(json!({
        "message": "This endpoint requires a POST request with resume data"
    }))
}

fn parse_payload<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::Validation("Invalid JSON payload".to_string())
    })?;
    if !value.is_object() {
        return Err(AppError::Validation(
            "Invalid resume data format".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid resume data format: {e}")))
}

fn pdf_response(pdf: Bytes, disposition: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "no-store"),
            (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        ],
        pdf,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::compile::{CompileError, DocumentCompiler};
    use crate::routes::build_router;

    /// Records the source it receives and answers with a canned outcome.
    struct StubCompiler {
        seen: Mutex<Vec<String>>,
        outcome: fn() -> Result<Bytes, CompileError>,
    }

    #[async_trait]
    impl DocumentCompiler for StubCompiler {
        async fn compile(&self, source: &str) -> Result<Bytes, CompileError> {
            self.seen.lock().unwrap().push(source.to_string());
            (self.outcome)()
        }
    }

    struct PanickingCompiler;

    #[async_trait]
    impl DocumentCompiler for PanickingCompiler {
        async fn compile(&self, _source: &str) -> Result<Bytes, CompileError> {
            panic!("engine wrapper bug");
        }
    }

    fn fake_pdf() -> Result<Bytes, CompileError> {
        Ok(Bytes::from_static(b"%PDF-1.4 stub"))
    }

    fn failing_compile() -> Result<Bytes, CompileError> {
        Err(CompileError::Failed {
            pass: 1,
            status: "exit status: 1".to_string(),
            log: Some("! Undefined control sequence.".to_string()),
        })
    }

    fn app_with(compiler: Arc<dyn DocumentCompiler>) -> Router {
        build_router(AppState {
            compiler,
            deedy_compiler: None,
        })
    }

    fn stub(outcome: fn() -> Result<Bytes, CompileError>) -> Arc<StubCompiler> {
        Arc::new(StubCompiler {
            seen: Mutex::new(Vec::new()),
            outcome,
        })
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_pdf_returns_pdf_with_headers() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());
        let body = json!({
            "personalInfo": { "name": "Ada Lovelace", "email": "ada@example.com" },
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "location": "Remote",
                "date": "2021 -- 2024",
                "highlights": ["Built the billing service", "  ", "Cut costs by 30%"]
            }],
            "education": [],
            "projects": [],
            "technicalSkills": { "languages": "Rust" }
        });

        let response = app
            .oneshot(post("/api/generate-pdf", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "inline; filename=\"resume.pdf\""
        );
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let seen = compiler.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let source = &seen[0];
        assert!(source.contains(r"\section{Experience}"));
        assert!(!source.contains(r"\section{Education}"));
        assert_eq!(source.matches(r"\resumeItem{").count(), 2);
        assert!(source.contains(r"Cut costs by 30\%"));
    }

    #[tokio::test]
    async fn test_generate_pdf_derives_profile_handles() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());
        let body = json!({
            "personalInfo": { "name": "Alice", "githubUrl": "https://www.github.com/alice/" }
        });

        let response = app
            .oneshot(post("/api/generate-pdf", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let seen = compiler.seen.lock().unwrap();
        assert!(seen[0].contains(r"\underline{ alice }"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());

        let response = app
            .oneshot(post("/api/generate-pdf", "{ not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid JSON payload");
        assert!(compiler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_payload_is_rejected() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());

        let response = app
            .oneshot(post("/api/generate-pdf", "[1, 2, 3]"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid resume data format");
        assert!(compiler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compile_failure_returns_details() {
        let app = app_with(stub(failing_compile));

        let response = app
            .oneshot(post("/api/generate-pdf", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], PDF_FAILURE);
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("Undefined control sequence"));
    }

    #[tokio::test]
    async fn test_internal_failure_hides_detail() {
        fn disk_full() -> Result<Bytes, CompileError> {
            Err(CompileError::Io(std::io::Error::other("disk full")))
        }
        let app = app_with(stub(disk_full));

        let response = app
            .oneshot(post("/api/generate-pdf", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "error": PDF_FAILURE }));
    }

    #[tokio::test]
    async fn test_panic_in_compiler_becomes_500() {
        let app = app_with(Arc::new(PanickingCompiler));

        let response = app
            .oneshot(post("/api/generate-pdf", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_generate_source_returns_latex_attachment() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());
        let body = json!({ "personalInfo": { "name": "R&D" } });

        let response = app
            .oneshot(post("/api/generate-resume", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/x-latex");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.tex\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let source = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(source.contains(r"R\&D"));
        assert!(compiler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_source_get_explains_usage() {
        let app = app_with(stub(fake_pdf));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/generate-resume")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("POST"));
    }

    #[tokio::test]
    async fn test_deedy_pdf_is_an_attachment() {
        let compiler = stub(fake_pdf);
        let app = build_router(AppState {
            compiler: stub(failing_compile),
            deedy_compiler: Some(compiler.clone() as Arc<dyn DocumentCompiler>),
        });
        let body = json!({
            "personalInfo": { "firstName": "Debarghya", "lastName": "Das" },
            "skills": { "overFiveThousand": ["Java", "C++"] }
        });

        let response = app
            .oneshot(post("/api/generate-deedy-pdf", &body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"deedy-resume.pdf\""
        );
        let seen = compiler.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains(r"\documentclass[]{deedy-resume-openfont}"));
        assert!(seen[0].contains(r"Java \textbullet{}"));
    }

    #[tokio::test]
    async fn test_deedy_without_class_file_is_unavailable() {
        let compiler = stub(fake_pdf);
        let app = app_with(compiler.clone());

        let response = app
            .oneshot(post("/api/generate-deedy-pdf", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("not configured"));
        assert!(compiler.seen.lock().unwrap().is_empty());
    }
}
