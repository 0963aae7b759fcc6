//! JSON HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/profile` | Current profile |
//! | `PUT`  | `/profile` | Replace the profile |
//! | `POST` | `/profile/reset` | Restore the built-in default profile |
//! | `POST` | `/extract` | Skill extraction and alignment, no model calls |
//! | `POST` | `/generate` | Full pipeline: four drafts plus alignment metadata |
//! | `POST` | `/ask` | Free-form question over the indexed documents |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "profile_not_configured", "message": "no profile configured: ..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `timeout` (408),
//! `profile_not_configured` (409), `internal` (500).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use job_copilot_core::models::Profile;

use crate::config::Config;
use crate::error::PipelineError;
use crate::generate::{Analysis, Answer, ApplicationPackage, Copilot};

#[derive(Clone)]
struct AppState {
    copilot: Arc<Copilot>,
}

/// Build the router around an existing [`Copilot`].
pub fn router(copilot: Arc<Copilot>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/profile", get(handle_get_profile).put(handle_put_profile))
        .route("/profile/reset", post(handle_reset_profile))
        .route("/extract", post(handle_extract))
        .route("/generate", post(handle_generate))
        .route("/ask", post(handle_ask))
        .layer(cors)
        .with_state(AppState { copilot })
}

/// Bind `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let copilot = Arc::new(Copilot::from_config(config).await?);
    let app = router(copilot);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "server listening");
    println!("Listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        let status = match &err {
            PipelineError::ProfileNotConfigured { .. } => StatusCode::CONFLICT,
            PipelineError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            PipelineError::Collaborator(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = err.code();
        if status.is_server_error() {
            error!(error = %message, "request failed");
        }
        AppError {
            status,
            code,
            message,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Collaborator(err).into()
    }
}

fn require_text(jd_text: &str) -> Result<(), AppError> {
    if jd_text.trim().is_empty() {
        return Err(bad_request("jd_text must not be empty"));
    }
    Ok(())
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    let profiles = state.copilot.profiles();
    let profile = profiles
        .load()?
        .ok_or_else(|| PipelineError::ProfileNotConfigured {
            path: profiles.path().to_path_buf(),
        })?;
    Ok(Json(profile))
}

async fn handle_put_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    state.copilot.profiles().save(&profile)?;
    Ok(Json(profile))
}

async fn handle_reset_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.copilot.profiles().reset()?))
}

#[derive(Deserialize)]
struct ExtractRequest {
    jd_text: String,
}

async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Analysis>, AppError> {
    require_text(&req.jd_text)?;
    Ok(Json(state.copilot.analyze(&req.jd_text)?))
}

#[derive(Deserialize)]
struct GenerateRequest {
    jd_text: String,
    #[serde(default)]
    persist: bool,
}

async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<ApplicationPackage>, AppError> {
    require_text(&req.jd_text)?;
    Ok(Json(state.copilot.run(&req.jd_text, req.persist).await?))
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<Answer>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }
    Ok(Json(state.copilot.ask(&req.question).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use job_copilot_core::llm::PromptExecutor;
    use job_copilot_core::store::memory::InMemoryStore;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Canned;

    #[async_trait]
    impl PromptExecutor for Canned {
        fn name(&self) -> String {
            "canned".to_string()
        }

        async fn invoke(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            Ok("draft".to_string())
        }
    }

    /// Fails with an upstream message that mentions a timeout.
    struct Slow;

    #[async_trait]
    impl PromptExecutor for Slow {
        fn name(&self) -> String {
            "slow".to_string()
        }

        async fn invoke(&self, system: &str, _user: &str) -> anyhow::Result<String> {
            if system.contains("helpful assistant") {
                anyhow::bail!("upstream gateway timed out");
            }
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn app_with(tmp: &TempDir, executor: Arc<dyn PromptExecutor>) -> Router {
        let mut config = Config::default();
        config.data.base_dir = tmp.path().to_path_buf();
        let copilot = Copilot::new(&config, Arc::new(InMemoryStore::new()), None, executor)
            .with_call_timeout(std::time::Duration::from_millis(20));
        router(Arc::new(copilot))
    }

    fn app(tmp: &TempDir) -> Router {
        app_with(tmp, Arc::new(Canned))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = TempDir::new().unwrap();
        let (status, body) = send(&app(&tmp), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_without_profile_is_conflict() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = send(&app, "POST", "/generate", Some(json!({ "jd_text": "Python" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "profile_not_configured");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("profile_settings.json"));

        let (status, _) = send(&app, "GET", "/profile", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_profile_roundtrip_and_generate() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let profile = json!({ "name": "Ada", "skills": ["Python", "Teamwork"] });
        let (status, body) = send(&app, "PUT", "/profile", Some(profile)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["email"], "");

        let (_, body) = send(&app, "GET", "/profile", None).await;
        assert_eq!(body["skills"], json!(["Python", "Teamwork"]));

        let (status, body) = send(
            &app,
            "POST",
            "/generate",
            Some(json!({ "jd_text": "Python and Docker required." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cover"], "draft");
        assert_eq!(body["have_hard"], json!(["Python"]));
        assert_eq!(body["files"], json!([]));
    }

    #[tokio::test]
    async fn test_extract_and_validation() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);

        let (status, body) = send(&app, "POST", "/extract", Some(json!({ "jd_text": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");

        let (status, body) = send(
            &app,
            "POST",
            "/extract",
            Some(json!({ "jd_text": "Strong Communication and Python skills." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["alignment"].is_null());
        assert!(body["extraction"]["soft"]
            .as_array()
            .unwrap()
            .contains(&json!("Communication")));
    }

    #[tokio::test]
    async fn test_reset_profile() {
        let tmp = TempDir::new().unwrap();
        let app = app(&tmp);
        let (status, body) = send(&app, "POST", "/profile/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Your Name");
        assert!(tmp
            .path()
            .join("job_rag")
            .join("profile_settings.json")
            .exists());
    }

    #[tokio::test]
    async fn test_timeouts_map_by_kind_not_message() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Arc::new(Slow));
        send(&app, "POST", "/profile/reset", None).await;

        let (status, body) = send(&app, "POST", "/generate", Some(json!({ "jd_text": "Python" }))).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"]["code"], "timeout");

        let (status, body) = send(&app, "POST", "/ask", Some(json!({ "question": "Why?" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal");
        assert_eq!(body["error"]["message"], "upstream gateway timed out");
    }
}
