//! Lock-In HTTP API.
//!
//! Four JSON POST endpoints mirroring the client contract: `answer`,
//! `define`, `evaluate`, `guard`. Handlers are thin pass-throughs to the
//! core library; collaborator failures degrade to local fallbacks inside the
//! core, so a well-formed request always gets a 200 with a usable body.
//!
//! No authentication and no rate limiting -- deliberate non-goals here;
//! production deployments should add both in front of this service.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use lockin_core::guard::{EvaluationInput, ExitEvaluation, ExitGuard};
use lockin_core::roast::{RoastContext, RoastGenerator};
use lockin_core::{Config, LlmClient, PdfContext, SessionContext, StudyAssistant};

#[derive(Parser, Debug)]
#[command(name = "lockin-server", version)]
struct Args {
    /// Listen address, e.g. 127.0.0.1:8642. Defaults to the configured value.
    #[arg(long)]
    listen: Option<String>,
}

#[derive(Clone)]
struct AppState {
    guard: Arc<ExitGuard>,
    roaster: Arc<RoastGenerator>,
    assistant: Arc<StudyAssistant>,
}

impl AppState {
    fn new(config: &Config) -> Self {
        let llm = LlmClient::new(&config.llm);
        Self {
            guard: Arc::new(ExitGuard::new(llm.clone())),
            roaster: Arc::new(RoastGenerator::new(llm.clone())),
            assistant: Arc::new(StudyAssistant::new(llm)),
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionContextBody {
    session_time: u64,
    focused_time: u64,
}

impl SessionContextBody {
    fn to_context(&self) -> SessionContext {
        SessionContext {
            session_secs: self.session_time,
            focused_secs: self.focused_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PdfContextBody {
    filename: String,
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    question: String,
    session_context: SessionContextBody,
    #[serde(default)]
    pdf_context: Option<PdfContextBody>,
}

#[derive(Serialize)]
struct AnswerResponse {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DefineRequest {
    term: String,
    #[serde(default)]
    context: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateRequest {
    goal_minutes: u32,
    elapsed_seconds: u64,
    violations: u32,
    reflection: String,
    checklist_complete: bool,
    focus_percentage: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardRequest {
    session_time: u64,
    focused_time: u64,
    violations: u32,
}

#[derive(Serialize)]
struct GuardResponse {
    message: String,
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Json<AnswerResponse> {
    let context = req.session_context.to_context();
    let pdf = req
        .pdf_context
        .map(|body| PdfContext::new(body.filename, body.text));
    let text = state
        .assistant
        .answer(&req.question, &context, pdf.as_ref())
        .await;
    Json(AnswerResponse { text })
}

async fn define(Json(req): Json<DefineRequest>) -> Json<lockin_core::Definition> {
    Json(lockin_core::define(&req.term, &req.context))
}

async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Json<ExitEvaluation> {
    let input = EvaluationInput {
        goal_minutes: req.goal_minutes,
        elapsed_secs: req.elapsed_seconds,
        violations: req.violations,
        reflection: req.reflection,
        checklist_complete: req.checklist_complete,
        focus_pct: req.focus_percentage,
    };
    Json(state.guard.evaluate(&input).await)
}

async fn guard(
    State(state): State<AppState>,
    Json(req): Json<GuardRequest>,
) -> Json<GuardResponse> {
    let focus_pct = SessionContext {
        session_secs: req.session_time,
        focused_secs: req.focused_time,
    }
    .focus_rate();
    // Each request is its own focus-loss event; the debounced entry point is
    // for session drivers, not the stateless API.
    let message = state
        .roaster
        .roast(&RoastContext {
            elapsed_secs: req.session_time,
            focus_pct,
            violations: req.violations,
        })
        .await;
    Json(GuardResponse { message })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/llm/answer", post(answer))
        .route("/api/llm/define", post(define))
        .route("/api/llm/evaluate", post(evaluate))
        .route("/api/llm/guard", post(guard))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lockin_server=info,lockin_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address '{listen}': {e}"))?;

    let state = AppState::new(&config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "lockin-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        // Unreachable collaborator: every handler exercises its fallback.
        let mut config = Config::default();
        config.llm.base_url = "http://127.0.0.1:9".to_string();
        config.llm.timeout_secs = 1;
        AppState::new(&config)
    }

    async fn post_json(path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn evaluate_answers_with_the_local_verdict() {
        let (status, body) = post_json(
            "/api/llm/evaluate",
            serde_json::json!({
                "goalMinutes": 60,
                "elapsedSeconds": 2880,
                "violations": 2,
                "reflection": "",
                "checklistComplete": false,
                "focusPercentage": 90
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allow"], serde_json::Value::Bool(true));
        assert!(body["feedback"].as_str().unwrap().contains("80%"));
    }

    #[tokio::test]
    async fn guard_always_returns_a_message() {
        let (status, body) = post_json(
            "/api/llm/guard",
            serde_json::json!({
                "sessionTime": 600,
                "focusedTime": 300,
                "violations": 2,
                "focusRate": 50
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn define_is_served_locally() {
        let (status, body) = post_json(
            "/api/llm/define",
            serde_json::json!({"term": "entropy", "context": "physics"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["summary"].as_str().unwrap().contains("disorder"));
        assert_eq!(body["bullets"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn answer_degrades_to_the_contextual_responder() {
        let (status, body) = post_json(
            "/api/llm/answer",
            serde_json::json!({
                "question": "I cannot concentrate at all",
                "sessionContext": {
                    "sessionTime": 600,
                    "focusedTime": 200,
                    "focusRate": 33
                }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap().contains("2-minute rule"));
    }
}
