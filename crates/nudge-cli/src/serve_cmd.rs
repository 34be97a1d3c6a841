use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::Html;
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nudge_core::{AnswerSet, PlanRequestHandler};

use crate::config::ServerConfig;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Fields posted by the question form. Absent fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateForm {
    pub q1: String,
    pub q2: String,
    pub q3: String,
}

impl From<GenerateForm> for AnswerSet {
    fn from(form: GenerateForm) -> Self {
        AnswerSet::new(form.q1, form.q2, form.q3)
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(handler: PlanRequestHandler) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(handler)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(handler: PlanRequestHandler, server: &ServerConfig) -> Result<()> {
    let app = build_router(handler);
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", server.bind, server.port))?;
    tracing::info!("nudge serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("nudge serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<String> {
    Html(page(
        "이번 주 계획 만들기",
        "<form method=\"post\" action=\"/generate\">\
<p><label for=\"q1\">1. 최근에 하고 싶었던 일은?</label><br>\
<textarea id=\"q1\" name=\"q1\" rows=\"2\" cols=\"60\" required></textarea></p>\
<p><label for=\"q2\">2. 3개월 이내 달성하고 싶은 목표는?</label><br>\
<textarea id=\"q2\" name=\"q2\" rows=\"2\" cols=\"60\" required></textarea></p>\
<p><label for=\"q3\">3. 계속 미루고 있었던 일은?</label><br>\
<textarea id=\"q3\" name=\"q3\" rows=\"2\" cols=\"60\" required></textarea></p>\
<p><button type=\"submit\">계획 추천받기</button></p>\
</form>",
    ))
}

/// Always answers 200 with a page: a malformed body is treated as empty
/// answers rather than rejected.
async fn generate(
    State(handler): State<PlanRequestHandler>,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Html<String> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!("unreadable generate form, using empty answers: {rejection}");
            GenerateForm::default()
        }
    };

    tracing::info!("generate request received");
    let outcome = handler.handle(&form.into()).await;

    Html(page(
        "추천 계획",
        &format!(
            "<pre style=\"white-space: pre-wrap\">{}</pre>\
<p><a href=\"/\">다시 하기</a></p>",
            escape_html(&outcome.render())
        ),
    ))
}

async fn healthz() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// HTML helpers
// ---------------------------------------------------------------------------

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
<html lang=\"ko\"><head><meta charset=\"utf-8\"><title>{title}</title></head><body>\
<h1>{title}</h1>{body}</body></html>"
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
