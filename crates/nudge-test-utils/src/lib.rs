//! Shared test utilities for nudge integration tests.
//!
//! Provides:
//! - [`FakeGenerator`]: a scripted [`PlanGenerator`] that records prompts.
//! - [`RecordingNoteStore`]: a [`NoteStore`] that records items and can be
//!   told to fail at a given call.
//! - [`spawn_stub_server`]: serves an axum router on `127.0.0.1:0` so the real
//!   HTTP clients can be exercised without network access.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use nudge_core::extract::PlanItem;
use nudge_core::generator::{GenerateError, PlanGenerator, ProviderKind};
use nudge_core::notes::{NoteStore, NoteStoreError};
use nudge_core::prompt::Prompt;

// ---------------------------------------------------------------------------
// Fake generator
// ---------------------------------------------------------------------------

enum Script {
    Reply(String),
    Fail { status: u16, body: String },
}

/// A generator that always gives the same scripted answer.
pub struct FakeGenerator {
    script: Script,
    prompts: Mutex<Vec<Prompt>>,
}

impl FakeGenerator {
    /// Reply with `text` to every prompt.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            script: Script::Reply(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fail every call with an HTTP-status error.
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            script: Script::Fail {
                status,
                body: body.into(),
            },
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl PlanGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.clone());
        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail { status, body } => Err(GenerateError::Status {
                provider: ProviderKind::Gemini,
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Recording note store
// ---------------------------------------------------------------------------

/// A note store that keeps every item it is asked to create.
#[derive(Default)]
pub struct RecordingNoteStore {
    items: Mutex<Vec<PlanItem>>,
    attempts: Mutex<usize>,
    /// Zero-based call index that fails, if any.
    fail_at: Option<usize>,
}

impl RecordingNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `index`-th call (zero-based); earlier calls succeed.
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Items successfully created, in order.
    pub fn items(&self) -> Vec<PlanItem> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of create calls, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NoteStore for RecordingNoteStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn create_item(&self, item: &PlanItem) -> Result<(), NoteStoreError> {
        let call = {
            let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
            *attempts += 1;
            *attempts - 1
        };
        if self.fail_at == Some(call) {
            return Err(NoteStoreError::Status {
                store: "recording".to_string(),
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(item.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stub HTTP server
// ---------------------------------------------------------------------------

/// Serve `router` on an ephemeral local port.
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and the server task. The
/// server lives until the test's runtime shuts down.
pub async fn spawn_stub_server(router: Router) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub server");
    let addr = listener.local_addr().expect("stub server has no address");
    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("stub server crashed");
    });
    (format!("http://{addr}"), handle)
}
