//! Plan Request Handler: answers in, user-facing text out.
//!
//! One call builds the prompt, asks the generator for a plan, and, when a
//! note store is configured, writes each extracted item into it. Every
//! external failure is caught here and turned into text; [`handle`] cannot
//! fail.
//!
//! [`handle`]: PlanRequestHandler::handle

use std::sync::Arc;

use tracing::{info, warn};

use crate::extract::extract_plan_items;
use crate::generator::PlanGenerator;
use crate::notes::NoteStore;
use crate::prompt::{AnswerSet, PromptStyle, build_prompt};

/// Shown in place of a plan when generation fails.
pub const GENERATION_FAILED_PREFIX: &str = "AI 추천 중 오류가 발생했습니다: ";

pub const STATUS_DISABLED: &str =
    "Notion 연동 비활성화: NOTION_TOKEN 또는 NOTION_DATABASE_ID가 설정되지 않았습니다.";
pub const STATUS_UNPARSED: &str = "Notion 연동 실패: AI 응답에서 계획을 파싱할 수 없습니다.";
pub const STATUS_CREATED: &str = "Notion에 일정이 성공적으로 추가되었습니다.";

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What the generation step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The generated plan text.
    Plan(String),
    /// The generation call failed; holds the error message.
    Failed(String),
}

/// What the note-store step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationStatus {
    /// No note store is configured.
    Disabled,
    /// A store is configured but generation failed, so nothing was sent.
    Skipped,
    /// The plan text contained no `제목: / 내용:` items.
    Unparsed,
    /// Every extracted item was written.
    Created { count: usize },
    /// A write failed after `created` items had been written.
    Failed { created: usize, error: String },
}

impl IntegrationStatus {
    /// Status line appended to the plan, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Disabled => Some(STATUS_DISABLED.to_string()),
            Self::Skipped => None,
            Self::Unparsed => Some(STATUS_UNPARSED.to_string()),
            Self::Created { .. } => Some(STATUS_CREATED.to_string()),
            Self::Failed { error, .. } => Some(format!(
                "Notion 연동 중 오류 발생: {error}. Notion API 키, DB ID, 권한을 확인해주세요."
            )),
        }
    }
}

/// Typed result of one plan request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub generation: Generation,
    pub integration: IntegrationStatus,
}

impl PlanOutcome {
    /// The text shown to the user: plan (or error) plus an optional status
    /// line separated by a blank line.
    pub fn render(&self) -> String {
        let mut out = match &self.generation {
            Generation::Plan(text) => text.clone(),
            Generation::Failed(message) => format!("{GENERATION_FAILED_PREFIX}{message}"),
        };
        if let Some(status) = self.integration.message() {
            out.push_str("\n\n");
            out.push_str(&status);
        }
        out
    }

    pub fn generation_failed(&self) -> bool {
        matches!(self.generation, Generation::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Stateless pipeline shared by every request.
#[derive(Clone)]
pub struct PlanRequestHandler {
    generator: Arc<dyn PlanGenerator>,
    notes: Option<Arc<dyn NoteStore>>,
    style: PromptStyle,
}

impl PlanRequestHandler {
    pub fn new(generator: Arc<dyn PlanGenerator>, style: PromptStyle) -> Self {
        Self {
            generator,
            notes: None,
            style,
        }
    }

    /// Enable write-back of extracted items.
    pub fn with_note_store(mut self, notes: Arc<dyn NoteStore>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn integration_enabled(&self) -> bool {
        self.notes.is_some()
    }

    /// Run one request to completion. Never fails.
    pub async fn handle(&self, answers: &AnswerSet) -> PlanOutcome {
        let prompt = build_prompt(answers, self.style);

        let generation = match self.generator.generate(&prompt).await {
            Ok(text) => {
                info!(generator = self.generator.name(), chars = text.len(), "plan generated");
                Generation::Plan(text)
            }
            Err(e) => {
                warn!(generator = self.generator.name(), error = %e, "plan generation failed");
                Generation::Failed(e.to_string())
            }
        };

        let integration = match (&generation, &self.notes) {
            (_, None) => {
                warn!("note integration disabled: no note store configured");
                IntegrationStatus::Disabled
            }
            (Generation::Failed(_), Some(_)) => IntegrationStatus::Skipped,
            (Generation::Plan(text), Some(notes)) => write_items(notes.as_ref(), text).await,
        };

        PlanOutcome {
            generation,
            integration,
        }
    }
}

impl std::fmt::Debug for PlanRequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRequestHandler")
            .field("generator", &self.generator.name())
            .field("notes", &self.notes.as_ref().map(|n| n.name()))
            .field("style", &self.style)
            .finish()
    }
}

/// Extract items from `text` and write them one by one, stopping at the
/// first failure.
async fn write_items(notes: &dyn NoteStore, text: &str) -> IntegrationStatus {
    let items = extract_plan_items(text);
    if items.is_empty() {
        warn!(store = notes.name(), "no plan items could be parsed from the response");
        return IntegrationStatus::Unparsed;
    }

    for (created, item) in items.iter().enumerate() {
        if let Err(e) = notes.create_item(item).await {
            warn!(store = notes.name(), created, error = %e, "note store write failed");
            return IntegrationStatus::Failed {
                created,
                error: e.to_string(),
            };
        }
    }

    info!(store = notes.name(), count = items.len(), "plan items written");
    IntegrationStatus::Created { count: items.len() }
}
