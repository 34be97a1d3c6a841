//! Core pipeline for nudge: prompt, generation, extraction, write-back.

pub mod extract;
pub mod generator;
pub mod handler;
pub mod notes;
pub mod prompt;

pub use extract::{PlanItem, extract_plan_items};
pub use generator::{
    GenerateError, GeneratorConfig, PlanGenerator, ProviderKind, build_generator,
};
pub use handler::{Generation, IntegrationStatus, PlanOutcome, PlanRequestHandler};
pub use notes::{NoteStore, NoteStoreError, NotionClient, NotionConfig};
pub use prompt::{AnswerSet, Prompt, PromptStyle, build_prompt};
