//! The `PlanGenerator` trait -- the adapter interface for text-generation APIs.
//!
//! Each concrete client (Gemini, OpenAI) implements this trait. The trait is
//! object-safe so the handler can hold an `Arc<dyn PlanGenerator>`.

use async_trait::async_trait;

use super::GenerateError;
use crate::prompt::Prompt;

/// Adapter interface for a text-generation API.
///
/// Implementors translate a [`Prompt`] into one provider request and return
/// the generated text. They never retry; a failed call is reported as a
/// [`GenerateError`] and the caller decides what to show.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Human-readable name for this generator (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `prompt` and return the generated text.
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerateError>;
}

// Compile-time assertion: PlanGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
