use nudge_core::{AnswerSet, PlanRequestHandler};

/// Run one plan request and print the rendered result.
///
/// Generation and write-back failures are part of the printed text, so this
/// never fails.
pub async fn run_generate(handler: &PlanRequestHandler, answers: &AnswerSet) {
    let outcome = handler.handle(answers).await;
    if outcome.generation_failed() {
        tracing::warn!("plan generation failed; printing the error in place of a plan");
    }
    println!("{}", outcome.render());
}
