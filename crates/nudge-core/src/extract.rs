//! Plan item extraction from generated text.
//!
//! The model is asked to answer in `제목: <title> 내용: <body>` form. Each
//! `제목:` header is matched lazily up to the first following `내용:`, and the
//! body runs until the next `제목:` or the end of the text. Text that does not
//! follow the format yields fewer (possibly zero) items; nothing is repaired.

use std::sync::LazyLock;

use regex::Regex;

/// Label that opens an item and terminates the previous body.
pub const TITLE_LABEL: &str = "제목:";

/// `제목:` + lazy title (may span lines) + `내용:`, swallowing surrounding
/// whitespace so group 1 is the bare title.
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)제목:\s*(.*?)\s*내용:\s*").expect("plan item header pattern is valid")
});

/// One (title, body) pair pulled out of a generated plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    pub title: String,
    pub body: String,
}

impl PlanItem {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Split `text` into trimmed [`PlanItem`]s, in order of appearance.
pub fn extract_plan_items(text: &str) -> Vec<PlanItem> {
    let mut items = Vec::new();
    let mut pos = 0;

    while let Some(caps) = HEADER.captures_at(text, pos) {
        let Some(header) = caps.get(0) else { break };
        let title = caps.get(1).map_or("", |m| m.as_str());

        let body_start = header.end();
        let body_end = text[body_start..]
            .find(TITLE_LABEL)
            .map_or(text.len(), |offset| body_start + offset);

        items.push(PlanItem::new(
            title.trim(),
            text[body_start..body_end].trim(),
        ));
        pos = body_end;
    }

    items
}
