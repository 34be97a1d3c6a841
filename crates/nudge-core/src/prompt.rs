//! Prompt construction for weekly plan generation.
//!
//! Embeds the user's three answers into a fixed Korean template that asks the
//! model for three concrete plans in `제목: ... 내용: ...` form. This module
//! is pure logic (no I/O).

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three free-text answers collected from the form.
///
/// Fields are opaque: no trimming, length limits, or content checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    /// Something the user has wanted to do lately.
    pub recent_desire: String,
    /// A goal to reach within three months.
    pub three_month_goal: String,
    /// A task the user keeps putting off.
    pub procrastinated: String,
}

impl AnswerSet {
    pub fn new(
        recent_desire: impl Into<String>,
        three_month_goal: impl Into<String>,
        procrastinated: impl Into<String>,
    ) -> Self {
        Self {
            recent_desire: recent_desire.into(),
            three_month_goal: three_month_goal.into(),
            procrastinated: procrastinated.into(),
        }
    }
}

/// A prompt ready to send to a generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System-role instruction, for chat-style APIs.
    pub system: Option<String>,
    /// The user message carrying the answers.
    pub user: String,
}

/// Which template variant to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// A single user message.
    Plain,
    /// A system instruction followed by the user message.
    WithSystemRole,
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Plain => "plain",
            Self::WithSystemRole => "with_system_role",
        };
        f.write_str(s)
    }
}

impl FromStr for PromptStyle {
    type Err = PromptStyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "with_system_role" => Ok(Self::WithSystemRole),
            other => Err(PromptStyleParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PromptStyle`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid prompt style: {0:?} (expected plain or with_system_role)")]
pub struct PromptStyleParseError(pub String);

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// System instruction used by [`PromptStyle::WithSystemRole`].
pub const SYSTEM_INSTRUCTION: &str = "당신은 사용자의 일정 계획을 돕는 친절한 한국어 비서입니다. \
     사용자가 이번 주에 바로 시작할 수 있는 구체적인 계획을 제안하고, \
     각 제안은 반드시 '제목: ...' 다음 줄에 '내용: ...' 형식으로 작성합니다.";

/// Build the prompt for `answers` in the given `style`.
///
/// Answers are substituted verbatim; both styles share the same user message.
pub fn build_prompt(answers: &AnswerSet, style: PromptStyle) -> Prompt {
    let user = format!(
        "다음은 사용자의 일정 계획을 돕기 위한 질문과 답변입니다.\n\
         \n\
         1. 최근에 하고 싶었던 일은? -> {q1}\n\
         2. 3개월 이내 달성하고 싶은 목표는? -> {q2}\n\
         3. 계속 미루고 있었던 일은? -> {q3}\n\
         \n\
         이 정보를 바탕으로 사용자가 이번 주에 시작할 수 있는 계획을 \
         한국어로 구체적으로 3가지 제안해주세요.\n\
         각 제안은 '제목: 내용' 형식으로 작성해주세요.\n",
        q1 = answers.recent_desire,
        q2 = answers.three_month_goal,
        q3 = answers.procrastinated,
    );

    let system = match style {
        PromptStyle::Plain => None,
        PromptStyle::WithSystemRole => Some(SYSTEM_INSTRUCTION.to_string()),
    };

    Prompt { system, user }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
