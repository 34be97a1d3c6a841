use serde::{Deserialize, Serialize};

/// Lazy score at or above which the user is flagged as procrastinating.
pub const LAZY_THRESHOLD: u32 = 3;

/// One entry of the to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    /// Free-form time the user attached to the task (e.g. "내일 9시").
    pub time: String,
    #[serde(default)]
    pub done: bool,
    /// How many times the task has been pushed back.
    #[serde(default)]
    pub postponed: u32,
}

impl TaskRecord {
    /// A fresh, not-yet-done record with no postponements.
    pub fn new(title: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time: time.into(),
            done: false,
            postponed: 0,
        }
    }
}

/// Sum of the postponement counters across all records, saturating at
/// `u32::MAX` since counters come from a hand-editable file.
pub fn lazy_score(records: &[TaskRecord]) -> u32 {
    records
        .iter()
        .fold(0u32, |acc, r| acc.saturating_add(r.postponed))
}

/// Whether a lazy score crosses [`LAZY_THRESHOLD`].
pub fn is_lazy(score: u32) -> bool {
    score >= LAZY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending() {
        let rec = TaskRecord::new("운동", "07:00");
        assert!(!rec.done);
        assert_eq!(rec.postponed, 0);
    }

    #[test]
    fn lazy_score_sums_postponements() {
        let mut a = TaskRecord::new("a", "");
        a.postponed = 2;
        let mut b = TaskRecord::new("b", "");
        b.postponed = 5;
        let c = TaskRecord::new("c", "");
        assert_eq!(lazy_score(&[a, b, c]), 7);
        assert_eq!(lazy_score(&[]), 0);
    }

    #[test]
    fn lazy_flag_flips_at_threshold() {
        assert!(!is_lazy(0));
        assert!(!is_lazy(2));
        assert!(is_lazy(3));
        assert!(is_lazy(10));
    }

    #[test]
    fn missing_counters_default_on_deserialize() {
        let rec: TaskRecord = serde_json::from_str(r#"{"title":"t","time":"now"}"#).unwrap();
        assert_eq!(rec, TaskRecord::new("t", "now"));
    }
}
