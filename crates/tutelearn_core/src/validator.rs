//! crates/tutelearn_core/src/validator.rs
//!
//! Pure grading predicates. Deciding whether a submitted answer matches
//! the expected answer never has side effects and never fails: malformed
//! or mismatched data grades as incorrect.

use crate::domain::{AnswerSlot, Question, QuestionKind};

/// Returns whether `answer` is the correct response to `question`.
///
/// Single/multiple questions grade by set equality over option indices;
/// an empty submission is always incorrect. Text questions grade by
/// trimmed, case-insensitive string equality with no fuzzy matching.
/// An `Unanswered` slot or a kind mismatch is incorrect, not an error.
pub fn is_correct(question: &Question, answer: &AnswerSlot) -> bool {
    match (&question.kind, answer) {
        (
            QuestionKind::Single { correct, .. } | QuestionKind::Multiple { correct, .. },
            AnswerSlot::Choice { selected },
        ) => !selected.is_empty() && selected == correct,
        (QuestionKind::Text { correct }, AnswerSlot::Text { response }) => {
            normalize(response) == normalize(correct)
        }
        _ => false,
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
