//! crates/tutelearn_core/src/scoring.rs
//!
//! Computes the final correctness score and TUTE point total for a
//! finished quiz. Invoked exactly once, by the quiz→completed edge of the
//! session state machine.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{AnswerSlot, ContentItem, Question};
use crate::validator;

/// Flat points credited for finishing a session at all.
pub const BASE_COMPLETION_POINTS: u32 = 30;
/// Points per correctly answered assessment question.
pub const POINTS_PER_CORRECT: u32 = 10;
/// Bonus points per video the learner watched any of.
pub const POINTS_PER_VIDEO_WATCHED: u32 = 5;
/// Minimum percentage counted as a pass.
pub const PASS_THRESHOLD_PERCENT: u32 = 60;

/// The deterministic outcome of one completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ScoreBreakdown {
    pub correct_count: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
    pub video_bonus_count: u32,
    pub tute_points_earned: u32,
}

/// Grades the recorded answers and computes the reward total.
///
/// Unanswered slots grade as incorrect. The video bonus counts every video
/// item with any recorded watch time at all; it does not additionally
/// require the completion-gate fraction. A topic with zero questions is
/// trivially passed at 100%.
pub fn finalize(
    questions: &[Question],
    answers: &[AnswerSlot],
    content_items: &[ContentItem],
    video_watch_seconds: &HashMap<Uuid, u32>,
) -> ScoreBreakdown {
    let correct_count = questions
        .iter()
        .zip(answers.iter())
        .filter(|(question, answer)| validator::is_correct(question, answer))
        .count() as u32;

    let total_questions = questions.len() as u32;
    let percentage = if total_questions == 0 {
        100
    } else {
        ((f64::from(correct_count) / f64::from(total_questions)) * 100.0).round() as u32
    };

    let video_bonus_count = content_items
        .iter()
        .filter(|item| item.is_video())
        .filter(|item| video_watch_seconds.get(&item.id).copied().unwrap_or(0) > 0)
        .count() as u32;

    let tute_points_earned = BASE_COMPLETION_POINTS
        + correct_count * POINTS_PER_CORRECT
        + video_bonus_count * POINTS_PER_VIDEO_WATCHED;

    ScoreBreakdown {
        correct_count,
        total_questions,
        percentage,
        passed: percentage >= PASS_THRESHOLD_PERCENT,
        video_bonus_count,
        tute_points_earned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentKind, QuestionKind, SubmittedAnswer};
    use std::collections::BTreeSet;

    fn text_question(correct: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            prompt: "q".to_string(),
            kind: QuestionKind::Text {
                correct: correct.to_string(),
            },
            explanation: None,
            points: 10,
            difficulty: None,
        }
    }

    fn single_question(correct: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            prompt: "q".to_string(),
            kind: QuestionKind::Single {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct: BTreeSet::from([correct]),
            },
            explanation: None,
            points: 10,
            difficulty: None,
        }
    }

    fn text_item() -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Text {
                title: None,
                body: "b".to_string(),
            },
        }
    }

    fn video_item(duration_secs: u32) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Video {
                title: "v".to_string(),
                description: None,
                video_ref: "ref".to_string(),
                duration_secs,
            },
        }
    }

    #[test]
    fn reward_formula_matches_the_breakdown() {
        // Two text blocks, one video (watched 100 of 120s), three
        // questions with two answered correctly.
        let video = video_item(120);
        let content = vec![text_item(), text_item(), video.clone()];
        let watch = HashMap::from([(video.id, 100)]);

        let questions = vec![
            text_question("paris"),
            single_question(1),
            single_question(2),
        ];
        let answers = vec![
            AnswerSlot::Text {
                response: "Paris".to_string(),
            },
            AnswerSlot::from(SubmittedAnswer::Choice { selected: vec![1] }),
            AnswerSlot::from(SubmittedAnswer::Choice { selected: vec![0] }),
        ];

        let outcome = finalize(&questions, &answers, &content, &watch);
        assert_eq!(outcome.correct_count, 2);
        assert_eq!(outcome.video_bonus_count, 1);
        assert_eq!(outcome.tute_points_earned, 55, "30 + 2*10 + 1*5");
        assert_eq!(outcome.percentage, 67);
        assert!(outcome.passed);
    }

    #[test]
    fn unanswered_slots_grade_as_incorrect() {
        let questions = vec![text_question("a"), text_question("b")];
        let answers = vec![
            AnswerSlot::Text {
                response: "a".to_string(),
            },
            AnswerSlot::Unanswered,
        ];
        let outcome = finalize(&questions, &answers, &[], &HashMap::new());
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.percentage, 50);
        assert!(!outcome.passed);
        assert_eq!(outcome.tute_points_earned, 40);
    }

    #[test]
    fn video_bonus_requires_any_watch_time_not_the_gate() {
        let watched = video_item(600);
        let untouched = video_item(600);
        let content = vec![watched.clone(), untouched];
        // One second is far below the 80% gate but still earns the bonus.
        let watch = HashMap::from([(watched.id, 1)]);

        let outcome = finalize(&[], &[], &content, &watch);
        assert_eq!(outcome.video_bonus_count, 1);
        assert_eq!(outcome.tute_points_earned, 35);
    }

    #[test]
    fn zero_questions_is_a_trivial_pass() {
        let outcome = finalize(&[], &[], &[], &HashMap::new());
        assert_eq!(outcome.correct_count, 0);
        assert_eq!(outcome.percentage, 100);
        assert!(outcome.passed);
        assert_eq!(outcome.tute_points_earned, BASE_COMPLETION_POINTS);
    }
}
