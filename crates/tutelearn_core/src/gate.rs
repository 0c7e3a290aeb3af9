//! crates/tutelearn_core/src/gate.rs
//!
//! The completion gate: a pure, per-kind rule deciding when a content
//! item may be marked complete. Consulted by the session state machine
//! before any completion request is accepted.

use crate::domain::{ContentItem, ContentKind};

/// Default minimum fraction of a video that must be watched before the
/// item can be completed.
pub const DEFAULT_MIN_WATCH_FRACTION: f64 = 0.80;

/// Type-specific completion rule.
///
/// Text blocks complete immediately. Learning-content quizzes complete
/// immediately as well (they are practice, never scored). Videos require
/// a minimum watched fraction of their duration.
#[derive(Debug, Clone, Copy)]
pub struct CompletionGate {
    min_watch_fraction: f64,
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self {
            min_watch_fraction: DEFAULT_MIN_WATCH_FRACTION,
        }
    }
}

impl CompletionGate {
    /// Creates a gate with a custom watch fraction, clamped into `[0, 1]`.
    pub fn new(min_watch_fraction: f64) -> Self {
        Self {
            min_watch_fraction: min_watch_fraction.clamp(0.0, 1.0),
        }
    }

    pub fn min_watch_fraction(&self) -> f64 {
        self.min_watch_fraction
    }

    /// Whether `item` may be marked complete given the recorded watch
    /// time (`None` when nothing has been watched yet).
    pub fn can_complete(&self, item: &ContentItem, watch_seconds: Option<u32>) -> bool {
        match &item.kind {
            ContentKind::Text { .. } => true,
            ContentKind::Quiz { .. } => true,
            ContentKind::Video { duration_secs, .. } => {
                // A zero duration in the source data must not lock the
                // learner out.
                if *duration_secs == 0 {
                    return true;
                }
                let watched = f64::from(watch_seconds.unwrap_or(0));
                watched / f64::from(*duration_secs) >= self.min_watch_fraction
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Question, QuestionKind};
    use uuid::Uuid;

    fn text_item() -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Text {
                title: None,
                body: "<p>Welcome</p>".to_string(),
            },
        }
    }

    fn video_item(duration_secs: u32) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Video {
                title: "Intro".to_string(),
                description: None,
                video_ref: "yt:abc123".to_string(),
                duration_secs,
            },
        }
    }

    fn quiz_item() -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Quiz {
                question: Question {
                    id: Uuid::new_v4(),
                    prompt: "Practice?".to_string(),
                    kind: QuestionKind::Text {
                        correct: "yes".to_string(),
                    },
                    explanation: None,
                    points: 10,
                    difficulty: None,
                },
            },
        }
    }

    #[test]
    fn text_and_quiz_items_complete_immediately() {
        let gate = CompletionGate::default();
        assert!(gate.can_complete(&text_item(), None));
        assert!(gate.can_complete(&quiz_item(), None));
    }

    #[test]
    fn video_requires_the_watch_fraction() {
        let gate = CompletionGate::default();
        let video = video_item(120);
        assert!(!gate.can_complete(&video, None));
        assert!(!gate.can_complete(&video, Some(95)), "95/120 < 0.80");
        assert!(gate.can_complete(&video, Some(96)), "96/120 == 0.80");
        assert!(gate.can_complete(&video, Some(120)));
    }

    #[test]
    fn zero_duration_video_is_always_completable() {
        let gate = CompletionGate::default();
        assert!(gate.can_complete(&video_item(0), None));
    }

    #[test]
    fn custom_fraction_is_clamped() {
        let gate = CompletionGate::new(1.5);
        let video = video_item(100);
        assert!(!gate.can_complete(&video, Some(99)));
        assert!(gate.can_complete(&video, Some(100)));
        assert!(CompletionGate::new(-0.5).can_complete(&video_item(100), None));
    }
}
