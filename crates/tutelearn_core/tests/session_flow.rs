//! crates/tutelearn_core/tests/session_flow.rs
//!
//! Drives the session façade end to end, from raw repository JSON through
//! the learning walk, the quiz, and the final reward computation.

use serde_json::json;
use uuid::Uuid;

use tutelearn_core::{
    CompletionGate, EngineError, Phase, SessionFacade, SubmittedAnswer, TopicData,
};

/// The worked example: two text blocks, one 120-second video, three
/// questions. Returns the data plus the ids needed to drive it.
fn example_topic() -> (TopicData, Vec<Uuid>) {
    let item_ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let data = TopicData {
        id: Uuid::new_v4(),
        title: "Intro to TUTE".to_string(),
        description: Some("A first topic".to_string()),
        difficulty: "beginner".to_string(),
        estimated_minutes: 10,
        learning_content: Some(json!([
            { "id": item_ids[0], "type": "text", "title": "Welcome", "body": "<p>hi</p>" },
            { "id": item_ids[1], "type": "text", "title": null, "body": "<p>more</p>" },
            { "id": item_ids[2], "type": "video", "title": "Demo", "description": null,
              "video_ref": "yt:demo", "duration_secs": 120 },
        ])),
        quiz_questions: Some(json!([
            { "id": Uuid::new_v4(), "type": "text", "prompt": "Capital of France?",
              "correct": "Paris", "explanation": "It is Paris." },
            { "id": Uuid::new_v4(), "type": "single", "prompt": "2 + 2?",
              "options": ["3", "4", "5"], "correct": [1] },
            { "id": Uuid::new_v4(), "type": "multiple", "prompt": "Primes?",
              "options": ["2", "4", "5"], "correct": [0, 2], "points": 20 },
        ])),
    };
    (data, item_ids)
}

fn facade() -> (SessionFacade, Vec<Uuid>) {
    let (data, ids) = example_topic();
    let facade = SessionFacade::create(data, Uuid::new_v4(), CompletionGate::default())
        .expect("valid topic");
    (facade, ids)
}

#[test]
fn full_run_earns_the_documented_reward() {
    let (mut f, ids) = facade();
    assert_eq!(f.snapshot().phase, Phase::Learning);

    f.mark_item_complete(ids[0]).unwrap();
    f.mark_item_complete(ids[1]).unwrap();

    // Video: gate refuses until enough is watched.
    let err = f.mark_item_complete(ids[2]).unwrap_err();
    assert!(matches!(err, EngineError::GateNotSatisfied { .. }));
    f.record_video_progress(ids[2], 100).unwrap();
    let snap = f.mark_item_complete(ids[2]).unwrap();
    assert_eq!(snap.phase, Phase::Quiz);
    assert_eq!(snap.current_question_index, Some(0));
    assert_eq!(snap.completed_item_ids.len(), 3);

    // Answer 2 of 3 correctly, leave the third wrong.
    f.record_answer(0, SubmittedAnswer::Text { response: "  paris  ".to_string() })
        .unwrap();
    f.advance_question().unwrap();
    f.record_answer(1, SubmittedAnswer::Choice { selected: vec![1] })
        .unwrap();
    f.advance_question().unwrap();
    f.record_answer(2, SubmittedAnswer::Choice { selected: vec![0, 1, 2] })
        .unwrap();
    let done = f.advance_question().unwrap();

    assert_eq!(done.phase, Phase::Completed);
    assert_eq!(done.score, Some(2));
    assert_eq!(done.percentage, Some(67));
    assert_eq!(done.passed, Some(true));
    assert_eq!(done.tute_points_earned, Some(55), "30 + 2*10 + 1*5");
    assert!(done.completed_at.is_some());

    let record = f.completion_record().expect("completed");
    assert_eq!(record.score, 2);
    assert_eq!(record.total_questions, 3);
    assert_eq!(record.tute_points_earned, 55);
    assert_eq!(record.answers.len(), 3);
}

#[test]
fn exactly_n_and_m_successful_calls_reach_completion() {
    let (mut f, ids) = facade();
    f.record_video_progress(ids[2], 120).unwrap();

    // N successful completions for N items, no fewer.
    for (n, id) in ids.iter().enumerate() {
        assert_eq!(f.snapshot().phase, Phase::Learning, "after {} marks", n);
        f.mark_item_complete(*id).unwrap();
    }
    assert_eq!(f.snapshot().phase, Phase::Quiz);

    // M successful advances for M questions, no fewer.
    for m in 0..3 {
        assert_eq!(f.snapshot().phase, Phase::Quiz, "after {} advances", m);
        f.advance_question().unwrap();
    }
    assert_eq!(f.snapshot().phase, Phase::Completed);

    // Unanswered throughout: score 0, points = base + video bonus.
    let snap = f.snapshot();
    assert_eq!(snap.score, Some(0));
    assert_eq!(snap.tute_points_earned, Some(35));
    assert_eq!(snap.passed, Some(false));
}

#[test]
fn quiz_phase_cannot_be_skipped() {
    let (mut f, _ids) = facade();
    assert!(matches!(
        f.advance_question().unwrap_err(),
        EngineError::InvalidPhaseOperation { .. }
    ));
    assert!(matches!(
        f.record_answer(0, SubmittedAnswer::Text { response: "x".to_string() })
            .unwrap_err(),
        EngineError::InvalidPhaseOperation { .. }
    ));
    assert_eq!(f.snapshot().phase, Phase::Learning);
}

#[test]
fn preview_is_read_only_feedback() {
    let (mut f, ids) = facade();
    f.record_video_progress(ids[2], 120).unwrap();
    for id in &ids {
        f.mark_item_complete(*id).unwrap();
    }

    // Learning phase is over, preview is allowed now.
    f.record_answer(0, SubmittedAnswer::Text { response: "Paris".to_string() })
        .unwrap();
    let preview = f.preview_answer(0).unwrap();
    assert!(preview.answered);
    assert!(preview.correct);
    assert_eq!(preview.points, 10);
    assert_eq!(preview.explanation.as_deref(), Some("It is Paris."));

    let unanswered = f.preview_answer(1).unwrap();
    assert!(!unanswered.answered);
    assert!(!unanswered.correct);

    // Previewing graded nothing.
    let snap = f.snapshot();
    assert_eq!(snap.score, None);
    assert_eq!(snap.tute_points_earned, None);

    assert!(matches!(
        f.preview_answer(7).unwrap_err(),
        EngineError::OutOfRange { .. }
    ));
}

#[test]
fn per_question_points_surface_in_the_preview() {
    let (mut f, ids) = facade();
    f.record_video_progress(ids[2], 120).unwrap();
    for id in &ids {
        f.mark_item_complete(*id).unwrap();
    }
    // The third question declared 20 points; the default is 10.
    assert_eq!(f.preview_answer(2).unwrap().points, 20);
    assert_eq!(f.preview_answer(1).unwrap().points, 10);
}

#[test]
fn malformed_topics_create_nothing() {
    let learner = Uuid::new_v4();
    let gate = CompletionGate::default();

    let (mut data, _) = example_topic();
    data.learning_content = None;
    assert!(matches!(
        SessionFacade::create(data, learner, gate).unwrap_err(),
        EngineError::InvalidTopicData(_)
    ));

    let (mut data, _) = example_topic();
    data.quiz_questions = Some(json!({"not": "an array"}));
    assert!(matches!(
        SessionFacade::create(data, learner, gate).unwrap_err(),
        EngineError::InvalidTopicData(_)
    ));

    let (mut data, _) = example_topic();
    data.difficulty = "impossible".to_string();
    assert!(matches!(
        SessionFacade::create(data, learner, gate).unwrap_err(),
        EngineError::InvalidTopicData(_)
    ));

    let (mut data, _) = example_topic();
    data.learning_content = Some(json!([{ "id": Uuid::new_v4(), "type": "hologram" }]));
    assert!(matches!(
        SessionFacade::create(data, learner, gate).unwrap_err(),
        EngineError::InvalidTopicData(_)
    ));
}

#[test]
fn question_defaults_apply_when_fields_are_omitted() {
    let (data, _ids) = example_topic();
    let f = SessionFacade::create(data, Uuid::new_v4(), CompletionGate::default()).unwrap();
    let questions = f.questions();
    assert_eq!(questions[0].points, 10, "default point value");
    assert_eq!(questions[2].points, 20, "explicit point value");
    assert!(questions[1].explanation.is_none());
    assert!(questions[1].difficulty.is_none());
}

#[test]
fn completion_record_is_absent_until_completed() {
    let (mut f, ids) = facade();
    assert!(f.completion_record().is_none());
    f.record_video_progress(ids[2], 120).unwrap();
    for id in &ids {
        f.mark_item_complete(*id).unwrap();
    }
    assert!(f.completion_record().is_none(), "quiz not finished yet");
}
