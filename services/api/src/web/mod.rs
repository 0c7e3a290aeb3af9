//! services/api/src/web/mod.rs

pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{
    advance_question_handler, complete_item_handler, create_session_handler,
    delete_session_handler, get_session_handler, navigate_handler, preview_answer_handler,
    record_answer_handler, session_result_handler, video_progress_handler,
};
