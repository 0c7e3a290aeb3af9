pub mod domain;
pub mod error;
pub mod facade;
pub mod gate;
pub mod ports;
pub mod scoring;
pub mod sequencer;
pub mod session;
pub mod validator;

pub use domain::{
    AnswerPreview, AnswerSlot, CompletionRecord, ContentItem, ContentKind, Difficulty, Phase,
    Question, QuestionKind, SubmittedAnswer, Topic, TopicData,
};
pub use error::{EngineError, EngineResult};
pub use facade::{SessionFacade, SessionSnapshot};
pub use gate::CompletionGate;
pub use ports::{PortError, PortResult, RewardsLedger, TopicRepository};
pub use scoring::ScoreBreakdown;
pub use session::LearningSession;
