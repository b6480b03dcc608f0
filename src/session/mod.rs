pub mod advance;
pub mod quiz;
pub mod result;

pub use quiz::{ActiveQuestion, QuizError, QuizLength, QuizSession, QuizState, Reveal, SessionEvent};
pub use result::{AnswerOutcome, QuizSummary};
