pub mod distractor;
pub mod scoring;
pub mod sequencer;

pub use distractor::{OPTION_COUNT, answer_options, pick_distractors};
pub use sequencer::{Exhausted, next_question};
