//! Quiz session engine: question bank loading, distractor selection,
//! question sequencing and the chapter → length → quiz → summary state machine.
//!
//! The terminal front end lives in the binary (`main.rs`) and drives a
//! [`session::QuizSession`] through its public actions.

pub mod bank;
pub mod config;
pub mod engine;
pub mod logging;
pub mod session;
