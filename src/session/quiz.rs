use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error};
use rand::Rng;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::bank::{Question, QuestionBank};
use crate::engine::{self, Exhausted};
use crate::session::advance::AdvanceTimer;
use crate::session::result::{AnswerOutcome, QuizSummary};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizState {
    ChapterSelect,
    LengthSelect,
    InProgress,
    Summary,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizState::ChapterSelect => "chapter selection",
            QuizState::LengthSelect => "length selection",
            QuizState::InProgress => "a quiz in progress",
            QuizState::Summary => "the summary",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizLength {
    /// Short quiz of the configured mini length.
    Mini,
    /// Every question in the chapter.
    Full,
    Custom(usize),
}

impl QuizLength {
    pub fn requested(self, mini_length: usize, pool_len: usize) -> usize {
        match self {
            QuizLength::Mini => mini_length,
            QuizLength::Full => pool_len,
            QuizLength::Custom(n) => n,
        }
    }
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("chapter {chapter} has no questions")]
    EmptyPool { chapter: String },
    #[error("no question is waiting for an answer")]
    NoActiveQuestion,
    #[error("the current question has not been answered yet")]
    AnswerPending,
    #[error(transparent)]
    Exhausted(#[from] Exhausted),
    #[error("cannot {action} during {state}")]
    InvalidTransition {
        action: &'static str,
        state: QuizState,
    },
}

/// The question on screen, with its shuffled options.
#[derive(Clone, Debug)]
pub struct ActiveQuestion {
    pub question: Arc<Question>,
    pub options: Vec<String>,
    pub hint_visible: bool,
}

/// An answered question, kept until the next one loads.
#[derive(Clone, Debug)]
pub struct Reveal {
    pub question: Arc<Question>,
    pub options: Vec<String>,
    pub selected: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    LengthSelect { chapter: String, available: usize },
    Started { total: usize },
    QuestionPresented { number: usize, total: usize },
    Answered(AnswerOutcome),
    HintToggled(bool),
    Completed(QuizSummary),
    Reset,
}

/// One user's quiz run, from chapter selection through the summary.
///
/// Every action is a synchronous transition returning the event the
/// presenter should render. Actions that do not apply to the current state
/// return an error and leave the session untouched.
pub struct QuizSession<R: Rng = SmallRng> {
    bank: Arc<QuestionBank>,
    rng: R,
    state: QuizState,
    chapter: Option<String>,
    pool: Vec<Arc<Question>>,
    total_questions: usize,
    asked_count: usize,
    score: usize,
    asked_ids: HashSet<String>,
    current: Option<ActiveQuestion>,
    reveal: Option<Reveal>,
    advance: AdvanceTimer,
}

impl<R: Rng> QuizSession<R> {
    pub fn new(bank: Arc<QuestionBank>, rng: R) -> Self {
        Self {
            bank,
            rng,
            state: QuizState::ChapterSelect,
            chapter: None,
            pool: Vec::new(),
            total_questions: 0,
            asked_count: 0,
            score: 0,
            asked_ids: HashSet::new(),
            current: None,
            reveal: None,
            advance: AdvanceTimer::default(),
        }
    }

    pub fn choose_chapter(&mut self, chapter: &str) -> Result<SessionEvent, QuizError> {
        self.expect_state(QuizState::ChapterSelect, "choose a chapter")?;

        self.pool = self.bank.questions_in_chapter(chapter).to_vec();
        self.chapter = Some(chapter.to_string());
        self.state = QuizState::LengthSelect;
        debug!("chapter {chapter} selected, {} questions", self.pool.len());

        Ok(SessionEvent::LengthSelect {
            chapter: chapter.to_string(),
            available: self.pool.len(),
        })
    }

    /// Start the quiz with `requested` questions, capped at the pool size.
    ///
    /// An empty chapter cannot start a quiz: the session falls back to
    /// chapter selection and `EmptyPool` is returned.
    pub fn choose_length(&mut self, requested: usize) -> Result<SessionEvent, QuizError> {
        self.expect_state(QuizState::LengthSelect, "choose a quiz length")?;

        if self.pool.is_empty() {
            let chapter = self.chapter.clone().unwrap_or_default();
            debug!("chapter {chapter} is empty, back to chapter selection");
            self.reset();
            return Err(QuizError::EmptyPool { chapter });
        }

        // A zero-length quiz would reach the summary with nothing to score.
        self.total_questions = requested.clamp(1, self.pool.len());
        self.state = QuizState::InProgress;
        debug!(
            "quiz started: {} of {} requested",
            self.total_questions, requested
        );

        Ok(SessionEvent::Started {
            total: self.total_questions,
        })
    }

    pub fn load_next_question(&mut self) -> Result<SessionEvent, QuizError> {
        self.expect_state(QuizState::InProgress, "load a question")?;
        if self.current.is_some() {
            return Err(QuizError::AnswerPending);
        }
        self.advance.cancel();

        if self.asked_count >= self.total_questions {
            self.reveal = None;
            self.state = QuizState::Summary;
            let summary = self.summary_snapshot();
            debug!(
                "quiz complete: {}/{} ({:.1}%)",
                summary.score, summary.total, summary.percentage
            );
            return Ok(SessionEvent::Completed(summary));
        }

        let question = match engine::next_question(&self.pool, &self.asked_ids, &mut self.rng) {
            Ok(question) => Arc::clone(question),
            Err(err) => {
                // Unreachable while total_questions is capped at the pool size.
                error!(
                    "sequencer exhausted after {} of {} questions",
                    self.asked_count, self.total_questions
                );
                debug_assert!(false, "question pool exhausted before quiz end");
                return Err(err.into());
            }
        };
        let options = engine::answer_options(&self.pool, &question, &mut self.rng);

        self.reveal = None;
        self.current = Some(ActiveQuestion {
            question,
            options,
            hint_visible: false,
        });

        Ok(SessionEvent::QuestionPresented {
            number: self.asked_count + 1,
            total: self.total_questions,
        })
    }

    /// Score `selected` against the active question.
    ///
    /// Does not advance: the presenter decides when to call
    /// `load_next_question`, directly or through `schedule_advance`.
    pub fn submit_answer(&mut self, selected: &str) -> Result<SessionEvent, QuizError> {
        let active = self.current.take().ok_or(QuizError::NoActiveQuestion)?;
        self.advance.cancel();

        let correct = active.question.is_correct(selected);
        self.asked_count += 1;
        self.asked_ids.insert(active.question.id.clone());
        if correct {
            self.score += 1;
        }
        debug!(
            "question {} answered {}, score {}/{}",
            active.question.id,
            if correct { "correctly" } else { "incorrectly" },
            self.score,
            self.asked_count
        );

        let outcome = AnswerOutcome {
            correct,
            correct_answer: active.question.answer.clone(),
            selected: selected.to_string(),
            score: self.score,
            asked: self.asked_count,
        };
        self.reveal = Some(Reveal {
            question: active.question,
            options: active.options,
            selected: selected.to_string(),
            correct,
        });

        Ok(SessionEvent::Answered(outcome))
    }

    pub fn toggle_hint(&mut self) -> Result<SessionEvent, QuizError> {
        let active = self.current.as_mut().ok_or(QuizError::NoActiveQuestion)?;
        active.hint_visible = !active.hint_visible;
        Ok(SessionEvent::HintToggled(active.hint_visible))
    }

    /// Return to chapter selection from any state, discarding the pool and score.
    pub fn restart(&mut self) -> SessionEvent {
        self.reset();
        debug!("session reset to chapter selection");
        SessionEvent::Reset
    }

    /// Arm the delayed advance after an answer has been revealed.
    ///
    /// Returns false when there is no revealed answer to advance from.
    pub fn schedule_advance(&mut self, now: Instant, delay: Duration) -> bool {
        if self.state != QuizState::InProgress || self.reveal.is_none() {
            return false;
        }
        self.advance.schedule(now, delay);
        true
    }

    pub fn cancel_advance(&mut self) {
        self.advance.cancel();
    }

    pub fn has_pending_advance(&self) -> bool {
        self.advance.is_pending()
    }

    pub fn advance_remaining(&self, now: Instant) -> Option<Duration> {
        self.advance.remaining(now)
    }

    /// Run the pending advance if its deadline has passed.
    pub fn poll_advance(&mut self, now: Instant) -> Option<Result<SessionEvent, QuizError>> {
        if self.advance.fire(now) {
            Some(self.load_next_question())
        } else {
            None
        }
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }

    pub fn pool(&self) -> &[Arc<Question>] {
        &self.pool
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn asked_count(&self) -> usize {
        self.asked_count
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn asked_ids(&self) -> &HashSet<String> {
        &self.asked_ids
    }

    pub fn current(&self) -> Option<&ActiveQuestion> {
        self.current.as_ref()
    }

    pub fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    pub fn progress(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.asked_count as f64 / self.total_questions as f64
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        (self.state == QuizState::Summary).then(|| self.summary_snapshot())
    }

    fn summary_snapshot(&self) -> QuizSummary {
        QuizSummary::new(
            self.chapter.as_deref().unwrap_or_default(),
            self.score,
            self.total_questions,
        )
    }

    fn expect_state(&self, expected: QuizState, action: &'static str) -> Result<(), QuizError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn reset(&mut self) {
        self.advance.cancel();
        self.state = QuizState::ChapterSelect;
        self.chapter = None;
        self.pool.clear();
        self.total_questions = 0;
        self.asked_count = 0;
        self.score = 0;
        self.asked_ids.clear();
        self.current = None;
        self.reveal = None;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    const BANK: &str = "\
id,chapter,answer,prompt,hint,category
1,1,A,P1,H1,X
2,1,B,P2,H2,X
3,1,C,P3,H3,X
4,2,D,P4,H4,Y
5,2,E,P5,H5,Y
";

    fn session(seed: u64) -> QuizSession {
        let bank = Arc::new(QuestionBank::load(BANK.as_bytes()).unwrap());
        QuizSession::new(bank, SmallRng::seed_from_u64(seed))
    }

    fn assert_invariants(s: &QuizSession) {
        assert!(s.score() <= s.asked_count());
        assert!(s.asked_count() <= s.total_questions());
        assert!(s.total_questions() <= s.pool().len());
        assert_eq!(s.asked_ids().len(), s.asked_count());
    }

    fn current_answer(s: &QuizSession) -> String {
        s.current().unwrap().question.answer.clone()
    }

    #[test]
    fn test_new_session_starts_at_chapter_select() {
        let s = session(1);
        assert_eq!(s.state(), QuizState::ChapterSelect);
        assert!(s.current().is_none());
        assert_eq!(s.score(), 0);
        assert_invariants(&s);
    }

    #[test]
    fn test_choose_chapter_builds_pool() {
        let mut s = session(1);
        let event = s.choose_chapter("1").unwrap();
        assert_eq!(
            event,
            SessionEvent::LengthSelect {
                chapter: "1".to_string(),
                available: 3
            }
        );
        assert_eq!(s.state(), QuizState::LengthSelect);
        assert_eq!(s.pool().len(), 3);
    }

    #[test]
    fn test_length_is_capped_at_pool_size() {
        let mut s = session(1);
        s.choose_chapter("1").unwrap();
        assert_eq!(s.choose_length(10).unwrap(), SessionEvent::Started { total: 3 });
        assert_eq!(s.total_questions(), 3);
        assert_eq!(s.state(), QuizState::InProgress);
    }

    #[test]
    fn test_progress_tracks_answers() {
        let mut s = session(1);
        assert_eq!(s.progress(), 0.0);
        s.choose_chapter("2").unwrap();
        s.choose_length(2).unwrap();
        s.load_next_question().unwrap();
        assert_eq!(s.progress(), 0.0);
        let answer = current_answer(&s);
        s.submit_answer(&answer).unwrap();
        assert_eq!(s.progress(), 0.5);
        s.load_next_question().unwrap();
        let answer = current_answer(&s);
        s.submit_answer(&answer).unwrap();
        assert_eq!(s.progress(), 1.0);
        s.restart();
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn test_cancel_advance_drops_pending_deadline() {
        let mut s = session(1);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        let answer = current_answer(&s);
        s.submit_answer(&answer).unwrap();

        let now = Instant::now();
        assert!(s.schedule_advance(now, Duration::from_millis(10)));
        s.cancel_advance();
        assert!(!s.has_pending_advance());
        assert!(s.poll_advance(now + Duration::from_secs(1)).is_none());
        assert!(s.reveal().is_some());
    }

    #[test]
    fn test_zero_length_is_raised_to_one() {
        let mut s = session(1);
        s.choose_chapter("1").unwrap();
        s.choose_length(0).unwrap();
        assert_eq!(s.total_questions(), 1);
    }

    #[test]
    fn test_empty_chapter_returns_to_chapter_select() {
        let mut s = session(1);
        s.choose_chapter("4").unwrap();
        let err = s.choose_length(5).unwrap_err();
        assert!(matches!(err, QuizError::EmptyPool { ref chapter } if chapter == "4"));
        assert_eq!(s.state(), QuizState::ChapterSelect);
        assert!(s.pool().is_empty());
    }

    #[test]
    fn test_full_run_reaches_summary() {
        let mut s = session(9);
        s.choose_chapter("1").unwrap();
        s.choose_length(10).unwrap();
        for n in 1..=3 {
            assert_eq!(
                s.load_next_question().unwrap(),
                SessionEvent::QuestionPresented { number: n, total: 3 }
            );
            let answer = current_answer(&s);
            s.submit_answer(&answer).unwrap();
            assert_invariants(&s);
        }
        match s.load_next_question().unwrap() {
            SessionEvent::Completed(summary) => {
                assert_eq!(summary.score, 3);
                assert_eq!(summary.total, 3);
                assert_eq!(summary.percentage, 100.0);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(s.state(), QuizState::Summary);
        assert_eq!(s.asked_count(), 3);
    }

    #[test]
    fn test_wrong_answer_reveals_correct_one() {
        let mut s = session(2);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        let answer = current_answer(&s);
        let wrong = s
            .current()
            .unwrap()
            .options
            .iter()
            .find(|o| **o != answer)
            .cloned()
            .unwrap();
        match s.submit_answer(&wrong).unwrap() {
            SessionEvent::Answered(outcome) => {
                assert!(!outcome.correct);
                assert_eq!(outcome.correct_answer, answer);
                assert_eq!(outcome.selected, wrong);
            }
            other => panic!("expected answer outcome, got {other:?}"),
        }
        assert_eq!(s.score(), 0);
        assert_eq!(s.asked_count(), 1);
        let reveal = s.reveal().unwrap();
        assert!(!reveal.correct);
        assert_eq!(reveal.question.answer, answer);
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let mut s = session(3);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        let answer = current_answer(&s);
        s.submit_answer(&answer).unwrap();
        assert!(matches!(
            s.submit_answer(&answer),
            Err(QuizError::NoActiveQuestion)
        ));
        assert_eq!(s.score(), 1);
        assert_eq!(s.asked_count(), 1);
    }

    #[test]
    fn test_submit_without_question_is_rejected() {
        let mut s = session(3);
        assert!(matches!(
            s.submit_answer("A"),
            Err(QuizError::NoActiveQuestion)
        ));
    }

    #[test]
    fn test_load_while_answer_pending_is_rejected() {
        let mut s = session(3);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        assert!(matches!(
            s.load_next_question(),
            Err(QuizError::AnswerPending)
        ));
        assert_eq!(s.asked_count(), 0);
    }

    #[test]
    fn test_out_of_order_actions_leave_state_alone() {
        let mut s = session(4);
        assert!(matches!(
            s.choose_length(3),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert!(matches!(
            s.load_next_question(),
            Err(QuizError::InvalidTransition { .. })
        ));
        s.choose_chapter("1").unwrap();
        let err = s.choose_chapter("2").unwrap_err();
        assert_eq!(err.to_string(), "cannot choose a chapter during length selection");
        assert_eq!(s.chapter(), Some("1"));
        assert_eq!(s.state(), QuizState::LengthSelect);
    }

    #[test]
    fn test_no_repeats_within_a_quiz() {
        let mut s = session(5);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            s.load_next_question().unwrap();
            let id = s.current().unwrap().question.id.clone();
            assert!(seen.insert(id));
            s.submit_answer("nope").unwrap();
        }
    }

    #[test]
    fn test_hint_starts_hidden_and_toggles() {
        let mut s = session(6);
        s.choose_chapter("2").unwrap();
        s.choose_length(2).unwrap();
        s.load_next_question().unwrap();
        assert!(!s.current().unwrap().hint_visible);
        assert_eq!(s.toggle_hint().unwrap(), SessionEvent::HintToggled(true));
        assert_eq!(s.toggle_hint().unwrap(), SessionEvent::HintToggled(false));
        s.toggle_hint().unwrap();
        s.submit_answer("D").unwrap();
        s.load_next_question().unwrap();
        assert!(!s.current().unwrap().hint_visible);
    }

    #[test]
    fn test_restart_twice_is_idempotent() {
        let mut s = session(7);
        s.choose_chapter("2").unwrap();
        s.choose_length(2).unwrap();
        for _ in 0..2 {
            s.load_next_question().unwrap();
            let answer = current_answer(&s);
            s.submit_answer(&answer).unwrap();
        }
        s.load_next_question().unwrap();
        assert_eq!(s.state(), QuizState::Summary);

        for _ in 0..2 {
            assert_eq!(s.restart(), SessionEvent::Reset);
            assert_eq!(s.state(), QuizState::ChapterSelect);
            assert_eq!(s.score(), 0);
            assert_eq!(s.asked_count(), 0);
            assert_eq!(s.total_questions(), 0);
            assert!(s.asked_ids().is_empty());
            assert!(s.pool().is_empty());
            assert!(s.chapter().is_none());
            assert!(s.summary().is_none());
        }
    }

    #[test]
    fn test_scheduled_advance_loads_next_question() {
        let mut s = session(8);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        let t0 = Instant::now();
        assert!(!s.schedule_advance(t0, Duration::from_secs(2)));

        s.load_next_question().unwrap();
        s.submit_answer("A").unwrap();
        assert!(s.schedule_advance(t0, Duration::from_secs(2)));
        assert!(s.poll_advance(t0 + Duration::from_secs(1)).is_none());
        let event = s.poll_advance(t0 + Duration::from_secs(2)).unwrap().unwrap();
        assert_eq!(event, SessionEvent::QuestionPresented { number: 2, total: 3 });
        assert!(!s.has_pending_advance());
    }

    #[test]
    fn test_restart_cancels_pending_advance() {
        let mut s = session(8);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        s.submit_answer("A").unwrap();
        let t0 = Instant::now();
        s.schedule_advance(t0, Duration::from_millis(100));
        s.restart();
        assert!(!s.has_pending_advance());
        assert!(s.poll_advance(t0 + Duration::from_secs(1)).is_none());
        assert_eq!(s.state(), QuizState::ChapterSelect);
    }

    #[test]
    fn test_manual_advance_cancels_pending_one() {
        let mut s = session(8);
        s.choose_chapter("1").unwrap();
        s.choose_length(3).unwrap();
        s.load_next_question().unwrap();
        s.submit_answer("A").unwrap();
        let t0 = Instant::now();
        s.schedule_advance(t0, Duration::from_millis(100));
        s.load_next_question().unwrap();
        assert!(!s.has_pending_advance());
        // The stale deadline must not skip the question now on screen.
        assert!(s.poll_advance(t0 + Duration::from_secs(1)).is_none());
        assert!(s.current().is_some());
    }

    #[test]
    fn test_quiz_length_requested() {
        assert_eq!(QuizLength::Mini.requested(10, 25), 10);
        assert_eq!(QuizLength::Full.requested(10, 25), 25);
        assert_eq!(QuizLength::Custom(4).requested(10, 25), 4);
    }
}
