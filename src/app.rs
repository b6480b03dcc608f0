use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use kotoba::bank::QuestionBank;
use kotoba::config::Config;
use kotoba::session::{
    AnswerOutcome, QuizError, QuizLength, QuizSession, QuizState, SessionEvent,
};

use crate::ui::components::menu::{Menu, MenuItem};
use crate::ui::theme::Theme;

const LENGTH_CHOICES: [QuizLength; 2] = [QuizLength::Mini, QuizLength::Full];

pub struct App {
    pub session: QuizSession,
    pub config: Config,
    pub theme: &'static Theme,
    pub chapters: Vec<String>,
    pub chapter_menu: Menu<'static>,
    pub length_menu: Menu<'static>,
    pub option_selected: usize,
    pub last_outcome: Option<AnswerOutcome>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, bank: Arc<QuestionBank>, theme: &'static Theme) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let chapters = if config.chapters.is_empty() {
            bank.chapters().to_vec()
        } else {
            config.chapters.clone()
        };
        let chapter_menu = chapter_menu(&chapters, &bank, theme);
        let length_menu = Menu::new("", "", Vec::new(), theme);

        Self {
            session: QuizSession::new(bank, rng),
            config,
            theme,
            chapters,
            chapter_menu,
            length_menu,
            option_selected: 0,
            last_outcome: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn state(&self) -> QuizState {
        self.session.state()
    }

    pub fn select_chapter(&mut self, index: usize) {
        let Some(chapter) = self.chapters.get(index).cloned() else {
            return;
        };
        self.chapter_menu.selected = index;
        self.status = None;
        let result = self.session.choose_chapter(&chapter);
        self.apply(result);
    }

    pub fn select_length(&mut self, index: usize) {
        let Some(length) = LENGTH_CHOICES.get(index).copied() else {
            self.back_to_chapters();
            return;
        };
        let requested = length.requested(self.config.mini_quiz_length, self.session.pool().len());
        let result = self.session.choose_length(requested);
        let started = result.is_ok();
        self.apply(result);
        if started {
            let first = self.session.load_next_question();
            self.apply(first);
        }
    }

    /// Answer with the option at `index` (0-based) of the question on screen.
    pub fn answer(&mut self, index: usize) {
        let Some(option) = self
            .session
            .current()
            .and_then(|active| active.options.get(index))
            .cloned()
        else {
            return;
        };
        let result = self.session.submit_answer(&option);
        let answered = result.is_ok();
        self.apply(result);
        if answered && self.config.auto_advance {
            self.session
                .schedule_advance(Instant::now(), self.config.reveal_delay());
        }
    }

    pub fn answer_selected(&mut self) {
        self.answer(self.option_selected);
    }

    /// Skip the remaining reveal delay and move on.
    pub fn advance(&mut self) {
        if self.session.reveal().is_none() {
            return;
        }
        let result = self.session.load_next_question();
        self.apply(result);
    }

    pub fn toggle_hint(&mut self) {
        let result = self.session.toggle_hint();
        self.apply(result);
    }

    /// Turn the delayed advance on or off for the rest of the run.
    pub fn toggle_auto_advance(&mut self) {
        self.config.auto_advance = !self.config.auto_advance;
        if self.config.auto_advance {
            self.session
                .schedule_advance(Instant::now(), self.config.reveal_delay());
        } else {
            self.session.cancel_advance();
        }
        info!("auto-advance {}", if self.config.auto_advance { "on" } else { "off" });
    }

    pub fn back_to_chapters(&mut self) {
        let event = self.session.restart();
        self.apply(Ok(event));
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(result) = self.session.poll_advance(now) {
            self.apply(result);
        }
    }

    pub fn option_next(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.option_selected = (self.option_selected + 1) % count;
        }
    }

    pub fn option_prev(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.option_selected = (self.option_selected + count - 1) % count;
        }
    }

    fn option_count(&self) -> usize {
        self.session
            .current()
            .map(|active| active.options.len())
            .unwrap_or(0)
    }

    fn apply(&mut self, result: Result<SessionEvent, QuizError>) {
        match result {
            Ok(SessionEvent::LengthSelect { chapter, available }) => {
                self.length_menu = length_menu(
                    &chapter,
                    available,
                    self.config.mini_quiz_length,
                    self.theme,
                );
            }
            Ok(SessionEvent::Started { total }) => {
                info!(
                    "starting chapter {} quiz with {total} questions",
                    self.session.chapter().unwrap_or_default()
                );
                self.last_outcome = None;
            }
            Ok(SessionEvent::QuestionPresented { .. }) => {
                self.option_selected = 0;
            }
            Ok(SessionEvent::Answered(outcome)) => {
                self.last_outcome = Some(outcome);
            }
            Ok(SessionEvent::HintToggled(_)) => {}
            Ok(SessionEvent::Completed(summary)) => {
                info!(
                    "chapter {} finished: {}/{} ({:.1}%)",
                    summary.chapter, summary.score, summary.total, summary.percentage
                );
            }
            Ok(SessionEvent::Reset) => {
                self.option_selected = 0;
                self.last_outcome = None;
            }
            Err(QuizError::EmptyPool { chapter }) => {
                self.status = Some(format!("Chapter {chapter} has no questions yet"));
            }
            Err(err @ (QuizError::NoActiveQuestion | QuizError::AnswerPending)) => {
                debug!("ignored input: {err}");
            }
            Err(err) => {
                warn!("quiz action failed: {err}");
                self.status = Some(err.to_string());
            }
        }
    }
}

fn chapter_menu(chapters: &[String], bank: &QuestionBank, theme: &'static Theme) -> Menu<'static> {
    let items = chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            // Only the first nine chapters get a digit; the rest are reached with the cursor.
            let key = if i < 9 { (i + 1).to_string() } else { String::new() };
            let count = bank.questions_in_chapter(chapter).len();
            MenuItem::new(key, format!("Chapter {chapter}"), format!("{count} questions"))
        })
        .collect();
    Menu::new("kotoba", "Select a chapter", items, theme)
}

fn length_menu(chapter: &str, available: usize, mini: usize, theme: &'static Theme) -> Menu<'static> {
    let items = vec![
        MenuItem::new(
            "1",
            format!("Mini quiz ({} questions)", mini.min(available)),
            "A quick round",
        ),
        MenuItem::new(
            "2",
            format!("Full chapter ({available} questions)"),
            "Every question in the chapter",
        ),
        MenuItem::new("3", "Back", "Return to chapter selection"),
    ];
    Menu::new(
        &format!("Chapter {chapter}"),
        &format!("Available questions: {available}"),
        items,
        theme,
    )
}
