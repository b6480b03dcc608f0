mod app;
mod event;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use kotoba::bank::QuestionBank;
use kotoba::config::Config;
use kotoba::logging;
use kotoba::session::QuizState;

use app::App;
use event::{AppEvent, EventHandler};
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::summary::SummaryCard;
use ui::layout::{ScreenLayout, centered_rect};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "kotoba", version, about = "Terminal vocabulary quiz")]
struct Cli {
    #[arg(short, long, help = "CSV question bank (id,chapter,answer,prompt,hint,category)")]
    bank: Option<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Number of questions in a mini quiz")]
    length: Option<usize>,

    #[arg(short, long, help = "Seed for question and option order")]
    seed: Option<u64>,

    #[arg(long, help = "Wait for a key press after each answer")]
    no_auto_advance: bool,

    #[arg(long, help = "Write the effective settings to the config file and exit")]
    save_config: bool,
}

/// Leaves raw mode and the alternate screen when dropped, so any early return
/// after terminal setup hands back a usable shell.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            log::warn!("failed to leave raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            log::warn!("failed to restore the screen: {err}");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = logging::init() {
        eprintln!("Warning: logging disabled: {err:#}");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        log::warn!("ignoring unreadable config: {err:#}");
        Config::default()
    });
    if let Some(bank) = cli.bank {
        config.question_bank = Some(bank);
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(length) = cli.length {
        config.mini_quiz_length = length;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.no_auto_advance {
        config.auto_advance = false;
    }
    config.validate();

    if cli.save_config {
        let path = Config::config_path();
        config
            .save_to(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved settings to {}", path.display());
        return Ok(());
    }

    // A missing or unreadable bank is fatal before the terminal is touched.
    let bank = match &config.question_bank {
        Some(path) => QuestionBank::load_path(path)
            .with_context(|| format!("failed to load quiz questions from {}", path.display()))?,
        None => QuestionBank::embedded().context("failed to load the bundled quiz questions")?,
    };
    if bank.is_empty() {
        anyhow::bail!("the question bank contains no usable questions");
    }

    let loaded_theme = Theme::load(&config.theme).unwrap_or_else(|| {
        log::warn!(
            "unknown theme {:?}, available: {}",
            config.theme,
            Theme::available_themes().join(", ")
        );
        Theme::default()
    });
    log::info!("using theme {}", loaded_theme.name);
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
    let mut app = App::new(config, Arc::new(bank), theme);

    let result = {
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        let events = EventHandler::new(Duration::from_millis(100));
        run_app(&mut terminal, &mut app, &events)
    };

    if let Err(err) = result {
        log::error!("quiz loop failed: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.state() {
        QuizState::ChapterSelect => handle_chapter_key(app, key),
        QuizState::LengthSelect => handle_length_key(app, key),
        QuizState::InProgress => handle_quiz_key(app, key),
        QuizState::Summary => handle_summary_key(app, key),
    }
}

fn handle_chapter_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.chapter_menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.chapter_menu.next(),
        KeyCode::Enter => app.select_chapter(app.chapter_menu.selected),
        KeyCode::Char(ch) => {
            if let Some(index) = app.chapter_menu.find_key(ch) {
                app.select_chapter(index);
            }
        }
        _ => {}
    }
}

fn handle_length_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_chapters(),
        KeyCode::Up | KeyCode::Char('k') => app.length_menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.length_menu.next(),
        KeyCode::Enter => app.select_length(app.length_menu.selected),
        KeyCode::Char('m') => app.select_length(0),
        KeyCode::Char('f') => app.select_length(1),
        KeyCode::Char(ch) => {
            if let Some(index) = app.length_menu.find_key(ch) {
                app.select_length(index);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.back_to_chapters();
        return;
    }

    if app.session.current().is_some() {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.option_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.option_next(),
            KeyCode::Enter => app.answer_selected(),
            KeyCode::Char('h') => app.toggle_hint(),
            KeyCode::Char('a') => app.toggle_auto_advance(),
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch as usize - '1' as usize;
                app.answer(index);
            }
            _ => {}
        }
    } else {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.advance(),
            KeyCode::Char('a') => app.toggle_auto_advance(),
            _ => {}
        }
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Esc => app.back_to_chapters(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = ScreenLayout::new(area);
    render_header(frame, app, layout.header);

    match app.state() {
        QuizState::ChapterSelect => {
            let menu_area = centered_rect(50, 80, layout.main);
            frame.render_widget(&app.chapter_menu, menu_area);
        }
        QuizState::LengthSelect => {
            let menu_area = centered_rect(50, 70, layout.main);
            frame.render_widget(&app.length_menu, menu_area);
        }
        QuizState::InProgress => render_quiz(frame, app, layout.main),
        QuizState::Summary => {
            if let Some(summary) = app.session.summary() {
                let card_area = centered_rect(50, 50, layout.main);
                frame.render_widget(SummaryCard::new(&summary, app.theme), card_area);
            }
        }
    }

    let footer_text = match app.state() {
        QuizState::ChapterSelect => " [1-9] Chapter  [Enter] Select  [q] Quit ",
        QuizState::LengthSelect => " [m] Mini  [f] Full chapter  [b] Back ",
        QuizState::InProgress if app.session.current().is_some() => {
            " [1-4] Answer  [h] Hint  [a] Auto-advance  [ESC] Chapters "
        }
        QuizState::InProgress => " [Enter/Space] Next  [a] Auto-advance  [ESC] Chapters ",
        QuizState::Summary => " [Enter] Chapters  [q] Quit ",
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_text,
        Style::default().fg(colors.dim()),
    )));
    frame.render_widget(footer, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;

    let info = match app.session.chapter() {
        Some(chapter) if app.state() == QuizState::InProgress => format!(
            " Chapter {chapter} | Question {}/{} | Score {}/{}",
            (app.session.asked_count() + 1).min(app.session.total_questions()),
            app.session.total_questions(),
            app.session.score(),
            app.session.asked_count(),
        ),
        Some(chapter) => format!(" Chapter {chapter}"),
        None => format!(" {} questions", app.session.bank().len()),
    };

    let mut spans = vec![
        Span::styled(
            " kotoba ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.dim()).bg(colors.header_bg())),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  {status}"),
            Style::default().fg(colors.warning()).bg(colors.header_bg()),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let centered = centered_rect(60, 90, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(12),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(centered);

    if let Some(active) = app.session.current() {
        frame.render_widget(
            QuestionCard::asking(active, app.option_selected, app.theme),
            layout[0],
        );
    } else if let Some(reveal) = app.session.reveal() {
        frame.render_widget(QuestionCard::revealed(reveal, app.theme), layout[0]);
    }

    if let Some(outcome) = &app.last_outcome {
        if app.session.current().is_none() {
            let (text, color) = if outcome.correct {
                ("  Correct!".to_string(), colors.success())
            } else {
                (
                    format!("  Incorrect. The answer is {}", outcome.correct_answer),
                    colors.error(),
                )
            };
            let mut spans = vec![Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            if let Some(remaining) = app.session.advance_remaining(Instant::now()) {
                spans.push(Span::styled(
                    format!("  (next in {:.1}s)", remaining.as_secs_f64()),
                    Style::default().fg(colors.dim()),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), layout[1]);
        }
    }

    let progress = ProgressBar::new(
        "Progress",
        app.session.progress(),
        format!("{}/{}", app.session.asked_count(), app.session.total_questions()),
        app.theme,
    );
    frame.render_widget(progress, layout[2]);
}
