use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use kotoba::session::{ActiveQuestion, Reveal};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Correct,
    Wrong,
}

/// How an option is marked once the answer is revealed: the right answer is
/// always ticked, a wrong pick is crossed, everything else stays plain.
pub fn option_mark(option: &str, answer: &str, chosen: &str) -> OptionMark {
    if option == answer {
        OptionMark::Correct
    } else if option == chosen {
        OptionMark::Wrong
    } else {
        OptionMark::Plain
    }
}

pub struct QuestionCard<'a> {
    prompt: &'a str,
    hint: &'a str,
    hint_visible: bool,
    options: &'a [String],
    selected: usize,
    /// `(answer, chosen)` once the question has been answered.
    revealed: Option<(&'a str, &'a str)>,
    theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn asking(active: &'a ActiveQuestion, selected: usize, theme: &'a Theme) -> Self {
        Self {
            prompt: &active.question.prompt,
            hint: &active.question.hint,
            hint_visible: active.hint_visible,
            options: &active.options,
            selected,
            revealed: None,
            theme,
        }
    }

    pub fn revealed(reveal: &'a Reveal, theme: &'a Theme) -> Self {
        Self {
            prompt: &reveal.question.prompt,
            hint: &reveal.question.hint,
            hint_visible: true,
            options: &reveal.options,
            selected: usize::MAX,
            revealed: Some((reveal.question.answer.as_str(), reveal.selected.as_str())),
            theme,
        }
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            self.prompt,
            Style::default()
                .fg(colors.fg())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(layout[1], buf);

        let hint_line = if self.hint_visible {
            Line::from(Span::styled(self.hint, Style::default().fg(colors.hint())))
        } else {
            Line::from(Span::styled("[h] show hint", Style::default().fg(colors.dim())))
        };
        Paragraph::new(hint_line)
            .alignment(Alignment::Center)
            .render(layout[2], buf);

        let mut lines = Vec::with_capacity(self.options.len() * 2);
        for (i, option) in self.options.iter().enumerate() {
            let (marker, style) = match self.revealed {
                Some((answer, chosen)) => match option_mark(option, answer, chosen) {
                    OptionMark::Correct => (
                        "\u{2714}",
                        Style::default()
                            .fg(colors.success())
                            .add_modifier(Modifier::BOLD),
                    ),
                    OptionMark::Wrong => (
                        "\u{2718}",
                        Style::default()
                            .fg(colors.error())
                            .add_modifier(Modifier::BOLD),
                    ),
                    OptionMark::Plain => (" ", Style::default().fg(colors.dim())),
                },
                None if i == self.selected => (
                    ">",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                None => (" ", Style::default().fg(colors.fg())),
            };
            lines.push(Line::from(Span::styled(
                format!("  {marker} [{}] {option}", i + 1),
                style,
            )));
            lines.push(Line::from(""));
        }
        Paragraph::new(lines).render(layout[3], buf);
    }
}
