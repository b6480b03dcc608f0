use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use kotoba::engine::scoring::Grade;
use kotoba::session::QuizSummary;

use crate::ui::theme::Theme;

pub struct SummaryCard<'a> {
    pub summary: &'a QuizSummary,
    pub theme: &'a Theme,
}

impl<'a> SummaryCard<'a> {
    pub fn new(summary: &'a QuizSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

impl Widget for SummaryCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            format!("Chapter {}", self.summary.chapter),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let grade_color = match self.summary.grade {
            Grade::Excellent => colors.success(),
            Grade::Good => colors.accent(),
            Grade::Fair => colors.warning(),
            Grade::NeedsPractice => colors.error(),
        };

        let score_line = Line::from(vec![
            Span::styled("  Final score: ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{}/{}", self.summary.score, self.summary.total),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let pct_line = Line::from(vec![
            Span::styled("  Percentage:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}%", self.summary.percentage),
                Style::default().fg(grade_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(pct_line).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            format!("  {}", self.summary.grade.label()),
            Style::default().fg(grade_color),
        )))
        .render(layout[3], buf);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(
                "  [Enter] Return to chapter selection  ",
                Style::default().fg(colors.accent()),
            ),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]));
        help.render(layout[5], buf);
    }
}
