use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Titled list of selectable items; used for chapter and quiz length selection.
pub struct Menu<'a> {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(title: &str, subtitle: &str, items: Vec<MenuItem>, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            items,
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    /// Index of the item bound to `key`, if any.
    pub fn find_key(&self, key: char) -> Option<usize> {
        if key.is_whitespace() {
            return None;
        }
        self.items
            .iter()
            .position(|item| item.key.chars().eq(std::iter::once(key)))
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                &*self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&*self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            if i >= menu_layout.len() {
                break;
            }
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let key = if item.key.is_empty() {
                "   ".to_string()
            } else {
                format!("[{}]", item.key)
            };
            let label_text = format!(" {indicator} {key} {label}", label = item.label);
            let desc_text = format!("       {}", item.description);

            let label_style = Style::default()
                .fg(if is_selected { colors.accent() } else { colors.fg() })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.dim()))),
            ];
            Paragraph::new(lines).render(menu_layout[i], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(theme: &Theme) -> Menu<'_> {
        Menu::new(
            "Pick",
            "one",
            vec![
                MenuItem::new("1", "Chapter 1", "15 questions"),
                MenuItem::new("2", "Chapter 2", "16 questions"),
                MenuItem::new("b", "Back", ""),
            ],
            theme,
        )
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let theme = Theme::default();
        let mut m = menu(&theme);
        m.prev();
        assert_eq!(m.selected, 2);
        m.next();
        assert_eq!(m.selected, 0);
    }

    #[test]
    fn test_find_key_matches_single_char_keys() {
        let theme = Theme::default();
        let m = menu(&theme);
        assert_eq!(m.find_key('2'), Some(1));
        assert_eq!(m.find_key('b'), Some(2));
        assert_eq!(m.find_key('x'), None);
    }

    #[test]
    fn test_unbound_items_never_match_a_key() {
        let theme = Theme::default();
        let m = Menu::new(
            "Pick",
            "",
            vec![
                MenuItem::new("1", "Chapter 1", ""),
                MenuItem::new("", "Chapter 10", ""),
                MenuItem::new(" ", "Chapter 11", ""),
            ],
            &theme,
        );
        assert_eq!(m.find_key(' '), None);
        assert_eq!(m.find_key('1'), Some(0));
    }

    #[test]
    fn test_empty_menu_navigation_is_a_no_op() {
        let theme = Theme::default();
        let mut m = Menu::new("Empty", "", Vec::new(), &theme);
        m.next();
        m.prev();
        assert_eq!(m.selected, 0);
    }
}
