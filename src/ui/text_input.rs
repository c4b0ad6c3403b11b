use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Single-line input rendered as a centered popup.
pub struct TextInput {
    label: String,
    value: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    placeholder: Option<String>,
    digits_only: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            digits_only: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Only accept ASCII digits, for id fields.
    pub const fn digits_only(mut self) -> Self {
        self.digits_only = true;
        self
    }

    #[cfg(test)]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Insert pasted text at the cursor. Line breaks are dropped, and so is
    /// anything `digits_only` would reject when typed.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn insert_char(&mut self, c: char) {
        if self.digits_only && !c.is_ascii_digit() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    const fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        // Skip trailing spaces, then the word itself
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let start = self.byte_index(pos);
        let end = self.byte_index(self.cursor);
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            (KeyCode::Left, _) => {
                self.move_cursor_left();
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.move_cursor_right();
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            _ => EventResult::Consumed, // Consume all keys to prevent propagation
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(3));
        frame.render_widget(Clear, popup_area);

        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.overlay0());

        let line = match &self.placeholder {
            Some(placeholder) if self.value.is_empty() => Line::from(vec![
                Span::styled(" ", cursor_style),
                Span::styled(placeholder.clone(), placeholder_style),
            ]),
            _ => {
                let before: String = self.value.chars().take(self.cursor).collect();
                let mut rest = self.value.chars().skip(self.cursor);
                let at = rest.next().unwrap_or(' ');
                let after: String = rest.collect();
                Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(at.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ])
            }
        };

        let title = format!(" {} (Enter to confirm, Esc to cancel) ", self.label);
        let block = Block::default()
            .title(title)
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.lavender()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(line).block(block), popup_area);
    }
}
