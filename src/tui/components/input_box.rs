use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthChar;

use crate::tui::{components::Component, Event, Theme};

#[derive(Debug, Clone)]
pub struct InputBox {
    input: Input,
    placeholder: String,
    is_multiline_mode: bool,
    lines: Vec<String>,
    locked: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            placeholder: "Ask about your startup... (Enter: Send, Tab: Multiline)".to_string(),
            is_multiline_mode: false,
            lines: Vec::new(),
            locked: false,
        }
    }

    /// Submission is disabled while a reply is outstanding; typing still works.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn clear(&mut self) {
        self.input.reset();
        self.lines.clear();
        self.is_multiline_mode = false;
    }

    pub fn get_content(&self) -> String {
        if self.is_multiline_mode {
            self.lines.join("\n")
        } else {
            self.input.value().to_string()
        }
    }

    fn toggle_multiline_mode(&mut self) {
        if self.is_multiline_mode {
            let content = self.lines.join(" ");
            self.input = Input::new(content);
            self.lines.clear();
            self.is_multiline_mode = false;
        } else {
            if !self.input.value().is_empty() {
                self.lines = vec![self.input.value().to_string()];
            }
            self.input.reset();
            self.is_multiline_mode = true;
        }
    }

    fn handle_multiline_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.lines.push(String::new());
                true
            }
            KeyCode::Enter => false,
            KeyCode::Tab => {
                self.toggle_multiline_mode();
                true
            }
            KeyCode::Backspace => {
                let line_count = self.lines.len();
                match self.lines.last_mut() {
                    Some(last) if last.is_empty() && line_count > 1 => {
                        self.lines.pop();
                    }
                    Some(last) => {
                        last.pop();
                    }
                    None => {}
                }
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                match self.lines.last_mut() {
                    Some(last) => last.push(c),
                    None => self.lines.push(c.to_string()),
                }
                true
            }
            _ => false,
        }
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = match (self.is_multiline_mode, self.locked) {
            (_, true) => " Message (waiting for reply) ",
            (true, false) => " Message (Multiline Mode) ",
            (false, false) => " Message ",
        };

        let border_style = theme.frame(!self.locked);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title);

        if self.is_multiline_mode {
            let content: Vec<Line> = if self.lines.is_empty() {
                vec![Line::from(Span::styled(self.placeholder.as_str(), theme.muted()))]
            } else {
                self.lines.iter().map(|line| Line::from(line.as_str())).collect()
            };

            let paragraph = Paragraph::new(content)
                .block(block)
                .wrap(Wrap { trim: false })
                .style(theme.normal());
            frame.render_widget(paragraph, area);
            return;
        }

        if self.input.value().is_empty() {
            let content = Line::from(Span::styled(self.placeholder.as_str(), theme.muted()));
            frame.render_widget(Paragraph::new(content).block(block).style(theme.normal()), area);
            frame.set_cursor(area.x + 1, area.y + 1);
            return;
        }

        let available_width = area.width.saturating_sub(2) as usize;
        let cursor_pos = self.input.visual_cursor();

        // Horizontal scroll so the cursor stays visible
        let scroll_offset = if cursor_pos >= available_width {
            cursor_pos + 1 - available_width
        } else {
            0
        };

        let mut skipped = 0;
        let mut visible_width = 0;
        let mut visible_text = String::new();
        for ch in self.input.value().chars() {
            let ch_width = ch.width().unwrap_or(0);
            if skipped < scroll_offset {
                skipped += ch_width;
                continue;
            }
            if visible_width + ch_width > available_width {
                break;
            }
            visible_text.push(ch);
            visible_width += ch_width;
        }

        let paragraph = Paragraph::new(Line::from(visible_text))
            .block(block)
            .style(theme.normal());
        frame.render_widget(paragraph, area);

        let cursor_x = area.x + 1 + cursor_pos.saturating_sub(scroll_offset) as u16;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };

        if self.is_multiline_mode {
            return self.handle_multiline_key(*key);
        }

        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.toggle_multiline_mode();
                true
            }
            // Send is handled by the app
            KeyCode::Enter => false,
            KeyCode::Tab => {
                self.toggle_multiline_mode();
                true
            }
            // Scrolling keys belong to the chat view
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => false,
            _ if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => false,
            _ => {
                self.input.handle_event(&crossterm::event::Event::Key(*key));
                true
            }
        }
    }
}
