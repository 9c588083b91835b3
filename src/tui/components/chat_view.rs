use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use launchpad::chat::{Message, Origin};

use crate::tui::{components::Component, Event, Theme};

const PAGE_SIZE: usize = 10;

pub struct ChatView {
    messages: Vec<Message>,
    pending: bool,
    auto_scroll: bool,
    title: String,
    scroll_offset: usize,
}

impl ChatView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            pending: false,
            auto_scroll: true,
            title: title.into(),
            scroll_offset: 0,
        }
    }

    pub fn set_messages(&mut self, messages: Vec<Message>, pending: bool) {
        let grew = messages.len() > self.messages.len();
        self.messages = messages;
        self.pending = pending;
        if grew && self.auto_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.auto_scroll = false;
        }
    }

    pub fn scroll_down(&mut self) {
        // Clamped in render, which also restores auto-scroll at the bottom
        self.scroll_offset = self.scroll_offset.saturating_add(1);
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX;
        self.auto_scroll = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    fn origin_indicator(origin: Origin, theme: &Theme) -> (&'static str, Style) {
        match origin {
            Origin::User => ("You", theme.user()),
            Origin::Assistant => ("Assistant", theme.assistant()),
        }
    }

    /// Word-wrap by display width. Words wider than the line are split by character.
    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        if width < 10 {
            return text.lines().map(str::to_string).collect();
        }

        let mut lines = Vec::new();
        for line in text.lines() {
            if line.width() <= width {
                lines.push(line.to_string());
                continue;
            }

            let mut current = String::new();
            let mut current_width = 0;
            for word in line.split_whitespace() {
                let word_width = word.width();
                let needed = if current.is_empty() { word_width } else { word_width + 1 };

                if current_width + needed <= width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    current_width += needed;
                    continue;
                }

                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }

                if word_width <= width {
                    current.push_str(word);
                    current_width = word_width;
                } else {
                    for ch in word.chars() {
                        let ch_width = ch.width().unwrap_or(0);
                        if current_width + ch_width > width {
                            lines.push(std::mem::take(&mut current));
                            current_width = 0;
                        }
                        current.push(ch);
                        current_width += ch_width;
                    }
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }

    fn build_lines(&self, content_width: usize, theme: &Theme) -> Vec<Line<'static>> {
        let mut all_lines = Vec::new();

        for message in &self.messages {
            let (label, style) = Self::origin_indicator(message.origin, theme);
            let timestamp = message.timestamp.with_timezone(&Local).format("%H:%M").to_string();

            all_lines.push(Line::from(vec![
                Span::styled(label, style),
                Span::raw(" "),
                Span::styled(timestamp, theme.muted()),
                Span::styled(format!(" #{}", message.id), theme.muted()),
            ]));

            for line in Self::wrap_text(&message.text, content_width.saturating_sub(2)) {
                all_lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(line, theme.normal()),
                ]));
            }

            all_lines.push(Line::from(""));
        }

        if self.pending {
            all_lines.push(Line::from(Span::styled(
                "Assistant is typing...",
                theme.waiting(),
            )));
        }

        all_lines
    }
}

impl Component for ChatView {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.frame(false))
            .title(format!(" {} ", self.title));

        if self.messages.is_empty() && !self.pending {
            let empty = Paragraph::new("No messages yet. Ask anything about your startup!")
                .block(block)
                .alignment(Alignment::Center)
                .style(theme.muted());
            frame.render_widget(empty, area);
            return;
        }

        let content_width = area.width.saturating_sub(4) as usize;
        let content_height = area.height.saturating_sub(2) as usize;

        let all_lines = self.build_lines(content_width, theme);
        let total_lines = all_lines.len();
        let max_scroll = total_lines.saturating_sub(content_height);

        if self.auto_scroll || self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
            self.auto_scroll = true;
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(content_height)
            .collect();

        frame.render_widget(Paragraph::new(visible_lines).block(block), area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent { code, modifiers, .. }) = event else {
            return false;
        };

        match code {
            KeyCode::Up => self.scroll_up(),
            KeyCode::Down => self.scroll_down(),
            KeyCode::PageUp => {
                for _ in 0..PAGE_SIZE {
                    self.scroll_up();
                }
            }
            KeyCode::PageDown => {
                for _ in 0..PAGE_SIZE {
                    self.scroll_down();
                }
            }
            KeyCode::Home if modifiers.contains(KeyModifiers::CONTROL) => self.scroll_to_top(),
            KeyCode::End if modifiers.contains(KeyModifiers::CONTROL) => self.scroll_to_bottom(),
            _ => return false,
        }
        true
    }
}
