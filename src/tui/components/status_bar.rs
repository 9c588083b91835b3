use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use launchpad::chat::Session;

use crate::tui::{components::Component, Event, Theme};

pub struct StatusBar {
    status_message: String,
    provider_info: String,
    exchange_status: ExchangeStatus,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExchangeStatus {
    Idle,
    Waiting,
    Failed(&'static str),
}

impl ExchangeStatus {
    /// Derived from a session snapshot: pending wins, then the outcome of the last exchange.
    pub fn from_session(session: &Session) -> Self {
        if session.pending {
            Self::Waiting
        } else if let Some(failure) = &session.last_failure {
            Self::Failed(failure.kind())
        } else {
            Self::Idle
        }
    }
}

impl StatusBar {
    pub fn new(provider: &str) -> Self {
        Self {
            status_message: "Ready".to_string(),
            provider_info: format!("provider: {}", provider),
            exchange_status: ExchangeStatus::Idle,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn set_exchange_status(&mut self, status: ExchangeStatus) {
        self.exchange_status = status;
    }

    fn exchange_indicator(&self, theme: &Theme) -> (&'static str, Style) {
        match &self.exchange_status {
            ExchangeStatus::Idle => ("●", theme.idle()),
            ExchangeStatus::Waiting => ("◐", theme.waiting()),
            ExchangeStatus::Failed(_) => ("●", theme.failure()),
        }
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (symbol, style) = self.exchange_indicator(theme);
        let label = match &self.exchange_status {
            ExchangeStatus::Idle => "Idle".to_string(),
            ExchangeStatus::Waiting => "Waiting for reply...".to_string(),
            ExchangeStatus::Failed(kind) => format!("Last reply failed ({})", kind),
        };

        let status_line = Line::from(vec![
            Span::styled(self.status_message.as_str(), theme.normal()),
            Span::raw(" | "),
            Span::styled(self.provider_info.as_str(), theme.user()),
            Span::raw(" | "),
            Span::styled(symbol, style),
            Span::raw(" "),
            Span::styled(label, theme.muted()),
            Span::raw(" | "),
            Span::styled("Enter: Send", theme.muted()),
            Span::raw(" | "),
            Span::styled("Ctrl+Q: Quit", theme.muted()),
        ]);

        let paragraph = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::TOP).border_style(theme.frame(false)))
            .alignment(Alignment::Left);

        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, _event: &Event) -> bool {
        false
    }
}
