use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    Frame,
};
use tracing::debug;

use launchpad::chat::{ChatSessionManager, Session, SessionError};

use crate::tui::{
    components::{ChatView, Component, ExchangeStatus, InputBox, StatusBar},
    Event, Theme,
};

const CHAT_TITLE: &str = "AI Decision Assistant";
const BUSY_STATUS: &str = "Still waiting for the previous reply";

pub struct App {
    // Components
    chat_view: ChatView,
    input_box: InputBox,
    status_bar: StatusBar,

    // State
    theme: Theme,
    should_quit: bool,

    manager: ChatSessionManager,
}

impl App {
    pub fn new(manager: ChatSessionManager, theme: Theme) -> Self {
        let mut app = Self {
            chat_view: ChatView::new(CHAT_TITLE),
            input_box: InputBox::new(),
            status_bar: StatusBar::new(manager.provider_name()),
            theme,
            should_quit: false,
            manager,
        };

        let session = app.manager.session();
        app.sync_session(session);
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: Event) {
        match &event {
            Event::Key(key) => {
                if self.handle_global_keys(*key) {
                    return;
                }
                if self.input_box.handle_event(&event) {
                    return;
                }
                if key.code == KeyCode::Enter {
                    self.submit();
                    return;
                }
                self.chat_view.handle_event(&event);
            }
            Event::SessionUpdated(session) => {
                self.sync_session(session.clone());
                if !session.pending {
                    self.status_bar.set_status("Ready");
                }
            }
            Event::Tick | Event::Resize(_, _) => {}
        }
    }

    fn handle_global_keys(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.should_quit = true;
                true
            }
            _ => false,
        }
    }

    fn submit(&mut self) {
        let content = self.input_box.get_content();

        match self.manager.send(&content) {
            Ok(session) => {
                if !content.trim().is_empty() {
                    self.input_box.clear();
                    self.chat_view.scroll_to_bottom();
                    self.status_bar.set_status("Sent");
                }
                self.sync_session(session);
            }
            Err(SessionError::SessionBusy) => {
                debug!("Submit ignored while a reply is pending");
                self.status_bar.set_status(BUSY_STATUS);
            }
        }
    }

    fn sync_session(&mut self, session: Session) {
        self.input_box.set_locked(session.pending);
        self.status_bar.set_exchange_status(ExchangeStatus::from_session(&session));
        self.chat_view.set_messages(session.messages, session.pending);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.size();
        frame.render_widget(Block::default().style(self.theme.normal()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);

        self.chat_view.render(frame, chunks[0], &self.theme);
        self.input_box.render(frame, chunks[1], &self.theme);
        self.status_bar.render(frame, chunks[2], &self.theme);
    }
}
