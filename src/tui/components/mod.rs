pub mod chat_view;
pub mod input_box;
pub mod status_bar;

use ratatui::{layout::Rect, Frame};
use crate::tui::{Event, Theme};

pub use chat_view::ChatView;
pub use input_box::InputBox;
pub use status_bar::{ExchangeStatus, StatusBar};

/// Base trait for all TUI components
pub trait Component {
    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Handle input events
    fn handle_event(&mut self, event: &Event) -> bool;
}
