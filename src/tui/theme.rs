use ratatui::style::{Color, Modifier, Style};

/// Colors for the chat screen, keyed by what they mark rather than by hue.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub frame: Color,
    pub active_frame: Color,
    pub user: Color,
    pub assistant: Color,
    pub waiting: Color,
    pub failure: Color,
}

impl Theme {
    pub const NAMES: [&'static str; 3] = ["dark", "light", "matrix"];

    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::Rgb(30, 33, 40),
            text: Color::Rgb(205, 210, 220),
            muted: Color::Rgb(125, 132, 148),
            frame: Color::Rgb(80, 87, 102),
            active_frame: Color::Rgb(120, 170, 245),
            user: Color::Rgb(120, 170, 245),
            assistant: Color::Rgb(150, 205, 125),
            waiting: Color::Rgb(235, 195, 110),
            failure: Color::Rgb(235, 110, 115),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::Rgb(248, 248, 246),
            text: Color::Rgb(40, 42, 48),
            muted: Color::Rgb(115, 120, 130),
            frame: Color::Rgb(195, 198, 204),
            active_frame: Color::Rgb(30, 100, 210),
            user: Color::Rgb(30, 100, 210),
            assistant: Color::Rgb(35, 140, 70),
            waiting: Color::Rgb(190, 130, 0),
            failure: Color::Rgb(200, 45, 60),
        }
    }

    pub fn matrix() -> Self {
        Self {
            name: "matrix",
            background: Color::Black,
            text: Color::Green,
            muted: Color::Rgb(0, 140, 0),
            frame: Color::Rgb(0, 110, 0),
            active_frame: Color::Rgb(0, 255, 0),
            user: Color::Rgb(170, 255, 170),
            assistant: Color::Rgb(0, 255, 0),
            waiting: Color::Yellow,
            failure: Color::Red,
        }
    }

    /// Theme by config name; unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "matrix" => Self::matrix(),
            _ => Self::dark(),
        }
    }

    pub fn normal(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn frame(&self, active: bool) -> Style {
        Style::default().fg(if active { self.active_frame } else { self.frame })
    }

    pub fn user(&self) -> Style {
        Style::default().fg(self.user).add_modifier(Modifier::BOLD)
    }

    pub fn assistant(&self) -> Style {
        Style::default().fg(self.assistant).add_modifier(Modifier::BOLD)
    }

    pub fn waiting(&self) -> Style {
        Style::default().fg(self.waiting)
    }

    pub fn failure(&self) -> Style {
        Style::default().fg(self.failure)
    }

    pub fn idle(&self) -> Style {
        Style::default().fg(self.assistant)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in Theme::NAMES {
            assert_eq!(Theme::from_name(name).name, name);
        }
    }

    #[test]
    fn test_unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("neon"), Theme::dark());
    }
}
