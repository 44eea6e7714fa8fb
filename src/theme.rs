use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub primary: Color,
    pub primary_soft: Color,
    pub input_bg: Color,
    pub accent: Color,
    pub frame: Color,
    pub selected: Color,
    pub error: Color,
    pub error_bg: Color,
    pub muted: Color,
}

impl Theme {
    pub fn indigo_dark() -> Self {
        Self {
            bg: Color::Rgb(26, 20, 46),
            fg: Color::White,
            primary: Color::Rgb(60, 14, 166),
            primary_soft: Color::Rgb(165, 140, 250),
            input_bg: Color::Rgb(46, 36, 82),
            accent: Color::Rgb(247, 188, 12),
            frame: Color::Rgb(90, 84, 120),
            selected: Color::Rgb(247, 188, 12),
            error: Color::Rgb(176, 20, 20),
            error_bg: Color::Rgb(252, 196, 228),
            muted: Color::DarkGray,
        }
    }

    pub fn indigo_light() -> Self {
        Self {
            bg: Color::Rgb(245, 244, 250),
            fg: Color::Rgb(20, 18, 30),
            primary: Color::Rgb(60, 14, 166),
            primary_soft: Color::Rgb(88, 60, 190),
            input_bg: Color::Rgb(228, 214, 255),
            accent: Color::Rgb(200, 140, 0),
            frame: Color::Rgb(190, 186, 210),
            selected: Color::Rgb(200, 100, 0),
            error: Color::Rgb(176, 20, 20),
            error_bg: Color::Rgb(252, 196, 228),
            muted: Color::Rgb(120, 118, 135),
        }
    }

    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::indigo_dark(),
            ThemeMode::Light => Self::indigo_light(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::indigo_dark()
    }
}

impl Theme {
    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.selected)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self, invalid: bool) -> Style {
        if invalid {
            Style::default().fg(self.error).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.primary_soft)
        }
    }

    pub fn input_style(&self, invalid: bool) -> Style {
        if invalid {
            Style::default().bg(self.error_bg).fg(self.error)
        } else {
            Style::default().bg(self.input_bg).fg(self.fg)
        }
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn button_flat(&self, focused: bool) -> Style {
        let s = Style::default().fg(self.primary_soft);
        if focused {
            s.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            s
        }
    }

    pub fn button_filled(&self, focused: bool) -> Style {
        let s = Style::default().bg(self.primary).fg(Color::White);
        if focused {
            s.bg(self.selected)
                .fg(self.bg)
                .add_modifier(Modifier::BOLD)
        } else {
            s
        }
    }

    pub fn toast_color(&self, level: crate::ui::ToastLevel) -> Color {
        match level {
            crate::ui::ToastLevel::Error => self.error,
            crate::ui::ToastLevel::Info => self.accent,
        }
    }
}
