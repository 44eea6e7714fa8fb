use crate::theme::Theme;
use crate::widgets::chrome::input_block;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keypad {
    Text,
    // Digits plus decimal/thousands separators and sign
    Decimal,
}

/// Per-input behaviour, set once when the form is built.
#[derive(Clone, Copy, Debug)]
pub struct InputConfig {
    pub keypad: Keypad,
    pub placeholder: Option<&'static str>,
    pub max_len: Option<usize>,
    pub multiline: bool,
}

impl InputConfig {
    pub const fn text() -> Self {
        Self {
            keypad: Keypad::Text,
            placeholder: None,
            max_len: None,
            multiline: false,
        }
    }

    pub const fn decimal() -> Self {
        Self {
            keypad: Keypad::Decimal,
            ..Self::text()
        }
    }

    pub const fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::text()
        }
    }

    pub const fn placeholder(mut self, p: &'static str) -> Self {
        self.placeholder = Some(p);
        self
    }

    pub const fn max_len(mut self, n: usize) -> Self {
        self.max_len = Some(n);
        self
    }

    /// Whether typing `c` at the end of `current` is allowed.
    pub fn accepts(&self, current: &str, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        if let Some(max) = self.max_len {
            if current.chars().count() >= max {
                return false;
            }
        }
        match self.keypad {
            Keypad::Text => true,
            Keypad::Decimal => c.is_ascii_digit() || matches!(c, '.' | ',' | '-'),
        }
    }
}

pub struct InputView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub config: &'a InputConfig,
    pub invalid: bool,
    pub focused: bool,
    pub cursor_on: bool,
}

pub fn draw_input(f: &mut Frame, area: Rect, view: &InputView<'_>, theme: &Theme) {
    let block = input_block(view.label, view.focused, view.invalid, theme);
    let line = if view.value.is_empty() && !view.focused {
        match view.config.placeholder {
            Some(p) => Line::from(Span::styled(p, theme.text_muted())),
            None => Line::default(),
        }
    } else {
        let mut text = view.value.to_string();
        if view.focused && view.cursor_on {
            text.push('▏');
        }
        let style = if view.focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(Span::styled(text, style))
    };
    f.render_widget(Paragraph::new(line).block(block), area);
}
