use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonMode {
    Flat,
    Filled,
}

pub const BUTTON_MIN_WIDTH: u16 = 12;

pub fn button_width(label: &str) -> u16 {
    (label.chars().count() as u16 + 4).max(BUTTON_MIN_WIDTH)
}

pub fn draw_button(
    f: &mut Frame,
    area: Rect,
    label: &str,
    mode: ButtonMode,
    focused: bool,
    theme: &Theme,
) {
    let style = match mode {
        ButtonMode::Flat => theme.button_flat(focused),
        ButtonMode::Filled => theme.button_filled(focused),
    };
    let text = if focused {
        format!("› {label} ‹")
    } else {
        label.to_string()
    };
    let p = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);
    f.render_widget(p, area);
}
