use crate::theme::Theme;
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

pub fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let b = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, theme.title_style()));
    if focused {
        b.border_style(theme.border_focused())
    } else {
        b.border_style(theme.border_unfocused())
    }
}

/// Bordered box for a single input. The label sits in the top border.
pub fn input_block<'a>(label: &'a str, focused: bool, invalid: bool, theme: &Theme) -> Block<'a> {
    let border = if invalid {
        theme.text_error()
    } else if focused {
        theme.border_focused()
    } else {
        theme.border_unfocused()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(label, theme.label_style(invalid)))
        .style(theme.input_style(invalid))
}
