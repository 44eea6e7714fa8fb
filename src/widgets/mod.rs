pub mod button;
pub mod chrome;
pub mod expense_form;
pub mod expense_form_widget;
pub mod input;
pub mod status_bar;

use crate::app::Effect;
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64);
    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
}
