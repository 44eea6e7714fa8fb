use crate::app::Effect;
use crate::theme::Theme;
use crate::ui::ToastLevel;
use crate::widgets::button::{button_width, draw_button, ButtonMode};
use crate::widgets::chrome::{input_block, panel_block};
use crate::widgets::expense_form::{ExpenseField, ExpenseForm, SubmitOutcome};
use crate::widgets::input::{draw_input, InputConfig, InputView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::crossterm::event as rt_event;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tui_textarea::TextArea;

pub const FORM_TITLE: &str = "Your Expense";
pub const INVALID_SUMMARY: &str = "Invalid input values - please check your entered data!";
pub const CANCEL_LABEL: &str = "Cancel";
pub const INVALID_ALERT: &str = "Invalid input: please check your input values";

static AMOUNT_INPUT: InputConfig = InputConfig::decimal();
static DATE_INPUT: InputConfig = InputConfig::text().placeholder("YYYY-MM-DD").max_len(10);
static DESCRIPTION_INPUT: InputConfig = InputConfig::multiline();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormFocus {
    Amount,
    Date,
    Description,
    Cancel,
    Submit,
}

impl FormFocus {
    const ORDER: [FormFocus; 5] = [
        FormFocus::Amount,
        FormFocus::Date,
        FormFocus::Description,
        FormFocus::Cancel,
        FormFocus::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let n = Self::ORDER.len();
        Self::ORDER[(self.index() + n - 1) % n]
    }

    pub fn field(self) -> Option<ExpenseField> {
        match self {
            FormFocus::Amount => Some(ExpenseField::Amount),
            FormFocus::Date => Some(ExpenseField::Date),
            FormFocus::Description => Some(ExpenseField::Description),
            FormFocus::Cancel | FormFocus::Submit => None,
        }
    }
}

fn input_config(field: ExpenseField) -> &'static InputConfig {
    match field {
        ExpenseField::Amount => &AMOUNT_INPUT,
        ExpenseField::Date => &DATE_INPUT,
        ExpenseField::Description => &DESCRIPTION_INPUT,
    }
}

// tui-textarea consumes ratatui's re-exported crossterm events
fn textarea_key(key: &KeyEvent) -> rt_event::KeyEvent {
    let code = match key.code {
        KeyCode::Char(c) => rt_event::KeyCode::Char(c),
        KeyCode::Enter => rt_event::KeyCode::Enter,
        KeyCode::Backspace => rt_event::KeyCode::Backspace,
        KeyCode::Delete => rt_event::KeyCode::Delete,
        KeyCode::Left => rt_event::KeyCode::Left,
        KeyCode::Right => rt_event::KeyCode::Right,
        KeyCode::Up => rt_event::KeyCode::Up,
        KeyCode::Down => rt_event::KeyCode::Down,
        KeyCode::Home => rt_event::KeyCode::Home,
        KeyCode::End => rt_event::KeyCode::End,
        KeyCode::PageUp => rt_event::KeyCode::PageUp,
        KeyCode::PageDown => rt_event::KeyCode::PageDown,
        _ => rt_event::KeyCode::Null,
    };
    let mods = rt_event::KeyModifiers::from_bits_truncate(key.modifiers.bits());
    rt_event::KeyEvent::new(code, mods)
}

pub struct ExpenseFormWidget {
    pub form: ExpenseForm,
    pub focus: FormFocus,
    alert_on_invalid: bool,
    description: TextArea<'static>,
}

impl ExpenseFormWidget {
    pub fn new(form: ExpenseForm, alert_on_invalid: bool) -> Self {
        let mut description = TextArea::default();
        let text = &form.inputs().description.value;
        if !text.is_empty() {
            description.insert_str(text);
        }
        Self {
            form,
            focus: FormFocus::Amount,
            alert_on_invalid,
            description,
        }
    }

    pub fn press_submit(&mut self) -> Vec<Effect> {
        match self.form.on_submit() {
            SubmitOutcome::Submitted => Vec::new(),
            SubmitOutcome::Rejected(_) if self.alert_on_invalid => vec![Effect::ShowToast {
                text: INVALID_ALERT.to_string(),
                level: ToastLevel::Error,
                seconds: 3,
            }],
            SubmitOutcome::Rejected(_) => Vec::new(),
        }
    }

    pub fn press_cancel(&mut self) {
        self.form.on_cancel();
    }

    fn type_char(&mut self, field: ExpenseField, c: char) {
        let current = &self.form.inputs().get(field).value;
        if !input_config(field).accepts(current, c) {
            return;
        }
        let mut next = current.clone();
        next.push(c);
        self.form.on_field_change(field, next);
    }

    fn backspace(&mut self, field: ExpenseField) {
        let mut next = self.form.inputs().get(field).value.clone();
        if next.pop().is_some() {
            self.form.on_field_change(field, next);
        }
    }

    fn description_key(&mut self, key: &KeyEvent) {
        if self.description.input(textarea_key(key)) {
            let text = self.description.lines().join("\n");
            self.form.on_field_change(ExpenseField::Description, text);
        }
    }

    fn single_line_key(&mut self, field: ExpenseField, key: &KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl => self.type_char(field, c),
            KeyCode::Backspace => self.backspace(field),
            KeyCode::Enter | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Right if field == ExpenseField::Amount => self.focus = FormFocus::Date,
            KeyCode::Left if field == ExpenseField::Date => self.focus = FormFocus::Amount,
            _ => {}
        }
    }

    fn button_key(&mut self, key: &KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.focus == FormFocus::Submit {
                    return self.press_submit();
                }
                self.press_cancel();
            }
            KeyCode::Left => self.focus = FormFocus::Cancel,
            KeyCode::Right => self.focus = FormFocus::Submit,
            KeyCode::Up => self.focus = FormFocus::Description,
            _ => {}
        }
        Vec::new()
    }
}

impl crate::widgets::Widget for ExpenseFormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
        let cursor_on = tick % 2 == 0;
        let outer = panel_block(" Expense ", true, theme);
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(3), // amount | date
            Constraint::Min(4),    // description
            Constraint::Length(1), // summary error
            Constraint::Length(1), // buttons
        ])
        .split(inner);

        let title = Paragraph::new(FORM_TITLE)
            .alignment(Alignment::Center)
            .style(theme.title_style());
        f.render_widget(title, rows[0]);

        let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(1)
            .split(rows[2]);
        for (field, col) in [(ExpenseField::Amount, cols[0]), (ExpenseField::Date, cols[1])] {
            let state = self.form.inputs().get(field);
            let view = InputView {
                label: field.label(),
                value: &state.value,
                config: input_config(field),
                invalid: !state.is_valid,
                focused: self.focus.field() == Some(field),
                cursor_on,
            };
            draw_input(f, col, &view, theme);
        }

        let desc_focused = self.focus == FormFocus::Description;
        let desc_invalid = !self.form.inputs().description.is_valid;
        self.description.set_block(input_block(
            ExpenseField::Description.label(),
            desc_focused,
            desc_invalid,
            theme,
        ));
        self.description.set_style(theme.input_style(desc_invalid));
        self.description.set_cursor_line_style(Style::default());
        self.description.set_cursor_style(if desc_focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        });
        f.render_widget(&self.description, rows[3]);

        if self.form.form_is_invalid() {
            let p = Paragraph::new(INVALID_SUMMARY)
                .alignment(Alignment::Center)
                .style(theme.text_error());
            f.render_widget(p, rows[4]);
        }

        let submit_label = self.form.submit_button_label();
        let buttons = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(button_width(CANCEL_LABEL)),
            Constraint::Length(2),
            Constraint::Length(button_width(submit_label)),
            Constraint::Min(0),
        ])
        .split(rows[5]);
        draw_button(
            f,
            buttons[1],
            CANCEL_LABEL,
            ButtonMode::Flat,
            self.focus == FormFocus::Cancel,
            theme,
        );
        draw_button(
            f,
            buttons[3],
            submit_label,
            ButtonMode::Filled,
            self.focus == FormFocus::Submit,
            theme,
        );
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.press_submit(),
            KeyCode::Esc => {
                self.press_cancel();
                return Vec::new();
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return Vec::new();
            }
            _ => {}
        }
        match self.focus.field() {
            Some(field) if input_config(field).multiline => {
                self.description_key(&key);
                Vec::new()
            }
            Some(field) => {
                self.single_line_key(field, &key);
                Vec::new()
            }
            None => self.button_key(&key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpenseDraft;
    use crate::widgets::Widget;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        submitted: Vec<ExpenseDraft>,
        cancelled: usize,
    }

    fn widget(
        defaults: Option<&ExpenseDraft>,
        alert: bool,
    ) -> (ExpenseFormWidget, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let c1 = calls.clone();
        let c2 = calls.clone();
        let form = ExpenseForm::new(
            "Add",
            move || c1.borrow_mut().cancelled += 1,
            move |d| c2.borrow_mut().submitted.push(d),
            defaults,
        );
        (ExpenseFormWidget::new(form, alert), calls)
    }

    fn press(w: &mut ExpenseFormWidget, code: KeyCode) -> Vec<Effect> {
        w.on_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(w: &mut ExpenseFormWidget, c: char) -> Vec<Effect> {
        w.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(w: &mut ExpenseFormWidget, s: &str) {
        for c in s.chars() {
            press(w, KeyCode::Char(c));
        }
    }

    fn render_text(w: &mut ExpenseFormWidget) -> String {
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| {
                let area = f.area();
                w.render(f, area, &theme, 0);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn keyboard_flow_submits_parsed_draft() {
        let (mut w, calls) = widget(None, false);
        type_str(&mut w, "12.5");
        press(&mut w, KeyCode::Tab);
        type_str(&mut w, "2023-05-01");
        press(&mut w, KeyCode::Tab);
        type_str(&mut w, "lunch");
        let effects = ctrl(&mut w, 's');
        assert!(effects.is_empty());
        assert_eq!(
            calls.borrow().submitted,
            vec![ExpenseDraft {
                amount: 12.5,
                date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
                description: "lunch".into(),
            }]
        );
        assert!(!w.form.form_is_invalid());
    }

    #[test]
    fn amount_ignores_non_decimal_keys() {
        let (mut w, _) = widget(None, false);
        type_str(&mut w, "1a2.b5");
        assert_eq!(w.form.inputs().amount.value, "12.5");
        press(&mut w, KeyCode::Backspace);
        assert_eq!(w.form.inputs().amount.value, "12.");
    }

    #[test]
    fn date_stops_at_ten_chars() {
        let (mut w, _) = widget(None, false);
        press(&mut w, KeyCode::Right);
        assert_eq!(w.focus, FormFocus::Date);
        type_str(&mut w, "2023-05-011");
        assert_eq!(w.form.inputs().date.value, "2023-05-01");
    }

    #[test]
    fn description_enter_inserts_newline() {
        let (mut w, _) = widget(None, false);
        w.focus = FormFocus::Description;
        type_str(&mut w, "a");
        press(&mut w, KeyCode::Enter);
        type_str(&mut w, "b");
        assert_eq!(w.form.inputs().description.value, "a\nb");
        assert_eq!(w.focus, FormFocus::Description);
    }

    #[test]
    fn focus_cycles_and_cancel_button_fires_once() {
        let (mut w, calls) = widget(None, false);
        press(&mut w, KeyCode::BackTab);
        assert_eq!(w.focus, FormFocus::Submit);
        press(&mut w, KeyCode::BackTab);
        assert_eq!(w.focus, FormFocus::Cancel);
        let before = w.form.inputs().clone();
        press(&mut w, KeyCode::Enter);
        assert_eq!(calls.borrow().cancelled, 1);
        assert!(calls.borrow().submitted.is_empty());
        assert_eq!(w.form.inputs(), &before);
        press(&mut w, KeyCode::Tab);
        press(&mut w, KeyCode::Tab);
        assert_eq!(w.focus, FormFocus::Amount);
    }

    #[test]
    fn esc_cancels() {
        let (mut w, calls) = widget(None, false);
        press(&mut w, KeyCode::Esc);
        assert_eq!(calls.borrow().cancelled, 1);
    }

    #[test]
    fn summary_line_appears_only_after_rejected_submit() {
        let (mut w, calls) = widget(None, false);
        let text = render_text(&mut w);
        assert!(text.contains(FORM_TITLE));
        assert!(text.contains("Cancel"));
        assert!(text.contains("Add"));
        assert!(!text.contains(INVALID_SUMMARY));

        w.focus = FormFocus::Submit;
        press(&mut w, KeyCode::Enter);
        assert!(calls.borrow().submitted.is_empty());
        let text = render_text(&mut w);
        assert!(text.contains(INVALID_SUMMARY));
    }

    #[test]
    fn alert_toast_follows_config_flag() {
        let (mut quiet, _) = widget(None, false);
        assert!(ctrl(&mut quiet, 's').is_empty());

        let (mut loud, _) = widget(None, true);
        let effects = ctrl(&mut loud, 's');
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::ShowToast { text, level: ToastLevel::Error, .. } if text == INVALID_ALERT
        ));
    }

    #[test]
    fn edit_mode_prefills_textarea() {
        let d = ExpenseDraft {
            amount: 19.99,
            date: NaiveDate::from_ymd_opt(2022, 2, 18).unwrap(),
            description: "A book".into(),
        };
        let (mut w, calls) = widget(Some(&d), false);
        assert_eq!(w.description.lines().to_vec(), vec!["A book".to_string()]);
        let text = render_text(&mut w);
        assert!(text.contains("19.99"));
        assert!(text.contains("2022-02-18"));
        ctrl(&mut w, 's');
        assert_eq!(calls.borrow().submitted, vec![d]);
    }
}
