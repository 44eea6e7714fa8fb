use crate::app::{update, AppMsg, Effect};
use crate::model::{validate_app_config, AppConfig, FormOutcome};
use crate::widgets::expense_form::ExpenseForm;
use crate::widgets::expense_form_widget::ExpenseFormWidget;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "expense-form.yaml";
const FORM_MAX_W: u16 = 76;
const FORM_MAX_H: u16 = 18;
const DEBUG_H: u16 = 5;
// 200ms ticks
const TICKS_PER_SEC: u64 = 5;

#[derive(Clone, Copy, Debug)]
pub enum ToastLevel {
    Info,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) form: ExpenseFormWidget,
    pub(crate) tick: u64,
    pub(crate) toast: Option<Toast>,
    pub(crate) show_debug: bool,
    // Debug log (rendered in the bottom pane when toggled with F12)
    pub(crate) debug_log: VecDeque<String>,
    // Set once the form has been submitted or cancelled
    pub(crate) outcome: Option<FormOutcome>,
    rx: Receiver<AppMsg>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        // Form callbacks only enqueue; the loop drains into app::update.
        let (tx, rx) = mpsc::channel::<AppMsg>();
        let cancel_tx = tx.clone();
        let form = ExpenseForm::new(
            config.submit_label(),
            move || {
                let _ = cancel_tx.send(AppMsg::Cancelled);
            },
            move |draft| {
                let _ = tx.send(AppMsg::Submitted(draft));
            },
            config.default_values.as_ref(),
        );
        let mode = config.mode();
        let mut state = Self {
            theme: crate::theme::Theme::from_mode(config.theme),
            form: ExpenseFormWidget::new(form, config.alert_on_invalid),
            config,
            tick: 0,
            toast: None,
            show_debug: false,
            debug_log: VecDeque::new(),
            outcome: None,
            rx,
        };
        info!(mode = mode.as_str(), "expense form opened");
        state.dbg(format!("form opened ({} mode)", mode.as_str()));
        state
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                state.dbg(format!("toast: {text}"));
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: state.tick + seconds * TICKS_PER_SEC,
                });
            }
            Effect::Close(outcome) => {
                state.outcome = Some(outcome);
            }
        }
    }
}

fn pump_messages(state: &mut AppState) {
    let mut drained: Vec<AppMsg> = Vec::new();
    while let Ok(msg) = state.rx.try_recv() {
        drained.push(msg);
    }
    for msg in drained {
        let effects = update(state, msg);
        run_effects(state, effects);
    }
}

pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::F(12) => {
            state.show_debug = !state.show_debug;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.form.press_cancel();
        }
        _ => {
            let effects = state.form.on_key(key);
            run_effects(state, effects);
        }
    }
    pump_messages(state);
}

/// Turns a headless key script into key events. Plain characters are typed
/// as-is; `<tab>`, `<backtab>`, `<enter>`, `<esc>`, `<bs>` and `<submit>`
/// (Ctrl+S) name special keys.
pub(crate) fn parse_key_script(script: &str) -> Vec<KeyEvent> {
    let mut keys = Vec::new();
    let mut rest = script;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            if let Some(end) = rest.find('>') {
                let tag = &rest[1..end];
                let named = match tag {
                    "tab" => Some(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)),
                    "backtab" => Some(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)),
                    "enter" => Some(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
                    "esc" => Some(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
                    "bs" => Some(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)),
                    "submit" => Some(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
                    _ => None,
                };
                if let Some(k) = named {
                    keys.push(k);
                    rest = &rest[end + 1..];
                    continue;
                }
            }
        }
        keys.push(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        rest = &rest[c.len_utf8()..];
    }
    keys
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<Option<FormOutcome>> {
    let cfg = load_config()?;
    validate_app_config(&cfg).map_err(|e| anyhow::anyhow!("invalid config: {e}"))?;
    let log_path = std::env::var_os("EXPENSE_TUI_LOG").map(PathBuf::from);
    crate::logging::init(log_path.as_deref())?;

    let mut state = AppState::new(cfg);
    let hint = match state.config.mode() {
        crate::model::FormMode::Create => "New expense",
        crate::model::FormMode::Edit => "Editing expense",
    };
    run_effects(
        &mut state,
        vec![Effect::ShowToast {
            text: hint.to_string(),
            level: ToastLevel::Info,
            seconds: 3,
        }],
    );

    // Headless smoke mode
    if env_flag("EXPENSE_TUI_HEADLESS") {
        let ticks: u64 = std::env::var("EXPENSE_TUI_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(5);
        let script = std::env::var("EXPENSE_TUI_HEADLESS_KEYS").unwrap_or_default();
        return run_headless(state, ticks, &script, env_flag("EXPENSE_TUI_SMOKE_SUMMARY"));
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res?;
    Ok(state.outcome)
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    while state.outcome.is_none() {
        terminal.draw(|f| ui(f, state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(state, key);
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn run_headless(
    mut state: AppState,
    ticks: u64,
    script: &str,
    summary: bool,
) -> Result<Option<FormOutcome>> {
    let backend = ratatui::backend::TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend)?;
    let keys = parse_key_script(script);
    let keys_sent = keys.len();
    for key in keys {
        if state.outcome.is_some() {
            break;
        }
        handle_key(&mut state, key);
    }
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, &mut state))?;
        state.tick = state.tick.wrapping_add(1);
    }
    if summary {
        let outcome = match &state.outcome {
            Some(FormOutcome::Submitted(_)) => "submitted",
            Some(FormOutcome::Cancelled) => "cancelled",
            None => "open",
        };
        let summary = serde_json::json!({
            "ok": true,
            "mode": state.config.mode().as_str(),
            "ticks": ticks,
            "keys": keys_sent,
            "form_invalid": state.form.form.form_is_invalid(),
            "outcome": outcome,
        });
        println!("{summary}");
    }
    Ok(state.outcome)
}

fn load_config_from_path(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading config: {path:?}"))?;
    let cfg: AppConfig =
        serde_yaml::from_str(&s).with_context(|| format!("parsing config: {path:?}"))?;
    info!(path = %path.display(), "config loaded");
    Ok(cfg)
}

fn load_config() -> Result<AppConfig> {
    // 1) Explicit path wins and must exist
    if let Some(p) = std::env::var_os("EXPENSE_TUI_CONFIG") {
        return load_config_from_path(Path::new(&p));
    }
    // 2) CWD, then CWD/.tui
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    for p in &candidates {
        if p.exists() {
            return load_config_from_path(p);
        }
    }
    warn!("no {CONFIG_FILE} found, using built-in defaults");
    Ok(AppConfig::default())
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base_style()), screen);

    let mut constraints = vec![Constraint::Min(0)];
    if state.show_debug {
        constraints.push(Constraint::Length(DEBUG_H));
    }
    constraints.push(Constraint::Length(1)); // Footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(screen);

    let main = chunks[0];
    let form_area = centered(
        main,
        FORM_MAX_W.min(main.width),
        FORM_MAX_H.min(main.height),
    );
    let theme = state.theme.clone();
    state.form.render(f, form_area, &theme, state.tick);

    if state.show_debug {
        draw_debug(f, chunks[1], state);
    }
    let help = "Tab/⇧Tab move  Enter next/press  Ctrl+S submit  Esc cancel  F12 debug";
    draw_footer(f, chunks[chunks.len() - 1], state, help);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(width),
        Constraint::Min(0),
    ])
    .split(vert[1])[1]
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.text_muted())
        .title(Span::styled(
            "Debug",
            state.theme.text_muted().add_modifier(Modifier::BOLD),
        ));
    // Take last lines that fit below the border
    let h = area.height.saturating_sub(1) as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpenseDraft;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn script(state: &mut AppState, s: &str) {
        for k in parse_key_script(s) {
            handle_key(state, k);
        }
    }

    #[test]
    fn key_script_names_special_keys() {
        let keys = parse_key_script("1<tab>x<submit><nope>");
        let codes: Vec<KeyCode> = keys.iter().map(|k| k.code).collect();
        assert_eq!(
            codes,
            vec![
                KeyCode::Char('1'),
                KeyCode::Tab,
                KeyCode::Char('x'),
                KeyCode::Char('s'),
                KeyCode::Char('<'),
                KeyCode::Char('n'),
                KeyCode::Char('o'),
                KeyCode::Char('p'),
                KeyCode::Char('e'),
                KeyCode::Char('>'),
            ]
        );
        assert!(keys[3].modifiers.contains(KeyModifiers::CONTROL));
    }

    #[test]
    fn scripted_submit_sets_outcome() {
        let mut st = AppState::new(AppConfig::default());
        script(&mut st, "12.5<tab>2023-05-01<tab>lunch<submit>");
        assert_eq!(
            st.outcome,
            Some(FormOutcome::Submitted(ExpenseDraft {
                amount: 12.5,
                date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
                description: "lunch".into(),
            }))
        );
    }

    #[test]
    fn rejected_submit_keeps_form_open() {
        let mut st = AppState::new(AppConfig::default());
        script(&mut st, "abc<submit>");
        assert!(st.outcome.is_none());
        assert!(st.form.form.form_is_invalid());
        assert!(st.toast.is_none());
    }

    #[test]
    fn alert_flag_raises_error_toast() {
        let cfg = AppConfig {
            alert_on_invalid: true,
            ..Default::default()
        };
        let mut st = AppState::new(cfg);
        script(&mut st, "<submit>");
        let toast = st.toast.as_ref().expect("toast");
        assert!(matches!(toast.level, ToastLevel::Error));
        assert!(st.outcome.is_none());
    }

    #[test]
    fn ctrl_c_and_esc_cancel() {
        let mut st = AppState::new(AppConfig::default());
        handle_key(
            &mut st,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert_eq!(st.outcome, Some(FormOutcome::Cancelled));

        let mut st = AppState::new(AppConfig::default());
        script(&mut st, "<esc>");
        assert_eq!(st.outcome, Some(FormOutcome::Cancelled));
    }

    #[test]
    fn f12_toggles_debug_pane() {
        let mut st = AppState::new(AppConfig::default());
        handle_key(&mut st, KeyEvent::new(KeyCode::F(12), KeyModifiers::NONE));
        assert!(st.show_debug);
        handle_key(&mut st, KeyEvent::new(KeyCode::F(12), KeyModifiers::NONE));
        assert!(!st.show_debug);
    }

    #[test]
    fn headless_run_renders_and_reports_outcome() {
        let st = AppState::new(AppConfig::default());
        let outcome = run_headless(st, 2, "<esc>", false).unwrap();
        assert_eq!(outcome, Some(FormOutcome::Cancelled));
    }

    #[test]
    fn config_file_is_parsed_with_context_on_error() {
        let dir = std::env::temp_dir().join(format!("expense-tui-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.yaml");
        fs::write(&good, "submit_button_label: Save\nalert_on_invalid: true\n").unwrap();
        let cfg = load_config_from_path(&good).unwrap();
        assert_eq!(cfg.submit_label(), "Save");
        assert!(cfg.alert_on_invalid);

        let bad = dir.join("bad.yaml");
        fs::write(&bad, "default_values: [1, 2").unwrap();
        let err = load_config_from_path(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn full_screen_render_shows_form_and_footer() {
        let mut st = AppState::new(AppConfig::default());
        st.show_debug = true;
        let backend = ratatui::backend::TestBackend::new(90, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        assert!(text.contains("Your Expense"));
        assert!(text.contains("Ctrl+S submit"));
        assert!(text.contains("form opened (create mode)"));
    }
}
