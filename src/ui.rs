use crate::app::{msg_for_key, update, Effect};
use crate::model::{validate_app_config, AppConfig};
use crate::theme::Theme;
use crate::widgets::layout_preview::draw_preview;
use crate::widgets::row_form_widget::RowFormWidget;
use crate::widgets::status_bar::{draw_debug_log, draw_footer};
use crate::widgets::tabs::draw_form_tabs;
use crate::widgets::Widget;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const CONFIG_FILE: &str = "rowsync.yaml";
const HELP: &str = "↑/↓ move • Enter pick/edit • +/- rows • F1-F12 forms • Ctrl+C copy • e export • d debug • q quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) forms: Vec<RowFormWidget>,
    pub(crate) current: usize,
    pub(crate) theme: Theme,
    pub(crate) tick: u64,
    pub(crate) toast: Option<Toast>,
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) show_debug: bool,
    // Exported field values as JSON, keyed by form id
    pub(crate) exported: BTreeMap<String, String>,
    pub(crate) should_quit: bool,
}

impl AppState {
    pub(crate) fn new(config: AppConfig) -> Self {
        let forms = config
            .forms
            .iter()
            .cloned()
            .map(RowFormWidget::new)
            .collect();
        Self {
            config,
            forms,
            current: 0,
            theme: Theme::synthwave_dark(),
            tick: 0,
            toast: None,
            debug_log: VecDeque::new(),
            show_debug: false,
            exported: BTreeMap::new(),
            should_quit: false,
        }
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

pub(crate) fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Debug(line) => state.dbg(line),
            Effect::CopyToClipboard { text } => {
                let copied = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text));
                let (text, level) = match copied {
                    Ok(()) => ("Copied preview URL".to_string(), ToastLevel::Success),
                    Err(e) => (format!("Clipboard unavailable: {e}"), ToastLevel::Error),
                };
                state.dbg(&text);
                run_effects(
                    state,
                    vec![Effect::ShowToast {
                        text,
                        level,
                        seconds: 3,
                    }],
                );
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    validate_app_config(&cfg).map_err(|e| anyhow!("invalid config: {e}"))?;
    let mut state = AppState::new(cfg);
    let header = state.config.header.clone().unwrap_or_default();
    state.dbg(format!(
        "loaded {} form(s){}",
        state.forms.len(),
        if header.is_empty() {
            String::new()
        } else {
            format!(" for {header}")
        }
    ));

    // Headless smoke mode
    if env_flag("ROWSYNC_HEADLESS") {
        let ticks: u64 = std::env::var("ROWSYNC_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend)?;
        for _ in 0..ticks {
            terminal.draw(|f| ui(f, &mut state))?;
            state.tick = state.tick.wrapping_add(1);
        }
        if env_flag("ROWSYNC_SMOKE_SUMMARY") {
            let form = &state.forms[state.current];
            let summary = serde_json::json!({
                "ok": true,
                "form": form.config.id,
                "visible_count": form.sync.state().visible_count(),
                "preview": form.sync.preview(),
            });
            println!("{summary}");
        }
        return Ok(());
    }

    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(msg) = msg_for_key(&state, key.code, key.modifiers) {
                        let effects = update(&mut state, msg);
                        run_effects(&mut state, effects);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        if state.should_quit {
            break Ok(());
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    for (id, json) in &state.exported {
        println!("# {id}\n{json}");
    }
    res
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(screen);
    draw_form_tabs(f, rows[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let right = if state.show_debug {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(body[1])
    } else {
        Layout::default()
            .constraints([Constraint::Percentage(100)])
            .split(body[1])
    };

    let tick = state.tick;
    let theme = state.theme.clone();
    if let Some(form) = state.forms.get_mut(state.current) {
        form.render(f, body[0], true, tick, &theme);
        draw_preview(f, right[0], form, &theme);
    }
    if state.show_debug {
        draw_debug_log(f, right[1], state);
    }
    draw_footer(f, rows[2], state, HELP);
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let cfg: AppConfig = serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))?;
    log::debug!("config loaded from {path:?}");
    Ok(cfg)
}

fn load_config() -> Result<AppConfig> {
    // 1) If ROWSYNC_CONFIG_DIR is set, expect rowsync.yaml inside it
    if let Ok(base) = std::env::var("ROWSYNC_CONFIG_DIR") {
        return read_config(&PathBuf::from(base).join(CONFIG_FILE));
    }

    // 2) Discover rowsync.yaml from CWD and upwards
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    for p in &candidates {
        if p.exists() {
            return read_config(p);
        }
    }
    let mut cur = cwd.as_path();
    while let Some(parent) = cur.parent() {
        let p = parent.join(".tui").join(CONFIG_FILE);
        if p.exists() {
            return read_config(&p);
        }
        cur = parent;
    }
    // 3) ~/.tui/rowsync.yaml
    if let Some(home) = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from)
    {
        let p = home.join(".tui").join(CONFIG_FILE);
        if p.exists() {
            return read_config(&p);
        }
    }
    log::debug!("no {CONFIG_FILE} found, using built-in config");
    Ok(AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    #[test]
    fn dbg_keeps_a_bounded_ring() {
        let mut st = AppState::new(AppConfig::default());
        for i in 0..250 {
            st.dbg(format!("line {i}"));
        }
        assert_eq!(st.debug_log.len(), 200);
        assert_eq!(st.debug_log.front().map(String::as_str), Some("line 50"));
    }

    #[test]
    fn toast_effect_expires_by_tick() {
        let mut st = AppState::new(AppConfig::default());
        st.tick = 10;
        run_effects(
            &mut st,
            vec![Effect::ShowToast {
                text: "hi".into(),
                level: ToastLevel::Info,
                seconds: 2,
            }],
        );
        assert_eq!(st.toast.as_ref().map(|t| t.expires_at_tick), Some(20));

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        assert!(st.toast.is_some());
        st.tick = 20;
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        assert!(st.toast.is_none());
    }

    #[test]
    fn full_screen_renders_tabs_form_and_preview() {
        let mut st = AppState::new(AppConfig::default());
        st.show_debug = true;
        st.dbg("hello debug");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut all = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                all.push_str(buf[(x, y)].symbol());
            }
            all.push('\n');
        }
        assert!(all.contains("[F1] Search form (1/19)"));
        assert!(all.contains("-- Row 1 --"));
        assert!(all.contains("Preview URL"));
        assert!(all.contains("hello debug"));
    }

    #[test]
    fn config_file_is_read_from_path() {
        let dir = std::env::temp_dir().join(format!("rowsync-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        fs::write(
            &path,
            "forms:\n  - id: f\n    title: F\n    template: \"x/image_string\"\n    selector: { prefix: id_sel }\n    aux_fields:\n      - { name: result, prefix: id_result }\n",
        )
        .unwrap();
        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.forms[0].aux_fields[0].name, "result");
        assert!(validate_app_config(&cfg).is_ok());
        assert!(read_config(&dir.join("missing.yaml")).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
