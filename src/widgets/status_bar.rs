use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, ToastLevel};

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let theme = &state.theme;
    let mut spans: Vec<Span> = Vec::new();
    if let Some(t) = &state.toast {
        let color = theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    if let Some(form) = state.forms.get(state.current) {
        if form.is_capturing() {
            spans.push(Span::raw("editing  |  "));
        }
    }
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(theme.muted),
    ));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}

/// Last debug lines, newest at the bottom.
pub fn draw_debug_log(f: &mut Frame, area: Rect, state: &AppState) {
    let inner_h = area.height.saturating_sub(2) as usize;
    let skip = state.debug_log.len().saturating_sub(inner_h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(skip)
        .map(|l| Line::from(Span::styled(l.clone(), state.theme.text_muted())))
        .collect();
    let p = Paragraph::new(lines).block(crate::widgets::chrome::panel_block(
        "Debug",
        false,
        &state.theme,
    ));
    f.render_widget(p, area);
}
