use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs};

use crate::ui::AppState;

pub fn draw_form_tabs(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let current_index = state.current;

    let mut titles: Vec<Line> = Vec::new();
    for (i, form) in state.forms.iter().enumerate() {
        let is_selected = i == current_index;
        let fn_key = format!("F{}", i + 1);

        let text_style = if is_selected {
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };

        let key_style = if is_selected {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };

        // [F1] Title (visible/max)
        let count = format!(
            " ({}/{})",
            form.sync.state().visible_count(),
            form.sync.state().max_visible()
        );
        titles.push(Line::from(vec![
            Span::styled("[", Style::default().fg(theme.frame)),
            Span::styled(fn_key, key_style),
            Span::styled("]", Style::default().fg(theme.frame)),
            Span::raw(" "),
            Span::styled(form.config.title.clone(), text_style),
            Span::styled(count, Style::default().fg(theme.muted)),
        ]));
    }

    let tabs = Tabs::new(titles)
        .select(current_index)
        .style(Style::default().fg(theme.fg))
        .highlight_style(
            Style::default()
                .fg(theme.selected)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled(" │ ", Style::default().fg(theme.frame)));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.frame));

    f.render_widget(tabs.block(block), area);
}

/// Tab index for function key `F<key_num>`, if such a tab exists.
pub fn tab_for_key(key_num: u8, tab_count: usize) -> Option<usize> {
    let index = (key_num as usize).checked_sub(1)?;
    (index < tab_count).then_some(index)
}
