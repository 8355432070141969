use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crate::widgets::row_form_widget::{EditMode, RowFormWidget, Target};
use ratatui::prelude::*;
use ratatui::widgets::*;

pub const OPTIONS_VISIBLE: usize = 8;

/// First line to show so that `selected` stays inside a window of `inner_h` lines.
pub(crate) fn scroll_offset(total: usize, selected: usize, inner_h: u16) -> usize {
    if inner_h == 0 || total == 0 {
        return 0;
    }
    let ih = inner_h as usize;
    let sel = selected.min(total.saturating_sub(1));
    if sel >= ih.saturating_sub(1) {
        sel - ih.saturating_sub(1)
    } else {
        0
    }
}

fn option_window(cursor: usize, total: usize) -> (usize, usize) {
    let start = if cursor >= OPTIONS_VISIBLE {
        cursor + 1 - OPTIONS_VISIBLE
    } else {
        0
    };
    (start, (start + OPTIONS_VISIBLE).min(total))
}

pub fn draw_row_form(
    f: &mut Frame,
    area: Rect,
    w: &RowFormWidget,
    highlight: bool,
    cursor_on: bool,
    theme: &Theme,
) {
    let screen = w.sync.surface();
    let mut lines: Vec<Line> = Vec::new();
    let mut focus_line = 0;
    let value_style = |focused: bool, editing: bool| {
        if focused && editing {
            theme.text_editing_bold()
        } else if focused {
            theme.text_active_bold()
        } else {
            Style::default()
        }
    };

    for row in screen.visible_rows() {
        lines.push(Line::from(Span::styled(
            format!("-- Row {} --", row + 1),
            theme.group_header(),
        )));

        // Selector
        let focused = w.focus == Target::Selector(row);
        if focused {
            focus_line = lines.len();
        }
        let picking = matches!(w.mode, EditMode::Picking { row: r, .. } if r == row);
        let summary = screen
            .selector(row)
            .map(|v| w.config.option_label(v).to_string())
            .unwrap_or_else(|| "(none)".into());
        let sel = if focused { '›' } else { ' ' };
        lines.push(Line::from(vec![
            Span::raw(format!("{sel} {}: ", w.config.selector.label)),
            Span::styled(summary, value_style(focused, picking)),
        ]));
        if let EditMode::Picking { row: r, cursor } = &w.mode {
            if *r == row {
                let values = w.picker_values();
                let (start, end) = option_window(*cursor, values.len());
                for (oi, value) in values.iter().enumerate().take(end).skip(start) {
                    let label = value
                        .map(|v| w.config.option_label(v).to_string())
                        .unwrap_or_else(|| "(none)".into());
                    let disabled = value
                        .map(|v| screen.is_option_disabled(row, v))
                        .unwrap_or(false);
                    let mark = if *value == screen.selector(row) {
                        "(•)"
                    } else {
                        "( )"
                    };
                    let cur = if oi == *cursor { '›' } else { ' ' };
                    let st = if oi == *cursor {
                        theme.list_cursor_style()
                    } else if disabled {
                        theme.text_disabled()
                    } else {
                        theme.text_muted()
                    };
                    let tail = if disabled { "  (in use)" } else { "" };
                    lines.push(Line::from(vec![Span::styled(
                        format!("  {cur} {mark} {label}{tail}"),
                        st,
                    )]));
                    if oi == *cursor {
                        focus_line = lines.len() - 1;
                    }
                }
            }
        }

        // Aux fields
        for (k, aux) in w.config.aux_fields.iter().enumerate() {
            let focused = w.focus == Target::Aux(row, k);
            if focused {
                focus_line = lines.len();
            }
            let mut val = screen.aux(row, &aux.name).to_string();
            let mut editing = false;
            if let EditMode::Editing {
                row: r,
                aux: a,
                buffer,
            } = &w.mode
            {
                if *r == row && *a == k {
                    editing = true;
                    val = buffer.clone();
                    if cursor_on {
                        val.push('▏');
                    }
                }
            }
            let sel = if focused { '›' } else { ' ' };
            lines.push(Line::from(vec![
                Span::raw(format!("{sel}   {}: ", aux.label())),
                Span::styled(val, value_style(focused, editing)),
            ]));
        }
    }

    // Controls: Add | Remove
    lines.push(Line::from(""));
    let control_style = |target: Target, enabled: bool| {
        if w.focus == target {
            theme.list_cursor_style()
        } else if enabled {
            theme.text_active_bold()
        } else {
            theme.text_muted()
        }
    };
    if matches!(w.focus, Target::AddRow | Target::RemoveRow) {
        focus_line = lines.len();
    }
    lines.push(Line::from(vec![
        Span::styled(
            "  [ Add row ]",
            control_style(Target::AddRow, screen.add_enabled()),
        ),
        Span::raw("  "),
        Span::styled(
            "[ Remove row ]",
            control_style(Target::RemoveRow, screen.remove_enabled()),
        ),
    ]));
    if let Some(msg) = &w.message {
        lines.push(Line::from(Span::styled(msg.clone(), theme.text_error())));
    }

    let title = match w.mode {
        EditMode::Browse => w.config.title.clone(),
        EditMode::Picking { .. } => format!("{} — picking", w.config.title),
        EditMode::Editing { .. } => format!("{} — editing", w.config.title),
    };
    let inner_h = area.height.saturating_sub(2);
    let offset = scroll_offset(lines.len(), focus_line, inner_h);
    let p = Paragraph::new(lines)
        .block(panel_block(title, highlight, theme))
        .scroll((offset as u16, 0));
    f.render_widget(p, area);
}
