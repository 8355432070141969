use crate::sync::preview::{
    decode_payload, highest_row, placements, supports_layout, Placement, GRID_COLUMNS,
};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crate::widgets::row_form_widget::RowFormWidget;
use ratatui::prelude::*;
use ratatui::widgets::*;

const ROW_HEIGHT: u16 = 3;

/// Preview pane: the current preview URL on top, the decoded payload below.
pub fn draw_preview(f: &mut Frame, area: Rect, w: &RowFormWidget, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let url = w.sync.preview();
    let p = Paragraph::new(url.to_string())
        .block(panel_block("Preview URL", false, theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, chunks[0]);

    let aux_names = w.config.aux_names();
    let payload = w.sync.template().extract_payload(url).unwrap_or_default();
    let label = |value: &str| w.config.option_label(value).to_string();
    if supports_layout(&aux_names) {
        let items = placements(payload, &aux_names);
        draw_layout(f, chunks[1], &items, label, theme);
    } else {
        let lines: Vec<Line> = decode_payload(payload, aux_names.len())
            .into_iter()
            .map(|slot| {
                Line::from(vec![
                    Span::styled(label(&slot.selector), theme.text_active_bold()),
                    Span::styled(format!("  {}", slot.aux.join(" · ")), theme.text_muted()),
                ])
            })
            .collect();
        let p = Paragraph::new(lines).block(panel_block("Fields", false, theme));
        f.render_widget(p, chunks[1]);
    }
}

/// Draw placements as boxes on a 12-column grid.
pub fn draw_layout<F>(f: &mut Frame, area: Rect, items: &[Placement], label: F, theme: &Theme)
where
    F: Fn(&str) -> String,
{
    let block = panel_block(format!("Layout ({} rows)", highest_row(items)), false, theme);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cell_w = inner.width / GRID_COLUMNS;
    if cell_w == 0 {
        f.render_widget(
            Paragraph::new("(too narrow)").style(theme.text_muted()),
            inner,
        );
        return;
    }
    let bottom = inner.y.saturating_add(inner.height);
    let mut hidden = 0;
    for p in items {
        let span = p.span();
        if span == 0 {
            continue;
        }
        let y = inner
            .y
            .saturating_add(p.row.saturating_sub(1).saturating_mul(ROW_HEIGHT));
        if y.saturating_add(ROW_HEIGHT) > bottom {
            hidden += 1;
            continue;
        }
        let rect = Rect {
            x: inner.x + p.col.saturating_sub(1) * cell_w,
            y,
            width: span * cell_w,
            height: ROW_HEIGHT,
        };
        let field = Paragraph::new(label(&p.selector))
            .block(Block::default().borders(Borders::ALL).border_style(theme.border_unfocused()));
        f.render_widget(field, rect);
    }
    if hidden > 0 {
        let note = Rect {
            y: bottom.saturating_sub(1),
            height: 1,
            ..inner
        };
        f.render_widget(
            Paragraph::new(format!("+{hidden} more below")).style(theme.text_muted()),
            note,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppConfig;
    use ratatui::backend::TestBackend;

    fn placement(row: u16, col: u16, size: u16, selector: &str) -> Placement {
        Placement {
            row,
            col,
            size,
            selector: selector.into(),
        }
    }

    fn text_at(buf: &Buffer, x: u16, y: u16, len: u16) -> String {
        (x..x + len).map(|i| buf[(i, y)].symbol().to_string()).collect()
    }

    #[test]
    fn boxes_land_on_grid_columns() {
        // 12 columns of 4 cells plus the outer border
        let backend = TestBackend::new(50, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let items = vec![placement(1, 1, 6, "a"), placement(2, 7, 6, "b")];
        terminal
            .draw(|f| {
                let area = f.area();
                draw_layout(f, area, &items, |v| v.to_uppercase(), &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        // First box: x 1..25, label at (2, 2)
        assert_eq!(text_at(&buf, 2, 2, 1), "A");
        assert_eq!(text_at(&buf, 1, 1, 1), "┌");
        // Second box starts at column 7 -> x = 1 + 6 * 4
        assert_eq!(text_at(&buf, 25, 4, 1), "┌");
        assert_eq!(text_at(&buf, 26, 5, 1), "B");
    }

    #[test]
    fn rows_below_the_pane_are_counted() {
        let backend = TestBackend::new(50, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let items = vec![placement(1, 1, 12, "a"), placement(3, 1, 12, "b")];
        terminal
            .draw(|f| {
                let area = f.area();
                draw_layout(f, area, &items, |v| v.to_string(), &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        assert_eq!(text_at(&buf, 1, 4, 11), "+1 more bel");
    }

    #[test]
    fn huge_row_values_count_as_below_the_pane() {
        let backend = TestBackend::new(50, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let items = vec![placement(30000, 1, 1, "a"), placement(u16::MAX, 12, 1, "b")];
        terminal
            .draw(|f| {
                let area = f.area();
                draw_layout(f, area, &items, |v| v.to_string(), &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        assert_eq!(text_at(&buf, 1, 4, 11), "+2 more bel");
    }

    #[test]
    fn typed_huge_row_renders_without_overflow() {
        let mut w = RowFormWidget::new(AppConfig::default().forms[0].clone());
        w.sync.on_selector_changed(0, Some("1"));
        w.sync.on_aux_field_changed(0, "row", "30000");
        w.sync.on_aux_field_changed(0, "column", "1");
        w.sync.on_aux_field_changed(0, "size", "1");
        assert!(w.sync.preview().starts_with("/preview/search_form/30000~1~1~1,"));
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_preview(f, area, &w, &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let all: String = (0..16)
            .map(|y| text_at(&buf, 0, y, 60))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all.contains("Layout (30000 rows)"));
        assert!(all.contains("+1 more below"));
    }

    #[test]
    fn preview_pane_shows_url_and_layout() {
        let mut cfg = AppConfig::default().forms[0].clone();
        cfg.initial.insert("id_search_field_0".into(), "2".into());
        cfg.initial.insert("id_row_field_0".into(), "1".into());
        cfg.initial.insert("id_column_field_0".into(), "1".into());
        cfg.initial.insert("id_size_field_0".into(), "12".into());
        let w = RowFormWidget::new(cfg);
        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_preview(f, area, &w, &Theme::default());
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let all: String = (0..16)
            .map(|y| text_at(&buf, 0, y, 60))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all.contains("/preview/search_form/1~1~12~2,"));
        assert!(all.contains("Author"));
    }
}
