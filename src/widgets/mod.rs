pub mod chrome;
pub mod layout_preview;
pub mod row_form;
pub mod row_form_widget;
pub mod status_bar;
pub mod tabs;

use crate::app::Effect;
use crate::theme::Theme;
use crossterm::event::KeyCode;
use ratatui::prelude::*;

pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64, theme: &Theme);
    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let _ = key;
        Vec::new()
    }
}
