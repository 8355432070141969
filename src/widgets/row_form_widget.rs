use crate::app::Effect;
use crate::model::FormConfig;
use crate::sync::surface::Screen;
use crate::sync::RowSynchronizer;
use crate::theme::Theme;
use crate::widgets::row_form::draw_row_form;
use crossterm::event::KeyCode;
use ratatui::prelude::*;

/// Focusable parts of the row form, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Selector(usize),
    Aux(usize, usize),
    AddRow,
    RemoveRow,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditMode {
    Browse,
    // Cursor 0 is "(none)", cursor k is option k-1
    Picking { row: usize, cursor: usize },
    Editing { row: usize, aux: usize, buffer: String },
}

pub struct RowFormWidget {
    pub config: FormConfig,
    pub sync: RowSynchronizer<Screen>,
    pub focus: Target,
    pub mode: EditMode,
    pub message: Option<String>,
}

impl RowFormWidget {
    pub fn new(config: FormConfig) -> Self {
        let sync = RowSynchronizer::initialize(
            config.capacity,
            config.aux_names(),
            config.preview_template(),
            config.initial_values(),
            Screen::new(config.capacity),
        );
        Self {
            config,
            sync,
            focus: Target::Selector(0),
            mode: EditMode::Browse,
            message: None,
        }
    }

    pub fn targets(&self) -> Vec<Target> {
        let aux_count = self.config.aux_fields.len();
        let mut out = Vec::new();
        for row in self.sync.surface().visible_rows() {
            out.push(Target::Selector(row));
            out.extend((0..aux_count).map(|k| Target::Aux(row, k)));
        }
        out.push(Target::AddRow);
        out.push(Target::RemoveRow);
        out
    }

    pub fn is_capturing(&self) -> bool {
        self.mode != EditMode::Browse
    }

    fn move_focus(&mut self, delta: isize) {
        let targets = self.targets();
        let pos = targets.iter().position(|t| *t == self.focus).unwrap_or(0);
        let next = (pos as isize + delta).clamp(0, targets.len() as isize - 1) as usize;
        self.focus = targets[next];
    }

    fn refocus(&mut self) {
        if !self.targets().contains(&self.focus) {
            self.focus = Target::RemoveRow;
        }
    }

    /// Option entries for the picker: `None` first, then configured values.
    pub fn picker_values(&self) -> Vec<Option<&str>> {
        std::iter::once(None)
            .chain(
                self.config
                    .selector
                    .options
                    .iter()
                    .map(|o| Some(o.value.as_str())),
            )
            .collect()
    }

    fn add_row(&mut self, effects: &mut Vec<Effect>) {
        if self.sync.add_row() {
            let row = self.sync.state().visible_count() - 1;
            effects.push(Effect::Debug(format!("{}: row {row} added", self.config.id)));
            self.message = None;
        }
        self.refocus();
    }

    fn remove_row(&mut self, effects: &mut Vec<Effect>) {
        let row = self.sync.state().visible_count().saturating_sub(1);
        if self.sync.remove_row() {
            effects.push(Effect::Debug(format!(
                "{}: row {row} removed",
                self.config.id
            )));
            self.message = None;
        }
        self.refocus();
    }

    fn choose(&mut self, row: usize, cursor: usize, effects: &mut Vec<Effect>) -> bool {
        let value: Option<String> = match self.picker_values().get(cursor) {
            Some(v) => v.map(str::to_string),
            None => return false,
        };
        if let Some(v) = &value {
            if self.sync.surface().is_option_disabled(row, v) {
                self.message = Some(format!(
                    "'{}' is already used in another row",
                    self.config.option_label(v)
                ));
                return false;
            }
        }
        if self.sync.on_selector_changed(row, value.as_deref()) {
            effects.push(Effect::Debug(format!(
                "{}: row {row} selector -> {}",
                self.config.id,
                value.as_deref().unwrap_or("(none)")
            )));
            self.message = None;
        }
        true
    }

    fn activate(&mut self, effects: &mut Vec<Effect>) {
        match self.focus {
            Target::Selector(row) => {
                let current = self.sync.state().selector(row);
                let cursor = self
                    .picker_values()
                    .iter()
                    .position(|v| *v == current)
                    .unwrap_or(0);
                self.mode = EditMode::Picking { row, cursor };
            }
            Target::Aux(row, aux) => {
                let name = &self.config.aux_fields[aux].name;
                let buffer = self
                    .sync
                    .state()
                    .aux_value(row, name)
                    .unwrap_or_default()
                    .to_string();
                self.mode = EditMode::Editing { row, aux, buffer };
            }
            Target::AddRow => self.add_row(effects),
            Target::RemoveRow => self.remove_row(effects),
        }
    }

    fn on_browse_key(&mut self, key: KeyCode, effects: &mut Vec<Effect>) {
        match key {
            KeyCode::Up => self.move_focus(-1),
            KeyCode::Down | KeyCode::Tab => self.move_focus(1),
            KeyCode::Enter => self.activate(effects),
            KeyCode::Char('+') => self.add_row(effects),
            KeyCode::Char('-') => self.remove_row(effects),
            KeyCode::Delete | KeyCode::Backspace => {
                if let Target::Selector(row) = self.focus {
                    self.choose(row, 0, effects);
                }
            }
            _ => {}
        }
    }

    fn on_picking_key(&mut self, key: KeyCode, row: usize, cursor: usize, effects: &mut Vec<Effect>) {
        let last = self.picker_values().len().saturating_sub(1);
        match key {
            KeyCode::Up => {
                self.mode = EditMode::Picking {
                    row,
                    cursor: cursor.saturating_sub(1),
                }
            }
            KeyCode::Down => {
                self.mode = EditMode::Picking {
                    row,
                    cursor: (cursor + 1).min(last),
                }
            }
            KeyCode::Enter => {
                if self.choose(row, cursor, effects) {
                    self.mode = EditMode::Browse;
                }
            }
            KeyCode::Esc => {
                self.mode = EditMode::Browse;
                self.message = None;
            }
            _ => {}
        }
    }

    fn on_editing_key(&mut self, key: KeyCode, effects: &mut Vec<Effect>) {
        let EditMode::Editing { row, aux, buffer } = &mut self.mode else {
            return;
        };
        match key {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let (row, aux, value) = (*row, *aux, std::mem::take(buffer));
                let name = self.config.aux_fields[aux].name.clone();
                if self.sync.on_aux_field_changed(row, &name, &value) {
                    effects.push(Effect::Debug(format!(
                        "{}: row {row} {name} -> {value}",
                        self.config.id
                    )));
                }
                self.mode = EditMode::Browse;
            }
            KeyCode::Esc => self.mode = EditMode::Browse,
            _ => {}
        }
    }
}

impl crate::widgets::Widget for RowFormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64, theme: &Theme) {
        let cursor_on = tick % 2 == 0;
        draw_row_form(f, area, self, focused, cursor_on, theme);
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.mode.clone() {
            EditMode::Browse => self.on_browse_key(key, &mut effects),
            EditMode::Picking { row, cursor } => {
                self.on_picking_key(key, row, cursor, &mut effects)
            }
            EditMode::Editing { .. } => self.on_editing_key(key, &mut effects),
        }
        effects
    }
}
