//! Exclusive-selection row synchronizer.
//!
//! A form owns a fixed number of row slots. Each slot carries one selector
//! value plus a configured list of auxiliary text fields. Rows `0..visible`
//! are shown; a selector value held by one row is disabled in every other
//! row, and a preview URL is rebuilt from all slots after every action.

pub mod initial;
pub mod preview;
pub mod surface;

use std::collections::{BTreeMap, HashSet};

use initial::InitialValues;
use preview::PreviewTemplate;
use surface::RowSurface;

/// Field-id naming scheme: `<prefix>_<row index>` for every field kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldScheme {
    pub selector_prefix: String,
    pub aux: Vec<AuxPrefix>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxPrefix {
    pub name: String,
    pub prefix: String,
}

impl FieldScheme {
    pub fn field_id(prefix: &str, row: usize) -> String {
        format!("{prefix}_{row}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSlot {
    pub selector: Option<String>,
    /// Selector value as of the last completed change on this row.
    pub previous_selector: Option<String>,
    /// Aux values, aligned with `FormState::aux_names`.
    pub aux: Vec<String>,
    pub visible: bool,
}

impl RowSlot {
    fn empty(aux_count: usize) -> Self {
        Self {
            aux: vec![String::new(); aux_count],
            ..Default::default()
        }
    }

    fn clear(&mut self) {
        self.selector = None;
        self.previous_selector = None;
        for v in &mut self.aux {
            v.clear();
        }
    }

    pub fn is_blank(&self) -> bool {
        self.selector.is_none() && self.aux.iter().all(String::is_empty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    rows: Vec<RowSlot>,
    visible_count: usize,
    aux_names: Vec<String>,
}

impl FormState {
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Highest permitted visible count.
    pub fn max_visible(&self) -> usize {
        self.capacity().saturating_sub(1).max(1)
    }

    pub fn rows(&self) -> &[RowSlot] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&RowSlot> {
        self.rows.get(index)
    }

    pub fn aux_names(&self) -> &[String] {
        &self.aux_names
    }

    pub fn is_visible(&self, index: usize) -> bool {
        index < self.visible_count
    }

    pub fn selector(&self, index: usize) -> Option<&str> {
        self.rows.get(index).and_then(|r| r.selector.as_deref())
    }

    pub fn aux_value(&self, index: usize, field: &str) -> Option<&str> {
        let pos = self.aux_names.iter().position(|n| n == field)?;
        self.rows
            .get(index)
            .and_then(|r| r.aux.get(pos))
            .map(String::as_str)
    }

    /// Row currently holding `value`, if any.
    pub fn holder_of(&self, value: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.selector.as_deref() == Some(value))
    }

    /// Field-id map the surrounding page would submit, covering every slot.
    pub fn field_values(&self, scheme: &FieldScheme) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.insert(
                FieldScheme::field_id(&scheme.selector_prefix, i),
                row.selector.clone().unwrap_or_default(),
            );
            for aux in &scheme.aux {
                let value = self.aux_value(i, &aux.name).unwrap_or_default();
                out.insert(FieldScheme::field_id(&aux.prefix, i), value.to_string());
            }
        }
        out
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

pub struct RowSynchronizer<S: RowSurface> {
    state: FormState,
    template: PreviewTemplate,
    surface: S,
    preview: String,
}

impl<S: RowSurface> RowSynchronizer<S> {
    /// Build the form state from `initial`, push it to `surface` and render
    /// the first preview.
    ///
    /// Saved rows past index 0 are compacted upward so that visible rows stay
    /// contiguous; aux-only rows, duplicated selector values and rows beyond
    /// the visible cap are dropped with a warning.
    pub fn initialize(
        capacity: usize,
        aux_names: Vec<String>,
        template: PreviewTemplate,
        initial: InitialValues,
        surface: S,
    ) -> Self {
        let capacity = if capacity < 2 {
            log::warn!("capacity {capacity} too small, using 2");
            2
        } else {
            capacity
        };
        let aux_count = aux_names.len();
        let mut rows = vec![RowSlot::empty(aux_count); capacity];
        let fill = |slot: &mut RowSlot, init: &initial::InitialRow| {
            slot.selector = normalize(init.selector.as_deref());
            slot.previous_selector = slot.selector.clone();
            for (pos, name) in aux_names.iter().enumerate() {
                if let Some(v) = init.aux.get(name) {
                    slot.aux[pos] = v.clone();
                }
            }
        };

        let mut held: HashSet<String> = HashSet::new();
        if let Some(first) = initial.rows.get(&0) {
            fill(&mut rows[0], first);
            if let Some(sel) = &rows[0].selector {
                held.insert(sel.clone());
            }
        }
        let max_visible = capacity - 1;
        let mut next = 1;
        for (&index, init) in initial.rows.range(1..) {
            if index >= capacity {
                log::warn!("initial row {index} beyond capacity {capacity}, skipped");
                continue;
            }
            let Some(sel) = normalize(init.selector.as_deref()) else {
                if init.aux.values().any(|v| !v.is_empty()) {
                    log::warn!("initial row {index} has no selection, aux values dropped");
                }
                continue;
            };
            if held.contains(&sel) {
                log::warn!("initial row {index} repeats selection '{sel}', dropped");
                continue;
            }
            if next >= max_visible {
                log::warn!("initial row {index} exceeds {max_visible} visible rows, dropped");
                continue;
            }
            if index != next {
                log::warn!("initial row {index} compacted to row {next}");
            }
            fill(&mut rows[next], init);
            held.insert(sel);
            next += 1;
        }
        for (i, row) in rows.iter_mut().enumerate() {
            row.visible = i < next;
        }

        let mut sync = Self {
            state: FormState {
                rows,
                visible_count: next,
                aux_names,
            },
            template,
            surface,
            preview: String::new(),
        };
        sync.push_initial();
        sync
    }

    fn push_initial(&mut self) {
        let capacity = self.state.capacity();
        for i in 0..capacity {
            let row = &self.state.rows[i];
            self.surface.set_row_visible(i, row.visible);
            self.surface.set_selector_value(i, row.selector.as_deref());
            for (pos, name) in self.state.aux_names.iter().enumerate() {
                self.surface.set_aux_value(i, name, &row.aux[pos]);
            }
        }
        for i in 0..capacity {
            if let Some(sel) = self.state.rows[i].selector.clone() {
                self.set_enabled_elsewhere(i, &sel, false);
            }
        }
        self.update_controls();
        self.render();
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn template(&self) -> &PreviewTemplate {
        &self.template
    }

    /// Last preview pushed to the surface.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Apply a selector change on a visible row. Returns `false` and leaves
    /// the state untouched when the row is hidden or out of range, or when
    /// another row already holds `new_value`.
    pub fn on_selector_changed(&mut self, row: usize, new_value: Option<&str>) -> bool {
        if !self.state.is_visible(row) {
            log::debug!("selector change on hidden row {row} ignored");
            return false;
        }
        let new_value = normalize(new_value);
        if let Some(v) = &new_value {
            if let Some(holder) = self.state.holder_of(v) {
                if holder != row {
                    log::debug!("'{v}' already held by row {holder}, row {row} unchanged");
                    return false;
                }
            }
        }
        let previous = self.state.rows[row].previous_selector.take();
        if let Some(prev) = &previous {
            self.set_enabled_elsewhere(row, prev, true);
        }
        if let Some(v) = &new_value {
            self.set_enabled_elsewhere(row, v, false);
        }
        let slot = &mut self.state.rows[row];
        slot.selector = new_value.clone();
        slot.previous_selector = new_value;
        self.surface
            .set_selector_value(row, self.state.rows[row].selector.as_deref());
        log::debug!(
            "row {row} selector {:?} -> {:?}",
            previous,
            self.state.rows[row].selector
        );
        self.render();
        true
    }

    /// Store an aux value. Always re-renders, even if the value is unchanged.
    pub fn on_aux_field_changed(&mut self, row: usize, field: &str, value: &str) -> bool {
        if !self.state.is_visible(row) {
            log::debug!("aux change on hidden row {row} ignored");
            return false;
        }
        let Some(pos) = self.state.aux_names.iter().position(|n| n == field) else {
            log::debug!("unknown aux field '{field}'");
            return false;
        };
        self.state.rows[row].aux[pos] = value.to_string();
        self.surface.set_aux_value(row, field, value);
        self.render();
        true
    }

    pub fn add_row(&mut self) -> bool {
        if self.state.visible_count >= self.state.max_visible() {
            log::debug!("add row ignored at {} visible rows", self.state.visible_count);
            return false;
        }
        let index = self.state.visible_count;
        self.state.visible_count += 1;
        self.state.rows[index].visible = true;
        self.surface.set_row_visible(index, true);
        self.update_controls();
        log::debug!("row {index} shown");
        self.render();
        true
    }

    /// Clear and hide the last visible row. Row 0 is never removed.
    pub fn remove_row(&mut self) -> bool {
        if self.state.visible_count <= 1 {
            log::debug!("remove row ignored, only row 0 visible");
            return false;
        }
        let index = self.state.visible_count - 1;
        if let Some(prev) = self.state.rows[index].previous_selector.clone() {
            self.set_enabled_elsewhere(index, &prev, true);
        }
        self.state.rows[index].clear();
        self.surface.set_selector_value(index, None);
        for name in self.state.aux_names.clone() {
            self.surface.set_aux_value(index, &name, "");
        }
        self.state.rows[index].visible = false;
        self.surface.set_row_visible(index, false);
        self.state.visible_count -= 1;
        self.update_controls();
        log::debug!("row {index} cleared and hidden");
        self.render();
        true
    }

    fn set_enabled_elsewhere(&mut self, row: usize, value: &str, enabled: bool) {
        for other in 0..self.state.capacity() {
            if other != row {
                self.surface.set_option_enabled(other, value, enabled);
            }
        }
    }

    fn update_controls(&mut self) {
        let visible = self.state.visible_count;
        self.surface
            .set_add_enabled(visible < self.state.max_visible());
        self.surface.set_remove_enabled(visible > 1);
    }

    fn render(&mut self) {
        self.preview = self.template.encode(&self.state);
        self.surface.show_preview(&self.preview);
    }
}
