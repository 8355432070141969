use std::collections::{BTreeMap, BTreeSet};

/// Capability the synchronizer drives. Implementors own the rendered form
/// (rows, option lists, add/remove controls and the preview target); the
/// synchronizer never reads back from it.
pub trait RowSurface {
    fn set_option_enabled(&mut self, row: usize, value: &str, enabled: bool);
    fn set_row_visible(&mut self, row: usize, visible: bool);
    fn set_selector_value(&mut self, row: usize, value: Option<&str>);
    fn set_aux_value(&mut self, row: usize, field: &str, value: &str);
    fn set_add_enabled(&mut self, enabled: bool);
    fn set_remove_enabled(&mut self, enabled: bool);
    fn show_preview(&mut self, src: &str);
}

/// In-memory surface the terminal form renders from.
#[derive(Clone, Debug, Default)]
pub struct Screen {
    visible: Vec<bool>,
    selectors: Vec<Option<String>>,
    aux: Vec<BTreeMap<String, String>>,
    disabled: Vec<BTreeSet<String>>,
    add_enabled: bool,
    remove_enabled: bool,
    preview_src: Option<String>,
    preview_pushes: u64,
}

impl Screen {
    pub fn new(capacity: usize) -> Self {
        Self {
            visible: vec![false; capacity],
            selectors: vec![None; capacity],
            aux: vec![BTreeMap::new(); capacity],
            disabled: vec![BTreeSet::new(); capacity],
            ..Default::default()
        }
    }

    pub fn is_row_visible(&self, row: usize) -> bool {
        self.visible.get(row).copied().unwrap_or(false)
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
    }

    pub fn selector(&self, row: usize) -> Option<&str> {
        self.selectors.get(row).and_then(|s| s.as_deref())
    }

    pub fn aux(&self, row: usize, field: &str) -> &str {
        self.aux
            .get(row)
            .and_then(|m| m.get(field))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_option_disabled(&self, row: usize, value: &str) -> bool {
        self.disabled
            .get(row)
            .map(|set| set.contains(value))
            .unwrap_or(false)
    }

    pub fn add_enabled(&self) -> bool {
        self.add_enabled
    }

    pub fn remove_enabled(&self) -> bool {
        self.remove_enabled
    }

    pub fn preview_src(&self) -> Option<&str> {
        self.preview_src.as_deref()
    }

    pub fn preview_pushes(&self) -> u64 {
        self.preview_pushes
    }
}

impl RowSurface for Screen {
    fn set_option_enabled(&mut self, row: usize, value: &str, enabled: bool) {
        // Missing rows are ignored; the state mutation has already happened.
        let Some(set) = self.disabled.get_mut(row) else {
            return;
        };
        if enabled {
            set.remove(value);
        } else {
            set.insert(value.to_string());
        }
    }

    fn set_row_visible(&mut self, row: usize, visible: bool) {
        if let Some(v) = self.visible.get_mut(row) {
            *v = visible;
        }
    }

    fn set_selector_value(&mut self, row: usize, value: Option<&str>) {
        if let Some(slot) = self.selectors.get_mut(row) {
            *slot = value.map(str::to_string);
        }
    }

    fn set_aux_value(&mut self, row: usize, field: &str, value: &str) {
        if let Some(m) = self.aux.get_mut(row) {
            if value.is_empty() {
                m.remove(field);
            } else {
                m.insert(field.to_string(), value.to_string());
            }
        }
    }

    fn set_add_enabled(&mut self, enabled: bool) {
        self.add_enabled = enabled;
    }

    fn set_remove_enabled(&mut self, enabled: bool) {
        self.remove_enabled = enabled;
    }

    fn show_preview(&mut self, src: &str) {
        self.preview_src = Some(src.to_string());
        self.preview_pushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_rows_are_ignored() {
        let mut s = Screen::new(2);
        s.set_option_enabled(5, "a", false);
        s.set_row_visible(5, true);
        s.set_selector_value(5, Some("a"));
        s.set_aux_value(5, "row", "1");
        assert!(!s.is_row_visible(5));
        assert!(s.selector(5).is_none());
        assert_eq!(s.aux(5, "row"), "");
        assert!(!s.is_option_disabled(5, "a"));
    }

    #[test]
    fn option_toggling_is_idempotent() {
        let mut s = Screen::new(2);
        s.set_option_enabled(1, "a", false);
        s.set_option_enabled(1, "a", false);
        assert!(s.is_option_disabled(1, "a"));
        s.set_option_enabled(1, "a", true);
        assert!(!s.is_option_disabled(1, "a"));
        s.set_option_enabled(1, "a", true);
        assert!(!s.is_option_disabled(1, "a"));
    }

    #[test]
    fn preview_pushes_are_counted() {
        let mut s = Screen::new(1);
        assert!(s.preview_src().is_none());
        s.show_preview("x");
        s.show_preview("x");
        assert_eq!(s.preview_src(), Some("x"));
        assert_eq!(s.preview_pushes(), 2);
    }
}
