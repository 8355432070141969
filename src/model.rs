use crate::sync::initial::{parse_initial, InitialValues};
use crate::sync::preview::{PreviewTemplate, DEFAULT_PLACEHOLDER};
use crate::sync::{AuxPrefix, FieldScheme};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectorConfig {
    pub prefix: String,
    #[serde(default = "default_selector_label")]
    pub label: String,
    #[serde(default)]
    pub options: Vec<SelectorOption>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuxFieldConfig {
    pub name: String,
    pub prefix: String,
    // Falls back to the field name
    #[serde(default)]
    pub label: Option<String>,
}

impl AuxFieldConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormConfig {
    pub id: String,
    pub title: String,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    pub template: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    pub selector: SelectorConfig,
    pub aux_fields: Vec<AuxFieldConfig>,
    // Saved field values keyed by field id, e.g. id_search_field_0: "3"
    #[serde(default)]
    pub initial: BTreeMap<String, String>,
}

impl FormConfig {
    pub fn scheme(&self) -> FieldScheme {
        FieldScheme {
            selector_prefix: self.selector.prefix.clone(),
            aux: self
                .aux_fields
                .iter()
                .map(|a| AuxPrefix {
                    name: a.name.clone(),
                    prefix: a.prefix.clone(),
                })
                .collect(),
        }
    }

    pub fn aux_names(&self) -> Vec<String> {
        self.aux_fields.iter().map(|a| a.name.clone()).collect()
    }

    pub fn preview_template(&self) -> PreviewTemplate {
        PreviewTemplate::with_placeholder(self.template.clone(), self.placeholder.clone())
    }

    pub fn initial_values(&self) -> InitialValues {
        parse_initial(&self.scheme(), self.capacity, &self.initial)
    }

    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.selector
            .options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
            .unwrap_or(value)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub header: Option<String>,
    pub forms: Vec<FormConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            header: Some("Row Sync".to_string()),
            forms: vec![default_search_form()],
        }
    }
}

fn default_capacity() -> usize {
    20
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_selector_label() -> String {
    "Field".to_string()
}

fn default_search_form() -> FormConfig {
    let option = |value: &str, label: &str| SelectorOption {
        value: value.into(),
        label: label.into(),
    };
    let aux = |name: &str, label: &str| AuxFieldConfig {
        name: name.into(),
        prefix: format!("id_{name}_field"),
        label: Some(label.into()),
    };
    FormConfig {
        id: "search_form".into(),
        title: "Search form".into(),
        capacity: default_capacity(),
        template: "/preview/search_form/image_string/".into(),
        placeholder: default_placeholder(),
        selector: SelectorConfig {
            prefix: "id_search_field".into(),
            label: "Search field".into(),
            options: vec![
                option("1", "Title"),
                option("2", "Author"),
                option("3", "Year"),
                option("4", "Place"),
                option("5", "Keyword"),
                option("6", "Full text"),
            ],
        },
        aux_fields: vec![aux("row", "Row"), aux("column", "Column"), aux("size", "Size")],
        initial: BTreeMap::new(),
    }
}

pub(crate) fn validate_app_config(cfg: &AppConfig) -> Result<(), String> {
    if cfg.forms.is_empty() {
        return Err("config defines no forms".to_string());
    }
    if cfg.forms.len() > 12 {
        return Err(format!(
            "at most 12 forms fit the F-key tabs, got {}",
            cfg.forms.len()
        ));
    }
    let mut ids = HashSet::new();
    for (i, form) in cfg.forms.iter().enumerate() {
        if !ids.insert(&form.id) {
            return Err(format!("duplicate form id: '{}' at index {}", form.id, i));
        }
        validate_form(form)?;
    }
    Ok(())
}

fn validate_form(form: &FormConfig) -> Result<(), String> {
    if form.capacity < 2 {
        return Err(format!(
            "form '{}' capacity must be at least 2, got {}",
            form.id, form.capacity
        ));
    }
    if form.aux_fields.is_empty() {
        return Err(format!("form '{}' needs at least one aux field", form.id));
    }
    let count = form.preview_template().placeholder_count();
    if count != 1 {
        return Err(format!(
            "form '{}' template must contain '{}' exactly once, found {}",
            form.id, form.placeholder, count
        ));
    }
    let mut names = HashSet::new();
    let mut prefixes = HashSet::new();
    prefixes.insert(form.selector.prefix.as_str());
    if form.selector.prefix.is_empty() {
        return Err(format!("form '{}' selector prefix is empty", form.id));
    }
    for aux in &form.aux_fields {
        if aux.name.is_empty() || aux.prefix.is_empty() {
            return Err(format!(
                "form '{}' aux fields need a name and a prefix",
                form.id
            ));
        }
        if !names.insert(aux.name.as_str()) {
            return Err(format!(
                "form '{}' repeats aux field '{}'",
                form.id, aux.name
            ));
        }
        if !prefixes.insert(aux.prefix.as_str()) {
            return Err(format!(
                "form '{}' reuses field prefix '{}'",
                form.id, aux.prefix
            ));
        }
    }
    let mut values = HashSet::new();
    for opt in &form.selector.options {
        if opt.value.is_empty() {
            return Err(format!(
                "form '{}' option '{}' has an empty value",
                form.id, opt.label
            ));
        }
        if !values.insert(opt.value.as_str()) {
            return Err(format!(
                "form '{}' repeats option value '{}'",
                form.id, opt.value
            ));
        }
    }
    Ok(())
}
