use crate::ui::{AppState, ToastLevel};
use crate::widgets::tabs::tab_for_key;
use crate::widgets::Widget;
use crossterm::event::{KeyCode, KeyModifiers};

pub enum AppMsg {
    SwitchForm(usize),
    Key(KeyCode),
    CopyPreview,
    ExportValues,
    ToggleDebug,
    Quit,
}

pub enum Effect {
    Debug(String),
    CopyToClipboard {
        text: String,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

/// Map a key press to a message. While the current form is picking or
/// editing, every key goes to the form.
pub fn msg_for_key(state: &AppState, code: KeyCode, modifiers: KeyModifiers) -> Option<AppMsg> {
    let capturing = state
        .forms
        .get(state.current)
        .map(|f| f.is_capturing())
        .unwrap_or(false);
    if capturing {
        return Some(AppMsg::Key(code));
    }
    match code {
        KeyCode::F(n) => tab_for_key(n, state.forms.len()).map(AppMsg::SwitchForm),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(AppMsg::CopyPreview)
        }
        KeyCode::Char('q') => Some(AppMsg::Quit),
        KeyCode::Char('e') => Some(AppMsg::ExportValues),
        KeyCode::Char('d') => Some(AppMsg::ToggleDebug),
        other => Some(AppMsg::Key(other)),
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        SwitchForm(index) => {
            if index < state.forms.len() && index != state.current {
                state.current = index;
                effects.push(Effect::Debug(format!(
                    "switched to form {}",
                    state.forms[index].config.id
                )));
            }
        }
        Key(code) => {
            if let Some(form) = state.forms.get_mut(state.current) {
                effects.extend(form.on_key(code));
            }
        }
        CopyPreview => {
            if let Some(form) = state.forms.get(state.current) {
                let text = form.sync.preview().to_string();
                if !text.is_empty() {
                    effects.push(Effect::CopyToClipboard { text });
                }
            }
        }
        ExportValues => {
            if let Some(form) = state.forms.get(state.current) {
                let values = form.sync.state().field_values(&form.config.scheme());
                let id = form.config.id.clone();
                match serde_json::to_string_pretty(&values) {
                    Ok(json) => {
                        effects.push(Effect::Debug(format!(
                            "export {id}: {}",
                            serde_json::to_string(&values).unwrap_or_default()
                        )));
                        effects.push(Effect::ShowToast {
                            text: format!("Exported {} fields of {id}", values.len()),
                            level: ToastLevel::Success,
                            seconds: 3,
                        });
                        state.exported.insert(id, json);
                    }
                    Err(e) => effects.push(Effect::ShowToast {
                        text: format!("Export failed: {e}"),
                        level: ToastLevel::Error,
                        seconds: 5,
                    }),
                }
            }
        }
        ToggleDebug => state.show_debug = !state.show_debug,
        Quit => state.should_quit = true,
    }
    effects
}

#[cfg(test)]
mod tests;
