use super::*;
use crate::model::AppConfig;

fn two_form_state() -> AppState {
    let mut cfg = AppConfig::default();
    let mut second = cfg.forms[0].clone();
    second.id = "result_card".into();
    second.title = "Result card".into();
    second.template = "/preview/result_card/image_string/".into();
    cfg.forms.push(second);
    AppState::new(cfg)
}

#[test]
fn function_keys_switch_forms() {
    let mut st = two_form_state();
    let msg = msg_for_key(&st, KeyCode::F(2), KeyModifiers::NONE).unwrap();
    let effects = update(&mut st, msg);
    assert_eq!(st.current, 1);
    assert!(matches!(&effects[..], [Effect::Debug(l)] if l.contains("result_card")));

    // Same tab again is a no-op; unknown tab maps to nothing
    let effects = update(&mut st, AppMsg::SwitchForm(1));
    assert!(effects.is_empty());
    assert!(msg_for_key(&st, KeyCode::F(5), KeyModifiers::NONE).is_none());
}

#[test]
fn keys_reach_only_the_current_form() {
    let mut st = two_form_state();
    update(&mut st, AppMsg::SwitchForm(1));
    update(&mut st, AppMsg::Key(KeyCode::Char('+')));
    assert_eq!(st.forms[1].sync.state().visible_count(), 2);
    assert_eq!(st.forms[0].sync.state().visible_count(), 1);
}

#[test]
fn capturing_form_swallows_global_shortcuts() {
    let mut st = two_form_state();
    update(&mut st, AppMsg::Key(KeyCode::Enter));
    assert!(st.forms[0].is_capturing());
    let msg = msg_for_key(&st, KeyCode::Char('q'), KeyModifiers::NONE).unwrap();
    assert!(matches!(msg, AppMsg::Key(KeyCode::Char('q'))));
    update(&mut st, msg);
    assert!(!st.should_quit);
}

#[test]
fn copy_preview_emits_clipboard_effect() {
    let mut st = two_form_state();
    let msg = msg_for_key(&st, KeyCode::Char('c'), KeyModifiers::CONTROL).unwrap();
    let effects = update(&mut st, msg);
    match &effects[..] {
        [Effect::CopyToClipboard { text }] => {
            assert!(text.starts_with("/preview/search_form/"));
            assert_eq!(text, st.forms[0].sync.preview());
        }
        _ => panic!("expected a single CopyToClipboard effect"),
    }
}

#[test]
fn export_stores_field_values_as_json() {
    let mut st = two_form_state();
    update(&mut st, AppMsg::Key(KeyCode::Enter));
    update(&mut st, AppMsg::Key(KeyCode::Down));
    update(&mut st, AppMsg::Key(KeyCode::Enter));
    let effects = update(&mut st, AppMsg::ExportValues);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ShowToast { level: ToastLevel::Success, .. })));
    let json = &st.exported["search_form"];
    let v: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(v["id_search_field_0"], "1");
    assert_eq!(v["id_size_field_19"], "");
    assert_eq!(v.as_object().unwrap().len(), 80);
}

#[test]
fn quit_and_debug_toggle() {
    let mut st = two_form_state();
    let msg = msg_for_key(&st, KeyCode::Char('d'), KeyModifiers::NONE).unwrap();
    update(&mut st, msg);
    assert!(st.show_debug);
    let msg = msg_for_key(&st, KeyCode::Char('q'), KeyModifiers::NONE).unwrap();
    update(&mut st, msg);
    assert!(st.should_quit);
}
