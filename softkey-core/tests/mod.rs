use softkey_core::config::{AppConfig, DEFAULT_IDLE_DELAY_MS, Mode};
use softkey_core::dom::Document;
use softkey_core::error::{ConfigError, WatcherError};
use softkey_core::platform::Platform;
use softkey_core::root::{HostClasses, KEYBOARD_OPEN_CLASS};
use softkey_core::services::ShimPlatform;
use softkey_core::startup::{BackButton, StartupPlan};
use softkey_core::style::{HideRule, StyleSheet};
use softkey_core::watcher::{EventBusWatcher, PlatformKeyboardWatcher};
use softkey_core::{KeyboardSignal, ResizeMode, VisibilityState};
use std::io::Write;
use std::time::Duration;

const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
const ANDROID_UA: &str =
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Chrome/120.0 Mobile Safari/537.36";
const DESKTOP_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

// ============================================================================
// KeyboardSignal / ResizeMode Tests
// ============================================================================

#[test]
fn test_keyboard_signal_serialization() {
    let signal = KeyboardSignal::WillShow {
        keyboard_height: Some(320),
    };
    let json = serde_json::to_string(&signal).unwrap();
    let back: KeyboardSignal = serde_json::from_str(&json).unwrap();
    assert_eq!(back, signal);
}

#[test]
fn test_resize_mode_lowercase_names() {
    let mode: ResizeMode = serde_json::from_str("\"ionic\"").unwrap();
    assert_eq!(mode, ResizeMode::Ionic);
    assert_eq!(serde_json::to_string(&ResizeMode::None).unwrap(), "\"none\"");
}

#[test]
fn test_visibility_state_default_hidden() {
    assert!(!VisibilityState::default().is_keyboard_visible);
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_watcher_error_display() {
    assert!(WatcherError::Unavailable.to_string().contains("unavailable"));
    let rejected = WatcherError::Rejected("no window".to_string());
    assert!(rejected.to_string().contains("no window"));
}

#[test]
fn test_watcher_rejects_dropped_receiver() {
    let bus = EventBusWatcher::default();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);

    let err = bus.listen(tx).unwrap_err();
    assert!(matches!(err, WatcherError::Rejected(_)));
    assert_eq!(bus.active_listeners(), 0);
    assert_eq!(bus.stats().subscribed, 0);
}

// ============================================================================
// AppConfig Tests
// ============================================================================

#[test]
fn test_config_default_is_empty() {
    let config = AppConfig::default();
    assert!(config.mode.is_none());
    assert!(!config.is_testing());
    assert!(!config.force_statusbar_padding());
    assert!(!config.experimental_close_watcher());
    assert_eq!(config.idle_delay(), Duration::from_millis(DEFAULT_IDLE_DELAY_MS));
}

#[test]
fn test_config_parses_camel_case_and_private_keys() {
    let config = AppConfig::from_json(
        r#"{
            "mode": "ios",
            "_testing": true,
            "_forceStatusbarPadding": true,
            "statusTap": false,
            "inputShims": true,
            "hardwareBackButton": false,
            "experimentalCloseWatcher": true,
            "idleDelayMs": 5
        }"#,
    )
    .unwrap();

    assert_eq!(config.mode, Some(Mode::Ios));
    assert!(config.is_testing());
    assert!(config.force_statusbar_padding());
    assert!(!config.status_tap_or(true));
    assert!(config.input_shims_or(false));
    assert!(!config.hardware_back_button_or(true));
    assert!(config.experimental_close_watcher());
    assert_eq!(config.idle_delay(), Duration::from_millis(5));
}

#[test]
fn test_config_missing_flags_fall_back() {
    let config = AppConfig::from_json("{}").unwrap();
    assert!(config.status_tap_or(true));
    assert!(!config.status_tap_or(false));
    assert!(config.hardware_back_button_or(true));
}

#[test]
fn test_config_invalid_json_is_parse_error() {
    let err = AppConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_config_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "mode": "md", "statusTap": true }}"#).unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.mode, Some(Mode::Md));
    assert_eq!(config.status_tap, Some(true));
}

#[test]
fn test_config_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = AppConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[test]
fn test_mode_classes() {
    assert_eq!(Mode::Ios.as_class(), "ios");
    assert_eq!(Mode::Md.as_class(), "md");
}

// ============================================================================
// Platform Tests
// ============================================================================

#[test]
fn test_platform_iphone_browser() {
    let platform = Platform::from_user_agent(IPHONE_UA, false);
    assert!(platform.ios);
    assert!(!platform.android);
    assert!(platform.mobile);
    assert!(platform.mobileweb);
    assert!(!platform.hybrid);
    assert_eq!(platform.default_mode(), Mode::Ios);
    assert!(platform.needs_input_shims());
}

#[test]
fn test_platform_android_hybrid() {
    let platform = Platform::from_user_agent(ANDROID_UA, true);
    assert!(platform.android);
    assert!(platform.hybrid);
    assert!(!platform.mobileweb);
    assert_eq!(platform.default_mode(), Mode::Md);
    assert!(!platform.needs_input_shims());
}

#[test]
fn test_platform_android_browser_needs_shims() {
    let platform = Platform::from_user_agent(ANDROID_UA, false);
    assert!(platform.mobileweb);
    assert!(platform.needs_input_shims());
}

#[test]
fn test_platform_desktop() {
    let platform = Platform::from_user_agent(DESKTOP_UA, false);
    assert!(!platform.mobile);
    assert!(!platform.needs_input_shims());
    assert!(!platform.close_watcher);
    assert!(platform.with_close_watcher(true).close_watcher);
}

// ============================================================================
// StartupPlan Tests
// ============================================================================

#[test]
fn test_plan_desktop_defaults() {
    let plan = StartupPlan::resolve(
        &AppConfig::default(),
        &Platform::from_user_agent(DESKTOP_UA, false),
    );
    assert!(plan.tap_click);
    assert!(!plan.status_tap);
    assert_eq!(plan.input_shims, None);
    assert_eq!(plan.back_button, BackButton::Block);
    assert!(!plan.close_watcher_ignored);
    assert!(plan.keyboard_assist);
    assert!(plan.focus_visible);
}

#[test]
fn test_plan_testing_flag_disables_tap_click() {
    let config = AppConfig {
        testing: Some(true),
        ..AppConfig::default()
    };
    let plan = StartupPlan::resolve(&config, &Platform::default());
    assert!(!plan.tap_click);
}

#[test]
fn test_plan_hybrid_defaults() {
    let plan = StartupPlan::resolve(
        &AppConfig::default(),
        &Platform::from_user_agent(ANDROID_UA, true),
    );
    assert!(plan.status_tap);
    assert_eq!(plan.back_button, BackButton::Start);
    assert_eq!(plan.input_shims, None);
}

#[test]
fn test_plan_input_shims_platform() {
    let ios = StartupPlan::resolve(
        &AppConfig::default(),
        &Platform::from_user_agent(IPHONE_UA, true),
    );
    assert_eq!(ios.input_shims, Some(ShimPlatform::Ios));

    let android = StartupPlan::resolve(
        &AppConfig::default(),
        &Platform::from_user_agent(ANDROID_UA, false),
    );
    assert_eq!(android.input_shims, Some(ShimPlatform::Android));
}

#[test]
fn test_plan_config_overrides_platform() {
    let config = AppConfig {
        status_tap: Some(false),
        input_shims: Some(false),
        hardware_back_button: Some(false),
        ..AppConfig::default()
    };
    let plan = StartupPlan::resolve(&config, &Platform::from_user_agent(IPHONE_UA, true));
    assert!(!plan.status_tap);
    assert_eq!(plan.input_shims, None);
    assert_eq!(plan.back_button, BackButton::Block);
}

#[test]
fn test_plan_close_watcher_enables_back_button() {
    let config = AppConfig {
        experimental_close_watcher: Some(true),
        ..AppConfig::default()
    };
    let platform = Platform::from_user_agent(DESKTOP_UA, false).with_close_watcher(true);
    let plan = StartupPlan::resolve(&config, &platform);
    assert_eq!(plan.back_button, BackButton::Start);
    assert!(!plan.close_watcher_ignored);
}

#[test]
fn test_plan_close_watcher_ignored_when_back_button_disabled() {
    let config = AppConfig {
        experimental_close_watcher: Some(true),
        hardware_back_button: Some(false),
        ..AppConfig::default()
    };
    let platform = Platform::from_user_agent(DESKTOP_UA, false).with_close_watcher(true);
    let plan = StartupPlan::resolve(&config, &platform);
    assert_eq!(plan.back_button, BackButton::Block);
    assert!(plan.close_watcher_ignored);
}

#[test]
fn test_plan_close_watcher_unsupported_is_not_flagged() {
    let config = AppConfig {
        experimental_close_watcher: Some(true),
        hardware_back_button: Some(false),
        ..AppConfig::default()
    };
    let plan = StartupPlan::resolve(&config, &Platform::from_user_agent(DESKTOP_UA, false));
    assert!(!plan.close_watcher_ignored);
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_document_append_and_ancestors() {
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let tabs = doc.append(root, "ion-tabs");
    let bar = doc.append(tabs, "ion-tab-bar");

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.tag(bar), "ion-tab-bar");
    assert_eq!(doc.parent(bar), Some(tabs));
    assert_eq!(doc.children(root), &[tabs]);
    let ancestors: Vec<_> = doc.ancestors(bar).collect();
    assert_eq!(ancestors, vec![tabs, root]);
    assert_eq!(doc.get(2), Some(bar));
    assert_eq!(doc.get(3), None);
}

#[test]
fn test_document_toggle_class_reports_change() {
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    assert!(doc.toggle_class(root, "a", true));
    assert!(!doc.toggle_class(root, "a", true));
    assert!(doc.has_class(root, "a"));
    assert!(doc.toggle_class(root, "a", false));
    assert!(!doc.toggle_class(root, "a", false));
    assert!(!doc.has_class(root, "a"));
}

#[test]
fn test_document_markup() {
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    doc.toggle_class(root, "md", true);
    let bar = doc.append(root, "ion-tab-bar");
    doc.set_slot(bar, Some("top"));

    let markup = doc.to_string();
    assert_eq!(markup, "<ion-app class=\"md\">\n  <ion-tab-bar slot=\"top\">\n");
}

// ============================================================================
// StyleSheet Tests
// ============================================================================

#[test]
fn test_bottom_bar_hidden_under_keyboard_class() {
    let sheet = StyleSheet::keyboard_defaults();
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let bar = doc.append(root, "ion-tab-bar");

    assert!(!sheet.is_hidden(&doc, bar));
    doc.toggle_class(root, KEYBOARD_OPEN_CLASS, true);
    assert!(sheet.is_hidden(&doc, bar));

    doc.set_slot(bar, Some("bottom"));
    assert!(sheet.is_hidden(&doc, bar));
}

#[test]
fn test_top_bar_not_hidden_under_keyboard_class() {
    let sheet = StyleSheet::keyboard_defaults();
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let bar = doc.append(root, "ion-tab-bar");
    doc.set_slot(bar, Some("top"));

    doc.toggle_class(root, KEYBOARD_OPEN_CLASS, true);
    assert!(!sheet.is_hidden(&doc, bar));
}

#[test]
fn test_rule_matches_deep_descendants_only() {
    let sheet = StyleSheet::keyboard_defaults();
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let tabs = doc.append(root, "ion-tabs");
    let bar = doc.append(tabs, "ion-tab-bar");
    let content = doc.append(tabs, "ion-content");

    doc.toggle_class(root, KEYBOARD_OPEN_CLASS, true);
    assert!(sheet.is_hidden(&doc, bar));
    assert!(!sheet.is_hidden(&doc, content));
    assert!(!sheet.is_hidden(&doc, root));
}

#[test]
fn test_rule_ignores_class_on_element_itself() {
    let rule = HideRule::new("ion-tab-bar", KEYBOARD_OPEN_CLASS);
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let bar = doc.append(root, "ion-tab-bar");
    doc.toggle_class(bar, KEYBOARD_OPEN_CLASS, true);
    assert!(!rule.matches(&doc, bar));
}

#[test]
fn test_custom_rule() {
    let sheet = StyleSheet::new().with_rule(HideRule::new("ion-footer", "keyboard-is-open"));
    assert_eq!(sheet.rules().len(), 1);
    let mut doc = Document::new("ion-app");
    let root = doc.root();
    let footer = doc.append(root, "ion-footer");
    doc.toggle_class(root, "keyboard-is-open", true);
    assert!(sheet.is_hidden(&doc, footer));
}

// ============================================================================
// HostClasses Tests
// ============================================================================

#[test]
fn test_host_classes_follow_state() {
    let host = HostClasses {
        mode: Mode::Md,
        statusbar_padding: false,
    };
    let mut doc = Document::new("ion-app");
    let root = doc.root();

    host.apply(&mut doc, root, VisibilityState::default());
    let classes: Vec<&str> = doc.classes(root).collect();
    assert_eq!(classes, vec!["ion-page", "md"]);

    host.apply(&mut doc, root, VisibilityState { is_keyboard_visible: true });
    assert!(doc.has_class(root, KEYBOARD_OPEN_CLASS));

    host.apply(&mut doc, root, VisibilityState::default());
    assert!(!doc.has_class(root, KEYBOARD_OPEN_CLASS));
}

#[test]
fn test_host_classes_statusbar_padding() {
    let host = HostClasses {
        mode: Mode::Ios,
        statusbar_padding: true,
    };
    let classes = host.classes(VisibilityState::default());
    assert!(classes.contains(&("force-statusbar-padding", true)));
    assert!(classes.contains(&("ios", true)));
}
