//! Deferred startup of platform shims.
//!
//! Which shims to start is a pure function of config and platform
//! ([`StartupPlan::resolve`]); [`run`] then starts them concurrently. The
//! shims are independent of each other, so no start order is imposed.

use crate::config::AppConfig;
use crate::platform::Platform;
use crate::services::{FocusVisible, PlatformServices, ShimPlatform};
use std::sync::{Arc, OnceLock};

/// Where the focus-visible utility lands once it has loaded.
pub type FocusSlot = Arc<OnceLock<Arc<dyn FocusVisible>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackButton {
    Start,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupPlan {
    pub tap_click: bool,
    pub status_tap: bool,
    pub input_shims: Option<ShimPlatform>,
    pub back_button: BackButton,
    /// Close watcher was requested but the back button is disabled, so the
    /// request has no effect.
    pub close_watcher_ignored: bool,
    pub keyboard_assist: bool,
    pub focus_visible: bool,
}

impl StartupPlan {
    pub fn resolve(config: &AppConfig, platform: &Platform) -> Self {
        let input_shims = config
            .input_shims_or(platform.needs_input_shims())
            .then(|| {
                if platform.ios {
                    ShimPlatform::Ios
                } else {
                    ShimPlatform::Android
                }
            });

        let close_watcher = config.experimental_close_watcher() && platform.close_watcher;
        let back_button_default = platform.hybrid || close_watcher;
        let back_button = if config.hardware_back_button_or(back_button_default) {
            BackButton::Start
        } else {
            BackButton::Block
        };

        Self {
            tap_click: !config.is_testing(),
            status_tap: config.status_tap_or(platform.hybrid),
            input_shims,
            back_button,
            close_watcher_ignored: back_button == BackButton::Block && close_watcher,
            keyboard_assist: true,
            focus_visible: true,
        }
    }
}

/// Start everything in `plan`. Completes when every shim has started.
pub async fn run(
    plan: StartupPlan,
    config: &AppConfig,
    services: &dyn PlatformServices,
    focus: &FocusSlot,
) {
    let tap_click = async {
        if plan.tap_click {
            services.start_tap_click(config).await;
        }
    };
    let status_tap = async {
        if plan.status_tap {
            services.start_status_tap().await;
        }
    };
    let input_shims = async {
        if let Some(platform) = plan.input_shims {
            services.start_input_shims(config, platform).await;
        }
    };
    let back_button = async {
        match plan.back_button {
            BackButton::Start => services.start_hardware_back_button().await,
            BackButton::Block => {
                if plan.close_watcher_ignored {
                    tracing::warn!(
                        "experimentalCloseWatcher was set to `true`, but hardwareBackButton was set to `false`. Both config options must be `true` for the Close Watcher API to be used."
                    );
                }
                services.block_hardware_back_button().await;
            }
        }
    };
    let keyboard_assist = async {
        if plan.keyboard_assist {
            services.start_keyboard_assist().await;
        }
    };
    let focus_visible = async {
        if plan.focus_visible {
            let utility = services.start_focus_visible().await;
            if focus.set(utility).is_err() {
                tracing::debug!("focus-visible already loaded");
            }
        }
    };

    tokio::join!(
        tap_click,
        status_tap,
        input_shims,
        back_button,
        keyboard_assist,
        focus_visible
    );
}
