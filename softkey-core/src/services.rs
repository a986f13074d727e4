//! Auxiliary platform shims started at idle time.
//!
//! The shims themselves (tap-click, status-bar tap, input shims, back button,
//! keyboard assist) live outside this crate; [`PlatformServices`] is the seam
//! they are started through.

use crate::config::AppConfig;
use crate::dom::{ElementId, SharedDocument};
use crate::focus::FocusVisibleTracker;
use async_trait::async_trait;
use std::sync::Arc;

/// Which flavour of input shims to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimPlatform {
    Ios,
    Android,
}

/// Programmatic focus with focus-visible outline management.
pub trait FocusVisible: Send + Sync {
    fn set_focus(&self, elements: &[ElementId]);
}

#[async_trait]
pub trait PlatformServices: Send + Sync {
    async fn start_tap_click(&self, config: &AppConfig);
    async fn start_status_tap(&self);
    async fn start_input_shims(&self, config: &AppConfig, platform: ShimPlatform);
    async fn start_hardware_back_button(&self);
    async fn block_hardware_back_button(&self);
    async fn start_keyboard_assist(&self);
    async fn start_focus_visible(&self) -> Arc<dyn FocusVisible>;
}

/// Services that only report what they were asked to start.
///
/// Focus-visible is real: it moves the focus class inside `document`.
#[derive(Debug, Clone)]
pub struct LoggingServices {
    document: SharedDocument,
}

impl LoggingServices {
    pub fn new(document: SharedDocument) -> Self {
        Self { document }
    }
}

#[async_trait]
impl PlatformServices for LoggingServices {
    async fn start_tap_click(&self, _config: &AppConfig) {
        tracing::info!("tap-click started");
    }

    async fn start_status_tap(&self) {
        tracing::info!("status-tap started");
    }

    async fn start_input_shims(&self, _config: &AppConfig, platform: ShimPlatform) {
        tracing::info!(?platform, "input shims started");
    }

    async fn start_hardware_back_button(&self) {
        tracing::info!("hardware back button started");
    }

    async fn block_hardware_back_button(&self) {
        tracing::info!("hardware back button blocked");
    }

    async fn start_keyboard_assist(&self) {
        tracing::info!("keyboard assist started");
    }

    async fn start_focus_visible(&self) -> Arc<dyn FocusVisible> {
        tracing::info!("focus-visible started");
        Arc::new(FocusVisibleTracker::new(self.document.clone()))
    }
}
