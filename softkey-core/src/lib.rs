pub mod config;
pub mod controller;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod focus;
pub mod idle;
pub mod platform;
pub mod root;
pub mod services;
pub mod startup;
pub mod state;
pub mod style;
pub mod tab_bar;
pub mod watcher;

// Re-export the main structs so users can just use `softkey_core::RootContainer`
pub use coordinator::{CoordinatorPhase, KeyboardVisibilityCoordinator};
pub use root::RootContainer;
pub use state::VisibilityState;

use serde::{Deserialize, Serialize};

/// A raw notification from the platform keyboard source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardSignal {
    /// The keyboard is about to appear. Height is reported in px when known.
    WillShow { keyboard_height: Option<u32> },
    /// The keyboard is about to disappear.
    WillHide,
}

/// Which container the platform resizes while the keyboard is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// The whole webview/document is resized.
    Native,
    /// Only the document body is resized.
    Body,
    /// The root container element is resized.
    Ionic,
    /// Nothing is resized; no resize wait is ever produced.
    None,
}
