use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// The single authoritative keyboard state of a mounted root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityState {
    pub is_keyboard_visible: bool,
}

/// Owning side of a [`VisibilityState`].
///
/// Only the coordinator holds one. Renderers get read-only receivers and are
/// woken on every committed change.
#[derive(Debug)]
pub struct VisibilityCell {
    tx: watch::Sender<VisibilityState>,
}

impl VisibilityCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(VisibilityState::default());
        Self { tx }
    }

    pub fn get(&self) -> VisibilityState {
        *self.tx.borrow()
    }

    /// Commit a new value. Returns whether anything changed; receivers are
    /// only woken on change.
    pub fn set_visible(&self, visible: bool) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_keyboard_visible == visible {
                return false;
            }
            state.is_keyboard_visible = visible;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<VisibilityState> {
        self.tx.subscribe()
    }
}

impl Default for VisibilityCell {
    fn default() -> Self {
        Self::new()
    }
}
