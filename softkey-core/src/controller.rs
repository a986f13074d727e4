//! Keyboard controller factory.
//!
//! A controller wraps one subscription to a [`PlatformKeyboardWatcher`] and
//! turns its raw show/hide signals into `on_change(visible, resize_wait)`
//! calls. On hide it also hands out a [`ResizeWait`] so the caller can hold
//! the "hidden" state back until the resize container is back to the height
//! it had before the keyboard opened.

use crate::watcher::{ListenerId, PlatformKeyboardWatcher};
use crate::{KeyboardSignal, ResizeMode};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Callback invoked on every keyboard transition.
pub type KeyboardChangeCallback = Arc<dyn Fn(bool, Option<ResizeWait>) + Send + Sync>;

/// Resolves once the resize container has returned to its pre-keyboard height.
pub struct ResizeWait {
    inner: BoxFuture<'static, ()>,
}

impl ResizeWait {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { inner: Box::pin(fut) }
    }

    /// Resolves when the observed height equals `target`, or when the
    /// container goes away.
    fn until_height(mut heights: watch::Receiver<u32>, target: u32) -> Self {
        Self::new(async move {
            // Err means the container was removed; nothing left to wait for.
            let _ = heights.wait_for(|height| *height == target).await;
        })
    }
}

impl Future for ResizeWait {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for ResizeWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeWait").finish_non_exhaustive()
    }
}

/// Builds controllers bound to one keyboard source.
#[derive(Clone)]
pub struct KeyboardControllerFactory {
    watcher: Arc<dyn PlatformKeyboardWatcher>,
}

impl fmt::Debug for KeyboardControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardControllerFactory").finish()
    }
}

impl KeyboardControllerFactory {
    pub fn new(watcher: Arc<dyn PlatformKeyboardWatcher>) -> Self {
        Self { watcher }
    }

    /// Start building a controller. The returned future owns everything it
    /// needs, so it can be spawned and outlive the factory.
    ///
    /// Never fails: an unavailable watcher yields an inert handle whose
    /// callback never fires.
    pub fn acquire(
        &self,
        on_change: KeyboardChangeCallback,
    ) -> impl Future<Output = ControllerHandle> + Send + 'static {
        let watcher = self.watcher.clone();
        async move {
            let resize_mode = match watcher.resize_mode().await {
                Ok(mode) => mode,
                Err(e) => {
                    tracing::debug!("keyboard tracking inactive: {}", e);
                    return ControllerHandle::inert();
                }
            };

            let (tx, rx) = mpsc::unbounded_channel();
            let listener = match watcher.listen(tx) {
                Ok(id) => id,
                Err(e) => {
                    tracing::debug!("keyboard tracking inactive: {}", e);
                    return ControllerHandle::inert();
                }
            };

            let visible = Arc::new(AtomicBool::new(false));
            let pump = tokio::spawn(pump_signals(
                watcher.clone(),
                resize_mode,
                rx,
                visible.clone(),
                on_change,
            ));

            tracing::debug!(listener, ?resize_mode, "keyboard controller created");
            ControllerHandle {
                subscription: Some(Subscription {
                    watcher,
                    listener,
                    pump,
                }),
                visible,
            }
        }
    }
}

/// Feeds watcher signals into the callback, one at a time, in arrival order.
async fn pump_signals(
    watcher: Arc<dyn PlatformKeyboardWatcher>,
    resize_mode: Option<ResizeMode>,
    mut rx: mpsc::UnboundedReceiver<KeyboardSignal>,
    visible: Arc<AtomicBool>,
    on_change: KeyboardChangeCallback,
) {
    // Height of the resize container before the keyboard first opened.
    let mut initial_height: Option<u32> = None;

    while let Some(signal) = rx.recv().await {
        match signal {
            KeyboardSignal::WillShow { .. } => {
                if initial_height.is_none() {
                    // A zero height means the container has not been laid out yet.
                    initial_height = resize_mode
                        .and_then(|mode| watcher.container_height(mode))
                        .filter(|height| *height > 0);
                }
                visible.store(true, Ordering::SeqCst);
                on_change(true, None);
            }
            KeyboardSignal::WillHide => {
                visible.store(false, Ordering::SeqCst);
                let wait = resize_wait(watcher.as_ref(), resize_mode, initial_height);
                on_change(false, wait);
            }
        }
    }
}

fn resize_wait(
    watcher: &dyn PlatformKeyboardWatcher,
    resize_mode: Option<ResizeMode>,
    initial_height: Option<u32>,
) -> Option<ResizeWait> {
    let mode = match resize_mode {
        None | Some(ResizeMode::None) => return None,
        Some(mode) => mode,
    };
    let target = initial_height?;
    let heights = watcher.observe_container(mode)?;
    if *heights.borrow() == target {
        // Already back at full height; nothing is pending.
        return None;
    }
    Some(ResizeWait::until_height(heights, target))
}

struct Subscription {
    watcher: Arc<dyn PlatformKeyboardWatcher>,
    listener: ListenerId,
    pump: JoinHandle<()>,
}

/// A live subscription to the keyboard source.
///
/// Not `Clone`: exactly one owner may destroy it. Dropping the handle
/// destroys it too.
pub struct ControllerHandle {
    subscription: Option<Subscription>,
    visible: Arc<AtomicBool>,
}

impl ControllerHandle {
    /// A handle with nothing behind it.
    pub fn inert() -> Self {
        Self {
            subscription: None,
            visible: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_inert(&self) -> bool {
        self.subscription.is_none()
    }

    /// The controller's own view of the keyboard, updated before each callback.
    pub fn is_keyboard_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Unsubscribe from the keyboard source. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.watcher.unlisten(sub.listener);
            sub.pump.abort();
            tracing::debug!(listener = sub.listener, "keyboard controller destroyed");
        }
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("listener", &self.subscription.as_ref().map(|s| s.listener))
            .field("visible", &self.is_keyboard_visible())
            .finish()
    }
}
