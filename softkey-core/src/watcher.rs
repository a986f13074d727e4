//! Platform keyboard sources.
//!
//! The keyboard is an environment-wide resource, so it is never reached
//! through a global: everything that needs it receives an
//! `Arc<dyn PlatformKeyboardWatcher>`.
//!
//! [`EventBusWatcher`] is the in-process implementation. The bridge feeds it
//! from a command script and the tests drive it directly.

use crate::error::WatcherError;
use crate::{KeyboardSignal, ResizeMode};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};

pub type ListenerId = u64;

/// Sending half handed to a watcher for each listener.
pub type SignalSink = mpsc::UnboundedSender<KeyboardSignal>;

/// The low-level keyboard event source.
#[async_trait]
pub trait PlatformKeyboardWatcher: Send + Sync {
    /// Ask the platform how it resizes content while the keyboard is open.
    /// `Ok(None)` means no keyboard plugin is present.
    async fn resize_mode(&self) -> Result<Option<ResizeMode>, WatcherError>;

    /// Start delivering signals to `sink`, in emission order.
    fn listen(&self, sink: SignalSink) -> Result<ListenerId, WatcherError>;

    /// Stop delivering signals to a listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);

    /// Current height of the container resized in `mode`, if it exists.
    fn container_height(&self, mode: ResizeMode) -> Option<u32>;

    /// Height updates for the container resized in `mode`, if it exists.
    fn observe_container(&self, mode: ResizeMode) -> Option<watch::Receiver<u32>>;
}

/// Subscription bookkeeping, exposed so callers can check for leaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    /// Listeners ever registered.
    pub subscribed: u64,
    /// `unlisten` calls received, including ones for unknown ids.
    pub unlisten_calls: u64,
    /// Listeners actually removed.
    pub unsubscribed: u64,
}

impl ListenerStats {
    pub fn active(&self) -> u64 {
        self.subscribed - self.unsubscribed
    }
}

#[derive(Debug)]
struct BusInner {
    available: bool,
    resize_mode: Option<ResizeMode>,
    listeners: BTreeMap<ListenerId, SignalSink>,
    next_id: ListenerId,
    stats: ListenerStats,
    containers: HashMap<ResizeMode, watch::Sender<u32>>,
}

/// Keyboard source driven by explicit [`dispatch`](Self::dispatch) calls.
///
/// Acquisitions can be held open with [`hold_acquisitions`](Self::hold_acquisitions)
/// to simulate a slow platform query.
#[derive(Debug)]
pub struct EventBusWatcher {
    inner: Mutex<BusInner>,
    gate: watch::Sender<bool>,
}

impl EventBusWatcher {
    /// A watcher with a keyboard plugin reporting `resize_mode`.
    pub fn new(resize_mode: Option<ResizeMode>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            inner: Mutex::new(BusInner {
                available: true,
                resize_mode,
                listeners: BTreeMap::new(),
                next_id: 1,
                stats: ListenerStats::default(),
                containers: HashMap::new(),
            }),
            gate,
        }
    }

    /// A watcher for a platform with no keyboard source at all.
    pub fn unavailable() -> Self {
        let watcher = Self::new(None);
        watcher.lock().available = false;
        watcher
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // A poisoned bus still holds consistent bookkeeping.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver a signal to every listener. Returns how many received it.
    pub fn dispatch(&self, signal: KeyboardSignal) -> usize {
        let inner = self.lock();
        let mut delivered = 0;
        for sink in inner.listeners.values() {
            if sink.send(signal).is_ok() {
                delivered += 1;
            }
        }
        tracing::debug!(?signal, delivered, "keyboard signal dispatched");
        delivered
    }

    /// Register or resize the container used by `mode`.
    pub fn set_container_height(&self, mode: ResizeMode, height: u32) {
        let mut inner = self.lock();
        match inner.containers.get(&mode) {
            Some(tx) => {
                tx.send_replace(height);
            }
            None => {
                let (tx, _) = watch::channel(height);
                inner.containers.insert(mode, tx);
            }
        }
    }

    /// Remove the container used by `mode`; pending resize waits resolve.
    pub fn remove_container(&self, mode: ResizeMode) {
        self.lock().containers.remove(&mode);
    }

    pub fn set_resize_mode(&self, mode: Option<ResizeMode>) {
        self.lock().resize_mode = mode;
    }

    pub fn resize_mode_now(&self) -> Option<ResizeMode> {
        self.lock().resize_mode
    }

    /// Make `resize_mode()` calls block until [`release_acquisitions`](Self::release_acquisitions).
    pub fn hold_acquisitions(&self) {
        self.gate.send_replace(false);
    }

    pub fn release_acquisitions(&self) {
        self.gate.send_replace(true);
    }

    pub fn stats(&self) -> ListenerStats {
        self.lock().stats
    }

    pub fn active_listeners(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl Default for EventBusWatcher {
    fn default() -> Self {
        Self::new(Some(ResizeMode::Native))
    }
}

#[async_trait]
impl PlatformKeyboardWatcher for EventBusWatcher {
    async fn resize_mode(&self) -> Result<Option<ResizeMode>, WatcherError> {
        let mut gate = self.gate.subscribe();
        // The sender lives in `self`, so this only errors if it was dropped.
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(WatcherError::Unavailable);
        }

        let inner = self.lock();
        if !inner.available {
            return Err(WatcherError::Unavailable);
        }
        Ok(inner.resize_mode)
    }

    fn listen(&self, sink: SignalSink) -> Result<ListenerId, WatcherError> {
        let mut inner = self.lock();
        if !inner.available {
            return Err(WatcherError::Unavailable);
        }
        if sink.is_closed() {
            return Err(WatcherError::Rejected("signal receiver already dropped".into()));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, sink);
        inner.stats.subscribed += 1;
        Ok(id)
    }

    fn unlisten(&self, id: ListenerId) {
        let mut inner = self.lock();
        inner.stats.unlisten_calls += 1;
        if inner.listeners.remove(&id).is_some() {
            inner.stats.unsubscribed += 1;
        }
    }

    fn container_height(&self, mode: ResizeMode) -> Option<u32> {
        self.lock().containers.get(&mode).map(|tx| *tx.borrow())
    }

    fn observe_container(&self, mode: ResizeMode) -> Option<watch::Receiver<u32>> {
        self.lock().containers.get(&mode).map(|tx| tx.subscribe())
    }
}
