//! Runs [`SessionState`] against real collaborators.
//!
//! The driver feeds events into the state, executes the returned effects and
//! feeds their outcomes back in until nothing is left to do. Copy
//! acknowledgement timers run on the tokio runtime and report back through a
//! channel drained by [`SessionDriver::next_timer`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use super::share::ShareLink;
use super::state::{Effect, SessionEvent, SessionState};
use super::store::{AddressBar, HistoryStore, MemoryAddressBar, MemoryHistoryStore};
use crate::refine::{RefineError, Refinement, RefinementProxy};

/// The clipboard rejected a write.
#[derive(Error, Debug)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// System clipboard.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard kept in memory; optionally refuses every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
    refuse: bool,
}

impl MemoryClipboard {
    pub fn refusing() -> Self {
        Self {
            writes: Mutex::default(),
            refuse: true,
        }
    }

    /// Every accepted write, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.refuse {
            return Err(ClipboardError("permission denied".to_string()));
        }
        self.writes
            .lock()
            .map_err(|_| ClipboardError("lock poisoned".to_string()))?
            .push(text.to_string());
        Ok(())
    }
}

/// Something that can refine text: the in-process proxy or a remote server.
#[async_trait]
pub trait RefineBackend: Send + Sync {
    async fn refine(&self, text: &str) -> Result<Refinement, RefineError>;
}

#[async_trait]
impl RefineBackend for RefinementProxy {
    async fn refine(&self, text: &str) -> Result<Refinement, RefineError> {
        RefinementProxy::refine(self, text).await
    }
}

/// Owns a session and its collaborators.
pub struct SessionDriver {
    state: SessionState,
    backend: Arc<dyn RefineBackend>,
    history_store: Arc<dyn HistoryStore>,
    address_bar: Arc<dyn AddressBar>,
    clipboard: Arc<dyn Clipboard>,
    link_base: Url,
    timer_tx: mpsc::UnboundedSender<SessionEvent>,
    timer_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionDriver {
    /// Driver with in-memory storage and clipboard.
    pub fn new(state: SessionState, backend: Arc<dyn RefineBackend>, link_base: Url) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        Self {
            state,
            backend,
            history_store: Arc::new(MemoryHistoryStore::default()),
            address_bar: Arc::new(MemoryAddressBar::default()),
            clipboard: Arc::new(MemoryClipboard::default()),
            link_base,
            timer_tx,
            timer_rx,
        }
    }

    pub fn with_history_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history_store = store;
        self
    }

    pub fn with_address_bar(mut self, address_bar: Arc<dyn AddressBar>) -> Self {
        self.address_bar = address_bar;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Restore from the recorded link and stored history.
    pub async fn load(&mut self) {
        let link = self.address_bar.current();
        self.load_from(link).await;
    }

    /// Restore from an explicit link (or none) and stored history.
    pub async fn load_from(&mut self, link: Option<ShareLink>) {
        let history = self.history_store.load();
        self.dispatch(SessionEvent::Loaded { link, history }).await;
    }

    /// Apply `event` and run every effect it leads to.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        let mut events = VecDeque::from([event]);
        while let Some(event) = events.pop_front() {
            for effect in self.state.update(event) {
                if let Some(next) = self.run(effect).await {
                    events.push_back(next);
                }
            }
        }
    }

    /// Wait for the next timer and apply it.
    pub async fn next_timer(&mut self) -> Option<()> {
        let event = self.timer_rx.recv().await?;
        self.dispatch(event).await;
        Some(())
    }

    /// Apply timers that have already fired.
    pub async fn drain_timers(&mut self) {
        while let Ok(event) = self.timer_rx.try_recv() {
            self.dispatch(event).await;
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::Refine { text } => match self.backend.refine(&text).await {
                Ok(refinement) => Some(SessionEvent::RefineSucceeded {
                    refinement,
                    at: Utc::now(),
                }),
                Err(err) => {
                    tracing::debug!(kind = err.label(), "refine attempt failed");
                    Some(SessionEvent::RefineFailed)
                }
            },
            Effect::PersistHistory(entries) => {
                if let Err(err) = self.history_store.save(&entries) {
                    tracing::warn!(error = %err, "failed to persist history");
                }
                None
            }
            Effect::MirrorAddress(pair) => {
                let link = ShareLink::new(&self.link_base, &pair.input, &pair.output);
                if let Err(err) = self.address_bar.replace(&link) {
                    tracing::warn!(error = %err, "failed to record share link");
                }
                None
            }
            Effect::CopyToClipboard(text) => match self.clipboard.set_text(&text) {
                Ok(()) => Some(SessionEvent::CopySucceeded),
                Err(err) => {
                    tracing::debug!(error = %err, "copy failed");
                    Some(SessionEvent::CopyFailed)
                }
            },
            Effect::ExpireCopyAck { generation, after } => {
                let tx = self.timer_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(SessionEvent::CopyAckExpired { generation });
                });
                None
            }
        }
    }
}
