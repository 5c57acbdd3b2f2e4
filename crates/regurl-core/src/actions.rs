//! Copy and open actions on a composed URL.
//!
//! Clipboard, browser and notification mechanics are injected; this module
//! only decides when to call them and tracks the transient "copied" flag.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::notify::{Notifier, Toast};

/// How long the "copied" acknowledgment stays up.
pub const DEFAULT_ACKNOWLEDGMENT: Duration = Duration::from_secs(4);

const COPY_SUCCESS_MESSAGE: &str = "URL copied to clipboard";
const COPY_FAILURE_MESSAGE: &str = "URL could not be copied";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable")]
    Unavailable,
    #[error("{0}")]
    Write(String),
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Selection-based copy tried when `write_text` fails.
    fn fallback_copy(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not open {url}: {reason}")]
pub struct OpenError {
    pub url: String,
    pub reason: String,
}

/// Opens a URL in a new browser tab or window.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), OpenError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("user is not allowed to share public registration URLs")]
    AccessDenied,
    #[error(transparent)]
    Open(#[from] OpenError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Nothing to copy.
    Skipped,
    Copied,
    /// Copied through the fallback after the primary write failed.
    CopiedWithFallback,
    Failed,
}

pub struct ActionDispatcher {
    clipboard: Arc<dyn Clipboard>,
    opener: Arc<dyn UrlOpener>,
    notifier: Arc<dyn Notifier>,
    acknowledgment: Duration,
    can_share: bool,
    copied: Arc<watch::Sender<bool>>,
    // Dropping the set aborts pending flip-backs.
    timers: JoinSet<()>,
}

impl std::fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("acknowledgment", &self.acknowledgment)
            .field("can_share", &self.can_share)
            .field("copied", &*self.copied.borrow())
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        opener: Arc<dyn UrlOpener>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (copied, _) = watch::channel(false);
        Self {
            clipboard,
            opener,
            notifier,
            acknowledgment: DEFAULT_ACKNOWLEDGMENT,
            can_share: true,
            copied: Arc::new(copied),
            timers: JoinSet::new(),
        }
    }

    #[must_use]
    pub fn with_acknowledgment(mut self, acknowledgment: Duration) -> Self {
        self.acknowledgment = acknowledgment;
        self
    }

    #[must_use]
    pub fn with_access(mut self, can_share: bool) -> Self {
        self.can_share = can_share;
        self
    }

    pub fn is_copied(&self) -> bool {
        *self.copied.borrow()
    }

    pub fn subscribe_copied(&self) -> watch::Receiver<bool> {
        self.copied.subscribe()
    }

    /// Copy `url` and raise the acknowledgment flag.
    ///
    /// The flag drops after the acknowledgment delay. Each call starts its
    /// own timer, so overlapping copies can drop the flag early.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub async fn copy_to_clipboard(&mut self, url: &str) -> Result<CopyOutcome, ActionError> {
        if !self.can_share {
            return Err(ActionError::AccessDenied);
        }
        if url.is_empty() {
            return Ok(CopyOutcome::Skipped);
        }

        let outcome = match self.clipboard.write_text(url).await {
            Ok(()) => {
                self.notifier.notify(Toast::success(COPY_SUCCESS_MESSAGE));
                CopyOutcome::Copied
            }
            Err(primary) => {
                warn!(error = %primary, "clipboard write failed, trying fallback");
                match self.clipboard.fallback_copy(url) {
                    Ok(()) => {
                        self.notifier.notify(Toast::success(COPY_SUCCESS_MESSAGE));
                        CopyOutcome::CopiedWithFallback
                    }
                    Err(fallback) => {
                        debug!(error = %fallback, "fallback copy failed");
                        let message = match &primary {
                            ClipboardError::Write(message) if !message.is_empty() => {
                                message.clone()
                            }
                            _ => COPY_FAILURE_MESSAGE.to_string(),
                        };
                        self.notifier.notify(Toast::error(message));
                        CopyOutcome::Failed
                    }
                }
            }
        };

        self.acknowledge();
        Ok(outcome)
    }

    /// Open `url` in a new tab. Returns false when there was nothing to open.
    pub fn open_in_new_tab(&self, url: &str) -> Result<bool, ActionError> {
        if !self.can_share {
            return Err(ActionError::AccessDenied);
        }
        if url.is_empty() {
            return Ok(false);
        }
        self.opener.open(url)?;
        Ok(true)
    }

    fn acknowledge(&mut self) {
        while self.timers.try_join_next().is_some() {}
        self.copied.send_replace(true);
        let copied = Arc::clone(&self.copied);
        let delay = self.acknowledgment;
        self.timers.spawn(async move {
            tokio::time::sleep(delay).await;
            copied.send_replace(false);
        });
    }
}

/// Clipboard for hosts that have none.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableClipboard;

#[async_trait]
impl Clipboard for UnavailableClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// Opener that refuses everything; for hosts without a browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOpener;

impl UrlOpener for NoopOpener {
    fn open(&self, url: &str) -> Result<(), OpenError> {
        Err(OpenError {
            url: url.to_string(),
            reason: "no browser available".to_string(),
        })
    }
}
