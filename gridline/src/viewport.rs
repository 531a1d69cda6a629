//! Viewport classification: which presentation a table uses at a given width.
//!
//! The classifier is a pure function of width and a configurable breakpoint.
//! [`ViewportClassifier::watch`] ties it to a [`ResizeSource`] and hands back
//! a [`ViewportWatcher`] that keeps the current mode up to date and
//! unsubscribes when dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::state::State;

/// Default breakpoint, in logical units of the display surface.
pub const DEFAULT_BREAKPOINT: u16 = 768;

/// How rows are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    /// Narrow surface: one card per record with progressive disclosure.
    Compact,
    /// Wide surface: one grid row per record.
    Expanded,
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationMode::Compact => f.write_str("compact"),
            PresentationMode::Expanded => f.write_str("expanded"),
        }
    }
}

// =============================================================================
// ResizeSource
// =============================================================================

/// Callback invoked with the new surface width.
pub type ResizeListener = Arc<dyn Fn(u16) + Send + Sync>;

/// Identifier of a resize subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Something that knows the display width and reports changes to it.
pub trait ResizeSource: Send + Sync {
    /// Current width.
    fn width(&self) -> u16;

    fn subscribe(&self, listener: ResizeListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

struct BusInner {
    width: u16,
    listeners: Vec<(ListenerId, ResizeListener)>,
}

/// In-process [`ResizeSource`]: whoever owns the display pushes widths in,
/// subscribers are notified synchronously.
pub struct ResizeBus {
    inner: Mutex<BusInner>,
}

impl ResizeBus {
    pub fn new(width: u16) -> Self {
        Self {
            inner: Mutex::new(BusInner {
                width,
                listeners: Vec::new(),
            }),
        }
    }

    /// Record a new width and notify every listener.
    pub fn resize(&self, width: u16) {
        let listeners: Vec<ResizeListener> = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.width = width;
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        // Called outside the lock so listeners may query the bus.
        for listener in listeners {
            listener(width);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .len()
    }
}

impl ResizeSource for ResizeBus {
    fn width(&self) -> u16 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).width
    }

    fn subscribe(&self, listener: ResizeListener) -> ListenerId {
        let id = ListenerId::next();
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

impl fmt::Debug for ResizeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("ResizeBus")
            .field("width", &inner.width)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Maps a surface width to a [`PresentationMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportClassifier {
    breakpoint: u16,
}

impl Default for ViewportClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINT)
    }
}

impl ViewportClassifier {
    pub fn new(breakpoint: u16) -> Self {
        Self { breakpoint }
    }

    pub fn breakpoint(&self) -> u16 {
        self.breakpoint
    }

    /// Widths below the breakpoint are compact.
    pub fn classify(&self, width: u16) -> PresentationMode {
        if width < self.breakpoint {
            PresentationMode::Compact
        } else {
            PresentationMode::Expanded
        }
    }

    /// Classify the source's current width and follow its resizes.
    pub fn watch(&self, source: Arc<dyn ResizeSource>) -> ViewportWatcher {
        let mode = State::new(self.classify(source.width()));
        let classifier = *self;
        let target = mode.clone();
        let listener = source.subscribe(Arc::new(move |width| {
            let next = classifier.classify(width);
            if target.replace(next) {
                log::info!("viewport width {width} -> {next} presentation");
            }
        }));
        log::trace!("viewport listener {listener:?} subscribed");
        ViewportWatcher {
            source,
            listener,
            mode,
        }
    }
}

/// Live presentation mode of a subscribed classifier.
///
/// Dropping the watcher unsubscribes from the source.
pub struct ViewportWatcher {
    source: Arc<dyn ResizeSource>,
    listener: ListenerId,
    mode: State<PresentationMode>,
}

impl ViewportWatcher {
    pub fn mode(&self) -> PresentationMode {
        self.mode.get()
    }

    /// Whether the mode changed since the last call.
    pub fn take_changed(&self) -> bool {
        self.mode.take_changed()
    }
}

impl Drop for ViewportWatcher {
    fn drop(&mut self) {
        self.source.unsubscribe(self.listener);
        log::trace!("viewport listener {:?} unsubscribed", self.listener);
    }
}

impl fmt::Debug for ViewportWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportWatcher")
            .field("listener", &self.listener)
            .field("mode", &self.mode())
            .finish()
    }
}
