//! Quick actions in a shared toolbar, and the bridge that registers a table's
//! "export data" action.
//!
//! The bridge holds its registration as an RAII guard: the action is
//! unregistered when the gate closes (no rows, or a modal owns the UI) and
//! when the table is dropped, so it can never outlive the table.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Id of the action a table registers.
pub const EXPORT_ACTION_ID: &str = "export-data";

/// Identifier returned by [`ActionRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(Uuid);

impl ActionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action-{}", self.0)
    }
}

type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// A toolbar entry.
#[derive(Clone)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
    on_trigger: ActionCallback,
}

impl QuickAction {
    pub fn new<F>(id: impl Into<String>, label: impl Into<String>, on_trigger: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            on_trigger: Arc::new(on_trigger),
        }
    }

    pub fn trigger(&self) {
        (self.on_trigger)();
    }
}

impl fmt::Debug for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Shared toolbar the table contributes actions to.
pub trait ActionRegistry: Send + Sync {
    fn register(&self, action: QuickAction) -> ActionHandle;

    fn unregister(&self, handle: ActionHandle);
}

// =============================================================================
// ModalFlag
// =============================================================================

/// Whether a modal currently owns the UI.
///
/// Cheap to clone; all clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct ModalFlag(Arc<AtomicBool>);

impl ModalFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// ActionBoard
// =============================================================================

/// In-memory [`ActionRegistry`] keeping actions in registration order.
#[derive(Debug, Default)]
pub struct ActionBoard {
    actions: Mutex<Vec<(ActionHandle, QuickAction)>>,
    registered: AtomicUsize,
    unregistered: AtomicUsize,
}

impl ActionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the registered actions.
    pub fn actions(&self) -> Vec<(ActionHandle, QuickAction)> {
        self.actions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.actions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trigger the first action with this id. Returns `false` if none exists.
    pub fn trigger(&self, id: &str) -> bool {
        let action = self
            .actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(_, action)| action.id == id)
            .map(|(_, action)| action.clone());
        // Triggered outside the lock; the callback may re-enter the board.
        match action {
            Some(action) => {
                action.trigger();
                true
            }
            None => false,
        }
    }

    /// Total register calls observed.
    pub fn register_count(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    /// Total unregister calls observed.
    pub fn unregister_count(&self) -> usize {
        self.unregistered.load(Ordering::SeqCst)
    }
}

impl ActionRegistry for ActionBoard {
    fn register(&self, action: QuickAction) -> ActionHandle {
        let handle = ActionHandle::new();
        log::debug!("action '{}' registered as {handle}", action.id);
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((handle, action));
        self.registered.fetch_add(1, Ordering::SeqCst);
        handle
    }

    fn unregister(&self, handle: ActionHandle) {
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(h, _)| *h != handle);
        self.unregistered.fetch_add(1, Ordering::SeqCst);
        log::debug!("action {handle} unregistered");
    }
}

// =============================================================================
// Bridge
// =============================================================================

struct Registration {
    registry: Arc<dyn ActionRegistry>,
    handle: ActionHandle,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.handle);
    }
}

/// Keeps one table action registered exactly while its gate is open.
#[derive(Default)]
pub struct ToolbarBridge {
    registration: Option<Registration>,
}

impl ToolbarBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Register or unregister so that the action is present exactly when
    /// `has_rows && !modal_open`.
    ///
    /// `make_action` is only called when a registration is made. Returns
    /// whether the action is registered after the call.
    pub fn sync(
        &mut self,
        registry: Option<&Arc<dyn ActionRegistry>>,
        has_rows: bool,
        modal_open: bool,
        make_action: impl FnOnce() -> QuickAction,
    ) -> bool {
        let wanted = has_rows && !modal_open;
        match (registry, wanted, self.registration.is_some()) {
            (Some(registry), true, false) => {
                let handle = registry.register(make_action());
                self.registration = Some(Registration {
                    registry: Arc::clone(registry),
                    handle,
                });
            }
            (_, false, true) | (None, _, true) => self.release(),
            _ => {}
        }
        self.is_registered()
    }

    /// Drop the registration, if any.
    pub fn release(&mut self) {
        self.registration = None;
    }
}

impl fmt::Debug for ToolbarBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarBridge")
            .field("handle", &self.registration.as_ref().map(|r| r.handle))
            .finish()
    }
}
