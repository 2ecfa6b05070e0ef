use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    FocusSearch,
    CloseDetail,
}

type Listeners = Mutex<BTreeMap<u64, (Key, ShortcutAction)>>;

/// Key bindings held for as long as their owner keeps the guard
///
/// A binding is active from [`ShortcutRegistry::register`] until its
/// [`ShortcutGuard`] is dropped, so every exit path releases it.
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    listeners: Arc<Listeners>,
    next_id: Arc<AtomicU64>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: Key, action: ShortcutAction) -> ShortcutGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(id, (key, action));
        ShortcutGuard {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Actions bound to `key`, in registration order
    pub fn dispatch(&self, key: Key) -> Vec<ShortcutAction> {
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .values()
            .filter(|(bound, _)| *bound == key)
            .map(|(_, action)| *action)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[must_use = "the shortcut is released as soon as the guard is dropped"]
pub struct ShortcutGuard {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Drop for ShortcutGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().unwrap_or_else(|p| p.into_inner()).remove(&self.id);
        }
    }
}
