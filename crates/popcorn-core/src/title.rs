use std::sync::{Arc, Mutex};

pub const DEFAULT_TITLE: &str = "usePopcorn";

/// Window title with scoped overrides
#[derive(Clone)]
pub struct WindowTitle {
    current: Arc<Mutex<String>>,
}

impl Default for WindowTitle {
    fn default() -> Self {
        Self {
            current: Arc::new(Mutex::new(DEFAULT_TITLE.to_string())),
        }
    }
}

impl WindowTitle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> String {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Show `title` until the returned guard is dropped
    pub fn scoped(&self, title: &str) -> TitleGuard {
        self.set(title);
        TitleGuard {
            title: self.clone(),
            shown: title.to_string(),
        }
    }

    fn set(&self, title: &str) {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = title.to_string();
    }
}

#[must_use = "the title is restored as soon as the guard is dropped"]
pub struct TitleGuard {
    title: WindowTitle,
    shown: String,
}

impl TitleGuard {
    pub fn shown(&self) -> &str {
        &self.shown
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.title.set(DEFAULT_TITLE);
    }
}
