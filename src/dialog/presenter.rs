use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    dialog::chrome::DialogChrome,
    page::{document::Document, error::PageError},
};

const SHOW_CLASS: &str = "show";

/// How a dialog came to be closed. Cleanup does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    /// The `×` / close button inside the dialog
    CloseControl,
    /// Click on the backdrop area
    Backdrop,
    /// Escape key
    Keyboard,
    /// Closed by code (e.g. before showing another dialog)
    Programmatic,
}

pub type CloseHook = Box<dyn FnMut(&mut Document)>;

#[derive(Default)]
struct DialogEntry {
    open: bool,
    hooks: Vec<CloseHook>,
}

/// Shows and hides the page's modal dialogs.
///
/// Owns the single [`DialogChrome`], so backdrop and scroll lock are
/// reference counted across every dialog it manages.
#[derive(Default)]
pub struct DialogPresenter {
    chrome: DialogChrome,
    dialogs: BTreeMap<String, DialogEntry>,
    stack: Vec<String>,
}

impl DialogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, doc: &mut Document, dialog_id: &str) -> Result<(), PageError> {
        let element = doc.require_mut(dialog_id, "show dialog")?;
        let entry = self.dialogs.entry(dialog_id.to_string()).or_default();
        if entry.open {
            return Ok(());
        }

        entry.open = true;
        element.add_class(SHOW_CLASS);
        element.styles.insert("display".into(), "block".into());
        self.stack.push(dialog_id.to_string());
        self.chrome.acquire(doc);

        debug!(dialog = dialog_id, open = self.chrome.open_count(), "dialog shown");
        Ok(())
    }

    /// Close the dialog and run its close hooks. Returns `false` when it was
    /// not open, in which case nothing is touched.
    pub fn hide(&mut self, doc: &mut Document, dialog_id: &str, trigger: CloseTrigger) -> bool {
        let Some(entry) = self.dialogs.get_mut(dialog_id) else {
            return false;
        };
        if !entry.open {
            return false;
        }

        entry.open = false;
        if let Some(element) = doc.get_mut(dialog_id) {
            element.remove_class(SHOW_CLASS);
            element.styles.insert("display".into(), "none".into());
        }
        self.stack.retain(|id| id != dialog_id);
        self.chrome.release(doc);

        for hook in entry.hooks.iter_mut() {
            hook(doc);
        }

        debug!(dialog = dialog_id, ?trigger, open = self.chrome.open_count(), "dialog closed");
        true
    }

    /// Close the most recently opened dialog (backdrop click, Escape).
    pub fn dismiss(&mut self, doc: &mut Document, trigger: CloseTrigger) -> Option<String> {
        let top = self.stack.last()?.clone();
        self.hide(doc, &top, trigger);
        Some(top)
    }

    /// Register a hook that runs once on every close of `dialog_id`.
    pub fn on_closed(&mut self, dialog_id: &str, hook: CloseHook) {
        self.dialogs
            .entry(dialog_id.to_string())
            .or_default()
            .hooks
            .push(hook);
    }

    pub fn is_open(&self, dialog_id: &str) -> bool {
        self.dialogs.get(dialog_id).is_some_and(|d| d.open)
    }

    pub fn open_dialogs(&self) -> &[String] {
        &self.stack
    }

    pub fn open_count(&self) -> usize {
        self.chrome.open_count()
    }
}
