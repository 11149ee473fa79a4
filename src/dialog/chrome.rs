use crate::page::document::{Document, Element};

pub const BACKDROP_CLASS: &str = "modal-backdrop";
pub const SCROLL_LOCK_CLASS: &str = "modal-open";

/// Inline body overrides applied while a dialog is open.
const LOCK_STYLES: [(&str, &str); 2] = [("overflow", "hidden"), ("padding-right", "0px")];

/// Page-wide backdrop and scroll-lock owner.
///
/// Every dialog on the page goes through the same instance, so the
/// backdrop exists exactly while `open > 0` and the body carries the lock
/// class under the same condition.
#[derive(Debug, Default)]
pub struct DialogChrome {
    open: usize,
}

impl DialogChrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.open
    }

    /// A dialog opened. Leaves exactly one backdrop on the page, sweeping
    /// any strays another script left behind.
    pub fn acquire(&mut self, doc: &mut Document) {
        self.open += 1;
        if doc.count_class(BACKDROP_CLASS) != 1 {
            doc.remove_by_class(BACKDROP_CLASS);
            doc.append_anonymous(
                Element::new("", "div")
                    .with_class(BACKDROP_CLASS)
                    .with_class("fade")
                    .with_class("show"),
            );
        }
        doc.body.classes.insert(SCROLL_LOCK_CLASS.to_string());
        for (key, value) in LOCK_STYLES {
            doc.body.styles.insert(key.to_string(), value.to_string());
        }
    }

    /// A dialog closed. Chrome is torn down once nothing is open.
    pub fn release(&mut self, doc: &mut Document) {
        self.open = self.open.saturating_sub(1);
        if self.open == 0 {
            Self::cleanup(doc);
        }
    }

    /// Strip every backdrop and the scroll lock. Safe to call any number of times.
    pub fn cleanup(doc: &mut Document) {
        doc.remove_by_class(BACKDROP_CLASS);
        doc.body.classes.remove(SCROLL_LOCK_CLASS);
        for (key, _) in LOCK_STYLES {
            doc.body.styles.remove(key);
        }
    }

    pub fn is_locked(doc: &Document) -> bool {
        doc.body.classes.contains(SCROLL_LOCK_CLASS)
    }
}
