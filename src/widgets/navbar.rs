use crate::page::document::Document;

const FIXED_CLASS: &str = "fixed";
const ACTIVE_CLASS: &str = "active";
/// Scroll offset past which the mobile bar and menu pin to the top.
pub const FIX_THRESHOLD: f64 = 50.0;

/// Scroll-driven header behaviour. Elements are located by class:
/// `.navbar`, `.navbar__mobile`, `.menu`. Any of them may be absent.
#[derive(Debug, Default)]
pub struct NavbarState {
    last_scroll_top: f64,
}

impl NavbarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_scroll_top(&self) -> f64 {
        self.last_scroll_top
    }

    pub fn on_scroll(&mut self, doc: &mut Document, scroll_top: f64) {
        let pinned = scroll_top > FIX_THRESHOLD;
        for class in ["navbar__mobile", "menu"] {
            if let Some(el) = doc.first_by_class_mut(class) {
                if pinned {
                    el.add_class(FIXED_CLASS);
                } else {
                    el.remove_class(FIXED_CLASS);
                }
            }
        }

        if let Some(navbar) = doc.first_by_class_mut("navbar") {
            let transform = if scroll_top > self.last_scroll_top {
                "translateY(-100%)"
            } else {
                "translateY(0)"
            };
            navbar.styles.insert("transform".into(), transform.into());
        }

        self.last_scroll_top = scroll_top.max(0.0);
    }
}

/// Burger button plus the dropdown it opens.
#[derive(Debug, Clone)]
pub struct BurgerMenu {
    pub burger_id: String,
    pub dropdown_id: String,
}

impl Default for BurgerMenu {
    fn default() -> Self {
        Self {
            burger_id: "burgerMenu".to_string(),
            dropdown_id: "dropdownMenu".to_string(),
        }
    }
}

impl BurgerMenu {
    pub fn is_open(&self, doc: &Document) -> bool {
        doc.get(&self.dropdown_id)
            .is_some_and(|d| d.has_class(ACTIVE_CLASS))
    }

    /// Burger click. Returns whether the menu is now open.
    pub fn toggle(&self, doc: &mut Document) -> bool {
        if let Some(burger) = doc.get_mut(&self.burger_id) {
            burger.toggle_class(ACTIVE_CLASS);
        }
        doc.get_mut(&self.dropdown_id)
            .map(|d| d.toggle_class(ACTIVE_CLASS))
            .unwrap_or(false)
    }

    pub fn close(&self, doc: &mut Document) {
        for id in [&self.burger_id, &self.dropdown_id] {
            if let Some(el) = doc.get_mut(id) {
                el.remove_class(ACTIVE_CLASS);
            }
        }
    }

    /// Click anywhere on the page; closes unless it landed in the menu or on the burger.
    pub fn on_document_click(&self, doc: &mut Document, target_id: &str) {
        if !doc.contains(&self.dropdown_id, target_id)
            && !doc.contains(&self.burger_id, target_id)
        {
            self.close(doc);
        }
    }

    pub fn on_key(&self, doc: &mut Document, key: &str) {
        if key == "Escape" {
            self.close(doc);
        }
    }
}
