use std::collections::{BTreeMap, BTreeSet};

use crate::page::error::PageError;

/// Bootstrap utility class that hides an element.
pub const HIDDEN_CLASS: &str = "d-none";

/// One element of the headless page.
///
/// Only the parts of a DOM node the page scripts touch are modelled:
/// text, input value (with the default `reset()` restores), classes,
/// inline styles, the disabled flag, form ownership and the parent link.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub tag: String,
    pub text: String,
    pub value: String,
    pub default_value: String,
    pub name: Option<String>,
    pub form: Option<String>,
    pub parent: Option<String>,
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
    pub disabled: bool,
}

impl Element {
    pub fn new(id: &str, tag: &str) -> Self {
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            text: String::new(),
            value: String::new(),
            default_value: String::new(),
            name: None,
            form: None,
            parent: None,
            classes: BTreeSet::new(),
            styles: BTreeMap::new(),
            disabled: false,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Sets both the current and the default value.
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.default_value = value.to_string();
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Field owned by `form_id`; also makes the form its parent.
    pub fn in_form(mut self, form_id: &str) -> Self {
        self.form = Some(form_id.to_string());
        if self.parent.is_none() {
            self.parent = Some(form_id.to_string());
        }
        self
    }

    pub fn inside(mut self, parent_id: &str) -> Self {
        self.parent = Some(parent_id.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    /// Flip `class`, returning whether it is now present.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.classes.remove(class) {
            false
        } else {
            self.classes.insert(class.to_string());
            true
        }
    }
}

/// Page-level `<body>` state: the scroll-lock class and inline overrides live here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
}

/// Headless document. Elements keep insertion order so form data is
/// collected in markup order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
    pub body: Body,
    anonymous: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id.
    pub fn insert(&mut self, element: Element) {
        match self.elements.iter_mut().find(|e| e.id == element.id) {
            Some(existing) => *existing = element,
            None => self.elements.push(element),
        }
    }

    /// Append an element with a generated id (backdrops and the like).
    pub fn append_anonymous(&mut self, mut element: Element) -> String {
        self.anonymous += 1;
        element.id = format!("{}-{}", element.tag, self.anonymous);
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn require(&self, id: &str, context: &str) -> Result<&Element, PageError> {
        self.get(id).ok_or_else(|| PageError::ElementNotFound {
            element: id.to_string(),
            context: context.to_string(),
        })
    }

    pub fn require_mut(&mut self, id: &str, context: &str) -> Result<&mut Element, PageError> {
        self.get_mut(id).ok_or_else(|| PageError::ElementNotFound {
            element: id.to_string(),
            context: context.to_string(),
        })
    }

    pub fn first_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.has_class(class))
    }

    pub fn count_class(&self, class: &str) -> usize {
        self.elements.iter().filter(|e| e.has_class(class)).count()
    }

    /// Remove every element carrying `class`; returns how many went away.
    pub fn remove_by_class(&mut self, class: &str) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !e.has_class(class));
        before - self.elements.len()
    }

    /// True when `target` is `ancestor` itself or sits somewhere below it.
    pub fn contains(&self, ancestor: &str, target: &str) -> bool {
        let mut current = Some(target.to_string());
        let mut hops = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.elements.len() {
                return false;
            }
            current = self.get(&id).and_then(|e| e.parent.clone());
        }
        false
    }

    /// Named, enabled fields owned by the form, in document order.
    pub fn form_fields(&self, form_id: &str) -> Vec<(String, String)> {
        self.elements
            .iter()
            .filter(|e| e.form.as_deref() == Some(form_id) && !e.disabled)
            .filter_map(|e| e.name.as_ref().map(|n| (n.clone(), e.value.clone())))
            .collect()
    }

    /// Value of the named field inside the form, if any.
    pub fn form_field(&self, form_id: &str, name: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|e| e.form.as_deref() == Some(form_id) && e.name.as_deref() == Some(name))
            .map(|e| e.value.as_str())
    }

    /// `HTMLFormElement.reset()`: every owned field goes back to its default value.
    pub fn reset_form(&mut self, form_id: &str) {
        for el in self
            .elements
            .iter_mut()
            .filter(|e| e.form.as_deref() == Some(form_id))
        {
            el.value = el.default_value.clone();
        }
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), PageError> {
        self.require_mut(id, "set_text")?.text = text.to_string();
        Ok(())
    }

    pub fn set_value(&mut self, id: &str, value: &str) -> Result<(), PageError> {
        self.require_mut(id, "set_value")?.value = value.to_string();
        Ok(())
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.text.as_str())
    }

    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.value.as_str())
    }
}
