// Element surface the wizard logic writes to
//
// Stands in for the page DOM. Elements are addressed by id and carry text, a value, classes,
// visibility and a disabled flag. Setters on unknown ids are no-ops and getters return
// `None`/`false`.

use std::collections::{BTreeSet, HashMap};

pub trait Surface {
    fn text(&self, id: &str) -> Option<String>;
    fn set_text(&mut self, id: &str, text: &str);

    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&mut self, id: &str, value: &str);

    fn has_class(&self, id: &str, class: &str) -> bool;
    fn toggle_class(&mut self, id: &str, class: &str, on: bool);

    fn is_visible(&self, id: &str) -> bool;
    fn set_visible(&mut self, id: &str, on: bool);

    fn is_disabled(&self, id: &str) -> bool;
    fn set_disabled(&mut self, id: &str, on: bool);

    fn focus(&mut self, id: &str);
    fn focused(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub text: String,
    pub value: String,
    pub classes: BTreeSet<String>,
    pub visible: bool,
    pub disabled: bool,
}

impl Element {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }
}

/// In-memory surface used by the terminal renderer and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: HashMap<String, Element>,
    focused: Option<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an element; re-declaring resets it.
    pub fn declare(&mut self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    pub fn with(mut self, id: &str, element: Element) -> Self {
        self.declare(id, element);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }
}

impl Surface for MemorySurface {
    fn text(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.text.clone())
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(e) = self.elements.get_mut(id) {
            e.text = text.to_string();
        }
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.value.clone())
    }

    fn set_value(&mut self, id: &str, value: &str) {
        if let Some(e) = self.elements.get_mut(id) {
            e.value = value.to_string();
        }
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .map(|e| e.classes.contains(class))
            .unwrap_or(false)
    }

    fn toggle_class(&mut self, id: &str, class: &str, on: bool) {
        if let Some(e) = self.elements.get_mut(id) {
            if on {
                e.classes.insert(class.to_string());
            } else {
                e.classes.remove(class);
            }
        }
    }

    fn is_visible(&self, id: &str) -> bool {
        self.elements.get(id).map(|e| e.visible).unwrap_or(false)
    }

    fn set_visible(&mut self, id: &str, on: bool) {
        if let Some(e) = self.elements.get_mut(id) {
            e.visible = on;
        }
    }

    fn is_disabled(&self, id: &str) -> bool {
        self.elements.get(id).map(|e| e.disabled).unwrap_or(false)
    }

    fn set_disabled(&mut self, id: &str, on: bool) {
        if let Some(e) = self.elements.get_mut(id) {
            e.disabled = on;
        }
    }

    fn focus(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.focused = Some(id.to_string());
        }
    }

    fn focused(&self) -> Option<String> {
        self.focused.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_noops() {
        let mut s = MemorySurface::new();
        s.set_text("missing", "x");
        s.toggle_class("missing", "error", true);
        s.focus("missing");
        assert_eq!(s.text("missing"), None);
        assert!(!s.has_class("missing", "error"));
        assert!(!s.is_visible("missing"));
        assert_eq!(s.focused(), None);
    }

    #[test]
    fn class_toggling_is_idempotent() {
        let mut s = MemorySurface::new().with("counter", Element::visible());
        s.toggle_class("counter", "warning", true);
        s.toggle_class("counter", "warning", true);
        assert!(s.has_class("counter", "warning"));
        s.toggle_class("counter", "warning", false);
        assert!(!s.has_class("counter", "warning"));
    }

    #[test]
    fn focus_tracks_last_known_element() {
        let mut s = MemorySurface::new()
            .with("a", Element::visible())
            .with("b", Element::visible());
        s.focus("a");
        s.focus("b");
        assert_eq!(s.focused().as_deref(), Some("b"));
    }
}
