use std::cell::RefCell;
use std::collections::BTreeSet;

use super::{Document, NodeId};

/// Class tokens applied to one live element by the engine.
///
/// Every mutation is mirrored onto the element. The set remembers which tokens it added so
/// that [`Self::purge`] can undo all of them at once.
#[derive(Debug)]
pub struct ClassTokenSet {
    document: Document,
    element: NodeId,
    tokens: RefCell<BTreeSet<String>>,
}

impl ClassTokenSet {
    pub fn new(document: &Document, element: NodeId) -> Self {
        Self {
            document: document.clone(),
            element,
            tokens: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn add(&self, token: &str) {
        if token.is_empty() {
            return;
        }
        self.document.add_class(self.element, token);
        self.tokens.borrow_mut().insert(token.to_owned());
    }

    pub fn remove(&self, token: &str) {
        self.document.remove_class(self.element, token);
        self.tokens.borrow_mut().remove(token);
    }

    /// Flips `token`, or sets it to `force` when given. Returns whether the token is now present.
    pub fn toggle(&self, token: &str, force: Option<bool>) -> bool {
        let present = force.unwrap_or_else(|| !self.contains(token));
        if present {
            self.add(token);
        } else {
            self.remove(token);
        }
        present && !token.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.borrow().contains(token)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.borrow().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }

    /// Removes every tracked token from the element. Safe to call repeatedly.
    pub fn purge(&self) {
        let tokens = std::mem::take(&mut *self.tokens.borrow_mut());
        for token in &tokens {
            self.document.remove_class(self.element, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_onto_element() {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.add_class(el, "authored");

        let set = ClassTokenSet::new(&doc, el);
        set.add("dragging");
        set.add("hover");
        assert_eq!(doc.class_attribute(el), "authored dragging hover");

        set.remove("hover");
        assert!(!doc.has_class(el, "hover"));
        assert_eq!(set.tokens(), vec!["dragging".to_owned()]);
    }

    #[test]
    fn toggle_respects_force() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let set = ClassTokenSet::new(&doc, el);

        assert!(set.toggle("a", None));
        assert!(doc.has_class(el, "a"));
        assert!(!set.toggle("a", None));
        assert!(!doc.has_class(el, "a"));

        assert!(set.toggle("b", Some(true)));
        assert!(set.toggle("b", Some(true)));
        assert!(!set.toggle("b", Some(false)));
        assert!(set.is_empty());
    }

    #[test]
    fn purge_only_touches_tracked_tokens_and_is_repeatable() {
        let doc = Document::new();
        let el = doc.create_element("div");
        doc.add_class(el, "authored");

        let set = ClassTokenSet::new(&doc, el);
        set.add("x");
        set.toggle("y", None);
        set.purge();
        assert!(set.is_empty());
        assert_eq!(doc.class_attribute(el), "authored");

        set.purge();
        assert_eq!(doc.class_attribute(el), "authored");
    }

    #[test]
    fn purge_after_element_removed_is_harmless() {
        let doc = Document::new();
        let el = doc.create_element("div");
        let set = ClassTokenSet::new(&doc, el);
        set.add("x");
        doc.remove(el);
        set.purge();
        assert!(set.is_empty());
    }
}
