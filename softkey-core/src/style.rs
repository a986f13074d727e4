//! Structural visibility rules.
//!
//! Descendants never talk to the root container. They are hidden because an
//! ancestor carries a class, the way a `:host-context(.keyboard-is-open)`
//! selector would do it.

use crate::dom::{Document, ElementId};
use crate::root::KEYBOARD_OPEN_CLASS;

/// Slot assumed for elements that do not set one.
pub const DEFAULT_SLOT: &str = "bottom";

/// Hide every `target_tag` element below an ancestor carrying
/// `ancestor_class`, unless the element sits in `exempt_slot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideRule {
    pub target_tag: String,
    pub ancestor_class: String,
    pub exempt_slot: Option<String>,
}

impl HideRule {
    pub fn new(target_tag: &str, ancestor_class: &str) -> Self {
        Self {
            target_tag: target_tag.to_string(),
            ancestor_class: ancestor_class.to_string(),
            exempt_slot: None,
        }
    }

    pub fn except_in_slot(mut self, slot: &str) -> Self {
        self.exempt_slot = Some(slot.to_string());
        self
    }

    pub fn matches(&self, doc: &Document, id: ElementId) -> bool {
        if doc.tag(id) != self.target_tag {
            return false;
        }
        let slot = doc.slot(id).unwrap_or(DEFAULT_SLOT);
        if self.exempt_slot.as_deref() == Some(slot) {
            return false;
        }
        doc.ancestors(id)
            .any(|ancestor| doc.has_class(ancestor, &self.ancestor_class))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Vec<HideRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bars at the bottom of the app get out of the keyboard's way.
    pub fn keyboard_defaults() -> Self {
        Self::new()
            .with_rule(HideRule::new("ion-tab-bar", KEYBOARD_OPEN_CLASS).except_in_slot("top"))
    }

    pub fn with_rule(mut self, rule: HideRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[HideRule] {
        &self.rules
    }

    /// Computed visibility of one element.
    pub fn is_hidden(&self, doc: &Document, id: ElementId) -> bool {
        self.rules.iter().any(|rule| rule.matches(doc, id))
    }
}
