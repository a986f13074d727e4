//! Minimal element tree.
//!
//! Just enough structure for class toggling and ancestor lookups: tags,
//! class sets, the `slot` attribute and parent/child links. Elements are
//! never removed, so ids stay valid for the life of the document.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    classes: BTreeSet<String>,
    slot: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

/// A document shared between the components that write classes into it.
pub type SharedDocument = Arc<Mutex<Document>>;

pub fn lock_document(doc: &SharedDocument) -> MutexGuard<'_, Document> {
    doc.lock().unwrap_or_else(|e| e.into_inner())
}

impl Document {
    /// A document whose root element has `root_tag`.
    pub fn new(root_tag: &str) -> Self {
        Self {
            elements: vec![Element {
                tag: root_tag.to_string(),
                classes: BTreeSet::new(),
                slot: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ElementId> {
        (index < self.elements.len()).then_some(ElementId(index))
    }

    /// Append a new child element under `parent`.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: tag.to_string(),
            classes: BTreeSet::new(),
            slot: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.elements[parent.0].children.push(id);
        id
    }

    pub fn tag(&self, id: ElementId) -> &str {
        &self.elements[id.0].tag
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements[id.0].parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id.0].children
    }

    /// Ancestors of `id`, nearest first. Does not include `id` itself.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |cur| self.parent(*cur))
    }

    pub fn slot(&self, id: ElementId) -> Option<&str> {
        self.elements[id.0].slot.as_deref()
    }

    pub fn set_slot(&mut self, id: ElementId, slot: Option<&str>) {
        self.elements[id.0].slot = slot.map(str::to_string);
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements[id.0].classes.contains(class)
    }

    pub fn classes(&self, id: ElementId) -> impl Iterator<Item = &str> {
        self.elements[id.0].classes.iter().map(String::as_str)
    }

    /// Add or remove `class`. Returns whether the class set changed.
    pub fn toggle_class(&mut self, id: ElementId, class: &str, on: bool) -> bool {
        let classes = &mut self.elements[id.0].classes;
        if on {
            classes.insert(class.to_string())
        } else {
            classes.remove(class)
        }
    }

    /// Serialize the subtree under `id` as indented markup.
    pub fn markup(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_markup(id, 0, &mut out);
        out
    }

    fn write_markup(&self, id: ElementId, depth: usize, out: &mut String) {
        let el = &self.elements[id.0];
        out.push_str(&"  ".repeat(depth));
        out.push('<');
        out.push_str(&el.tag);
        if !el.classes.is_empty() {
            let classes: Vec<&str> = el.classes.iter().map(String::as_str).collect();
            out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        if let Some(slot) = &el.slot {
            out.push_str(&format!(" slot=\"{}\"", slot));
        }
        out.push_str(">\n");
        for child in &el.children {
            self.write_markup(*child, depth + 1, out);
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup(self.root()))
    }
}
