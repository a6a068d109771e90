//! Element arena backing a host page.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::errors::DomError;
use crate::mutation::MutationRecord;

/// Callback attached to an element's click event.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    value: Option<String>,
    editable: bool,
    caret: Option<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Text owned directly by this element, excluding descendants.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Form value, as opposed to the `value` attribute.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena of elements rooted at `body`.
pub struct DomTree {
    nodes: HashMap<NodeId, Element>,
    listeners: HashMap<NodeId, Vec<ClickHandler>>,
    next_id: u64,
    body: NodeId,
    focused: Option<NodeId>,
    pending: Vec<MutationRecord>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    pub fn new() -> Self {
        let body = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Element::new("body"));
        Self {
            nodes,
            listeners: HashMap::new(),
            next_id: 1,
            body,
            focused: None,
            pending: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node)
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(&node).ok_or(DomError::UnknownNode(node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Element::new(tag));
        id
    }

    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        if element.has_class(class) {
            return Ok(());
        }
        let merged = match element.attribute("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        element.attributes.insert("class".to_string(), merged);
        Ok(())
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        element.text = text.into();
        element.caret = None;
        Ok(())
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        self.element_mut(node)?.value = Some(value.into());
        Ok(())
    }

    pub fn set_editable(&mut self, node: NodeId, editable: bool) -> Result<(), DomError> {
        self.element_mut(node)?.editable = editable;
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let first = self.element(parent).and_then(|el| el.children.first().copied());
        self.insert_before(parent, child, first)
    }

    /// Inserts `child` before `reference`, or at the end when `reference` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if !self.nodes.contains_key(&parent) {
            return Err(DomError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(DomError::UnknownNode(child));
        }
        if child == self.body {
            return Err(DomError::HierarchyRequest("body cannot be moved".into()));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{child} is an ancestor of {parent}"
            )));
        }
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            let is_child = self
                .element(parent)
                .map(|el| el.children.contains(&reference))
                .unwrap_or(false);
            if !is_child {
                return Err(DomError::HierarchyRequest(format!(
                    "{reference} is not a child of {parent}"
                )));
            }
        }

        self.detach(child);

        let parent_el = self.element_mut(parent)?;
        let index = reference
            .and_then(|r| parent_el.children.iter().position(|c| *c == r))
            .unwrap_or(parent_el.children.len());
        parent_el.children.insert(index, child);
        self.element_mut(child)?.parent = Some(parent);

        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Removes `node` and its subtree from the document, dropping their listeners.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.body || !self.nodes.contains_key(&node) {
            return false;
        }
        self.detach(node);
        let mut doomed = vec![node];
        doomed.extend(self.descendants(node));
        for id in doomed {
            self.nodes.remove(&id);
            self.listeners.remove(&id);
            if self.focused == Some(id) {
                self.focused = None;
            }
        }
        true
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(&node).and_then(|el| el.parent) else {
            return;
        };
        if let Some(parent_el) = self.nodes.get_mut(&parent) {
            parent_el.children.retain(|c| *c != node);
        }
        if let Some(el) = self.nodes.get_mut(&node) {
            el.parent = None;
        }
        self.record(parent, Vec::new(), vec![node]);
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if !self.is_connected(target) {
            return;
        }
        self.pending.push(MutationRecord {
            target,
            added,
            removed,
        });
    }

    pub(crate) fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.element(node).and_then(|el| el.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.element(id).and_then(|el| el.parent);
        }
        false
    }

    /// Whether `node` is attached under `body`.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.body || self.is_ancestor(self.body, node)
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .element(root)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.element(id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    /// Visible text of `node` and its subtree, non-empty pieces joined by newlines.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut pieces = Vec::new();
        if let Some(el) = self.element(node) {
            if !el.text.is_empty() {
                pieces.push(el.text.clone());
            }
        }
        for id in self.descendants(node) {
            if let Some(el) = self.element(id) {
                if !el.text.is_empty() {
                    pieces.push(el.text.clone());
                }
            }
        }
        pieces.join("\n")
    }

    pub fn add_click_listener(&mut self, node: NodeId, handler: ClickHandler) -> bool {
        if !self.nodes.contains_key(&node) {
            return false;
        }
        self.listeners.entry(node).or_default().push(handler);
        true
    }

    pub fn click_listeners(&self, node: NodeId) -> Vec<ClickHandler> {
        self.listeners.get(&node).cloned().unwrap_or_default()
    }

    /// Focuses an editable, connected element and puts the caret at its end.
    pub fn focus(&mut self, node: NodeId) -> bool {
        let editable = self.element(node).map(|el| el.editable).unwrap_or(false);
        if !editable || !self.is_connected(node) {
            return false;
        }
        if self.focused != Some(node) {
            if let Some(el) = self.nodes.get_mut(&node) {
                el.caret = Some(el.text.len());
            }
        }
        self.focused = Some(node);
        true
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Inserts `text` at the caret of the focused element and moves the caret past it.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let Some(node) = self.focused else {
            return false;
        };
        let Some(el) = self.nodes.get_mut(&node) else {
            return false;
        };
        let mut caret = el.caret.unwrap_or(el.text.len()).min(el.text.len());
        while !el.text.is_char_boundary(caret) {
            caret -= 1;
        }
        el.text.insert_str(caret, text);
        el.caret = Some(caret + text.len());
        true
    }
}
