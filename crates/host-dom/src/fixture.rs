//! Declarative page descriptions loadable from YAML or JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{DomTree, NodeId};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// One element and its subtree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub editable: bool,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Materializes the subtree and appends it under `parent`.
    pub fn build_into(&self, tree: &mut DomTree, parent: NodeId) -> NodeId {
        let node = self.build_detached(tree);
        // `node` and `parent` both exist and `node` is fresh, so this cannot fail.
        let _ = tree.append_child(parent, node);
        node
    }

    fn build_detached(&self, tree: &mut DomTree) -> NodeId {
        let tag = if self.tag.is_empty() { "div" } else { &self.tag };
        let node = tree.create_element(tag);
        if let Some(id) = &self.id {
            let _ = tree.set_attribute(node, "id", id.clone());
        }
        for (name, value) in &self.attrs {
            let _ = tree.set_attribute(node, name, value.clone());
        }
        for class in &self.classes {
            let _ = tree.add_class(node, class);
        }
        if let Some(text) = &self.text {
            let _ = tree.set_text(node, text.clone());
        }
        if let Some(value) = &self.value {
            let _ = tree.set_value(node, value.clone());
        }
        if self.editable {
            let _ = tree.set_editable(node, true);
        }
        for child in &self.children {
            let child_node = child.build_detached(tree);
            let _ = tree.append_child(node, child_node);
        }
        node
    }
}

/// A page as first loaded plus the subtree the host inserts when compose opens.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub body: Vec<NodeSpec>,
    pub compose: Vec<NodeSpec>,
}

impl PageFixture {
    pub fn from_yaml_str(raw: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_fixture() {
        let raw = r#"
body:
  - tag: span
    classes: [gD]
    text: Alice Smith
compose:
  - classes: [aDh]
    children:
      - tag: input
        attrs: { name: subjectbox }
        value: "Re: Budget"
"#;
        let fixture = PageFixture::from_yaml_str(raw).unwrap();
        assert_eq!(fixture.body[0].classes, vec!["gD"]);
        assert_eq!(fixture.compose[0].tag, "");
        assert_eq!(
            fixture.compose[0].children[0].value.as_deref(),
            Some("Re: Budget")
        );
    }

    #[test]
    fn build_applies_attributes_and_children() {
        let mut tree = DomTree::new();
        let body = tree.body();
        let spec = NodeSpec::new("div")
            .class("a3s")
            .class("aiL")
            .attr("role", "presentation")
            .child(NodeSpec::new("p").text("Hello"));

        let node = spec.build_into(&mut tree, body);
        let el = tree.element(node).unwrap();
        assert!(el.has_class("a3s") && el.has_class("aiL"));
        assert_eq!(el.attribute("role"), Some("presentation"));
        assert_eq!(tree.inner_text(node), "Hello");
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            PageFixture::from_yaml_str("body: [tag: "),
            Err(FixtureError::Parse(_))
        ));
    }
}
