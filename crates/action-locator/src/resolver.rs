//! First-match resolution over fallback chains

use std::sync::Arc;

use host_dom::{DomTree, NodeId};
use tracing::{debug, trace};

use crate::types::{FieldRole, ResolutionResult, SelectorCatalog, SelectorChain};

impl SelectorChain {
    /// Resolve the first element matched by any pattern, in chain order
    ///
    /// Unparseable patterns are skipped. Within one pattern the first match in
    /// document order wins; there is no scoring across patterns.
    pub fn resolve(&self, tree: &DomTree) -> Option<ResolutionResult> {
        let body = tree.body();
        for (index, (pattern, compiled)) in self.patterns().iter().zip(self.compiled()).enumerate()
        {
            let selector = match compiled {
                Ok(selector) => selector,
                Err(err) => {
                    debug!(role = self.role().name(), pattern = %pattern, %err, "skipping invalid pattern");
                    continue;
                }
            };
            if let Some(node) = selector.query_first(tree, body) {
                trace!(role = self.role().name(), pattern = %pattern, %node, "resolved");
                return Some(ResolutionResult {
                    node,
                    role: self.role(),
                    pattern_index: index,
                    pattern: pattern.clone(),
                });
            }
        }
        trace!(role = self.role().name(), "no pattern matched");
        None
    }

    /// Whether `node` or one of its descendants matches any valid pattern
    pub fn matches_within(&self, tree: &DomTree, node: NodeId) -> bool {
        self.compiled()
            .iter()
            .filter_map(|compiled| compiled.as_ref().ok())
            .any(|selector| selector.matches_within(tree, node))
    }
}

/// Element resolver shared by the extractor, injector and watcher
#[derive(Debug, Clone, Default)]
pub struct ElementResolver {
    catalog: Arc<SelectorCatalog>,
}

impl ElementResolver {
    pub fn new(catalog: SelectorCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &SelectorCatalog {
        &self.catalog
    }

    pub fn resolve(&self, tree: &DomTree, role: FieldRole) -> Option<ResolutionResult> {
        self.catalog.chain(role).resolve(tree)
    }

    pub fn resolve_node(&self, tree: &DomTree, role: FieldRole) -> Option<NodeId> {
        self.resolve(tree, role).map(|result| result.node)
    }

    pub fn matches_within(&self, tree: &DomTree, role: FieldRole, node: NodeId) -> bool {
        self.catalog.chain(role).matches_within(tree, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use host_dom::NodeSpec;

    fn tree_with(specs: &[NodeSpec]) -> DomTree {
        let mut tree = DomTree::new();
        let body = tree.body();
        for spec in specs {
            spec.build_into(&mut tree, body);
        }
        tree
    }

    #[test]
    fn first_pattern_in_list_order_wins() {
        // `.late` appears first in the document but second in the chain.
        let tree = tree_with(&[
            NodeSpec::new("div").class("late").text("late"),
            NodeSpec::new("div").class("early").text("early"),
        ]);
        let chain = SelectorChain::new(FieldRole::Body, [".early", ".late"]);

        let result = chain.resolve(&tree).unwrap();
        assert_eq!(result.pattern_index, 0);
        assert_eq!(tree.inner_text(result.node), "early");
    }

    #[test]
    fn falls_through_to_later_patterns() {
        let tree = tree_with(&[NodeSpec::new("div").attr("role", "toolbar")]);
        let chain = SelectorChain::default_for(FieldRole::Toolbar);

        let result = chain.resolve(&tree).unwrap();
        assert_eq!(result.pattern, r#"[role="toolbar"]"#);
        assert_eq!(result.pattern_index, 2);
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let tree = tree_with(&[NodeSpec::new("div").class("gU").class("Up")]);
        let chain = SelectorChain::new(
            FieldRole::Toolbar,
            [".btC", r#"[role="toolbar]"#, "", ">>", ".gU.Up"],
        );

        let result = chain.resolve(&tree).unwrap();
        assert_eq!(result.pattern_index, 4);
    }

    #[test]
    fn no_match_returns_none() {
        let tree = tree_with(&[NodeSpec::new("span").class("unrelated")]);
        let chain = SelectorChain::new(FieldRole::Sender, [r#"[role="toolbar]"#, ".gD"]);
        assert!(chain.resolve(&tree).is_none());

        let empty = SelectorChain::new(FieldRole::Sender, Vec::<String>::new());
        assert!(empty.resolve(&tree).is_none());
    }

    #[test]
    fn resolver_uses_catalog_chains() {
        let tree = tree_with(&[NodeSpec::new("span").class("from").text("Bob")]);
        let resolver = ElementResolver::default();

        let node = resolver.resolve_node(&tree, FieldRole::Sender).unwrap();
        assert_eq!(tree.inner_text(node), "Bob");
        assert!(resolver.resolve(&tree, FieldRole::Subject).is_none());
    }
}
