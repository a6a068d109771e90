//! Trigger control injection.

use std::sync::Arc;

use action_locator::{ElementResolver, FieldRole};
use host_dom::{ClickHandler, DomError, DomTree, NodeId, Page};
use tracing::{debug, info};

/// Identity tag carried by the injected control.
pub const CONTROL_CLASS: &str = "ai-reply-button";

const HOST_BUTTON_CLASSES: &str = "T-I J-J5-Ji aoO v7 T-I-atl L3";
const CONTROL_LABEL: &str = "AI Reply";
const CONTROL_TOOLTIP: &str = "Generate AI Reply";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectOutcome {
    Injected(NodeId),
    /// No toolbar on the page; the control simply does not appear.
    ToolbarMissing,
}

#[derive(Clone)]
pub struct ActionInjector {
    page: Page,
    resolver: ElementResolver,
    on_click: ClickHandler,
}

impl ActionInjector {
    pub fn new(page: Page, resolver: ElementResolver, on_click: ClickHandler) -> Self {
        Self {
            page,
            resolver,
            on_click,
        }
    }

    /// Replaces any previously injected control with a fresh one as the toolbar's first child.
    pub fn inject(&self) -> InjectOutcome {
        let outcome = self.page.mutate(|tree| -> Result<InjectOutcome, DomError> {
            let removed = remove_controls(tree);
            if removed > 0 {
                debug!(removed, "removed stale reply controls");
            }

            let Some(toolbar) = self.resolver.resolve(tree, FieldRole::Toolbar) else {
                return Ok(InjectOutcome::ToolbarMissing);
            };
            debug!(pattern = %toolbar.pattern, node = %toolbar.node, "toolbar found");

            let control = build_control(tree)?;
            tree.prepend_child(toolbar.node, control)?;
            tree.add_click_listener(control, Arc::clone(&self.on_click));
            Ok(InjectOutcome::Injected(control))
        });

        match outcome {
            Ok(InjectOutcome::ToolbarMissing) => {
                debug!("toolbar not found; reply control not injected");
                InjectOutcome::ToolbarMissing
            }
            Ok(injected) => {
                info!("reply control injected");
                injected
            }
            Err(err) => {
                debug!(%err, "failed to attach reply control");
                InjectOutcome::ToolbarMissing
            }
        }
    }

    /// Controls currently present on the page.
    pub fn controls(&self) -> Vec<NodeId> {
        self.page.read(find_controls)
    }
}

fn find_controls(tree: &DomTree) -> Vec<NodeId> {
    tree.descendants(tree.body())
        .into_iter()
        .filter(|node| {
            tree.element(*node)
                .is_some_and(|el| el.has_class(CONTROL_CLASS))
        })
        .collect()
}

fn remove_controls(tree: &mut DomTree) -> usize {
    find_controls(tree)
        .into_iter()
        .filter(|node| tree.remove(*node))
        .count()
}

fn build_control(tree: &mut DomTree) -> Result<NodeId, DomError> {
    let control = tree.create_element("div");
    tree.set_attribute(control, "class", HOST_BUTTON_CLASSES)?;
    tree.add_class(control, CONTROL_CLASS)?;
    tree.set_attribute(control, "style", "margin-right: 8px")?;
    tree.set_attribute(control, "role", "button")?;
    tree.set_attribute(control, "data-tooltip", CONTROL_TOOLTIP)?;
    tree.set_text(control, CONTROL_LABEL)?;
    Ok(control)
}
