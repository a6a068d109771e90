//! Field extraction and reply insertion.
//!
//! Every read resolves its selector chain against the page as it is right now;
//! nothing is cached because the host page may have changed since the last call.

use action_locator::{ElementResolver, FieldRole};
use host_dom::{DomTree, Page};
use mailassist_core_types::ExtractionResult;
use tracing::{debug, warn};

/// Result of writing generated text into the compose surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    NoComposeInput,
}

#[derive(Clone)]
pub struct FieldExtractor {
    page: Page,
    resolver: ElementResolver,
}

impl FieldExtractor {
    pub fn new(page: Page, resolver: ElementResolver) -> Self {
        Self { page, resolver }
    }

    pub fn extract_sender(&self) -> String {
        self.page.read(|tree| self.trimmed_text(tree, FieldRole::Sender))
    }

    /// Display name from a `Name <address>` value, or the raw value without a bracket.
    pub fn extract_recipient(&self) -> String {
        self.page.read(|tree| {
            self.field_value(tree, FieldRole::Recipient)
                .map(|value| display_name(&value))
                .unwrap_or_default()
        })
    }

    pub fn extract_subject(&self) -> String {
        self.page
            .read(|tree| self.field_value(tree, FieldRole::Subject))
            .unwrap_or_default()
    }

    pub fn extract_body(&self) -> String {
        self.page.read(|tree| self.trimmed_text(tree, FieldRole::Body))
    }

    pub fn extract(&self) -> ExtractionResult {
        let result = ExtractionResult {
            sender_name: self.extract_sender(),
            recipient_name: self.extract_recipient(),
            subject: self.extract_subject(),
            body_text: self.extract_body(),
        };
        debug!(
            sender = !result.sender_name.is_empty(),
            recipient = !result.recipient_name.is_empty(),
            subject = !result.subject.is_empty(),
            body_len = result.body_text.len(),
            "extracted reply context"
        );
        result
    }

    /// Focuses the compose input and inserts `text` at its caret.
    pub fn insert_reply(&self, text: &str) -> InsertOutcome {
        let inserted = self.page.mutate(|tree| {
            let Some(node) = self.resolver.resolve_node(tree, FieldRole::ComposeInput) else {
                return false;
            };
            tree.focus(node) && tree.insert_text(text)
        });
        if inserted {
            debug!(len = text.len(), "inserted generated reply");
            InsertOutcome::Inserted
        } else {
            warn!("no editable compose input found; reply not inserted");
            InsertOutcome::NoComposeInput
        }
    }

    fn trimmed_text(&self, tree: &DomTree, role: FieldRole) -> String {
        self.resolver
            .resolve_node(tree, role)
            .map(|node| tree.inner_text(node).trim().to_string())
            .unwrap_or_default()
    }

    fn field_value(&self, tree: &DomTree, role: FieldRole) -> Option<String> {
        let node = self.resolver.resolve_node(tree, role)?;
        let el = tree.element(node)?;
        Some(el.value().unwrap_or_default().to_string())
    }
}

fn display_name(value: &str) -> String {
    match value.split_once('<') {
        Some((name, _)) if !name.is_empty() => name.trim().to_string(),
        _ => value.to_string(),
    }
}
