//! Core types for selector resolution

use std::collections::BTreeMap;

use host_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::errors::SelectorError;
use crate::selector::Selector;

/// Semantic role a selector chain locates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Display name of the original message's sender
    Sender,

    /// The compose window's "To" input
    Recipient,

    /// The compose window's subject input
    Subject,

    /// Quoted or original message text
    Body,

    /// Action bar receiving the trigger control
    Toolbar,

    /// Markers of a freshly opened compose surface
    ComposeIndicator,

    /// Editable region receiving the generated reply
    ComposeInput,
}

impl FieldRole {
    pub fn name(&self) -> &'static str {
        match self {
            FieldRole::Sender => "sender",
            FieldRole::Recipient => "recipient",
            FieldRole::Subject => "subject",
            FieldRole::Body => "body",
            FieldRole::Toolbar => "toolbar",
            FieldRole::ComposeIndicator => "compose_indicator",
            FieldRole::ComposeInput => "compose_input",
        }
    }

    pub fn all() -> [FieldRole; 7] {
        [
            FieldRole::Sender,
            FieldRole::Recipient,
            FieldRole::Subject,
            FieldRole::Body,
            FieldRole::Toolbar,
            FieldRole::ComposeIndicator,
            FieldRole::ComposeInput,
        ]
    }

    /// Built-in patterns in priority order
    pub fn default_patterns(&self) -> &'static [&'static str] {
        match self {
            FieldRole::Sender => &[".gD", ".from"],
            FieldRole::Recipient => &[r#"input[aria-label="To"]"#],
            FieldRole::Subject => &[r#"input[name="subjectbox"]"#],
            FieldRole::Body => &[".h7", ".a3s.aiL", ".gmail_quote", r#"[role="presentation"]"#],
            FieldRole::Toolbar => &[".btC", ".aDh", r#"[role="toolbar"]"#, ".gU.Up"],
            FieldRole::ComposeIndicator => &[r#".aDh, .btC, [role="dialog"]"#],
            FieldRole::ComposeInput => &[r#"[role="textbox"][g_editable="true"]"#],
        }
    }
}

/// Ordered patterns for one role, compiled once
///
/// Patterns that fail to parse stay in the chain as errors and are skipped
/// during resolution.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    role: FieldRole,
    patterns: Vec<String>,
    compiled: Vec<Result<Selector, SelectorError>>,
}

impl SelectorChain {
    pub fn new<I, S>(role: FieldRole, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns.iter().map(|p| Selector::parse(p)).collect();
        Self {
            role,
            patterns,
            compiled,
        }
    }

    pub fn default_for(role: FieldRole) -> Self {
        Self::new(role, role.default_patterns().iter().copied())
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub(crate) fn compiled(&self) -> &[Result<Selector, SelectorError>] {
        &self.compiled
    }

    /// Patterns that will never match because they failed to parse
    pub fn invalid_patterns(&self) -> Vec<(&str, &SelectorError)> {
        self.patterns
            .iter()
            .zip(&self.compiled)
            .filter_map(|(pattern, compiled)| compiled.as_ref().err().map(|e| (pattern.as_str(), e)))
            .collect()
    }
}

/// Role to chain table
#[derive(Debug, Clone)]
pub struct SelectorCatalog {
    chains: BTreeMap<FieldRole, SelectorChain>,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            chains: FieldRole::all()
                .into_iter()
                .map(|role| (role, SelectorChain::default_for(role)))
                .collect(),
        }
    }
}

impl SelectorCatalog {
    /// Built-in chains with the given roles replaced
    pub fn with_overrides(overrides: &BTreeMap<FieldRole, Vec<String>>) -> Self {
        let mut catalog = Self::default();
        for (role, patterns) in overrides {
            catalog
                .chains
                .insert(*role, SelectorChain::new(*role, patterns.iter().cloned()));
        }
        catalog
    }

    pub fn chain(&self, role: FieldRole) -> &SelectorChain {
        // Every role is populated by `Default`, overrides only replace entries.
        &self.chains[&role]
    }

    pub fn chains(&self) -> impl Iterator<Item = &SelectorChain> {
        self.chains.values()
    }
}

/// Element located for a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// Matched element
    pub node: NodeId,

    /// Role that was resolved
    pub role: FieldRole,

    /// Position of the winning pattern in the chain
    pub pattern_index: usize,

    /// Winning pattern text
    pub pattern: String,
}
