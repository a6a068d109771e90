//! CSS-subset selectors
//!
//! Supported: selector lists, type/universal selectors, `#id`, `.class`,
//! `[attr]`, `[attr=value]` (bare, single- or double-quoted value), and the
//! descendant and child combinators.

use std::fmt;
use std::str::FromStr;

use host_dom::{DomTree, NodeId};

use crate::errors::SelectorError;

/// Parsed selector list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ComplexSelector {
    /// Compounds left to right
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let alternatives = Parser::new(source).parse_list()?;
        Ok(Self {
            source: source.to_string(),
            alternatives,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `node` itself matches.
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(tree, node, complex.compounds.len() - 1))
    }

    /// First descendant of `root` in document order that matches.
    pub fn query_first(&self, tree: &DomTree, root: NodeId) -> Option<NodeId> {
        tree.descendants(root)
            .into_iter()
            .find(|node| self.matches(tree, *node))
    }

    /// Whether `node` or any of its descendants matches.
    pub fn matches_within(&self, tree: &DomTree, node: NodeId) -> bool {
        self.matches(tree, node) || self.query_first(tree, node).is_some()
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl ComplexSelector {
    fn matches_at(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let mut parent = tree.element(node).and_then(|el| el.parent());
        match self.combinators[index - 1] {
            Combinator::Child => parent.is_some_and(|p| self.matches_at(tree, p, index - 1)),
            Combinator::Descendant => {
                while let Some(ancestor) = parent {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    parent = tree.element(ancestor).and_then(|el| el.parent());
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(el) = tree.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if tag != "*" && el.tag() != tag {
                return false;
            }
        }
        self.ids.iter().all(|id| el.id() == Some(id.as_str()))
            && self.classes.iter().all(|class| el.has_class(class))
            && self.attrs.iter().all(|attr| match (&attr.value, el.attribute(&attr.name)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected == actual,
            })
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut list = Vec::new();
        loop {
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => return Ok(list),
                Some(',') => self.pos += 1,
                Some(ch) => {
                    return Err(SelectorError::UnexpectedChar { ch, pos: self.pos });
                }
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_ws();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.tag = Some("*".to_string());
            }
            Some(ch) if is_ident_char(ch) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attr()?);
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            return Err(match self.peek() {
                None if self.chars.iter().all(|c| c.is_whitespace()) => SelectorError::Empty,
                None => SelectorError::UnexpectedEnd,
                Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            });
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(SelectorError::ExpectedIdent { pos: start });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attr(&mut self) -> Result<AttrMatch, SelectorError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
                    Some(_) => self.ident()?,
                    None => return Err(SelectorError::UnexpectedEnd),
                };
                self.skip_ws();
                Some(value)
            }
            Some(ch) => return Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrMatch { name, value })
            }
            Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            if ch == quote {
                return Ok(value);
            }
            value.push(ch);
        }
        Err(SelectorError::UnterminatedString { pos: start })
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}
