//! Formula document - a flat sequence of text runs and token chips
//!
//! Offsets into the document count *slots*: every character of a text run
//! occupies one slot and every token occupies exactly one slot. Because a
//! token is a single slot, a position is always either between two
//! characters or on a token boundary, and an edit can only remove a token
//! as a whole.
//!
//! The node list is kept canonical after every operation: no empty text
//! runs and never two text runs next to each other.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::wire::{self, UnknownTagPolicy};
use crate::token::Token;

/// One inline element of a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Text(String),
    Token(Token),
}

impl Node {
    /// Number of slots this node occupies
    pub fn width(&self) -> usize {
        match self {
            Node::Text(text) => text.chars().count(),
            Node::Token(_) => 1,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Node::Token(token) => Some(token),
            Node::Text(_) => None,
        }
    }
}

/// What occupies a single slot of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Char(char),
    Token(&'a Token),
}

/// Errors raised by document operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Position is not a slot boundary of this document
    InvalidPosition { position: usize, len: usize },
    /// Range is reversed, out of bounds, or splits a token
    InvalidRange { start: usize, end: usize, len: usize },
    /// Serialized input contained a token marker that could not be parsed
    MalformedDocument { offset: usize, reason: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPosition { position, len } => {
                write!(f, "invalid position {} (document has {} slots)", position, len)
            }
            Self::InvalidRange { start, end, len } => write!(
                f,
                "invalid range {}..{} (document has {} slots)",
                start, end, len
            ),
            Self::MalformedDocument { offset, reason } => {
                write!(f, "malformed document at byte {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// The content of a formula editor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormulaDocument {
    nodes: Vec<Node>,
}

impl FormulaDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a document holding a single text run
    pub fn with_text(text: &str) -> Self {
        Self::from_nodes(vec![Node::Text(text.to_string())])
    }

    /// Build a document from arbitrary nodes, normalizing them
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut doc = Self { nodes };
        doc.normalize();
        doc
    }

    /// Parse a serialized document with the default unknown-tag policy
    pub fn deserialize(input: &str) -> Result<Self, DocumentError> {
        Self::deserialize_with(input, UnknownTagPolicy::default())
    }

    /// Parse a serialized document
    pub fn deserialize_with(input: &str, policy: UnknownTagPolicy) -> Result<Self, DocumentError> {
        wire::parse(input, policy).map(Self::from_nodes)
    }

    /// Produce the serialized wire form
    pub fn serialize(&self) -> String {
        wire::write(&self.nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the tokens in document order
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.nodes.iter().filter_map(Node::as_token)
    }

    /// What occupies slot `position` (`None` past the end)
    pub fn slot_at(&self, position: usize) -> Option<Slot<'_>> {
        let mut start = 0;
        for node in &self.nodes {
            let width = node.width();
            if position < start + width {
                return Some(match node {
                    Node::Text(text) => Slot::Char(text.chars().nth(position - start)?),
                    Node::Token(token) => Slot::Token(token),
                });
            }
            start += width;
        }
        None
    }

    /// Plain text of `range`, or `None` when the range contains a token or
    /// is out of bounds
    pub fn text_in(&self, range: Range<usize>) -> Option<String> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        let mut out = String::new();
        for position in range {
            match self.slot_at(position)? {
                Slot::Char(ch) => out.push(ch),
                Slot::Token(_) => return None,
            }
        }
        Some(out)
    }

    /// Insert literal text at `position`
    pub fn insert_text(&mut self, position: usize, text: &str) -> Result<(), DocumentError> {
        let len = self.len();
        if position > len {
            return Err(DocumentError::InvalidPosition { position, len });
        }
        if text.is_empty() {
            return Ok(());
        }
        self.splice(position..position, vec![Node::Text(text.to_string())]);
        Ok(())
    }

    /// Replace `range` with a single token
    ///
    /// Whole tokens inside the range are replaced along with the text.
    pub fn insert_token(&mut self, range: Range<usize>, token: Token) -> Result<(), DocumentError> {
        self.check_range(&range)?;
        self.splice(range, vec![Node::Token(token)]);
        Ok(())
    }

    /// Remove the token occupying slot `position` as one unit
    pub fn delete_token(&mut self, position: usize) -> Result<Token, DocumentError> {
        let token = match self.slot_at(position) {
            Some(Slot::Token(token)) => token.clone(),
            _ => {
                return Err(DocumentError::InvalidPosition {
                    position,
                    len: self.len(),
                })
            }
        };
        self.splice(position..position + 1, Vec::new());
        Ok(token)
    }

    /// Remove every slot in `range`
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<(), DocumentError> {
        self.check_range(&range)?;
        if !range.is_empty() {
            self.splice(range, Vec::new());
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(DocumentError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    /// Replace the slots in `range` with `insert`. The range must already be
    /// validated.
    fn splice(&mut self, range: Range<usize>, insert: Vec<Node>) {
        let mut head = Vec::with_capacity(self.nodes.len() + insert.len());
        let mut tail = Vec::new();
        let mut start = 0;

        for node in self.nodes.drain(..) {
            let width = node.width();
            let end = start + width;
            match node {
                Node::Token(token) => {
                    if end <= range.start {
                        head.push(Node::Token(token));
                    } else if start >= range.end {
                        tail.push(Node::Token(token));
                    }
                }
                Node::Text(text) => {
                    if range.start > start {
                        let keep = (range.start - start).min(width);
                        head.push(Node::Text(char_slice(&text, 0, keep)));
                    }
                    if range.end < end {
                        let from = range.end.saturating_sub(start);
                        tail.push(Node::Text(char_slice(&text, from, width)));
                    }
                }
            }
            start = end;
        }

        head.extend(insert);
        head.extend(tail);
        self.nodes = head;
        self.normalize();
    }

    /// Drop empty text runs and merge neighbouring ones
    fn normalize(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            match node {
                Node::Text(text) if text.is_empty() => {}
                Node::Text(text) => match merged.last_mut() {
                    Some(Node::Text(prev)) => prev.push_str(&text),
                    _ => merged.push(Node::Text(text)),
                },
                token => merged.push(token),
            }
        }
        self.nodes = merged;
    }
}

impl fmt::Display for FormulaDocument {
    /// Human readable rendering: tokens appear as `[label]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            match node {
                Node::Text(text) => f.write_str(text)?,
                Node::Token(token) => write!(f, "[{}]", token.label)?,
            }
        }
        Ok(())
    }
}

fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}
