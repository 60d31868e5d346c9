//! Session model - the complete state of one formula editor
//!
//! This module contains the state types following the Elm Architecture pattern.

pub mod document;
pub mod wire;

pub use document::{DocumentError, FormulaDocument, Node, Slot};
pub use wire::UnknownTagPolicy;

use crate::config::FormulaConfig;
use crate::suggest::{Popup, Rect, SuggestionController, TriggerSet};

/// The complete editing session
///
/// Owned solely by the hosting UI; nothing outside holds references into it.
#[derive(Debug, Clone)]
pub struct FormulaModel {
    /// The formula content
    pub document: FormulaDocument,
    /// Caret position as a slot offset
    pub caret: usize,
    /// One trigger detector per token kind
    pub triggers: TriggerSet,
    /// Candidate popup state
    pub suggestions: SuggestionController,
    pub config: FormulaConfig,
    /// Incremented on each document mutation
    pub revision: u64,
    /// Last caret rectangle reported by the host
    pub caret_rect: Option<Rect>,
}

impl FormulaModel {
    /// Create an empty session
    pub fn new(config: FormulaConfig) -> Self {
        Self::with_document(FormulaDocument::new(), config)
    }

    /// Create a session around an existing document, caret at the end
    pub fn with_document(document: FormulaDocument, config: FormulaConfig) -> Self {
        let caret = document.len();
        Self {
            document,
            caret,
            triggers: TriggerSet::new(&config.triggers, config.allow_mid_word),
            suggestions: SuggestionController::new(config.max_candidates),
            config,
            revision: 0,
            caret_rect: None,
        }
    }

    /// Create a session from a serialized formula
    pub fn from_serialized(value: &str, config: FormulaConfig) -> Result<Self, DocumentError> {
        let document = FormulaDocument::deserialize_with(value, config.unknown_tags)?;
        Ok(Self::with_document(document, config))
    }

    /// Serialized form of the current content
    pub fn serialize(&self) -> String {
        self.document.serialize()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.suggestions.popup()
    }
}
