//! Trigger detection - recognises an open query span behind the caret
//!
//! One [`TriggerDetector`] exists per token kind. A detector is either
//! `Idle` or `Open { anchor, query }`, where `anchor` is the document offset
//! of the trigger character itself and `query` is the text between the
//! trigger and the caret.
//!
//! [`TriggerSet`] owns all detectors and guarantees that at most one of
//! them is open at any time.

use crate::config::TriggerConfig;
use crate::model::{FormulaDocument, Slot};
use crate::token::TokenKind;

/// Why a query span closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Cancel,
    Commit,
}

/// State transition emitted by a detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    Opened { kind: TokenKind, anchor: usize },
    Updated { kind: TokenKind, query: String },
    Closed { kind: TokenKind, reason: CloseReason },
}

/// A document mutation the detectors need to map their anchor through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEdit {
    Insert { at: usize, width: usize },
    Delete { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetectorState {
    #[default]
    Idle,
    Open { anchor: usize, query: String },
}

/// The span a detector had open when it was committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSpan {
    pub kind: TokenKind,
    pub anchor: usize,
}

/// Per-kind trigger state machine
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    kind: TokenKind,
    trigger: char,
    state: DetectorState,
}

impl TriggerDetector {
    pub fn new(kind: TokenKind, trigger: char) -> Self {
        Self {
            kind,
            trigger,
            state: DetectorState::Idle,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DetectorState::Open { .. })
    }

    pub fn anchor(&self) -> Option<usize> {
        match self.state {
            DetectorState::Open { anchor, .. } => Some(anchor),
            DetectorState::Idle => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match &self.state {
            DetectorState::Open { query, .. } => Some(query),
            DetectorState::Idle => None,
        }
    }

    /// Whether the character just typed before `caret` opens this trigger
    fn can_open(&self, doc: &FormulaDocument, caret: usize, allow_mid_word: bool) -> bool {
        let Some(anchor) = caret.checked_sub(1) else {
            return false;
        };
        if doc.slot_at(anchor) != Some(Slot::Char(self.trigger)) {
            return false;
        }
        if allow_mid_word || anchor == 0 {
            return true;
        }
        matches!(doc.slot_at(anchor - 1), Some(Slot::Char(c)) if c.is_whitespace())
    }

    fn open(&mut self, anchor: usize) -> TriggerEvent {
        self.state = DetectorState::Open {
            anchor,
            query: String::new(),
        };
        TriggerEvent::Opened {
            kind: self.kind,
            anchor,
        }
    }

    fn close(&mut self, reason: CloseReason) -> Option<TriggerEvent> {
        if !self.is_open() {
            return None;
        }
        self.state = DetectorState::Idle;
        Some(TriggerEvent::Closed {
            kind: self.kind,
            reason,
        })
    }

    /// Shift the anchor through an edit; deleting the trigger cancels
    fn map_edit(&mut self, edit: &DocumentEdit) -> Option<TriggerEvent> {
        let DetectorState::Open { anchor, .. } = &mut self.state else {
            return None;
        };
        match *edit {
            DocumentEdit::Insert { at, width } => {
                if at <= *anchor {
                    *anchor += width;
                }
                None
            }
            DocumentEdit::Delete { start, end } => {
                if (start..end).contains(anchor) {
                    self.close(CloseReason::Cancel)
                } else {
                    if end <= *anchor {
                        *anchor -= end - start;
                    }
                    None
                }
            }
        }
    }

    /// Re-read the span after the caret or content changed
    fn track(&mut self, doc: &FormulaDocument, caret: usize) -> Option<TriggerEvent> {
        let DetectorState::Open { anchor, query } = &self.state else {
            return None;
        };
        let anchor = *anchor;

        if doc.slot_at(anchor) != Some(Slot::Char(self.trigger)) || caret <= anchor {
            return self.close(CloseReason::Cancel);
        }
        let text = match doc.text_in(anchor + 1..caret) {
            Some(text) if !text.contains('\n') => text,
            _ => return self.close(CloseReason::Cancel),
        };
        if text == *query {
            return None;
        }

        self.state = DetectorState::Open {
            anchor,
            query: text.clone(),
        };
        Some(TriggerEvent::Updated {
            kind: self.kind,
            query: text,
        })
    }
}

/// All detectors of an editing session, addressed by kind
#[derive(Debug, Clone)]
pub struct TriggerSet {
    detectors: Vec<TriggerDetector>,
    allow_mid_word: bool,
}

impl TriggerSet {
    pub fn new(triggers: &TriggerConfig, allow_mid_word: bool) -> Self {
        let detectors = TokenKind::ALL
            .iter()
            .map(|&kind| TriggerDetector::new(kind, triggers.char_for(kind)))
            .collect();
        Self {
            detectors,
            allow_mid_word,
        }
    }

    pub fn detector(&self, kind: TokenKind) -> Option<&TriggerDetector> {
        self.detectors.iter().find(|d| d.kind == kind)
    }

    /// The open detector, if any
    pub fn active(&self) -> Option<&TriggerDetector> {
        self.detectors.iter().find(|d| d.is_open())
    }

    fn active_index(&self) -> Option<usize> {
        self.detectors.iter().position(|d| d.is_open())
    }

    fn index_for_char(&self, ch: char) -> Option<usize> {
        self.detectors.iter().position(|d| d.trigger == ch)
    }

    /// Feed one mutation or caret move through the detectors
    ///
    /// `edit` is the document change that just happened (if any) and
    /// `typed` the character the user typed, which is the only way a span
    /// can open.
    pub fn observe(
        &mut self,
        doc: &FormulaDocument,
        caret: usize,
        edit: Option<&DocumentEdit>,
        typed: Option<char>,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();

        if let (Some(edit), Some(idx)) = (edit, self.active_index()) {
            events.extend(self.detectors[idx].map_edit(edit));
        }

        if let Some(idx) = self.active_index() {
            if let Some(reanchor) = self.reanchor_target(idx, doc, caret, typed) {
                events.extend(self.detectors[idx].close(CloseReason::Cancel));
                events.push(self.detectors[reanchor].open(caret - 1));
            } else {
                events.extend(self.detectors[idx].track(doc, caret));
            }
            return events;
        }

        let Some(ch) = typed else {
            return events;
        };
        if let Some(idx) = self.index_for_char(ch) {
            if self.detectors[idx].can_open(doc, caret, self.allow_mid_word) {
                events.push(self.detectors[idx].open(caret - 1));
            }
        }
        events
    }

    /// A trigger typed directly after an open trigger with an empty query
    /// moves the span to the new character
    fn reanchor_target(
        &self,
        active: usize,
        doc: &FormulaDocument,
        caret: usize,
        typed: Option<char>,
    ) -> Option<usize> {
        let ch = typed?;
        let detector = &self.detectors[active];
        let anchor = detector.anchor()?;
        if detector.query() != Some("") || caret != anchor + 2 {
            return None;
        }
        if doc.slot_at(caret - 1) != Some(Slot::Char(ch)) {
            return None;
        }
        let target = self.index_for_char(ch)?;
        self.detectors[target]
            .can_open(doc, caret, self.allow_mid_word)
            .then_some(target)
    }

    /// Explicit cancel (Escape)
    pub fn cancel(&mut self) -> Option<TriggerEvent> {
        let idx = self.active_index()?;
        self.detectors[idx].close(CloseReason::Cancel)
    }

    /// Close the open span for commit, returning where it started
    pub fn commit(&mut self) -> Option<ActiveSpan> {
        let idx = self.active_index()?;
        let detector = &mut self.detectors[idx];
        let span = ActiveSpan {
            kind: detector.kind,
            anchor: detector.anchor()?,
        };
        detector.close(CloseReason::Commit);
        Some(span)
    }
}
