//! Suggestion controller - bridges trigger events to candidate fetches
//!
//! Each query change issues a [`FetchRequest`] carrying a per-kind sequence
//! number. Only a result whose sequence number is the latest one issued for
//! its kind is applied; anything older is dropped on arrival. While a fetch
//! is in flight the previous candidate list stays visible.

use std::collections::HashMap;

use super::trigger::{CloseReason, TriggerEvent};
use crate::source::SourceError;
use crate::token::{Candidate, TokenKind};

/// Vertical gap between the caret rectangle and the popup
pub const POPUP_OFFSET_Y: f32 = 6.0;

/// A candidate lookup the runtime should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub kind: TokenKind,
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupStatus {
    /// First fetch for the span has not answered yet
    Loading,
    Ready,
    /// The latest fetch failed; the list is empty
    Failed,
}

/// Screen rectangle of the caret, reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// The visible suggestion list
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub kind: TokenKind,
    pub anchor: usize,
    pub query: String,
    pub candidates: Vec<Candidate>,
    pub selected: usize,
    pub status: PopupStatus,
    /// Sequence number of the newest request still awaiting an answer
    pub pending: Option<u64>,
    /// Top-left corner in screen coordinates, once the host reported one
    pub placement: Option<(f32, f32)>,
}

impl Popup {
    pub fn highlighted(&self) -> Option<&Candidate> {
        self.candidates.get(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SuggestionController {
    popup: Option<Popup>,
    issued: HashMap<TokenKind, u64>,
    max_candidates: usize,
}

impl SuggestionController {
    pub fn new(max_candidates: usize) -> Self {
        Self {
            popup: None,
            issued: HashMap::new(),
            max_candidates,
        }
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.popup.is_some()
    }

    /// Highest sequence number issued so far for `kind` (0 if none)
    pub fn latest_seq(&self, kind: TokenKind) -> u64 {
        self.issued.get(&kind).copied().unwrap_or(0)
    }

    /// Whether `seq` is still the request a result would be applied for
    pub fn is_current(&self, kind: TokenKind, seq: u64) -> bool {
        matches!(&self.popup, Some(popup) if popup.kind == kind)
            && seq == self.latest_seq(kind)
    }

    /// React to a trigger event; returns the fetch to run, if any
    pub fn handle_event(&mut self, event: &TriggerEvent) -> Option<FetchRequest> {
        match event {
            TriggerEvent::Opened { kind, anchor } => Some(self.on_open(*kind, *anchor)),
            TriggerEvent::Updated { kind, query } => self.on_update(*kind, query),
            TriggerEvent::Closed { reason, .. } => {
                self.on_close(*reason);
                None
            }
        }
    }

    /// A span opened: show an empty popup and fetch with an empty query
    pub fn on_open(&mut self, kind: TokenKind, anchor: usize) -> FetchRequest {
        self.popup = Some(Popup {
            kind,
            anchor,
            query: String::new(),
            candidates: Vec::new(),
            selected: 0,
            status: PopupStatus::Loading,
            pending: None,
            placement: None,
        });
        self.issue(kind, String::new())
    }

    /// The query changed: fetch again, keeping the current list visible
    pub fn on_update(&mut self, kind: TokenKind, query: &str) -> Option<FetchRequest> {
        match &mut self.popup {
            Some(popup) if popup.kind == kind => popup.query = query.to_string(),
            _ => return None,
        }
        Some(self.issue(kind, query.to_string()))
    }

    /// The span closed: drop the popup and anything still in flight
    pub fn on_close(&mut self, reason: CloseReason) {
        if let Some(popup) = self.popup.take() {
            tracing::debug!(
                "Suggestion popup for {} closed ({:?}) with query '{}'",
                popup.kind,
                reason,
                popup.query
            );
        }
    }

    fn issue(&mut self, kind: TokenKind, query: String) -> FetchRequest {
        let seq = self.issued.entry(kind).or_insert(0);
        *seq += 1;
        let seq = *seq;
        if let Some(popup) = &mut self.popup {
            popup.pending = Some(seq);
        }
        FetchRequest { kind, seq, query }
    }

    /// Apply a fetch result; returns false when it was stale and discarded
    pub fn apply_result(
        &mut self,
        kind: TokenKind,
        seq: u64,
        result: Result<Vec<Candidate>, SourceError>,
    ) -> bool {
        if !self.is_current(kind, seq) {
            tracing::debug!(
                "Discarding stale {} candidates: seq {} (latest {})",
                kind,
                seq,
                self.latest_seq(kind)
            );
            return false;
        }
        let max_candidates = self.max_candidates;
        let Some(popup) = self.popup.as_mut() else {
            return false;
        };

        popup.pending = None;
        match result {
            Ok(mut candidates) => {
                candidates.truncate(max_candidates);
                let previous = popup.highlighted().map(|c| c.id.clone());
                popup.selected = previous
                    .and_then(|id| candidates.iter().position(|c| c.id == id))
                    .unwrap_or(0);
                popup.candidates = candidates;
                popup.status = PopupStatus::Ready;
            }
            Err(err) => {
                tracing::warn!("Candidate fetch for {} '{}' failed: {}", kind, popup.query, err);
                popup.candidates.clear();
                popup.selected = 0;
                popup.status = PopupStatus::Failed;
            }
        }
        true
    }

    /// Move the highlight up, stopping at the first item
    pub fn select_previous(&mut self) {
        if let Some(popup) = &mut self.popup {
            popup.selected = popup.selected.saturating_sub(1);
        }
    }

    /// Move the highlight down, stopping at the last item
    pub fn select_next(&mut self) {
        if let Some(popup) = &mut self.popup {
            if popup.selected + 1 < popup.candidates.len() {
                popup.selected += 1;
            }
        }
    }

    /// Highlight `index` (pointer hover/selection); out of range is ignored
    pub fn select(&mut self, index: usize) -> Option<&Candidate> {
        let popup = self.popup.as_mut()?;
        if index < popup.candidates.len() {
            popup.selected = index;
        }
        popup.candidates.get(index)
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.popup.as_ref()?.highlighted()
    }

    /// Recompute the popup position below the caret rectangle
    pub fn place(&mut self, caret: Rect) {
        if let Some(popup) = &mut self.popup {
            popup.placement = Some((caret.left, caret.bottom() + POPUP_OFFSET_Y));
        }
    }
}
