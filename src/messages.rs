//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::source::SourceError;
use crate::suggest::Rect;
use crate::token::{Candidate, TokenKind};
use crate::toolbar::ToolbarKey;

/// Caret movement targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    /// Start of the document
    Start,
    /// End of the document
    End,
}

/// Document editing messages
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    /// A character typed by the user (the only input that opens a trigger)
    InsertChar(char),
    /// Pasted or programmatic text
    InsertText(String),
    /// Enter while no suggestion popup is open
    InsertNewline,
    /// Backspace
    DeleteBackward,
    /// Delete
    DeleteForward,
    MoveCaret(CaretMove),
    /// Place the caret at a slot offset (pointer click)
    SetCaret(usize),
    /// The remove button on the chip at this offset was pressed
    RemoveToken(usize),
}

/// Suggestion popup messages
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestMsg {
    /// Arrow up
    SelectPrevious,
    /// Arrow down
    SelectNext,
    /// Enter: commit the highlighted candidate
    Accept,
    /// Pointer selection of a row
    Pick(usize),
    /// Escape
    Cancel,
    /// Debounce delay for a query elapsed
    FetchReady { kind: TokenKind, seq: u64 },
    /// A candidate source answered
    CandidatesLoaded {
        kind: TokenKind,
        seq: u64,
        result: Result<Vec<Candidate>, SourceError>,
    },
}

/// Session-level messages
#[derive(Debug, Clone, PartialEq)]
pub enum AppMsg {
    /// Replace the content with a serialized formula
    Load(String),
    /// Host reported the caret's screen rectangle
    CaretRect(Rect),
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Edit(EditMsg),
    Suggest(SuggestMsg),
    Toolbar(ToolbarKey),
    App(AppMsg),
}

impl EditMsg {
    /// Check if this message modifies the document
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            EditMsg::InsertChar(_)
                | EditMsg::InsertText(_)
                | EditMsg::InsertNewline
                | EditMsg::DeleteBackward
                | EditMsg::DeleteForward
                | EditMsg::RemoveToken(_)
        )
    }
}
