//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use crate::token::TokenKind;

/// Commands returned by update functions
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Request a redraw of the editor and popup
    Redraw,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
    /// Wait `delay_ms`, then send `SuggestMsg::FetchReady { kind, seq }`
    DebouncedFetch {
        kind: TokenKind,
        seq: u64,
        delay_ms: u64,
    },
    /// Query the candidate source for `kind` on a worker thread
    /// Sends `SuggestMsg::CandidatesLoaded` when done
    FetchCandidates {
        kind: TokenKind,
        seq: u64,
        query: String,
    },
    /// The document changed; carries its serialized form
    DocumentChanged(String),
}

impl Cmd {
    /// Create a batch of commands, flattening `None`s away
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
            Cmd::DebouncedFetch { .. } => false,
            Cmd::FetchCandidates { .. } => false,
            Cmd::DocumentChanged(_) => true,
        }
    }

    /// Iterate over this command and everything nested in batches
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            cmd => vec![cmd],
        }
    }
}
