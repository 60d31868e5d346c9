//! Toolbar buttons that insert literal operator text
//!
//! These are plain text insertions, never tokens, and they go through
//! `InsertText` so a `#` in `#NULL` cannot open an impact query.

use std::str::FromStr;

/// A toolbar button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarKey {
    OpenParen,
    CloseParen,
    Percent,
    Ampersand,
    Plus,
    Minus,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    Null,
}

impl ToolbarKey {
    /// Buttons in display order
    pub const ALL: [ToolbarKey; 11] = [
        ToolbarKey::OpenParen,
        ToolbarKey::CloseParen,
        ToolbarKey::Percent,
        ToolbarKey::Ampersand,
        ToolbarKey::Plus,
        ToolbarKey::Minus,
        ToolbarKey::Multiply,
        ToolbarKey::Divide,
        ToolbarKey::Equals,
        ToolbarKey::NotEquals,
        ToolbarKey::Null,
    ];

    /// Text shown on the button
    pub fn label(self) -> &'static str {
        match self {
            ToolbarKey::Multiply => "×",
            ToolbarKey::Divide => "÷",
            other => other.insert_text(),
        }
    }

    /// Text inserted at the caret
    pub fn insert_text(self) -> &'static str {
        match self {
            ToolbarKey::OpenParen => "(",
            ToolbarKey::CloseParen => ")",
            ToolbarKey::Percent => "%",
            ToolbarKey::Ampersand => "&",
            ToolbarKey::Plus => "+",
            ToolbarKey::Minus => "-",
            ToolbarKey::Multiply => "*",
            ToolbarKey::Divide => "/",
            ToolbarKey::Equals => "=",
            ToolbarKey::NotEquals => "≠",
            ToolbarKey::Null => "#NULL",
        }
    }
}

impl FromStr for ToolbarKey {
    type Err = ();

    /// Accepts either the button label or the inserted text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolbarKey::ALL
            .into_iter()
            .find(|key| key.label() == s || key.insert_text() == s)
            .ok_or(())
    }
}
