//! Keyboard input handling
//!
//! While the suggestion popup is open it captures the navigation keys
//! (Up, Down, Enter, Escape); otherwise those keys edit the document or do
//! nothing.

use crate::messages::{CaretMove, EditMsg, Msg, SuggestMsg};
use crate::model::FormulaModel;

/// Host key events understood by the formula editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
}

/// Map a key to a message; `None` means the key is ignored
pub fn key_to_msg(model: &FormulaModel, key: Key) -> Option<Msg> {
    if model.suggestions.is_open() {
        let captured = match key {
            Key::Up => Some(SuggestMsg::SelectPrevious),
            Key::Down => Some(SuggestMsg::SelectNext),
            Key::Enter => Some(SuggestMsg::Accept),
            Key::Escape => Some(SuggestMsg::Cancel),
            _ => None,
        };
        if let Some(msg) = captured {
            return Some(Msg::Suggest(msg));
        }
    }

    let msg = match key {
        Key::Char(ch) => EditMsg::InsertChar(ch),
        Key::Enter => EditMsg::InsertNewline,
        Key::Backspace => EditMsg::DeleteBackward,
        Key::Delete => EditMsg::DeleteForward,
        Key::Left => EditMsg::MoveCaret(CaretMove::Left),
        Key::Right => EditMsg::MoveCaret(CaretMove::Right),
        Key::Home => EditMsg::MoveCaret(CaretMove::Start),
        Key::End => EditMsg::MoveCaret(CaretMove::End),
        Key::Up | Key::Down | Key::Escape => return None,
    };
    Some(Msg::Edit(msg))
}
