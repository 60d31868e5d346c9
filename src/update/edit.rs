//! Document editing and caret movement

use crate::commands::Cmd;
use crate::messages::{CaretMove, EditMsg};
use crate::model::{FormulaModel, Slot};
use crate::suggest::DocumentEdit;

use super::{document_changed, observe_triggers};

/// Handle editing messages
pub fn update_edit(model: &mut FormulaModel, msg: EditMsg) -> Option<Cmd> {
    match msg {
        EditMsg::InsertChar('\n') => insert(model, "\n", None),
        EditMsg::InsertChar(ch) => insert(model, &ch.to_string(), Some(ch)),
        EditMsg::InsertText(text) => insert(model, &text, None),
        EditMsg::InsertNewline => insert(model, "\n", None),

        EditMsg::DeleteBackward => {
            let position = model.caret.checked_sub(1)?;
            delete_slot(model, position)
        }
        EditMsg::DeleteForward => {
            if model.caret >= model.document.len() {
                return None;
            }
            delete_slot(model, model.caret)
        }
        EditMsg::RemoveToken(position) => {
            if !matches!(model.document.slot_at(position), Some(Slot::Token(_))) {
                tracing::debug!("RemoveToken at {} is not a token", position);
                return None;
            }
            delete_slot(model, position)
        }

        EditMsg::MoveCaret(target) => {
            let len = model.document.len();
            let caret = match target {
                CaretMove::Left => model.caret.saturating_sub(1),
                CaretMove::Right => (model.caret + 1).min(len),
                CaretMove::Start => 0,
                CaretMove::End => len,
            };
            move_caret(model, caret)
        }
        EditMsg::SetCaret(position) => {
            let caret = position.min(model.document.len());
            move_caret(model, caret)
        }
    }
}

fn insert(model: &mut FormulaModel, text: &str, typed: Option<char>) -> Option<Cmd> {
    if text.is_empty() {
        return None;
    }
    let at = model.caret;
    if let Err(e) = model.document.insert_text(at, text) {
        tracing::warn!("Insert at {} failed: {}", at, e);
        return None;
    }
    let width = text.chars().count();
    model.caret = at + width;

    let mut cmds = observe_triggers(model, Some(DocumentEdit::Insert { at, width }), typed);
    cmds.push(document_changed(model));
    Some(Cmd::batch(cmds))
}

/// Remove the slot at `position`; a token slot goes as a whole
fn delete_slot(model: &mut FormulaModel, position: usize) -> Option<Cmd> {
    let removed = match model.document.slot_at(position)? {
        Slot::Token(_) => model.document.delete_token(position).map(|token| {
            tracing::debug!("Removed token {} '{}'", token.id, token.label);
        }),
        Slot::Char(_) => model.document.delete_range(position..position + 1),
    };
    if let Err(e) = removed {
        tracing::warn!("Delete at {} failed: {}", position, e);
        return None;
    }
    if model.caret > position {
        model.caret -= 1;
    }

    let edit = DocumentEdit::Delete {
        start: position,
        end: position + 1,
    };
    let mut cmds = observe_triggers(model, Some(edit), None);
    cmds.push(document_changed(model));
    Some(Cmd::batch(cmds))
}

fn move_caret(model: &mut FormulaModel, caret: usize) -> Option<Cmd> {
    model.caret = caret;
    let mut cmds = observe_triggers(model, None, None);
    cmds.push(Cmd::Redraw);
    Some(Cmd::batch(cmds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormulaConfig;
    use crate::model::FormulaDocument;
    use crate::token::{Token, TokenKind};

    fn model_with_token() -> FormulaModel {
        let mut doc = FormulaDocument::with_text("ab");
        doc.insert_token(1..1, Token::new("P_0001", TokenKind::Position, "Energy consumption"))
            .unwrap();
        FormulaModel::with_document(doc, FormulaConfig::default())
    }

    #[test]
    fn test_backspace_removes_token_whole() {
        let mut model = model_with_token();
        model.caret = 2;
        update_edit(&mut model, EditMsg::DeleteBackward);
        assert_eq!(model.serialize(), "ab");
        assert_eq!(model.caret, 1);
        assert_eq!(model.document.nodes().len(), 1);
    }

    #[test]
    fn test_delete_forward_removes_token_whole() {
        let mut model = model_with_token();
        model.caret = 1;
        update_edit(&mut model, EditMsg::DeleteForward);
        assert_eq!(model.serialize(), "ab");
        assert_eq!(model.caret, 1);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut model = model_with_token();
        model.caret = 0;
        assert_eq!(update_edit(&mut model, EditMsg::DeleteBackward), None);
        assert_eq!(model.revision, 0);
    }

    #[test]
    fn test_remove_token_button_keeps_caret_on_same_text() {
        let mut model = model_with_token();
        model.caret = 3;
        update_edit(&mut model, EditMsg::RemoveToken(1));
        assert_eq!(model.serialize(), "ab");
        assert_eq!(model.caret, 2);
        assert_eq!(update_edit(&mut model, EditMsg::RemoveToken(0)), None);
    }

    #[test]
    fn test_set_caret_clamps() {
        let mut model = model_with_token();
        update_edit(&mut model, EditMsg::SetCaret(99));
        assert_eq!(model.caret, 3);
        update_edit(&mut model, EditMsg::MoveCaret(CaretMove::Start));
        assert_eq!(model.caret, 0);
        update_edit(&mut model, EditMsg::MoveCaret(CaretMove::Left));
        assert_eq!(model.caret, 0);
    }

    #[test]
    fn test_newline_cancels_open_span() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        update_edit(&mut model, EditMsg::InsertChar('$'));
        update_edit(&mut model, EditMsg::InsertChar('e'));
        assert!(model.popup().is_some());

        update_edit(&mut model, EditMsg::InsertNewline);
        assert!(model.popup().is_none());
        assert!(model.triggers.active().is_none());
        assert_eq!(model.serialize(), "$e\n");
    }

    #[test]
    fn test_paste_never_opens_span() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        update_edit(&mut model, EditMsg::InsertText("a $b".to_string()));
        assert!(model.popup().is_none());
        assert_eq!(model.caret, 4);
    }

    #[test]
    fn test_backspace_over_trigger_cancels() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        update_edit(&mut model, EditMsg::InsertChar('#'));
        assert!(model.popup().is_some());
        update_edit(&mut model, EditMsg::DeleteBackward);
        assert!(model.popup().is_none());
        assert!(model.document.is_empty());
    }
}
