//! Session-level message handlers

use crate::commands::Cmd;
use crate::messages::AppMsg;
use crate::model::{FormulaDocument, FormulaModel};
use crate::suggest::CloseReason;

use super::document_changed;

/// Handle app messages
pub fn update_app(model: &mut FormulaModel, msg: AppMsg) -> Option<Cmd> {
    match msg {
        AppMsg::Load(value) => {
            let document = match FormulaDocument::deserialize_with(&value, model.config.unknown_tags)
            {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("Ignoring malformed formula value: {}", e);
                    return None;
                }
            };

            if model.triggers.cancel().is_some() {
                model.suggestions.on_close(CloseReason::Cancel);
            }
            model.document = document;
            model.caret = model.document.len();
            tracing::info!(
                "Loaded formula with {} slots and {} tokens",
                model.document.len(),
                model.document.tokens().count()
            );
            Some(document_changed(model))
        }
        AppMsg::CaretRect(rect) => {
            model.caret_rect = Some(rect);
            model.suggestions.popup()?;
            model.suggestions.place(rect);
            Some(Cmd::Redraw)
        }
    }
}
