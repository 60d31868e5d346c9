//! Suggestion popup navigation, commit, and fetch results

use crate::commands::Cmd;
use crate::messages::SuggestMsg;
use crate::model::FormulaModel;
use crate::suggest::CloseReason;
use crate::token::{Candidate, Token};

use super::document_changed;

/// Handle suggestion messages
pub fn update_suggest(model: &mut FormulaModel, msg: SuggestMsg) -> Option<Cmd> {
    match msg {
        SuggestMsg::SelectPrevious => {
            model.suggestions.popup()?;
            model.suggestions.select_previous();
            Some(Cmd::Redraw)
        }
        SuggestMsg::SelectNext => {
            model.suggestions.popup()?;
            model.suggestions.select_next();
            Some(Cmd::Redraw)
        }
        SuggestMsg::Accept => {
            // An empty list swallows Enter without committing anything
            let candidate = model.suggestions.highlighted()?.clone();
            commit(model, &candidate)
        }
        SuggestMsg::Pick(index) => {
            let candidate = model.suggestions.select(index)?.clone();
            commit(model, &candidate)
        }
        SuggestMsg::Cancel => {
            let event = model.triggers.cancel()?;
            model.suggestions.handle_event(&event);
            Some(Cmd::Redraw)
        }

        SuggestMsg::FetchReady { kind, seq } => {
            if !model.suggestions.is_current(kind, seq) {
                tracing::trace!("Debounced fetch {} seq {} superseded", kind, seq);
                return None;
            }
            let query = model.suggestions.popup()?.query.clone();
            Some(Cmd::FetchCandidates { kind, seq, query })
        }
        SuggestMsg::CandidatesLoaded { kind, seq, result } => {
            if model.suggestions.apply_result(kind, seq, result) {
                Some(Cmd::Redraw)
            } else {
                None
            }
        }
    }
}

/// Replace the open span (trigger through caret) with a token
fn commit(model: &mut FormulaModel, candidate: &Candidate) -> Option<Cmd> {
    let span = model.triggers.commit()?;
    let token = Token::from_candidate(span.kind, candidate);

    if let Err(e) = model
        .document
        .insert_token(span.anchor..model.caret, token)
    {
        tracing::warn!(
            "Committing {} over {}..{} failed: {}",
            candidate.id,
            span.anchor,
            model.caret,
            e
        );
        model.suggestions.on_close(CloseReason::Cancel);
        return Some(Cmd::Redraw);
    }

    tracing::debug!(
        "Committed {} token {} ('{}') at {}",
        span.kind,
        candidate.id,
        candidate.label,
        span.anchor
    );
    model.caret = span.anchor + 1;
    model.suggestions.on_close(CloseReason::Commit);
    Some(document_changed(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormulaConfig;
    use crate::messages::EditMsg;
    use crate::source::SourceError;
    use crate::suggest::PopupStatus;
    use crate::token::TokenKind;
    use crate::update::update_edit;

    fn open_with(model: &mut FormulaModel, text: &str) {
        for ch in text.chars() {
            update_edit(model, EditMsg::InsertChar(ch));
        }
    }

    fn load(model: &mut FormulaModel, kind: TokenKind, seq: u64, ids: &[&str]) -> Option<Cmd> {
        let result = Ok(ids
            .iter()
            .map(|id| Candidate::new(*id, format!("Label {}", id)))
            .collect());
        update_suggest(model, SuggestMsg::CandidatesLoaded { kind, seq, result })
    }

    #[test]
    fn test_out_of_order_results_keep_latest() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "$ab");

        // seq 3 ("ab") answers first, then the stale seq 2 ("a")
        assert_eq!(load(&mut model, TokenKind::Position, 3, &["P_0003"]), Some(Cmd::Redraw));
        assert_eq!(load(&mut model, TokenKind::Position, 2, &["P_0001", "P_0002"]), None);

        let popup = model.popup().unwrap();
        assert_eq!(popup.candidates.len(), 1);
        assert_eq!(popup.candidates[0].id, "P_0003");
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "$zz");
        load(&mut model, TokenKind::Position, 3, &[]);

        assert_eq!(update_suggest(&mut model, SuggestMsg::Accept), None);
        assert_eq!(model.serialize(), "$zz");
        assert!(model.popup().is_some());
    }

    #[test]
    fn test_fetch_failure_keeps_span_open() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "#g");
        let cmd = update_suggest(
            &mut model,
            SuggestMsg::CandidatesLoaded {
                kind: TokenKind::Impact,
                seq: 2,
                result: Err(SourceError::Failed("timeout".into())),
            },
        );
        assert_eq!(cmd, Some(Cmd::Redraw));

        let popup = model.popup().unwrap();
        assert_eq!(popup.status, PopupStatus::Failed);
        assert!(popup.candidates.is_empty());
        assert!(model.triggers.active().is_some());
    }

    #[test]
    fn test_navigation_and_pick() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "x #");
        load(&mut model, TokenKind::Impact, 1, &["I_0001", "I_0002"]);

        update_suggest(&mut model, SuggestMsg::SelectNext);
        update_suggest(&mut model, SuggestMsg::SelectNext);
        assert_eq!(model.suggestions.highlighted().unwrap().id, "I_0002");
        update_suggest(&mut model, SuggestMsg::SelectPrevious);
        assert_eq!(model.suggestions.highlighted().unwrap().id, "I_0001");

        update_suggest(&mut model, SuggestMsg::Pick(1));
        let token = model.document.tokens().next().unwrap();
        assert_eq!(token.id, "I_0002");
        assert_eq!(token.kind, TokenKind::Impact);
        assert_eq!(model.caret, 3);
    }

    #[test]
    fn test_cancel_leaves_text_in_place() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "$ene");
        assert_eq!(update_suggest(&mut model, SuggestMsg::Cancel), Some(Cmd::Redraw));
        assert!(model.popup().is_none());
        assert_eq!(model.serialize(), "$ene");
        assert_eq!(update_suggest(&mut model, SuggestMsg::Cancel), None);
    }

    #[test]
    fn test_result_after_close_is_ignored() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        open_with(&mut model, "$e");
        update_suggest(&mut model, SuggestMsg::Cancel);
        assert_eq!(load(&mut model, TokenKind::Position, 2, &["P_0001"]), None);
        assert!(model.popup().is_none());
    }
}
