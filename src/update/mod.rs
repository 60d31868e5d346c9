//! Update functions for the Elm-style architecture
//!
//! All state transitions happen here: `update(model, msg) -> Option<Cmd>`.

mod app;
mod edit;
mod suggest;

pub use app::update_app;
pub use edit::update_edit;
pub use suggest::update_suggest;

#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

use crate::commands::Cmd;
use crate::messages::{EditMsg, Msg};
use crate::model::FormulaModel;
use crate::suggest::{DocumentEdit, FetchRequest};

#[cfg(debug_assertions)]
use crate::tracing::SessionSnapshot;

/// Main update function - dispatches to sub-handlers
pub fn update(model: &mut FormulaModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }

    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

fn update_inner(model: &mut FormulaModel, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Edit(m) => edit::update_edit(model, m),
        Msg::Suggest(m) => suggest::update_suggest(model, m),
        Msg::Toolbar(key) => {
            edit::update_edit(model, EditMsg::InsertText(key.insert_text().to_string()))
        }
        Msg::App(m) => app::update_app(model, m),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after session state and logs the diff.
#[cfg(debug_assertions)]
fn update_traced(model: &mut FormulaModel, msg: Msg) -> Option<Cmd> {
    use crate::messages::SuggestMsg;

    // Result deliveries are frequent and carry whole candidate lists
    let is_noisy = matches!(&msg, Msg::Suggest(SuggestMsg::CandidatesLoaded { .. }));

    let edits_document = matches!(&msg, Msg::Edit(m) if m.is_editing());
    let msg_name = msg_type_name(&msg);
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();

    let before = SessionSnapshot::from_model(model);
    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg);

    let after = SessionSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "session", %diff, "state changed");
    }
    if edits_document {
        debug!(target: "session", revision = model.revision, "document edited");
    }

    debug_assert!(
        model.caret <= model.document.len(),
        "caret {} past end {} after {}",
        model.caret,
        model.document.len(),
        msg_name
    );

    result
}

/// Get a display name for a message type
///
/// Example outputs:
/// - `Edit::InsertChar('$')`
/// - `Suggest::FetchReady { kind: Position, seq: 3 }`
/// - `Toolbar(Null)`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Edit(m) => format!("Edit::{:?}", m),
        Msg::Suggest(crate::messages::SuggestMsg::CandidatesLoaded { kind, seq, result }) => {
            let outcome = match result {
                Ok(list) => format!("{} candidates", list.len()),
                Err(e) => e.to_string(),
            };
            format!("Suggest::CandidatesLoaded({:?}, {}, {})", kind, seq, outcome)
        }
        Msg::Suggest(m) => format!("Suggest::{:?}", m),
        Msg::Toolbar(key) => format!("Toolbar({:?})", key),
        Msg::App(crate::messages::AppMsg::Load(value)) => {
            format!("App::Load({} bytes)", value.len())
        }
        Msg::App(m) => format!("App::{:?}", m),
    }
}

/// Run the trigger detectors after a caret move or document edit and turn
/// their events into fetch commands
pub(crate) fn observe_triggers(
    model: &mut FormulaModel,
    edit: Option<DocumentEdit>,
    typed: Option<char>,
) -> Vec<Cmd> {
    let events = model
        .triggers
        .observe(&model.document, model.caret, edit.as_ref(), typed);

    let mut cmds = Vec::new();
    for event in &events {
        tracing::debug!(target: "suggest", ?event, "trigger event");
        if let Some(request) = model.suggestions.handle_event(event) {
            cmds.push(fetch_cmd(model, request));
        }
    }
    if let Some(rect) = model.caret_rect {
        model.suggestions.place(rect);
    }
    cmds
}

/// A fetch request becomes either an immediate fetch or a debounce timer
fn fetch_cmd(model: &FormulaModel, request: FetchRequest) -> Cmd {
    let FetchRequest { kind, seq, query } = request;
    if model.config.debounce_ms > 0 && !query.is_empty() {
        Cmd::DebouncedFetch {
            kind,
            seq,
            delay_ms: model.config.debounce_ms,
        }
    } else {
        Cmd::FetchCandidates { kind, seq, query }
    }
}

/// Record a document mutation and announce the new serialized value
pub(crate) fn document_changed(model: &mut FormulaModel) -> Cmd {
    model.revision += 1;
    Cmd::DocumentChanged(model.serialize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormulaConfig;
    use crate::messages::SuggestMsg;
    use crate::token::{Candidate, TokenKind};
    use crate::toolbar::ToolbarKey;

    fn type_str(model: &mut FormulaModel, text: &str) -> Vec<Cmd> {
        text.chars()
            .filter_map(|ch| update(model, Msg::Edit(EditMsg::InsertChar(ch))))
            .flat_map(Cmd::flatten)
            .collect()
    }

    fn fetches(cmds: &[Cmd]) -> Vec<(TokenKind, u64, String)> {
        cmds.iter()
            .filter_map(|c| match c {
                Cmd::FetchCandidates { kind, seq, query } => Some((*kind, *seq, query.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_typing_trigger_fetches_empty_then_each_query() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        let cmds = type_str(&mut model, "$en");
        assert_eq!(
            fetches(&cmds),
            vec![
                (TokenKind::Position, 1, String::new()),
                (TokenKind::Position, 2, "e".to_string()),
                (TokenKind::Position, 3, "en".to_string()),
            ]
        );
        assert_eq!(model.revision, 3);
    }

    #[test]
    fn test_debounce_only_applies_to_non_empty_queries() {
        let config = FormulaConfig {
            debounce_ms: 150,
            ..FormulaConfig::default()
        };
        let mut model = FormulaModel::new(config);
        let cmds = type_str(&mut model, "#g");
        assert_eq!(fetches(&cmds), vec![(TokenKind::Impact, 1, String::new())]);
        assert!(cmds.contains(&Cmd::DebouncedFetch {
            kind: TokenKind::Impact,
            seq: 2,
            delay_ms: 150
        }));
    }

    #[test]
    fn test_fetch_ready_for_superseded_seq_is_dropped() {
        let config = FormulaConfig {
            debounce_ms: 100,
            ..FormulaConfig::default()
        };
        let mut model = FormulaModel::new(config);
        type_str(&mut model, "$ab");

        let stale = update(
            &mut model,
            Msg::Suggest(SuggestMsg::FetchReady {
                kind: TokenKind::Position,
                seq: 2,
            }),
        );
        assert_eq!(stale, None);

        let current = update(
            &mut model,
            Msg::Suggest(SuggestMsg::FetchReady {
                kind: TokenKind::Position,
                seq: 3,
            }),
        );
        assert_eq!(
            current,
            Some(Cmd::FetchCandidates {
                kind: TokenKind::Position,
                seq: 3,
                query: "ab".to_string()
            })
        );
    }

    #[test]
    fn test_toolbar_null_does_not_open_impact_span() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        let cmd = update(&mut model, Msg::Toolbar(ToolbarKey::Null));
        assert_eq!(model.serialize(), "#NULL");
        assert_eq!(model.caret, 5);
        assert!(model.popup().is_none());
        assert_eq!(cmd, Some(Cmd::DocumentChanged("#NULL".to_string())));
    }

    #[test]
    fn test_accept_commits_highlighted_candidate() {
        let mut model = FormulaModel::new(FormulaConfig::default());
        type_str(&mut model, "total $ener");
        update(
            &mut model,
            Msg::Suggest(SuggestMsg::CandidatesLoaded {
                kind: TokenKind::Position,
                seq: 5,
                result: Ok(vec![Candidate::new("P_0001", "Energy consumption")]),
            }),
        );
        let cmd = update(&mut model, Msg::Suggest(SuggestMsg::Accept));

        assert_eq!(
            model.serialize(),
            "total <token-chip id=\"P_0001\" kind=\"position\" label=\"Energy consumption\">Energy consumption</token-chip>"
        );
        assert_eq!(model.caret, 7);
        assert!(model.popup().is_none());
        assert!(matches!(cmd, Some(Cmd::DocumentChanged(_))));
    }
}
