//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use indicator_formula::commands::Cmd;
use indicator_formula::config::FormulaConfig;
use indicator_formula::messages::{EditMsg, Msg, SuggestMsg};
use indicator_formula::model::{FormulaDocument, FormulaModel};
use indicator_formula::runtime::Runtime;
use indicator_formula::source::Catalog;
use indicator_formula::token::{Candidate, TokenKind};
use indicator_formula::update::update;

/// Create a test model holding plain `text` with the caret at the end
pub fn test_model(text: &str) -> FormulaModel {
    FormulaModel::with_document(FormulaDocument::with_text(text), FormulaConfig::default())
}

/// Type `text` one character at a time, collecting every command emitted
pub fn type_text(model: &mut FormulaModel, text: &str) -> Vec<Cmd> {
    text.chars()
        .filter_map(|ch| update(model, Msg::Edit(EditMsg::InsertChar(ch))))
        .flat_map(Cmd::flatten)
        .collect()
}

/// Deliver a successful source answer for `(kind, seq)`
pub fn deliver(model: &mut FormulaModel, kind: TokenKind, seq: u64, items: &[(&str, &str)]) {
    let result = Ok(items
        .iter()
        .map(|(id, label)| Candidate::new(*id, *label))
        .collect());
    update(
        model,
        Msg::Suggest(SuggestMsg::CandidatesLoaded { kind, seq, result }),
    );
}

/// The `(kind, seq, query)` of every immediate fetch in `cmds`
pub fn fetches(cmds: &[Cmd]) -> Vec<(TokenKind, u64, String)> {
    cmds.iter()
        .filter_map(|cmd| match cmd {
            Cmd::FetchCandidates { kind, seq, query } => Some((*kind, *seq, query.clone())),
            _ => None,
        })
        .collect()
}

/// Serialized marker for one token
pub fn chip(id: &str, kind: &str, label: &str) -> String {
    format!(
        "<token-chip id=\"{}\" kind=\"{}\" label=\"{}\">{}</token-chip>",
        id, kind, label, label
    )
}

/// Runtime over an empty document and the built-in catalog
pub fn demo_runtime(config: FormulaConfig) -> Runtime {
    Runtime::new(FormulaModel::new(config), Catalog::demo().into_registry())
}
