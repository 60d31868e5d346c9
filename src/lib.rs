//! Indicator formula editor - Elm-style token insertion
//!
//! This crate provides the core types and logic for editing indicator
//! formulas: free text mixed with atomic position and impact tokens that
//! are inserted by typing a trigger character and picking a suggestion.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod source;
pub mod suggest;
pub mod token;
pub mod toolbar;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::FormulaConfig;
pub use messages::Msg;
pub use model::{FormulaDocument, FormulaModel};
pub use token::{Candidate, Token, TokenKind};
