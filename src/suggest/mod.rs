//! Token suggestions: trigger detection and the candidate popup
//!
//! ```text
//! keystroke → TriggerSet::observe() → TriggerEvent → SuggestionController
//!           → FetchRequest → Cmd::FetchCandidates → CandidateSource (worker)
//!           → SuggestMsg::CandidatesLoaded → SuggestionController::apply_result()
//! ```

mod controller;
mod trigger;

pub use controller::{
    FetchRequest, Popup, PopupStatus, Rect, SuggestionController, POPUP_OFFSET_Y,
};
pub use trigger::{
    ActiveSpan, CloseReason, DetectorState, DocumentEdit, TriggerDetector, TriggerEvent,
    TriggerSet,
};
