//! Runtime - drives a `FormulaModel` and executes its commands
//!
//! This module contains the side-effecting half of the architecture:
//! - `Runtime` owns the model, the candidate sources, and the message channel
//! - `input` maps host key events to messages depending on popup state
//!
//! Candidate lookups and debounce timers run on worker threads and report
//! back through an mpsc channel, so a slow source never blocks input.

pub mod input;

pub use input::Key;

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::commands::Cmd;
use crate::messages::{Msg, SuggestMsg};
use crate::model::FormulaModel;
use crate::source::{CandidateSource, SourceError, SourceRegistry};
use crate::token::Candidate;
use crate::update::update;

type ChangeHook = Box<dyn FnMut(&str)>;

/// An editing session plus the machinery that runs its side effects
pub struct Runtime {
    model: FormulaModel,
    sources: SourceRegistry,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    /// Worker threads that have not reported back yet
    in_flight: usize,
    on_change: Option<ChangeHook>,
}

impl Runtime {
    pub fn new(model: FormulaModel, sources: SourceRegistry) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model,
            sources,
            msg_tx,
            msg_rx,
            in_flight: 0,
            on_change: None,
        }
    }

    /// Register a callback receiving the serialized value after each change
    pub fn on_change(&mut self, hook: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    pub fn model(&self) -> &FormulaModel {
        &self.model
    }

    /// Serialized form of the current content
    pub fn value(&self) -> String {
        self.model.serialize()
    }

    /// Whether any fetch or timer is still outstanding
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Run one message through the update loop; returns whether to redraw
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        match update(&mut self.model, msg) {
            Some(cmd) => {
                let redraw = cmd.needs_redraw();
                self.process_cmd(cmd);
                redraw
            }
            None => false,
        }
    }

    /// Route a host key event; returns whether to redraw
    pub fn handle_key(&mut self, key: Key) -> bool {
        match input::key_to_msg(&self.model, key) {
            Some(msg) => self.dispatch(msg),
            None => false,
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
            Cmd::DebouncedFetch {
                kind,
                seq,
                delay_ms,
            } => {
                tracing::trace!("Scheduling {} fetch seq {} in {}ms", kind, seq, delay_ms);
                let tx = self.msg_tx.clone();
                self.in_flight += 1;
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_millis(delay_ms));
                    let _ = tx.send(Msg::Suggest(SuggestMsg::FetchReady { kind, seq }));
                });
            }
            Cmd::FetchCandidates { kind, seq, query } => {
                tracing::trace!("Fetching {} candidates seq {} for '{}'", kind, seq, query);
                let tx = self.msg_tx.clone();
                self.in_flight += 1;
                match self.sources.get(kind) {
                    Some(source) => {
                        std::thread::spawn(move || {
                            let result = search_guarded(source.as_ref(), &query);
                            let _ = tx.send(Msg::Suggest(SuggestMsg::CandidatesLoaded {
                                kind,
                                seq,
                                result,
                            }));
                        });
                    }
                    None => {
                        let result = Err(SourceError::Unavailable(kind));
                        let _ = tx.send(Msg::Suggest(SuggestMsg::CandidatesLoaded {
                            kind,
                            seq,
                            result,
                        }));
                    }
                }
            }
            Cmd::DocumentChanged(value) => {
                if let Some(hook) = self.on_change.as_mut() {
                    hook(&value);
                }
            }
        }
    }

    fn receive(&mut self, msg: Msg) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch(msg)
    }

    /// Apply every worker message that has already arrived
    pub fn pump(&mut self) -> bool {
        let mut needs_redraw = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            needs_redraw |= self.receive(msg);
        }
        needs_redraw
    }

    /// Block until all outstanding work has reported back or `timeout`
    /// passes; returns whether the runtime went idle
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.receive(msg);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!("{} candidate requests still pending", self.in_flight);
                    return false;
                }
                // We hold a sender ourselves, so this cannot happen
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }
}

/// Run a lookup on a worker thread, turning a panicking source into a
/// failed fetch so the result message is always sent
fn search_guarded(
    source: &dyn CandidateSource,
    query: &str,
) -> Result<Vec<Candidate>, SourceError> {
    match panic::catch_unwind(AssertUnwindSafe(|| source.search(query))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "source panicked".to_string());
            tracing::error!("Candidate source panicked: {}", reason);
            Err(SourceError::Failed(reason))
        }
    }
}
