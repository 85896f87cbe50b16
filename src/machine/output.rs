//! Output sinks for state announcements and actions.

use crate::core::{ActionMessage, Emission};
use std::io::Write;
use tracing::warn;

/// Receiver of everything a machine emits.
///
/// The two methods are the two logical outputs: ordered action messages
/// and the name of each state as it begins.
pub trait OutputSink {
    fn action(&mut self, action: &ActionMessage);

    fn announce(&mut self, state: &str);

    fn emit(&mut self, emission: &Emission) {
        match emission {
            Emission::Action(action) => self.action(action),
            Emission::Announce(state) => self.announce(state),
        }
    }
}

/// Sink that keeps every emission in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSink {
    emissions: Vec<Emission>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in order.
    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionMessage> {
        self.emissions.iter().filter_map(|emission| match emission {
            Emission::Action(action) => Some(action),
            Emission::Announce(_) => None,
        })
    }

    pub fn announcements(&self) -> impl Iterator<Item = &str> {
        self.emissions.iter().filter_map(|emission| match emission {
            Emission::Announce(state) => Some(state.as_str()),
            Emission::Action(_) => None,
        })
    }

    /// Remove and return everything recorded so far.
    pub fn take(&mut self) -> Vec<Emission> {
        std::mem::take(&mut self.emissions)
    }

    pub fn clear(&mut self) {
        self.emissions.clear();
    }
}

impl OutputSink for RecordingSink {
    fn action(&mut self, action: &ActionMessage) {
        self.emissions.push(Emission::Action(action.clone()));
    }

    fn announce(&mut self, state: &str) {
        self.emissions.push(Emission::Announce(state.to_string()));
    }
}

/// Sink that writes one line per emission: `action <tokens>` or
/// `state <name>`.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, kind: &str, body: &dyn std::fmt::Display) {
        let result = writeln!(self.writer, "{kind} {body}").and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!("Failed to write {} output: {}", kind, e);
        }
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn action(&mut self, action: &ActionMessage) {
        self.line("action", action);
    }

    fn announce(&mut self, state: &str) {
        self.line("state", &state);
    }
}
