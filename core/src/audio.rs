//! Audio/notification boundary.
//!
//! The simulation fires cues and forgets them. Sinks must never block
//! and never feed anything back into the step.

use crate::{player::Player, types::PlayerId};
use std::sync::{Arc, Mutex, PoisonError};

pub trait AudioSink: Send {
    fn play_notification(&mut self, player: &Player, cue: &str);
}

/// Default sink: writes cues to the log.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_notification(&mut self, player: &Player, cue: &str) {
        log::info!("notification '{cue}' for {}", player.name);
    }
}

/// Records every cue. Clones share the same buffer, so a test can keep
/// one handle and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    played: Arc<Mutex<Vec<(PlayerId, String)>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<(PlayerId, String)> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play_notification(&mut self, player: &Player, cue: &str) {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((player.id, cue.to_string()));
    }
}
