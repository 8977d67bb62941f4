//! Simulation clock: owns tick state, pause, and the step phase.
//!
//! The step phase is a small state machine driven once per frame:
//!
//! ```text
//!   Idle ──begin_step──▶ Stepping ──begin_flush──▶ Flushing ──end_step──▶ Idle
//!                           │                          │
//!                           └──────── abort_step ──────┴──▶ Idle
//! ```

use crate::{
    error::{SimError, SimResult},
    types::Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    Idle,
    Stepping,
    Flushing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    pub paused:       bool,
    phase:            StepPhase,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            paused:       false,
            phase:        StepPhase::Idle,
        }
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == StepPhase::Idle
    }

    /// Idle → Stepping. Advances and returns the new tick number.
    pub fn begin_step(&mut self) -> SimResult<Tick> {
        if self.paused {
            return Err(SimError::Paused);
        }
        self.expect(StepPhase::Idle, "begin_step")?;
        self.current_tick += 1;
        self.phase = StepPhase::Stepping;
        Ok(self.current_tick)
    }

    /// Stepping → Flushing. A second flush while one is running is a
    /// reentrancy bug and fails here.
    pub fn begin_flush(&mut self) -> SimResult<()> {
        self.expect(StepPhase::Stepping, "begin_flush")?;
        self.phase = StepPhase::Flushing;
        Ok(())
    }

    /// Flushing → Idle.
    pub fn end_step(&mut self) -> SimResult<()> {
        self.expect(StepPhase::Flushing, "end_step")?;
        self.phase = StepPhase::Idle;
        Ok(())
    }

    /// Any phase → Idle. The tick number is kept; an aborted step still
    /// consumed its tick.
    pub fn abort_step(&mut self) {
        self.phase = StepPhase::Idle;
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    fn expect(&self, phase: StepPhase, op: &str) -> SimResult<()> {
        if self.phase != phase {
            return Err(SimError::Invariant {
                tick:   self.current_tick,
                detail: format!("{op} called in phase {:?}, expected {phase:?}", self.phase),
            });
        }
        Ok(())
    }
}

impl Default for SimClock {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let mut clock = SimClock::new();
        assert_eq!(clock.begin_step().unwrap(), 1);
        clock.begin_flush().unwrap();
        clock.end_step().unwrap();
        assert!(clock.is_idle());
        assert_eq!(clock.begin_step().unwrap(), 2);
    }

    #[test]
    fn reentrant_flush_is_an_invariant_violation() {
        let mut clock = SimClock::new();
        clock.begin_step().unwrap();
        clock.begin_flush().unwrap();
        assert!(matches!(clock.begin_flush(), Err(SimError::Invariant { .. })));
    }

    #[test]
    fn paused_clock_refuses_to_step() {
        let mut clock = SimClock::new();
        clock.pause();
        assert!(matches!(clock.begin_step(), Err(SimError::Paused)));
        assert_eq!(clock.current_tick, 0);
    }
}
