use crate::types::{ActorId, PlayerId, Tick};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Module '{module}' on actor {actor} failed: {source}")]
    ModuleFailed {
        actor:  ActorId,
        module: &'static str,
        source: Box<SimError>,
    },

    #[error("Step {tick} aborted: {source}")]
    StepAborted {
        tick:   Tick,
        source: Box<SimError>,
    },

    #[error("Invariant violated at tick {tick}: {detail}")]
    Invariant { tick: Tick, detail: String },

    #[error("Actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Engine is paused")]
    Paused,
}

pub type SimResult<T> = Result<T, SimError>;

/// Failures detected while composing actor types from configuration,
/// before any actor of that type exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("Unknown actor type '{name}'")]
    UnknownActorType { name: String },

    #[error("Actor type '{actor}': {module} references unknown actor type '{name}'")]
    UnknownReference {
        actor:  String,
        module: &'static str,
        name:   String,
    },

    #[error("Actor type '{actor}': {module} requires one of [{requires}]")]
    MissingPrerequisite {
        actor:    String,
        module:   &'static str,
        requires: String,
    },

    #[error("Actor type '{actor}': {module}.{field} {reason}")]
    InvalidValue {
        actor:  String,
        module: &'static str,
        field:  &'static str,
        reason: String,
    },

    #[error("Actor type '{name}' defined more than once")]
    Duplicate { name: String },
}
