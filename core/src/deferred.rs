//! Deferred actions: side effects held back until the end of the step.
//!
//! RULE: Modules never create or destroy actors directly. They queue a
//! DeferredAction; the world applies the queue in FIFO order once every
//! periodic module of every actor has run. Actions queued while the
//! queue is being applied join the back of the same flush.

use crate::{actor::ActorInit, types::{ActorId, PlayerId}};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DeferredAction {
    SpawnActor {
        actor_type: String,
        init:       ActorInit,
    },
    RemoveActor {
        actor: ActorId,
    },
    PlayNotification {
        player: PlayerId,
        cue:    String,
    },
}
