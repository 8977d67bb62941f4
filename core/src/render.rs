//! Render pipeline data. The renderer itself lives outside the core;
//! it asks for an actor's renderables once per visual frame.

use crate::{module::ActorView, types::{CPos, PlayerId}};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub image:    String,
    pub sequence: String,
    pub pos:      CPos,
    pub z_offset: i32,
    pub alpha:    f32,
    pub palette:  String,
}

impl Renderable {
    /// The body sprite every actor starts its pipeline with.
    pub fn body(view: &ActorView<'_>) -> Self {
        Self {
            image:    view.state.actor_type().to_string(),
            sequence: "idle".to_string(),
            pos:      view.state.location(),
            z_offset: 0,
            alpha:    1.0,
            palette:  format!("player{}", view.owner.id.0),
        }
    }
}

/// What a render modifier gets to look at.
pub struct RenderContext<'a> {
    pub view:     ActorView<'a>,
    /// The player the frame is drawn for; `None` means an observer
    /// who sees everything.
    pub viewer:   Option<PlayerId>,
    pub disabled: bool,
}
