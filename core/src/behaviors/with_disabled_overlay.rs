use crate::{
    capability::{Capability, CapabilitySet},
    module::Module,
    render::{RenderContext, Renderable},
};
use serde::{Deserialize, Serialize};
use std::{any::Any, sync::Arc};

/// Draws an overlay above the body while the actor is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithDisabledOverlayInfo {
    #[serde(default = "default_sequence")]
    pub sequence: String,
    #[serde(default = "default_palette")]
    pub palette: String,
}

fn default_sequence() -> String { "disabled".to_string() }
fn default_palette() -> String { "disabled".to_string() }

pub struct WithDisabledOverlay {
    info: Arc<WithDisabledOverlayInfo>,
}

impl WithDisabledOverlay {
    pub fn new(info: Arc<WithDisabledOverlayInfo>) -> Self {
        Self { info }
    }
}

impl Module for WithDisabledOverlay {
    fn name(&self) -> &'static str {
        "WithDisabledOverlay"
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::RenderModifier])
    }

    fn modify_render(&self, ctx: &RenderContext<'_>, mut r: Vec<Renderable>) -> Vec<Renderable> {
        if !ctx.disabled {
            return r;
        }
        // Nothing to overlay when an earlier stage hid the body.
        let Some(body) = r.first() else {
            return r;
        };
        let overlay = Renderable {
            sequence: self.info.sequence.clone(),
            palette:  self.info.palette.clone(),
            z_offset: body.z_offset + 1,
            ..body.clone()
        };
        r.push(overlay);
        r
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
