//! Actor simulation core: capability-based module composition and the
//! deterministic per-tick dispatch that drives it.
//!
//! Layering, leaves first:
//!   capability → module → world (actor table, factory, deferred queue)
//!   → notify / modifiers / reservation → engine (step scheduler)
//!
//! Concrete gameplay modules live in `behaviors` and only ever talk to
//! the rest of the world through `ModuleContext`.

pub mod actor;
pub mod audio;
pub mod behaviors;
pub mod capability;
pub mod clock;
pub mod command;
pub mod config;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod event;
pub mod health;
pub mod modifiers;
pub mod module;
pub mod notify;
pub mod player;
pub mod render;
pub mod reservation;
pub mod rng;
pub mod snapshot;
pub mod types;
pub mod world;
