//! Turn orchestration.
//!
//! The engine sits between the connection handler and the model gateway:
//! it turns player text plus a game-state snapshot into a narrative and a
//! state delta. The gateway core consumes nothing from here beyond these
//! request/response shapes.

pub mod creation;
pub mod delta;
pub mod engine;
pub mod world;

pub use creation::{CreationStage, CreationStep};
pub use delta::{CombatDirective, TurnDelta};
pub use engine::{TurnEngine, TurnResult, TurnSnapshot};
pub use world::starting_locations;
