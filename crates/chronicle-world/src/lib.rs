//! Procedural town generation with a persisted content cache.
//!
//! Generated towns are peripheral content: the gateway core never looks
//! inside them. Each town persists as one JSON document keyed by its id
//! under the cache directory, read on start-up and written on creation.

mod generator;
mod town;

pub use generator::{TownGenerator, WorldError};
pub use town::Town;
