pub mod character;
pub mod combat;
pub mod frames;
pub mod location;
pub mod state;

pub use character::{CharacterClass, PlayerCharacter, Spell};
pub use combat::Combat;
pub use frames::{ClientFrame, ServerFrame};
pub use location::{Item, Location, Monster, Npc};
pub use state::{GameState, GameStateView};
