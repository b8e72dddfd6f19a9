//! World locations and their occupants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A non-player character standing in a location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// An item lying in a location or carried in an inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

/// A hostile creature present in a location during combat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Monster {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
}

/// One explorable location in the game world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Direction -> destination location id.
    #[serde(default)]
    pub exits: HashMap<String, String>,
    #[serde(default)]
    pub npcs: Vec<Npc>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub monsters: Vec<Monster>,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            exits: HashMap::new(),
            npcs: Vec::new(),
            items: Vec::new(),
            monsters: Vec::new(),
        }
    }

    pub fn with_exits<I, K, V>(mut self, exits: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.exits = exits
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_npcs(mut self, npcs: Vec<Npc>) -> Self {
        self.npcs = npcs;
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_builder() {
        let loc = Location::new("cave", "Dark Cave", "A damp cave.")
            .with_exits([("south", "forest_path")]);
        assert_eq!(loc.exits.get("south").map(String::as_str), Some("forest_path"));
        assert!(loc.npcs.is_empty());
    }
}
