//! The hand-authored starting town.
//!
//! Procedurally generated towns (chronicle-world) extend the map later;
//! every new character starts from this fixed one.

use std::collections::HashMap;

use chronicle_core::{Item, Location, Npc};

/// Build the initial five-location town keyed by location id.
pub fn starting_locations() -> HashMap<String, Location> {
    let town_square = Location::new(
        "town_square",
        "Town Square",
        "You stand in the center of a bustling town square. Merchants hawk \
their wares, and townsfolk go about their daily business. The town seems \
peaceful, but rumors of trouble in the nearby forest have been circulating.",
    )
    .with_exits([
        ("north", "tavern"),
        ("east", "market"),
        ("south", "town_gate"),
        ("west", "blacksmith"),
    ])
    .with_npcs(vec![Npc {
        id: "mayor".to_string(),
        name: "Mayor Thornton".to_string(),
        description: "A portly man with a friendly smile and a well-groomed mustache."
            .to_string(),
    }]);

    let tavern = Location::new(
        "tavern",
        "The Prancing Pony",
        "A warm, inviting tavern filled with the sounds of laughter and music. \
The air is thick with the smell of ale and roasted meat.",
    )
    .with_exits([("south", "town_square"), ("up", "tavern_rooms")])
    .with_npcs(vec![
        Npc {
            id: "bartender".to_string(),
            name: "Giles the Bartender".to_string(),
            description: "A burly man with a thick beard and a quick laugh.".to_string(),
        },
        Npc {
            id: "bard".to_string(),
            name: "Melody the Bard".to_string(),
            description: "A slender elf with a beautiful voice and a mischievous smile."
                .to_string(),
        },
    ]);

    let market = Location::new(
        "market",
        "Market District",
        "A bustling market filled with stalls selling everything from fresh \
produce to exotic trinkets.",
    )
    .with_exits([
        ("west", "town_square"),
        ("north", "general_store"),
        ("east", "alchemist"),
    ])
    .with_npcs(vec![Npc {
        id: "merchant".to_string(),
        name: "Trader Johan".to_string(),
        description: "A shrewd-looking man with a keen eye for valuable goods.".to_string(),
    }]);

    let town_gate = Location::new(
        "town_gate",
        "Town Gate",
        "The main gate leading out of town. Guards stand watch, keeping an \
eye out for trouble.",
    )
    .with_exits([("north", "town_square"), ("south", "forest_path")])
    .with_npcs(vec![Npc {
        id: "guard".to_string(),
        name: "Guard Captain Harlow".to_string(),
        description: "A stern-looking woman with a weathered face and sharp eyes.".to_string(),
    }]);

    let blacksmith = Location::new(
        "blacksmith",
        "Blacksmith's Forge",
        "The heat from the forge is intense. The rhythmic sound of hammer on \
anvil fills the air.",
    )
    .with_exits([("east", "town_square")])
    .with_npcs(vec![Npc {
        id: "blacksmith".to_string(),
        name: "Grimhammer the Blacksmith".to_string(),
        description: "A dwarf with massive arms and a beard singed from the forge.".to_string(),
    }])
    .with_items(vec![Item {
        id: "sword".to_string(),
        name: "Steel Sword".to_string(),
        description: "A well-crafted steel sword.".to_string(),
        value: Some(15),
    }]);

    [town_square, tavern, market, town_gate, blacksmith]
        .into_iter()
        .map(|loc| (loc.id.clone(), loc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_town_shape() {
        let locations = starting_locations();
        assert_eq!(locations.len(), 5);
        assert!(locations.contains_key("town_square"));

        let square = &locations["town_square"];
        assert_eq!(square.exits.len(), 4);
        assert_eq!(square.exits["north"], "tavern");
    }

    #[test]
    fn test_exits_are_bidirectional_where_expected() {
        let locations = starting_locations();
        assert_eq!(locations["tavern"].exits["south"], "town_square");
        assert_eq!(locations["blacksmith"].exits["east"], "town_square");
    }
}
