//! Player character types and class defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::location::Item;

/// A known spell with its mechanical shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub level: u8,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_dice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healing_dice: Option<String>,
}

/// A player character owned by one user identity.
///
/// Empty `name`/`race`/`class_name` mark a character still in creation;
/// the connection handler fills them one inbound message at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub id: String,
    pub name: String,
    pub race: String,
    pub class_name: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub known_spells: Vec<Spell>,
    /// Spell level -> remaining slots.
    #[serde(default)]
    pub spell_slots: HashMap<String, u32>,
    pub current_location_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_combat_id: Option<String>,
}

impl PlayerCharacter {
    /// Create a blank level-1 character for a user, pending creation.
    pub fn blank(user_id: impl Into<String>) -> Self {
        Self {
            id: user_id.into(),
            name: String::new(),
            race: String::new(),
            class_name: String::new(),
            level: 1,
            hp: 10,
            max_hp: 10,
            ac: 10,
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
            inventory: Vec::new(),
            known_spells: Vec::new(),
            spell_slots: HashMap::new(),
            current_location_id: "town_square".to_string(),
            active_combat_id: None,
        }
    }

    /// True once name, race and class are all set.
    pub fn is_created(&self) -> bool {
        !self.name.is_empty() && !self.race.is_empty() && !self.class_name.is_empty()
    }

    pub fn in_combat(&self) -> bool {
        self.active_combat_id.is_some()
    }
}

/// The closed set of playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Fighter,
    Wizard,
    Rogue,
    Cleric,
}

impl CharacterClass {
    /// Case-insensitive lookup by class name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "fighter" => Some(Self::Fighter),
            "wizard" => Some(Self::Wizard),
            "rogue" => Some(Self::Rogue),
            "cleric" => Some(Self::Cleric),
            _ => None,
        }
    }

    /// Apply this class's default stats, armor, hit points and starting
    /// spells to a freshly created character.
    pub fn apply_defaults(self, pc: &mut PlayerCharacter) {
        match self {
            Self::Fighter => {
                pc.strength = 16;
                pc.constitution = 14;
                pc.dexterity = 12;
                pc.wisdom = 10;
                pc.intelligence = 8;
                pc.charisma = 10;
                pc.hp = 12;
                pc.max_hp = 12;
                pc.ac = 16; // chain mail and shield
            }
            Self::Wizard => {
                pc.strength = 8;
                pc.constitution = 12;
                pc.dexterity = 14;
                pc.wisdom = 10;
                pc.intelligence = 16;
                pc.charisma = 10;
                pc.hp = 8;
                pc.max_hp = 8;
                pc.ac = 12; // mage armor
                pc.known_spells = vec![
                    Spell {
                        id: "spell_magic_missile".to_string(),
                        name: "Magic Missile".to_string(),
                        level: 1,
                        kind: "damage".to_string(),
                        damage_dice: Some("3d4+3".to_string()),
                        healing_dice: None,
                    },
                    Spell {
                        id: "spell_shield".to_string(),
                        name: "Shield".to_string(),
                        level: 1,
                        kind: "defense".to_string(),
                        damage_dice: None,
                        healing_dice: None,
                    },
                ];
                pc.spell_slots = HashMap::from([("1".to_string(), 2)]);
            }
            Self::Rogue => {
                pc.strength = 10;
                pc.constitution = 12;
                pc.dexterity = 16;
                pc.wisdom = 10;
                pc.intelligence = 14;
                pc.charisma = 8;
                pc.hp = 10;
                pc.max_hp = 10;
                pc.ac = 14; // leather armor
            }
            Self::Cleric => {
                pc.strength = 14;
                pc.constitution = 12;
                pc.dexterity = 8;
                pc.wisdom = 16;
                pc.intelligence = 10;
                pc.charisma = 10;
                pc.hp = 10;
                pc.max_hp = 10;
                pc.ac = 18; // chain mail and shield
                pc.known_spells = vec![
                    Spell {
                        id: "spell_cure_wounds".to_string(),
                        name: "Cure Wounds".to_string(),
                        level: 1,
                        kind: "healing".to_string(),
                        damage_dice: None,
                        healing_dice: Some("1d8+3".to_string()),
                    },
                    Spell {
                        id: "spell_guiding_bolt".to_string(),
                        name: "Guiding Bolt".to_string(),
                        level: 1,
                        kind: "damage".to_string(),
                        damage_dice: Some("4d6".to_string()),
                        healing_dice: None,
                    },
                ];
                pc.spell_slots = HashMap::from([("1".to_string(), 2)]);
            }
        }
        pc.current_location_id = "town_square".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_character_is_not_created() {
        let pc = PlayerCharacter::blank("user-1");
        assert!(!pc.is_created());
        assert_eq!(pc.level, 1);
        assert_eq!(pc.current_location_id, "town_square");
    }

    #[test]
    fn test_class_from_name_is_case_insensitive() {
        assert_eq!(CharacterClass::from_name("FIGHTER"), Some(CharacterClass::Fighter));
        assert_eq!(CharacterClass::from_name("Wizard"), Some(CharacterClass::Wizard));
        assert_eq!(CharacterClass::from_name("bard"), None);
    }

    #[test]
    fn test_fighter_defaults() {
        let mut pc = PlayerCharacter::blank("user-1");
        CharacterClass::Fighter.apply_defaults(&mut pc);
        assert_eq!(pc.strength, 16);
        assert_eq!(pc.constitution, 14);
        assert_eq!(pc.dexterity, 12);
        assert_eq!(pc.wisdom, 10);
        assert_eq!(pc.intelligence, 8);
        assert_eq!(pc.charisma, 10);
        assert_eq!((pc.hp, pc.max_hp), (12, 12));
        assert_eq!(pc.ac, 16);
        assert!(pc.known_spells.is_empty());
    }

    #[test]
    fn test_caster_classes_get_spells_and_slots() {
        let mut wizard = PlayerCharacter::blank("u");
        CharacterClass::Wizard.apply_defaults(&mut wizard);
        assert_eq!(wizard.known_spells.len(), 2);
        assert_eq!(wizard.spell_slots.get("1"), Some(&2));

        let mut cleric = PlayerCharacter::blank("u");
        CharacterClass::Cleric.apply_defaults(&mut cleric);
        assert_eq!(cleric.known_spells.len(), 2);
        assert_eq!(cleric.spell_slots.get("1"), Some(&2));
    }
}
