//! Character creation flow.
//!
//! A user with no finished character walks a three-stage chain: name, then
//! race, then class. Each inbound message fills exactly one missing field;
//! filling the class finalizes defaults and the character becomes active.

use chronicle_core::{CharacterClass, PlayerCharacter};

/// The next field a character in creation is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStage {
    Name,
    Race,
    Class,
}

impl CreationStage {
    /// Which field the character still needs, or `None` once creation is
    /// complete.
    pub fn for_character(pc: &PlayerCharacter) -> Option<CreationStage> {
        if pc.name.is_empty() {
            Some(CreationStage::Name)
        } else if pc.race.is_empty() {
            Some(CreationStage::Race)
        } else if pc.class_name.is_empty() {
            Some(CreationStage::Class)
        } else {
            None
        }
    }
}

/// Outcome of feeding one message into the creation chain.
#[derive(Debug, Clone, PartialEq)]
pub enum CreationStep {
    /// A field was filled; reply with the next prompt.
    Prompt(String),
    /// The final field was filled and defaults applied.
    Finalized { summary: String },
}

/// Apply one inbound message to a character in creation.
///
/// Callers must only invoke this while [`CreationStage::for_character`]
/// returns `Some`.
pub fn advance(pc: &mut PlayerCharacter, input: &str) -> CreationStep {
    let input = input.trim();
    match CreationStage::for_character(pc) {
        Some(CreationStage::Name) => {
            pc.name = input.to_string();
            CreationStep::Prompt(format!(
                "Welcome, {}! What race are you? (Human, Elf, Dwarf, Halfling)",
                pc.name
            ))
        }
        Some(CreationStage::Race) => {
            pc.race = input.to_string();
            CreationStep::Prompt(format!(
                "A {}, excellent! What class are you? (Fighter, Wizard, Rogue, Cleric)",
                pc.race
            ))
        }
        Some(CreationStage::Class) | None => {
            if pc.class_name.is_empty() {
                pc.class_name = input.to_string();
            }
            if let Some(class) = CharacterClass::from_name(&pc.class_name) {
                class.apply_defaults(pc);
            } else {
                // Unknown classes still finalize; they just keep the blank
                // baseline stats.
                pc.current_location_id = "town_square".to_string();
            }
            CreationStep::Finalized {
                summary: format!(
                    "Character creation complete! You are {}, a {} {}. Your adventure begins in the town of Eigengrau.",
                    pc.name, pc.race, pc.class_name
                ),
            }
        }
    }
}

/// First prompt shown to a user with no character.
pub fn opening_prompt() -> &'static str {
    "Welcome to Chronicle! You are about to embark on an adventure. What is your character's name?"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_creation_scenario() {
        let mut pc = PlayerCharacter::blank("user-1");

        match advance(&mut pc, "Thorn") {
            CreationStep::Prompt(p) => assert!(p.contains("What race")),
            other => panic!("expected race prompt, got {:?}", other),
        }
        assert_eq!(pc.name, "Thorn");

        match advance(&mut pc, "Dwarf") {
            CreationStep::Prompt(p) => assert!(p.contains("What class")),
            other => panic!("expected class prompt, got {:?}", other),
        }
        assert_eq!(pc.race, "Dwarf");

        match advance(&mut pc, "Fighter") {
            CreationStep::Finalized { summary } => {
                assert!(summary.contains("Thorn"));
                assert!(summary.contains("Dwarf Fighter"));
            }
            other => panic!("expected finalization, got {:?}", other),
        }

        assert_eq!(pc.strength, 16);
        assert_eq!(pc.constitution, 14);
        assert_eq!(pc.dexterity, 12);
        assert_eq!(pc.wisdom, 10);
        assert_eq!(pc.intelligence, 8);
        assert_eq!(pc.charisma, 10);
        assert_eq!((pc.hp, pc.max_hp), (12, 12));
        assert_eq!(pc.ac, 16);
        assert_eq!(pc.current_location_id, "town_square");
        assert!(pc.is_created());
        assert!(CreationStage::for_character(&pc).is_none());
    }

    #[test]
    fn test_each_message_fills_exactly_one_field() {
        let mut pc = PlayerCharacter::blank("user-1");
        advance(&mut pc, "Mira");
        assert!(pc.race.is_empty());
        assert!(pc.class_name.is_empty());
        assert_eq!(CreationStage::for_character(&pc), Some(CreationStage::Race));
    }

    #[test]
    fn test_unknown_class_still_finalizes() {
        let mut pc = PlayerCharacter::blank("user-1");
        advance(&mut pc, "Mira");
        advance(&mut pc, "Elf");
        let step = advance(&mut pc, "Warlock");
        assert!(matches!(step, CreationStep::Finalized { .. }));
        assert!(pc.is_created());
        // Baseline stats survive for an unrecognized class.
        assert_eq!(pc.hp, 10);
    }
}
