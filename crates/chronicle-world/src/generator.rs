//! Town generation and the on-disk content cache.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use chronicle_core::{Location, Npc};

use crate::town::Town;

const TOWN_NAME_PARTS: (&[&str], &[&str]) = (
    &["Eigen", "Grim", "Raven", "Oak", "Silver", "Ash", "Thorn"],
    &["grau", "hollow", "ford", "haven", "brook", "vale", "moor"],
);

const NPC_FIRST_NAMES: &[&str] = &[
    "Giles", "Melody", "Johan", "Harlow", "Thornton", "Brenna", "Cedric", "Ilsa",
];

const NPC_ROLES: &[(&str, &str)] = &[
    ("bartender", "keeps the taproom in order and the gossip flowing"),
    ("bard", "plays for coins and listens for secrets"),
    ("merchant", "has a keen eye for valuable goods"),
    ("guard", "watches the road with a weathered stare"),
    ("blacksmith", "works the forge from dawn until dusk"),
];

/// Generates towns and keeps every generated one cached on disk, one JSON
/// document per town id.
pub struct TownGenerator {
    cache_dir: PathBuf,
    towns: HashMap<String, Town>,
}

impl TownGenerator {
    /// Open the generator over a cache directory, loading any previously
    /// generated towns. Unreadable documents are skipped with a warning.
    pub async fn open(cache_dir: impl Into<PathBuf>) -> Result<Self, WorldError> {
        let cache_dir = cache_dir.into();
        tokio::fs::create_dir_all(&cache_dir).await?;

        let mut towns = HashMap::new();
        let mut dir = tokio::fs::read_dir(&cache_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match Self::load_town(&path).await {
                    Ok(town) => {
                        towns.insert(town.id.clone(), town);
                    }
                    Err(e) => warn!("Skipping unreadable town document {:?}: {}", path, e),
                }
            }
        }
        info!("Loaded {} cached towns from {:?}", towns.len(), cache_dir);

        Ok(Self { cache_dir, towns })
    }

    async fn load_town(path: &Path) -> Result<Town, WorldError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn town_path(&self, town_id: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", town_id))
    }

    /// Fetch a cached town by id.
    pub fn get(&self, town_id: &str) -> Option<&Town> {
        self.towns.get(town_id)
    }

    /// Ids of every cached town.
    pub fn town_ids(&self) -> Vec<String> {
        self.towns.keys().cloned().collect()
    }

    /// Return the cached town for this id, generating and persisting it on
    /// first request. The id doubles as the generation seed so the same id
    /// always produces the same town.
    pub async fn get_or_generate(&mut self, town_id: &str) -> Result<&Town, WorldError> {
        if !self.towns.contains_key(town_id) {
            let town = Self::generate(town_id);
            self.save_town(&town).await?;
            info!("Generated and cached town '{}' ({})", town.name, town.id);
            self.towns.insert(town_id.to_string(), town);
        }
        Ok(&self.towns[town_id])
    }

    async fn save_town(&self, town: &Town) -> Result<(), WorldError> {
        let raw = serde_json::to_string_pretty(town)?;
        tokio::fs::write(self.town_path(&town.id), raw).await?;
        Ok(())
    }

    /// Deterministic procedural generation seeded from the town id.
    fn generate(town_id: &str) -> Town {
        let seed = town_id
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut rng = StdRng::seed_from_u64(seed);

        let (prefixes, suffixes) = TOWN_NAME_PARTS;
        let name = format!(
            "{}{}",
            prefixes[rng.gen_range(0..prefixes.len())],
            suffixes[rng.gen_range(0..suffixes.len())]
        );

        let square_id = format!("{}_square", town_id);
        let tavern_id = format!("{}_tavern", town_id);
        let market_id = format!("{}_market", town_id);

        let mut locations = BTreeMap::new();
        locations.insert(
            square_id.clone(),
            Location::new(
                square_id.clone(),
                format!("{} Square", name),
                format!(
                    "The central square of {}. Townsfolk go about their business under the eye of the old clock tower.",
                    name
                ),
            )
            .with_exits([
                ("north", tavern_id.as_str()),
                ("east", market_id.as_str()),
            ])
            .with_npcs(vec![Self::generate_npc(&mut rng, "guard")]),
        );
        locations.insert(
            tavern_id.clone(),
            Location::new(
                tavern_id.clone(),
                format!("The {} Tavern", name),
                "A warm taproom thick with the smell of ale and roasted meat.",
            )
            .with_exits([("south", square_id.as_str())])
            .with_npcs(vec![
                Self::generate_npc(&mut rng, "bartender"),
                Self::generate_npc(&mut rng, "bard"),
            ]),
        );
        locations.insert(
            market_id.clone(),
            Location::new(
                market_id.clone(),
                format!("{} Market", name),
                "Stalls selling everything from fresh produce to exotic trinkets.",
            )
            .with_exits([("west", square_id.as_str())])
            .with_npcs(vec![Self::generate_npc(&mut rng, "merchant")]),
        );

        Town {
            id: town_id.to_string(),
            name: name.clone(),
            description: format!("The town of {}.", name),
            locations,
            generated_at: Utc::now(),
        }
    }

    fn generate_npc(rng: &mut StdRng, role: &str) -> Npc {
        let first = NPC_FIRST_NAMES[rng.gen_range(0..NPC_FIRST_NAMES.len())];
        let description = NPC_ROLES
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, d)| *d)
            .unwrap_or("stands around looking busy");
        Npc {
            id: format!("{}_{}", role, first.to_lowercase()),
            name: format!("{} the {}", first, capitalize(role)),
            description: format!("{} {}.", first, description),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// World generation errors.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generation_is_deterministic_per_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = TownGenerator::open(dir.path()).await.unwrap();
        let first = generator.get_or_generate("riverside").await.unwrap().clone();

        let dir2 = tempfile::tempdir().unwrap();
        let mut generator2 = TownGenerator::open(dir2.path()).await.unwrap();
        let second = generator2.get_or_generate("riverside").await.unwrap().clone();

        assert_eq!(first.name, second.name);
        assert_eq!(
            first.locations.keys().collect::<Vec<_>>(),
            second.locations.keys().collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_towns_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut generator = TownGenerator::open(dir.path()).await.unwrap();
            generator.get_or_generate("riverside").await.unwrap();
        }

        let generator = TownGenerator::open(dir.path()).await.unwrap();
        let town = generator.get("riverside").expect("town reloaded from disk");
        assert!(!town.locations.is_empty());
        assert!(town.entry_location().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("broken.json"), "{not json")
            .await
            .unwrap();

        let generator = TownGenerator::open(dir.path()).await.unwrap();
        assert!(generator.town_ids().is_empty());
    }

    #[tokio::test]
    async fn test_entry_location_prefers_the_square() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = TownGenerator::open(dir.path()).await.unwrap();
        let town = generator.get_or_generate("hillcrest").await.unwrap();
        assert_eq!(town.entry_location().unwrap().id, "hillcrest_square");
    }
}
