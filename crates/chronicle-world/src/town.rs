//! Generated town data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chronicle_core::Location;

/// One generated town: a handful of connected locations with NPCs and
/// shops, plus the metadata needed to key its cache document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Town {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Location id -> location, sorted for stable serialization.
    pub locations: BTreeMap<String, Location>,
    pub generated_at: DateTime<Utc>,
}

impl Town {
    /// Id of the town's central location, where new arrivals start.
    pub fn entry_location(&self) -> Option<&Location> {
        self.locations
            .values()
            .find(|loc| loc.id.ends_with("_square"))
            .or_else(|| self.locations.values().next())
    }
}
