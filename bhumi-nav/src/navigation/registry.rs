//! Named-location registry.
//!
//! Maps string identifiers to world coordinates. Entries are validated when
//! loaded: empty ids, duplicate ids and non-finite coordinates are rejected
//! up front instead of surfacing later as failed queries.
//!
//! Two JSON layouts are accepted:
//!
//! ```json
//! [{ "id": "lobby", "name": "Main lobby", "xy": [2.5, 1.0] }]
//! ```
//!
//! ```json
//! { "lobby": { "x": 2.5, "y": 1.0, "description": "Main lobby" } }
//! ```

use crate::core::WorldPoint;
use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A named world position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    /// Unique identifier
    pub id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// World position [x, y] in meters
    #[serde(rename = "xy", with = "xy_format")]
    pub position: WorldPoint,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NamedLocation {
    /// Location with only an id and position
    pub fn new(id: impl Into<String>, position: WorldPoint) -> Self {
        Self {
            id: id.into(),
            name: None,
            position,
            description: None,
        }
    }

    /// Builder-style setter for the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

mod xy_format {
    use crate::core::WorldPoint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(p: &WorldPoint, s: S) -> Result<S::Ok, S::Error> {
        [p.x, p.y].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<WorldPoint, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(d)?;
        Ok(WorldPoint::new(x, y))
    }
}

#[derive(Deserialize)]
struct KeyedRecord {
    x: f64,
    y: f64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationFile {
    List(Vec<NamedLocation>),
    Keyed(BTreeMap<String, KeyedRecord>),
}

/// Validated identifier → location mapping
#[derive(Clone, Debug, Default)]
pub struct LocationRegistry {
    locations: Vec<NamedLocation>,
    index: HashMap<String, usize>,
}

impl LocationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from locations, rejecting invalid or duplicate entries
    pub fn from_locations(locations: impl IntoIterator<Item = NamedLocation>) -> Result<Self> {
        let mut registry = Self::new();
        for location in locations {
            registry.insert(location)?;
        }
        Ok(registry)
    }

    /// Parse either JSON layout
    pub fn from_json(json: &str) -> Result<Self> {
        let file: LocationFile =
            serde_json::from_str(json).map_err(|e| NavError::Registry(e.to_string()))?;
        match file {
            LocationFile::List(list) => Self::from_locations(list),
            LocationFile::Keyed(map) => Self::from_locations(map.into_iter().map(|(id, r)| {
                NamedLocation {
                    id,
                    name: r.name,
                    position: WorldPoint::new(r.x, r.y),
                    description: r.description,
                }
            })),
        }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save as a JSON list
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.locations)
            .map_err(|e| NavError::Registry(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Add a location
    pub fn insert(&mut self, location: NamedLocation) -> Result<()> {
        if location.id.trim().is_empty() {
            return Err(NavError::Registry("location id must not be empty".into()));
        }
        if !location.position.is_finite() {
            return Err(NavError::Registry(format!(
                "location '{}' has non-finite coordinates",
                location.id
            )));
        }
        if self.index.contains_key(&location.id) {
            return Err(NavError::Registry(format!(
                "duplicate location id '{}'",
                location.id
            )));
        }
        self.index.insert(location.id.clone(), self.locations.len());
        self.locations.push(location);
        Ok(())
    }

    /// Look up by id
    pub fn get(&self, id: &str) -> Option<&NamedLocation> {
        self.index.get(id).map(|&i| &self.locations[i])
    }

    /// Position of `id`, or a registry error naming it
    pub fn resolve(&self, id: &str) -> Result<WorldPoint> {
        self.get(id)
            .map(|l| l.position)
            .ok_or_else(|| NavError::Registry(format!("unknown location '{}'", id)))
    }

    /// Locations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &NamedLocation> {
        self.locations.iter()
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// No locations?
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
