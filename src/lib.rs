use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub mod config;
pub mod gesture;
pub mod parser;
pub mod projection;
pub mod store;

pub use config::{ConfigError, ViewConfig};
pub use parser::{Layout, ParseReport, ParseWarning, Severity};
pub use projection::{HeightTier, Projection, ViewBounds, ViewState};
pub use store::{InvalidInput, MapStore};

/// A labeled block position inside a map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Identifier, unique within the owning map
    pub id: String,
    /// East/west position
    pub x: i32,
    /// Height
    pub y: i32,
    /// North/south position
    pub z: i32,
    /// Display label, never empty
    pub label: String,
    /// Hex color override (`#RRGGBB` or `#RRGGBBAA`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A coordinate that has not been assigned an id yet.
///
/// Produced by the text parser and the single-coordinate form, consumed by
/// [`MapStore::add_coordinate`] and [`MapStore::bulk_import`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewCoordinate {
    pub fn new(label: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            x,
            y,
            z,
            label: label.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub(crate) fn into_coordinate(self, id: String) -> Coordinate {
        Coordinate {
            id,
            x: self.x,
            y: self.y,
            z: self.z,
            label: self.label,
            color: self.color,
        }
    }
}

/// A named collection of coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    /// Unique key for this map
    pub id: String,
    /// Display name, never empty
    pub name: String,
    /// Free-form description (may be empty)
    pub description: String,
    /// Coordinates in insertion order
    pub coordinates: Vec<Coordinate>,
    /// When the map was created
    pub created_at: OffsetDateTime,
    /// Last time the map or any of its coordinates changed
    pub updated_at: OffsetDateTime,
}

impl Map {
    pub fn coordinate(&self, id: &str) -> Option<&Coordinate> {
        self.coordinates.iter().find(|c| c.id == id)
    }
}

/// Name and description of a map, as entered in the create/edit dialogs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDetails {
    name: String,
    description: String,
}

impl MapDetails {
    /// Trims both fields and rejects an empty name.
    pub fn new(name: &str, description: &str) -> Result<Self, InvalidInput> {
        let name = name.trim();
        if name.is_empty() {
            return Err(InvalidInput::EmptyName);
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.trim().to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_details_trim_fields() {
        let details = MapDetails::new("  Overworld ", "  spawn area \n").unwrap();
        assert_eq!(details.name(), "Overworld");
        assert_eq!(details.description(), "spawn area");
    }

    #[test]
    fn map_details_reject_blank_name() {
        assert_eq!(
            MapDetails::new("   ", "whatever"),
            Err(InvalidInput::EmptyName)
        );
    }
}
