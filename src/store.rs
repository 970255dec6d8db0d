//! In-memory map collection and its mutations.

use crate::{Coordinate, Map, MapDetails, NewCoordinate};
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;
use time::OffsetDateTime;

const ID_LEN: usize = 9;

/// Rejected user input for a store mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("map name must not be empty")]
    EmptyName,
}

/// Owns every map of the session.
///
/// Mutations addressing an unknown map or coordinate id do nothing and
/// return `None`. Each mutation builds the complete replacement map before
/// writing it back.
#[derive(Debug, Default)]
pub struct MapStore {
    maps: Vec<Map>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maps(&self) -> &[Map] {
        &self.maps
    }

    pub fn map(&self, map_id: &str) -> Option<&Map> {
        self.maps.iter().find(|m| m.id == map_id)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn create_map(&mut self, details: MapDetails) -> &Map {
        let now = OffsetDateTime::now_utc();
        let id = loop {
            let candidate = generate_id();
            if self.map(&candidate).is_none() {
                break candidate;
            }
        };

        log::debug!("Creating map {id} ({})", details.name());
        let index = self.maps.len();
        self.maps.push(Map {
            id,
            name: details.name().to_owned(),
            description: details.description().to_owned(),
            coordinates: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        &self.maps[index]
    }

    pub fn update_map(&mut self, map_id: &str, details: MapDetails) -> Option<&Map> {
        self.replace(map_id, |map| Map {
            name: details.name().to_owned(),
            description: details.description().to_owned(),
            updated_at: OffsetDateTime::now_utc(),
            ..map.clone()
        })
    }

    /// Removes a map together with all of its coordinates.
    pub fn delete_map(&mut self, map_id: &str) -> Option<Map> {
        let index = self.index_of(map_id)?;
        let removed = self.maps.remove(index);
        log::debug!(
            "Deleted map {} with {} coordinate(s)",
            removed.id,
            removed.coordinates.len()
        );
        Some(removed)
    }

    pub fn add_coordinate(&mut self, map_id: &str, coordinate: NewCoordinate) -> Option<&Coordinate> {
        self.bulk_import(map_id, vec![coordinate])?;
        self.map(map_id).and_then(|map| map.coordinates.last())
    }

    /// Appends coordinates in order and returns how many were added.
    pub fn bulk_import(&mut self, map_id: &str, coordinates: Vec<NewCoordinate>) -> Option<usize> {
        let count = coordinates.len();
        self.replace(map_id, |map| {
            let mut updated = map.clone();
            for coordinate in coordinates {
                let id = unique_coordinate_id(&updated.coordinates);
                updated.coordinates.push(coordinate.into_coordinate(id));
            }
            updated.updated_at = OffsetDateTime::now_utc();
            updated
        })?;
        log::debug!("Imported {count} coordinate(s) into map {map_id}");
        Some(count)
    }

    pub fn delete_coordinate(&mut self, map_id: &str, coordinate_id: &str) -> Option<Coordinate> {
        let removed = self.map(map_id)?.coordinate(coordinate_id)?.clone();
        self.replace(map_id, |map| Map {
            coordinates: map
                .coordinates
                .iter()
                .filter(|c| c.id != coordinate_id)
                .cloned()
                .collect(),
            updated_at: OffsetDateTime::now_utc(),
            ..map.clone()
        })?;
        log::debug!("Deleted coordinate {coordinate_id} from map {map_id}");
        Some(removed)
    }

    fn index_of(&self, map_id: &str) -> Option<usize> {
        self.maps.iter().position(|m| m.id == map_id)
    }

    fn replace(&mut self, map_id: &str, build: impl FnOnce(&Map) -> Map) -> Option<&Map> {
        let index = self.index_of(map_id)?;
        let updated = build(&self.maps[index]);
        self.maps[index] = updated;
        Some(&self.maps[index])
    }
}

/// Short random alphanumeric id. Uniqueness is only probabilistic; callers
/// re-roll on collision where it matters.
pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn unique_coordinate_id(existing: &[Coordinate]) -> String {
    loop {
        let id = generate_id();
        if existing.iter().all(|c| c.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn details(name: &str) -> MapDetails {
        MapDetails::new(name, "").unwrap()
    }

    fn store_with_map(coordinates: &[(&str, i32, i32, i32)]) -> (MapStore, String) {
        let mut store = MapStore::new();
        let map_id = store.create_map(details("World")).id.clone();
        let coordinates = coordinates
            .iter()
            .map(|(label, x, y, z)| NewCoordinate::new(*label, *x, *y, *z))
            .collect();
        store.bulk_import(&map_id, coordinates).unwrap();
        (store, map_id)
    }

    #[test]
    fn created_map_is_empty_with_matching_timestamps() {
        let mut store = MapStore::new();
        let map = store.create_map(MapDetails::new("Overworld", "main base").unwrap());
        assert_eq!(map.name, "Overworld");
        assert_eq!(map.description, "main base");
        assert!(map.coordinates.is_empty());
        assert_eq!(map.created_at, map.updated_at);
        assert_eq!(map.id.len(), ID_LEN);
    }

    #[test]
    fn update_changes_details_and_refreshes_timestamp() {
        let (mut store, map_id) = store_with_map(&[("Home", 1, 2, 3)]);
        let before = store.map(&map_id).unwrap().clone();

        let updated = store
            .update_map(&map_id, MapDetails::new("Nether", "hub").unwrap())
            .unwrap();
        assert_eq!(updated.name, "Nether");
        assert_eq!(updated.description, "hub");
        assert_eq!(updated.coordinates, before.coordinates);
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (mut store, map_id) = store_with_map(&[("Home", 1, 2, 3)]);
        let snapshot = store.maps().to_vec();

        assert!(store.update_map("missing", details("X")).is_none());
        assert!(store.delete_map("missing").is_none());
        assert!(store.add_coordinate("missing", NewCoordinate::new("A", 0, 0, 0)).is_none());
        assert!(store.bulk_import("missing", vec![]).is_none());
        assert!(store.delete_coordinate("missing", "nope").is_none());
        assert!(store.delete_coordinate(&map_id, "nope").is_none());

        assert_eq!(store.maps(), snapshot.as_slice());
    }

    #[test]
    fn add_coordinate_appends_with_fresh_id() {
        let (mut store, map_id) = store_with_map(&[("Home", 1, 2, 3)]);
        let added = store
            .add_coordinate(&map_id, NewCoordinate::new("Mine", -50, 70, 150).with_color("#ff0000"))
            .unwrap()
            .clone();
        assert_eq!(added.label, "Mine");
        assert_eq!(added.color.as_deref(), Some("#ff0000"));

        let map = store.map(&map_id).unwrap();
        assert_eq!(map.coordinates.len(), 2);
        assert_eq!(map.coordinates[1], added);
        assert_ne!(map.coordinates[0].id, added.id);
    }

    #[test]
    fn bulk_import_keeps_order_and_unique_ids() {
        let (store, map_id) = store_with_map(&[
            ("A", 0, 0, 0),
            ("B", 1, 1, 1),
            ("C", 2, 2, 2),
            ("D", 3, 3, 3),
        ]);
        let map = store.map(&map_id).unwrap();
        let labels: Vec<_> = map.coordinates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C", "D"]);
        let ids: HashSet<_> = map.coordinates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn deleting_coordinate_only_touches_its_map() {
        let (mut store, first) = store_with_map(&[("A", 0, 0, 0), ("B", 1, 1, 1), ("C", 2, 2, 2)]);
        let second = store.create_map(details("Other")).id.clone();
        store
            .bulk_import(&second, vec![NewCoordinate::new("Z", 9, 9, 9)])
            .unwrap();
        let other_before = store.map(&second).unwrap().clone();

        let b_id = store.map(&first).unwrap().coordinates[1].id.clone();
        let removed = store.delete_coordinate(&first, &b_id).unwrap();
        assert_eq!(removed.label, "B");

        let labels: Vec<_> = store
            .map(&first)
            .unwrap()
            .coordinates
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, ["A", "C"]);
        assert_eq!(store.map(&second).unwrap(), &other_before);
    }

    #[test]
    fn deleting_map_removes_its_coordinates() {
        let (mut store, map_id) = store_with_map(&[("A", 0, 0, 0), ("B", 1, 1, 1)]);
        let removed = store.delete_map(&map_id).unwrap();
        assert_eq!(removed.coordinates.len(), 2);
        assert!(store.map(&map_id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn generated_ids_are_short_alphanumeric() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
