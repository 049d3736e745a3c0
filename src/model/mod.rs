//! Warehouse entities parsed from a layout document.

pub mod area;
pub mod shelf;
pub mod stack;
pub mod warehouse;

pub use area::{Area, AreaColor};
pub use shelf::{Direction, LevelHeight, Pole, Shelf};
pub use stack::Stack;
pub use warehouse::Warehouse;

use serde::{Deserialize, Serialize};

/// Semantic kind of a drawn object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Ground,
    Area,
    Shelf,
    ShelfLevel,
    Stack,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Ground => "ground",
            EntityType::Area => "area",
            EntityType::Shelf => "shelf",
            EntityType::ShelfLevel => "shelf_level",
            EntityType::Stack => "stack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ground" => Some(EntityType::Ground),
            "area" => Some(EntityType::Area),
            "shelf" => Some(EntityType::Shelf),
            "shelf_level" => Some(EntityType::ShelfLevel),
            "stack" => Some(EntityType::Stack),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_names_round_trip() {
        for kind in [
            EntityType::Ground,
            EntityType::Area,
            EntityType::Shelf,
            EntityType::ShelfLevel,
            EntityType::Stack,
        ] {
            assert_eq!(EntityType::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityType::from_name("door"), None);
        assert_eq!(
            serde_json::to_string(&EntityType::ShelfLevel).unwrap(),
            "\"shelf_level\""
        );
    }
}
