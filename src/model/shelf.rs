use cgmath::Vector2;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, WarehouseError},
    geojson::Feature,
};

pub const DEFAULT_LEVELS: u32 = 5;
pub const DEFAULT_SHELF_WIDTH: f32 = 15.0;
pub const DEFAULT_LEVEL_HEIGHT: f32 = 20.0;
/// Layouts asking for more levels than this are rejected.
pub const MAX_LEVELS: u32 = 100;

/// Height of every level, or one height per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelHeight {
    Uniform(f32),
    PerLevel(Vec<f32>),
}

impl Default for LevelHeight {
    fn default() -> Self {
        LevelHeight::Uniform(DEFAULT_LEVEL_HEIGHT)
    }
}

impl LevelHeight {
    pub fn scalar(&self) -> Option<f32> {
        match self {
            LevelHeight::Uniform(h) => Some(*h),
            LevelHeight::PerLevel(_) => None,
        }
    }
}

/// Which plan axis the shelf's long side runs along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Vertical,
    Horizontal,
}

/// Cross-section of the two support poles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pole {
    pub width: f32,
    #[serde(alias = "length")]
    pub depth: f32,
}

impl Default for Pole {
    fn default() -> Self {
        Self {
            width: 5.0,
            depth: 5.0,
        }
    }
}

/// A multi-level shelf unit standing on a rectangular footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub id: Option<String>,
    pub levels: u32,
    pub width: f32,
    pub height: LevelHeight,
    pub direction: Direction,
    pub pole: Pole,
    pub outline: Vec<Vector2<f32>>,
}

impl Shelf {
    /// Returns `None` for features without polygon geometry. Level counts
    /// that don't match the given heights are rejected here rather than at
    /// draw time.
    pub fn from_feature(feature: &Feature) -> Result<Option<Self>> {
        let Some(polygon) = feature.polygon() else {
            return Ok(None);
        };
        let props = feature.properties.clone().unwrap_or_default();
        let height = props.height.unwrap_or_default();

        let levels = match (props.levels, &height) {
            (Some(levels), _) => levels,
            (None, LevelHeight::PerLevel(heights)) => heights.len() as u32,
            (None, LevelHeight::Uniform(_)) => DEFAULT_LEVELS,
        };

        let shelf = Self {
            id: feature.resolved_id(),
            levels,
            width: props.width.unwrap_or(DEFAULT_SHELF_WIDTH),
            height,
            direction: props.direction.unwrap_or_default(),
            pole: props.pole.unwrap_or_default(),
            outline: polygon.outline()?,
        };
        shelf.validate()?;
        Ok(Some(shelf))
    }

    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }

    fn invalid(&self, reason: impl Into<String>) -> WarehouseError {
        WarehouseError::InvalidShelf {
            id: self.display_id().to_string(),
            reason: reason.into(),
        }
    }

    /// Checks the level count against the given heights without building
    /// the per-level list.
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 {
            return Err(self.invalid("a shelf needs at least one level"));
        }
        if self.levels > MAX_LEVELS {
            return Err(self.invalid(format!(
                "{} levels is more than the supported {MAX_LEVELS}",
                self.levels
            )));
        }
        let levels = self.levels as usize;

        let positive = match &self.height {
            LevelHeight::Uniform(h) => *h > 0.0,
            LevelHeight::PerLevel(list) if list.len() >= levels => {
                list[..levels].iter().all(|h| *h > 0.0)
            }
            LevelHeight::PerLevel(list) => {
                return Err(self.invalid(format!(
                    "{} levels but only {} heights",
                    levels,
                    list.len()
                )))
            }
        };
        if !positive {
            return Err(self.invalid("level heights must be positive"));
        }
        Ok(())
    }

    /// Height at a 0-based index. Only meaningful once validated.
    fn height_at(&self, index: usize) -> f32 {
        match &self.height {
            LevelHeight::Uniform(h) => *h,
            LevelHeight::PerLevel(list) => list.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Height of each level, bottom first.
    pub fn level_heights(&self) -> Result<Vec<f32>> {
        self.validate()?;
        Ok((0..self.levels as usize).map(|i| self.height_at(i)).collect())
    }

    /// Height of a 1-based level, if the shelf has it.
    pub fn level_height(&self, level: u32) -> Option<f32> {
        let index = (level as usize).checked_sub(1)?;
        if level > self.levels || self.validate().is_err() {
            return None;
        }
        Some(self.height_at(index))
    }

    /// Sum of the heights of every level below a 1-based level.
    pub fn base_offset(&self, level: u32) -> f32 {
        if self.validate().is_err() {
            return 0.0;
        }
        let below = level.saturating_sub(1).min(self.levels) as usize;
        (0..below).map(|i| self.height_at(i)).sum()
    }

    /// Plan size of a pole: `(along x, along y)`.
    pub fn pole_dimensions(&self) -> (f32, f32) {
        match self.direction {
            Direction::Vertical => (self.width, self.pole.depth),
            Direction::Horizontal => (self.pole.depth, self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf(props: &str) -> Result<Option<Shelf>> {
        let json = format!(
            r#"{{ "geometry": {{ "type": "Polygon", "coordinates": [[[0,0],[15,0],[15,60],[0,60],[0,0]]] }},
                  "properties": {props} }}"#
        );
        Shelf::from_feature(&serde_json::from_str(&json).unwrap())
    }

    #[test]
    fn defaults() {
        let shelf = shelf(r#"{ "type": "shelf", "id": "s1" }"#).unwrap().unwrap();
        assert_eq!(shelf.levels, DEFAULT_LEVELS);
        assert_eq!(shelf.width, DEFAULT_SHELF_WIDTH);
        assert_eq!(shelf.direction, Direction::Vertical);
        assert_eq!(shelf.pole, Pole::default());
        assert_eq!(shelf.level_heights().unwrap(), vec![20.0; 5]);
    }

    #[test]
    fn per_level_heights_infer_level_count() {
        let shelf = shelf(r#"{ "id": "s1", "height": [30, 25, 20] }"#)
            .unwrap()
            .unwrap();
        assert_eq!(shelf.levels, 3);
        assert_eq!(shelf.level_height(2), Some(25.0));
        assert_eq!(shelf.level_height(4), None);
        assert_eq!(shelf.level_height(0), None);
        assert_eq!(shelf.base_offset(1), 0.0);
        assert_eq!(shelf.base_offset(3), 55.0);
    }

    #[test]
    fn too_few_heights_is_an_error() {
        let err = shelf(r#"{ "id": "s1", "levels": 4, "height": [30, 25] }"#).unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidShelf { ref id, .. } if id == "s1"));
    }

    #[test]
    fn zero_levels_is_an_error() {
        assert!(shelf(r#"{ "levels": 0 }"#).is_err());
    }

    #[test]
    fn huge_level_count_is_rejected_up_front() {
        let err = shelf(r#"{ "id": "tall", "levels": 4000000000 }"#).unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidShelf { ref id, .. } if id == "tall"));
        assert!(shelf(&format!(r#"{{ "levels": {MAX_LEVELS} }}"#)).is_ok());
    }

    #[test]
    fn pole_length_alias_and_orientation() {
        let shelf = shelf(
            r#"{ "width": 12, "direction": "horizontal", "pole": { "length": 4 } }"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(shelf.pole.depth, 4.0);
        assert_eq!(shelf.pole.width, 5.0);
        assert_eq!(shelf.pole_dimensions(), (4.0, 12.0));
    }
}
