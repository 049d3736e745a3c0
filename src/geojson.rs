//! The subset of GeoJSON a warehouse layout is written in.
//!
//! Only `Polygon` geometries are drawn. Every other geometry type still
//! deserializes (as [`Geometry::Other`]) so a layout that carries points or
//! lines for other tools loads without error.

use cgmath::Vector2;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, WarehouseError},
    model::{Direction, LevelHeight, Pole},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
}

impl GeoJson {
    pub fn type_name(&self) -> &'static str {
        match self {
            GeoJson::Feature(_) => "Feature",
            GeoJson::FeatureCollection(_) => "FeatureCollection",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Properties>,
}

impl Feature {
    /// The id from `properties.id`, falling back to the feature's own id.
    pub fn resolved_id(&self) -> Option<String> {
        self.properties
            .as_ref()
            .and_then(|p| p.id.clone())
            .or_else(|| self.id.clone())
            .map(|id| id.0)
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        match &self.geometry {
            Some(Geometry::Polygon(polygon)) => Some(polygon),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon(Polygon),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Rings of `[x, y]` positions. Extra components (altitude) are ignored.
    #[serde(default)]
    pub coordinates: Vec<Vec<Vec<f32>>>,
}

impl Polygon {
    /// Flattens every ring into one point list, in document order.
    pub fn outline(&self) -> Result<Vec<Vector2<f32>>> {
        self.coordinates
            .iter()
            .flatten()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Vector2::new(*x, *y)),
                _ => Err(WarehouseError::InvalidPolygon(format!(
                    "position {position:?} needs at least two components"
                ))),
            })
            .collect()
    }
}

/// Feature ids appear as both strings and numbers in real layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct FeatureId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for FeatureId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => FeatureId(text),
            RawId::Number(number) => FeatureId(number.to_string()),
        }
    }
}

impl From<FeatureId> for String {
    fn from(id: FeatureId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default)]
    pub id: Option<FeatureId>,
    /// Entity kind: `area`, `shelf` or `stack`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub levels: Option<u32>,
    #[serde(default)]
    pub height: Option<LevelHeight>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub pole: Option<Pole>,
    #[serde(default)]
    pub shelf_id: Option<FeatureId>,
    #[serde(default)]
    pub shelf_level: Option<u32>,
}

pub fn parse_document(text: &str) -> Result<GeoJson> {
    Ok(serde_json::from_str(text)?)
}
