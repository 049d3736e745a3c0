use cgmath::Vector2;
use log::warn;

use crate::{error::Result, geojson::Feature};

/// Height used when neither the stack nor its shelf level gives one.
pub const DEFAULT_STACK_HEIGHT: f32 = 15.0;

/// A storage slot sitting on one level of a shelf.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub id: Option<String>,
    pub height: Option<f32>,
    pub shelf_id: Option<String>,
    /// 1-based level of the shelf the stack sits on.
    pub shelf_level: u32,
    pub outline: Vec<Vector2<f32>>,
}

impl Stack {
    /// Returns `None` for features without polygon geometry.
    pub fn from_feature(feature: &Feature) -> Result<Option<Self>> {
        let Some(polygon) = feature.polygon() else {
            return Ok(None);
        };
        let props = feature.properties.clone().unwrap_or_default();
        let id = feature.resolved_id();

        let shelf_level = match props.shelf_level {
            Some(0) => {
                warn!("stack {id:?} is on level 0; placing it on level 1");
                1
            }
            Some(level) => level,
            None => 1,
        };

        Ok(Some(Self {
            height: props.height.and_then(|h| h.scalar()).filter(|h| *h > 0.0),
            shelf_id: props.shelf_id.map(|id| id.0),
            shelf_level,
            outline: polygon.outline()?,
            id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_shelf_reference() {
        let feature: Feature = serde_json::from_str(
            r#"{ "geometry": { "type": "Polygon", "coordinates": [[[1,1],[14,1],[14,10],[1,10]]] },
                 "properties": { "type": "stack", "id": "k1", "shelfId": "s1", "shelfLevel": 3 } }"#,
        )
        .unwrap();
        let stack = Stack::from_feature(&feature).unwrap().unwrap();
        assert_eq!(stack.id.as_deref(), Some("k1"));
        assert_eq!(stack.shelf_id.as_deref(), Some("s1"));
        assert_eq!(stack.shelf_level, 3);
        assert_eq!(stack.height, None);
    }

    #[test]
    fn level_zero_becomes_first_level() {
        let feature: Feature = serde_json::from_str(
            r#"{ "geometry": { "type": "Polygon", "coordinates": [[[1,1],[14,1],[14,10]]] },
                 "properties": { "shelfLevel": 0, "height": 8 } }"#,
        )
        .unwrap();
        let stack = Stack::from_feature(&feature).unwrap().unwrap();
        assert_eq!(stack.shelf_level, 1);
        assert_eq!(stack.height, Some(8.0));
    }
}
