use std::path::Path;

use log::{debug, info, warn};

use crate::{
    error::{self, Result, WarehouseError},
    geojson::{self, GeoJson},
};

use super::{Area, EntityType, Shelf, Stack};

/// Every entity of one layout, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Warehouse {
    pub areas: Vec<Area>,
    pub shelves: Vec<Shelf>,
    pub stacks: Vec<Stack>,
    /// Features of a known kind that failed to parse and were left out.
    pub skipped: usize,
}

impl Warehouse {
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_document(geojson::parse_document(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let warehouse = Self::parse(&error::read_to_string(path)?)?;
        info!(
            "Loaded {}: {} areas, {} shelves, {} stacks ({} skipped)",
            path.display(),
            warehouse.areas.len(),
            warehouse.shelves.len(),
            warehouse.stacks.len(),
            warehouse.skipped
        );
        Ok(warehouse)
    }

    /// Routes features by `properties.type`; unknown kinds are ignored.
    /// A feature that fails to parse is logged and skipped so the rest of
    /// the layout still loads.
    pub fn from_document(document: GeoJson) -> Result<Self> {
        let collection = match document {
            GeoJson::FeatureCollection(collection) => collection,
            other => return Err(WarehouseError::NotAFeatureCollection(other.type_name())),
        };

        let mut warehouse = Warehouse::default();
        for feature in &collection.features {
            let kind = feature
                .properties
                .as_ref()
                .and_then(|p| p.kind.as_deref())
                .and_then(EntityType::from_name);

            let parsed = match kind {
                Some(EntityType::Area) => Area::from_feature(feature)
                    .map(|area| warehouse.areas.extend(area)),
                Some(EntityType::Shelf) => Shelf::from_feature(feature)
                    .map(|shelf| warehouse.shelves.extend(shelf)),
                Some(EntityType::Stack) => Stack::from_feature(feature)
                    .map(|stack| warehouse.stacks.extend(stack)),
                _ => {
                    debug!("Ignoring feature {:?}", feature.resolved_id());
                    Ok(())
                }
            };

            if let Err(e) = parsed {
                warn!("Skipping feature {:?}: {e}", feature.resolved_id());
                warehouse.skipped += 1;
            }
        }
        Ok(warehouse)
    }

    pub fn shelf(&self, id: &str) -> Option<&Shelf> {
        self.shelves.iter().find(|s| s.id.as_deref() == Some(id))
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty() && self.shelves.is_empty() && self.stacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_features_by_type() {
        let warehouse = Warehouse::parse(
            r#"{ "type": "FeatureCollection", "features": [
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[0,0],[50,0],[50,50],[0,50]]] },
                  "properties": { "type": "area", "name": "Receiving", "color": "success" } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[100,0],[115,0],[115,60],[100,60]]] },
                  "properties": { "type": "shelf", "id": "s1", "levels": 3 } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[101,1],[114,1],[114,19],[101,19]]] },
                  "properties": { "type": "stack", "shelfId": "s1", "shelfLevel": 2 } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]] },
                  "properties": { "type": "door" } },
                { "type": "Feature", "geometry": null }
            ] }"#,
        )
        .unwrap();

        assert_eq!(warehouse.areas.len(), 1);
        assert_eq!(warehouse.shelves.len(), 1);
        assert_eq!(warehouse.stacks.len(), 1);
        assert_eq!(warehouse.shelf("s1").map(|s| s.levels), Some(3));
        assert!(warehouse.shelf("s2").is_none());
    }

    #[test]
    fn bad_shelf_is_skipped_and_the_rest_loads() {
        let warehouse = Warehouse::parse(
            r#"{ "type": "FeatureCollection", "features": [
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[0,0],[50,0],[50,50],[0,50]]] },
                  "properties": { "type": "area", "id": "a1" } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[100,0],[115,0],[115,60],[100,60]]] },
                  "properties": { "type": "shelf", "id": "good", "levels": 2 } },
                { "type": "Feature",
                  "geometry": { "type": "Polygon", "coordinates": [[[200,0],[215,0],[215,60],[200,60]]] },
                  "properties": { "type": "shelf", "id": "bad", "levels": 4, "height": [20, 20] } }
            ] }"#,
        )
        .unwrap();

        assert_eq!(warehouse.areas.len(), 1);
        assert_eq!(warehouse.shelves.len(), 1);
        assert!(warehouse.shelf("good").is_some());
        assert!(warehouse.shelf("bad").is_none());
        assert_eq!(warehouse.skipped, 1);
    }

    #[test]
    fn single_feature_is_rejected() {
        let err = Warehouse::parse(r#"{ "type": "Feature", "properties": { "type": "area" } }"#)
            .unwrap_err();
        assert!(matches!(err, WarehouseError::NotAFeatureCollection("Feature")));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            Warehouse::parse("{ not json"),
            Err(WarehouseError::Json(_))
        ));
    }

    #[test]
    fn bundled_sample_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/json/all.json");
        let warehouse = Warehouse::load(path).unwrap();
        assert!(!warehouse.areas.is_empty());
        assert!(!warehouse.shelves.is_empty());
        assert!(!warehouse.stacks.is_empty());
        for stack in &warehouse.stacks {
            let shelf_id = stack.shelf_id.as_deref().unwrap();
            assert!(warehouse.shelf(shelf_id).is_some(), "{shelf_id} missing");
        }
    }
}
