use cgmath::Vector2;
use log::warn;

use crate::{error::Result, geojson::Feature, theme::Color};

/// Height an area is extruded to when the layout gives none.
pub const DEFAULT_AREA_HEIGHT: f32 = 10.0;

/// Either a named theme colour or a literal hex colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaColor {
    Primary,
    Secondary,
    Tertiary,
    Warning,
    Danger,
    Success,
    Custom(Color),
}

impl Default for AreaColor {
    fn default() -> Self {
        AreaColor::Custom(Color::from_hex(0xc9c9c9))
    }
}

impl AreaColor {
    /// Unknown names and malformed hex values fall back to the default.
    pub fn from_name(name: &str) -> Self {
        match name {
            "primary" => AreaColor::Primary,
            "secondary" => AreaColor::Secondary,
            "tertiary" => AreaColor::Tertiary,
            "warning" => AreaColor::Warning,
            "danger" => AreaColor::Danger,
            "success" => AreaColor::Success,
            other => match Color::parse(other) {
                Ok(color) => AreaColor::Custom(color),
                Err(err) => {
                    warn!("{err}; using the default area color");
                    AreaColor::default()
                }
            },
        }
    }
}

/// A coloured floor region such as a loading dock or an aisle.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: AreaColor,
    pub height: f32,
    pub outline: Vec<Vector2<f32>>,
}

impl Area {
    /// Returns `None` for features without polygon geometry.
    pub fn from_feature(feature: &Feature) -> Result<Option<Self>> {
        let Some(polygon) = feature.polygon() else {
            return Ok(None);
        };
        let props = feature.properties.clone().unwrap_or_default();

        let height = props
            .height
            .and_then(|h| h.scalar())
            .filter(|h| *h > 0.0)
            .unwrap_or(DEFAULT_AREA_HEIGHT);

        Ok(Some(Self {
            id: feature.resolved_id(),
            name: props.name.filter(|n| !n.is_empty()),
            color: props
                .color
                .as_deref()
                .map(AreaColor::from_name)
                .unwrap_or_default(),
            height,
            outline: polygon.outline()?,
        }))
    }
}
