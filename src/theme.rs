//! Colours and material styles for every kind of warehouse object.
//!
//! The default palette follows the Ant Design colour scale. A theme can be
//! replaced wholesale by loading a JSON file with the same shape; any field
//! left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Result, WarehouseError},
    model::AreaColor,
};

/// Linear RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_hex(0xffffff);

    /// Builds a colour from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parses `#rrggbb` or the `#rgb` shorthand.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || WarehouseError::InvalidColor(text.to_string());
        let digits = text.trim().strip_prefix('#').ok_or_else(invalid)?;

        let expanded = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(invalid()),
        };

        u32::from_str_radix(&expanded, 16)
            .map(Self::from_hex)
            .map_err(|_| invalid())
    }

    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl TryFrom<String> for Color {
    type Error = WarehouseError;

    fn try_from(value: String) -> Result<Self> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        format!("#{:06x}", color.to_hex())
    }
}

/// Surface appearance of one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialStyle {
    pub color: Color,
    pub opacity: f32,
    #[serde(default = "default_transparent")]
    pub transparent: bool,
}

fn default_transparent() -> bool {
    true
}

impl MaterialStyle {
    pub const fn new(hex: u32, opacity: f32) -> Self {
        Self {
            color: Color::from_hex(hex),
            opacity,
            transparent: true,
        }
    }
}

/// Styles for the two mesh kinds a shelf is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfStyle {
    pub opacity: f32,
    pub transparent: bool,
    pub pole: MaterialStyle,
    pub level: MaterialStyle,
}

impl Default for ShelfStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transparent: true,
            pole: MaterialStyle::new(0xbae7ff, 1.0),
            level: MaterialStyle::new(0xffd591, 1.0),
        }
    }
}

/// Named area colours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaPalette {
    pub primary: MaterialStyle,
    pub secondary: MaterialStyle,
    pub tertiary: MaterialStyle,
    pub warning: MaterialStyle,
    pub danger: MaterialStyle,
    pub success: MaterialStyle,
    /// Opacity given to areas that carry their own hex colour.
    pub custom_opacity: f32,
}

impl Default for AreaPalette {
    fn default() -> Self {
        Self {
            primary: MaterialStyle::new(0x8c8c8c, 0.7),
            secondary: MaterialStyle::new(0x9e9e9e, 0.7),
            tertiary: MaterialStyle::new(0xbdbdbd, 0.7),
            warning: MaterialStyle::new(0xfff566, 0.7),
            danger: MaterialStyle::new(0xff7875, 0.7),
            success: MaterialStyle::new(0x95de64, 0.7),
            custom_opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    /// Clear colour of the viewport.
    pub background: Color,
    /// Colour painted on the selected stack or shelf level.
    pub selected_color: Color,
    pub ground: MaterialStyle,
    pub shelf: ShelfStyle,
    pub stack: MaterialStyle,
    pub area: AreaPalette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            background: Color::from_hex(0xf5f5f5),
            selected_color: Color::from_hex(0x69c0ff),
            ground: MaterialStyle::new(0xbfbfbf, 1.0),
            shelf: ShelfStyle::default(),
            stack: MaterialStyle::new(0xfadb14, 0.7),
            area: AreaPalette::default(),
        }
    }
}

impl Theme {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = error::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolves the style for an area colour.
    pub fn area(&self, color: &AreaColor) -> MaterialStyle {
        match color {
            AreaColor::Primary => self.area.primary,
            AreaColor::Secondary => self.area.secondary,
            AreaColor::Tertiary => self.area.tertiary,
            AreaColor::Warning => self.area.warning,
            AreaColor::Danger => self.area.danger,
            AreaColor::Success => self.area.success,
            AreaColor::Custom(color) => MaterialStyle {
                color: *color,
                opacity: self.area.custom_opacity,
                transparent: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::parse("#69c0ff").unwrap().to_hex(), 0x69c0ff);
        assert_eq!(Color::parse("#fff").unwrap().to_hex(), 0xffffff);
        assert_eq!(Color::parse(" #C9C9C9 ").unwrap().to_hex(), 0xc9c9c9);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(Color::parse("69c0ff").is_err());
        assert!(Color::parse("#69c0f").is_err());
        assert!(Color::parse("#zzzzzz").is_err());
    }

    #[test]
    fn named_area_colors_use_palette() {
        let theme = Theme::default();
        assert_eq!(theme.area(&AreaColor::Danger).color.to_hex(), 0xff7875);
        assert_eq!(theme.area(&AreaColor::Success).opacity, 0.7);

        let custom = theme.area(&AreaColor::Custom(Color::from_hex(0x123456)));
        assert_eq!(custom.color.to_hex(), 0x123456);
        assert_eq!(custom.opacity, 0.7);
    }

    #[test]
    fn partial_theme_json_keeps_defaults() {
        let theme: Theme =
            serde_json::from_str(r##"{ "selectedColor": "#ff0000", "stack": { "color": "#00ff00", "opacity": 0.5 } }"##)
                .unwrap();
        assert_eq!(theme.selected_color.to_hex(), 0xff0000);
        assert_eq!(theme.stack.color.to_hex(), 0x00ff00);
        assert!(theme.stack.transparent);
        assert_eq!(theme.background.to_hex(), 0xf5f5f5);
    }
}
