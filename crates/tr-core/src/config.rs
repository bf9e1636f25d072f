//! The public configuration surface: read-only defaults, overridable by the
//! embedder before the scene is built.

use crate::model::{Color, ShapeKind};
use serde::{Deserialize, Serialize};

/// Colors applied while an entity is hovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverPalette {
    pub node_stroke: Color,
    pub link_shadow: Color,
}

/// Colors applied while an entity is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectPalette {
    pub node_fill: Color,
    pub node_stroke: Color,
    pub link_stroke: Color,
}

/// Default, hovered and selected colors for every entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub hovered: HoverPalette,
    pub selected: SelectPalette,
    pub node_fill: Color,
    pub link_stroke: Color,
    pub control_point: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hovered: HoverPalette {
                node_stroke: Color::rgb(0x3F, 0x51, 0xB5),
                link_shadow: Color::rgb(0x3F, 0x51, 0xB5),
            },
            selected: SelectPalette {
                node_fill: Color::rgb(0x00, 0x96, 0x88),
                node_stroke: Color::rgb(0x3F, 0x51, 0xB5),
                link_stroke: Color::rgb(0x00, 0x96, 0x88),
            },
            node_fill: Color::rgb(0xCF, 0x33, 0x33),
            link_stroke: Color::rgb(0x33, 0x33, 0x33),
            control_point: Color::rgb(0x3F, 0x51, 0xB5),
        }
    }
}

/// Engine-wide defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub palette: Palette,
    /// The supported node shape kinds.
    pub shape_kinds: Vec<ShapeKind>,
    /// Fallback background-image URL for shapes that enable an image without
    /// naming one. Empty means "no fallback".
    pub node_image: String,
    /// Default background-image scale, as a percentage of natural size.
    pub node_image_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            shape_kinds: vec![ShapeKind::Circle, ShapeKind::Rectangle],
            node_image: String::new(),
            node_image_scale: 50.0,
        }
    }
}
