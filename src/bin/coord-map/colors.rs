//! Color constants for the map canvas.

use coord_map::{Coordinate, HeightTier};
use eframe::egui::Color32;

// Canvas background and grid
pub const GRASS: Color32 = Color32::from_rgb(0x7C, 0xB3, 0x42);
pub const GRID_MINOR: Color32 = Color32::from_rgb(0x4A, 0x7C, 0x59);
pub const GRID_MAJOR: Color32 = Color32::from_rgb(0x2E, 0x7D, 0x32);
pub const AXIS: Color32 = Color32::from_rgb(0x2C, 0x2C, 0x2C);

// Axis labels
pub const AXIS_LABEL_TEXT: Color32 = Color32::from_rgb(0x1A, 0x1A, 0x1A);
pub const AXIS_LABEL_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(204, 204, 204, 204);

// Height tiers
pub const UNDERGROUND: Color32 = Color32::from_rgb(0x65, 0x43, 0x21);
pub const SURFACE: Color32 = Color32::from_rgb(0x22, 0x8B, 0x22);
pub const ELEVATED: Color32 = Color32::from_rgb(0x87, 0xCE, 0xEB);
pub const SKY: Color32 = Color32::from_rgb(0xF0, 0xF8, 0xFF);

// Markers
pub const MARKER_OUTLINE: Color32 = Color32::BLACK;
pub const MARKER_SELECTED_OUTLINE: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00);
pub const MARKER_HIGHLIGHT: Color32 = Color32::from_rgba_premultiplied(102, 102, 102, 102);

// Marker bubbles
pub const BUBBLE_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 242);
pub const BUBBLE_LABEL_TEXT: Color32 = Color32::WHITE;
pub const BUBBLE_COORD_TEXT: Color32 = Color32::from_rgb(0xCC, 0xCC, 0xCC);

pub fn tier_color(tier: HeightTier) -> Color32 {
    match tier {
        HeightTier::Underground => UNDERGROUND,
        HeightTier::Surface => SURFACE,
        HeightTier::Elevated => ELEVATED,
        HeightTier::Sky => SKY,
    }
}

/// Explicit color override if it parses, otherwise the height tier color.
pub fn marker_fill(coordinate: &Coordinate) -> Color32 {
    coordinate
        .color
        .as_deref()
        .and_then(|hex| Color32::from_hex(hex).ok())
        .unwrap_or_else(|| tier_color(HeightTier::from_height(coordinate.y)))
}
