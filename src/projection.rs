//! World-to-screen projection for the map canvas.
//!
//! The canvas shows the X/Z plane of a map. World X grows to the right and
//! world Z grows downwards, matching the in-game top-down view. Y never
//! affects placement, only the default marker color.

use crate::{Coordinate, ViewConfig};
use eframe::egui::{Pos2, Rect, Vec2, pos2};

/// "Nice" axis label spacings, scanned smallest first.
pub const LABEL_INTERVALS: [f64; 23] = [
    1.0, 2.0, 4.0, 5.0, 8.0, 10.0, 16.0, 20.0, 32.0, 40.0, 64.0, 80.0, 128.0, 160.0, 256.0, 320.0,
    512.0, 640.0, 1024.0, 1280.0, 2048.0, 2560.0, 4096.0,
];

/// Spacing used once the ladder runs out, rounded up to a multiple of this.
const FALLBACK_INTERVAL_STEP: f64 = 1000.0;

/// World-space rectangle shown by the canvas, derived from a coordinate set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl ViewBounds {
    /// Bounding box of `coordinates` padded on every side.
    ///
    /// The padding is a fraction of the larger of the X and Z ranges,
    /// clamped to `[padding_min, padding_max]`. An empty set yields a fixed
    /// box centred on the origin.
    pub fn from_coordinates(coordinates: &[Coordinate], config: &ViewConfig) -> Self {
        let Some(first) = coordinates.first() else {
            let half = config.default_half_extent;
            return Self {
                min_x: -half,
                max_x: half,
                min_z: -half,
                max_z: half,
            };
        };

        let (min_x, max_x, min_z, max_z) = coordinates.iter().fold(
            (first.x, first.x, first.z, first.z),
            |(min_x, max_x, min_z, max_z), c| {
                (min_x.min(c.x), max_x.max(c.x), min_z.min(c.z), max_z.max(c.z))
            },
        );
        let (min_x, max_x) = (f64::from(min_x), f64::from(max_x));
        let (min_z, max_z) = (f64::from(min_z), f64::from(max_z));

        let max_range = (max_x - min_x).max(max_z - min_z);
        let padding = (max_range * config.padding_ratio).clamp(config.padding_min, config.padding_max);

        Self {
            min_x: min_x - padding,
            max_x: max_x + padding,
            min_z: min_z - padding,
            max_z: max_z + padding,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_z..=self.max_z).contains(&z)
    }
}

/// User zoom and pan of one canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Zoom factor on top of the auto-fit scale
    pub scale: f64,
    /// Pan translation in screen pixels
    pub offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewState {
    pub fn zoom_in(&mut self, config: &ViewConfig) {
        self.scale = (self.scale * config.zoom_step).clamp(config.zoom_min, config.zoom_max);
    }

    pub fn zoom_out(&mut self, config: &ViewConfig) {
        self.scale = (self.scale / config.zoom_step).clamp(config.zoom_min, config.zoom_max);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }
}

/// Affine world-to-screen transform for one frame.
///
/// `screen = canvas_center + offset + (world - bounds_center) * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    origin_x: f64,
    origin_y: f64,
    world_center: (f64, f64),
    scale: f64,
}

impl Projection {
    /// Returns `None` when the canvas has no area to draw into.
    pub fn new(bounds: &ViewBounds, canvas: Rect, view: &ViewState, config: &ViewConfig) -> Option<Self> {
        let width = f64::from(canvas.width());
        let height = f64::from(canvas.height());
        if !(width > 0.0 && height > 0.0) {
            return None;
        }

        let fit_x = width * config.fit_fraction / bounds.width();
        let fit_z = height * config.fit_fraction / bounds.height();
        let scale = fit_x.min(fit_z) * view.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return None;
        }

        let center = canvas.center();
        Some(Self {
            origin_x: f64::from(center.x) + f64::from(view.offset.x),
            origin_y: f64::from(center.y) + f64::from(view.offset.y),
            world_center: bounds.center(),
            scale,
        })
    }

    /// Pixels per block, including the user zoom.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, x: f64, z: f64) -> (f64, f64) {
        (
            self.origin_x + (x - self.world_center.0) * self.scale,
            self.origin_y + (z - self.world_center.1) * self.scale,
        )
    }

    pub fn unproject(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.origin_x) / self.scale + self.world_center.0,
            (sy - self.origin_y) / self.scale + self.world_center.1,
        )
    }

    pub fn world_to_screen(&self, x: f64, z: f64) -> Pos2 {
        let (sx, sy) = self.project(x, z);
        pos2(sx as f32, sy as f32)
    }

    pub fn screen_to_world(&self, pos: Pos2) -> (f64, f64) {
        self.unproject(f64::from(pos.x), f64::from(pos.y))
    }

    /// Converts a length in blocks to pixels.
    pub fn to_screen_len(&self, blocks: f64) -> f32 {
        (blocks * self.scale) as f32
    }
}

/// Picks the axis label spacing for the given pixels-per-block scale.
///
/// The first ladder entry whose on-screen spacing reaches `min_spacing_px`
/// wins; past the end of the ladder the spacing is rounded up to a multiple
/// of 1000.
pub fn label_interval(scale: f64, min_spacing_px: f64) -> f64 {
    let min_world_spacing = min_spacing_px / scale;
    LABEL_INTERVALS
        .iter()
        .copied()
        .find(|&interval| interval >= min_world_spacing)
        .unwrap_or_else(|| {
            (min_world_spacing / FALLBACK_INTERVAL_STEP).ceil() * FALLBACK_INTERVAL_STEP
        })
}

/// Grid line positions covering `[min, max]`, starting at the multiple of
/// `spacing` at or below `min`.
pub fn grid_lines(min: f64, max: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let start = (min / spacing).floor() * spacing;
    steps(start, max, spacing)
}

/// Axis label positions inside `[min, max]`, excluding the origin which is
/// labelled separately.
pub fn label_ticks(min: f64, max: f64, interval: f64) -> impl Iterator<Item = f64> {
    let start = (min / interval).ceil() * interval;
    steps(start, max, interval).filter(|&v| v != 0.0)
}

fn steps(start: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    (0u32..)
        .map(move |i| start + f64::from(i) * step)
        .take_while(move |&v| v <= max)
}

/// Marker edge length in blocks.
///
/// Never smaller than `marker_min` blocks, and never smaller than
/// `marker_base` pixels on screen.
pub fn marker_size(scale: f64, selected: bool, config: &ViewConfig) -> f64 {
    let base = config.marker_min.max(config.marker_base / scale);
    if selected {
        base * config.selected_marker_factor
    } else {
        base
    }
}

/// Click detection radius in blocks; grows as the view zooms out.
pub fn hit_radius(scale: f64, config: &ViewConfig) -> f64 {
    config.hit_radius_min.max(config.hit_radius_base / scale)
}

/// Nearest coordinate within the hit radius of a screen position.
///
/// Ties go to the coordinate that comes first.
pub fn hit_test<'a>(
    coordinates: &'a [Coordinate],
    projection: &Projection,
    click: Pos2,
    config: &ViewConfig,
) -> Option<&'a Coordinate> {
    let (world_x, world_z) = projection.screen_to_world(click);
    let radius = hit_radius(projection.scale(), config);

    let mut closest = None;
    let mut min_distance = f64::INFINITY;
    for coordinate in coordinates {
        let distance = (f64::from(coordinate.x) - world_x).hypot(f64::from(coordinate.z) - world_z);
        if distance < radius && distance < min_distance {
            min_distance = distance;
            closest = Some(coordinate);
        }
    }
    closest
}

/// Default marker color band for a height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightTier {
    /// Below sea floor level (y < 0)
    Underground,
    /// 0 <= y < 64
    Surface,
    /// 64 <= y < 128
    Elevated,
    /// y >= 128
    Sky,
}

impl HeightTier {
    pub fn from_height(y: i32) -> Self {
        match y {
            i32::MIN..0 => HeightTier::Underground,
            0..64 => HeightTier::Surface,
            64..128 => HeightTier::Elevated,
            _ => HeightTier::Sky,
        }
    }
}
