/// Width of the map detail side panel in pixels.
pub const SIDEBAR_WIDTH: f32 = 260.0;

/// Initial window size.
pub const WINDOW_SIZE: [f32; 2] = [1280.0, 800.0];

/// Grid levels whose lines would be closer than this many pixels are skipped.
pub const MIN_GRID_PIXELS: f64 = 4.0;

/// Upper bound for any font drawn on the canvas, in pixels.
pub const MAX_CANVAS_FONT: f32 = 48.0;

/// Screen margin around the canvas before markers are culled.
pub const MARKER_CULL_MARGIN: f32 = 200.0;

/// Toast lifetimes in seconds.
pub const TOAST_SUCCESS_SECS: f64 = 3.0;
pub const TOAST_WARNING_SECS: f64 = 6.0;
pub const TOAST_ERROR_SECS: f64 = 8.0;
