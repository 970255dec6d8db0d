//! Map canvas widget: grid, axes, markers, pan/zoom and click selection.

use crate::colors;
use crate::constants::{MARKER_CULL_MARGIN, MAX_CANVAS_FONT, MIN_GRID_PIXELS};
use coord_map::gesture::{PointerTracker, Release};
use coord_map::projection::{self, Projection, ViewBounds, ViewState};
use coord_map::{Coordinate, Map, ViewConfig};
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, vec2};

/// Per-canvas interaction state. Lives as long as the canvas is shown for a
/// given map.
#[derive(Debug, Clone, Copy)]
pub struct CanvasState {
    pub view: ViewState,
    pointer: PointerTracker,
}

impl CanvasState {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            view: ViewState::default(),
            pointer: PointerTracker::new(config.drag_threshold),
        }
    }

    pub fn reset(&mut self) {
        self.view.reset();
        self.pointer.leave();
    }
}

/// Notifications from the canvas back to its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A click picked this coordinate, or cleared the selection
    SelectionChanged(Option<String>),
    FullScreenRequested,
}

pub struct CanvasOutput {
    pub response: egui::Response,
    pub events: Vec<CanvasEvent>,
}

pub struct MapCanvas<'a> {
    map: &'a Map,
    selected: Option<&'a str>,
    state: &'a mut CanvasState,
    config: &'a ViewConfig,
    full_screen_button: bool,
}

impl<'a> MapCanvas<'a> {
    pub fn new(
        map: &'a Map,
        selected: Option<&'a str>,
        state: &'a mut CanvasState,
        config: &'a ViewConfig,
    ) -> Self {
        Self {
            map,
            selected,
            state,
            config,
            full_screen_button: false,
        }
    }

    /// Shows a button that emits [`CanvasEvent::FullScreenRequested`].
    pub fn full_screen_button(mut self, enabled: bool) -> Self {
        self.full_screen_button = enabled;
        self
    }

    /// Fills the remaining space of `ui` with the canvas.
    pub fn show(mut self, ui: &mut egui::Ui) -> CanvasOutput {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let mut events = Vec::new();

        let bounds = ViewBounds::from_coordinates(&self.map.coordinates, self.config);

        // Resolve the click against the view the user clicked on, before any
        // double-click or scroll zoom of this frame.
        if let Some(click) = self.handle_pointer(ui, &response, rect) {
            if let Some(projection) = Projection::new(&bounds, rect, &self.state.view, self.config)
            {
                let hit = projection::hit_test(&self.map.coordinates, &projection, click, self.config);
                events.push(CanvasEvent::SelectionChanged(hit.map(|c| c.id.clone())));
            }
        }
        self.handle_zoom(ui, &response);

        // Nothing to draw into yet.
        let Some(projection) = Projection::new(&bounds, rect, &self.state.view, self.config) else {
            return CanvasOutput { response, events };
        };

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, colors::GRASS);
        draw_grid(&painter, rect, &bounds, &projection, self.config);
        draw_axes(&painter, &bounds, &projection);
        draw_axis_labels(&painter, rect, &bounds, &projection, self.config);
        draw_markers(&painter, rect, self.map, self.selected, &projection, self.config);

        if self.show_controls(ui, rect) {
            events.push(CanvasEvent::FullScreenRequested);
        }

        CanvasOutput { response, events }
    }

    /// Scroll wheel and double-click zoom.
    fn handle_zoom(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if response.double_clicked() {
            self.state.view.zoom_in(self.config);
        }

        if !response.contains_pointer() {
            return;
        }
        let scroll_delta = ui.input(|i| i.raw_scroll_delta.y);
        if scroll_delta > 0.0 {
            self.state.view.zoom_in(self.config);
        } else if scroll_delta < 0.0 {
            self.state.view.zoom_out(self.config);
        }
    }

    /// Feeds this frame's pointer input through the gesture tracker, applying
    /// any pan. Returns the position of a completed click.
    fn handle_pointer(
        &mut self,
        ui: &egui::Ui,
        response: &egui::Response,
        rect: Rect,
    ) -> Option<Pos2> {
        let (pressed, released, pos) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        let tracker = &mut self.state.pointer;

        let Some(pos) = pos.filter(|p| rect.contains(*p)) else {
            tracker.leave();
            return None;
        };

        if pressed && response.contains_pointer() {
            tracker.press(pos);
        }
        if let Some(delta) = tracker.move_to(pos) {
            self.state.view.pan(delta);
        }
        if released {
            return match tracker.release(pos) {
                Release::Click(at) => Some(at),
                Release::DragEnd | Release::Ignored => None,
            };
        }
        None
    }

    /// Floating zoom/reset/full-screen buttons. Returns true when full screen
    /// was requested.
    fn show_controls(&mut self, ui: &egui::Ui, rect: Rect) -> bool {
        let margin = 12.0;
        let mut full_screen = false;

        egui::Area::new(controls_id(self.map))
            .pivot(Align2::RIGHT_TOP)
            .fixed_pos(rect.right_top() + vec2(-margin, margin))
            .interactable(true)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if self.full_screen_button
                                && ui.button("⛶").on_hover_text("Full screen").clicked()
                            {
                                full_screen = true;
                            }
                            if ui.button("+").on_hover_text("Zoom in (+)").clicked() {
                                self.state.view.zoom_in(self.config);
                            }
                            if ui.button("−").on_hover_text("Zoom out (-)").clicked() {
                                self.state.view.zoom_out(self.config);
                            }
                            if ui.button("⟲").on_hover_text("Reset view (0)").clicked() {
                                self.state.view.reset();
                            }
                            ui.label(format!("{:.0}%", self.state.view.scale * 100.0));
                        });
                    });
            });

        full_screen
    }
}

/// Layer id of the floating controls of the canvas showing `map`.
pub fn controls_id(map: &Map) -> egui::Id {
    egui::Id::new(("canvas_controls", &map.id))
}

/// World-space range of `rect`, limited to `bounds`.
fn visible_range(rect: Rect, bounds: &ViewBounds, projection: &Projection) -> (f64, f64, f64, f64) {
    let (left, top) = projection.screen_to_world(rect.left_top());
    let (right, bottom) = projection.screen_to_world(rect.right_bottom());
    (
        left.max(bounds.min_x),
        right.min(bounds.max_x),
        top.max(bounds.min_z),
        bottom.min(bounds.max_z),
    )
}

fn draw_grid(
    painter: &Painter,
    rect: Rect,
    bounds: &ViewBounds,
    projection: &Projection,
    config: &ViewConfig,
) {
    let (min_x, max_x, min_z, max_z) = visible_range(rect, bounds, projection);
    let levels = [
        (config.grid_size, Stroke::new(1.0, colors::GRID_MINOR)),
        (config.major_grid_size(), Stroke::new(2.0, colors::GRID_MAJOR)),
    ];

    for (spacing, stroke) in levels {
        if spacing * projection.scale() < MIN_GRID_PIXELS {
            continue;
        }
        for x in projection::grid_lines(min_x, max_x, spacing) {
            painter.line_segment(
                [
                    projection.world_to_screen(x, bounds.min_z),
                    projection.world_to_screen(x, bounds.max_z),
                ],
                stroke,
            );
        }
        for z in projection::grid_lines(min_z, max_z, spacing) {
            painter.line_segment(
                [
                    projection.world_to_screen(bounds.min_x, z),
                    projection.world_to_screen(bounds.max_x, z),
                ],
                stroke,
            );
        }
    }
}

fn draw_axes(painter: &Painter, bounds: &ViewBounds, projection: &Projection) {
    let stroke = Stroke::new(3.0, colors::AXIS);
    painter.line_segment(
        [
            projection.world_to_screen(bounds.min_x, 0.0),
            projection.world_to_screen(bounds.max_x, 0.0),
        ],
        stroke,
    );
    painter.line_segment(
        [
            projection.world_to_screen(0.0, bounds.min_z),
            projection.world_to_screen(0.0, bounds.max_z),
        ],
        stroke,
    );
}

/// Font size for text whose size is defined in blocks: `min_blocks` on
/// screen, but never below `min_px`.
fn font_px(projection: &Projection, min_px: f32, min_blocks: f64) -> f32 {
    projection
        .to_screen_len(min_blocks)
        .max(min_px)
        .min(MAX_CANVAS_FONT)
}

fn draw_axis_labels(
    painter: &Painter,
    rect: Rect,
    bounds: &ViewBounds,
    projection: &Projection,
    config: &ViewConfig,
) {
    let font = FontId::monospace(font_px(projection, 18.0, 14.0));
    let interval = projection::label_interval(projection.scale(), config.min_label_spacing);
    let (min_x, max_x, min_z, max_z) = visible_range(rect, bounds, projection);

    for x in projection::label_ticks(min_x, max_x, interval) {
        let anchor = projection.world_to_screen(x, 0.0) + vec2(0.0, -18.0);
        label_with_background(painter, anchor, Align2::CENTER_BOTTOM, &format_tick(x), &font);
    }
    for z in projection::label_ticks(min_z, max_z, interval) {
        let anchor = projection.world_to_screen(0.0, z) + vec2(-18.0, 0.0);
        label_with_background(painter, anchor, Align2::RIGHT_CENTER, &format_tick(z), &font);
    }

    let origin = projection.world_to_screen(0.0, 0.0) + vec2(-8.0, -8.0);
    label_with_background(painter, origin, Align2::RIGHT_BOTTOM, "0", &font);
}

fn format_tick(value: f64) -> String {
    format!("{value:.0}")
}

fn label_with_background(painter: &Painter, anchor: Pos2, align: Align2, text: &str, font: &FontId) {
    let galley = painter.layout_no_wrap(text.to_owned(), font.clone(), colors::AXIS_LABEL_TEXT);
    let text_rect = align.anchor_size(anchor, galley.size());
    painter.rect_filled(text_rect.expand(4.0), 2.0, colors::AXIS_LABEL_BACKGROUND);
    painter.galley(text_rect.min, galley, colors::AXIS_LABEL_TEXT);
}

fn draw_markers(
    painter: &Painter,
    rect: Rect,
    map: &Map,
    selected: Option<&str>,
    projection: &Projection,
    config: &ViewConfig,
) {
    let label_font = FontId::monospace(font_px(projection, 16.0, 12.0));
    let coord_font = FontId::monospace(font_px(projection, 12.0, 10.0));
    let visible = rect.expand(MARKER_CULL_MARGIN);

    for coordinate in &map.coordinates {
        let is_selected = selected == Some(coordinate.id.as_str());
        let center = projection.world_to_screen(f64::from(coordinate.x), f64::from(coordinate.z));
        if !visible.contains(center) {
            continue;
        }

        let size = projection.to_screen_len(projection::marker_size(
            projection.scale(),
            is_selected,
            config,
        ));
        draw_marker(painter, center, size, coordinate, is_selected);

        let half = size / 2.0;
        bubble(
            painter,
            center + vec2(0.0, -half - 6.0),
            Align2::CENTER_BOTTOM,
            &coordinate.label,
            &label_font,
            colors::BUBBLE_LABEL_TEXT,
        );
        bubble(
            painter,
            center + vec2(0.0, half + 6.0),
            Align2::CENTER_TOP,
            &format!("({}, {}, {})", coordinate.x, coordinate.y, coordinate.z),
            &coord_font,
            colors::BUBBLE_COORD_TEXT,
        );
    }
}

fn draw_marker(painter: &Painter, center: Pos2, size: f32, coordinate: &Coordinate, selected: bool) {
    let block = Rect::from_center_size(center, vec2(size, size));
    painter.rect_filled(block, 0.0, colors::marker_fill(coordinate));

    let outline = if selected {
        colors::MARKER_SELECTED_OUTLINE
    } else {
        colors::MARKER_OUTLINE
    };
    painter.rect_stroke(
        block,
        0.0,
        Stroke::new(3.0, outline),
        egui::StrokeKind::Outside,
    );

    if !selected {
        let highlight = Rect::from_min_size(block.min, block.size() / 3.0);
        painter.rect_filled(highlight, 0.0, colors::MARKER_HIGHLIGHT);
    }
}

fn bubble(
    painter: &Painter,
    anchor: Pos2,
    align: Align2,
    text: &str,
    font: &FontId,
    color: Color32,
) {
    let galley = painter.layout_no_wrap(text.to_owned(), font.clone(), color);
    let padding = vec2(6.0, 2.0);
    let outer = align.anchor_size(anchor, galley.size() + padding * 2.0);
    painter.rect_filled(outer, 2.0, colors::BUBBLE_BACKGROUND);
    painter.galley(outer.min + padding, galley, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use coord_map::{MapDetails, MapStore, NewCoordinate};

    const SCREEN: egui::Vec2 = egui::vec2(1200.0, 800.0);

    fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, SCREEN)),
            events,
            ..Default::default()
        }
    }

    fn button(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn sample_map() -> Map {
        let mut store = MapStore::new();
        let map_id = store
            .create_map(MapDetails::new("World", "").unwrap())
            .id
            .clone();
        store
            .bulk_import(
                &map_id,
                vec![
                    NewCoordinate::new("Home", 100, 64, 200),
                    NewCoordinate::new("Mine", -50, 12, 150),
                    NewCoordinate::new("Tower", 600, 140, -300),
                ],
            )
            .unwrap();
        store.map(&map_id).unwrap().clone()
    }

    /// Runs one frame with the canvas filling the central panel.
    fn frame(
        ctx: &egui::Context,
        map: &Map,
        selected: Option<&str>,
        state: &mut CanvasState,
        config: &ViewConfig,
        events: Vec<egui::Event>,
    ) -> (Rect, Vec<CanvasEvent>) {
        frame_with_button(ctx, map, selected, state, config, false, events)
    }

    fn frame_with_button(
        ctx: &egui::Context,
        map: &Map,
        selected: Option<&str>,
        state: &mut CanvasState,
        config: &ViewConfig,
        full_screen_button: bool,
        events: Vec<egui::Event>,
    ) -> (Rect, Vec<CanvasEvent>) {
        let mut result = (Rect::NOTHING, Vec::new());
        let _ = ctx.run(raw_input(events), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let output = MapCanvas::new(map, selected, state, config)
                    .full_screen_button(full_screen_button)
                    .show(ui);
                result = (output.response.rect, output.events);
            });
        });
        result
    }

    fn wheel(delta_y: f32) -> egui::Event {
        egui::Event::MouseWheel {
            unit: egui::MouseWheelUnit::Point,
            delta: vec2(0.0, delta_y),
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// A point on the first button of the floating controls.
    fn first_control(ctx: &egui::Context, map: &Map) -> Pos2 {
        let area = ctx
            .memory(|m| m.area_rect(controls_id(map)))
            .expect("controls were shown");
        area.min + vec2(14.0, 14.0)
    }

    fn marker_screen_pos(rect: Rect, map: &Map, state: &CanvasState, config: &ViewConfig, index: usize) -> Pos2 {
        let bounds = ViewBounds::from_coordinates(&map.coordinates, config);
        let projection = Projection::new(&bounds, rect, &state.view, config).unwrap();
        let c = &map.coordinates[index];
        projection.world_to_screen(f64::from(c.x), f64::from(c.z))
    }

    #[test]
    fn idle_frame_emits_nothing() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        let (rect, events) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        assert!(rect.width() > 0.0 && rect.height() > 0.0);
        assert!(events.is_empty());
    }

    #[test]
    fn clicking_marker_selects_it() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        let (rect, _) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        let target = marker_screen_pos(rect, &map, &state, &config, 1);

        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(target)]);
        let (_, events) = frame(
            &ctx,
            &map,
            None,
            &mut state,
            &config,
            vec![button(target, true), button(target, false)],
        );

        assert!(events.contains(&CanvasEvent::SelectionChanged(Some(
            map.coordinates[1].id.clone()
        ))));
    }

    #[test]
    fn dragging_pans_without_selecting() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        let (rect, _) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        let start = marker_screen_pos(rect, &map, &state, &config, 0);
        let end = start + vec2(60.0, 25.0);

        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(start)]);
        frame(&ctx, &map, None, &mut state, &config, vec![button(start, true)]);
        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(end)]);
        let (_, events) = frame(&ctx, &map, None, &mut state, &config, vec![button(end, false)]);

        assert!((state.view.offset - vec2(60.0, 25.0)).length() < 1e-3);
        assert!(events.is_empty());
    }

    #[test]
    fn leaving_canvas_cancels_press() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        let (rect, _) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        let start = marker_screen_pos(rect, &map, &state, &config, 0);
        let outside = rect.left_top() - vec2(4.0, 4.0);

        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(start)]);
        frame(&ctx, &map, None, &mut state, &config, vec![button(start, true)]);
        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(outside)]);
        let (_, events) = frame(&ctx, &map, None, &mut state, &config, vec![button(outside, false)]);

        assert_eq!(state.view.offset, egui::Vec2::ZERO);
        assert!(events.is_empty());
    }

    #[test]
    fn clicking_empty_ground_clears_selection() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);
        let selected = map.coordinates[0].id.clone();

        let (rect, _) = frame(&ctx, &map, Some(&selected), &mut state, &config, vec![]);
        let empty = rect.left_bottom() + vec2(20.0, -20.0);

        frame(&ctx, &map, Some(&selected), &mut state, &config, vec![egui::Event::PointerMoved(empty)]);
        frame(&ctx, &map, Some(&selected), &mut state, &config, vec![button(empty, true)]);
        let (_, events) = frame(&ctx, &map, Some(&selected), &mut state, &config, vec![button(empty, false)]);

        assert_eq!(events, vec![CanvasEvent::SelectionChanged(None)]);
    }

    #[test]
    fn double_click_on_marker_keeps_it_selected_and_zooms() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);
        let tower = map.coordinates[2].id.clone();

        let (rect, _) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        let target = marker_screen_pos(rect, &map, &state, &config, 2);

        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(target)]);
        frame(&ctx, &map, None, &mut state, &config, vec![button(target, true)]);
        let (_, first) = frame(&ctx, &map, None, &mut state, &config, vec![button(target, false)]);
        assert_eq!(first, vec![CanvasEvent::SelectionChanged(Some(tower.clone()))]);
        assert_eq!(state.view.scale, 1.0);

        frame(&ctx, &map, Some(&tower), &mut state, &config, vec![button(target, true)]);
        let (_, second) = frame(&ctx, &map, Some(&tower), &mut state, &config, vec![button(target, false)]);
        assert_eq!(second, vec![CanvasEvent::SelectionChanged(Some(tower))]);
        assert!((state.view.scale - config.zoom_step).abs() < 1e-9);
    }

    #[test]
    fn scroll_wheel_zooms_in_and_out() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        let (rect, _) = frame(&ctx, &map, None, &mut state, &config, vec![]);
        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(rect.center())]);

        frame(&ctx, &map, None, &mut state, &config, vec![wheel(40.0)]);
        assert!((state.view.scale - 1.2).abs() < 1e-9);

        frame(&ctx, &map, None, &mut state, &config, vec![wheel(-40.0)]);
        frame(&ctx, &map, None, &mut state, &config, vec![wheel(-40.0)]);
        assert!((state.view.scale - 1.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn full_screen_button_requests_full_screen() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        frame_with_button(&ctx, &map, None, &mut state, &config, true, vec![]);
        frame_with_button(&ctx, &map, None, &mut state, &config, true, vec![]);
        let target = first_control(&ctx, &map);

        frame_with_button(&ctx, &map, None, &mut state, &config, true, vec![egui::Event::PointerMoved(target)]);
        frame_with_button(&ctx, &map, None, &mut state, &config, true, vec![button(target, true)]);
        let (_, events) =
            frame_with_button(&ctx, &map, None, &mut state, &config, true, vec![button(target, false)]);

        assert_eq!(events, vec![CanvasEvent::FullScreenRequested]);
        assert_eq!(state.view.scale, 1.0);
    }

    #[test]
    fn controls_without_full_screen_button_zoom_instead() {
        let ctx = egui::Context::default();
        let map = sample_map();
        let config = ViewConfig::default();
        let mut state = CanvasState::new(&config);

        frame(&ctx, &map, None, &mut state, &config, vec![]);
        frame(&ctx, &map, None, &mut state, &config, vec![]);
        let target = first_control(&ctx, &map);

        frame(&ctx, &map, None, &mut state, &config, vec![egui::Event::PointerMoved(target)]);
        frame(&ctx, &map, None, &mut state, &config, vec![button(target, true)]);
        let (_, events) = frame(&ctx, &map, None, &mut state, &config, vec![button(target, false)]);

        assert!(events.is_empty());
        assert!((state.view.scale - 1.2).abs() < 1e-9);
    }
}
