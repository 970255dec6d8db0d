//! Pointer gesture tracking for the map canvas.
//!
//! A press only turns into a pan once the pointer has travelled past the
//! drag threshold. Releasing before that is a click; releasing after it
//! just ends the pan, so a drag never doubles as a selection.

use eframe::egui::{Pos2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    /// Button down, not yet moved far enough to pan
    Pressed { origin: Pos2 },
    /// Panning; `last` is the previous pointer position
    Dragging { last: Pos2 },
}

/// What a pointer release turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Selection attempt at this position
    Click(Pos2),
    /// End of a pan
    DragEnd,
    /// Nothing was pressed
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerTracker {
    state: PointerState,
    threshold: f32,
}

impl PointerTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: PointerState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    pub fn press(&mut self, pos: Pos2) {
        self.state = PointerState::Pressed { origin: pos };
    }

    /// Returns the pan delta produced by this move, if any.
    ///
    /// When a press first crosses the threshold the whole distance from the
    /// press origin is returned, so the map stays under the pointer.
    pub fn move_to(&mut self, pos: Pos2) -> Option<Vec2> {
        match self.state {
            PointerState::Idle => None,
            PointerState::Pressed { origin } => {
                if origin.distance(pos) < self.threshold {
                    return None;
                }
                self.state = PointerState::Dragging { last: pos };
                Some(pos - origin)
            }
            PointerState::Dragging { last } => {
                self.state = PointerState::Dragging { last: pos };
                let delta = pos - last;
                (delta != Vec2::ZERO).then_some(delta)
            }
        }
    }

    pub fn release(&mut self, pos: Pos2) -> Release {
        let release = match self.state {
            PointerState::Idle => Release::Ignored,
            PointerState::Pressed { .. } => Release::Click(pos),
            PointerState::Dragging { .. } => Release::DragEnd,
        };
        self.state = PointerState::Idle;
        release
    }

    /// Pointer left the canvas: drop any gesture without clicking.
    pub fn leave(&mut self) {
        self.state = PointerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut tracker = PointerTracker::new(3.0);
        tracker.press(pos2(10.0, 10.0));
        assert_eq!(tracker.move_to(pos2(11.0, 11.0)), None);
        assert_eq!(tracker.release(pos2(11.0, 11.0)), Release::Click(pos2(11.0, 11.0)));
        assert_eq!(tracker.state(), PointerState::Idle);
    }

    #[test]
    fn crossing_threshold_starts_pan_with_full_delta() {
        let mut tracker = PointerTracker::new(3.0);
        tracker.press(pos2(10.0, 10.0));
        assert_eq!(tracker.move_to(pos2(15.0, 10.0)), Some(vec2(5.0, 0.0)));
        assert!(tracker.is_dragging());
        assert_eq!(tracker.move_to(pos2(15.0, 22.0)), Some(vec2(0.0, 12.0)));
        assert_eq!(tracker.move_to(pos2(15.0, 22.0)), None);
    }

    #[test]
    fn release_after_drag_does_not_click() {
        let mut tracker = PointerTracker::new(3.0);
        tracker.press(pos2(0.0, 0.0));
        tracker.move_to(pos2(40.0, 0.0));
        assert_eq!(tracker.release(pos2(40.0, 0.0)), Release::DragEnd);
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn leaving_cancels_gesture() {
        let mut tracker = PointerTracker::new(3.0);
        tracker.press(pos2(0.0, 0.0));
        tracker.move_to(pos2(40.0, 0.0));
        tracker.leave();
        assert_eq!(tracker.move_to(pos2(80.0, 0.0)), None);
        assert_eq!(tracker.release(pos2(80.0, 0.0)), Release::Ignored);
    }

    #[test]
    fn moves_without_press_do_nothing() {
        let mut tracker = PointerTracker::new(3.0);
        assert_eq!(tracker.move_to(pos2(5.0, 5.0)), None);
        assert_eq!(tracker.release(pos2(5.0, 5.0)), Release::Ignored);
    }
}
