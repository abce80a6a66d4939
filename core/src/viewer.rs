pub const DEFAULT_MIN_SCALE: f64 = 0.5;
pub const DEFAULT_MAX_SCALE: f64 = 5.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;
pub const MIN_SCALE_FLOOR: f64 = 1.0e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
}

impl Default for ViewerLimits {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl ViewerLimits {
    /// Builds limits from possibly user-supplied values: bounds are swapped
    /// when inverted and never drop below [`MIN_SCALE_FLOOR`].
    pub fn normalized(min_scale: f64, max_scale: f64, zoom_step: f64) -> Self {
        let defaults = Self::default();
        let min_scale = finite_or(min_scale, defaults.min_scale).max(MIN_SCALE_FLOOR);
        let max_scale = finite_or(max_scale, defaults.max_scale).max(MIN_SCALE_FLOOR);
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        let zoom_step = finite_or(zoom_step, defaults.zoom_step);
        let zoom_step = if zoom_step > 0.0 {
            zoom_step
        } else {
            defaults.zoom_step
        };
        Self {
            min_scale,
            max_scale,
            zoom_step,
        }
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return if scale > 0.0 {
                self.max_scale
            } else {
                self.min_scale
            };
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragAnchor {
    pub start_x: f64,
    pub start_y: f64,
    pub start_offset_x: f64,
    pub start_offset_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchBaseline {
    pub start_distance: f64,
    pub start_scale: f64,
}

/// Translate-then-scale transform with the scale applied around the
/// element's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        scale: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.offset_x, self.offset_y, self.scale
        )
    }

    /// Screen position, relative to the untransformed element origin, of a
    /// point given in the element's own unscaled pixels.
    pub fn project(&self, local: Point) -> Point {
        Point::new(
            self.offset_x + local.x * self.scale,
            self.offset_y + local.y * self.scale,
        )
    }
}

#[derive(Clone, Debug)]
pub struct ViewerState {
    limits: ViewerLimits,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    drag: Option<DragAnchor>,
    pinch: Option<PinchBaseline>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerLimits::default())
    }
}

impl ViewerState {
    pub fn new(limits: ViewerLimits) -> Self {
        Self {
            limits,
            scale: limits.clamp_scale(1.0),
            offset_x: 0.0,
            offset_y: 0.0,
            drag: None,
            pinch: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_anchor(&self) -> Option<DragAnchor> {
        self.drag
    }

    pub fn pinch_baseline(&self) -> Option<PinchBaseline> {
        self.pinch
    }

    pub fn transform(&self) -> ViewTransform {
        ViewTransform {
            scale: self.scale,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }

    /// One wheel step. `cursor_x`/`cursor_y` are relative to the image's
    /// current bounding box, so they already include the current scale.
    /// Returns whether the view changed.
    pub fn zoom_at(&mut self, delta_y: f64, cursor_x: f64, cursor_y: f64) -> bool {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return false;
        }
        let step = 1.0 + self.limits.zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        let old_scale = self.scale;
        let new_scale = self.limits.clamp_scale(old_scale * factor);
        let delta_scale = new_scale - old_scale;
        if delta_scale == 0.0 {
            return false;
        }
        let local_x = cursor_x / old_scale;
        let local_y = cursor_y / old_scale;
        self.scale = new_scale;
        self.offset_x -= local_x * delta_scale;
        self.offset_y -= local_y * delta_scale;
        true
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.drag = Some(DragAnchor {
            start_x: x,
            start_y: y,
            start_offset_x: self.offset_x,
            start_offset_y: self.offset_y,
        });
    }

    pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        self.offset_x = anchor.start_offset_x + (x - anchor.start_x);
        self.offset_y = anchor.start_offset_y + (y - anchor.start_y);
        true
    }

    /// Returns whether a drag was in progress.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn begin_pinch(&mut self, a: Point, b: Point) -> bool {
        self.drag = None;
        let distance = a.distance_to(b);
        if distance <= 0.0 || !distance.is_finite() {
            self.pinch = None;
            return false;
        }
        self.pinch = Some(PinchBaseline {
            start_distance: distance,
            start_scale: self.scale,
        });
        true
    }

    pub fn pinch_to(&mut self, a: Point, b: Point) -> bool {
        let Some(baseline) = self.pinch else {
            return false;
        };
        let distance = a.distance_to(b);
        if !distance.is_finite() {
            return false;
        }
        let next = self
            .limits
            .clamp_scale(baseline.start_scale * (distance / baseline.start_distance));
        if next == self.scale {
            return false;
        }
        self.scale = next;
        true
    }

    /// A pinch is tracked only while exactly two fingers are down; a third
    /// finger suspends both gestures.
    pub fn touch_start(&mut self, points: &[Point]) -> bool {
        match points {
            [] => false,
            [only] => {
                self.pinch = None;
                self.begin_drag(only.x, only.y);
                true
            }
            [a, b] => self.begin_pinch(*a, *b),
            _ => {
                self.drag = None;
                self.pinch = None;
                false
            }
        }
    }

    pub fn touch_move(&mut self, points: &[Point]) -> bool {
        match points {
            [only] => self.drag_to(only.x, only.y),
            [a, b] => self.pinch_to(*a, *b),
            _ => false,
        }
    }

    /// `remaining` are the fingers still down. Two of them start a fresh
    /// pinch baseline at the current scale.
    pub fn touch_end(&mut self, remaining: &[Point]) {
        self.drag = None;
        match remaining {
            [a, b] => {
                self.begin_pinch(*a, *b);
            }
            _ => self.pinch = None,
        }
    }

    pub fn reset(&mut self) {
        self.scale = self.limits.clamp_scale(1.0);
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.drag = None;
        self.pinch = None;
    }
}

pub const DEFAULT_DOUBLE_TAP_MS: f64 = 300.0;
pub const DEFAULT_DOUBLE_TAP_SLOP_PX: f64 = 30.0;

#[derive(Clone, Copy, Debug)]
pub struct DoubleTapDetector {
    window_ms: f64,
    slop_px: f64,
    last: Option<(Point, f64)>,
}

impl Default for DoubleTapDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_MS, DEFAULT_DOUBLE_TAP_SLOP_PX)
    }
}

impl DoubleTapDetector {
    pub fn new(window_ms: f64, slop_px: f64) -> Self {
        Self {
            window_ms,
            slop_px,
            last: None,
        }
    }

    /// Records a completed tap and reports whether it closes a double tap.
    pub fn tap(&mut self, at: Point, now_ms: f64) -> bool {
        if let Some((prev, prev_ms)) = self.last.take() {
            let elapsed = now_ms - prev_ms;
            if elapsed >= 0.0 && elapsed <= self.window_ms && prev.distance_to(at) <= self.slop_px {
                return true;
            }
        }
        self.last = Some((at, now_ms));
        false
    }

    pub fn cancel(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-9,
            "expected {:.9} got {:.9} (delta {:.9})",
            expected,
            actual,
            delta
        );
    }

    #[test]
    fn zoom_in_and_out_use_reciprocal_factors() {
        let mut state = ViewerState::default();
        assert!(state.zoom_at(-120.0, 0.0, 0.0));
        assert_close(state.scale(), 1.1);
        assert!(state.zoom_at(120.0, 0.0, 0.0));
        assert_close(state.scale(), 1.0);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let mut state = ViewerState::default();
        assert!(!state.zoom_at(0.0, 10.0, 10.0));
        assert_eq!(state.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn zoom_at_unit_scale_moves_offset_by_cursor_times_delta() {
        let mut state = ViewerState::default();
        state.zoom_at(-1.0, 100.0, 50.0);
        let (x, y) = state.offset();
        assert_close(x, -10.0);
        assert_close(y, -5.0);
    }

    #[test]
    fn zoom_clamped_at_bounds_reports_no_change() {
        let mut state = ViewerState::default();
        for _ in 0..100 {
            state.zoom_at(-1.0, 3.0, 4.0);
        }
        assert_close(state.scale(), DEFAULT_MAX_SCALE);
        let before = state.transform();
        assert!(!state.zoom_at(-1.0, 3.0, 4.0));
        assert_eq!(state.transform(), before);
    }

    #[test]
    fn zero_distance_pinch_is_a_no_op() {
        let mut state = ViewerState::default();
        let p = Point::new(5.0, 5.0);
        assert!(!state.begin_pinch(p, p));
        assert!(state.pinch_baseline().is_none());
        assert!(!state.pinch_to(p, Point::new(50.0, 5.0)));
        assert_close(state.scale(), 1.0);
    }

    #[test]
    fn second_finger_switches_drag_to_pinch() {
        let mut state = ViewerState::default();
        state.touch_start(&[Point::new(10.0, 10.0)]);
        assert!(state.is_dragging());
        state.touch_start(&[Point::new(10.0, 10.0), Point::new(110.0, 10.0)]);
        assert!(!state.is_dragging());
        assert!(state.pinch_baseline().is_some());
        state.touch_move(&[Point::new(10.0, 10.0), Point::new(210.0, 10.0)]);
        assert_close(state.scale(), 2.0);
    }

    #[test]
    fn touch_end_with_one_finger_left_clears_pinch_and_drag() {
        let mut state = ViewerState::default();
        state.touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        state.touch_end(&[Point::new(0.0, 0.0)]);
        assert!(state.pinch_baseline().is_none());
        assert!(!state.is_dragging());
        assert!(!state.touch_move(&[Point::new(40.0, 40.0)]));
    }

    #[test]
    fn lifting_third_finger_rebaselines_on_the_remaining_pair() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);
        let c = Point::new(400.0, 0.0);
        let mut state = ViewerState::default();
        state.touch_start(&[a, b]);
        state.touch_start(&[a, b, c]);
        assert!(state.pinch_baseline().is_none());
        assert!(!state.touch_move(&[a, b, c]));

        state.touch_end(&[b, c]);
        let baseline = state.pinch_baseline().expect("pair left down pinches");
        assert_close(baseline.start_distance, 300.0);
        assert_close(baseline.start_scale, 1.0);
        assert!(!state.touch_move(&[b, c]));
        assert_close(state.scale(), 1.0);

        state.touch_move(&[b, Point::new(700.0, 0.0)]);
        assert_close(state.scale(), 2.0);
    }

    #[test]
    fn limits_normalize_inverted_bounds() {
        let limits = ViewerLimits::normalized(4.0, 0.25, -1.0);
        assert_close(limits.min_scale, 0.25);
        assert_close(limits.max_scale, 4.0);
        assert_close(limits.zoom_step, DEFAULT_ZOOM_STEP);
        let limits = ViewerLimits::normalized(0.0, f64::NAN, 0.2);
        assert_close(limits.min_scale, MIN_SCALE_FLOOR);
        assert_close(limits.max_scale, DEFAULT_MAX_SCALE);
    }

    #[test]
    fn css_is_translate_then_scale() {
        let transform = ViewTransform {
            scale: 1.5,
            offset_x: -12.0,
            offset_y: 8.5,
        };
        assert_eq!(transform.to_css(), "translate(-12px, 8.5px) scale(1.5)");
    }

    #[test]
    fn double_tap_needs_two_close_taps_inside_window() {
        let mut taps = DoubleTapDetector::default();
        assert!(!taps.tap(Point::new(0.0, 0.0), 0.0));
        assert!(taps.tap(Point::new(5.0, 5.0), 200.0));
        assert!(!taps.tap(Point::new(5.0, 5.0), 1000.0));
        assert!(!taps.tap(Point::new(200.0, 5.0), 1100.0));
        assert!(!taps.tap(Point::new(200.0, 5.0), 1500.0));
    }
}
