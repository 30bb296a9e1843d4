//! Pointer, wheel and touch input reduced to camera actions.

use kurbo::{Point, Vec2};

/// `WheelEvent.deltaMode` for line-based deltas.
pub const DELTA_LINE: u32 = 1;

/// A wheel event stripped of DOM specifics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelInput {
	/// Raw `(deltaX, deltaY)`.
	pub delta: Vec2,
	/// `deltaMode`: 0 pixels, 1 lines, 2 pages.
	pub delta_mode: u32,
	/// Control key held.
	pub ctrl: bool,
	/// Meta (command) key held.
	pub meta: bool,
	/// Pointer position relative to the canvas.
	pub position: Point,
}

/// What a wheel event does to the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WheelAction {
	/// Scroll the view by a surface-space delta.
	Pan(Vec2),
	/// Scale by `factor` around `anchor`.
	Zoom {
		/// Fixed point, canvas coordinates.
		anchor: Point,
		/// Multiplicative scale change.
		factor: f64,
	},
	/// Nothing to do.
	Ignore,
}

/// Route a wheel event: with Ctrl or Meta held it zooms around the pointer,
/// otherwise it scrolls. Never both.
pub fn classify_wheel(input: &WheelInput) -> WheelAction {
	if input.ctrl || input.meta {
		if input.delta.y == 0.0 {
			return WheelAction::Ignore;
		}
		let unit = match input.delta_mode {
			0 => 0.002,
			DELTA_LINE => 0.05,
			_ => 1.0,
		};
		let boost = if input.ctrl { 10.0 } else { 1.0 };
		let exponent = -input.delta.y * unit * boost;
		WheelAction::Zoom {
			anchor: input.position,
			factor: exponent.exp2(),
		}
	} else if input.delta == Vec2::ZERO {
		WheelAction::Ignore
	} else {
		WheelAction::Pan(-input.delta)
	}
}

/// Mouse drag bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A drag is in progress.
	pub active: bool,
	/// Last pointer position seen during the drag.
	pub last: Point,
	/// Total distance travelled, used to tell drags from clicks.
	pub travelled: f64,
}

/// Movement (px) past which a press counts as a drag rather than a click.
pub const CLICK_SLOP: f64 = 4.0;

impl PanState {
	/// Start a drag at `at`.
	pub fn begin(&mut self, at: Point) {
		self.active = true;
		self.last = at;
		self.travelled = 0.0;
	}

	/// Pointer moved; returns the screen delta to pan by while dragging.
	pub fn update(&mut self, at: Point) -> Option<Vec2> {
		if !self.active {
			return None;
		}
		let delta = at - self.last;
		self.last = at;
		self.travelled += delta.hypot();
		Some(delta)
	}

	/// End the drag.
	pub fn end(&mut self) {
		self.active = false;
	}

	/// Whether the last press moved far enough to suppress the click it produces.
	pub fn was_drag(&self) -> bool {
		self.travelled > CLICK_SLOP
	}
}

/// Camera change derived from touch movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchAction {
	/// One finger: screen-space pan.
	Pan(Vec2),
	/// Two fingers: scale around the midpoint, then follow the midpoint.
	Pinch {
		/// Midpoint of the two touches, canvas coordinates.
		anchor: Point,
		/// Ratio of finger distances.
		factor: f64,
		/// Midpoint movement.
		pan: Vec2,
	},
}

/// Tracks active touch points between `touchmove` events.
#[derive(Clone, Debug, Default)]
pub struct TouchTracker {
	points: Vec<Point>,
}

impl TouchTracker {
	/// Replace the tracked set (touchstart, touchend).
	pub fn reset(&mut self, points: &[Point]) {
		self.points = points.to_vec();
	}

	/// Number of tracked touches.
	pub fn len(&self) -> usize {
		self.points.len()
	}

	/// No touches tracked.
	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	/// Fold in a touchmove. Touch counts other than one or two, or a change in
	/// count, only resynchronise the tracker.
	pub fn update(&mut self, points: &[Point]) -> Option<TouchAction> {
		let action = match (self.points.as_slice(), points) {
			([prev], [next]) => Some(TouchAction::Pan(*next - *prev)),
			([a0, b0], [a1, b1]) => {
				let before = (*b0 - *a0).hypot();
				let after = (*b1 - *a1).hypot();
				let mid0 = a0.midpoint(*b0);
				let mid1 = a1.midpoint(*b1);
				(before > 0.0).then(|| TouchAction::Pinch {
					anchor: mid0,
					factor: after / before,
					pan: mid1 - mid0,
				})
			}
			_ => None,
		};
		self.reset(points);
		action
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn wheel(dy: f64, ctrl: bool) -> WheelInput {
		WheelInput {
			delta: Vec2::new(0.0, dy),
			ctrl,
			position: Point::new(10.0, 20.0),
			..WheelInput::default()
		}
	}

	#[test]
	fn plain_wheel_pans_only() {
		assert_eq!(
			classify_wheel(&wheel(30.0, false)),
			WheelAction::Pan(Vec2::new(0.0, -30.0))
		);
		assert_eq!(classify_wheel(&wheel(0.0, false)), WheelAction::Ignore);
	}

	#[test]
	fn modified_wheel_zooms_only() {
		let WheelAction::Zoom { anchor, factor } = classify_wheel(&wheel(-50.0, true)) else {
			panic!("expected zoom");
		};
		assert_eq!(anchor, Point::new(10.0, 20.0));
		assert!((factor - 2.0).abs() < 1e-12);

		let meta = WheelInput {
			meta: true,
			..wheel(50.0, false)
		};
		let WheelAction::Zoom { factor, .. } = classify_wheel(&meta) else {
			panic!("expected zoom");
		};
		assert!((factor - (-0.1f64).exp2()).abs() < 1e-12);
	}

	#[test]
	fn meta_wheel_is_not_boosted() {
		let plain = WheelInput {
			meta: true,
			..wheel(-50.0, false)
		};
		let WheelAction::Zoom { factor, .. } = classify_wheel(&plain) else {
			panic!("expected zoom");
		};
		assert!((factor - 0.1f64.exp2()).abs() < 1e-12);

		let both = WheelInput {
			meta: true,
			..wheel(-50.0, true)
		};
		let WheelAction::Zoom { factor, .. } = classify_wheel(&both) else {
			panic!("expected zoom");
		};
		assert!((factor - 2.0).abs() < 1e-12);
	}

	#[test]
	fn line_mode_scales_delta() {
		let input = WheelInput {
			delta_mode: DELTA_LINE,
			..wheel(-2.0, true)
		};
		let WheelAction::Zoom { factor, .. } = classify_wheel(&input) else {
			panic!("expected zoom");
		};
		assert!((factor - 2.0).abs() < 1e-12);
	}

	#[test]
	fn drag_tracks_distance() {
		let mut pan = PanState::default();
		assert_eq!(pan.update(Point::new(5.0, 5.0)), None);
		pan.begin(Point::new(0.0, 0.0));
		assert_eq!(pan.update(Point::new(3.0, 4.0)), Some(Vec2::new(3.0, 4.0)));
		assert!(pan.was_drag());
		pan.end();
		pan.begin(Point::new(0.0, 0.0));
		pan.update(Point::new(1.0, 1.0));
		assert!(!pan.was_drag());
	}

	#[test]
	fn touch_pan_and_pinch() {
		let mut touches = TouchTracker::default();
		touches.reset(&[Point::new(0.0, 0.0)]);
		assert_eq!(
			touches.update(&[Point::new(2.0, 3.0)]),
			Some(TouchAction::Pan(Vec2::new(2.0, 3.0)))
		);

		touches.reset(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
		let pinch = touches.update(&[Point::new(-5.0, 0.0), Point::new(15.0, 0.0)]);
		assert_eq!(
			pinch,
			Some(TouchAction::Pinch {
				anchor: Point::new(5.0, 0.0),
				factor: 2.0,
				pan: Vec2::ZERO,
			})
		);

		assert_eq!(touches.update(&[Point::new(1.0, 1.0)]), None);
		assert_eq!(touches.len(), 1);
	}
}
