//! Time-based interpolation for scene attributes.

use kurbo::Point;

/// Values that can be blended linearly.
pub trait Lerp: Clone + PartialEq {
	/// Value at `t` between `self` (0) and `other` (1).
	fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		self + (other - self) * t
	}
}

impl Lerp for Point {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		Point::lerp(*self, *other, t)
	}
}

/// Cubic in-out easing.
pub fn ease_in_out_cubic(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// A value moving from `from` to `to` over a fixed duration.
///
/// Retargeting starts a new transition from wherever the old one currently
/// is, so an interrupted animation never jumps.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
	from: T,
	to: T,
	start_ms: f64,
	duration_ms: f64,
}

impl<T: Lerp> Tween<T> {
	/// A tween already at rest on `value`.
	pub fn settled(value: T) -> Self {
		Self {
			from: value.clone(),
			to: value,
			start_ms: 0.0,
			duration_ms: 0.0,
		}
	}

	/// A tween from `from` to `to` starting at `now`.
	pub fn new(from: T, to: T, now: f64, duration_ms: f64) -> Self {
		Self {
			from,
			to,
			start_ms: now,
			duration_ms,
		}
	}

	/// Eased progress in `[0, 1]`.
	pub fn progress(&self, now: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			return 1.0;
		}
		ease_in_out_cubic((now - self.start_ms) / self.duration_ms)
	}

	/// Value at `now`.
	pub fn sample(&self, now: f64) -> T {
		let t = self.progress(now);
		if t >= 1.0 {
			self.to.clone()
		} else {
			self.from.lerp(&self.to, t)
		}
	}

	/// Final value.
	pub fn target(&self) -> &T {
		&self.to
	}

	/// Whether the transition has finished at `now`.
	pub fn is_done(&self, now: f64) -> bool {
		self.duration_ms <= 0.0 || now >= self.start_ms + self.duration_ms
	}

	/// Head for `to` from the current value. Keeps running if `to` is already the target.
	pub fn retarget(&mut self, to: T, now: f64, duration_ms: f64) {
		if self.to == to {
			return;
		}
		self.from = self.sample(now);
		self.to = to;
		self.start_ms = now;
		self.duration_ms = duration_ms;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn easing_hits_endpoints_and_midpoint() {
		assert_eq!(ease_in_out_cubic(0.0), 0.0);
		assert_eq!(ease_in_out_cubic(0.5), 0.5);
		assert_eq!(ease_in_out_cubic(1.0), 1.0);
		assert_eq!(ease_in_out_cubic(3.0), 1.0);
	}

	#[test]
	fn tween_samples_over_time() {
		let tween = Tween::new(0.0, 10.0, 100.0, 200.0);
		assert_eq!(tween.sample(100.0), 0.0);
		assert_eq!(tween.sample(200.0), 5.0);
		assert_eq!(tween.sample(400.0), 10.0);
		assert!(!tween.is_done(250.0));
		assert!(tween.is_done(300.0));
	}

	#[test]
	fn retarget_continues_from_current_value() {
		let mut tween = Tween::new(0.0, 10.0, 0.0, 100.0);
		tween.retarget(20.0, 50.0, 100.0);
		assert_eq!(tween.sample(50.0), 5.0);
		assert_eq!(tween.sample(150.0), 20.0);

		let before = tween.clone();
		tween.retarget(20.0, 120.0, 100.0);
		assert_eq!(tween, before);
	}
}
