//! Camera transform and surface sizing.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use log::{debug, warn};

use super::config::TreeConfig;
use super::tween::{Lerp, Tween};

/// Pan and zoom applied to the drawing group, on top of the configured margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl Lerp for ViewTransform {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		Self {
			x: Lerp::lerp(&self.x, &other.x, t),
			y: Lerp::lerp(&self.y, &other.y, t),
			k: Lerp::lerp(&self.k, &other.k, t),
		}
	}
}

impl ViewTransform {
	/// Full surface-to-screen mapping including the group margin.
	pub fn to_affine(&self, config: &TreeConfig) -> Affine {
		Affine::translate((config.margin.x0 + self.x, config.margin.y0 + self.y))
			* Affine::scale(self.k)
	}

	/// Map a screen point back to surface coordinates.
	pub fn invert(&self, screen: Point, config: &TreeConfig) -> Point {
		self.to_affine(config).inverse() * screen
	}
}

/// Reasons a fit or bounds pass was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
	/// No visible content, or content without area.
	#[error("content has no area ({0:?})")]
	DegenerateContent(Size),
	/// The hosting container has no area.
	#[error("container has no area ({0:?})")]
	DegenerateContainer(Size),
}

/// Camera state plus the extents of the drawing surface.
///
/// Panning and zooming are bounded by the surface: it may be dragged towards
/// any edge of the container, but never entirely out of it.
#[derive(Clone, Debug)]
pub struct Viewport {
	transform: Tween<ViewTransform>,
	content: Option<Rect>,
	/// Content bounds plus padding, in surface coordinates.
	surface: Option<Rect>,
	container: Size,
	fitted: bool,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			transform: Tween::settled(ViewTransform::default()),
			content: None,
			surface: None,
			container: Size::ZERO,
			fitted: false,
		}
	}
}

impl Viewport {
	/// Transform to draw with at `now`.
	pub fn transform(&self, now: f64) -> ViewTransform {
		self.transform.sample(now)
	}

	/// Transform the camera is heading for.
	pub fn target(&self) -> ViewTransform {
		*self.transform.target()
	}

	/// Content bounds from the last successful [`Viewport::recompute_bounds`].
	pub fn content_bounds(&self) -> Option<Rect> {
		self.content
	}

	/// Surface extents: content bounds plus padding on every side.
	pub fn surface(&self) -> Option<Rect> {
		self.surface
	}

	/// Size of [`Viewport::surface`], zero before any content was measured.
	pub fn surface_size(&self) -> Size {
		self.surface.map(|s| s.size()).unwrap_or(Size::ZERO)
	}

	/// Surface extents mapped to screen pixels at `now`.
	pub fn surface_on_screen(&self, config: &TreeConfig, now: f64) -> Option<Rect> {
		let affine = self.transform(now).to_affine(config);
		self.surface.map(|s| affine.transform_rect_bbox(s))
	}

	/// Whether the camera has stopped moving at `now`.
	pub fn is_idle(&self, now: f64) -> bool {
		self.transform.is_done(now)
	}

	/// Whether the first auto-fit has happened.
	pub fn is_fitted(&self) -> bool {
		self.fitted
	}

	/// Bounding box of the given node rectangles (centre and size). The
	/// surface is resized to that box plus padding. Empty or flat content
	/// leaves the previous bounds in place.
	pub fn recompute_bounds(
		&mut self,
		nodes: impl IntoIterator<Item = (Point, Size)>,
		config: &TreeConfig,
	) -> Result<Rect, ViewportError> {
		let bounds = nodes
			.into_iter()
			.map(|(center, size)| Rect::from_center_size(center, size))
			.reduce(|a, b| a.union(b));
		let Some(bounds) = bounds.filter(|b| b.width() > 0.0 && b.height() > 0.0) else {
			let size = bounds.map(|b| b.size()).unwrap_or(Size::ZERO);
			return Err(ViewportError::DegenerateContent(size));
		};
		let padding = config.surface_padding;
		self.content = Some(bounds);
		self.surface = Some(bounds.inflate(padding, padding));
		Ok(bounds)
	}

	/// Centre and scale the content inside `container`, animating from the
	/// current transform. Degenerate geometry is skipped and the previous
	/// transform kept.
	pub fn auto_fit(
		&mut self,
		container: Size,
		config: &TreeConfig,
		now: f64,
	) -> Result<ViewTransform, ViewportError> {
		let content = self
			.content
			.ok_or(ViewportError::DegenerateContent(Size::ZERO))?;
		if content.width() <= 0.0 || content.height() <= 0.0 {
			return Err(ViewportError::DegenerateContent(content.size()));
		}
		if container.width <= 0.0 || container.height <= 0.0 {
			return Err(ViewportError::DegenerateContainer(container));
		}
		self.container = container;

		let k = fit_scale(content.size(), container, config);
		let center = content.center();
		let target = ViewTransform {
			x: container.width / 2.0 - config.margin.x0 - center.x * k,
			y: container.height / 2.0 - config.margin.y0 - center.y * k,
			k,
		};
		self.transform = Tween::new(self.transform(now), target, now, config.fit_transition_ms);
		self.fitted = true;
		debug!("auto-fit to {target:?} for content {content:?}");
		Ok(target)
	}

	/// Per-pass hook: fits on the first successful pass, afterwards keeps the
	/// transform exactly as the user left it. Returns whether a fit happened.
	pub fn after_layout(&mut self, container: Size, config: &TreeConfig, now: f64) -> bool {
		self.container = container;
		if self.fitted {
			return false;
		}
		match self.auto_fit(container, config, now) {
			Ok(_) => true,
			Err(err) => {
				warn!("auto-fit skipped: {err}");
				false
			}
		}
	}

	/// Translate by a screen-space delta.
	pub fn pan_by(&mut self, delta: Vec2, config: &TreeConfig, now: f64) {
		let mut t = self.transform(now);
		t.x += delta.x;
		t.y += delta.y;
		self.settle(t, config);
	}

	/// Translate by a delta measured in surface units, as wheel scrolling does.
	pub fn scroll_by(&mut self, delta: Vec2, config: &TreeConfig, now: f64) {
		let k = self.transform(now).k;
		self.pan_by(delta * k, config, now);
	}

	/// Scale by `factor` around `anchor` (screen coordinates), clamped to the configured range.
	pub fn zoom_at(&mut self, anchor: Point, factor: f64, config: &TreeConfig, now: f64) {
		let mut t = self.transform(now);
		let k = (t.k * factor).clamp(config.min_scale, config.max_scale);
		let ratio = k / t.k;
		let (ax, ay) = (anchor.x - config.margin.x0, anchor.y - config.margin.y0);
		t.x = ax - (ax - t.x) * ratio;
		t.y = ay - (ay - t.y) * ratio;
		t.k = k;
		self.settle(t, config);
	}

	fn settle(&mut self, t: ViewTransform, config: &TreeConfig) {
		self.transform = Tween::settled(self.keep_surface_in_view(t, config));
	}

	/// Pull `t` back until the surface overlaps the container again. A
	/// missing surface or an empty container leaves `t` alone.
	fn keep_surface_in_view(&self, mut t: ViewTransform, config: &TreeConfig) -> ViewTransform {
		let Some(surface) = self.surface else {
			return t;
		};
		let container = self.container;
		if container.width <= 0.0 || container.height <= 0.0 {
			return t;
		}
		let min_x = -config.margin.x0 - surface.x1 * t.k;
		let max_x = container.width - config.margin.x0 - surface.x0 * t.k;
		let min_y = -config.margin.y0 - surface.y1 * t.k;
		let max_y = container.height - config.margin.y0 - surface.y0 * t.k;
		t.x = t.x.clamp(min_x, max_x);
		t.y = t.y.clamp(min_y, max_y);
		t
	}
}

/// Scale that fits `content` into `container`: the fixed scale when one is
/// configured, otherwise the tighter of the two axis ratios, never above 1.
pub fn fit_scale(content: Size, container: Size, config: &TreeConfig) -> f64 {
	if let Some(fixed) = config.fixed_scale {
		return fixed;
	}
	let sx = container.width * config.fit_ratio / content.width;
	let sy = container.height * config.fit_ratio / content.height;
	sx.min(sy).min(1.0)
}
