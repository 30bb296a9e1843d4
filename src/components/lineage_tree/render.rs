//! Draws a sampled scene through a small 2D painting interface.

use kurbo::{Affine, Point, Rect, Size};
use web_sys::CanvasRenderingContext2d;

use super::state::TreeState;
use super::style::{BACKGROUND, LABEL_COLOR, Rgb};

/// Drawing primitives the tree needs from a 2D surface.
pub trait Painter {
	/// Fill the whole surface, ignoring any transform.
	fn clear(&mut self, size: Size, color: Rgb);
	/// Transform applied to everything drawn afterwards.
	fn set_transform(&mut self, transform: Affine);
	/// Filled and outlined rectangle.
	fn rect(&mut self, rect: Rect, fill: Rgb, stroke: Rgb, stroke_width: f64);
	/// Open stroked path through `points`.
	fn polyline(&mut self, points: &[Point], stroke: Rgb, width: f64);
	/// Text centred on `at`.
	fn text(&mut self, at: Point, text: &str, font_size: f64, color: Rgb);
}

/// Paint one frame of `state` at `now`: background, then connectors, then
/// nodes with their labels on top.
pub fn render(state: &TreeState, painter: &mut impl Painter, now: f64) {
	painter.clear(state.container(), BACKGROUND);
	painter.set_transform(state.viewport.transform(now).to_affine(state.config()));

	let frame = state.frame(now);
	for edge in &frame.edges {
		if edge.connector.is_degenerate() {
			continue;
		}
		painter.polyline(edge.connector.points(), edge.style.stroke, edge.style.width);
	}
	for node in &frame.nodes {
		let style = &node.style;
		painter.rect(node.rect(), style.fill, style.stroke, style.stroke_width);
		painter.text(node.center, node.label, style.font_size, LABEL_COLOR);
	}
}

impl Painter for CanvasRenderingContext2d {
	fn clear(&mut self, size: Size, color: Rgb) {
		let _ = CanvasRenderingContext2d::set_transform(self, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
		self.set_fill_style_str(&color.css());
		self.fill_rect(0.0, 0.0, size.width, size.height);
	}

	fn set_transform(&mut self, transform: Affine) {
		let [a, b, c, d, e, f] = transform.as_coeffs();
		let _ = CanvasRenderingContext2d::set_transform(self, a, b, c, d, e, f);
	}

	fn rect(&mut self, rect: Rect, fill: Rgb, stroke: Rgb, stroke_width: f64) {
		self.set_fill_style_str(&fill.css());
		self.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
		self.set_stroke_style_str(&stroke.css());
		self.set_line_width(stroke_width);
		self.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
	}

	fn polyline(&mut self, points: &[Point], stroke: Rgb, width: f64) {
		let Some((first, rest)) = points.split_first() else {
			return;
		};
		self.set_stroke_style_str(&stroke.css());
		self.set_line_width(width);
		self.begin_path();
		self.move_to(first.x, first.y);
		for p in rest {
			self.line_to(p.x, p.y);
		}
		self.stroke();
	}

	fn text(&mut self, at: Point, text: &str, font_size: f64, color: Rgb) {
		self.set_fill_style_str(&color.css());
		self.set_font(&format!("{font_size}px sans-serif"));
		self.set_text_align("center");
		self.set_text_baseline("middle");
		let _ = self.fill_text(text, at.x, at.y);
	}
}
