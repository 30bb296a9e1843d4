//! Tunables for layout, node sizing and the camera.

use kurbo::Insets;

/// Configuration shared by every stage of a render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
	/// Node width at depth 0.
	pub node_width: f64,
	/// Node height at depth 0.
	pub node_height: f64,
	/// Label font size (px) at depth 0.
	pub font_size: f64,
	/// Per-generation size multiplier; `1.0` disables depth scaling.
	pub depth_scale_factor: f64,
	/// Gap reserved between neighbouring nodes when sizing the layout extent.
	pub node_spacing: f64,
	/// Lower bound of the sibling-axis extent handed to the tidy layout.
	pub min_layout_extent: f64,
	/// Base distance between two generations.
	pub level_unit: f64,
	/// Multiplier applied to [`TreeConfig::level_unit`].
	pub level_multiplier: f64,
	/// Offset of the drawing group inside the surface.
	pub margin: Insets,
	/// Extra room added around the content bounds when sizing the surface.
	pub surface_padding: f64,
	/// Scale used by auto-fit; `None` derives it from the content.
	pub fixed_scale: Option<f64>,
	/// Fraction of the container the fitted content may occupy.
	pub fit_ratio: f64,
	/// Minimum camera scale.
	pub min_scale: f64,
	/// Maximum camera scale.
	pub max_scale: f64,
	/// Duration of node and connector transitions, in milliseconds.
	pub transition_ms: f64,
	/// Duration of colour changes caused by hover and selection, in milliseconds.
	pub highlight_transition_ms: f64,
	/// Duration of the auto-fit camera transition, in milliseconds.
	pub fit_transition_ms: f64,
}

impl TreeConfig {
	/// Distance between two consecutive generations on the depth axis.
	pub fn level_spacing(&self) -> f64 {
		self.level_unit * self.level_multiplier
	}
}

impl Default for TreeConfig {
	fn default() -> Self {
		Self {
			node_width: 120.0,
			node_height: 60.0,
			font_size: 14.0,
			depth_scale_factor: 1.0,
			node_spacing: 50.0,
			min_layout_extent: 1000.0,
			level_unit: 120.0,
			level_multiplier: 2.0,
			margin: Insets::new(120.0, 50.0, 120.0, 50.0),
			surface_padding: 100.0,
			fixed_scale: Some(0.5),
			fit_ratio: 0.9,
			min_scale: 0.1,
			max_scale: 3.0,
			transition_ms: 500.0,
			highlight_transition_ms: 120.0,
			fit_transition_ms: 750.0,
		}
	}
}
