//! Node size rules. Everything here is a pure function of depth.

use kurbo::Size;

use super::config::TreeConfig;

/// Size multiplier for nodes at `depth`.
pub fn depth_scale(config: &TreeConfig, depth: usize) -> f64 {
	let depth = i32::try_from(depth).unwrap_or(i32::MAX);
	config.depth_scale_factor.powi(depth)
}

/// Rendered width of a node at `depth`.
pub fn node_width(config: &TreeConfig, depth: usize) -> f64 {
	config.node_width * depth_scale(config, depth)
}

/// Rendered height of a node at `depth`.
pub fn node_height(config: &TreeConfig, depth: usize) -> f64 {
	config.node_height * depth_scale(config, depth)
}

/// Rendered width and height of a node at `depth`.
pub fn node_size(config: &TreeConfig, depth: usize) -> Size {
	Size::new(node_width(config, depth), node_height(config, depth))
}

/// Label font size in pixels for a node at `depth`.
pub fn font_size(config: &TreeConfig, depth: usize) -> f64 {
	config.font_size * depth_scale(config, depth)
}
