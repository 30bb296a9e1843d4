//! Visual attributes as a pure function of node and edge state.

use kurbo::Size;

use super::config::TreeConfig;
use super::geometry;
use super::highlight::{EdgeHighlight, NodeHighlight};
use super::tween::Lerp;

/// An sRGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	/// Build from a `0xRRGGBB` literal.
	pub const fn hex(value: u32) -> Self {
		Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
	}

	/// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
	pub fn lerp(self, other: Self, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
		Self(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
	}

	/// CSS colour string.
	pub fn css(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
	}
}

const PLAIN_FILL: Rgb = Rgb::hex(0xffffff);
const COLLAPSED_FILL: Rgb = Rgb::hex(0xb0c4de);
const PLAIN_STROKE: Rgb = Rgb::hex(0x4a6fa5);
const ANCHOR_FILL: Rgb = Rgb::hex(0xffd700);
const ANCHOR_STROKE: Rgb = Rgb::hex(0xff8c00);
const SELECTED_FILL: Rgb = Rgb::hex(0xfff4e6);
const SELECTED_STROKE: Rgb = Rgb::hex(0xff4500);
const HOVER_FILL: Rgb = Rgb::hex(0xe6f7ff);
const HOVER_STROKE: Rgb = Rgb::hex(0x00bfff);
const MERGED_FILL: Rgb = Rgb::hex(0xe6ffe6);
const MERGED_STROKE: Rgb = Rgb::hex(0x00cc00);
const EDGE_STROKE: Rgb = Rgb::hex(0xcccccc);

/// Label colour.
pub const LABEL_COLOR: Rgb = Rgb::hex(0x333333);
/// Surface colour behind the tree.
pub const BACKGROUND: Rgb = Rgb::hex(0xfdfdfb);

/// Inputs deciding how a node looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeLook {
	/// Node is the selection anchor.
	pub anchor: bool,
	/// Combined highlight tier.
	pub highlight: NodeHighlight,
	/// Node hides a collapse stash.
	pub collapsed: bool,
	/// Generation, for size scaling.
	pub depth: usize,
}

/// Resolved node attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	/// Rectangle fill.
	pub fill: Rgb,
	/// Rectangle outline.
	pub stroke: Rgb,
	/// Outline width.
	pub stroke_width: f64,
	/// Rectangle size.
	pub size: Size,
	/// Label font size.
	pub font_size: f64,
}

impl Lerp for NodeStyle {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		let mix = |a: f64, b: f64| a + (b - a) * t;
		Self {
			fill: self.fill.lerp(other.fill, t),
			stroke: self.stroke.lerp(other.stroke, t),
			stroke_width: mix(self.stroke_width, other.stroke_width),
			size: Size::new(
				mix(self.size.width, other.size.width),
				mix(self.size.height, other.size.height),
			),
			font_size: mix(self.font_size, other.font_size),
		}
	}
}

/// Attributes for a node in the given state.
///
/// Path tiers win over the anchor and collapse defaults; a node on both paths
/// gets its own merged colours.
pub fn node_style(look: NodeLook, config: &TreeConfig) -> NodeStyle {
	let (fill, stroke, stroke_width) = match (look.highlight, look.anchor) {
		(NodeHighlight::Both, _) => (MERGED_FILL, MERGED_STROKE, 5.0),
		(NodeHighlight::SelectedOnly, true) => (ANCHOR_FILL, SELECTED_STROKE, 4.0),
		(NodeHighlight::SelectedOnly, false) => (SELECTED_FILL, SELECTED_STROKE, 4.0),
		(NodeHighlight::HoverOnly, _) => (HOVER_FILL, HOVER_STROKE, 3.5),
		(NodeHighlight::None, true) => (ANCHOR_FILL, ANCHOR_STROKE, 4.0),
		(NodeHighlight::None, false) if look.collapsed => (COLLAPSED_FILL, PLAIN_STROKE, 3.0),
		(NodeHighlight::None, false) => (PLAIN_FILL, PLAIN_STROKE, 3.0),
	};
	NodeStyle {
		fill,
		stroke,
		stroke_width,
		size: geometry::node_size(config, look.depth),
		font_size: geometry::font_size(config, look.depth),
	}
}

/// Resolved connector attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Line colour.
	pub stroke: Rgb,
	/// Line width.
	pub width: f64,
}

impl Lerp for EdgeStyle {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		Self {
			stroke: self.stroke.lerp(other.stroke, t),
			width: self.width + (other.width - self.width) * t,
		}
	}
}

/// Attributes for a connector in the given tier.
pub fn edge_style(highlight: EdgeHighlight) -> EdgeStyle {
	match highlight {
		EdgeHighlight::None => EdgeStyle {
			stroke: EDGE_STROKE,
			width: 2.0,
		},
		EdgeHighlight::Hover => EdgeStyle {
			stroke: HOVER_STROKE,
			width: 3.0,
		},
		EdgeHighlight::Selected => EdgeStyle {
			stroke: SELECTED_STROKE,
			width: 3.0,
		},
	}
}
