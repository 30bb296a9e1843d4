//! Retained scene: each layout pass is reconciled against the elements drawn
//! by the previous one, keyed by node id.
//!
//! New nodes grow out of the node that triggered the pass, vanished nodes
//! shrink back into it, and everything else glides to its new place.

use std::collections::{BTreeMap, HashSet};

use kurbo::{Point, Rect};
use log::debug;

use super::config::TreeConfig;
use super::geometry;
use super::highlight::Highlight;
use super::layout::{Layout, PositionedNode};
use super::model::NodeId;
use super::style::{self, EdgeStyle, NodeLook, NodeStyle};
use super::tween::{Lerp, Tween};

/// Orthogonal parent-to-child connector: across, down, across.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connector([Point; 4]);

impl Connector {
	/// A connector collapsed onto a single point.
	pub fn degenerate(at: Point) -> Self {
		Self([at; 4])
	}

	/// Connector from the trailing edge of the parent to the leading edge of
	/// the child, bending half a parent width past the parent.
	pub fn elbow(parent: Point, parent_width: f64, child: Point, child_width: f64) -> Self {
		let start = Point::new(parent.x + parent_width / 2.0, parent.y);
		let bend = start.x + parent_width / 2.0;
		Self([
			start,
			Point::new(bend, parent.y),
			Point::new(bend, child.y),
			Point::new(child.x - child_width / 2.0, child.y),
		])
	}

	/// Connector between two positioned nodes; degenerate at the origin if either is missing.
	pub fn between(
		parent: Option<&PositionedNode>,
		child: Option<&PositionedNode>,
		config: &TreeConfig,
	) -> Self {
		match (parent, child) {
			(Some(parent), Some(child)) => Self::elbow(
				parent.center(),
				geometry::node_width(config, parent.depth),
				child.center(),
				geometry::node_width(config, child.depth),
			),
			_ => Self::degenerate(Point::ZERO),
		}
	}

	/// Polyline vertices.
	pub fn points(&self) -> &[Point; 4] {
		&self.0
	}

	/// Whether all vertices coincide.
	pub fn is_degenerate(&self) -> bool {
		self.0.iter().all(|p| *p == self.0[0])
	}
}

impl Lerp for Connector {
	fn lerp(&self, other: &Self, t: f64) -> Self {
		Self(std::array::from_fn(|i| self.0[i].lerp(other.0[i], t)))
	}
}

#[derive(Clone, Debug)]
struct NodeElement {
	label: String,
	center: Tween<Point>,
	style: Tween<NodeStyle>,
	exit_at: Option<f64>,
}

#[derive(Clone, Debug)]
struct EdgeElement {
	path: Tween<Connector>,
	style: Tween<EdgeStyle>,
	exit_at: Option<f64>,
}

/// A node as it should be drawn at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite<'a> {
	/// Node identity.
	pub id: NodeId,
	/// Centre in surface coordinates.
	pub center: Point,
	/// Interpolated attributes.
	pub style: NodeStyle,
	/// Label text.
	pub label: &'a str,
}

impl NodeSprite<'_> {
	/// Rectangle covered by the node.
	pub fn rect(&self) -> Rect {
		Rect::from_center_size(self.center, self.style.size)
	}
}

/// A connector as it should be drawn at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSprite {
	/// Child id of the edge.
	pub id: NodeId,
	/// Interpolated polyline.
	pub connector: Connector,
	/// Interpolated attributes.
	pub style: EdgeStyle,
}

/// Everything to draw for one animation frame. Edges go under nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame<'a> {
	/// Connectors.
	pub edges: Vec<EdgeSprite>,
	/// Nodes.
	pub nodes: Vec<NodeSprite<'a>>,
}

/// How a reconcile pass classified each element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
	/// Nodes that became visible.
	pub entered: Vec<NodeId>,
	/// Nodes that stayed visible.
	pub updated: Vec<NodeId>,
	/// Nodes that stopped being visible.
	pub exited: Vec<NodeId>,
	/// Edges (by child id) that became visible.
	pub edges_entered: Vec<NodeId>,
	/// Edges that stayed visible.
	pub edges_updated: Vec<NodeId>,
	/// Edges that stopped being visible.
	pub edges_exited: Vec<NodeId>,
}

/// Animated elements currently on the surface.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	nodes: BTreeMap<NodeId, NodeElement>,
	edges: BTreeMap<NodeId, EdgeElement>,
}

impl Scene {
	/// Bring the scene in line with `layout`. `source` is the node whose
	/// change triggered the pass.
	pub fn reconcile(
		&mut self,
		layout: &Layout,
		source: NodeId,
		highlight: &Highlight,
		config: &TreeConfig,
		now: f64,
	) -> Reconciliation {
		let motion = config.transition_ms;
		let tint = config.highlight_transition_ms;
		let anchor = layout.node(source);
		let origin = anchor
			.and_then(PositionedNode::prev_center)
			.or_else(|| anchor.map(PositionedNode::center))
			.unwrap_or(Point::ZERO);
		let destination = anchor
			.map(PositionedNode::center)
			.or_else(|| self.node_center(source, now))
			.unwrap_or(origin);
		let selected = highlight.selected_anchor();
		let mut report = Reconciliation::default();

		for node in layout.nodes() {
			let look = NodeLook {
				anchor: selected == Some(node.id),
				highlight: highlight.node_state(node.id),
				collapsed: node.collapsed,
				depth: node.depth,
			};
			let target = style::node_style(look, config);
			match self.nodes.get_mut(&node.id) {
				Some(element) => {
					element.exit_at = None;
					element.label.clone_from(&node.label);
					element.center.retarget(node.center(), now, motion);
					element.style.retarget(target, now, tint);
					report.updated.push(node.id);
				}
				None => {
					self.nodes.insert(
						node.id,
						NodeElement {
							label: node.label.clone(),
							center: Tween::new(origin, node.center(), now, motion),
							style: Tween::settled(target),
							exit_at: None,
						},
					);
					report.entered.push(node.id);
				}
			}
		}

		for (id, element) in &mut self.nodes {
			if element.exit_at.is_none() && !layout.contains(*id) {
				element.center.retarget(destination, now, motion);
				element.exit_at = Some(now + motion);
				report.exited.push(*id);
			}
		}

		for edge in layout.edges() {
			let connector = Connector::between(layout.node(edge.parent), layout.node(edge.child), config);
			let target = style::edge_style(highlight.edge_state(edge));
			match self.edges.get_mut(&edge.child) {
				Some(element) => {
					element.exit_at = None;
					element.path.retarget(connector, now, motion);
					element.style.retarget(target, now, tint);
					report.edges_updated.push(edge.child);
				}
				None => {
					self.edges.insert(
						edge.child,
						EdgeElement {
							path: Tween::new(Connector::degenerate(origin), connector, now, motion),
							style: Tween::settled(target),
							exit_at: None,
						},
					);
					report.edges_entered.push(edge.child);
				}
			}
		}

		let live: HashSet<NodeId> = layout.edges().iter().map(|e| e.child).collect();
		for (id, element) in &mut self.edges {
			if element.exit_at.is_none() && !live.contains(id) {
				element.path.retarget(Connector::degenerate(destination), now, motion);
				element.exit_at = Some(now + motion);
				report.edges_exited.push(*id);
			}
		}

		debug!(
			"reconciled from {source}: {} entered, {} updated, {} exited",
			report.entered.len(),
			report.updated.len(),
			report.exited.len()
		);
		report
	}

	/// Drop exiting elements whose transition has finished. Returns how many went.
	pub fn prune(&mut self, now: f64) -> usize {
		let before = self.nodes.len() + self.edges.len();
		let finished = |exit_at: Option<f64>| exit_at.is_some_and(|at| at <= now);
		self.nodes.retain(|_, element| !finished(element.exit_at));
		self.edges.retain(|_, element| !finished(element.exit_at));
		before - self.nodes.len() - self.edges.len()
	}

	/// Sample every element at `now`.
	pub fn frame(&self, now: f64) -> Frame<'_> {
		Frame {
			edges: self
				.edges
				.iter()
				.map(|(id, element)| EdgeSprite {
					id: *id,
					connector: element.path.sample(now),
					style: element.style.sample(now),
				})
				.collect(),
			nodes: self
				.nodes
				.iter()
				.map(|(id, element)| NodeSprite {
					id: *id,
					center: element.center.sample(now),
					style: element.style.sample(now),
					label: &element.label,
				})
				.collect(),
		}
	}

	/// Current centre of node `id`, if it is on the surface.
	pub fn node_center(&self, id: NodeId, now: f64) -> Option<Point> {
		self.nodes.get(&id).map(|element| element.center.sample(now))
	}

	/// Topmost non-exiting node under `point` (surface coordinates).
	pub fn node_at(&self, point: Point, now: f64) -> Option<NodeId> {
		self.nodes
			.iter()
			.rev()
			.find(|(_, element)| {
				let size = element.style.sample(now).size;
				element.exit_at.is_none()
					&& Rect::from_center_size(element.center.sample(now), size).contains(point)
			})
			.map(|(id, _)| *id)
	}

	/// Whether every transition has finished.
	pub fn is_settled(&self, now: f64) -> bool {
		self.nodes
			.values()
			.all(|e| e.center.is_done(now) && e.style.is_done(now) && e.exit_at.is_none())
			&& self
				.edges
				.values()
				.all(|e| e.path.is_done(now) && e.style.is_done(now) && e.exit_at.is_none())
	}

	/// Number of node elements, exiting ones included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edge elements, exiting ones included.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lineage_tree::highlight::NodeHighlight;
	use crate::components::lineage_tree::model::{NodeSpec, Tree};

	fn family() -> Tree {
		Tree::from_spec(NodeSpec::new("root").with_children([
			NodeSpec::new("A").with_children([NodeSpec::new("A1")]),
			NodeSpec::new("B"),
		]))
		.unwrap()
	}

	fn pass(tree: &Tree, previous: &Layout) -> Layout {
		let mut layout = Layout::compute(tree, &TreeConfig::default(), 1000.0);
		layout.inherit_positions(previous);
		layout
	}

	#[test]
	fn elbow_connector_has_three_orthogonal_runs() {
		let c = Connector::elbow(Point::new(0.0, 100.0), 120.0, Point::new(240.0, 300.0), 120.0);
		let [a, b, m, d] = *c.points();
		assert_eq!(a, Point::new(60.0, 100.0));
		assert_eq!(b, Point::new(120.0, 100.0));
		assert_eq!(m, Point::new(120.0, 300.0));
		assert_eq!(d, Point::new(180.0, 300.0));
		assert!(!c.is_degenerate());
	}

	#[test]
	fn missing_endpoint_gives_degenerate_path() {
		let config = TreeConfig::default();
		let tree = family();
		let layout = Layout::compute(&tree, &config, 1000.0);
		let c = Connector::between(layout.nodes().first(), None, &config);
		assert!(c.is_degenerate());
		assert_eq!(c.points()[0], Point::ZERO);
	}

	#[test]
	fn first_pass_enters_everything_from_the_source() {
		let tree = family();
		let config = TreeConfig::default();
		let layout = pass(&tree, &Layout::default());
		let mut scene = Scene::default();
		let root = tree.root().id();
		let report = scene.reconcile(&layout, root, &Highlight::default(), &config, 0.0);
		assert_eq!(report.entered.len(), 4);
		assert_eq!(report.edges_entered.len(), 3);
		assert!(report.updated.is_empty());

		let root_center = layout.node(root).unwrap().center();
		let start = scene.frame(0.0);
		assert!(start.nodes.iter().all(|n| n.center == root_center));
		let end = scene.frame(config.transition_ms);
		for sprite in &end.nodes {
			assert_eq!(sprite.center, layout.node(sprite.id).unwrap().center());
		}
	}

	#[test]
	fn collapse_exits_into_source_then_prunes() {
		let mut tree = family();
		let config = TreeConfig::default();
		let a = tree.find_by_name("A").unwrap().id();
		let a1 = tree.find_by_name("A1").unwrap().id();
		let first = pass(&tree, &Layout::default());
		let mut scene = Scene::default();
		let highlight = Highlight::default();
		scene.reconcile(&first, tree.root().id(), &highlight, &config, 0.0);

		tree.collapse(a).unwrap();
		let second = pass(&tree, &first);
		let report = scene.reconcile(&second, a, &highlight, &config, 1000.0);
		assert_eq!(report.exited, vec![a1]);
		assert_eq!(report.edges_exited, vec![a1]);
		assert_eq!(report.updated.len(), 3);

		let a_center = second.node(a).unwrap().center();
		assert_eq!(scene.node_center(a1, 1000.0 + config.transition_ms), Some(a_center));
		assert_eq!(scene.prune(1000.0 + config.transition_ms - 1.0), 0);
		assert_eq!(scene.prune(1000.0 + config.transition_ms), 2);
		assert_eq!(scene.node_count(), 3);
		assert!(scene.node_at(a_center, 2000.0).is_some_and(|id| id == a));
	}

	#[test]
	fn expand_mid_exit_revives_the_element() {
		let mut tree = family();
		let config = TreeConfig::default();
		let a = tree.find_by_name("A").unwrap().id();
		let first = pass(&tree, &Layout::default());
		let mut scene = Scene::default();
		let highlight = Highlight::default();
		scene.reconcile(&first, tree.root().id(), &highlight, &config, 0.0);

		tree.collapse(a).unwrap();
		let second = pass(&tree, &first);
		scene.reconcile(&second, a, &highlight, &config, 1000.0);
		tree.expand(a).unwrap();
		let third = pass(&tree, &second);
		let report = scene.reconcile(&third, a, &highlight, &config, 1100.0);
		assert!(report.entered.is_empty());
		assert_eq!(report.updated.len(), 4);
		assert_eq!(scene.prune(5000.0), 0);
		assert!(scene.is_settled(5000.0));
	}

	#[test]
	fn reentering_children_grow_from_where_the_parent_was() {
		let mut tree = Tree::from_spec(NodeSpec::new("root").with_children([
			NodeSpec::new("A").with_children([NodeSpec::new("A1"), NodeSpec::new("A2")]),
			NodeSpec::new("B").with_children([NodeSpec::new("B1"), NodeSpec::new("B2")]),
		]))
		.unwrap();
		let config = TreeConfig::default();
		let id = |name: &str| tree.find_by_name(name).unwrap().id();
		let (root, a, b, a1, a2) = (tree.root().id(), id("A"), id("B"), id("A1"), id("A2"));
		let highlight = Highlight::default();
		let mut scene = Scene::default();

		let first = pass(&tree, &Layout::default());
		scene.reconcile(&first, root, &highlight, &config, 0.0);
		tree.collapse(a).unwrap();
		let second = pass(&tree, &first);
		scene.reconcile(&second, a, &highlight, &config, 1000.0);
		tree.collapse(b).unwrap();
		let third = pass(&tree, &second);
		scene.reconcile(&third, b, &highlight, &config, 2000.0);
		scene.prune(3000.0);
		assert_eq!(scene.node_count(), 3);

		tree.expand(a).unwrap();
		let fourth = pass(&tree, &third);
		let report = scene.reconcile(&fourth, a, &highlight, &config, 3000.0);
		assert_eq!(report.entered, vec![a1, a2]);

		let node = fourth.node(a).unwrap();
		let was = node.prev_center().unwrap();
		assert_eq!(Some(was), third.node(a).map(PositionedNode::center));
		assert_ne!(was, node.center());
		assert_ne!(was, fourth.node(root).unwrap().center());

		let start = scene.frame(3000.0);
		for child in [a1, a2] {
			let sprite = start.nodes.iter().find(|n| n.id == child).unwrap();
			assert_eq!(sprite.center, was);
			let edge = start.edges.iter().find(|e| e.id == child).unwrap();
			assert_eq!(edge.connector, Connector::degenerate(was));
		}
		let end = scene.frame(3000.0 + config.transition_ms);
		for child in [a1, a2] {
			let sprite = end.nodes.iter().find(|n| n.id == child).unwrap();
			assert_eq!(sprite.center, fourth.node(child).unwrap().center());
		}
	}

	#[test]
	fn highlight_changes_restyle_without_moving() {
		let tree = family();
		let config = TreeConfig::default();
		let layout = pass(&tree, &Layout::default());
		let mut scene = Scene::default();
		let root = tree.root().id();
		let b = tree.find_by_name("B").unwrap().id();
		scene.reconcile(&layout, root, &Highlight::default(), &config, 0.0);

		let mut highlight = Highlight::default();
		highlight.select(&tree, b).unwrap();
		assert_eq!(highlight.node_state(root), NodeHighlight::SelectedOnly);
		let again = pass(&tree, &layout);
		scene.reconcile(&again, b, &highlight, &config, 1000.0);

		let frame = scene.frame(1000.0 + config.highlight_transition_ms);
		let sprite = frame.nodes.iter().find(|n| n.id == root).unwrap();
		assert_eq!(sprite.center, layout.node(root).unwrap().center());
		let look = NodeLook {
			anchor: false,
			highlight: NodeHighlight::SelectedOnly,
			collapsed: false,
			depth: 0,
		};
		assert_eq!(sprite.style, style::node_style(look, &config));
	}
}
