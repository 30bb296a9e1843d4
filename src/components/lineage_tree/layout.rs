//! Tidy tree layout for the visible part of a [`Tree`].
//!
//! Sibling-axis positions come from the linear-time Reingold–Tilford variant
//! by Buchheim, Jünger and Leipert (the algorithm behind `d3.tree`), scaled to
//! a fixed extent. The depth axis is not taken from the algorithm: every node
//! sits at `depth * level_spacing` so each generation forms one straight column.

use std::collections::HashMap;

use kurbo::{Point, Size};

use super::config::TreeConfig;
use super::geometry;
use super::model::{Node, NodeId, Tree};

/// A visible node with its position for one render pass.
///
/// `x` runs along the sibling axis and `y` along the depth axis. On screen the
/// tree grows left to right, so the drawn centre is `(y, x)`.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedNode {
	/// Node identity.
	pub id: NodeId,
	/// Parent of this node in the visible tree.
	pub parent: Option<NodeId>,
	/// Generation, root is 0.
	pub depth: usize,
	/// Sibling-axis coordinate.
	pub x: f64,
	/// Depth-axis coordinate.
	pub y: f64,
	/// Position from the previous pass, if the node was laid out then.
	pub prev: Option<(f64, f64)>,
	/// Whether the node currently hides a collapse stash.
	pub collapsed: bool,
	/// Display label.
	pub label: String,
}

impl PositionedNode {
	/// Centre of the node in surface coordinates.
	pub fn center(&self) -> Point {
		Point::new(self.y, self.x)
	}

	/// Centre from the previous pass, in surface coordinates.
	pub fn prev_center(&self) -> Option<Point> {
		self.prev.map(|(x, y)| Point::new(y, x))
	}

	/// Rendered size of this node.
	pub fn size(&self, config: &TreeConfig) -> Size {
		geometry::node_size(config, self.depth)
	}
}

/// A parent/child link between two visible nodes. Identified by its child.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
	/// Upper end.
	pub parent: NodeId,
	/// Lower end, and the identity of the edge.
	pub child: NodeId,
}

/// Output of one layout pass.
#[derive(Clone, Debug, Default)]
pub struct Layout {
	nodes: Vec<PositionedNode>,
	index: HashMap<NodeId, usize>,
	edges: Vec<Edge>,
}

impl Layout {
	/// Lay out the visible nodes of `tree`, spreading siblings across `extent`.
	pub fn compute(tree: &Tree, config: &TreeConfig, extent: f64) -> Self {
		let mut tidy = Tidy::new(tree.root());
		tidy.first_walk();
		tidy.slots[Tidy::VIRTUAL].modifier = -tidy.slots[Tidy::ROOT].prelim;
		tidy.second_walk();
		tidy.fit_extent(extent);

		let root_y = 0.0;
		let spacing = config.level_spacing();
		let mut layout = Self::default();
		for slot in tidy.slots.into_iter().skip(1) {
			if let Some(parent) = slot.tree_parent {
				layout.edges.push(Edge {
					parent,
					child: slot.id,
				});
			}
			layout.index.insert(slot.id, layout.nodes.len());
			layout.nodes.push(PositionedNode {
				id: slot.id,
				parent: slot.tree_parent,
				depth: slot.depth,
				x: slot.x,
				y: root_y + slot.depth as f64 * spacing,
				prev: None,
				collapsed: slot.collapsed,
				label: slot.label,
			});
		}
		layout
	}

	/// Record where each node was in `previous`.
	pub fn inherit_positions(&mut self, previous: &Layout) {
		for node in &mut self.nodes {
			node.prev = previous.node(node.id).map(|old| (old.x, old.y));
		}
	}

	/// Visible nodes in pre-order.
	pub fn nodes(&self) -> &[PositionedNode] {
		&self.nodes
	}

	/// Parent/child links between visible nodes.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Positioned node for `id`, if visible.
	pub fn node(&self, id: NodeId) -> Option<&PositionedNode> {
		self.index.get(&id).map(|&i| &self.nodes[i])
	}

	/// Whether `id` is visible in this pass.
	pub fn contains(&self, id: NodeId) -> bool {
		self.index.contains_key(&id)
	}

	/// Number of visible nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True before the first pass.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Sibling-axis extent for `tree`: wide enough for its busiest generation.
pub fn layout_extent(tree: &Tree, config: &TreeConfig) -> f64 {
	let per_node = config.node_width + config.node_spacing;
	config
		.min_layout_extent
		.max(tree.max_level_width() as f64 * per_node)
}

#[derive(Debug)]
struct Slot {
	id: NodeId,
	tree_parent: Option<NodeId>,
	label: String,
	collapsed: bool,
	depth: usize,
	parent: Option<usize>,
	children: Vec<usize>,
	number: usize,
	ancestor: usize,
	default_ancestor: Option<usize>,
	prelim: f64,
	modifier: f64,
	change: f64,
	shift: f64,
	thread: Option<usize>,
	x: f64,
}

/// Working state of the tidy layout. Slot 0 is a virtual parent of the root.
struct Tidy {
	slots: Vec<Slot>,
}

impl Tidy {
	const VIRTUAL: usize = 0;
	const ROOT: usize = 1;

	/// Slots are numbered in pre-order, so every parent precedes its children.
	fn new(root: &Node) -> Self {
		let mut tidy = Self { slots: Vec::new() };
		tidy.push(root.id(), None, String::new(), false, 0, None, 0);
		let mut pending = vec![(root, None, 0, Self::VIRTUAL, 0)];
		while let Some((node, tree_parent, depth, parent, number)) = pending.pop() {
			let index = tidy.insert(node, tree_parent, depth, parent, number);
			let children = node.visible_children().iter().enumerate().rev();
			pending.extend(
				children.map(|(number, child)| (child, Some(node.id()), depth + 1, index, number)),
			);
		}
		tidy
	}

	fn push(
		&mut self,
		id: NodeId,
		tree_parent: Option<NodeId>,
		label: String,
		collapsed: bool,
		depth: usize,
		parent: Option<usize>,
		number: usize,
	) -> usize {
		let index = self.slots.len();
		self.slots.push(Slot {
			id,
			tree_parent,
			label,
			collapsed,
			depth,
			parent,
			children: Vec::new(),
			number,
			ancestor: index,
			default_ancestor: None,
			prelim: 0.0,
			modifier: 0.0,
			change: 0.0,
			shift: 0.0,
			thread: None,
			x: 0.0,
		});
		index
	}

	fn insert(
		&mut self,
		node: &Node,
		tree_parent: Option<NodeId>,
		depth: usize,
		parent: usize,
		number: usize,
	) -> usize {
		let index = self.push(
			node.id(),
			tree_parent,
			node.name().to_owned(),
			node.is_collapsed(),
			depth,
			Some(parent),
			number,
		);
		self.slots[parent].children.push(index);
		index
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		if self.slots[a].parent == self.slots[b].parent {
			1.0
		} else {
			2.0
		}
	}

	fn next_left(&self, v: usize) -> Option<usize> {
		self.slots[v].children.first().copied().or(self.slots[v].thread)
	}

	fn next_right(&self, v: usize) -> Option<usize> {
		self.slots[v].children.last().copied().or(self.slots[v].thread)
	}

	fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
		let change = shift / (self.slots[wp].number - self.slots[wm].number) as f64;
		self.slots[wp].change -= change;
		self.slots[wp].shift += shift;
		self.slots[wm].change += change;
		self.slots[wp].prelim += shift;
		self.slots[wp].modifier += shift;
	}

	fn execute_shifts(&mut self, v: usize) {
		let (mut shift, mut change) = (0.0, 0.0);
		for i in (0..self.slots[v].children.len()).rev() {
			let w = self.slots[v].children[i];
			let slot = &mut self.slots[w];
			slot.prelim += shift;
			slot.modifier += shift;
			change += slot.change;
			shift += slot.shift + change;
		}
	}

	fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
		let candidate = self.slots[vim].ancestor;
		if self.slots[candidate].parent == self.slots[v].parent {
			candidate
		} else {
			ancestor
		}
	}

	/// Slots in post-order, siblings left to right.
	fn post_order(&self) -> Vec<usize> {
		let mut order = Vec::with_capacity(self.slots.len());
		let mut stack = vec![Self::ROOT];
		while let Some(v) = stack.pop() {
			order.push(v);
			stack.extend(&self.slots[v].children);
		}
		order.reverse();
		order
	}

	fn first_walk(&mut self) {
		for v in self.post_order() {
			self.place(v);
		}
	}

	fn place(&mut self, v: usize) {
		let Some(parent) = self.slots[v].parent else {
			return;
		};
		let number = self.slots[v].number;
		let left_sibling = number
			.checked_sub(1)
			.map(|i| self.slots[parent].children[i]);

		let children = &self.slots[v].children;
		let outer = children.first().copied().zip(children.last().copied());
		if let Some((first, last)) = outer {
			self.execute_shifts(v);
			let midpoint = (self.slots[first].prelim + self.slots[last].prelim) / 2.0;
			if let Some(w) = left_sibling {
				self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
				self.slots[v].modifier = self.slots[v].prelim - midpoint;
			} else {
				self.slots[v].prelim = midpoint;
			}
		} else if let Some(w) = left_sibling {
			self.slots[v].prelim = self.slots[w].prelim + self.separation(v, w);
		}

		let default_ancestor = self.slots[parent]
			.default_ancestor
			.unwrap_or(self.slots[parent].children[0]);
		let ancestor = self.apportion(v, left_sibling, default_ancestor);
		self.slots[parent].default_ancestor = Some(ancestor);
	}

	fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
		let Some(w) = left_sibling else {
			return ancestor;
		};
		let Some(parent) = self.slots[v].parent else {
			return ancestor;
		};
		let (mut vip, mut vop, mut vim) = (v, v, w);
		let mut vom = self.slots[parent].children[0];
		let mut sip = self.slots[vip].modifier;
		let mut sop = self.slots[vop].modifier;
		let mut sim = self.slots[vim].modifier;
		let mut som = self.slots[vom].modifier;

		let mut inner_left = self.next_right(vim);
		let mut inner_right = self.next_left(vip);
		while let (Some(im), Some(ip)) = (inner_left, inner_right) {
			vim = im;
			vip = ip;
			// Both outer contours belong to forests at least as deep as the inner ones.
			let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
				break;
			};
			vom = om;
			vop = op;
			self.slots[vop].ancestor = v;
			let shift = self.slots[vim].prelim + sim - self.slots[vip].prelim - sip
				+ self.separation(vim, vip);
			if shift > 0.0 {
				let moved = self.next_ancestor(vim, v, ancestor);
				self.move_subtree(moved, v, shift);
				sip += shift;
				sop += shift;
			}
			sim += self.slots[vim].modifier;
			sip += self.slots[vip].modifier;
			som += self.slots[vom].modifier;
			sop += self.slots[vop].modifier;
			inner_left = self.next_right(vim);
			inner_right = self.next_left(vip);
		}

		if let Some(im) = inner_left {
			if self.next_right(vop).is_none() {
				self.slots[vop].thread = Some(im);
				self.slots[vop].modifier += sim - sop;
			}
		}
		if let Some(ip) = inner_right {
			if self.next_left(vom).is_none() {
				self.slots[vom].thread = Some(ip);
				self.slots[vom].modifier += sip - som;
				ancestor = v;
			}
		}
		ancestor
	}

	fn second_walk(&mut self) {
		for v in Self::ROOT..self.slots.len() {
			if let Some(parent) = self.slots[v].parent {
				let parent_modifier = self.slots[parent].modifier;
				self.slots[v].x = self.slots[v].prelim + parent_modifier;
				self.slots[v].modifier += parent_modifier;
			}
		}
	}

	/// Stretch the unit layout so its outermost nodes span `extent`.
	fn fit_extent(&mut self, extent: f64) {
		let (mut left, mut right) = (Self::ROOT, Self::ROOT);
		for i in Self::ROOT..self.slots.len() {
			if self.slots[i].x < self.slots[left].x {
				left = i;
			}
			if self.slots[i].x > self.slots[right].x {
				right = i;
			}
		}
		let margin = if left == right {
			1.0
		} else {
			self.separation(left, right) / 2.0
		};
		let offset = margin - self.slots[left].x;
		let scale = extent / (self.slots[right].x + margin + offset);
		for slot in self.slots.iter_mut().skip(1) {
			slot.x = (slot.x + offset) * scale;
		}
	}
}
