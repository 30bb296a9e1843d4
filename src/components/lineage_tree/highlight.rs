//! Selection and hover paths.
//!
//! Both highlights are a walk from an anchor node up to the root. They are
//! tracked independently and only combined when a caller asks for the visual
//! state of a node or edge.

use std::collections::HashSet;

use super::layout::Edge;
use super::model::{NodeId, Tree, TreeError};

/// Highlight tier of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeHighlight {
	/// On neither path.
	#[default]
	None,
	/// Only on the hover path.
	HoverOnly,
	/// Only on the selection path.
	SelectedOnly,
	/// On both paths.
	Both,
}

/// Highlight tier of an edge. An edge on both paths reports `Selected`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeHighlight {
	/// On neither path.
	#[default]
	None,
	/// On the hover path only.
	Hover,
	/// On the selection path.
	Selected,
}

/// Nodes and edges from an anchor up to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootPath {
	anchor: NodeId,
	nodes: HashSet<NodeId>,
	/// Edges keyed by their child end.
	edges: HashSet<NodeId>,
}

impl RootPath {
	/// Walk from `anchor` up to the root of `tree`.
	pub fn trace(tree: &Tree, anchor: NodeId) -> Result<Self, TreeError> {
		let walk = tree.path_to_root(anchor)?;
		let edges = walk
			.iter()
			.copied()
			.filter(|&id| tree.parent_of(id).is_some())
			.collect();
		Ok(Self {
			anchor,
			nodes: walk.into_iter().collect(),
			edges,
		})
	}

	/// The node the walk started from.
	pub fn anchor(&self) -> NodeId {
		self.anchor
	}

	/// Whether `id` lies on the path.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.nodes.contains(&id)
	}

	/// Whether `edge` lies on the path.
	pub fn contains_edge(&self, edge: &Edge) -> bool {
		self.edges.contains(&edge.child)
	}

	/// Node ids on the path, in no particular order.
	pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes.iter().copied()
	}

	/// Number of edges on the path.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}
}

/// Current selection and hover paths.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
	selected: Option<RootPath>,
	hover: Option<RootPath>,
}

impl Highlight {
	/// Make `id` the selection anchor, replacing any previous selection.
	pub fn select(&mut self, tree: &Tree, id: NodeId) -> Result<(), TreeError> {
		self.selected = Some(RootPath::trace(tree, id)?);
		Ok(())
	}

	/// Clear the selection if `id` is the anchor, otherwise select `id`.
	/// Returns whether a selection is active afterwards.
	pub fn toggle_select(&mut self, tree: &Tree, id: NodeId) -> Result<bool, TreeError> {
		if self.selected_anchor() == Some(id) {
			self.selected = None;
			return Ok(false);
		}
		self.select(tree, id)?;
		Ok(true)
	}

	/// Drop the selection.
	pub fn clear_selection(&mut self) {
		self.selected = None;
	}

	/// Replace the hover path with the walk from `id`.
	pub fn hover_enter(&mut self, tree: &Tree, id: NodeId) -> Result<(), TreeError> {
		let path = RootPath::trace(tree, id)?;
		self.hover = Some(path);
		Ok(())
	}

	/// Drop the hover path.
	pub fn hover_exit(&mut self) {
		self.hover = None;
	}

	/// Anchor of the current selection.
	pub fn selected_anchor(&self) -> Option<NodeId> {
		self.selected.as_ref().map(RootPath::anchor)
	}

	/// Anchor of the current hover.
	pub fn hovered_anchor(&self) -> Option<NodeId> {
		self.hover.as_ref().map(RootPath::anchor)
	}

	/// The selection path, if any.
	pub fn selected_path(&self) -> Option<&RootPath> {
		self.selected.as_ref()
	}

	/// The hover path, if any.
	pub fn hover_path(&self) -> Option<&RootPath> {
		self.hover.as_ref()
	}

	/// Combined tier of node `id`.
	pub fn node_state(&self, id: NodeId) -> NodeHighlight {
		let selected = self.selected.as_ref().is_some_and(|p| p.contains_node(id));
		let hovered = self.hover.as_ref().is_some_and(|p| p.contains_node(id));
		match (selected, hovered) {
			(true, true) => NodeHighlight::Both,
			(true, false) => NodeHighlight::SelectedOnly,
			(false, true) => NodeHighlight::HoverOnly,
			(false, false) => NodeHighlight::None,
		}
	}

	/// Combined tier of `edge`.
	pub fn edge_state(&self, edge: &Edge) -> EdgeHighlight {
		if self.selected.as_ref().is_some_and(|p| p.contains_edge(edge)) {
			EdgeHighlight::Selected
		} else if self.hover.as_ref().is_some_and(|p| p.contains_edge(edge)) {
			EdgeHighlight::Hover
		} else {
			EdgeHighlight::None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::lineage_tree::model::NodeSpec;

	fn lineage() -> (Tree, NodeId, NodeId, NodeId, NodeId) {
		let tree = Tree::from_spec(NodeSpec::new("root").with_children([
			NodeSpec::new("P").with_children([NodeSpec::new("A")]),
			NodeSpec::new("Q"),
		]))
		.unwrap();
		let id = |name: &str| tree.find_by_name(name).unwrap().id();
		let (root, p, a, q) = (id("root"), id("P"), id("A"), id("Q"));
		(tree, root, p, a, q)
	}

	#[test]
	fn selection_path_covers_ancestors_and_edges() {
		let (tree, root, p, a, q) = lineage();
		let mut highlight = Highlight::default();
		highlight.select(&tree, a).unwrap();

		let path = highlight.selected_path().unwrap();
		let mut nodes: Vec<NodeId> = path.nodes().collect();
		nodes.sort();
		assert_eq!(nodes, vec![root, p, a]);
		assert_eq!(path.edge_count(), 2);
		assert!(path.contains_edge(&Edge { parent: root, child: p }));
		assert!(path.contains_edge(&Edge { parent: p, child: a }));
		assert!(!path.contains_edge(&Edge { parent: root, child: q }));
	}

	#[test]
	fn overlapping_paths_merge_per_node() {
		let (tree, root, p, a, q) = lineage();
		let mut highlight = Highlight::default();
		highlight.select(&tree, a).unwrap();
		highlight.hover_enter(&tree, root).unwrap();

		assert_eq!(highlight.node_state(root), NodeHighlight::Both);
		assert_eq!(highlight.node_state(p), NodeHighlight::SelectedOnly);
		assert_eq!(highlight.node_state(q), NodeHighlight::None);

		highlight.hover_enter(&tree, q).unwrap();
		assert_eq!(highlight.node_state(q), NodeHighlight::HoverOnly);
		assert_eq!(
			highlight.edge_state(&Edge { parent: root, child: q }),
			EdgeHighlight::Hover
		);
		assert_eq!(
			highlight.edge_state(&Edge { parent: root, child: p }),
			EdgeHighlight::Selected
		);
	}

	#[test]
	fn toggling_the_anchor_clears_selection() {
		let (tree, _, p, a, _) = lineage();
		let mut highlight = Highlight::default();
		assert!(highlight.toggle_select(&tree, a).unwrap());
		assert!(highlight.toggle_select(&tree, p).unwrap());
		assert_eq!(highlight.selected_anchor(), Some(p));
		assert_eq!(highlight.node_state(a), NodeHighlight::None);
		assert!(!highlight.toggle_select(&tree, p).unwrap());
		assert_eq!(highlight.selected_anchor(), None);
	}

	#[test]
	fn new_hover_replaces_the_old_one() {
		let (tree, root, p, a, q) = lineage();
		let mut highlight = Highlight::default();
		highlight.hover_enter(&tree, a).unwrap();
		highlight.hover_enter(&tree, q).unwrap();
		assert_eq!(highlight.node_state(a), NodeHighlight::None);
		assert_eq!(highlight.node_state(p), NodeHighlight::None);
		assert_eq!(highlight.node_state(root), NodeHighlight::HoverOnly);

		let once = highlight.hover_path().cloned();
		highlight.hover_enter(&tree, q).unwrap();
		assert_eq!(highlight.hover_path().cloned(), once);

		highlight.hover_exit();
		assert_eq!(highlight.node_state(root), NodeHighlight::None);
	}

	#[test]
	fn unknown_anchor_keeps_previous_state() {
		let (tree, _, _, a, _) = lineage();
		let other = Tree::from_spec(
			NodeSpec::new("other").with_children((0..6).map(|i| NodeSpec::new(format!("c{i}")))),
		)
		.unwrap();
		let stranger = other.find_by_name("c5").unwrap().id();

		let mut highlight = Highlight::default();
		highlight.select(&tree, a).unwrap();
		assert!(highlight.toggle_select(&tree, stranger).is_err());
		assert!(highlight.hover_enter(&tree, stranger).is_err());
		assert_eq!(highlight.selected_anchor(), Some(a));
		assert_eq!(highlight.hovered_anchor(), None);
	}
}
