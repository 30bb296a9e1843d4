//! Tree model: nested nodes with an explicit collapse state.
//!
//! Every node owns its children through a [`Branch`], which is either the
//! visible child list or the stash set aside by a collapse. Because the two
//! live in one enum there is no way for a node to hold both at once.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use serde::Deserialize;

/// Stable node identifier, assigned once by the owning [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node_{}", self.0)
	}
}

/// Errors reported by tree operations. A failed operation never mutates the tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
	/// A node spec had no name, or only whitespace.
	#[error("node name must not be empty")]
	MissingName,
	/// The referenced id does not belong to this tree.
	#[error("no node with id {0}")]
	UnknownNode(NodeId),
	/// JSON input could not be decoded into node specs.
	#[error("invalid tree json: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Children of a node: shown, or stashed away by a collapse.
#[derive(Clone, Debug, PartialEq)]
pub enum Branch {
	/// Children taking part in layout. Empty for leaves.
	Visible(Vec<Node>),
	/// Children hidden by a collapse. Never empty.
	Collapsed(Vec<Node>),
}

/// A single tree entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	id: NodeId,
	name: String,
	branch: Branch,
}

impl Node {
	/// Stable identifier.
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Display label.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Current collapse state together with the children it holds.
	pub fn branch(&self) -> &Branch {
		&self.branch
	}

	/// Children that layout and rendering traverse.
	pub fn visible_children(&self) -> &[Node] {
		match &self.branch {
			Branch::Visible(children) => children,
			Branch::Collapsed(_) => &[],
		}
	}

	/// Children regardless of collapse state.
	pub fn all_children(&self) -> &[Node] {
		match &self.branch {
			Branch::Visible(children) | Branch::Collapsed(children) => children,
		}
	}

	/// True when this node has a non-empty collapse stash.
	pub fn is_collapsed(&self) -> bool {
		matches!(self.branch, Branch::Collapsed(_))
	}

	fn children_mut(&mut self) -> &mut Vec<Node> {
		match &mut self.branch {
			Branch::Visible(children) | Branch::Collapsed(children) => children,
		}
	}

	fn collapse(&mut self) -> bool {
		let Branch::Visible(children) = &mut self.branch else {
			return false;
		};
		if children.is_empty() {
			return false;
		}
		let stash = mem::take(children);
		self.branch = Branch::Collapsed(stash);
		true
	}

	fn expand(&mut self) -> bool {
		let Branch::Collapsed(stash) = &mut self.branch else {
			return false;
		};
		let children = mem::take(stash);
		self.branch = Branch::Visible(children);
		true
	}
}

/// Input description of a node, before ids are assigned.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeSpec {
	/// Display label; required and non-blank.
	#[serde(default)]
	pub name: Option<String>,
	/// Child specs in display order.
	#[serde(default)]
	pub children: Vec<NodeSpec>,
}

impl NodeSpec {
	/// A leaf spec with the given name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: Some(name.into()),
			children: Vec::new(),
		}
	}

	/// Replace the children of this spec.
	pub fn with_children(mut self, children: impl IntoIterator<Item = NodeSpec>) -> Self {
		self.children = children.into_iter().collect();
		self
	}

	fn validate(&self) -> Result<(), TreeError> {
		let mut stack = vec![self];
		while let Some(spec) = stack.pop() {
			match &spec.name {
				Some(name) if !name.trim().is_empty() => {}
				_ => return Err(TreeError::MissingName),
			}
			stack.extend(&spec.children);
		}
		Ok(())
	}
}

/// One entry of [`Tree::flatten`]: a node and its child-index path from the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatEntry {
	/// The node.
	pub id: NodeId,
	/// Child indices leading from the root to this node.
	pub path: Vec<usize>,
}

/// Owning tree with an id allocator and a parent index.
#[derive(Clone, Debug)]
pub struct Tree {
	root: Node,
	parents: HashMap<NodeId, NodeId>,
	next_id: u32,
}

impl Tree {
	/// Create a tree holding a single root node.
	pub fn new(root_name: impl Into<String>) -> Result<Self, TreeError> {
		Self::from_spec(NodeSpec::new(root_name))
	}

	/// Build a tree from a nested spec. The whole spec is validated first.
	pub fn from_spec(spec: NodeSpec) -> Result<Self, TreeError> {
		spec.validate()?;
		let mut tree = Self {
			root: Node {
				id: NodeId(0),
				name: String::new(),
				branch: Branch::Visible(Vec::new()),
			},
			parents: HashMap::new(),
			next_id: 1,
		};
		tree.root = tree.instantiate(spec, None);
		Ok(tree)
	}

	/// Decode a nested `{ "name": .., "children": [..] }` document.
	pub fn from_json(json: &str) -> Result<Self, TreeError> {
		let spec: NodeSpec = serde_json::from_str(json)?;
		Self::from_spec(spec)
	}

	/// Assign ids in pre-order, then assemble the nodes bottom-up.
	fn instantiate(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> Node {
		let mut order = Vec::new();
		let mut pending = vec![(spec, parent)];
		while let Some((NodeSpec { name, children }, parent)) = pending.pop() {
			let id = NodeId(self.next_id);
			self.next_id += 1;
			if let Some(parent) = parent {
				self.parents.insert(id, parent);
			}
			order.push((id, name.unwrap_or_default(), children.len()));
			pending.extend(children.into_iter().rev().map(|child| (child, Some(id))));
		}

		// Walking pre-order backwards leaves a node's subtrees on top of
		// `built`, last child first.
		let mut built: Vec<Node> = Vec::new();
		for (id, name, count) in order.into_iter().rev() {
			let mut children = built.split_off(built.len() - count);
			children.reverse();
			built.push(Node {
				id,
				name,
				branch: Branch::Visible(children),
			});
		}
		built.pop().unwrap_or_else(|| Node {
			id: NodeId(0),
			name: String::new(),
			branch: Branch::Visible(Vec::new()),
		})
	}

	/// The root node.
	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Whether `id` names a node of this tree, hidden or not.
	pub fn contains(&self, id: NodeId) -> bool {
		id == self.root.id || self.parents.contains_key(&id)
	}

	/// Parent of `id`; `None` for the root and for unknown ids.
	pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
		self.parents.get(&id).copied()
	}

	/// Ids from `id` up to the root, inclusive.
	pub fn path_to_root(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
		if !self.contains(id) {
			return Err(TreeError::UnknownNode(id));
		}
		let mut path = vec![id];
		let mut current = id;
		while let Some(parent) = self.parent_of(current) {
			path.push(parent);
			current = parent;
		}
		Ok(path)
	}

	/// Look a node up by id, including nodes inside collapse stashes.
	pub fn get(&self, id: NodeId) -> Option<&Node> {
		let path = self.path_to_root(id).ok()?;
		let mut node = &self.root;
		for step in path.iter().rev().skip(1) {
			node = node.all_children().iter().find(|child| child.id == *step)?;
		}
		Some(node)
	}

	fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
		let path = self.path_to_root(id)?;
		let mut node = &mut self.root;
		for step in path.iter().rev().skip(1) {
			node = node
				.children_mut()
				.iter_mut()
				.find(|child| child.id == *step)
				.ok_or(TreeError::UnknownNode(id))?;
		}
		Ok(node)
	}

	/// Append a new subtree under `parent`. When the parent is collapsed the
	/// subtree joins its stash and stays hidden.
	pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, TreeError> {
		spec.validate()?;
		if !self.contains(parent) {
			return Err(TreeError::UnknownNode(parent));
		}
		let child = self.instantiate(spec, Some(parent));
		let id = child.id;
		self.get_mut(parent)?.children_mut().push(child);
		Ok(id)
	}

	/// Move visible children into the stash. Returns whether anything changed.
	pub fn collapse(&mut self, id: NodeId) -> Result<bool, TreeError> {
		Ok(self.get_mut(id)?.collapse())
	}

	/// Restore stashed children. Returns whether anything changed.
	pub fn expand(&mut self, id: NodeId) -> Result<bool, TreeError> {
		Ok(self.get_mut(id)?.expand())
	}

	/// Collapse an expanded node or expand a collapsed one.
	pub fn toggle(&mut self, id: NodeId) -> Result<bool, TreeError> {
		let node = self.get_mut(id)?;
		Ok(if node.is_collapsed() {
			node.expand()
		} else {
			node.collapse()
		})
	}

	/// Every node in pre-order, stashed subtrees included.
	pub fn iter(&self) -> impl Iterator<Item = &Node> {
		let mut stack = vec![&self.root];
		std::iter::from_fn(move || {
			let node = stack.pop()?;
			stack.extend(node.all_children().iter().rev());
			Some(node)
		})
	}

	/// First node in pre-order with the given name.
	pub fn find_by_name(&self, name: &str) -> Option<&Node> {
		self.iter().find(|node| node.name == name)
	}

	/// Total number of nodes, stashed subtrees included.
	pub fn node_count(&self) -> usize {
		self.parents.len() + 1
	}

	/// Depth of the deepest node, counting the root as depth 0.
	pub fn max_depth(&self) -> usize {
		let mut stack = vec![(&self.root, 0)];
		let mut deepest = 0;
		while let Some((node, depth)) = stack.pop() {
			deepest = deepest.max(depth);
			stack.extend(node.all_children().iter().map(|child| (child, depth + 1)));
		}
		deepest
	}

	/// Largest number of nodes sharing one depth.
	pub fn max_level_width(&self) -> usize {
		let mut level: Vec<&Node> = vec![&self.root];
		let mut widest = 0;
		while !level.is_empty() {
			widest = widest.max(level.len());
			level = level
				.iter()
				.flat_map(|node| node.all_children())
				.collect();
		}
		widest
	}

	/// Pre-order listing of every node with its child-index path.
	pub fn flatten(&self) -> Vec<FlatEntry> {
		let mut out = Vec::with_capacity(self.node_count());
		let mut stack = vec![(&self.root, Vec::new())];
		while let Some((node, path)) = stack.pop() {
			for (index, child) in node.all_children().iter().enumerate().rev() {
				let mut child_path = path.clone();
				child_path.push(index);
				stack.push((child, child_path));
			}
			out.push(FlatEntry { id: node.id, path });
		}
		out
	}
}

impl Drop for Tree {
	fn drop(&mut self) {
		let mut pending = mem::take(self.root.children_mut());
		while let Some(mut node) = pending.pop() {
			pending.append(node.children_mut());
		}
	}
}
