//! Controller state owned by the canvas component, and the handlers that
//! turn input events into render passes.

use kurbo::{Point, Size};
use log::{debug, warn};

use super::config::TreeConfig;
use super::gesture::{PanState, TouchAction, TouchTracker, WheelAction, WheelInput, classify_wheel};
use super::highlight::Highlight;
use super::layout::{Layout, layout_extent};
use super::model::{NodeId, NodeSpec, Tree, TreeError};
use super::scene::{Frame, Reconciliation, Scene};
use super::viewport::Viewport;

/// Everything the canvas needs between events: the tree, its current layout,
/// the animated scene, both highlight paths and the camera.
pub struct TreeState {
	tree: Tree,
	config: TreeConfig,
	extent: f64,
	layout: Layout,
	scene: Scene,
	highlight: Highlight,
	/// Camera and surface extents.
	pub viewport: Viewport,
	/// Mouse drag in progress, if any.
	pub pan: PanState,
	/// Active touch points.
	pub touches: TouchTracker,
	container: Size,
	/// Something changed since the last drawn frame.
	dirty: bool,
}

impl TreeState {
	/// Build the state and run the first render pass, which also auto-fits.
	pub fn new(tree: Tree, config: TreeConfig, container: Size, now: f64) -> Self {
		let extent = layout_extent(&tree, &config);
		let root = tree.root().id();
		let mut state = Self {
			tree,
			config,
			extent,
			layout: Layout::default(),
			scene: Scene::default(),
			highlight: Highlight::default(),
			viewport: Viewport::default(),
			pan: PanState::default(),
			touches: TouchTracker::default(),
			container,
			dirty: true,
		};
		state.render_pass(root, now);
		state
	}

	/// The model being shown.
	pub fn tree(&self) -> &Tree {
		&self.tree
	}

	/// Tunables in effect.
	pub fn config(&self) -> &TreeConfig {
		&self.config
	}

	/// Layout from the latest render pass.
	pub fn layout(&self) -> &Layout {
		&self.layout
	}

	/// Selection and hover paths.
	pub fn highlight(&self) -> &Highlight {
		&self.highlight
	}

	/// Retained scene elements.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Size of the hosting canvas.
	pub fn container(&self) -> Size {
		self.container
	}

	/// Re-layout the visible tree and bring the scene, the surface bounds and
	/// (on first load) the camera up to date. `source` is the node whose change
	/// triggered the pass; new elements grow out of it.
	pub fn render_pass(&mut self, source: NodeId, now: f64) -> Reconciliation {
		let mut next = Layout::compute(&self.tree, &self.config, self.extent);
		next.inherit_positions(&self.layout);
		self.layout = next;

		let report = self
			.scene
			.reconcile(&self.layout, source, &self.highlight, &self.config, now);

		let config = &self.config;
		let nodes = self
			.layout
			.nodes()
			.iter()
			.map(|node| (node.center(), node.size(config)));
		if let Err(err) = self.viewport.recompute_bounds(nodes, config) {
			warn!("surface bounds kept: {err}");
		}
		self.viewport.after_layout(self.container, config, now);
		self.dirty = true;
		report
	}

	/// Toggle selection of `id`. Returns whether anything changed.
	pub fn click(&mut self, id: NodeId, now: f64) -> bool {
		match self.highlight.toggle_select(&self.tree, id) {
			Ok(selected) => {
				debug!("{id} {}", if selected { "selected" } else { "deselected" });
				self.render_pass(id, now);
				true
			}
			Err(err) => reject("select", err),
		}
	}

	/// Collapse or expand `id`. Leaves without a stash are left alone.
	pub fn double_click(&mut self, id: NodeId, now: f64) -> bool {
		match self.tree.toggle(id) {
			Ok(true) => {
				self.render_pass(id, now);
				true
			}
			Ok(false) => false,
			Err(err) => reject("toggle", err),
		}
	}

	/// Move the hover path to `id`, or clear it. Repeating the current hover
	/// target does nothing.
	pub fn hover(&mut self, id: Option<NodeId>, now: f64) -> bool {
		if self.highlight.hovered_anchor() == id {
			return false;
		}
		let source = match id {
			Some(id) => {
				if let Err(err) = self.highlight.hover_enter(&self.tree, id) {
					return reject("hover", err);
				}
				id
			}
			None => {
				self.highlight.hover_exit();
				self.tree.root().id()
			}
		};
		self.render_pass(source, now);
		true
	}

	/// Insert a new child under `parent` and re-render.
	pub fn add_child(&mut self, parent: NodeId, spec: NodeSpec, now: f64) -> Option<NodeId> {
		match self.tree.add_child(parent, spec) {
			Ok(id) => {
				self.render_pass(parent, now);
				Some(id)
			}
			Err(err) => {
				reject("add child", err);
				None
			}
		}
	}

	/// Topmost node under a canvas point.
	pub fn node_at_position(&self, at: Point, now: f64) -> Option<NodeId> {
		let surface = self.viewport.transform(now).invert(at, &self.config);
		self.scene.node_at(surface, now)
	}

	/// Mouse button pressed; may start a drag.
	pub fn pointer_down(&mut self, at: Point) {
		self.pan.begin(at);
	}

	/// Drag pans; otherwise the hover path follows the pointer.
	pub fn pointer_move(&mut self, at: Point, now: f64) {
		if let Some(delta) = self.pan.update(at) {
			self.viewport.pan_by(delta, &self.config, now);
			self.dirty = true;
		} else {
			let hovered = self.node_at_position(at, now);
			self.hover(hovered, now);
		}
	}

	/// Mouse button released.
	pub fn pointer_up(&mut self) {
		self.pan.end();
	}

	/// Pointer left the canvas: ends any drag and clears the hover path.
	pub fn pointer_leave(&mut self, now: f64) {
		self.pan.end();
		self.hover(None, now);
	}

	/// Click at a canvas point. Presses that turned into drags are ignored.
	pub fn click_at(&mut self, at: Point, now: f64) -> bool {
		if self.pan.was_drag() {
			return false;
		}
		match self.node_at_position(at, now) {
			Some(id) => self.click(id, now),
			None => false,
		}
	}

	/// Double click at a canvas point toggles the node under it.
	pub fn double_click_at(&mut self, at: Point, now: f64) -> bool {
		match self.node_at_position(at, now) {
			Some(id) => self.double_click(id, now),
			None => false,
		}
	}

	/// Wheel scrolls the view, or zooms it when Ctrl or Meta is held.
	pub fn wheel(&mut self, input: &WheelInput, now: f64) {
		match classify_wheel(input) {
			WheelAction::Pan(delta) => self.viewport.scroll_by(delta, &self.config, now),
			WheelAction::Zoom { anchor, factor } => {
				self.viewport.zoom_at(anchor, factor, &self.config, now)
			}
			WheelAction::Ignore => return,
		}
		self.dirty = true;
	}

	/// Touches began.
	pub fn touch_start(&mut self, points: &[Point]) {
		self.touches.reset(points);
	}

	/// One finger pans, two fingers pinch-zoom.
	pub fn touch_move(&mut self, points: &[Point], now: f64) {
		match self.touches.update(points) {
			Some(TouchAction::Pan(delta)) => self.viewport.pan_by(delta, &self.config, now),
			Some(TouchAction::Pinch {
				anchor,
				factor,
				pan,
			}) => {
				self.viewport.zoom_at(anchor, factor, &self.config, now);
				self.viewport.pan_by(pan, &self.config, now);
			}
			None => return,
		}
		self.dirty = true;
	}

	/// Touches ended or were cancelled.
	pub fn touch_end(&mut self, points: &[Point]) {
		self.touches.reset(points);
	}

	/// Re-run auto-fit on demand.
	pub fn fit(&mut self, now: f64) -> bool {
		match self.viewport.auto_fit(self.container, &self.config, now) {
			Ok(_) => {
				self.dirty = true;
				true
			}
			Err(err) => {
				warn!("fit skipped: {err}");
				false
			}
		}
	}

	/// New container size. A load that could not fit yet gets another try.
	pub fn resize(&mut self, container: Size, now: f64) {
		self.container = container;
		self.viewport.after_layout(container, &self.config, now);
		self.dirty = true;
	}

	/// Per-frame housekeeping; drops finished exit transitions.
	pub fn tick(&mut self, now: f64) -> usize {
		self.scene.prune(now)
	}

	/// Whether a frame drawn at `now` would differ from the last one drawn.
	pub fn needs_redraw(&self, now: f64) -> bool {
		self.dirty || !self.scene.is_settled(now) || !self.viewport.is_idle(now)
	}

	/// Record that a frame was drawn at `now`. A frame taken mid-transition
	/// keeps the state dirty so the settled frame still gets drawn.
	pub fn drawn(&mut self, now: f64) {
		self.dirty = !self.scene.is_settled(now) || !self.viewport.is_idle(now);
	}

	/// Sampled scene at `now`.
	pub fn frame(&self, now: f64) -> Frame<'_> {
		self.scene.frame(now)
	}
}

fn reject(action: &str, err: TreeError) -> bool {
	warn!("{action} ignored: {err}");
	false
}

#[cfg(test)]
mod tests {
	use kurbo::Vec2;

	use super::*;
	use crate::components::lineage_tree::highlight::{EdgeHighlight, NodeHighlight};

	fn sample() -> Tree {
		let spec = NodeSpec::new("root").with_children([
			NodeSpec::new("a").with_children([NodeSpec::new("a1"), NodeSpec::new("a2")]),
			NodeSpec::new("b").with_children([NodeSpec::new("b1")]),
		]);
		Tree::from_spec(spec).unwrap()
	}

	fn state() -> TreeState {
		TreeState::new(sample(), TreeConfig::default(), Size::new(1000.0, 600.0), 0.0)
	}

	fn id(state: &TreeState, name: &str) -> NodeId {
		state.tree().find_by_name(name).unwrap().id()
	}

	#[test]
	fn first_pass_fits_and_enters_everything() {
		let state = state();
		assert_eq!(state.layout().len(), 6);
		assert_eq!(state.scene().node_count(), 6);
		assert_eq!(state.scene().edge_count(), 5);
		assert!(state.viewport.is_fitted());
		assert_eq!(state.viewport.target().k, 0.5);
	}

	#[test]
	fn collapse_removes_descendants_after_transition() {
		let mut state = state();
		let a = id(&state, "a");
		assert!(state.double_click(a, 1000.0));
		assert_eq!(state.layout().len(), 4);
		assert_eq!(state.scene().node_count(), 6);
		assert_eq!(state.tick(1500.0), 4);
		assert_eq!(state.scene().node_count(), 4);

		assert!(state.double_click(a, 2000.0));
		assert_eq!(state.layout().len(), 6);
		assert!(!state.double_click(id(&state, "a1"), 3000.0));
	}

	#[test]
	fn camera_survives_structural_changes() {
		let mut state = state();
		let config = state.config().clone();
		state.viewport.pan_by(Vec2::new(30.0, 40.0), &config, 1000.0);
		let moved = state.viewport.target();
		let b = id(&state, "b");
		state.double_click(b, 1100.0);
		state.click(b, 1200.0);
		assert_eq!(state.viewport.target(), moved);
	}

	#[test]
	fn selection_and_hover_compose() {
		let mut state = state();
		let (a1, a2, root) = (id(&state, "a1"), id(&state, "a2"), state.tree().root().id());
		assert!(state.click(a1, 0.0));
		assert!(state.hover(Some(a2), 0.0));
		assert!(!state.hover(Some(a2), 10.0));
		let h = state.highlight();
		assert_eq!(h.node_state(root), NodeHighlight::Both);
		assert_eq!(h.node_state(a1), NodeHighlight::SelectedOnly);
		assert_eq!(h.node_state(a2), NodeHighlight::HoverOnly);
		let a2_edge = state
			.layout()
			.edges()
			.iter()
			.find(|e| e.child == a2)
			.copied()
			.unwrap();
		assert_eq!(h.edge_state(&a2_edge), EdgeHighlight::Hover);

		assert!(state.click(a1, 20.0));
		assert_eq!(state.highlight().selected_anchor(), None);
		assert!(state.hover(None, 30.0));
		assert_eq!(state.highlight().node_state(root), NodeHighlight::None);
	}

	#[test]
	fn unknown_ids_are_rejected_without_mutation() {
		let mut state = state();
		let mut other = Tree::new("x").unwrap();
		let mut stranger = other.root().id();
		for _ in 0..10 {
			stranger = other.add_child(stranger, NodeSpec::new("y")).unwrap();
		}
		assert!(!state.click(stranger, 0.0));
		assert!(!state.double_click(stranger, 0.0));
		assert!(!state.hover(Some(stranger), 0.0));
		assert_eq!(state.add_child(stranger, NodeSpec::new("z"), 0.0), None);
		assert_eq!(state.highlight().selected_anchor(), None);
		assert_eq!(state.tree().node_count(), 6);
	}

	#[test]
	fn pointer_hits_nodes_through_the_camera() {
		let mut state = state();
		let now = 10_000.0;
		let root = state.tree().root().id();
		let centre = state.layout().node(root).unwrap().center();
		let screen = state.viewport.transform(now).to_affine(state.config()) * centre;
		assert_eq!(state.node_at_position(screen, now), Some(root));

		state.pointer_move(screen, now);
		assert_eq!(state.highlight().hovered_anchor(), Some(root));
		assert!(state.click_at(screen, now));
		assert_eq!(state.highlight().selected_anchor(), Some(root));

		state.pointer_leave(now);
		assert_eq!(state.highlight().hovered_anchor(), None);
	}

	#[test]
	fn drag_pans_and_swallows_click() {
		let mut state = state();
		let before = state.viewport.target();
		state.pointer_down(Point::new(10.0, 10.0));
		state.pointer_move(Point::new(60.0, 10.0), 1000.0);
		state.pointer_up();
		assert!(!state.click_at(Point::new(60.0, 10.0), 1000.0));
		assert_eq!(state.viewport.target().x, before.x + 50.0);
	}

	#[test]
	fn long_drag_stops_at_the_surface_edge() {
		let mut state = state();
		let now = 1000.0;
		state.pointer_down(Point::new(10.0, 10.0));
		state.pointer_move(Point::new(-100_000.0, 10.0), now);
		state.pointer_up();
		let config = state.config().clone();
		let screen = state.viewport.surface_on_screen(&config, now).unwrap();
		assert!(screen.x1.abs() < 1e-9);
		assert!(screen.y0 < state.container().height && screen.y1 > 0.0);
	}

	#[test]
	fn wheel_routes_to_pan_or_zoom() {
		let mut state = state();
		let now = 10_000.0;
		let before = state.viewport.transform(now);
		state.wheel(
			&WheelInput {
				delta: Vec2::new(0.0, 20.0),
				..WheelInput::default()
			},
			now,
		);
		let panned = state.viewport.target();
		assert_eq!(panned.k, before.k);
		assert_eq!(panned.y, before.y - 20.0 * before.k);

		state.wheel(
			&WheelInput {
				delta: Vec2::new(0.0, -50.0),
				ctrl: true,
				position: Point::new(500.0, 300.0),
				..WheelInput::default()
			},
			now,
		);
		assert!((state.viewport.target().k - before.k * 2.0).abs() < 1e-12);
	}

	#[test]
	fn redraws_stop_once_everything_settles() {
		let mut state = state();
		assert!(state.needs_redraw(0.0));
		state.drawn(100.0);
		assert!(state.needs_redraw(200.0));

		let settled = 2000.0;
		state.tick(settled);
		state.drawn(settled);
		assert!(!state.needs_redraw(settled + 16.0));

		state.pointer_move(Point::new(-500.0, -500.0), settled + 20.0);
		assert!(!state.needs_redraw(settled + 32.0));

		state.pointer_down(Point::new(10.0, 10.0));
		state.pointer_move(Point::new(30.0, 10.0), settled + 40.0);
		assert!(state.needs_redraw(settled + 48.0));
		state.drawn(settled + 48.0);
		assert!(!state.needs_redraw(settled + 64.0));

		let b = id(&state, "b");
		state.click(b, settled + 100.0);
		state.drawn(settled + 100.0);
		assert!(state.needs_redraw(settled + 150.0));
	}

	#[test]
	fn add_child_grows_the_tree() {
		let mut state = state();
		let b1 = id(&state, "b1");
		let added = state.add_child(b1, NodeSpec::new("b1x"), 0.0).unwrap();
		assert!(state.layout().contains(added));
		assert_eq!(state.layout().node(added).unwrap().depth, 3);
	}
}
