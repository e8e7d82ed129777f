//! Graph view state and interaction tracking.
//!
//! Combines the built model, the running layout, the pan/zoom transform and
//! the highlight view, and turns raw pointer events into drags, pans, hovers
//! and clicks. Nothing here touches the DOM; the component feeds it canvas
//! coordinates and the renderer reads from it.

use log::{debug, info};

use super::build::GraphModel;
use super::config::NetworkConfig;
use super::highlight::{HighlightView, toggle_selection};
use super::layout::{PositionStore, Simulation};
use super::scale::{Point, ZoomState};
use super::types::PersonId;

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Model index of the grabbed node.
	pub node: Option<usize>,
	/// Pointer position at press, screen-space.
	pub start: Point,
	/// Node position at press, world-space.
	pub node_start: Point,
	/// Set once the pointer travels past the click tolerance.
	pub moved: bool,
}

/// Tracks an in-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the background is being dragged.
	pub active: bool,
	/// Pointer position at press, screen-space.
	pub start: Point,
	/// View translation at press.
	pub transform_start: Point,
}

/// Core view state, created when the component mounts and mutated by event
/// handlers and the frame loop.
pub struct NetworkGraphState {
	pub model: GraphModel,
	/// Zoom limits and timings.
	pub zoom: ZoomState,
	/// In-progress node drag.
	pub drag: DragState,
	/// In-progress background pan.
	pub pan: PanState,
	/// Node under the pointer.
	pub hovered: Option<usize>,
	/// Derived from the selection and search.
	pub highlight: HighlightView,
	/// Settings the view was created with.
	pub config: NetworkConfig,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	simulation: Option<Simulation>,
	selected: Option<PersonId>,
	search: String,
	/// Set by anything that changes what is on screen outside of the layout
	/// and zoom transitions.
	redraw: bool,
}

impl NetworkGraphState {
	/// State for a `width` x `height` canvas, with the layout already started.
	pub fn new(model: GraphModel, width: f64, height: f64, config: NetworkConfig) -> Self {
		let config = config.normalized();
		let mut state = Self {
			model: GraphModel::default(),
			zoom: ZoomState::new(config.zoom.clone()),
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			highlight: HighlightView::default(),
			config,
			width,
			height,
			simulation: None,
			selected: None,
			search: String::new(),
			redraw: true,
		};
		state.rebuild(model);
		state
	}

	/// Viewport center in world units at the identity transform.
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}

	/// Replaces the model. The running layout is stopped first and its last
	/// positions seed the new one, so persons present in both keep their
	/// place. Interaction state that refers to old indices is dropped.
	pub fn rebuild(&mut self, model: GraphModel) {
		let seed = self.stop_layout();
		info!(
			"archive-network: graph rebuilt with {} nodes, {} edges ({} connections dropped)",
			model.nodes.len(),
			model.edges.len(),
			model.stats.dropped_connections
		);
		self.simulation = Some(Simulation::start(
			&model,
			seed.as_ref(),
			self.center(),
			&self.config.layout,
		));
		self.model = model;
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hovered = None;
		self.refresh_highlight();
		self.redraw = true;
	}

	/// Stops the running layout, if any, returning its final positions.
	pub fn stop_layout(&mut self) -> Option<PositionStore> {
		self.simulation.take().map(Simulation::stop)
	}

	/// Current positions, or `None` once the layout has been stopped.
	pub fn positions(&self) -> Option<&PositionStore> {
		self.simulation.as_ref().map(Simulation::positions)
	}

	/// Whether the layout is still moving nodes.
	pub fn is_settling(&self) -> bool {
		self.simulation.as_ref().is_some_and(Simulation::is_running)
	}

	/// Updates selection and search. Only the highlight view is recomputed;
	/// the layout is left alone.
	pub fn set_highlight(&mut self, selected: Option<PersonId>, search: &str) {
		if self.selected == selected && self.search == search {
			return;
		}
		self.selected = selected;
		self.search = search.to_owned();
		self.refresh_highlight();
		self.redraw = true;
	}

	fn refresh_highlight(&mut self) {
		self.highlight = HighlightView::compute(&self.model, self.selected, &self.search);
		if !self.search.is_empty() {
			debug!(
				"archive-network: search {:?} matches {} persons",
				self.search,
				self.highlight.match_count()
			);
		}
		if self.selected.is_some() && self.highlight.selected().is_none() {
			debug!(
				"archive-network: selected person {:?} is not in the graph",
				self.selected
			);
		}
	}

	/// The selection a click on `id` should produce.
	pub fn selection_after_click(&self, id: PersonId) -> Option<PersonId> {
		toggle_selection(self.selected, id)
	}

	/// Follows a canvas resize; the layout re-centers on the new viewport.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		let center = self.center();
		if let Some(sim) = self.simulation.as_mut() {
			sim.set_center(center);
		}
		self.redraw = true;
	}

	/// Advances the layout and any zoom transition by one frame. Returns
	/// whether the frame needs to be drawn.
	pub fn tick(&mut self, dt: f64) -> bool {
		let settling = self.is_settling();
		if let Some(sim) = self.simulation.as_mut() {
			sim.step(dt as f32);
		}
		let zooming = self.zoom.is_animating();
		self.zoom.tick(dt);
		settling || zooming || std::mem::take(&mut self.redraw)
	}

	/// Topmost node under a screen point.
	pub fn node_at(&self, screen: Point) -> Option<usize> {
		let world = self.zoom.transform().to_world(screen);
		let positions = self.positions()?;
		let padding = self.config.scale.hit_padding;
		self.model
			.nodes
			.iter()
			.enumerate()
			.filter_map(|(idx, node)| {
				let dist = positions.get(node.id)?.distance(world);
				(dist <= self.model.node_radius(idx) + padding).then_some((idx, dist))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(idx, _)| idx)
	}

	/// Pointer press: grabs the node under the pointer, or starts panning.
	pub fn pointer_down(&mut self, screen: Point) {
		match self.node_at(screen).zip(self.simulation.as_mut()) {
			Some((idx, sim)) => {
				let id = self.model.nodes[idx].id;
				let at = sim.positions().get(id).unwrap_or_default();
				sim.pin(idx, at);
				sim.set_alpha_target(self.config.layout.drag_alpha_target);
				sim.restart();
				self.drag = DragState {
					node: Some(idx),
					start: screen,
					node_start: at,
					moved: false,
				};
			}
			None => {
				let t = self.zoom.transform();
				self.pan = PanState {
					active: true,
					start: screen,
					transform_start: Point::new(t.x, t.y),
				};
			}
		}
	}

	/// Pointer motion: moves the pinned node or the view, and tracks hover
	/// while no drag is active.
	pub fn pointer_move(&mut self, screen: Point) {
		if let Some(idx) = self.drag.node {
			if screen.distance(self.drag.start) > self.config.scale.click_tolerance {
				self.drag.moved = true;
			}
			let k = self.zoom.transform().k;
			let to = Point::new(
				self.drag.node_start.x + (screen.x - self.drag.start.x) / k,
				self.drag.node_start.y + (screen.y - self.drag.start.y) / k,
			);
			if let Some(sim) = self.simulation.as_mut() {
				sim.pin(idx, to);
			}
			self.redraw = true;
			return;
		}

		let hovered = self.node_at(screen);
		if hovered != self.hovered {
			self.hovered = hovered;
			self.redraw = true;
		}
		if self.pan.active {
			self.zoom.set_translation(
				self.pan.transform_start.x + (screen.x - self.pan.start.x),
				self.pan.transform_start.y + (screen.y - self.pan.start.y),
			);
			self.redraw = true;
		}
	}

	/// Pointer release. Returns the person id when the press was a click on
	/// a node rather than a drag.
	pub fn pointer_up(&mut self) -> Option<PersonId> {
		self.pan = PanState::default();
		let drag = std::mem::take(&mut self.drag);
		let idx = drag.node?;
		self.release(idx);
		(!drag.moved).then(|| self.model.nodes[idx].id)
	}

	/// Pointer left the canvas: cancels any drag or pan and clears hover.
	pub fn pointer_leave(&mut self) {
		self.pan = PanState::default();
		if let Some(idx) = std::mem::take(&mut self.drag).node {
			self.release(idx);
		}
		self.hovered = None;
		self.redraw = true;
	}

	fn release(&mut self, idx: usize) {
		if let Some(sim) = self.simulation.as_mut() {
			sim.unpin(idx);
			sim.set_alpha_target(0.0);
		}
	}

	/// Wheel zoom about the pointer.
	pub fn wheel(&mut self, delta_y: f64, screen: Point) {
		self.zoom.wheel(delta_y, screen);
		self.redraw = true;
	}

	/// Button zoom in about the viewport center.
	pub fn zoom_in(&mut self) {
		let center = self.center();
		self.zoom.zoom_in(center);
	}

	/// Button zoom out about the viewport center.
	pub fn zoom_out(&mut self) {
		let center = self.center();
		self.zoom.zoom_out(center);
	}

	/// Animated return to the identity view.
	pub fn reset_zoom(&mut self) {
		self.zoom.reset();
	}
}

#[cfg(test)]
mod tests {
	use super::super::build::build_graph;
	use super::super::types::{Category, Connection, ConnectionType, Person};
	use super::*;

	fn people(ids: &[PersonId]) -> Vec<Person> {
		ids.iter()
			.map(|&id| Person {
				id,
				name: format!("Person {id}"),
				category: Category::KeyFigure,
				description: None,
				aliases: Vec::new(),
			})
			.collect()
	}

	fn links(pairs: &[(PersonId, PersonId)]) -> Vec<Connection> {
		pairs
			.iter()
			.enumerate()
			.map(|(i, &(a, b))| Connection {
				id: i as i64,
				person_id1: a,
				person_id2: b,
				connection_type: ConnectionType::SocialConnection,
				description: None,
				strength: 2.0,
			})
			.collect()
	}

	fn state() -> NetworkGraphState {
		let model = build_graph(&people(&[1, 2, 3]), &links(&[(1, 2), (2, 3)]));
		NetworkGraphState::new(model, 800.0, 600.0, NetworkConfig::default())
	}

	fn position_of(state: &NetworkGraphState, idx: usize) -> Point {
		let id = state.model.nodes[idx].id;
		state.positions().and_then(|p| p.get(id)).unwrap()
	}

	fn screen_of(state: &NetworkGraphState, idx: usize) -> Point {
		state
			.zoom
			.transform()
			.to_screen(position_of(state, idx))
	}

	#[test]
	fn click_on_node_reports_its_id() {
		let mut s = state();
		let at = screen_of(&s, 1);
		s.pointer_down(at);
		assert_eq!(s.drag.node, Some(1));
		assert_eq!(s.pointer_up(), Some(2));
		assert_eq!(s.drag.node, None);
	}

	#[test]
	fn click_twice_toggles_back_to_nothing_selected() {
		let mut s = state();
		let baseline = s.highlight.clone();
		for _ in 0..2 {
			let at = screen_of(&s, 0);
			s.pointer_down(at);
			let id = s.pointer_up().unwrap();
			let next = s.selection_after_click(id);
			s.set_highlight(next, "");
		}
		assert_eq!(s.highlight, baseline);
	}

	#[test]
	fn dragging_moves_the_pin_and_is_not_a_click() {
		let mut s = state();
		let start = screen_of(&s, 2);
		s.pointer_down(start);
		let to = Point::new(start.x + 40.0, start.y - 10.0);
		s.pointer_move(to);
		s.tick(0.016);
		let pinned = position_of(&s, 2);
		assert!((pinned.x - s.drag.node_start.x - 40.0).abs() < 1e-9);
		assert!((pinned.y - s.drag.node_start.y + 10.0).abs() < 1e-9);
		assert!(s.is_settling());
		assert_eq!(s.pointer_up(), None);
	}

	#[test]
	fn drag_distance_accounts_for_zoom() {
		let mut s = state();
		s.zoom_in();
		for _ in 0..40 {
			s.zoom.tick(0.016);
		}
		let start = screen_of(&s, 0);
		s.pointer_down(start);
		s.pointer_move(Point::new(start.x + 14.0, start.y));
		let pinned = position_of(&s, 0);
		assert!((pinned.x - s.drag.node_start.x - 10.0).abs() < 1e-9);
	}

	#[test]
	fn background_press_pans_the_view() {
		let mut s = state();
		let empty = Point::new(5.0, 5.0);
		assert_eq!(s.node_at(empty), None);
		s.pointer_down(empty);
		s.pointer_move(Point::new(25.0, -5.0));
		let t = s.zoom.transform();
		assert_eq!((t.x, t.y), (20.0, -10.0));
		assert_eq!(s.pointer_up(), None);
		assert!(!s.pan.active);
	}

	#[test]
	fn highlight_changes_leave_positions_alone() {
		let mut s = state();
		for _ in 0..20 {
			s.tick(0.016);
		}
		let before = s.positions().cloned();
		s.set_highlight(Some(1), "person");
		assert_eq!(s.positions().cloned(), before);
		assert_eq!(s.highlight.match_count(), 3);
	}

	#[test]
	fn rebuild_reconciles_selection_and_keeps_shared_positions() {
		let mut s = state();
		for _ in 0..20 {
			s.tick(0.016);
		}
		s.set_highlight(Some(3), "");
		assert_eq!(s.highlight.selected(), Some(2));
		let kept = s.positions().and_then(|p| p.get(1));

		s.rebuild(build_graph(&people(&[1, 2, 4]), &links(&[(1, 4)])));
		assert_eq!(s.highlight.selected(), None);
		assert!((0..3).all(|i| s.highlight.node(i).emphasized));
		assert_eq!(s.positions().and_then(|p| p.get(1)), kept);
		assert!(s.positions().and_then(|p| p.get(3)).is_none());

		s.rebuild(build_graph(&people(&[1, 2, 3]), &links(&[(2, 3)])));
		assert_eq!(s.highlight.selected(), Some(2));
	}

	#[test]
	fn leaving_the_canvas_releases_the_drag() {
		let mut s = state();
		let at = screen_of(&s, 0);
		s.pointer_down(at);
		s.pointer_leave();
		assert_eq!(s.drag.node, None);
		assert_eq!(s.hovered, None);
		assert_eq!(s.pointer_up(), None);
	}

	#[test]
	fn stopped_layout_is_gone() {
		let mut s = state();
		assert!(s.stop_layout().is_some());
		assert!(s.positions().is_none());
		assert!(s.stop_layout().is_none());
		s.tick(0.016);
		assert_eq!(s.node_at(Point::new(400.0, 300.0)), None);
	}

	#[test]
	fn idle_view_stops_redrawing_until_something_changes() {
		let mut s = state();
		for _ in 0..400 {
			s.tick(0.016);
		}
		assert!(!s.is_settling());
		assert!(!s.tick(0.016));

		s.set_highlight(Some(2), "");
		assert!(s.tick(0.016));
		assert!(!s.tick(0.016));

		s.zoom_in();
		assert!(s.tick(0.016));
	}

	#[test]
	fn inverted_page_zoom_limits_are_repaired_on_creation() {
		let config: NetworkConfig =
			serde_json::from_str(r#"{ "zoom": { "min_scale": 8 } }"#).unwrap();
		let model = build_graph(&people(&[1, 2]), &links(&[(1, 2)]));
		let mut s = NetworkGraphState::new(model, 800.0, 600.0, config);
		assert_eq!((s.config.zoom.min_scale, s.config.zoom.max_scale), (5.0, 8.0));

		s.wheel(-1.0, Point::new(10.0, 10.0));
		assert_eq!(s.zoom.transform().k, 5.0);
	}
}
