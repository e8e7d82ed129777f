//! Force layout lifecycle on top of the `force_graph` simulation.
//!
//! `force_graph` integrates inverse-square repulsion and edge springs. This
//! module adds what the relationship view needs around it:
//!
//! - an alpha "energy" that cools the layout to rest and is raised while a
//!   node is being dragged,
//! - a centering pass toward the viewport center and a collision pass that
//!   keeps node discs (plus padding) from overlapping,
//! - pinning for dragged nodes,
//! - a [`PositionStore`] keyed by person id. The simulation is its only
//!   writer; the renderer only reads it.
//!
//! A [`Simulation`] is stopped by consuming it with [`Simulation::stop`], which
//! hands back the last positions so the next build can be seeded from them.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::Deserialize;

use super::build::GraphModel;
use super::scale::Point;
use super::types::PersonId;

/// Converts d3-style per-tick strengths into `force_graph`'s continuous
/// forces at roughly 60 steps per second.
const SPRING_SCALE: f64 = 0.1;
const CHARGE_SCALE: f64 = 0.75;

/// Layout tuning. Strengths use the d3 conventions: negative charge repels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Target edge length, in world units. The engine's springs have no rest
	/// length, so this only tunes node mass; it is met exactly by an isolated
	/// linked pair and only approximately in denser neighborhoods.
	pub link_distance: f64,
	/// Spring stiffness, scaled into the engine's units.
	pub link_strength: f64,
	/// Repulsion between every pair of nodes; negative repels.
	pub charge_strength: f64,
	/// Added to each node's radius for collision.
	pub collision_padding: f64,
	/// The layout stops stepping once alpha drops below this.
	pub alpha_min: f64,
	/// Fraction of the gap to the alpha target closed per step.
	pub alpha_decay: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Upper bound on the force applied to one node per step.
	pub max_force: f64,
	/// Engine velocity multiplier.
	pub node_speed: f64,
	/// Velocity kept per step (0..1).
	pub damping: f64,
	/// Radius of the ring new nodes are placed on.
	pub seed_radius: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 80.0,
			link_strength: 0.5,
			charge_strength: -200.0,
			collision_padding: 4.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001f64.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.9,
			seed_radius: 100.0,
		}
	}
}

impl LayoutConfig {
	fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: (self.charge_strength.abs() * CHARGE_SCALE) as f32,
			force_spring: (self.link_strength * SPRING_SCALE) as f32,
			force_max: self.max_force as f32,
			node_speed: self.node_speed as f32,
			damping_factor: self.damping as f32,
		}
	}

	/// Node mass at which an isolated linked pair rests at `link_distance`:
	/// the spring pull `s * d / 2` balances the repulsion `c * m^2 / d^2`.
	/// Nodes with more neighbors settle closer or farther depending on the
	/// local balance of springs and charges.
	fn node_mass(&self) -> f32 {
		let spring = self.link_strength * SPRING_SCALE;
		let charge = (self.charge_strength.abs() * CHARGE_SCALE).max(f64::EPSILON);
		let mass = (spring * self.link_distance.powi(3) / (2.0 * charge)).sqrt();
		mass.max(1.0) as f32
	}
}

/// Latest node positions, keyed by person id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionStore {
	positions: HashMap<PersonId, Point>,
}

impl PositionStore {
	/// Last known position of person `id`.
	pub fn get(&self, id: PersonId) -> Option<Point> {
		self.positions.get(&id).copied()
	}

	fn set(&mut self, id: PersonId, at: Point) {
		self.positions.insert(id, at);
	}
}

#[derive(Clone, Debug)]
struct LayoutNode {
	model_index: usize,
}

#[derive(Clone, Copy, Debug)]
struct Body {
	pos: Point,
	radius: f64,
	pinned: bool,
}

/// Fallback direction for coincident bodies, spread by the golden angle.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos(), angle.sin())
}

/// Pushes overlapping pairs apart until their padded discs just touch.
/// Pinned bodies never move; their partner takes the whole correction.
fn resolve_collisions(bodies: &mut [Body], padding: f64) {
	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let (a, b) = (bodies[i], bodies[j]);
			if a.pinned && b.pinned {
				continue;
			}
			let min_dist = a.radius + b.radius + 2.0 * padding;
			let (dx, dy) = (b.pos.x - a.pos.x, b.pos.y - a.pos.y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist >= min_dist {
				continue;
			}
			let (ux, uy) = if dist > 1e-6 {
				(dx / dist, dy / dist)
			} else {
				jiggle(i, j)
			};
			let overlap = min_dist - dist;
			let (share_a, share_b) = match (a.pinned, b.pinned) {
				(true, _) => (0.0, 1.0),
				(_, true) => (1.0, 0.0),
				_ => (0.5, 0.5),
			};
			bodies[i].pos.x -= ux * overlap * share_a;
			bodies[i].pos.y -= uy * overlap * share_a;
			bodies[j].pos.x += ux * overlap * share_b;
			bodies[j].pos.y += uy * overlap * share_b;
		}
	}
}

/// Translates free bodies so the mean position moves onto `center`.
fn recenter(bodies: &mut [Body], center: Point) {
	if bodies.is_empty() {
		return;
	}
	let n = bodies.len() as f64;
	let (sx, sy) = bodies
		.iter()
		.fold((0.0, 0.0), |(sx, sy), b| (sx + b.pos.x, sy + b.pos.y));
	let (dx, dy) = (center.x - sx / n, center.y - sy / n);
	for body in bodies.iter_mut().filter(|b| !b.pinned) {
		body.pos.x += dx;
		body.pos.y += dy;
	}
}

/// One running force layout over one [`GraphModel`].
pub struct Simulation {
	graph: ForceGraph<LayoutNode, ()>,
	handles: Vec<DefaultNodeIdx>,
	ids: Vec<PersonId>,
	bodies: Vec<Body>,
	positions: PositionStore,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	config: LayoutConfig,
}

impl Simulation {
	/// Starts a layout for `model`. Nodes with a position in `seed` resume
	/// from it; the rest are placed on a ring around `center`.
	pub fn start(
		model: &GraphModel,
		seed: Option<&PositionStore>,
		center: Point,
		config: &LayoutConfig,
	) -> Self {
		let mut graph = ForceGraph::new(config.parameters());
		let mass = config.node_mass();
		let count = model.nodes.len();
		let mut handles = Vec::with_capacity(count);
		let mut bodies = Vec::with_capacity(count);
		let mut positions = PositionStore::default();
		let mut reused = 0;

		for (i, node) in model.nodes.iter().enumerate() {
			let pos = match seed.and_then(|s| s.get(node.id)) {
				Some(p) => {
					reused += 1;
					p
				}
				None => {
					let angle = (i as f64) * 2.0 * PI / count as f64;
					Point::new(
						center.x + config.seed_radius * angle.cos(),
						center.y + config.seed_radius * angle.sin(),
					)
				}
			};
			let handle = graph.add_node(NodeData {
				x: pos.x as f32,
				y: pos.y as f32,
				mass,
				is_anchor: false,
				user_data: LayoutNode { model_index: i },
			});
			handles.push(handle);
			bodies.push(Body {
				pos,
				radius: model.node_radius(i),
				pinned: false,
			});
			positions.set(node.id, pos);
		}

		// Every spring gets the same tension; the engine has no per-edge weight,
		// so connection strength only shows in stroke width.
		for edge in &model.edges {
			graph.add_edge(handles[edge.source], handles[edge.target], EdgeData::default());
		}

		debug!(
			"archive-network: layout started with {} nodes ({} reseeded), {} edges",
			count,
			reused,
			model.edges.len()
		);

		Self {
			graph,
			handles,
			ids: model.nodes.iter().map(|n| n.id).collect(),
			bodies,
			positions,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			running: count > 0,
			config: config.clone(),
		}
	}

	/// Positions written by the last step.
	pub fn positions(&self) -> &PositionStore {
		&self.positions
	}

	/// Whether the layout still has energy to spend.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Moves the centering target, e.g. after a viewport resize.
	pub fn set_center(&mut self, center: Point) {
		self.center = center;
		self.restart();
	}

	/// Value alpha decays toward. Zero lets the layout come to rest.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	/// Resumes stepping without touching alpha.
	pub fn restart(&mut self) {
		self.running = !self.bodies.is_empty();
	}

	/// Fixes a node at `at` until [`Simulation::unpin`].
	pub fn pin(&mut self, idx: usize, at: Point) {
		let Some(body) = self.bodies.get_mut(idx) else {
			return;
		};
		body.pinned = true;
		body.pos = at;
		let handle = self.handles[idx];
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
				node.data.is_anchor = true;
			}
		});
		self.positions.set(self.ids[idx], at);
	}

	/// Hands a pinned node back to the simulation.
	pub fn unpin(&mut self, idx: usize) {
		let Some(body) = self.bodies.get_mut(idx) else {
			return;
		};
		body.pinned = false;
		let handle = self.handles[idx];
		self.graph.visit_nodes_mut(|node| {
			if node.index() == handle {
				node.data.is_anchor = false;
			}
		});
	}

	/// Advances one frame. Returns `false` once the layout is at rest.
	pub fn step(&mut self, dt: f32) -> bool {
		if !self.running {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.graph.update(dt * self.alpha as f32);

		let bodies = &mut self.bodies;
		self.graph.visit_nodes(|node| {
			let body = &mut bodies[node.data.user_data.model_index];
			if !body.pinned {
				body.pos = Point::new(node.x() as f64, node.y() as f64);
			}
		});
		recenter(bodies, self.center);
		resolve_collisions(bodies, self.config.collision_padding);

		let bodies = &self.bodies;
		self.graph.visit_nodes_mut(|node| {
			let body = &bodies[node.data.user_data.model_index];
			if !body.pinned {
				node.data.x = body.pos.x as f32;
				node.data.y = body.pos.y as f32;
			}
		});
		for (id, body) in self.ids.iter().zip(&self.bodies) {
			self.positions.set(*id, body.pos);
		}

		if self.alpha < self.config.alpha_min {
			self.running = false;
		}
		true
	}

	/// Stops the layout for good and returns its last positions.
	pub fn stop(self) -> PositionStore {
		debug!(
			"archive-network: layout stopped at alpha {:.4} with {} nodes",
			self.alpha,
			self.ids.len()
		);
		self.positions
	}
}

#[cfg(test)]
mod tests {
	use super::super::build::build_graph;
	use super::super::types::{Category, Connection, ConnectionType, Person};
	use super::*;

	const CENTER: Point = Point::new(400.0, 300.0);
	const DT: f32 = 0.016;

	fn model(count: i64, links: &[(i64, i64)]) -> GraphModel {
		let persons: Vec<_> = (1..=count)
			.map(|id| Person {
				id,
				name: format!("P{id}"),
				category: Category::Witness,
				description: None,
				aliases: Vec::new(),
			})
			.collect();
		let connections: Vec<_> = links
			.iter()
			.enumerate()
			.map(|(i, &(a, b))| Connection {
				id: i as i64,
				person_id1: a,
				person_id2: b,
				connection_type: ConnectionType::Employee,
				description: None,
				strength: 1.0,
			})
			.collect();
		build_graph(&persons, &connections)
	}

	fn run_to_rest(sim: &mut Simulation) {
		for _ in 0..20_000 {
			if !sim.step(DT) {
				return;
			}
		}
		panic!("layout never came to rest");
	}

	fn body(x: f64, y: f64, pinned: bool) -> Body {
		Body {
			pos: Point::new(x, y),
			radius: 5.0,
			pinned,
		}
	}

	#[test]
	fn stores_a_finite_position_for_every_node() {
		let m = model(5, &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 1)]);
		let mut sim = Simulation::start(&m, None, CENTER, &LayoutConfig::default());
		for _ in 0..50 {
			sim.step(DT);
		}
		assert_eq!(sim.positions().positions.len(), 5);
		for node in &m.nodes {
			let p = sim.positions().get(node.id).unwrap();
			assert!(p.x.is_finite() && p.y.is_finite());
		}
	}

	#[test]
	fn alpha_cools_until_the_layout_rests() {
		let m = model(4, &[(1, 2), (2, 3), (3, 4)]);
		let mut sim = Simulation::start(&m, None, CENTER, &LayoutConfig::default());
		assert!(sim.is_running());
		run_to_rest(&mut sim);
		assert!(sim.alpha < LayoutConfig::default().alpha_min);
		let frozen = sim.positions().clone();
		assert!(!sim.step(DT));
		assert_eq!(sim.positions(), &frozen);
	}

	#[test]
	fn empty_model_never_runs() {
		let m = model(0, &[]);
		let mut sim = Simulation::start(&m, None, CENTER, &LayoutConfig::default());
		assert!(!sim.is_running());
		assert!(!sim.step(DT));
		assert!(sim.stop().positions.is_empty());
	}

	#[test]
	fn pinned_node_holds_its_position() {
		let m = model(3, &[(1, 2), (2, 3)]);
		let mut sim = Simulation::start(&m, None, CENTER, &LayoutConfig::default());
		let at = Point::new(123.5, 456.25);
		sim.pin(1, at);
		sim.set_alpha_target(0.3);
		for _ in 0..100 {
			sim.step(DT);
		}
		assert_eq!(sim.positions().get(2), Some(at));
		assert!(sim.bodies[1].pinned);
		sim.unpin(1);
		assert!(!sim.bodies[1].pinned);
	}

	#[test]
	fn drag_without_moving_leaves_rest_positions_in_place() {
		let m = model(4, &[(1, 2), (2, 3), (3, 1), (3, 4)]);
		let config = LayoutConfig::default();
		let mut sim = Simulation::start(&m, None, CENTER, &config);
		run_to_rest(&mut sim);
		let before = sim.positions().clone();

		let here = before.get(3).unwrap();
		sim.pin(2, here);
		sim.set_alpha_target(config.drag_alpha_target);
		sim.restart();
		sim.step(DT);
		sim.step(DT);
		sim.unpin(2);
		sim.set_alpha_target(0.0);
		run_to_rest(&mut sim);

		for node in &m.nodes {
			let moved = before
				.get(node.id)
				.unwrap()
				.distance(sim.positions().get(node.id).unwrap());
			assert!(moved < 2.0, "node {} moved {moved}", node.id);
		}
	}

	#[test]
	fn stopped_positions_seed_the_next_layout_by_id() {
		let first = model(3, &[(1, 2)]);
		let mut sim = Simulation::start(&first, None, CENTER, &LayoutConfig::default());
		for _ in 0..30 {
			sim.step(DT);
		}
		let seed = sim.stop();

		// node 2 gone, node 4 new
		let persons = [1, 3, 4].map(|id| Person {
			id,
			name: String::new(),
			category: Category::Legal,
			description: None,
			aliases: Vec::new(),
		});
		let second = build_graph(&persons, &[]);
		let next = Simulation::start(&second, Some(&seed), CENTER, &LayoutConfig::default());

		assert_eq!(next.positions().get(1), seed.get(1));
		assert_eq!(next.positions().get(3), seed.get(3));
		assert!(next.positions().get(4).is_some());
		assert!(next.positions().get(2).is_none());
	}

	#[test]
	fn default_mass_rests_linked_pair_at_link_distance() {
		let config = LayoutConfig::default();
		let params = config.parameters();
		let m = config.node_mass() as f64;
		let rest = (2.0 * params.force_charge as f64 * m * m / params.force_spring as f64).cbrt();
		assert!((rest - config.link_distance).abs() < 0.5);
	}

	#[test]
	fn collision_pass_separates_padded_discs() {
		let mut bodies = [body(0.0, 0.0, false), body(1.0, 0.0, false)];
		resolve_collisions(&mut bodies, 4.0);
		let d = bodies[0].pos.distance(bodies[1].pos);
		assert!((d - 18.0).abs() < 1e-9);
		assert!((bodies[0].pos.x + bodies[1].pos.x - 1.0).abs() < 1e-9);
	}

	#[test]
	fn collision_pass_moves_only_the_free_partner() {
		let mut bodies = [body(0.0, 0.0, true), body(0.0, 0.0, false)];
		resolve_collisions(&mut bodies, 4.0);
		assert_eq!(bodies[0].pos, Point::new(0.0, 0.0));
		assert!((bodies[1].pos.distance(bodies[0].pos) - 18.0).abs() < 1e-9);
	}

	#[test]
	fn recenter_moves_mean_onto_center() {
		let mut bodies = [body(0.0, 0.0, false), body(10.0, 20.0, false)];
		recenter(&mut bodies, CENTER);
		let mean = Point::new(
			(bodies[0].pos.x + bodies[1].pos.x) / 2.0,
			(bodies[0].pos.y + bodies[1].pos.y) / 2.0,
		);
		assert!(mean.distance(CENTER) < 1e-9);

		let mut pinned = [body(0.0, 0.0, true), body(10.0, 0.0, false)];
		recenter(&mut pinned, Point::new(5.0, 0.0));
		assert_eq!(pinned[0].pos, Point::new(0.0, 0.0));
		assert_eq!(pinned[1].pos, Point::new(10.0, 0.0));
	}
}
