//! Graph construction from archive snapshots.
//!
//! Turns persons and connections into an immutable node/edge model. Edges
//! whose endpoints are missing from the person set are filtered out here, so
//! everything downstream can index nodes without checking.

use std::collections::HashMap;

use log::debug;

use super::scale::LinearScale;
use super::types::{Category, Connection, ConnectionType, Person, PersonId};

/// Smallest and largest node radius in world units.
pub const RADIUS_RANGE: (f64, f64) = (5.0, 24.0);

/// Rank fraction whose connection count becomes the label threshold.
pub const LABEL_PERCENTILE: f64 = 0.7;

/// One person in the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Person id.
	pub id: PersonId,
	/// Display name.
	pub name: String,
	/// Drives the fill color.
	pub category: Category,
	/// Number of built edges incident to this node.
	pub connection_count: usize,
}

/// One connection in the graph. `source`/`target` index into
/// [`GraphModel::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	/// Connection id.
	pub id: i64,
	/// Node index of the first endpoint.
	pub source: usize,
	/// Node index of the second endpoint.
	pub target: usize,
	/// Drives the stroke color and dash.
	pub connection_type: ConnectionType,
	/// Free-text context.
	pub description: Option<String>,
	/// Relative weight; stroke width grows with its square root.
	pub strength: f64,
}

impl GraphEdge {
	/// Whether `node` is one of the endpoints.
	pub fn touches(&self, node: usize) -> bool {
		self.source == node || self.target == node
	}
}

/// Records filtered out during a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
	/// Connections naming a person that is not in the snapshot.
	pub dropped_connections: usize,
	/// Person records whose id was already taken.
	pub duplicate_persons: usize,
	/// Connections from a person to themselves.
	pub self_loops: usize,
}

/// Immutable node/edge model for one rebuild.
#[derive(Clone, Debug)]
pub struct GraphModel {
	/// Nodes in input order, duplicates removed.
	pub nodes: Vec<GraphNode>,
	/// Edges whose endpoints both exist.
	pub edges: Vec<GraphEdge>,
	/// What the build filtered out.
	pub stats: BuildStats,
	index_by_id: HashMap<PersonId, usize>,
	radius_scale: LinearScale,
	label_threshold: usize,
}

impl Default for GraphModel {
	fn default() -> Self {
		build_graph(&[], &[])
	}
}

/// Builds the node/edge model.
///
/// Persons keep their input order. A connection is kept only when both of its
/// endpoints exist and differ; each kept connection bumps both endpoints'
/// `connection_count`.
pub fn build_graph(persons: &[Person], connections: &[Connection]) -> GraphModel {
	let mut stats = BuildStats::default();
	let mut nodes = Vec::with_capacity(persons.len());
	let mut index_by_id = HashMap::with_capacity(persons.len());

	for person in persons {
		if index_by_id.contains_key(&person.id) {
			stats.duplicate_persons += 1;
			continue;
		}
		index_by_id.insert(person.id, nodes.len());
		nodes.push(GraphNode {
			id: person.id,
			name: person.name.clone(),
			category: person.category,
			connection_count: 0,
		});
	}

	let mut edges = Vec::with_capacity(connections.len());
	for conn in connections {
		let (Some(&source), Some(&target)) = (
			index_by_id.get(&conn.person_id1),
			index_by_id.get(&conn.person_id2),
		) else {
			stats.dropped_connections += 1;
			continue;
		};
		if source == target {
			stats.self_loops += 1;
			continue;
		}
		nodes[source].connection_count += 1;
		nodes[target].connection_count += 1;
		edges.push(GraphEdge {
			id: conn.id,
			source,
			target,
			connection_type: conn.connection_type,
			description: conn.description.clone(),
			strength: conn.strength,
		});
	}

	if stats != BuildStats::default() {
		debug!(
			"archive-network: build dropped {} connections, {} duplicate persons, {} self-loops",
			stats.dropped_connections, stats.duplicate_persons, stats.self_loops
		);
	}

	let max_count = nodes.iter().map(|n| n.connection_count).max().unwrap_or(0);
	let radius_scale = LinearScale::new((0.0, max_count.max(1) as f64), RADIUS_RANGE);
	let label_threshold = percentile_count(&nodes, LABEL_PERCENTILE);

	GraphModel {
		nodes,
		edges,
		stats,
		index_by_id,
		radius_scale,
		label_threshold,
	}
}

/// Connection count found at `fraction` of the way through the ascending
/// ranking of all nodes. Zero for an empty graph.
fn percentile_count(nodes: &[GraphNode], fraction: f64) -> usize {
	if nodes.is_empty() {
		return 0;
	}
	let mut counts: Vec<usize> = nodes.iter().map(|n| n.connection_count).collect();
	counts.sort_unstable();
	let rank = ((counts.len() as f64) * fraction).floor() as usize;
	counts[rank.min(counts.len() - 1)]
}

impl GraphModel {
	/// Whether the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Dense index of the person `id`, if it is in the graph.
	pub fn index_of(&self, id: PersonId) -> Option<usize> {
		self.index_by_id.get(&id).copied()
	}

	/// Visual radius of a node in world units.
	pub fn node_radius(&self, idx: usize) -> f64 {
		self.radius_scale
			.apply(self.nodes[idx].connection_count as f64)
	}

	/// Whether a node is important enough to carry a text label.
	pub fn shows_label(&self, idx: usize) -> bool {
		self.nodes[idx].connection_count > self.label_threshold
	}

	/// Indices of nodes sharing an edge with `idx`.
	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.edges.iter().filter_map(move |e| {
			if e.source == idx {
				Some(e.target)
			} else if e.target == idx {
				Some(e.source)
			} else {
				None
			}
		})
	}
}
