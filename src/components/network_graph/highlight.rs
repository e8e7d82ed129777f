//! Selection and search highlighting.
//!
//! Highlighting is derived state: given the model, the selected person id and
//! the search query, [`HighlightView::compute`] decides for every node whether
//! it is emphasized and whether it matches the search, and for every edge
//! whether it is emphasized. It never touches positions or the layout.

use std::collections::HashSet;

use serde::Deserialize;

use super::build::GraphModel;
use super::types::PersonId;

/// Opacity levels for emphasized and dimmed elements.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
	/// Shape opacity of an emphasized node.
	pub node_emphasized: f64,
	/// Shape opacity of a dimmed node.
	pub node_dimmed: f64,
	/// Label opacity of an emphasized node.
	pub label_emphasized: f64,
	/// Label opacity of a dimmed node.
	pub label_dimmed: f64,
	/// Opacity of an edge touching the selection, or of every edge when nothing is selected.
	pub edge_emphasized: f64,
	/// Opacity of every other edge.
	pub edge_dimmed: f64,
}

impl Default for HighlightStyle {
	fn default() -> Self {
		Self {
			node_emphasized: 0.9,
			node_dimmed: 0.15,
			label_emphasized: 0.7,
			label_dimmed: 0.1,
			edge_emphasized: 0.5,
			edge_dimmed: 0.05,
		}
	}
}

/// Toggle semantics for the selected person.
///
/// The parent page owns the selected id; this only decides what a click on a
/// node should turn it into.
pub fn toggle_selection(current: Option<PersonId>, clicked: PersonId) -> Option<PersonId> {
	if current == Some(clicked) {
		None
	} else {
		Some(clicked)
	}
}

/// Case-insensitive substring match. An empty query matches nothing.
pub fn matches_search(name: &str, query: &str) -> bool {
	!query.is_empty() && name.to_lowercase().contains(&query.to_lowercase())
}

/// Per-node flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeHighlight {
	/// In the connected set, or nothing selected.
	pub emphasized: bool,
	/// Name matches the search query.
	pub search_match: bool,
}

/// Highlight state for one model, selection, and query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightView {
	nodes: Vec<NodeHighlight>,
	edges: Vec<bool>,
	selected: Option<usize>,
	match_count: usize,
}

impl HighlightView {
	/// Reconciles `selected` against the model's node set: an id the model
	/// doesn't contain behaves as no selection.
	pub fn compute(model: &GraphModel, selected: Option<PersonId>, query: &str) -> Self {
		let selected = selected.and_then(|id| model.index_of(id));
		let connected: Option<HashSet<usize>> = selected.map(|idx| {
			let mut set: HashSet<usize> = model.neighbors(idx).collect();
			set.insert(idx);
			set
		});

		let nodes: Vec<NodeHighlight> = model
			.nodes
			.iter()
			.enumerate()
			.map(|(idx, node)| NodeHighlight {
				emphasized: connected.as_ref().is_none_or(|set| set.contains(&idx)),
				search_match: matches_search(&node.name, query),
			})
			.collect();

		let edges = model
			.edges
			.iter()
			.map(|edge| selected.is_none_or(|idx| edge.touches(idx)))
			.collect();

		let match_count = nodes.iter().filter(|n| n.search_match).count();

		Self {
			nodes,
			edges,
			selected,
			match_count,
		}
	}

	/// Model index of the selected node, if it exists in the model.
	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	/// Flags for node `idx`; out-of-range indices read as not emphasized.
	pub fn node(&self, idx: usize) -> NodeHighlight {
		self.nodes.get(idx).copied().unwrap_or_default()
	}

	/// Whether edge `idx` is emphasized.
	pub fn edge_emphasized(&self, idx: usize) -> bool {
		self.edges.get(idx).copied().unwrap_or(true)
	}

	/// Number of nodes matching the search query.
	pub fn match_count(&self) -> usize {
		self.match_count
	}

	/// Shape opacity of node `idx`.
	pub fn node_opacity(&self, idx: usize, style: &HighlightStyle) -> f64 {
		if self.node(idx).emphasized {
			style.node_emphasized
		} else {
			style.node_dimmed
		}
	}

	/// Label opacity of node `idx`.
	pub fn label_opacity(&self, idx: usize, style: &HighlightStyle) -> f64 {
		if self.node(idx).emphasized {
			style.label_emphasized
		} else {
			style.label_dimmed
		}
	}

	/// Opacity of edge `idx`.
	pub fn edge_opacity(&self, idx: usize, style: &HighlightStyle) -> f64 {
		if self.edge_emphasized(idx) {
			style.edge_emphasized
		} else {
			style.edge_dimmed
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::build::build_graph;
	use super::super::types::{Category, Connection, ConnectionType, Person};
	use super::*;

	fn abc() -> GraphModel {
		let persons = [(1, "A"), (2, "B"), (3, "C")].map(|(id, name)| Person {
			id,
			name: name.into(),
			category: Category::Associate,
			description: None,
			aliases: Vec::new(),
		});
		let connections = [(10, 1, 2), (11, 2, 3)].map(|(id, a, b)| Connection {
			id,
			person_id1: a,
			person_id2: b,
			connection_type: ConnectionType::BusinessAssociate,
			description: None,
			strength: 1.0,
		});
		build_graph(&persons, &connections)
	}

	/// Ids of emphasized nodes, sorted.
	fn emphasized(model: &GraphModel, view: &HighlightView) -> Vec<PersonId> {
		let mut ids: Vec<_> = (0..model.nodes.len())
			.filter(|&i| view.node(i).emphasized)
			.map(|i| model.nodes[i].id)
			.collect();
		ids.sort();
		ids
	}

	#[test]
	fn selecting_the_middle_node_emphasizes_everything() {
		let model = abc();
		let view = HighlightView::compute(&model, Some(2), "");
		assert_eq!(emphasized(&model, &view), vec![1, 2, 3]);
		assert!(view.edge_emphasized(0) && view.edge_emphasized(1));
	}

	#[test]
	fn selecting_an_end_dims_the_far_node_and_edge() {
		let model = abc();
		let style = HighlightStyle::default();
		let view = HighlightView::compute(&model, Some(1), "");

		assert_eq!(emphasized(&model, &view), vec![1, 2]);
		assert_eq!(view.node_opacity(0, &style), 0.9);
		assert_eq!(view.node_opacity(2, &style), 0.15);
		assert_eq!(view.label_opacity(1, &style), 0.7);
		assert_eq!(view.label_opacity(2, &style), 0.1);
		assert_eq!(view.edge_opacity(0, &style), 0.5);
		assert_eq!(view.edge_opacity(1, &style), 0.05);
	}

	#[test]
	fn connected_set_is_exactly_one_hop() {
		// chain 1-2-3-4-5 plus 2-5
		let persons: Vec<_> = (1..=6)
			.map(|id| Person {
				id,
				name: format!("n{id}"),
				category: Category::Witness,
				description: None,
				aliases: Vec::new(),
			})
			.collect();
		let connections: Vec<_> = [(1, 2), (2, 3), (3, 4), (4, 5), (2, 5)]
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
		let model = build_graph(&persons, &connections);

		let view = HighlightView::compute(&model, Some(2), "");
		assert_eq!(emphasized(&model, &view), vec![1, 2, 3, 5]);
		let view = HighlightView::compute(&model, Some(6), "");
		assert_eq!(emphasized(&model, &view), vec![6]);
	}

	#[test]
	fn nothing_selected_emphasizes_all_regardless_of_search() {
		let model = abc();
		let view = HighlightView::compute(&model, None, "b");
		assert_eq!(emphasized(&model, &view).len(), 3);
		assert!((0..2).all(|e| view.edge_emphasized(e)));
		assert_eq!(view.selected(), None);
	}

	#[test]
	fn double_toggle_returns_to_no_selection() {
		let model = abc();
		let baseline = HighlightView::compute(&model, None, "");
		let once = toggle_selection(None, 3);
		assert_eq!(once, Some(3));
		let twice = toggle_selection(once, 3);
		assert_eq!(twice, None);
		assert_eq!(HighlightView::compute(&model, twice, ""), baseline);
	}

	#[test]
	fn toggling_another_node_moves_selection() {
		assert_eq!(toggle_selection(Some(1), 2), Some(2));
	}

	#[test]
	fn unknown_selection_behaves_as_none() {
		let model = abc();
		let view = HighlightView::compute(&model, Some(99), "");
		assert_eq!(view, HighlightView::compute(&model, None, ""));
	}

	#[test]
	fn search_is_case_insensitive_and_independent_of_emphasis() {
		let model = abc();
		let view = HighlightView::compute(&model, Some(1), "c");
		let c = model.index_of(3).unwrap();
		assert!(view.node(c).search_match);
		assert!(!view.node(c).emphasized);
		assert_eq!(view.match_count(), 1);

		assert!(matches_search("Jane Doe", "DOE"));
		assert!(!matches_search("Jane Doe", ""));
		assert!(!matches_search("Jane Doe", "smith"));
	}
}
