//! The loaded network: a flat arena of nodes addressed by index.
//!
//! Node positions are the only mutable state. Layout and dragging both write
//! through [`GeneNetwork::set_position`] using the same [`NodeIdx`].

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use super::config::{FilterConfig, RenderConfig};
use super::error::DatasetError;
use super::geometry::{WorldPoint, WorldVector};
use super::types::{DatasetNode, NetworkDataset};

/// Index of a node in [`GeneNetwork::nodes`].
pub type NodeIdx = usize;
/// Index of a cluster in [`GeneNetwork::clusters`].
pub type ClusterIdx = usize;

/// A gene.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub cluster: Option<ClusterIdx>,
	pub correlation: f64,
	pub position: WorldPoint,
	pub radius: f64,
}

impl Node {
	/// Whether this is the center gene.
	pub fn is_center(&self) -> bool {
		self.cluster.is_none()
	}
}

/// An undirected link between two distinct nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	// a < b
	pub a: NodeIdx,
	pub b: NodeIdx,
	pub weight: f64,
}

/// Genes sharing a tissue label.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
	pub label: String,
	pub color: String,
	pub members: Vec<NodeIdx>,
}

/// The gene network.
#[derive(Clone, Debug)]
pub struct GeneNetwork {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	clusters: Vec<Cluster>,
	center: NodeIdx,
	index: HashMap<String, NodeIdx>,
}

impl GeneNetwork {
	/// Validates and filters a dataset into a network with every node at the origin.
	pub fn from_dataset(dataset: &NetworkDataset) -> Result<Self, DatasetError> {
		dataset.config.validate()?;
		let filter = &dataset.config.filter;
		let render = &dataset.config.render;
		let center_id = dataset.center.trim();
		if center_id.is_empty() {
			return Err(DatasetError::MissingCenter);
		}

		let mut known: HashSet<&str> = HashSet::new();
		let mut center_correlation = 1.0;
		let mut grouped: Vec<(&str, Vec<&DatasetNode>)> = Vec::new();
		let mut filtered = 0usize;
		for row in &dataset.nodes {
			if !row.correlation.is_finite() {
				return Err(DatasetError::InvalidCorrelation(row.id.clone()));
			}
			if !known.insert(row.id.as_str()) {
				return Err(DatasetError::DuplicateNode(row.id.clone()));
			}
			if row.id == center_id {
				center_correlation = row.correlation;
				continue;
			}
			let label = row.cluster.trim();
			if label.is_empty() {
				return Err(DatasetError::MissingCluster(row.id.clone()));
			}
			if row.correlation.abs() < filter.min_abs_correlation {
				filtered += 1;
				continue;
			}
			match grouped.iter_mut().find(|(l, _)| *l == label) {
				Some((_, rows)) => rows.push(row),
				None => grouped.push((label, vec![row])),
			}
		}

		let mut nodes = vec![Node {
			id: center_id.to_string(),
			cluster: None,
			correlation: center_correlation,
			position: WorldPoint::origin(),
			radius: render.center_radius,
		}];
		let mut clusters = Vec::with_capacity(grouped.len());
		for (cluster_idx, (label, mut rows)) in grouped.into_iter().enumerate() {
			rows.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));
			if rows.len() > filter.max_genes_per_cluster {
				debug!(
					"Limiting {} genes from {} to {}",
					label,
					rows.len(),
					filter.max_genes_per_cluster
				);
				filtered += rows.len() - filter.max_genes_per_cluster;
				rows.truncate(filter.max_genes_per_cluster);
			}
			let mut members = Vec::with_capacity(rows.len());
			for row in rows {
				members.push(nodes.len());
				nodes.push(Node {
					id: row.id.clone(),
					cluster: Some(cluster_idx),
					correlation: row.correlation,
					position: WorldPoint::origin(),
					radius: gene_radius(row.correlation, filter, render),
				});
			}
			clusters.push(Cluster {
				label: label.to_string(),
				color: render.cluster_color(cluster_idx).to_string(),
				members,
			});
		}

		let index: HashMap<String, NodeIdx> = nodes
			.iter()
			.enumerate()
			.map(|(idx, node)| (node.id.clone(), idx))
			.collect();

		let mut edges = Vec::new();
		let mut pairs = HashSet::new();
		let mut dropped = 0usize;
		for edge in &dataset.edges {
			if !edge.weight.is_finite() {
				return Err(DatasetError::InvalidCorrelation(format!("{}-{}", edge.a, edge.b)));
			}
			if edge.a == edge.b {
				return Err(DatasetError::SelfLoop(edge.a.clone()));
			}
			let pair = if edge.a < edge.b {
				(edge.a.as_str(), edge.b.as_str())
			} else {
				(edge.b.as_str(), edge.a.as_str())
			};
			if !pairs.insert(pair) {
				return Err(DatasetError::DuplicateEdge(edge.a.clone(), edge.b.clone()));
			}
			let resolve = |id: &str| -> Result<Option<NodeIdx>, DatasetError> {
				match index.get(id) {
					Some(&idx) => Ok(Some(idx)),
					None if known.contains(id) => Ok(None),
					None => Err(DatasetError::DanglingEdge {
						a: edge.a.clone(),
						b: edge.b.clone(),
						missing: id.to_string(),
					}),
				}
			};
			let (Some(a), Some(b)) = (resolve(&edge.a)?, resolve(&edge.b)?) else {
				dropped += 1;
				continue;
			};
			if edge.weight.abs() < filter.min_abs_correlation {
				dropped += 1;
				continue;
			}
			edges.push(Edge {
				a: a.min(b),
				b: a.max(b),
				weight: edge.weight,
			});
		}

		debug!("Filtered {} genes and {} edges below threshold", filtered, dropped);
		info!(
			"Loaded network around {}: {} nodes, {} edges, {} clusters",
			center_id,
			nodes.len(),
			edges.len(),
			clusters.len()
		);

		Ok(Self {
			nodes,
			edges,
			clusters,
			center: 0,
			index,
		})
	}

	/// Parses and validates the JSON form in one go.
	pub fn from_json(json: &str) -> Result<Self, DatasetError> {
		Self::from_dataset(&NetworkDataset::from_json(json)?)
	}

	/// All nodes; the center gene is at [`Self::center`].
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Tissue clusters in order of first appearance.
	pub fn clusters(&self) -> &[Cluster] {
		&self.clusters
	}

	pub fn center(&self) -> NodeIdx {
		self.center
	}

	pub fn node(&self, idx: NodeIdx) -> &Node {
		&self.nodes[idx]
	}

	/// Index of the gene called `id`.
	pub fn lookup(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	/// Cluster of the node at `idx`, if it has one.
	pub fn cluster_of(&self, idx: NodeIdx) -> Option<&Cluster> {
		self.nodes[idx].cluster.map(|c| &self.clusters[c])
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Always false for a loaded network, which holds at least the center.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn set_position(&mut self, idx: NodeIdx, position: WorldPoint) {
		self.nodes[idx].position = position;
	}

	pub fn translate(&mut self, idx: NodeIdx, delta: WorldVector) {
		self.nodes[idx].position += delta;
	}

	/// Snapshot of every position, indexed like [`Self::nodes`].
	pub fn positions(&self) -> Vec<WorldPoint> {
		self.nodes.iter().map(|n| n.position).collect()
	}

	/// Paint order: genes first, center on top. Hit testing walks it backwards.
	pub fn draw_order(&self) -> impl DoubleEndedIterator<Item = NodeIdx> + use<> {
		let center = self.center;
		(0..self.nodes.len())
			.filter(move |&idx| idx != center)
			.chain(std::iter::once(center))
	}
}

/// Log-scaled radius: `min` at the threshold, `max` at |PCC| = 1.
fn gene_radius(correlation: f64, filter: &FilterConfig, render: &RenderConfig) -> f64 {
	let (min, max) = render.gene_radius;
	let span = (1.0 - filter.min_abs_correlation).max(f64::EPSILON);
	let t = ((correlation.abs() - filter.min_abs_correlation) / span).clamp(0.0, 1.0);
	min + (max - min) * (1.0 + 9.0 * t).log10()
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) const BUNDLED: &str = include_str!("../../../data/gch1_tumor_network.json");

	/// Center GCH1 with two liver genes and one kidney gene.
	pub(crate) fn scenario() -> GeneNetwork {
		GeneNetwork::from_json(
			r#"{
				"center": "GCH1",
				"nodes": [
					{ "id": "A", "cluster": "liver", "correlation": 0.85 },
					{ "id": "B", "cluster": "liver", "correlation": 0.9 },
					{ "id": "C", "cluster": "kidney", "correlation": 0.82 }
				],
				"edges": [
					{ "a": "GCH1", "b": "A", "weight": 0.85 },
					{ "a": "GCH1", "b": "B", "weight": 0.9 },
					{ "a": "GCH1", "b": "C", "weight": 0.82 }
				]
			}"#,
		)
		.unwrap()
	}

	fn load(nodes: &str, edges: &str) -> Result<GeneNetwork, DatasetError> {
		GeneNetwork::from_json(&format!(
			r#"{{ "center": "GCH1", "nodes": [{nodes}], "edges": [{edges}] }}"#
		))
	}

	#[test]
	fn bundled_dataset_loads() {
		let graph = GeneNetwork::from_json(BUNDLED).unwrap();
		assert_eq!(graph.node(graph.center()).id, "GCH1");
		assert_eq!(graph.clusters().len(), 6);
		assert!(graph.edges().len() > graph.len() - 1);
	}

	#[test]
	fn scenario_groups_by_tissue() {
		let graph = scenario();
		assert_eq!(graph.len(), 4);
		let labels: Vec<_> = graph.clusters().iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, ["liver", "kidney"]);
		// strongest first within a cluster
		let liver: Vec<_> = graph.clusters()[0]
			.members
			.iter()
			.map(|&idx| graph.node(idx).id.as_str())
			.collect();
		assert_eq!(liver, ["B", "A"]);
		assert_eq!(graph.cluster_of(graph.lookup("C").unwrap()).unwrap().label, "kidney");
		assert!(graph.cluster_of(graph.center()).is_none());
	}

	#[test]
	fn every_non_center_node_has_exactly_one_cluster() {
		let graph = GeneNetwork::from_json(BUNDLED).unwrap();
		for (idx, node) in graph.nodes().iter().enumerate() {
			if idx == graph.center() {
				assert!(node.is_center());
				continue;
			}
			let owners = graph
				.clusters()
				.iter()
				.filter(|c| c.members.contains(&idx))
				.count();
			assert_eq!(owners, 1, "{}", node.id);
		}
	}

	#[test]
	fn loaded_edges_meet_threshold() {
		let graph = load(
			r#"{ "id": "A", "cluster": "x", "correlation": 0.9 },
			   { "id": "B", "cluster": "x", "correlation": -0.85 }"#,
			r#"{ "a": "GCH1", "b": "A", "weight": 0.9 },
			   { "a": "GCH1", "b": "B", "weight": -0.85 },
			   { "a": "A", "b": "B", "weight": 0.5 }"#,
		)
		.unwrap();
		assert_eq!(graph.edges().len(), 2);
		assert!(graph.edges().iter().all(|e| e.weight.abs() >= 0.8));

		let bundled = GeneNetwork::from_json(BUNDLED).unwrap();
		assert!(bundled.edges().iter().all(|e| e.weight.abs() >= 0.8));
	}

	#[test]
	fn weak_genes_and_their_edges_are_dropped() {
		let graph = load(
			r#"{ "id": "A", "cluster": "x", "correlation": 0.9 },
			   { "id": "W", "cluster": "x", "correlation": 0.4 }"#,
			r#"{ "a": "GCH1", "b": "W", "weight": 0.95 }"#,
		)
		.unwrap();
		assert_eq!(graph.lookup("W"), None);
		assert!(graph.edges().is_empty());
	}

	#[test]
	fn clusters_are_capped_keeping_strongest() {
		let json = r#"{
			"center": "GCH1",
			"nodes": [
				{ "id": "A", "cluster": "x", "correlation": 0.81 },
				{ "id": "B", "cluster": "x", "correlation": 0.99 },
				{ "id": "C", "cluster": "x", "correlation": 0.9 }
			],
			"config": { "filter": { "max_genes_per_cluster": 2 } }
		}"#;
		let graph = GeneNetwork::from_json(json).unwrap();
		assert_eq!(graph.len(), 3);
		assert!(graph.lookup("A").is_none());
		assert!(graph.lookup("B").is_some() && graph.lookup("C").is_some());
	}

	#[test]
	fn center_row_is_optional_and_not_clustered() {
		let graph = load(
			r#"{ "id": "GCH1", "cluster": "ignored", "correlation": 1.0 },
			   { "id": "A", "cluster": "x", "correlation": 0.9 }"#,
			"",
		)
		.unwrap();
		assert_eq!(graph.len(), 2);
		assert_eq!(graph.clusters().len(), 1);
		assert!(graph.node(graph.lookup("GCH1").unwrap()).is_center());
	}

	#[test]
	fn radius_grows_with_correlation() {
		let graph = scenario();
		let r = |id| graph.node(graph.lookup(id).unwrap()).radius;
		assert!(r("B") > r("A"));
		assert!(r("A") > r("C"));
		assert!(r("GCH1") > r("B"));
		let (min, max) = RenderConfig::default().gene_radius;
		assert!(r("C") >= min && r("B") <= max);
	}

	#[test]
	fn draw_order_puts_center_last() {
		let graph = scenario();
		let order: Vec<_> = graph.draw_order().collect();
		assert_eq!(order.len(), graph.len());
		assert_eq!(order.last(), Some(&graph.center()));
		assert_eq!(graph.draw_order().next_back(), Some(graph.center()));
	}

	#[test]
	fn malformed_datasets_are_rejected() {
		let a = r#"{ "id": "A", "cluster": "x", "correlation": 0.9 }"#;
		assert!(matches!(
			GeneNetwork::from_json(r#"{ "center": " ", "nodes": [] }"#),
			Err(DatasetError::MissingCenter)
		));
		assert!(matches!(
			GeneNetwork::from_json(r#"{ "nodes": [] }"#),
			Err(DatasetError::Parse(_))
		));
		assert!(matches!(
			load(&format!("{a}, {a}"), ""),
			Err(DatasetError::DuplicateNode(id)) if id == "A"
		));
		assert!(matches!(
			load(a, r#"{ "a": "A", "b": "Z", "weight": 0.9 }"#),
			Err(DatasetError::DanglingEdge { missing, .. }) if missing == "Z"
		));
		assert!(matches!(
			load(
				a,
				r#"{ "a": "A", "b": "GCH1", "weight": 0.9 }, { "a": "GCH1", "b": "A", "weight": 0.9 }"#
			),
			Err(DatasetError::DuplicateEdge(..))
		));
		assert!(matches!(
			load(a, r#"{ "a": "A", "b": "A", "weight": 0.9 }"#),
			Err(DatasetError::SelfLoop(_))
		));
		assert!(matches!(
			load(r#"{ "id": "A", "correlation": 0.9 }"#, ""),
			Err(DatasetError::MissingCluster(_))
		));
	}

	#[test]
	fn repeated_pair_is_rejected_even_when_weak() {
		let a = r#"{ "id": "A", "cluster": "x", "correlation": 0.9 }"#;
		assert!(matches!(
			load(
				a,
				r#"{ "a": "GCH1", "b": "A", "weight": 0.9 }, { "a": "A", "b": "GCH1", "weight": 0.1 }"#
			),
			Err(DatasetError::DuplicateEdge(..))
		));
	}

	#[test]
	fn config_overrides_are_validated_on_load() {
		let json = |config: &str| {
			format!(
				r#"{{ "center": "GCH1",
					"nodes": [{{ "id": "A", "cluster": "x", "correlation": 0.9 }}],
					"edges": [{{ "a": "GCH1", "b": "A", "weight": 0.3 }}],
					"config": {config} }}"#
			)
		};
		assert!(matches!(
			GeneNetwork::from_json(&json(r#"{ "filter": { "min_abs_correlation": 0.2 } }"#)),
			Err(DatasetError::InvalidConfig(_))
		));
		assert!(matches!(
			GeneNetwork::from_json(&json(r#"{ "view": { "min_scale": 5, "max_scale": 1 } }"#)),
			Err(DatasetError::InvalidConfig(_))
		));
		let graph = GeneNetwork::from_json(&json("{}")).unwrap();
		assert!(graph.edges().is_empty());
	}

	#[test]
	fn positions_write_through_the_arena() {
		let mut graph = scenario();
		let a = graph.lookup("A").unwrap();
		graph.set_position(a, WorldPoint::new(3.0, 4.0));
		graph.translate(a, WorldVector::new(1.0, -1.0));
		assert_eq!(graph.positions()[a], WorldPoint::new(4.0, 3.0));
	}
}
