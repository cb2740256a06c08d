//! Cluster-aware force layout.
//!
//! [`place_initial`] seeds a deterministic ring of clusters around the center
//! gene. [`LayoutRun`] then iterates a force simulation that can be advanced
//! in chunks, one chunk per animation frame, or run to completion with
//! [`optimize`]. Nothing is random: identical inputs give identical positions.

use std::f64::consts::{PI, TAU};
use std::fmt;

use log::{debug, info};

use super::config::LayoutConfig;
use super::geometry::{WorldPoint, WorldVector};
use super::model::{GeneNetwork, NodeIdx};

/// Direction used to separate coincident nodes.
const GOLDEN_ANGLE: f64 = PI * 0.763_932_022_500_210_4; // π(3 - √5)

/// Rest distance from a gene to its cluster centroid.
fn centroid_rest(config: &LayoutConfig, correlation: f64) -> f64 {
	config.seed_distance + (1.0 - correlation.abs()) * config.seed_spread
}

/// Rest distance from a gene to the center gene.
fn center_rest(config: &LayoutConfig, correlation: f64) -> f64 {
	config.ring_radius * (1.0 + config.center_spread * (1.0 - correlation.abs()))
}

/// Center at the origin, clusters evenly spaced on a ring, members on a sub-ring
/// around their cluster anchor at their rest distance.
pub fn place_initial(graph: &mut GeneNetwork, config: &LayoutConfig) {
	let center = graph.center();
	graph.set_position(center, WorldPoint::origin());

	let cluster_count = graph.clusters().len();
	let seeds: Vec<(NodeIdx, WorldPoint)> = graph
		.clusters()
		.iter()
		.enumerate()
		.flat_map(|(cluster_idx, cluster)| {
			let angle = cluster_idx as f64 / cluster_count as f64 * TAU;
			let anchor = WorldPoint::new(
				config.ring_radius * angle.cos(),
				config.ring_radius * angle.sin(),
			);
			let member_count = cluster.members.len();
			cluster
				.members
				.iter()
				.enumerate()
				.map(move |(slot, &idx)| (anchor, slot, member_count, idx))
		})
		.map(|(anchor, slot, member_count, idx)| {
			let angle = slot as f64 / member_count as f64 * TAU;
			let distance = centroid_rest(config, graph.node(idx).correlation);
			let offset = WorldVector::new(distance * angle.cos(), distance * angle.sin());
			(idx, anchor + offset)
		})
		.collect();

	for (idx, position) in seeds {
		graph.set_position(idx, position);
	}
}

/// Current centroid of every cluster, indexed like [`GeneNetwork::clusters`].
pub fn cluster_centroids(graph: &GeneNetwork) -> Vec<WorldPoint> {
	graph
		.clusters()
		.iter()
		.map(|cluster| {
			let sum = cluster
				.members
				.iter()
				.fold(WorldVector::zero(), |acc, &idx| {
					acc + graph.node(idx).position.to_vector()
				});
			(sum / cluster.members.len().max(1) as f64).to_point()
		})
		.collect()
}

/// Mean distance between every pair of cluster centroids.
pub fn mean_centroid_distance(graph: &GeneNetwork) -> f64 {
	let centroids = cluster_centroids(graph);
	let mut total = 0.0;
	let mut pairs = 0usize;
	for (i, a) in centroids.iter().enumerate() {
		for b in &centroids[i + 1..] {
			total += a.distance_to(*b);
			pairs += 1;
		}
	}
	if pairs == 0 { 0.0 } else { total / pairs as f64 }
}

/// Whether a chunk left work for the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutProgress {
	Running,
	Finished,
}

/// Summary of a finished optimisation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutReport {
	pub max_displacements: Vec<f64>,
	pub converged: bool,
}

impl LayoutReport {
	/// Iterations actually executed.
	pub fn iterations(&self) -> usize {
		self.max_displacements.len()
	}
}

impl fmt::Display for LayoutReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} iterations (converged: {}, last move {:.4})",
			self.iterations(),
			self.converged,
			self.max_displacements.last().copied().unwrap_or(0.0)
		)
	}
}

/// An optimisation pass in progress.
///
/// Each iteration moves every free gene along its net force, limited by a step
/// bound. The bound is the smaller of a linearly cooling temperature and the
/// previous iteration's largest move, so the largest move never grows.
#[derive(Clone, Debug)]
pub struct LayoutRun {
	config: LayoutConfig,
	iterations: usize,
	report: LayoutReport,
}

impl LayoutRun {
	/// A fresh run using `config`, bounded by `config.max_iterations`.
	pub fn new(config: &LayoutConfig) -> Self {
		Self {
			config: config.clone(),
			iterations: config.bounded_iterations(),
			report: LayoutReport::default(),
		}
	}

	/// No iterations remain.
	pub fn is_finished(&self) -> bool {
		self.report.converged || self.report.iterations() >= self.iterations
	}

	/// What has run so far.
	pub fn report(&self) -> &LayoutReport {
		&self.report
	}

	/// Consumes the run.
	pub fn into_report(self) -> LayoutReport {
		self.report
	}

	/// Runs up to `budget` iterations. `pinned` is held in place for this chunk.
	pub fn advance(
		&mut self,
		graph: &mut GeneNetwork,
		pinned: Option<NodeIdx>,
		budget: usize,
	) -> LayoutProgress {
		for _ in 0..budget {
			if self.step(graph, pinned).is_none() {
				break;
			}
		}
		if self.is_finished() {
			LayoutProgress::Finished
		} else {
			debug!(
				"Layout at iteration {}/{}",
				self.report.iterations(),
				self.iterations
			);
			LayoutProgress::Running
		}
	}

	/// One iteration. Returns the largest move, or `None` once finished.
	pub fn step(&mut self, graph: &mut GeneNetwork, pinned: Option<NodeIdx>) -> Option<f64> {
		if self.is_finished() {
			return None;
		}
		let done = self.report.iterations();
		let temperature =
			self.config.initial_temperature * (1.0 - done as f64 / self.iterations as f64);
		let limit = self
			.report
			.max_displacements
			.last()
			.map_or(temperature, |&last| temperature.min(last));

		let centroids = cluster_centroids(graph);
		let moves: Vec<WorldVector> = (0..graph.len())
			.map(|idx| {
				if Some(idx) == pinned || graph.node(idx).is_center() {
					return WorldVector::zero();
				}
				clamp_length(self.force_on(graph, &centroids, idx), limit)
			})
			.collect();

		let mut largest = 0.0f64;
		for (idx, delta) in moves.into_iter().enumerate() {
			largest = largest.max(delta.length());
			graph.translate(idx, delta);
		}
		self.report.max_displacements.push(largest);
		if largest < self.config.convergence_threshold {
			self.report.converged = true;
		}
		Some(largest)
	}

	fn force_on(&self, graph: &GeneNetwork, centroids: &[WorldPoint], idx: NodeIdx) -> WorldVector {
		let config = &self.config;
		let node = graph.node(idx);
		let weight = node.correlation.abs();
		let mut force = WorldVector::zero();

		if let Some(cluster) = node.cluster {
			force += spring(
				node.position,
				centroids[cluster],
				config.cluster_attraction * weight,
				centroid_rest(config, node.correlation),
			);
		}
		force += spring(
			node.position,
			graph.node(graph.center()).position,
			config.center_attraction * weight,
			center_rest(config, node.correlation),
		);

		for (other_idx, other) in graph.nodes().iter().enumerate() {
			if other_idx == idx {
				continue;
			}
			let offset = node.position - other.position;
			let distance = offset.length();
			if distance >= config.repulsion_cutoff {
				continue;
			}
			let (direction, distance) = if distance < config.min_distance {
				let angle = (idx as f64 - other_idx as f64) * GOLDEN_ANGLE;
				(WorldVector::new(angle.cos(), angle.sin()), config.min_distance)
			} else {
				(offset / distance, distance)
			};
			// The center repels like a cluster-mate.
			let strength = if other.cluster.is_none() || other.cluster == node.cluster {
				config.repulsion
			} else {
				config.repulsion * config.cross_cluster_factor
			};
			force += direction * (strength / (distance * distance));
		}
		force
	}
}

/// Hooke spring pulling `from` towards `to` when longer than `rest`, pushing when shorter.
fn spring(from: WorldPoint, to: WorldPoint, stiffness: f64, rest: f64) -> WorldVector {
	let offset = to - from;
	let distance = offset.length();
	if distance <= f64::EPSILON {
		return WorldVector::zero();
	}
	offset / distance * (stiffness * (distance - rest))
}

fn clamp_length(v: WorldVector, limit: f64) -> WorldVector {
	let length = v.length();
	if length > limit && length > 0.0 {
		v * (limit / length)
	} else {
		v
	}
}

/// Runs a full optimisation synchronously.
pub fn optimize(graph: &mut GeneNetwork, config: &LayoutConfig) -> LayoutReport {
	let mut run = LayoutRun::new(config);
	while run.step(graph, None).is_some() {}
	let report = run.into_report();
	info!("Layout finished after {report}");
	report
}
