//! Tunables for loading, layout, interaction, drawing and export.
//!
//! Every struct deserialises with `serde(default)`, so a dataset may override
//! any subset of values under its `"config"` key.

use serde::Deserialize;

use super::error::DatasetError;

/// Weakest |PCC| a loaded gene or edge may have. Overrides may only raise it.
pub const MIN_CORRELATION: f64 = 0.8;

/// Tissue colours, assigned to clusters in order of first appearance.
pub const CLUSTER_PALETTE: &[&str] = &[
	"#4daf4a", "#f781bf", "#a65628", "#984ea3", "#999999", "#e41a1c", "#377eb8", "#ff7f00",
	"#ffff33", "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f",
	"#cab2d6", "#6a3d9a", "#ffff99", "#b15928", "#00ffff",
];

/// Everything the widget can be tuned with.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
	pub filter: FilterConfig,
	pub layout: LayoutConfig,
	pub view: ViewConfig,
	pub render: RenderConfig,
	pub export: ExportConfig,
}

impl NetworkConfig {
	/// Rejects overrides that would break loading, zooming, layout or export.
	pub fn validate(&self) -> Result<(), DatasetError> {
		let threshold = self.filter.min_abs_correlation;
		if !(MIN_CORRELATION..=1.0).contains(&threshold) {
			return Err(invalid(format!(
				"filter.min_abs_correlation {threshold} is outside [{MIN_CORRELATION}, 1]"
			)));
		}
		let view = &self.view;
		if !(view.min_scale > 0.0 && view.min_scale <= view.max_scale && view.max_scale.is_finite()) {
			return Err(invalid(format!(
				"view scale range [{}, {}] must satisfy 0 < min <= max",
				view.min_scale, view.max_scale
			)));
		}
		for (name, factor) in [
			("view.zoom_in_factor", view.zoom_in_factor),
			("view.zoom_out_factor", view.zoom_out_factor),
		] {
			if !(factor > 0.0 && factor.is_finite()) {
				return Err(invalid(format!("{name} {factor} must be positive")));
			}
		}
		if self.layout.iterations_per_frame == 0 {
			return Err(invalid("layout.iterations_per_frame must be at least 1".into()));
		}
		let scale = self.export.scale;
		if !(scale > 0.0 && scale.is_finite()) {
			return Err(invalid(format!("export.scale {scale} must be positive")));
		}
		Ok(())
	}
}

fn invalid(reason: String) -> DatasetError {
	DatasetError::InvalidConfig(reason)
}

/// Row filtering applied while loading.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
	/// |PCC| below this drops the gene or edge.
	pub min_abs_correlation: f64,
	/// Genes kept per tissue, strongest |PCC| first.
	pub max_genes_per_cluster: usize,
}

impl Default for FilterConfig {
	fn default() -> Self {
		Self {
			min_abs_correlation: MIN_CORRELATION,
			max_genes_per_cluster: 150,
		}
	}
}

/// Cluster-aware force layout parameters.
///
/// Distances are in world units. Spring rest lengths shrink as |PCC| grows:
/// `seed_distance + (1 - |pcc|) * seed_spread` to the cluster centroid and
/// `ring_radius * (1 + center_spread * (1 - |pcc|))` to the center gene.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
	/// Distance of cluster anchors from the center gene in the initial placement.
	pub ring_radius: f64,
	/// Rest distance to the cluster centroid for a perfectly correlated gene.
	pub seed_distance: f64,
	/// Extra rest distance to the centroid per unit of missing correlation.
	pub seed_spread: f64,
	/// Relative growth of the center rest distance per unit of missing correlation.
	pub center_spread: f64,
	/// Spring constant towards the cluster centroid.
	pub cluster_attraction: f64,
	/// Spring constant towards the center gene.
	pub center_attraction: f64,
	/// Inverse-square repulsion between genes of the same cluster.
	pub repulsion: f64,
	/// Multiplier on `repulsion` for genes of different clusters.
	pub cross_cluster_factor: f64,
	/// Pairs further apart than this do not repel.
	pub repulsion_cutoff: f64,
	/// Floor on pair distance so coincident genes still get a finite push.
	pub min_distance: f64,
	/// Step limit of the first iteration; cools linearly to zero.
	pub initial_temperature: f64,
	/// Iterations per optimisation run.
	pub iterations: usize,
	/// Hard ceiling on `iterations`.
	pub max_iterations: usize,
	/// Iterations executed per animation frame.
	pub iterations_per_frame: usize,
	/// A run stops early once no gene moves further than this.
	pub convergence_threshold: f64,
	/// Start an optimisation run as soon as the widget mounts.
	pub optimize_on_load: bool,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			ring_radius: 400.0,
			seed_distance: 40.0,
			seed_spread: 100.0,
			center_spread: 0.5,
			cluster_attraction: 0.05,
			center_attraction: 0.02,
			repulsion: 2000.0,
			cross_cluster_factor: 3.0,
			repulsion_cutoff: 150.0,
			min_distance: 1.0,
			initial_temperature: 30.0,
			iterations: 300,
			max_iterations: 2000,
			iterations_per_frame: 25,
			convergence_threshold: 0.01,
			optimize_on_load: true,
		}
	}
}

impl LayoutConfig {
	/// Iterations a run will execute, after applying the ceiling.
	pub fn bounded_iterations(&self) -> usize {
		self.iterations.min(self.max_iterations)
	}
}

/// Zoom behaviour.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
	pub min_scale: f64,
	pub max_scale: f64,
	pub zoom_in_factor: f64,
	pub zoom_out_factor: f64,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 5.0,
			zoom_in_factor: 1.1,
			zoom_out_factor: 0.9,
		}
	}
}

/// Colours, sizes and fonts used when drawing a frame.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
	pub background: String,
	pub edge_color: String,
	pub edge_width: (f64, f64),
	pub edge_alpha: (f64, f64),
	pub center_color: String,
	pub center_radius: f64,
	pub gene_radius: (f64, f64),
	pub highlight_color: String,
	pub label_scale_threshold: f64,
	pub label_font: String,
	pub legend_font: String,
	pub tooltip_font: String,
	pub title_font: String,
	pub palette: Vec<String>,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			background: "#ffffff".into(),
			edge_color: "#969696".into(),
			edge_width: (0.5, 2.5),
			edge_alpha: (0.15, 0.6),
			center_color: "#ff0000".into(),
			center_radius: 16.0,
			gene_radius: (4.0, 10.0),
			highlight_color: "#222222".into(),
			label_scale_threshold: 1.5,
			label_font: "12px Arial".into(),
			legend_font: "12px Arial".into(),
			tooltip_font: "12px Arial".into(),
			title_font: "bold 20px Arial".into(),
			palette: CLUSTER_PALETTE.iter().map(|c| c.to_string()).collect(),
		}
	}
}

impl RenderConfig {
	/// Colour of the cluster at `index`, wrapping around the palette.
	pub fn cluster_color(&self, index: usize) -> &str {
		if self.palette.is_empty() {
			return CLUSTER_PALETTE[index % CLUSTER_PALETTE.len()];
		}
		&self.palette[index % self.palette.len()]
	}
}

/// High-resolution PNG capture.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
	pub scale: f64,
	pub title: String,
	pub file_name: String,
	pub max_dimension: u32,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			scale: 3.0,
			title: "Gene Association Network Centered on GCH1 (PCC >= 0.8)".into(),
			file_name: "gene_association_network.png".into(),
			max_dimension: 16384,
		}
	}
}
