use serde::Deserialize;

use super::config::NetworkConfig;
use super::error::DatasetError;

/// A gene row: identifier, tissue and correlation to the center gene.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DatasetNode {
	/// Gene symbol.
	pub id: String,
	/// Tissue label. Ignored for the center gene, required for every other row.
	#[serde(default)]
	pub cluster: String,
	/// PCC with the center gene.
	#[serde(alias = "correlationToCenter", alias = "pcc")]
	pub correlation: f64,
}

/// An undirected co-expression link.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DatasetEdge {
	/// One endpoint.
	pub a: String,
	/// The other endpoint.
	pub b: String,
	/// PCC between the two genes.
	pub weight: f64,
}

/// The static network bundled with the page.
#[derive(Clone, Debug, Deserialize)]
pub struct NetworkDataset {
	/// Identifier of the center gene.
	pub center: String,
	/// Gene rows.
	pub nodes: Vec<DatasetNode>,
	/// Links between genes.
	#[serde(default)]
	pub edges: Vec<DatasetEdge>,
	/// Optional overrides of the default tunables.
	#[serde(default)]
	pub config: NetworkConfig,
}

impl NetworkDataset {
	/// Parses the JSON form.
	pub fn from_json(json: &str) -> Result<Self, DatasetError> {
		Ok(serde_json::from_str(json)?)
	}
}
