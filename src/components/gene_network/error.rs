use thiserror::Error;

/// The bundled dataset could not be turned into a network. Fatal: nothing is rendered.
#[derive(Debug, Error)]
pub enum DatasetError {
	/// Not valid JSON, or required fields are missing.
	#[error("dataset is malformed: {0}")]
	Parse(#[from] serde_json::Error),
	/// The dataset does not name a center gene.
	#[error("dataset does not name a center gene")]
	MissingCenter,
	/// A gene row has no tissue label.
	#[error("gene `{0}` has no tissue cluster")]
	MissingCluster(String),
	/// Two node rows share an identifier.
	#[error("duplicate node identifier `{0}`")]
	DuplicateNode(String),
	/// An edge names a node that is not in the dataset.
	#[error("edge {a}-{b} references unknown node `{missing}`")]
	DanglingEdge {
		/// First endpoint as written.
		a: String,
		/// Second endpoint as written.
		b: String,
		/// The endpoint that does not exist.
		missing: String,
	},
	/// Two edges connect the same unordered pair.
	#[error("duplicate edge between `{0}` and `{1}`")]
	DuplicateEdge(String, String),
	/// An edge connects a node to itself.
	#[error("edge connects `{0}` to itself")]
	SelfLoop(String),
	/// A correlation or weight is NaN or infinite.
	#[error("`{0}` has a non-finite correlation")]
	InvalidCorrelation(String),
	/// A `config` override is out of range.
	#[error("invalid config: {0}")]
	InvalidConfig(String),
}

/// High-resolution capture failed. Reported to the user; rendering carries on.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Requested bitmap exceeds the browser's canvas dimension limit.
	#[error("export of {width}x{height} pixels exceeds the {limit} pixel canvas limit")]
	TooLarge {
		/// Requested width in device pixels.
		width: u64,
		/// Requested height in device pixels.
		height: u64,
		/// Largest accepted side.
		limit: u32,
	},
	/// The offscreen canvas or its 2-D context could not be created.
	#[error("offscreen canvas unavailable: {0}")]
	Canvas(String),
	/// The browser did not hand back a PNG.
	#[error("image encoding failed: {0}")]
	Encoding(String),
}
