//! GCH1 co-expression network widget: data model, cluster layout, pan/zoom
//! interaction, canvas drawing and PNG export.

mod canvas;
mod component;
pub mod config;
pub mod error;
mod export;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod render;
mod state;
mod types;

pub use component::GeneNetworkCanvas;
pub use config::NetworkConfig;
pub use error::{DatasetError, ExportError};
pub use model::GeneNetwork;
pub use types::NetworkDataset;
