use leptos::prelude::*;
use log::error;

use crate::components::gene_network::{
	DatasetError, GeneNetwork, GeneNetworkCanvas, NetworkConfig, NetworkDataset,
};

const BUNDLED_DATASET: &str = include_str!("../../data/gch1_tumor_network.json");

/// Parses and validates the network shipped with the page.
fn load_bundled_network() -> Result<(GeneNetwork, NetworkConfig), DatasetError> {
	let dataset = NetworkDataset::from_json(BUNDLED_DATASET)?;
	let network = GeneNetwork::from_dataset(&dataset)?;
	Ok((network, dataset.config))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"The network could not be loaded"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{load_bundled_network()
				.inspect_err(|e| error!("Dataset rejected: {e}"))
				.map(|(network, config)| {
					view! {
						<div class="fullscreen-graph">
							<GeneNetworkCanvas network=network config=config fullscreen=true />
							<div class="graph-overlay">
								<h1>"GCH1 Co-expression Network"</h1>
								<p class="subtitle">
									"Drag genes to reposition. Scroll to zoom. Drag background to pan. Hover a gene for details."
								</p>
							</div>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
