use log::info;

use super::config::NetworkConfig;
use super::error::ExportError;
use super::export::{self, ExportedImage};
use super::geometry::{ScreenPoint, ScreenSize, ViewTransform};
use super::interaction::InteractionController;
use super::layout::{self, LayoutProgress, LayoutRun};
use super::model::GeneNetwork;
use super::render::{self, Surface};

/// Everything the canvas widget owns between frames.
pub struct NetworkState {
	pub graph: GeneNetwork,
	pub controller: InteractionController,
	pub config: NetworkConfig,
	pub size: ScreenSize,
	layout: Option<LayoutRun>,
}

impl NetworkState {
	/// Seeds the ring layout and centres the view on a `size` canvas.
	pub fn new(mut graph: GeneNetwork, config: NetworkConfig, size: ScreenSize) -> Self {
		layout::place_initial(&mut graph, &config.layout);
		let controller = InteractionController::new(config.view.clone(), ViewTransform::centered(size));
		let mut state = Self {
			graph,
			controller,
			config,
			size,
			layout: None,
		};
		if state.config.layout.optimize_on_load {
			state.optimize_layout();
		}
		state
	}

	/// Starts a fresh optimisation from the current positions, animated by [`Self::tick`].
	pub fn optimize_layout(&mut self) {
		let run = LayoutRun::new(&self.config.layout);
		info!(
			"Optimizing layout of {} nodes ({} iterations max)",
			self.graph.len(),
			self.config.layout.bounded_iterations()
		);
		self.layout = Some(run);
		self.controller.mark_dirty();
	}

	pub fn is_optimizing(&self) -> bool {
		self.layout.is_some()
	}

	/// Advances the layout by one chunk. Returns whether a redraw is due.
	pub fn tick(&mut self) -> bool {
		if let Some(run) = self.layout.as_mut() {
			let pinned = self.controller.view().dragged();
			let budget = self.config.layout.iterations_per_frame.max(1);
			if run.advance(&mut self.graph, pinned, budget) == LayoutProgress::Finished {
				info!("Layout finished after {}", run.report());
				self.layout = None;
			}
			self.controller.mark_dirty();
		}
		self.controller.take_dirty()
	}

	pub fn reset_view(&mut self) {
		self.controller.reset_view(self.size);
	}

	pub fn resize(&mut self, size: ScreenSize) {
		self.size = size;
		self.controller.mark_dirty();
	}

	pub fn pointer_down(&mut self, at: ScreenPoint) {
		self.controller.pointer_down(&self.graph, at);
	}

	pub fn pointer_move(&mut self, at: ScreenPoint) {
		self.controller.pointer_move(&mut self.graph, at);
	}

	pub fn pointer_up(&mut self) {
		self.controller.pointer_up();
	}

	pub fn pointer_leave(&mut self) {
		self.controller.pointer_leave();
	}

	pub fn wheel(&mut self, at: ScreenPoint, delta_y: f64) {
		self.controller.wheel(at, delta_y);
	}

	pub fn cursor(&self) -> &'static str {
		self.controller.cursor()
	}

	/// Draws the interactive frame.
	pub fn render<S: Surface>(&self, surface: &mut S) {
		render::draw_frame(
			surface,
			&self.graph,
			self.controller.view(),
			&self.config.render,
			self.config.filter.min_abs_correlation,
			self.size,
		);
	}

	/// Captures the current view at export scale.
	pub fn export(&self) -> Result<ExportedImage, ExportError> {
		export::export_png(
			&self.graph,
			&self.controller.view().transform,
			&self.config.render,
			self.config.filter.min_abs_correlation,
			self.size,
			&self.config.export,
		)
	}
}
