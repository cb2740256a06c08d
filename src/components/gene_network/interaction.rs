//! Pointer and wheel handling: pan, zoom, drag and hover.

use super::config::ViewConfig;
use super::geometry::{ScreenPoint, ScreenSize, ViewTransform};
use super::model::{GeneNetwork, NodeIdx};

/// What the pointer is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Panning {
		last: ScreenPoint,
	},
	DraggingNode(NodeIdx),
}

/// Pan/zoom plus what is hovered or held. Renderer input, never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
	pub transform: ViewTransform,
	pub hovered: Option<NodeIdx>,
	pub gesture: Gesture,
}

impl ViewState {
	/// Node being dragged, if any.
	pub fn dragged(&self) -> Option<NodeIdx> {
		match self.gesture {
			Gesture::DraggingNode(idx) => Some(idx),
			_ => None,
		}
	}
}

/// Topmost node whose on-screen disc contains `at`.
pub fn hit_test(graph: &GeneNetwork, transform: &ViewTransform, at: ScreenPoint) -> Option<NodeIdx> {
	graph.draw_order().rev().find(|&idx| {
		let node = graph.node(idx);
		let center = transform.world_to_screen(node.position);
		center.distance_to(at) <= transform.screen_length(node.radius)
	})
}

/// Owns the [`ViewState`] and applies input to it and to node positions.
#[derive(Clone, Debug)]
pub struct InteractionController {
	view: ViewState,
	config: ViewConfig,
	dirty: bool,
}

impl InteractionController {
	/// Starts idle with `transform`; the first frame is due immediately.
	pub fn new(config: ViewConfig, transform: ViewTransform) -> Self {
		Self {
			view: ViewState {
				transform,
				..ViewState::default()
			},
			config,
			dirty: true,
		}
	}

	pub fn view(&self) -> &ViewState {
		&self.view
	}

	/// Requests a redraw on the next tick.
	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Whether a redraw is due; clears the request.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	/// Grabs the topmost node under the pointer, or the background.
	pub fn pointer_down(&mut self, graph: &GeneNetwork, at: ScreenPoint) {
		if self.view.gesture != Gesture::Idle {
			return;
		}
		self.view.gesture = match hit_test(graph, &self.view.transform, at) {
			Some(idx) => {
				self.view.hovered = Some(idx);
				Gesture::DraggingNode(idx)
			}
			None => Gesture::Panning { last: at },
		};
		self.dirty = true;
	}

	/// Pans, drags or updates the hovered node depending on the gesture.
	pub fn pointer_move(&mut self, graph: &mut GeneNetwork, at: ScreenPoint) {
		match self.view.gesture {
			Gesture::Idle => {
				let hovered = hit_test(graph, &self.view.transform, at);
				if hovered != self.view.hovered {
					self.view.hovered = hovered;
					self.dirty = true;
				}
			}
			Gesture::Panning { last } => {
				self.view.transform.pan_by(at - last);
				self.view.gesture = Gesture::Panning { last: at };
				self.dirty = true;
			}
			Gesture::DraggingNode(idx) => {
				graph.set_position(idx, self.view.transform.screen_to_world(at));
				self.dirty = true;
			}
		}
	}

	pub fn pointer_up(&mut self) {
		if self.view.gesture != Gesture::Idle {
			self.view.gesture = Gesture::Idle;
			self.dirty = true;
		}
	}

	/// Ends any gesture and hides the tooltip.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		if self.view.hovered.take().is_some() {
			self.dirty = true;
		}
	}

	/// One wheel notch at `at`: `delta_y < 0` zooms in. Ignored mid-drag.
	pub fn wheel(&mut self, at: ScreenPoint, delta_y: f64) {
		if self.view.dragged().is_some() || delta_y == 0.0 {
			return;
		}
		let factor = if delta_y < 0.0 {
			self.config.zoom_in_factor
		} else {
			self.config.zoom_out_factor
		};
		let transform = &self.view.transform;
		let scale = (transform.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
		if scale != transform.scale {
			self.view.transform = transform.zoom_about(at, scale);
			self.dirty = true;
		}
	}

	/// Unit zoom with the world origin centred on a `size` canvas.
	pub fn reset_view(&mut self, size: ScreenSize) {
		self.view.transform = ViewTransform::centered(size);
		self.dirty = true;
	}

	/// CSS cursor for the current state.
	pub fn cursor(&self) -> &'static str {
		match self.view.gesture {
			Gesture::Panning { .. } | Gesture::DraggingNode(_) => "grabbing",
			Gesture::Idle if self.view.hovered.is_some() => "pointer",
			Gesture::Idle => "default",
		}
	}
}
