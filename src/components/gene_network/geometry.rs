//! World and screen coordinate spaces and the pan/zoom transform between them.

use euclid::{Point2D, Size2D, Vector2D};

/// Node-position space, independent of the current pan and zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSpace;

/// CSS pixel space of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSpace;

/// A node position.
pub type WorldPoint = Point2D<f64, WorldSpace>;
/// A displacement between node positions.
pub type WorldVector = Vector2D<f64, WorldSpace>;
/// A pixel position on the canvas.
pub type ScreenPoint = Point2D<f64, ScreenSpace>;
/// A pixel displacement, also used for the pan offset.
pub type ScreenVector = Vector2D<f64, ScreenSpace>;
/// Canvas dimensions in CSS pixels.
pub type ScreenSize = Size2D<f64, ScreenSpace>;

/// `screen = world * scale + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Screen position of the world origin.
	pub pan: ScreenVector,
	/// Zoom factor, always positive.
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			pan: ScreenVector::zero(),
			scale: 1.0,
		}
	}
}

impl ViewTransform {
	/// Unit scale with the world origin in the middle of a `size` canvas.
	pub fn centered(size: ScreenSize) -> Self {
		Self {
			pan: ScreenVector::new(size.width / 2.0, size.height / 2.0),
			scale: 1.0,
		}
	}

	/// Maps a world point onto the canvas.
	pub fn world_to_screen(&self, p: WorldPoint) -> ScreenPoint {
		ScreenPoint::new(p.x * self.scale + self.pan.x, p.y * self.scale + self.pan.y)
	}

	/// Exact inverse of [`Self::world_to_screen`].
	pub fn screen_to_world(&self, p: ScreenPoint) -> WorldPoint {
		WorldPoint::new((p.x - self.pan.x) / self.scale, (p.y - self.pan.y) / self.scale)
	}

	/// World-space length in screen pixels.
	pub fn screen_length(&self, world_length: f64) -> f64 {
		world_length * self.scale
	}

	/// Moves the whole view by a screen-space delta.
	pub fn pan_by(&mut self, delta: ScreenVector) {
		self.pan += delta;
	}

	/// Rescales to `new_scale` keeping the world point under `anchor` in place.
	pub fn zoom_about(&self, anchor: ScreenPoint, new_scale: f64) -> Self {
		let ratio = new_scale / self.scale;
		let anchor = anchor.to_vector();
		Self {
			pan: anchor - (anchor - self.pan) * ratio,
			scale: new_scale,
		}
	}
}
