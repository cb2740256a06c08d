use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geometry::{ScreenPoint, ScreenSize};
use super::render::{Align, Stroke, Surface, TextStyle};

impl Surface for CanvasRenderingContext2d {
	fn rect(&mut self, origin: ScreenPoint, size: ScreenSize, fill: &str, stroke: Option<Stroke<'_>>) {
		self.set_fill_style_str(fill);
		self.fill_rect(origin.x, origin.y, size.width, size.height);
		if let Some(stroke) = stroke {
			self.set_stroke_style_str(stroke.color);
			self.set_line_width(stroke.width);
			self.stroke_rect(origin.x, origin.y, size.width, size.height);
		}
	}

	fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke<'_>, alpha: f64) {
		self.set_global_alpha(alpha);
		self.set_stroke_style_str(stroke.color);
		self.set_line_width(stroke.width);
		self.begin_path();
		self.move_to(from.x, from.y);
		self.line_to(to.x, to.y);
		self.stroke();
		self.set_global_alpha(1.0);
	}

	fn circle(&mut self, center: ScreenPoint, radius: f64, fill: &str, stroke: Option<Stroke<'_>>) {
		self.begin_path();
		let _ = self.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		self.set_fill_style_str(fill);
		self.fill();
		if let Some(stroke) = stroke {
			self.set_stroke_style_str(stroke.color);
			self.set_line_width(stroke.width);
			self.stroke();
		}
	}

	fn text(&mut self, at: ScreenPoint, text: &str, style: TextStyle<'_>) {
		self.set_font(style.font);
		self.set_fill_style_str(style.color);
		self.set_text_align(match style.align {
			Align::Left => "left",
			Align::Center => "center",
		});
		self.set_text_baseline("middle");
		let _ = self.fill_text(text, at.x, at.y);
	}

	fn text_width(&mut self, text: &str, font: &str) -> f64 {
		self.set_font(font);
		self.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	}
}
