//! High-resolution PNG capture of the current view.
//!
//! The composition is drawn into an offscreen canvas whose bitmap is `scale`
//! times the on-screen size, encoded by the browser and decoded back into
//! bytes so the result can be checked before it is offered for download.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlAnchorElement, HtmlCanvasElement};

use super::config::{ExportConfig, RenderConfig};
use super::error::ExportError;
use super::geometry::{ScreenSize, ViewTransform};
use super::model::GeneNetwork;
use super::render;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
const PNG_DATA_URL: &str = "data:image/png;base64,";

/// An encoded PNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
	/// Bitmap width in device pixels.
	pub width: u32,
	/// Bitmap height in device pixels.
	pub height: u32,
	/// PNG file contents.
	pub bytes: Vec<u8>,
}

impl ExportedImage {
	/// `data:` URL suitable for an anchor's `href`.
	pub fn data_url(&self) -> String {
		format!("{PNG_DATA_URL}{}", STANDARD.encode(&self.bytes))
	}
}

/// Bitmap dimensions for `size` at `scale`, rejecting anything past `max_dimension`.
pub fn bitmap_size(size: ScreenSize, scale: f64, max_dimension: u32) -> Result<(u32, u32), ExportError> {
	if !(size.width > 0.0 && size.height > 0.0) {
		return Err(ExportError::Canvas(format!(
			"canvas has no area ({}x{})",
			size.width, size.height
		)));
	}
	let scale = scale.max(1.0);
	let width = (size.width * scale).round().max(1.0) as u64;
	let height = (size.height * scale).round().max(1.0) as u64;
	if width > u64::from(max_dimension) || height > u64::from(max_dimension) {
		return Err(ExportError::TooLarge {
			width,
			height,
			limit: max_dimension,
		});
	}
	Ok((width as u32, height as u32))
}

/// Extracts PNG bytes from the browser's `toDataURL` output.
pub fn decode_png_data_url(url: &str) -> Result<Vec<u8>, ExportError> {
	let payload = url
		.strip_prefix(PNG_DATA_URL)
		.ok_or_else(|| ExportError::Encoding("browser returned no PNG data".into()))?;
	let bytes = STANDARD
		.decode(payload)
		.map_err(|e| ExportError::Encoding(e.to_string()))?;
	if !bytes.starts_with(&PNG_SIGNATURE) {
		return Err(ExportError::Encoding("payload is not a PNG".into()));
	}
	Ok(bytes)
}

fn js_error(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn document() -> Result<Document, ExportError> {
	web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| ExportError::Canvas("no document".into()))
}

/// Renders title, network and legend at `options.scale` and encodes a PNG.
/// Neither the network nor the view is modified.
pub fn export_png(
	graph: &GeneNetwork,
	transform: &ViewTransform,
	render_config: &RenderConfig,
	threshold: f64,
	size: ScreenSize,
	options: &ExportConfig,
) -> Result<ExportedImage, ExportError> {
	let (width, height) = bitmap_size(size, options.scale, options.max_dimension)?;

	let canvas: HtmlCanvasElement = document()?
		.create_element("canvas")
		.map_err(|e| ExportError::Canvas(js_error(e)))?
		.dyn_into()
		.map_err(|_| ExportError::Canvas("element is not a canvas".into()))?;
	canvas.set_width(width);
	canvas.set_height(height);
	let mut ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|e| ExportError::Canvas(js_error(e)))?
		.ok_or_else(|| ExportError::Canvas("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|_| ExportError::Canvas("unexpected context type".into()))?;
	ctx.scale(width as f64 / size.width, height as f64 / size.height)
		.map_err(|e| ExportError::Canvas(js_error(e)))?;

	render::draw_export(
		&mut ctx,
		graph,
		transform,
		render_config,
		threshold,
		&options.title,
		size,
	);

	let url = canvas
		.to_data_url_with_type("image/png")
		.map_err(|e| ExportError::Encoding(js_error(e)))?;
	let bytes = decode_png_data_url(&url)?;
	info!("Exported {}x{} PNG ({} bytes)", width, height, bytes.len());
	Ok(ExportedImage {
		width,
		height,
		bytes,
	})
}

/// Offers `image` to the browser as a download called `file_name`.
pub fn download(image: &ExportedImage, file_name: &str) -> Result<(), ExportError> {
	let document = document()?;
	let body = document
		.body()
		.ok_or_else(|| ExportError::Canvas("document has no body".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(|e| ExportError::Canvas(js_error(e)))?
		.dyn_into()
		.map_err(|_| ExportError::Canvas("element is not an anchor".into()))?;
	anchor.set_href(&image.data_url());
	anchor.set_download(file_name);
	body.append_child(&anchor)
		.map_err(|e| ExportError::Canvas(js_error(e)))?;
	anchor.click();
	anchor.remove();
	Ok(())
}
