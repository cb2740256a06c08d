//! Frame composition. Everything is recomputed from the model and view state
//! on each call; nothing is cached between frames.

use super::config::RenderConfig;
use super::geometry::{ScreenPoint, ScreenSize, ScreenVector, ViewTransform};
use super::interaction::ViewState;
use super::model::{GeneNetwork, NodeIdx};

const LEGEND_ROW: f64 = 25.0;
const LEGEND_DOT: f64 = 8.0;
const LEGEND_PADDING: f64 = 10.0;
const LABEL_PADDING: f64 = 5.0;
const LABEL_HEIGHT: f64 = 16.0;
const TOOLTIP_LINE: f64 = 16.0;
const TOOLTIP_OFFSET: f64 = 10.0;

/// Horizontal anchoring of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	Left,
	Center,
}

/// Outline of a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke<'a> {
	pub color: &'a str,
	pub width: f64,
}

/// Text appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle<'a> {
	pub font: &'a str,
	pub color: &'a str,
	pub align: Align,
}

/// A 2-D drawing target in screen pixels.
pub trait Surface {
	/// Filled, optionally outlined rectangle.
	fn rect(&mut self, origin: ScreenPoint, size: ScreenSize, fill: &str, stroke: Option<Stroke<'_>>);
	/// Straight line.
	fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke<'_>, alpha: f64);
	/// Filled, optionally outlined disc.
	fn circle(&mut self, center: ScreenPoint, radius: f64, fill: &str, stroke: Option<Stroke<'_>>);
	/// Single line of text, vertically centred on `at`.
	fn text(&mut self, at: ScreenPoint, text: &str, style: TextStyle<'_>);
	/// Rendered width of `text` in `font`.
	fn text_width(&mut self, text: &str, font: &str) -> f64;
}

/// Maps |PCC| onto `[0, 1]` across `[threshold, 1]`.
fn strength(weight: f64, threshold: f64) -> f64 {
	let span = (1.0 - threshold).max(f64::EPSILON);
	((weight.abs() - threshold) / span).clamp(0.0, 1.0)
}

fn lerp((from, to): (f64, f64), t: f64) -> f64 {
	from + (to - from) * t
}

/// Draws the interactive frame: network, legend and the hovered node's tooltip.
pub fn draw_frame<S: Surface>(
	surface: &mut S,
	graph: &GeneNetwork,
	view: &ViewState,
	config: &RenderConfig,
	threshold: f64,
	size: ScreenSize,
) {
	surface.rect(ScreenPoint::origin(), size, &config.background, None);
	draw_network(surface, graph, view, config, threshold);
	draw_legend(
		surface,
		graph,
		config,
		ScreenPoint::new(LEGEND_PADDING, LEGEND_PADDING),
	);
	if let Some(idx) = view.hovered {
		draw_tooltip(surface, graph, &view.transform, config, idx);
	}
}

/// Draws the export composition: title, network and legend, no hover state.
pub fn draw_export<S: Surface>(
	surface: &mut S,
	graph: &GeneNetwork,
	transform: &ViewTransform,
	config: &RenderConfig,
	threshold: f64,
	title: &str,
	size: ScreenSize,
) {
	surface.rect(ScreenPoint::origin(), size, &config.background, None);
	let still = ViewState {
		transform: *transform,
		..ViewState::default()
	};
	draw_network(surface, graph, &still, config, threshold);
	surface.text(
		ScreenPoint::new(size.width / 2.0, 30.0),
		title,
		TextStyle {
			font: &config.title_font,
			color: "black",
			align: Align::Center,
		},
	);
	draw_legend(surface, graph, config, ScreenPoint::new(30.0, 60.0));
}

/// Edges, then nodes in paint order, then labels.
pub fn draw_network<S: Surface>(
	surface: &mut S,
	graph: &GeneNetwork,
	view: &ViewState,
	config: &RenderConfig,
	threshold: f64,
) {
	let transform = &view.transform;
	for edge in graph.edges() {
		let t = strength(edge.weight, threshold);
		surface.line(
			transform.world_to_screen(graph.node(edge.a).position),
			transform.world_to_screen(graph.node(edge.b).position),
			Stroke {
				color: &config.edge_color,
				width: lerp(config.edge_width, t),
			},
			lerp(config.edge_alpha, t),
		);
	}

	let focused = view.dragged().or(view.hovered);
	for idx in graph.draw_order() {
		let node = graph.node(idx);
		let at = transform.world_to_screen(node.position);
		let radius = transform.screen_length(node.radius);
		let (fill, stroke) = match graph.cluster_of(idx) {
			None => (
				config.center_color.as_str(),
				Some(Stroke {
					color: "black",
					width: 2.0,
				}),
			),
			Some(cluster) => (cluster.color.as_str(), None),
		};
		let stroke = if focused == Some(idx) {
			Some(Stroke {
				color: &config.highlight_color,
				width: 2.0,
			})
		} else {
			stroke
		};
		surface.circle(at, radius, fill, stroke);
	}

	let show_genes = transform.scale >= config.label_scale_threshold;
	for idx in graph.draw_order() {
		let node = graph.node(idx);
		let at = transform.world_to_screen(node.position);
		if node.is_center() {
			draw_boxed_label(surface, config, at, &format!("{} (central)", node.id));
		} else if show_genes {
			let radius = transform.screen_length(node.radius);
			surface.text(
				at + ScreenVector::new(radius + 3.0, 0.0),
				&node.id,
				TextStyle {
					font: &config.label_font,
					color: "#333333",
					align: Align::Left,
				},
			);
		}
	}
}

fn draw_boxed_label<S: Surface>(surface: &mut S, config: &RenderConfig, at: ScreenPoint, text: &str) {
	let width = surface.text_width(text, &config.label_font);
	let size = ScreenSize::new(width + LABEL_PADDING * 2.0, LABEL_HEIGHT + LABEL_PADDING * 2.0);
	surface.rect(
		at - ScreenVector::new(size.width / 2.0, size.height / 2.0),
		size,
		"white",
		Some(Stroke {
			color: "#aaaaaa",
			width: 1.0,
		}),
	);
	surface.text(
		at,
		text,
		TextStyle {
			font: &config.label_font,
			color: &config.center_color,
			align: Align::Center,
		},
	);
}

/// One legend row per cluster, preceded by the center gene.
pub fn legend_entries<'a>(graph: &'a GeneNetwork, config: &'a RenderConfig) -> Vec<(&'a str, String)> {
	let center = graph.node(graph.center());
	std::iter::once((config.center_color.as_str(), format!("{} (central)", center.id)))
		.chain(graph.clusters().iter().map(|cluster| {
			(
				cluster.color.as_str(),
				format!("{} (n={})", cluster.label, cluster.members.len()),
			)
		}))
		.collect()
}

/// Boxed legend with its top-left corner at `origin`.
pub fn draw_legend<S: Surface>(
	surface: &mut S,
	graph: &GeneNetwork,
	config: &RenderConfig,
	origin: ScreenPoint,
) {
	let entries = legend_entries(graph, config);
	let text_width = entries
		.iter()
		.map(|(_, label)| surface.text_width(label, &config.legend_font))
		.fold(0.0, f64::max);
	let size = ScreenSize::new(
		text_width + LEGEND_DOT * 2.0 + LEGEND_PADDING * 3.0,
		entries.len() as f64 * LEGEND_ROW + LEGEND_PADDING,
	);
	surface.rect(
		origin,
		size,
		"white",
		Some(Stroke {
			color: "#dddddd",
			width: 1.0,
		}),
	);
	for (row, (color, label)) in entries.iter().enumerate() {
		let y = origin.y + LEGEND_PADDING + LEGEND_ROW * (row as f64 + 0.5);
		let dot = ScreenPoint::new(origin.x + LEGEND_PADDING + LEGEND_DOT, y);
		surface.circle(
			dot,
			LEGEND_DOT,
			color,
			Some(Stroke {
				color: "black",
				width: 0.5,
			}),
		);
		surface.text(
			dot + ScreenVector::new(LEGEND_DOT + LEGEND_PADDING, 0.0),
			label,
			TextStyle {
				font: &config.legend_font,
				color: "black",
				align: Align::Left,
			},
		);
	}
}

/// Tooltip text for a node.
pub fn tooltip_lines(graph: &GeneNetwork, idx: NodeIdx) -> Vec<String> {
	let node = graph.node(idx);
	match graph.cluster_of(idx) {
		None => vec![node.id.clone(), "Central node".to_string()],
		Some(cluster) => vec![
			node.id.clone(),
			format!("PCC: {:.3}", node.correlation),
			format!("Tissue: {}", cluster.label),
		],
	}
}

fn draw_tooltip<S: Surface>(
	surface: &mut S,
	graph: &GeneNetwork,
	transform: &ViewTransform,
	config: &RenderConfig,
	idx: NodeIdx,
) {
	let node = graph.node(idx);
	let lines = tooltip_lines(graph, idx);
	let width = lines
		.iter()
		.map(|line| surface.text_width(line, &config.tooltip_font))
		.fold(0.0, f64::max);
	let anchor = transform.world_to_screen(node.position);
	let offset = transform.screen_length(node.radius) + TOOLTIP_OFFSET;
	let origin = anchor + ScreenVector::new(offset, offset);
	surface.rect(
		origin,
		ScreenSize::new(
			width + LABEL_PADDING * 2.0,
			lines.len() as f64 * TOOLTIP_LINE + LABEL_PADDING * 2.0,
		),
		"rgba(255, 255, 255, 0.9)",
		Some(Stroke {
			color: "#dddddd",
			width: 1.0,
		}),
	);
	for (row, line) in lines.iter().enumerate() {
		surface.text(
			origin + ScreenVector::new(LABEL_PADDING, LABEL_PADDING + TOOLTIP_LINE * (row as f64 + 0.5)),
			line,
			TextStyle {
				font: &config.tooltip_font,
				color: "black",
				align: Align::Left,
			},
		);
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::super::config::LayoutConfig;
	use super::super::geometry::WorldPoint;
	use super::super::layout::place_initial;
	use super::super::model::tests::scenario;
	use super::*;

	/// A draw call, flattened to owned values.
	#[derive(Clone, Debug, PartialEq)]
	pub(crate) enum Op {
		Rect(ScreenPoint, ScreenSize, String),
		Line(ScreenPoint, ScreenPoint, f64, f64),
		Circle(ScreenPoint, f64, String, Option<String>),
		Text(ScreenPoint, String),
	}

	/// Records draw calls; text is 7px per character.
	#[derive(Default)]
	pub(crate) struct Recorder {
		pub(crate) ops: Vec<Op>,
	}

	impl Recorder {
		pub(crate) fn texts(&self) -> Vec<&str> {
			self.ops
				.iter()
				.filter_map(|op| match op {
					Op::Text(_, text) => Some(text.as_str()),
					_ => None,
				})
				.collect()
		}

		fn circles(&self) -> Vec<(ScreenPoint, f64, &str, Option<&str>)> {
			self.ops
				.iter()
				.filter_map(|op| match op {
					Op::Circle(at, r, fill, stroke) => Some((*at, *r, fill.as_str(), stroke.as_deref())),
					_ => None,
				})
				.collect()
		}

		fn lines(&self) -> Vec<(f64, f64)> {
			self.ops
				.iter()
				.filter_map(|op| match op {
					Op::Line(_, _, width, alpha) => Some((*width, *alpha)),
					_ => None,
				})
				.collect()
		}
	}

	impl Surface for Recorder {
		fn rect(&mut self, origin: ScreenPoint, size: ScreenSize, fill: &str, _: Option<Stroke<'_>>) {
			self.ops.push(Op::Rect(origin, size, fill.to_string()));
		}

		fn line(&mut self, from: ScreenPoint, to: ScreenPoint, stroke: Stroke<'_>, alpha: f64) {
			self.ops.push(Op::Line(from, to, stroke.width, alpha));
		}

		fn circle(&mut self, center: ScreenPoint, radius: f64, fill: &str, stroke: Option<Stroke<'_>>) {
			self.ops.push(Op::Circle(
				center,
				radius,
				fill.to_string(),
				stroke.map(|s| s.color.to_string()),
			));
		}

		fn text(&mut self, at: ScreenPoint, text: &str, _: TextStyle<'_>) {
			self.ops.push(Op::Text(at, text.to_string()));
		}

		fn text_width(&mut self, text: &str, _: &str) -> f64 {
			text.chars().count() as f64 * 7.0
		}
	}

	fn placed() -> GeneNetwork {
		let mut graph = scenario();
		place_initial(&mut graph, &LayoutConfig::default());
		graph
	}

	fn view(scale: f64) -> ViewState {
		ViewState {
			transform: ViewTransform {
				pan: ScreenVector::new(400.0, 300.0),
				scale,
			},
			..ViewState::default()
		}
	}

	fn size() -> ScreenSize {
		ScreenSize::new(800.0, 600.0)
	}

	#[test]
	fn frame_starts_with_background() {
		let graph = placed();
		let config = RenderConfig::default();
		let mut surface = Recorder::default();
		draw_frame(&mut surface, &graph, &view(1.0), &config, 0.8, size());
		assert_eq!(
			surface.ops[0],
			Op::Rect(ScreenPoint::origin(), size(), config.background.clone())
		);
	}

	#[test]
	fn nodes_are_drawn_at_transformed_positions_center_last() {
		let graph = placed();
		let config = RenderConfig::default();
		let state = view(2.0);
		let mut surface = Recorder::default();
		draw_network(&mut surface, &graph, &state, &config, 0.8);

		let circles = surface.circles();
		assert_eq!(circles.len(), graph.len());
		let (at, radius, fill, stroke) = *circles.last().unwrap();
		let center = graph.node(graph.center());
		assert_eq!(at, state.transform.world_to_screen(center.position));
		assert_eq!(radius, center.radius * 2.0);
		assert_eq!(fill, config.center_color);
		assert_eq!(stroke, Some("black"));

		let c = graph.lookup("C").unwrap();
		let kidney = graph.cluster_of(c).unwrap().color.as_str();
		assert!(circles.iter().any(|&(_, _, fill, stroke)| fill == kidney && stroke.is_none()));
	}

	#[test]
	fn stronger_edges_are_wider_and_more_opaque() {
		let graph = placed();
		let mut surface = Recorder::default();
		draw_network(&mut surface, &graph, &view(1.0), &RenderConfig::default(), 0.8);
		let lines = surface.lines();
		assert_eq!(lines.len(), graph.edges().len());
		let by_weight: Vec<_> = graph.edges().iter().map(|e| e.weight).zip(lines).collect();
		let weakest = by_weight.iter().find(|(w, _)| *w == 0.82).unwrap().1;
		let strongest = by_weight.iter().find(|(w, _)| *w == 0.9).unwrap().1;
		assert!(strongest.0 > weakest.0);
		assert!(strongest.1 > weakest.1);
	}

	#[test]
	fn gene_labels_only_when_zoomed_in() {
		let graph = placed();
		let config = RenderConfig::default();

		let mut far = Recorder::default();
		draw_network(&mut far, &graph, &view(1.0), &config, 0.8);
		assert_eq!(far.texts(), ["GCH1 (central)"]);

		let mut near = Recorder::default();
		draw_network(&mut near, &graph, &view(config.label_scale_threshold), &config, 0.8);
		let texts = near.texts();
		for id in ["A", "B", "C", "GCH1 (central)"] {
			assert!(texts.contains(&id), "{id} missing from {texts:?}");
		}
	}

	#[test]
	fn legend_lists_center_then_tissues_with_counts() {
		let graph = placed();
		let config = RenderConfig::default();
		let labels: Vec<_> = legend_entries(&graph, &config)
			.into_iter()
			.map(|(_, label)| label)
			.collect();
		assert_eq!(labels, ["GCH1 (central)", "liver (n=2)", "kidney (n=1)"]);
	}

	#[test]
	fn tooltip_shows_identifier_and_correlation() {
		let graph = placed();
		let a = graph.lookup("A").unwrap();
		assert_eq!(tooltip_lines(&graph, a), ["A", "PCC: 0.850", "Tissue: liver"]);
		assert_eq!(tooltip_lines(&graph, graph.center()), ["GCH1", "Central node"]);
	}

	#[test]
	fn hovered_node_gets_tooltip_and_highlight() {
		let graph = placed();
		let config = RenderConfig::default();
		let b = graph.lookup("B").unwrap();
		let mut state = view(1.0);
		state.hovered = Some(b);
		let mut surface = Recorder::default();
		draw_frame(&mut surface, &graph, &state, &config, 0.8, size());

		assert!(surface.texts().contains(&"PCC: 0.900"));
		let highlighted: Vec<_> = surface
			.circles()
			.into_iter()
			.filter(|c| c.3 == Some(config.highlight_color.as_str()))
			.collect();
		assert_eq!(highlighted.len(), 1);
		assert_eq!(highlighted[0].0, state.transform.world_to_screen(graph.node(b).position));
	}

	#[test]
	fn rendering_is_a_pure_function_of_inputs() {
		let mut graph = placed();
		let config = RenderConfig::default();
		let state = view(1.0);
		let mut first = Recorder::default();
		let mut second = Recorder::default();
		draw_frame(&mut first, &graph, &state, &config, 0.8, size());
		draw_frame(&mut second, &graph, &state, &config, 0.8, size());
		assert_eq!(first.ops, second.ops);

		graph.set_position(graph.lookup("A").unwrap(), WorldPoint::new(-5.0, 7.0));
		let mut moved = Recorder::default();
		draw_frame(&mut moved, &graph, &state, &config, 0.8, size());
		assert_ne!(first.ops, moved.ops);
	}

	#[test]
	fn export_adds_title_and_legend_without_tooltip() {
		let graph = placed();
		let config = RenderConfig::default();
		let mut surface = Recorder::default();
		draw_export(
			&mut surface,
			&graph,
			&view(1.0).transform,
			&config,
			0.8,
			"GCH1 network",
			size(),
		);
		let texts = surface.texts();
		assert!(texts.contains(&"GCH1 network"));
		assert!(texts.contains(&"kidney (n=1)"));
		assert!(!texts.iter().any(|t| t.starts_with("PCC")));
	}
}
