//! Canvas rendering for the network graph.
//!
//! Reads positions from the layout's store and opacities from the highlight
//! view; never writes to either. Passes, in z-order:
//! 1. Background (screen space)
//! 2. Edges (world space)
//! 3. Dimmed nodes, then emphasized nodes on top, each with its label

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::layout::PositionStore;
use super::scale::{Point, ScaledValues};
use super::state::NetworkGraphState;
use super::theme::{Color, Theme, category_color, connection_style};

/// Renders the complete graph to the canvas.
pub fn render(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(state, ctx, theme);

	if state.model.is_empty() {
		return;
	}
	let Some(positions) = state.positions() else {
		return;
	};
	let transform = state.zoom.transform();
	let scale = ScaledValues::new(&state.config.scale, transform.k);

	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_edges(state, ctx, positions, &scale, theme);
	for emphasized in [false, true] {
		draw_nodes(state, ctx, positions, &scale, theme, emphasized);
	}

	ctx.restore();
}

fn draw_background(state: &NetworkGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	match ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &NetworkGraphState,
	ctx: &CanvasRenderingContext2d,
	positions: &PositionStore,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let model = &state.model;
	let k = state.zoom.transform().k;
	let dash = js_sys::Array::of2(
		&JsValue::from_f64(theme.dash_pattern.0 / k),
		&JsValue::from_f64(theme.dash_pattern.1 / k),
	);
	let solid = js_sys::Array::new();

	for (idx, edge) in model.edges.iter().enumerate() {
		let (Some(a), Some(b)) = (
			positions.get(model.nodes[edge.source].id),
			positions.get(model.nodes[edge.target].id),
		) else {
			continue;
		};
		let style = connection_style(edge.connection_type);
		let alpha = state.highlight.edge_opacity(idx, &state.config.highlight);

		ctx.set_stroke_style_str(&style.color.with_alpha(alpha).to_css());
		ctx.set_line_width(scale.edge_width(edge.strength));
		let _ = ctx.set_line_dash(if style.dashed { &dash } else { &solid });
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&solid);
}

fn draw_nodes(
	state: &NetworkGraphState,
	ctx: &CanvasRenderingContext2d,
	positions: &PositionStore,
	scale: &ScaledValues,
	theme: &Theme,
	emphasized: bool,
) {
	let model = &state.model;
	let style = &state.config.highlight;

	for (idx, node) in model.nodes.iter().enumerate() {
		let flags = state.highlight.node(idx);
		if flags.emphasized != emphasized {
			continue;
		}
		let Some(at) = positions.get(node.id) else {
			continue;
		};
		let radius = model.node_radius(idx);

		ctx.set_global_alpha(state.highlight.node_opacity(idx, style));
		fill_node(ctx, at, radius, category_color(node.category));
		ctx.set_global_alpha(1.0);

		if flags.search_match {
			ctx.begin_path();
			let _ = ctx.arc(at.x, at.y, radius + scale.outline_width / 2.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.search_outline.to_css());
			ctx.set_line_width(scale.outline_width);
			ctx.stroke();
		}

		if state.highlight.selected() == Some(idx) {
			ctx.begin_path();
			let offset = scale.outline_width + scale.ring_width;
			let _ = ctx.arc(at.x, at.y, radius + offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.selection_ring.to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}

		if model.shows_label(idx) {
			let alpha = state.highlight.label_opacity(idx, style);
			ctx.set_fill_style_str(&theme.label.with_alpha(alpha).to_css());
			ctx.set_font(&scale.label_font);
			let _ = ctx.fill_text(&node.name, at.x + radius + 4.0, at.y + 3.0);
		}
	}
}

fn fill_node(ctx: &CanvasRenderingContext2d, at: Point, radius: f64, color: Color) {
	ctx.begin_path();
	let _ = ctx.arc(at.x, at.y, radius, 0.0, 2.0 * PI);
	match ctx.create_radial_gradient(
		at.x - radius * 0.3,
		at.y - radius * 0.3,
		0.0,
		at.x,
		at.y,
		radius,
	) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.35).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();
}
