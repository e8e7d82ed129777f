//! Leptos component wrapping the relationship graph canvas.
//!
//! The component owns one [`NetworkGraphState`] for its lifetime. Reactive
//! inputs map onto it as follows:
//! - `data` changes rebuild the model (stopping the previous layout first),
//! - `selected` and `search` changes only recompute highlighting,
//! - a click on a node reports the toggled selection through `on_select`.
//!
//! An animation loop runs via `requestAnimationFrame`, stepping the layout and
//! redrawing each frame. Unmounting cancels the pending frame, detaches the
//! resize listener and stops the layout.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::build::build_graph;
use super::config::NetworkConfig;
use super::render;
use super::scale::Point;
use super::state::NetworkGraphState;
use super::theme::Theme;
use super::types::{ArchiveData, Category, PersonId};
use crate::components::legend::Legend;

const FRAME_DT: f64 = 0.016;

/// Bundles graph state with the drawing surface and theme.
struct GraphContext {
	state: NetworkGraphState,
	ctx: CanvasRenderingContext2d,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Hover tooltip contents, anchored at the pointer in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
struct Tooltip {
	name: String,
	category: Category,
	connections: usize,
	at: Point,
}

/// Tooltip for the hovered node, if any, placed at pointer `at`.
fn hover_tooltip(state: &NetworkGraphState, at: Point) -> Option<Tooltip> {
	let node = state.model.nodes.get(state.hovered?)?;
	Some(Tooltip {
		name: node.name.clone(),
		category: node.category,
		connections: node.connection_count,
		at,
	})
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Canvas size: the window when fullscreen, otherwise explicit dimensions or
/// the parent container.
fn measure(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		if let Some(window) = web_sys::window() {
			let w = window.inner_width().ok().and_then(|v| v.as_f64());
			let h = window.inner_height().ok().and_then(|v| v.as_f64());
			if let (Some(w), Some(h)) = (w, h) {
				return (w, h);
			}
		}
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders the relationship graph for `data`.
///
/// `selected` is owned by the parent; the component only reports toggles via
/// `on_select` and reflects whatever the parent passes back.
#[component]
pub fn NetworkGraph(
	#[prop(into)] data: Signal<ArchiveData>,
	#[prop(into)] selected: Signal<Option<PersonId>>,
	#[prop(into)] search: Signal<String>,
	on_select: impl Fn(Option<PersonId>) + 'static,
	#[prop(optional)] config: NetworkConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: SharedClosure = Rc::new(RefCell::new(None));
	let frame: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let tooltip = RwSignal::new(None::<Tooltip>);

	let (context_init, animate_init, resize_cb_init, frame_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame.clone(),
	);
	Effect::new(move |_| {
		let snapshot = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let model = build_graph(&snapshot.persons, &snapshot.connections);

		if let Some(ref mut c) = *context_init.borrow_mut() {
			c.state.rebuild(model);
			tooltip.set(None);
			return;
		}

		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = measure(&canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let Some(ctx) = context_2d(&canvas) else {
			warn!("archive-network: canvas 2d context unavailable");
			return;
		};

		let mut state = NetworkGraphState::new(model, w, h, config.clone());
		state.set_highlight(selected.get_untracked(), &search.get_untracked());
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			ctx,
			theme: Theme::default(),
		});

		let context_resize = context_init.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(canvas) = canvas_ref.get_untracked() else {
				return;
			};
			let (nw, nh) = measure(&canvas, fullscreen, width, height);
			canvas.set_width(nw as u32);
			canvas.set_height(nh as u32);
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.state.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner, frame_inner) =
			(context_init.clone(), animate_init.clone(), frame_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				if c.state.tick(FRAME_DT) {
					render::render(&c.state, &c.ctx, &c.theme);
				}
			}
			let Some(window) = web_sys::window() else {
				return;
			};
			if let Some(ref cb) = *animate_inner.borrow() {
				frame_inner.set(
					window
						.request_animation_frame(cb.as_ref().unchecked_ref())
						.ok(),
				);
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(
				window
					.request_animation_frame(cb.as_ref().unchecked_ref())
					.ok(),
			);
		}
	});

	let context_hl = context.clone();
	Effect::new(move |_| {
		let (sel, query) = (selected.get(), search.get());
		if let Some(ref mut c) = *context_hl.borrow_mut() {
			c.state.set_highlight(sel, &query);
		}
	});

	let teardown = SendWrapper::new((context.clone(), animate, resize_cb, frame));
	on_cleanup(move || {
		let (context, animate, resize_cb, frame) = teardown.take();
		if let Some(window) = web_sys::window() {
			if let Some(handle) = frame.take() {
				let _ = window.cancel_animation_frame(handle);
			}
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		animate.borrow_mut().take();
		resize_cb.borrow_mut().take();
		if let Some(mut c) = context.borrow_mut().take() {
			c.state.stop_layout();
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(at);
		}
		tooltip.set(None);
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		let next = match *context_mm.borrow_mut() {
			Some(ref mut c) => {
				c.state.pointer_move(at);
				hover_tooltip(&c.state, at)
			}
			None => None,
		};
		if next.is_some() || tooltip.with_untracked(Option::is_some) {
			tooltip.set(next);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let choice = match *context_mu.borrow_mut() {
			Some(ref mut c) => c
				.state
				.pointer_up()
				.map(|id| c.state.selection_after_click(id)),
			None => None,
		};
		if let Some(next) = choice {
			on_select(next);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_leave();
		}
		tooltip.set(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.wheel(ev.delta_y(), at);
		}
	};

	let (context_zi, context_zo, context_zr) = (context.clone(), context.clone(), context);
	let zoom_in = move |_| {
		if let Some(ref mut c) = *context_zi.borrow_mut() {
			c.state.zoom_in();
		}
	};
	let zoom_out = move |_| {
		if let Some(ref mut c) = *context_zo.borrow_mut() {
			c.state.zoom_out();
		}
	};
	let zoom_reset = move |_| {
		if let Some(ref mut c) = *context_zr.borrow_mut() {
			c.state.reset_zoom();
		}
	};

	view! {
		<div class="network-graph" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=move || data.with(|d| d.persons.is_empty())>
				<div class="network-graph-empty">"No network data available"</div>
			</Show>
			<div class="network-graph-controls">
				<button title="Zoom in" on:click=zoom_in>"+"</button>
				<button title="Zoom out" on:click=zoom_out>"−"</button>
				<button title="Reset view" on:click=zoom_reset>"Reset"</button>
			</div>
			<Legend />
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<div
								class="network-graph-tooltip"
								style=format!(
									"position: absolute; left: {}px; top: {}px; pointer-events: none;",
									t.at.x + 12.0,
									t.at.y + 12.0,
								)
							>
								<strong>{t.name}</strong>
								<div>{t.category.label()}</div>
								<div>{format!("{} connections", t.connections)}</div>
							</div>
						}
					})
			}}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::super::types::{Connection, ConnectionType, Person};
	use super::*;

	fn state() -> NetworkGraphState {
		let persons: Vec<_> = [(1, "Ada"), (2, "Bo")]
			.map(|(id, name)| Person {
				id,
				name: name.into(),
				category: Category::Witness,
				description: None,
				aliases: Vec::new(),
			})
			.into();
		let connections = [Connection {
			id: 7,
			person_id1: 1,
			person_id2: 2,
			connection_type: ConnectionType::Employee,
			description: None,
			strength: 1.0,
		}];
		let model = build_graph(&persons, &connections);
		NetworkGraphState::new(model, 800.0, 600.0, NetworkConfig::default())
	}

	#[test]
	fn tooltip_follows_the_pointer_not_the_node() {
		let mut s = state();
		let id = s.model.nodes[0].id;
		let node = s.zoom.transform().to_screen(s.positions().unwrap().get(id).unwrap());
		let pointer = Point::new(node.x + 3.0, node.y - 2.0);

		s.pointer_move(pointer);
		let tooltip = hover_tooltip(&s, pointer).unwrap();
		assert_eq!(tooltip.at, pointer);
		assert_eq!(tooltip.name, "Ada");
		assert_eq!(tooltip.connections, 1);
	}

	#[test]
	fn no_tooltip_off_node() {
		let mut s = state();
		let far = Point::new(-500.0, -500.0);
		s.pointer_move(far);
		assert_eq!(hover_tooltip(&s, far), None);
	}
}
