use std::cell::RefCell;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::NetworkConfig;
use super::export;
use super::geometry::{ScreenPoint, ScreenSize};
use super::model::GeneNetwork;
use super::state::NetworkState;

type Shared<T> = Rc<RefCell<Option<T>>>;

fn window_size(window: &Window) -> Option<ScreenSize> {
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some(ScreenSize::new(width, height))
}

/// Pointer position relative to the canvas' top-left corner.
fn pointer_position(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<(HtmlCanvasElement, ScreenPoint)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	let at = ScreenPoint::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	);
	Some((canvas, at))
}

fn sync_cursor(canvas: &HtmlCanvasElement, state: &NetworkState) {
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", state.cursor());
}

/// Interactive canvas for one [`GeneNetwork`], with reset, optimise and export controls.
#[component]
pub fn GeneNetworkCanvas(
	network: GeneNetwork,
	#[prop(optional)] config: NetworkConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let pending: Shared<(GeneNetwork, NetworkConfig)> = Rc::new(RefCell::new(Some((network, config))));
	let state: Shared<NetworkState> = Rc::new(RefCell::new(None));
	let animate: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let (export_error, set_export_error) = signal(None::<String>);
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some((network, config)) = pending.borrow_mut().take() else {
			return;
		};

		let size = if fullscreen {
			window_size(&window).unwrap_or(ScreenSize::new(800.0, 600.0))
		} else {
			ScreenSize::new(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(size.width as u32);
		canvas.set_height(size.height as u32);

		let Some(mut ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("Canvas 2d context unavailable");
			return;
		};
		info!("Canvas ready at {}x{}", size.width, size.height);
		*state_init.borrow_mut() = Some(NetworkState::new(network, config, size));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(size) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(size.width as u32);
				canvas_resize.set_height(size.height as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(size);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.tick() {
					s.render(&mut ctx);
				}
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((canvas, at)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(at);
			sync_cursor(&canvas, s);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((canvas, at)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(at);
			sync_cursor(&canvas, s);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
			if let Some(canvas) = canvas_ref.get() {
				sync_cursor(&canvas, s);
			}
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
			if let Some(canvas) = canvas_ref.get() {
				sync_cursor(&canvas, s);
			}
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((_, at)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(at, ev.delta_y());
		}
	};

	let state_reset = state.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.reset_view();
		}
	};

	let state_opt = state.clone();
	let on_optimize = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_opt.borrow_mut() {
			s.optimize_layout();
		}
	};

	let state_ex = state;
	let on_export = move |_: MouseEvent| {
		let guard = state_ex.borrow();
		let Some(s) = guard.as_ref() else {
			return;
		};
		let result = s
			.export()
			.and_then(|image| export::download(&image, &s.config.export.file_name));
		match result {
			Ok(()) => set_export_error.set(None),
			Err(e) => {
				warn!("Export failed: {e}");
				set_export_error.set(Some(e.to_string()));
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="gene-network-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: default;"
		/>
		<div class="network-controls">
			<button on:click=on_reset>"Reset View"</button>
			<button on:click=on_optimize>"Optimize Layout"</button>
			<button on:click=on_export>"Download High-Res PNG"</button>
			{move || {
				export_error
					.get()
					.map(|message| {
						view! {
							<div class="export-error" role="alert">
								<span>{format!("Export failed: {message}")}</span>
								<button on:click=move |_| set_export_error.set(None)>"Dismiss"</button>
							</div>
						}
					})
			}}
		</div>
	}
}
