use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::RendererConfig;
use super::message::HostMessage;
use super::render::{self, CanvasTextMeasure};
use super::renderer::ProjectGraphRenderer;
use super::scene::Scene;
use super::surface::Point;
use super::viewport::Gesture;

struct CanvasState {
	renderer: ProjectGraphRenderer<Scene>,
	ctx: CanvasRenderingContext2d,
	pointer: Option<Point>,
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas showing the project graph. Every new `message` is dispatched to the renderer.
#[component]
pub fn ProjectGraphCanvas(
	#[prop(into)] message: Signal<Option<HostMessage>>,
	#[prop(optional)] config: Option<RendererConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let message = message.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window available");
			return;
		};

		if state_init.borrow().is_none() {
			let (w, h) = if fullscreen {
				window_size(&window).unwrap_or((800.0, 600.0))
			} else {
				(
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
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
				Ok(Some(ctx)) => match ctx.dyn_into() {
					Ok(ctx) => ctx,
					Err(_) => {
						error!("2d context has an unexpected type");
						return;
					}
				},
				_ => {
					error!("canvas has no 2d context");
					return;
				}
			};
			let scene = Scene::new(w, h, CanvasTextMeasure::new(ctx.clone()));
			*state_init.borrow_mut() = Some(CanvasState {
				renderer: ProjectGraphRenderer::new(scene, config.clone().unwrap_or_default()),
				ctx,
				pointer: None,
			});
			info!("project graph canvas ready ({w}x{h})");

			if fullscreen {
				let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
						return;
					};
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut s) = *state_resize.borrow_mut() {
						s.renderer.surface_mut().resize(nw, nh);
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
					if s.renderer.is_animating() {
						s.renderer.step();
					}
					render::paint(s.renderer.surface(), &s.ctx);
				}
				if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}

		if let (Some(message), Some(s)) = (message, state_init.borrow_mut().as_mut()) {
			message.dispatch(&mut s.renderer);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer = local_point(canvas_ref, &ev);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(point) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if let Some(last) = s.pointer {
				s.renderer.pan(point.x - last.x, point.y - last.y);
				s.pointer = Some(point);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer = None;
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer = None;
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some(at) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			s.renderer.handle_gesture(Gesture::DoubleClick { at });
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(anchor) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.renderer.zoom_by(factor, anchor);
		}
	};

	let state_reset = state.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_reset.borrow_mut() {
			s.renderer.reset_transformation();
		}
	};

	view! {
		<div class="project-graph">
			<div class="header">
				<span class="action-box">
					"Reset display "
					<a on:click=on_reset style="font-size: 120%; font-weight: 800; cursor: pointer;">
						"↺"
					</a>
				</span>
			</div>
			<canvas
				node_ref=canvas_ref
				class="project-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
