use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size, Vec2};
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent,
	Window,
};

use super::config::TreeConfig;
use super::gesture::WheelInput;
use super::model::Tree;
use super::render;
use super::state::TreeState;

type StateCell = Rc<RefCell<Option<TreeState>>>;

fn now() -> f64 {
	js_sys::Date::now()
}

fn window_size(window: &Window) -> Option<Size> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some(Size::new(w, h))
}

fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		f64::from(client_x) - rect.left(),
		f64::from(client_y) - rect.top(),
	)
}

fn touch_points(canvas: &HtmlCanvasElement, touches: &TouchList) -> Vec<Point> {
	(0..touches.length())
		.filter_map(|i| touches.get(i))
		.map(|t| canvas_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

/// Interactive lineage tree drawn onto a `<canvas>`.
///
/// Click selects a node and highlights its path to the root, double-click
/// collapses or expands it. Drag or scroll to pan; Ctrl/⌘ + scroll or pinch to
/// zoom. Bumping `fit` re-centres the whole tree.
#[component]
pub fn TreeCanvas(
	#[prop(into)] data: Signal<Tree>,
	#[prop(default = TreeConfig::default())] config: TreeConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional, into)] fit: Option<Signal<usize>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: StateCell = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let container = if fullscreen {
			window_size(&window).unwrap_or(Size::new(800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			Size::new(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| f64::from(p.client_width()))
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| f64::from(p.client_height()))
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(container.width as u32);
		canvas.set_height(container.height as u32);

		let Some(mut ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};

		let tree = data.get();
		info!("loaded {} nodes", tree.node_count());
		*state_init.borrow_mut() = Some(TreeState::new(tree, config.clone(), container, now()));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(size) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(size.width as u32);
				canvas_resize.set_height(size.height as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(size, now());
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let t = now();
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.needs_redraw(t) {
					s.tick(t);
					render::render(s, &mut ctx, t);
					s.drawn(t);
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_fit = state.clone();
	Effect::new(move |_| {
		let Some(fit) = fit else {
			return;
		};
		if fit.get() == 0 {
			return;
		}
		if let Some(ref mut s) = *state_fit.borrow_mut() {
			s.fit(now());
		}
	});

	// Every handler resolves the canvas and the state first and bails out quietly
	// when either is missing.
	let with_state = move |state: &StateCell, f: &mut dyn FnMut(&HtmlCanvasElement, &mut TreeState)| {
		let Some(canvas) = canvas_ref.get_untracked() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		if let Some(ref mut s) = *state.borrow_mut() {
			f(&canvas, s);
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		with_state(&state_md, &mut |canvas, s| {
			s.pointer_down(canvas_point(canvas, ev.client_x(), ev.client_y()));
		});
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		with_state(&state_mm, &mut |canvas, s| {
			s.pointer_move(canvas_point(canvas, ev.client_x(), ev.client_y()), now());
		});
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		with_state(&state_mu, &mut |_, s| s.pointer_up());
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, &mut |_, s| s.pointer_leave(now()));
	};

	let state_cl = state.clone();
	let on_click = move |ev: MouseEvent| {
		with_state(&state_cl, &mut |canvas, s| {
			s.click_at(canvas_point(canvas, ev.client_x(), ev.client_y()), now());
		});
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		ev.prevent_default();
		with_state(&state_dc, &mut |canvas, s| {
			s.double_click_at(canvas_point(canvas, ev.client_x(), ev.client_y()), now());
		});
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		with_state(&state_wh, &mut |canvas, s| {
			let input = WheelInput {
				delta: Vec2::new(ev.delta_x(), ev.delta_y()),
				delta_mode: ev.delta_mode(),
				ctrl: ev.ctrl_key(),
				meta: ev.meta_key(),
				position: canvas_point(canvas, ev.client_x(), ev.client_y()),
			};
			s.wheel(&input, now());
		});
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		with_state(&state_ts, &mut |canvas, s| {
			s.touch_start(&touch_points(canvas, &ev.touches()));
		});
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		with_state(&state_tm, &mut |canvas, s| {
			s.touch_move(&touch_points(canvas, &ev.touches()), now());
		});
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		with_state(&state_te, &mut |canvas, s| {
			s.touch_end(&touch_points(canvas, &ev.touches()));
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="lineage-tree-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
