use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::backdrop::WeakShared;
use crate::curve::{Paint, PathSeg, Stroke, Surface};
use crate::frame_loop::{FrameHandle, FrameScheduler};

pub type FrameCell = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// [`Surface`] over a canvas 2d context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// `Ok(None)` when the browser has no 2d context for this canvas.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Option<Self>, JsValue> {
        let Some(ctx) = canvas.get_context("2d")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            canvas: canvas.clone(),
            ctx: ctx.dyn_into()?,
        }))
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f64, height: f64, scale: f64) {
        // backing store in device pixels, drawing in CSS pixels
        self.canvas.set_width((width * scale).floor() as u32);
        self.canvas.set_height((height * scale).floor() as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px")).ok();
        style.set_property("height", &format!("{height}px")).ok();
        if let Err(e) = self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0) {
            log::warn!("canvas transform rejected: {:?}", e);
        }
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: Paint) {
        match paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Paint::Radial {
                cx,
                cy,
                radius,
                inner,
                outer,
            } => {
                let gradient = match self.ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, radius) {
                    Ok(g) => g,
                    Err(e) => {
                        log::debug!("radial gradient rejected: {:?}", e);
                        return;
                    }
                };
                gradient.add_color_stop(0.0, &inner.to_css()).ok();
                gradient.add_color_stop(1.0, &outer.to_css()).ok();
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        self.ctx.fill_rect(x, y, width, height);
    }

    fn stroke_path(&mut self, path: &[PathSeg], stroke: Stroke) {
        self.ctx.begin_path();
        for seg in path {
            match *seg {
                PathSeg::MoveTo(x, y) => self.ctx.move_to(x, y),
                PathSeg::QuadTo(cx, cy, x, y) => self.ctx.quadratic_curve_to(cx, cy, x, y),
            }
        }
        self.ctx.set_line_width(stroke.width);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.stroke();
    }
}

/// [`FrameScheduler`] over `requestAnimationFrame`. Every request reuses the
/// closure stored in the shared cell.
pub struct RafFrames {
    window: Window,
    callback: FrameCell,
}

impl RafFrames {
    pub fn new(window: Window, callback: FrameCell) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for RafFrames {
    fn request(&mut self) -> Option<FrameHandle> {
        let callback = self.callback.borrow();
        let f = callback.as_ref()?;
        match self.window.request_animation_frame(f.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.window.cancel_animation_frame(handle.0).ok();
    }
}

/// Fill the frame cell with the per-frame closure. It holds the controller
/// weakly, so dropping the controller ends the animation.
pub fn install_frame_callback(cell: &FrameCell, backdrop: WeakShared) {
    *cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(shared) = backdrop.upgrade() {
            shared.borrow_mut().frame();
        }
    }) as Box<dyn FnMut()>));
}
