//! Animated page background with two interchangeable backends: an external
//! 3-D scene element, and a spring-driven curve drawn on a 2-D canvas when
//! the scene is unavailable or not wanted.
//!
//! Everything outside the `wasm` module is platform independent and runs
//! under plain `cargo test`.

pub mod arbiter;
pub mod backdrop;
pub mod color;
pub mod curve;
pub mod field;
pub mod frame_loop;
pub mod readiness;
pub mod settings;

pub use arbiter::{Backend, ModeArbiter};
pub use backdrop::{Backdrop, Parts, Shared, Stage, Viewport};
pub use color::Color;
pub use settings::{Mode, Settings};

#[cfg(target_arch = "wasm32")]
pub use wasm::dom::{DomStage, ElementProbe, LocalStore, WindowTimers};
#[cfg(target_arch = "wasm32")]
pub use wasm::render::{CanvasSurface, RafFrames};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::backdrop::{Backdrop, Parts, Shared};
    use crate::color::{Color, FALLBACK_COLOR};
    use crate::readiness::{ReadinessDetector, SizePoll};
    use crate::settings::{KeyValueStore, MemoryStore, PageDefaults};

    pub mod dom;
    mod events;
    pub mod render;

    pub const CANVAS_ID: &str = "bg-canvas";
    pub const SCENE_ID: &str = "bg-scene";
    /// Tag the external 3-D viewer registers itself under.
    pub const SCENE_TAG: &str = "spline-viewer";
    pub const WATERMARK_ID: &str = "bg-scene-watermark";
    pub const TOGGLE_ID: &str = "bg-toggle";
    pub const PANEL_ID: &str = "bg-settings";
    pub const MODE_ID: &str = "bg-mode";
    pub const COLOR_ID: &str = "bg-color";
    pub const INTENSITY_ID: &str = "bg-intensity";
    pub const POINTS_ID: &str = "bg-points";
    pub const RESET_ID: &str = "bg-reset";
    pub const CLOSE_ID: &str = "bg-close";
    const THEME_PROPERTY: &str = "--secondary-color";

    thread_local! {
        static MOUNTED: RefCell<Option<Shared>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        if document.ready_state() == "loading" {
            let target: web_sys::EventTarget = document.clone().into();
            events::once(&target, "DOMContentLoaded", move || {
                if let Err(e) = mount(&window, &document) {
                    log::error!("background init error: {:?}", e);
                }
            })
        } else {
            mount(&window, &document)
        }
    }

    /// Stop the background and hide both backends.
    #[wasm_bindgen]
    pub fn teardown() {
        if let Some(shared) = MOUNTED.with(|m| m.borrow_mut().take()) {
            shared.borrow_mut().teardown();
            log::info!("background torn down");
        }
    }

    fn mount(window: &web_sys::Window, document: &web_sys::Document) -> Result<(), JsValue> {
        let Some(canvas) = document.get_element_by_id(CANVAS_ID) else {
            log::info!("no #{CANVAS_ID} on this page; background disabled");
            return Ok(());
        };
        let canvas: web_sys::HtmlCanvasElement = canvas.dyn_into()?;
        let Some(surface) = render::CanvasSurface::new(&canvas)? else {
            log::warn!("2d canvas context unavailable; background disabled");
            return Ok(());
        };

        let store: Box<dyn KeyValueStore> = match window.local_storage() {
            Ok(Some(storage)) => Box::new(dom::LocalStore::new(storage)),
            _ => {
                log::warn!("localStorage unavailable; preferences will not persist");
                Box::new(MemoryStore::new())
            }
        };
        let defaults = PageDefaults {
            color: dom::theme_color(window, document, THEME_PROPERTY)
                .map(|text| Color::parse_or(&text, FALLBACK_COLOR))
                .unwrap_or(FALLBACK_COLOR),
            reduced_motion: dom::prefers_reduced_motion(window),
        };

        let scene = document
            .get_element_by_id(SCENE_ID)
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
        let detector = scene.as_ref().map(|el| {
            let timers = Rc::new(dom::WindowTimers::new(window.clone()));
            let probe = Rc::new(dom::ElementProbe::new(el.clone().into()));
            Rc::new(SizePoll::new(timers, probe)) as Rc<dyn ReadinessDetector>
        });
        let stage = dom::DomStage {
            canvas: canvas.clone().into(),
            scene,
            watermark: document.get_element_by_id(WATERMARK_ID),
            toggle: document.get_element_by_id(TOGGLE_ID),
        };

        let frame_cell = Rc::new(RefCell::new(None));
        let backdrop = Backdrop::init(Parts {
            store,
            defaults,
            surface: Box::new(surface),
            frames: Box::new(render::RafFrames::new(window.clone(), frame_cell.clone())),
            stage: Box::new(stage),
            detector,
            scene_supported: dom::scene_registered(window, SCENE_TAG),
            viewport: dom::viewport(window)?,
        });
        let shared = Shared::new(backdrop);
        render::install_frame_callback(&frame_cell, shared.downgrade());

        events::wire(window, document, &shared)?;
        shared.arbitrate();
        dom::on_scene_defined(window, SCENE_TAG, shared.downgrade());

        MOUNTED.with(|m| *m.borrow_mut() = Some(shared));
        Ok(())
    }
}
