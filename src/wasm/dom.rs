//! Browser-backed implementations of the controller's seams.

use js_sys::Function;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlElement, Storage, Window};

use crate::backdrop::{Stage, Viewport, WeakShared};
use crate::readiness::{SizeProbe, TimerId, Timers};
use crate::settings::KeyValueStore;

const SCENE_LOADED: &str = "scene-loaded";
const SCENE_DISABLED: &str = "scene-disabled";
const SCENE_ERROR: &str = "scene-error";
const SCENE_STAGED: &str = "scene-staged";
const CANVAS_DISABLED: &str = "backdrop-disabled";
const HIDDEN: &str = "hidden";

pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::warn!("could not persist {key}: {:?}", e);
        }
    }

    fn remove(&mut self, key: &str) {
        self.storage.remove_item(key).ok();
    }
}

/// Show/hide classes and inline display on the page's backend elements.
pub struct DomStage {
    pub canvas: HtmlElement,
    pub scene: Option<HtmlElement>,
    pub watermark: Option<Element>,
    pub toggle: Option<Element>,
}

fn set_display(el: &HtmlElement, shown: bool) {
    el.style()
        .set_property("display", if shown { "block" } else { "none" })
        .ok();
}

impl Stage for DomStage {
    fn show_scene(&mut self) {
        let Some(scene) = &self.scene else {
            return;
        };
        let classes = scene.class_list();
        classes.remove_3(SCENE_DISABLED, SCENE_ERROR, SCENE_STAGED).ok();
        classes.add_1(SCENE_LOADED).ok();
        scene.style().remove_property("visibility").ok();
        set_display(scene, true);
        set_display(&self.canvas, false);
        if let Some(block) = &self.watermark {
            block.class_list().remove_1(HIDDEN).ok();
        }
    }

    fn show_fallback(&mut self, surface_visible: bool) {
        if let Some(scene) = &self.scene {
            let classes = scene.class_list();
            classes.add_1(SCENE_DISABLED).ok();
            classes.remove_2(SCENE_LOADED, SCENE_STAGED).ok();
            scene.style().remove_property("visibility").ok();
            set_display(scene, false);
        }
        if let Some(block) = &self.watermark {
            block.class_list().add_1(HIDDEN).ok();
        }
        set_display(&self.canvas, surface_visible);
        self.canvas
            .class_list()
            .toggle_with_force(CANVAS_DISABLED, !surface_visible)
            .ok();
    }

    fn stage_scene(&mut self) {
        let Some(scene) = &self.scene else {
            return;
        };
        // laid out so its client size is measurable, but not painted
        let classes = scene.class_list();
        classes.remove_1(SCENE_DISABLED).ok();
        classes.add_1(SCENE_STAGED).ok();
        scene.style().set_property("visibility", "hidden").ok();
        set_display(scene, true);
    }

    fn mark_scene_failed(&mut self) {
        if let Some(scene) = &self.scene {
            scene.class_list().add_1(SCENE_ERROR).ok();
        }
    }

    fn reflect_enabled(&mut self, enabled: bool) {
        if let Some(toggle) = &self.toggle {
            toggle
                .set_attribute("aria-pressed", if enabled { "true" } else { "false" })
                .ok();
        }
    }

    fn fit_scene(&mut self, width: f64, height: f64) {
        if let Some(scene) = &self.scene {
            let style = scene.style();
            style.set_property("width", &format!("{width}px")).ok();
            style.set_property("height", &format!("{height}px")).ok();
        }
    }
}

pub struct ElementProbe {
    element: Element,
}

impl ElementProbe {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl SizeProbe for ElementProbe {
    fn rendered_size(&self) -> Option<(f64, f64)> {
        if !self.element.is_connected() {
            return None;
        }
        Some((
            self.element.client_width() as f64,
            self.element.client_height() as f64,
        ))
    }
}

/// [`Timers`] over `setInterval`/`setTimeout`. Callback closures are handed
/// to the JS garbage collector.
pub struct WindowTimers {
    window: Window,
}

impl WindowTimers {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timers for WindowTimers {
    fn every(&self, ms: u32, tick: Box<dyn FnMut()>) -> TimerId {
        let cb = Closure::wrap(tick).into_js_value();
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref::<Function>(), ms as i32);
        TimerId(id.unwrap_or_else(|e| {
            log::warn!("setInterval failed: {:?}", e);
            -1
        }))
    }

    fn after(&self, ms: u32, fire: Box<dyn FnOnce()>) -> TimerId {
        let cb = Closure::once_into_js(fire);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref::<Function>(), ms as i32);
        TimerId(id.unwrap_or_else(|e| {
            log::warn!("setTimeout failed: {:?}", e);
            -1
        }))
    }

    fn clear(&self, id: TimerId) {
        // timeouts and intervals share one id pool
        self.window.clear_timeout_with_handle(id.0);
    }
}

pub fn viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window.inner_width()?.as_f64().ok_or("innerWidth is not a number")?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or("innerHeight is not a number")?;
    let scale = match window.device_pixel_ratio() {
        r if r > 0.0 => r,
        _ => 1.0,
    };
    Ok(Viewport {
        width,
        height,
        scale,
    })
}

/// Read once at startup; later changes to the preference are not tracked.
pub fn prefers_reduced_motion(window: &Window) -> bool {
    matches!(
        window.match_media("(prefers-reduced-motion: reduce)"),
        Ok(Some(query)) if query.matches()
    )
}

/// Raw value of a custom property on the root element, if set.
pub fn theme_color(window: &Window, document: &Document, property: &str) -> Option<String> {
    let root = document.document_element()?;
    let style = window.get_computed_style(&root).ok().flatten()?;
    let value = style.get_property_value(property).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn scene_registered(window: &Window, tag: &str) -> bool {
    !window.custom_elements().get(tag).is_undefined()
}

/// Re-arbitrate once the scene's custom element gets registered, unless it
/// already was.
pub fn on_scene_defined(window: &Window, tag: &str, backdrop: WeakShared) {
    if scene_registered(window, tag) {
        return;
    }
    let promise = match window.custom_elements().when_defined(tag) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("whenDefined({tag}) rejected: {:?}", e);
            return;
        }
    };
    let tag = tag.to_string();
    spawn_local(async move {
        if JsFuture::from(promise).await.is_ok() {
            log::info!("<{tag}> registered");
            if let Some(shared) = backdrop.upgrade() {
                shared.scene_defined();
            }
        }
    });
}
