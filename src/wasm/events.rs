//! DOM event wiring: pointer, resize, toggle control and settings panel.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlElement,
    HtmlInputElement, HtmlSelectElement, KeyboardEvent, MouseEvent, PointerEvent, TouchEvent,
    Window,
};

use super::{dom, CLOSE_ID, COLOR_ID, INTENSITY_ID, MODE_ID, PANEL_ID, POINTS_ID, RESET_ID, TOGGLE_ID};
use crate::backdrop::{Shared, WeakShared};
use crate::settings::{parse_intensity, parse_point_count, Mode, Settings, DEFAULT_POINT_COUNT};

/// Register `handler` for `kind` events of type `E` for the page's lifetime.
fn listen<E, F>(target: &EventTarget, kind: &str, passive: bool, mut handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let cb = Closure::wrap(Box::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    }) as Box<dyn FnMut(Event)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        cb.as_ref().unchecked_ref(),
        &options,
    )?;
    cb.forget();
    Ok(())
}

/// Run `f` the first time `kind` fires on `target`.
pub fn once(target: &EventTarget, kind: &str, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let cb = Closure::once_into_js(f);
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        cb.unchecked_ref(),
        &options,
    )
}

/// Borrow the controller for one event, if it is still mounted.
fn with(backdrop: &WeakShared, f: impl FnOnce(&Shared)) {
    if let Some(shared) = backdrop.upgrade() {
        f(&shared);
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn wire(window: &Window, document: &Document, shared: &Shared) -> Result<(), JsValue> {
    let win: &EventTarget = window.as_ref();

    let weak = shared.downgrade();
    listen(win, "pointermove", true, move |e: PointerEvent| {
        with(&weak, |s| {
            s.borrow_mut()
                .pointer_moved(e.client_x() as f64, e.client_y() as f64)
        })
    })?;

    let weak = shared.downgrade();
    listen(win, "touchmove", true, move |e: TouchEvent| {
        if let Some(touch) = e.touches().get(0) {
            with(&weak, |s| {
                s.borrow_mut()
                    .pointer_moved(touch.client_x() as f64, touch.client_y() as f64)
            });
        }
    })?;

    if let Some(root) = document.document_element() {
        let weak = shared.downgrade();
        listen(root.as_ref(), "pointerleave", true, move |_: Event| {
            with(&weak, |s| s.borrow_mut().pointer_left())
        })?;
    }

    let weak = shared.downgrade();
    let resize_window = window.clone();
    listen(win, "resize", false, move |_: Event| match dom::viewport(&resize_window) {
        Ok(viewport) => with(&weak, |s| s.borrow_mut().resize(viewport)),
        Err(e) => log::warn!("could not read viewport: {:?}", e),
    })?;

    let panel = Panel::find(document);
    if let Some(toggle) = document.get_element_by_id(TOGGLE_ID) {
        wire_toggle(&toggle, shared, panel.as_ref().map(|p| p.root.clone()))?;
    }
    match panel {
        Some(panel) => {
            panel.sync(&shared.borrow().settings());
            panel.wire(shared)?;
        }
        None => log::info!("settings panel incomplete or absent; controls not wired"),
    }

    if let Some(select) = by_id::<HtmlSelectElement>(document, MODE_ID) {
        select.set_value(shared.borrow().settings().mode.as_str());
        let weak = shared.downgrade();
        let source = select.clone();
        listen(select.as_ref(), "change", false, move |_: Event| {
            match source.value().parse::<Mode>() {
                Ok(mode) => with(&weak, |s| s.set_mode(mode)),
                Err(e) => log::warn!("{e}"),
            }
        })?;
    }
    Ok(())
}

fn open_panel(panel: &Option<HtmlElement>) {
    if let Some(panel) = panel {
        panel.set_attribute("aria-hidden", "false").ok();
        panel.style().set_property("display", "block").ok();
    }
}

fn close_panel(panel: &HtmlElement) {
    panel.set_attribute("aria-hidden", "true").ok();
    panel.style().set_property("display", "none").ok();
}

/// Click, space and enter flip `enabled`; double click, context menu and `m`
/// open the settings panel.
fn wire_toggle(toggle: &Element, shared: &Shared, panel: Option<HtmlElement>) -> Result<(), JsValue> {
    let target: &EventTarget = toggle.as_ref();

    let weak = shared.downgrade();
    listen(target, "click", false, move |_: MouseEvent| {
        with(&weak, |s| {
            s.borrow_mut().toggle_enabled();
        })
    })?;

    let weak = shared.downgrade();
    let keyed_panel = panel.clone();
    listen(target, "keydown", false, move |e: KeyboardEvent| match e.key().as_str() {
        " " | "Enter" => {
            e.prevent_default();
            with(&weak, |s| {
                s.borrow_mut().toggle_enabled();
            });
        }
        "m" | "M" => open_panel(&keyed_panel),
        _ => {}
    })?;

    let dbl_panel = panel.clone();
    listen(target, "dblclick", false, move |_: MouseEvent| open_panel(&dbl_panel))?;

    listen(target, "contextmenu", false, move |e: MouseEvent| {
        e.prevent_default();
        open_panel(&panel);
    })?;
    Ok(())
}

/// The settings panel and the controls it needs.
struct Panel {
    root: HtmlElement,
    color: HtmlInputElement,
    intensity: HtmlInputElement,
    points: HtmlSelectElement,
    reset: Option<Element>,
    close: Option<Element>,
}

impl Panel {
    fn find(document: &Document) -> Option<Self> {
        Some(Self {
            root: by_id(document, PANEL_ID)?,
            color: by_id(document, COLOR_ID)?,
            intensity: by_id(document, INTENSITY_ID)?,
            points: by_id(document, POINTS_ID)?,
            reset: document.get_element_by_id(RESET_ID),
            close: document.get_element_by_id(CLOSE_ID),
        })
    }

    fn sync(&self, settings: &Settings) {
        self.color.set_value(&settings.color.to_hex());
        self.intensity.set_value(&settings.intensity.to_string());
        self.points.set_value(&settings.point_count.to_string());
    }

    fn wire(self, shared: &Shared) -> Result<(), JsValue> {
        let weak = shared.downgrade();
        let color = self.color.clone();
        listen(self.color.as_ref(), "input", false, move |_: Event| {
            with(&weak, |s| {
                s.borrow_mut().set_color_text(&color.value());
            })
        })?;

        let weak = shared.downgrade();
        let intensity = self.intensity.clone();
        listen(self.intensity.as_ref(), "input", false, move |_: Event| {
            if let Some(value) = parse_intensity(&intensity.value()) {
                with(&weak, |s| {
                    s.borrow_mut().set_intensity(value);
                });
            }
        })?;

        let weak = shared.downgrade();
        let points = self.points.clone();
        listen(self.points.as_ref(), "change", false, move |_: Event| {
            let count = parse_point_count(&points.value()).unwrap_or(DEFAULT_POINT_COUNT);
            with(&weak, |s| {
                s.borrow_mut().set_point_count(count);
            });
        })?;

        if let Some(close) = &self.close {
            let root = self.root.clone();
            listen(close.as_ref(), "click", false, move |_: MouseEvent| close_panel(&root))?;
        }

        if let Some(reset) = self.reset.clone() {
            let weak = shared.downgrade();
            listen(reset.as_ref(), "click", false, move |_: MouseEvent| {
                with(&weak, |s| {
                    let settings = s.borrow_mut().reset_settings();
                    self.sync(&settings);
                })
            })?;
        }
        Ok(())
    }
}
