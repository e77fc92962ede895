#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use backdrop_wasm::curve::{self, Look, Surface};
use backdrop_wasm::field::{PointField, Pointer};
use backdrop_wasm::readiness::{ReadinessDetector, ReadinessOutcome, SizePoll, SizeProbe};
use backdrop_wasm::settings::{MemoryStore, PageDefaults, SettingsStore, KEY_COLOR, KEY_POINT_COUNT};
use backdrop_wasm::{CanvasSurface, Color, DomStage, ElementProbe, LocalStore, Stage, WindowTimers};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn sized_div(width: &str, height: &str) -> web_sys::HtmlElement {
    let div: web_sys::HtmlElement = document().create_element("div").unwrap().dyn_into().unwrap();
    let style = div.style();
    style.set_property("width", width).unwrap();
    style.set_property("height", height).unwrap();
    div
}

async fn outcome_of(detector: &dyn ReadinessDetector) -> Option<ReadinessOutcome> {
    let outcome = Rc::new(Cell::new(None));
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let out = outcome.clone();
        detector.watch(Box::new(move |o| {
            out.set(Some(o));
            resolve.call0(&JsValue::NULL).ok();
        }));
    });
    JsFuture::from(promise).await.unwrap();
    outcome.get()
}

#[wasm_bindgen_test]
fn local_storage_backs_settings() {
    let storage = web_sys::window().unwrap().local_storage().unwrap().unwrap();
    storage.set_item(KEY_COLOR, "#102030").unwrap();
    storage.set_item(KEY_POINT_COUNT, "8").unwrap();

    let defaults = PageDefaults {
        color: Color::new(0, 0, 0),
        reduced_motion: false,
    };
    let mut store = SettingsStore::load(Box::new(LocalStore::new(storage.clone())), defaults);
    assert_eq!(store.get().color, Color::new(0x10, 0x20, 0x30));
    assert_eq!(store.get().point_count, 8);

    store.reset();
    assert_eq!(storage.get_item(KEY_COLOR).unwrap(), None);
    assert_eq!(storage.get_item(KEY_POINT_COUNT).unwrap(), None);

    let fresh = SettingsStore::load(Box::new(MemoryStore::new()), defaults);
    assert_eq!(fresh.get().point_count, 6);
}

#[wasm_bindgen_test]
fn canvas_surface_sizes_backing_store_and_draws() {
    let canvas: web_sys::HtmlCanvasElement =
        document().create_element("canvas").unwrap().dyn_into().unwrap();
    let mut surface = CanvasSurface::new(&canvas).unwrap().expect("2d context");
    surface.resize(300.5, 200.0, 2.0);
    assert_eq!(canvas.width(), 601);
    assert_eq!(canvas.height(), 400);

    let mut field = PointField::new();
    field.initialize(300.5, 200.0, 6);
    let points = field.step(Some(Pointer::new(10.0, 10.0)), 300.5, 200.0);
    let look = Look {
        color: Color::new(0, 156, 191),
        intensity: 1.0,
    };
    curve::draw(&mut surface, 300.5, 200.0, points, Some(Pointer::new(10.0, 10.0)), look);
}

#[wasm_bindgen_test]
fn probe_reports_detached_and_sized() {
    let div = sized_div("40px", "30px");
    let probe = ElementProbe::new(div.clone().into());
    assert_eq!(probe.rendered_size(), None);

    document().body().unwrap().append_child(&div).unwrap();
    assert_eq!(probe.rendered_size(), Some((40.0, 30.0)));
    div.remove();
}

#[wasm_bindgen_test]
async fn visible_element_is_ready() {
    let div = sized_div("10px", "10px");
    document().body().unwrap().append_child(&div).unwrap();

    let window = web_sys::window().unwrap();
    let detector = SizePoll::with_timing(
        Rc::new(WindowTimers::new(window)),
        Rc::new(ElementProbe::new(div.clone().into())),
        20,
        2_000,
    );
    assert_eq!(outcome_of(&detector).await, Some(ReadinessOutcome::Ready));
    div.remove();
}

#[wasm_bindgen_test]
async fn hidden_element_times_out() {
    let div = sized_div("10px", "10px");
    div.style().set_property("display", "none").unwrap();
    document().body().unwrap().append_child(&div).unwrap();

    let window = web_sys::window().unwrap();
    let detector = SizePoll::with_timing(
        Rc::new(WindowTimers::new(window)),
        Rc::new(ElementProbe::new(div.clone().into())),
        20,
        150,
    );
    assert_eq!(outcome_of(&detector).await, Some(ReadinessOutcome::TimedOut));
    div.remove();
}

#[wasm_bindgen_test]
fn staged_scene_is_measurable_but_hidden() {
    let body = document().body().unwrap();
    let scene = sized_div("50px", "20px");
    let canvas: web_sys::HtmlElement = document().create_element("canvas").unwrap().dyn_into().unwrap();
    body.append_child(&scene).unwrap();
    body.append_child(&canvas).unwrap();

    let mut stage = DomStage {
        canvas: canvas.clone(),
        scene: Some(scene.clone()),
        watermark: None,
        toggle: None,
    };
    let probe = ElementProbe::new(scene.clone().into());

    stage.show_fallback(true);
    assert_eq!(probe.rendered_size(), Some((0.0, 0.0)));

    stage.stage_scene();
    assert_eq!(probe.rendered_size(), Some((50.0, 20.0)));
    assert_eq!(scene.style().get_property_value("visibility").unwrap(), "hidden");
    assert!(!scene.class_list().contains("scene-disabled"));

    stage.show_scene();
    assert_eq!(scene.style().get_property_value("visibility").unwrap(), "");
    assert!(scene.class_list().contains("scene-loaded"));

    scene.remove();
    canvas.remove();
}
