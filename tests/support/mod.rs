//! Host-side fakes for the controller's seams.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use backdrop_wasm::curve::{Paint, PathSeg, Stroke, Surface};
use backdrop_wasm::frame_loop::{FrameHandle, FrameScheduler};
use backdrop_wasm::readiness::{OutcomeCallback, ReadinessDetector, SizeProbe, TimerId, Timers};
use backdrop_wasm::Stage;

enum Callback {
    Repeat(Box<dyn FnMut()>),
    Once(Box<dyn FnOnce()>),
}

struct Entry {
    id: i32,
    due: u64,
    period: u64,
    callback: Option<Callback>,
}

/// Timers on a virtual clock that only moves in [`ManualTimers::advance_to`].
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<u64>,
    next_id: Cell<i32>,
    entries: RefCell<Vec<Entry>>,
}

impl ManualTimers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Fire everything due up to `target` in (due time, registration) order.
    pub fn advance_to(&self, target: u64) {
        loop {
            let next = self
                .entries
                .borrow()
                .iter()
                .filter(|e| e.due <= target && e.callback.is_some())
                .min_by_key(|e| (e.due, e.id))
                .map(|e| (e.id, e.due));
            let Some((id, due)) = next else {
                break;
            };
            self.now.set(due);
            let callback = self
                .entries
                .borrow_mut()
                .iter_mut()
                .find(|e| e.id == id)
                .and_then(|e| e.callback.take());
            match callback {
                Some(Callback::Repeat(mut tick)) => {
                    tick();
                    let mut entries = self.entries.borrow_mut();
                    if let Some(e) = entries.iter_mut().find(|e| e.id == id) {
                        e.due += e.period;
                        e.callback = Some(Callback::Repeat(tick));
                    }
                }
                Some(Callback::Once(fire)) => {
                    self.entries.borrow_mut().retain(|e| e.id != id);
                    fire();
                }
                None => {}
            }
        }
        self.now.set(target);
    }

    fn push(&self, ms: u32, callback: Callback) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.entries.borrow_mut().push(Entry {
            id,
            due: self.now.get() + u64::from(ms),
            period: u64::from(ms.max(1)),
            callback: Some(callback),
        });
        TimerId(id)
    }
}

impl Timers for ManualTimers {
    fn every(&self, ms: u32, tick: Box<dyn FnMut()>) -> TimerId {
        self.push(ms, Callback::Repeat(tick))
    }

    fn after(&self, ms: u32, fire: Box<dyn FnOnce()>) -> TimerId {
        self.push(ms, Callback::Once(fire))
    }

    fn clear(&self, id: TimerId) {
        self.entries.borrow_mut().retain(|e| e.id != id.0);
    }
}

/// Element whose size the test sets directly. `None` means detached.
pub struct Probe(Cell<Option<(f64, f64)>>);

impl Probe {
    pub fn hidden() -> Rc<Self> {
        Rc::new(Self(Cell::new(Some((0.0, 0.0)))))
    }

    pub fn set(&self, size: Option<(f64, f64)>) {
        self.0.set(size);
    }

    /// Make the element visible once `clock` reaches `at_ms`.
    pub fn appear_at(self: &Rc<Self>, clock: &ManualTimers, at_ms: u32) {
        let probe = self.clone();
        clock.after(at_ms, Box::new(move || probe.set(Some((800.0, 600.0)))));
    }
}

impl SizeProbe for Probe {
    fn rendered_size(&self) -> Option<(f64, f64)> {
        self.0.get()
    }
}

/// Detector that only counts watch requests and never answers.
#[derive(Default)]
pub struct CountingDetector {
    pub watches: Cell<usize>,
}

impl ReadinessDetector for CountingDetector {
    fn watch(&self, _on_outcome: OutcomeCallback) {
        self.watches.set(self.watches.get() + 1);
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub clears: usize,
    pub strokes: Vec<(Vec<PathSeg>, Stroke)>,
    pub glows: usize,
    pub size: Option<(f64, f64, f64)>,
}

pub struct RecordingSurface(pub Rc<RefCell<SurfaceLog>>);

impl Surface for RecordingSurface {
    fn resize(&mut self, width: f64, height: f64, scale: f64) {
        self.0.borrow_mut().size = Some((width, height, scale));
    }

    fn clear(&mut self, _: f64, _: f64) {
        self.0.borrow_mut().clears += 1;
    }

    fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, paint: Paint) {
        if let Paint::Radial { .. } = paint {
            self.0.borrow_mut().glows += 1;
        }
    }

    fn stroke_path(&mut self, path: &[PathSeg], stroke: Stroke) {
        self.0.borrow_mut().strokes.push((path.to_vec(), stroke));
    }
}

#[derive(Debug, Default)]
pub struct FramesLog {
    next: i32,
    pub pending: Option<i32>,
    pub requested: usize,
    pub cancelled: usize,
}

pub struct ManualFrames(pub Rc<RefCell<FramesLog>>);

impl FrameScheduler for ManualFrames {
    fn request(&mut self) -> Option<FrameHandle> {
        let mut log = self.0.borrow_mut();
        log.next += 1;
        log.requested += 1;
        log.pending = Some(log.next);
        Some(FrameHandle(log.next))
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut log = self.0.borrow_mut();
        if log.pending == Some(handle.0) {
            log.pending = None;
        }
        log.cancelled += 1;
    }
}

#[derive(Debug, Default)]
pub struct StageLog {
    pub scene_visible: bool,
    pub surface_visible: bool,
    pub scene_failed: bool,
    /// Laid out for measuring but not shown.
    pub scene_staged: bool,
    pub pressed: Option<bool>,
    pub scene_size: Option<(f64, f64)>,
}

pub struct RecordingStage(pub Rc<RefCell<StageLog>>);

impl Stage for RecordingStage {
    fn show_scene(&mut self) {
        let mut log = self.0.borrow_mut();
        log.scene_visible = true;
        log.scene_staged = false;
        log.surface_visible = false;
    }

    fn show_fallback(&mut self, surface_visible: bool) {
        let mut log = self.0.borrow_mut();
        log.scene_visible = false;
        log.scene_staged = false;
        log.surface_visible = surface_visible;
    }

    fn stage_scene(&mut self) {
        self.0.borrow_mut().scene_staged = true;
    }

    fn mark_scene_failed(&mut self) {
        self.0.borrow_mut().scene_failed = true;
    }

    fn reflect_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().pressed = Some(enabled);
    }

    fn fit_scene(&mut self, width: f64, height: f64) {
        self.0.borrow_mut().scene_size = Some((width, height));
    }
}

/// Stage whose 3-D element only has a size while it is laid out, the way a
/// `display: none` element measures zero in a browser.
pub struct LayoutStage {
    pub inner: RecordingStage,
    pub probe: Rc<Probe>,
}

const RENDERED: (f64, f64) = (800.0, 600.0);

impl Stage for LayoutStage {
    fn show_scene(&mut self) {
        self.inner.show_scene();
        self.probe.set(Some(RENDERED));
    }

    fn show_fallback(&mut self, surface_visible: bool) {
        self.inner.show_fallback(surface_visible);
        self.probe.set(Some((0.0, 0.0)));
    }

    fn stage_scene(&mut self) {
        self.inner.stage_scene();
        self.probe.set(Some(RENDERED));
    }

    fn mark_scene_failed(&mut self) {
        self.inner.mark_scene_failed();
    }

    fn reflect_enabled(&mut self, enabled: bool) {
        self.inner.reflect_enabled(enabled);
    }
}
