//! Top-level controller tying settings, simulation, rendering and backend
//! arbitration together.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use crate::arbiter::{Arbitration, Backend, ModeArbiter};
use crate::color::Color;
use crate::curve::{self, Look, Surface};
use crate::field::{Point, PointField, Pointer};
use crate::frame_loop::{FrameScheduler, RenderLoop};
use crate::readiness::{ReadinessDetector, ReadinessOutcome};
use crate::settings::{KeyValueStore, Mode, PageDefaults, Setting, Settings, SettingsStore};

/// Page geometry in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio.
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }
}

/// Visibility of the page elements belonging to each backend. Every method
/// must be idempotent.
pub trait Stage {
    /// Show the 3-D element and its watermark block, hide the fallback surface.
    fn show_scene(&mut self);
    /// Hide the 3-D element and its watermark block; the fallback surface is
    /// shown only when `surface_visible`.
    fn show_fallback(&mut self, surface_visible: bool);
    /// Keep the 3-D element laid out at full size but invisible, below the
    /// fallback surface. Called after `show_fallback` while a readiness
    /// watch is measuring the element.
    fn stage_scene(&mut self);
    fn mark_scene_failed(&mut self);
    /// Mirror the enabled flag on the toggle control.
    fn reflect_enabled(&mut self, _enabled: bool) {}
    /// Size the 3-D element to the viewport.
    fn fit_scene(&mut self, _width: f64, _height: f64) {}
}

/// Everything the controller needs from its host.
pub struct Parts {
    pub store: Box<dyn KeyValueStore>,
    pub defaults: PageDefaults,
    pub surface: Box<dyn Surface>,
    pub frames: Box<dyn FrameScheduler>,
    pub stage: Box<dyn Stage>,
    /// `None` when the page has no 3-D element.
    pub detector: Option<Rc<dyn ReadinessDetector>>,
    /// The 3-D element's custom element is registered.
    pub scene_supported: bool,
    pub viewport: Viewport,
}

pub struct Backdrop {
    settings: SettingsStore,
    field: PointField,
    pointer: Option<Pointer>,
    viewport: Viewport,
    frames: RenderLoop,
    arbiter: ModeArbiter,
    backend: Backend,
    surface: Box<dyn Surface>,
    stage: Box<dyn Stage>,
    detector: Option<Rc<dyn ReadinessDetector>>,
}

impl Backdrop {
    /// Load preferences and lay out the point field. Nothing is shown until
    /// the first [`Shared::arbitrate`].
    pub fn init(parts: Parts) -> Self {
        let settings = SettingsStore::load(parts.store, parts.defaults);
        let current = settings.get();
        let mut backdrop = Self {
            settings,
            field: PointField::new(),
            pointer: None,
            viewport: parts.viewport,
            frames: RenderLoop::new(parts.frames),
            arbiter: ModeArbiter::new(current.mode, parts.scene_supported),
            backend: Backend::Fallback,
            surface: parts.surface,
            stage: parts.stage,
            detector: parts.detector,
        };
        backdrop.resize(parts.viewport);
        backdrop.stage.reflect_enabled(current.enabled);
        log::info!(
            "backdrop ready: mode={} enabled={} points={}",
            current.mode,
            current.enabled,
            current.point_count
        );
        backdrop
    }

    /// Stop animating and hide both backends. Preferences stay persisted.
    pub fn teardown(&mut self) {
        self.frames.stop();
        let Viewport { width, height, .. } = self.viewport;
        self.surface.clear(width, height);
        self.stage.show_fallback(false);
        self.backend = Backend::Fallback;
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn arbiter(&self) -> &ModeArbiter {
        &self.arbiter
    }

    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }

    pub fn points(&self) -> &[Point] {
        self.field.points()
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record new geometry and lay the field out again at rest.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.surface
            .resize(viewport.width, viewport.height, viewport.scale);
        self.stage.fit_scene(viewport.width, viewport.height);
        self.relayout();
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = Some(Pointer::new(x, y));
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// One animation frame: simulate, then draw the fully advanced field.
    /// Does nothing if the loop was stopped since the frame was requested.
    pub fn frame(&mut self) {
        if !self.frames.on_frame() {
            return;
        }
        let Viewport { width, height, .. } = self.viewport;
        let current = self.settings.get();
        let points = self.field.step(self.pointer, width, height);
        curve::draw(
            self.surface.as_mut(),
            width,
            height,
            points,
            self.pointer,
            Look {
                color: current.color,
                intensity: current.intensity,
            },
        );
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.set(Setting::Enabled(enabled));
        self.stage.reflect_enabled(enabled);
        if self.backend == Backend::Fallback {
            self.show_fallback();
        }
    }

    /// Flip `enabled`; returns the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = !self.settings.get().enabled;
        self.set_enabled(enabled);
        enabled
    }

    /// Parse color text from the page. Malformed text keeps the current color
    /// and is not persisted.
    pub fn set_color_text(&mut self, text: &str) -> Color {
        match text.parse::<Color>() {
            Ok(color) => self.settings.set(Setting::Color(color)).color,
            Err(err) => {
                log::debug!("{err}; keeping current color");
                self.settings.get().color
            }
        }
    }

    pub fn set_intensity(&mut self, intensity: f64) -> Settings {
        self.settings.set(Setting::Intensity(intensity))
    }

    pub fn set_point_count(&mut self, count: usize) -> Settings {
        let before = self.settings.get().point_count;
        let after = self.settings.set(Setting::PointCount(count));
        if after.point_count != before {
            self.relayout();
        }
        after
    }

    /// Restore color, intensity and point count defaults and lay the field out
    /// again.
    pub fn reset_settings(&mut self) -> Settings {
        let settings = self.settings.reset();
        self.relayout();
        settings
    }

    fn relayout(&mut self) {
        let Viewport { width, height, .. } = self.viewport;
        let count = self.settings.get().point_count;
        self.field.initialize(width, height, count);
    }

    fn show_fallback(&mut self) {
        let enabled = self.settings.get().enabled;
        self.stage.show_fallback(enabled);
        if self.arbiter.stages_scene() {
            self.stage.stage_scene();
        }
        if enabled {
            self.frames.start();
        } else {
            self.frames.stop();
        }
    }

    /// Apply an arbitration. Returns the detector to watch with, if one
    /// should be started.
    fn present(&mut self, arbitration: Arbitration) -> Option<Rc<dyn ReadinessDetector>> {
        log::debug!(
            "mode {} -> {:?}{}",
            self.arbiter.mode(),
            arbitration.backend,
            if arbitration.begin_watch { " (watching scene)" } else { "" }
        );
        self.backend = arbitration.backend;
        match arbitration.backend {
            Backend::Scene => {
                self.frames.stop();
                self.stage.show_scene();
            }
            Backend::Fallback => self.show_fallback(),
        }
        if !arbitration.begin_watch {
            return None;
        }
        if self.detector.is_none() {
            log::info!("no 3-D scene element on this page; staying on the canvas");
        }
        self.detector.clone()
    }

    fn note_outcome(&mut self, outcome: ReadinessOutcome) {
        match outcome {
            ReadinessOutcome::Ready => log::info!("3-D scene is visible"),
            ReadinessOutcome::TimedOut => {
                log::warn!("3-D scene did not become visible within the timeout");
                self.stage.mark_scene_failed();
            }
        }
    }
}

/// Shared handle used by event callbacks. Operations that may start a
/// readiness watch live here so the watch is started outside the borrow.
#[derive(Clone)]
pub struct Shared(Rc<RefCell<Backdrop>>);

impl Shared {
    pub fn new(backdrop: Backdrop) -> Self {
        Self(Rc::new(RefCell::new(backdrop)))
    }

    pub fn downgrade(&self) -> WeakShared {
        WeakShared(Rc::downgrade(&self.0))
    }

    pub fn borrow(&self) -> Ref<'_, Backdrop> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Backdrop> {
        self.0.borrow_mut()
    }

    /// Re-evaluate the current mode and apply the result.
    pub fn arbitrate(&self) {
        self.decide(|arbiter| arbiter.evaluate());
    }

    pub fn set_mode(&self, mode: Mode) {
        self.0.borrow_mut().settings.set(Setting::Mode(mode));
        self.decide(|arbiter| arbiter.set_mode(mode));
    }

    /// The 3-D element's custom element was registered after startup.
    pub fn scene_defined(&self) {
        self.decide(|arbiter| arbiter.set_scene_supported(true));
    }

    fn decide(&self, f: impl FnOnce(&mut ModeArbiter) -> Arbitration) {
        let watch = {
            let mut backdrop = self.0.borrow_mut();
            let arbitration = f(&mut backdrop.arbiter);
            backdrop.present(arbitration)
        };
        if let Some(detector) = watch {
            let weak = self.downgrade();
            detector.watch(Box::new(move |outcome| {
                if let Some(shared) = weak.upgrade() {
                    shared.resolve(outcome);
                }
            }));
        }
    }

    fn resolve(&self, outcome: ReadinessOutcome) {
        self.0.borrow_mut().note_outcome(outcome);
        self.decide(|arbiter| arbiter.resolve(outcome));
    }
}

/// Non-owning [`Shared`], held by host callbacks that must not keep the
/// controller alive.
#[derive(Clone)]
pub struct WeakShared(Weak<RefCell<Backdrop>>);

impl WeakShared {
    pub fn upgrade(&self) -> Option<Shared> {
        self.0.upgrade().map(Shared)
    }
}
