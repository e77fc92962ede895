//! Start/stop bookkeeping for the per-frame animation loop.

/// Opaque id of a scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// The host's per-frame scheduling primitive. The host calls back into the
/// owner of the [`RenderLoop`] when a requested frame fires.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame; `None` if the host refused.
    fn request(&mut self) -> Option<FrameHandle>;
    fn cancel(&mut self, handle: FrameHandle);
}

pub struct RenderLoop {
    scheduler: Box<dyn FrameScheduler>,
    running: bool,
    pending: Option<FrameHandle>,
}

impl RenderLoop {
    pub fn new(scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            scheduler,
            running: false,
            pending: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// No-op while already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.arm();
    }

    /// Cancel the pending frame. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// A scheduled frame fired. Returns whether the cycle should run; when it
    /// does, the next frame has already been requested (if the host refuses,
    /// this frame still runs and the loop stops after it).
    pub fn on_frame(&mut self) -> bool {
        self.pending = None;
        if !self.running {
            return false;
        }
        self.arm();
        true
    }

    fn arm(&mut self) {
        self.pending = self.scheduler.request();
        if self.pending.is_none() {
            log::warn!("frame request refused; animation stopped");
            self.running = false;
        }
    }
}
