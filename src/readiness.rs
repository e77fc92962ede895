//! Inferring when an opaque external element has actually rendered.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const POLL_MS: u32 = 250;
pub const TIMEOUT_MS: u32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready,
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// Cancellable host timers. Callbacks never run inside the registering call.
pub trait Timers {
    fn every(&self, ms: u32, tick: Box<dyn FnMut()>) -> TimerId;
    fn after(&self, ms: u32, fire: Box<dyn FnOnce()>) -> TimerId;
    /// Unknown or already-finished ids are ignored.
    fn clear(&self, id: TimerId);
}

/// Rendered size of the watched element, `None` once it left the document.
pub trait SizeProbe {
    fn rendered_size(&self) -> Option<(f64, f64)>;
}

pub type OutcomeCallback = Box<dyn FnOnce(ReadinessOutcome)>;

/// Reports at most one outcome per `watch` call. A watch may also end
/// without any outcome (the element went away).
pub trait ReadinessDetector {
    fn watch(&self, on_outcome: OutcomeCallback);
}

/// Polls the element's size until both sides are positive, racing a
/// single-shot timeout.
pub struct SizePoll {
    timers: Rc<dyn Timers>,
    probe: Rc<dyn SizeProbe>,
    poll_ms: u32,
    timeout_ms: u32,
}

impl SizePoll {
    pub fn new(timers: Rc<dyn Timers>, probe: Rc<dyn SizeProbe>) -> Self {
        Self::with_timing(timers, probe, POLL_MS, TIMEOUT_MS)
    }

    pub fn with_timing(
        timers: Rc<dyn Timers>,
        probe: Rc<dyn SizeProbe>,
        poll_ms: u32,
        timeout_ms: u32,
    ) -> Self {
        Self {
            timers,
            probe,
            poll_ms,
            timeout_ms,
        }
    }
}

impl ReadinessDetector for SizePoll {
    fn watch(&self, on_outcome: OutcomeCallback) {
        let session = Rc::new(Session {
            deliver: RefCell::new(Some(on_outcome)),
            poll: Cell::new(None),
            timeout: Cell::new(None),
            timers: self.timers.clone(),
        });

        let poll = {
            let session = session.clone();
            let probe = self.probe.clone();
            self.timers.every(
                self.poll_ms,
                Box::new(move || match probe.rendered_size() {
                    None => {
                        log::debug!("watched element detached; readiness watch dropped");
                        session.finish(None);
                    }
                    Some((w, h)) if w > 0.0 && h > 0.0 => {
                        session.finish(Some(ReadinessOutcome::Ready))
                    }
                    Some(_) => {}
                }),
            )
        };
        session.poll.set(Some(poll));

        let timeout = {
            let session = session.clone();
            self.timers.after(
                self.timeout_ms,
                Box::new(move || session.finish(Some(ReadinessOutcome::TimedOut))),
            )
        };
        session.timeout.set(Some(timeout));
    }
}

/// Shared between the two racing timers; whoever takes `deliver` first wins.
struct Session {
    deliver: RefCell<Option<OutcomeCallback>>,
    poll: Cell<Option<TimerId>>,
    timeout: Cell<Option<TimerId>>,
    timers: Rc<dyn Timers>,
}

impl Session {
    fn finish(&self, outcome: Option<ReadinessOutcome>) {
        let Some(deliver) = self.deliver.borrow_mut().take() else {
            return;
        };
        for id in [self.poll.take(), self.timeout.take()].into_iter().flatten() {
            self.timers.clear(id);
        }
        if let Some(outcome) = outcome {
            deliver(outcome);
        }
    }
}
