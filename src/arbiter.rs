//! Chooses between the 3-D scene element and the fallback canvas.

use crate::readiness::ReadinessOutcome;
use crate::settings::Mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Scene,
    Fallback,
}

/// What is known about the 3-D element's readiness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneStatus {
    #[default]
    Unknown,
    Watching,
    Ready,
    /// Timed out; not retried.
    Failed,
}

/// Result of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arbitration {
    pub backend: Backend,
    /// A readiness watch should be started now.
    pub begin_watch: bool,
}

impl Arbitration {
    const FALLBACK: Arbitration = Arbitration {
        backend: Backend::Fallback,
        begin_watch: false,
    };
}

#[derive(Debug)]
pub struct ModeArbiter {
    mode: Mode,
    scene_supported: bool,
    scene: SceneStatus,
}

impl ModeArbiter {
    pub fn new(mode: Mode, scene_supported: bool) -> Self {
        Self {
            mode,
            scene_supported,
            scene: SceneStatus::Unknown,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scene_status(&self) -> SceneStatus {
        self.scene
    }

    pub fn set_mode(&mut self, mode: Mode) -> Arbitration {
        self.mode = mode;
        self.evaluate()
    }

    /// The 3-D element was registered after startup.
    pub fn set_scene_supported(&mut self, supported: bool) -> Arbitration {
        self.scene_supported = supported;
        self.evaluate()
    }

    /// The 3-D element must stay laid out, though not shown, so a running
    /// watch can measure it.
    pub fn stages_scene(&self) -> bool {
        self.scene == SceneStatus::Watching && self.wants_scene()
    }

    fn wants_scene(&self) -> bool {
        match self.mode {
            Mode::Canvas => false,
            Mode::Backend3D => true,
            Mode::Auto => self.scene_supported,
        }
    }

    /// Record a watch outcome and re-evaluate the current mode. An outcome
    /// that arrives after the user moved to `Canvas` is kept for later.
    pub fn resolve(&mut self, outcome: ReadinessOutcome) -> Arbitration {
        self.scene = match outcome {
            ReadinessOutcome::Ready => SceneStatus::Ready,
            ReadinessOutcome::TimedOut => SceneStatus::Failed,
        };
        self.evaluate()
    }

    /// Decide the visible backend. Asks for a watch only the first time the
    /// scene is wanted; a running watch is never restarted.
    pub fn evaluate(&mut self) -> Arbitration {
        if !self.wants_scene() {
            return Arbitration::FALLBACK;
        }
        match self.scene {
            SceneStatus::Ready => Arbitration {
                backend: Backend::Scene,
                begin_watch: false,
            },
            SceneStatus::Unknown => {
                self.scene = SceneStatus::Watching;
                Arbitration {
                    backend: Backend::Fallback,
                    begin_watch: true,
                }
            }
            SceneStatus::Watching | SceneStatus::Failed => Arbitration::FALLBACK,
        }
    }
}
