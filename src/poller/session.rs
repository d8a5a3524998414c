//! Live-mode session: whether refreshing is on, and whether the one-shot
//! "start monitoring" call has been made for the current activation.

/// One-shot guard for the start-monitoring call.
///
/// Moves `Armed → Fired` on the inactive→active edge and back to `Armed`
/// only when live mode is switched off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartGuard {
    #[default]
    Armed,
    Fired,
}

/// Result of asking a session to go live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Live mode was already on; nothing changed.
    AlreadyActive,
    /// Live mode switched on. `fire_start` is true when the start-monitoring
    /// call must be made for this edge.
    Activated { fire_start: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSession {
    active: bool,
    guard: StartGuard,
}

impl LiveSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn monitoring_started(&self) -> bool {
        self.guard == StartGuard::Fired
    }

    pub fn guard(&self) -> StartGuard {
        self.guard
    }

    /// Switch live mode on. Consumes the guard if it is armed.
    pub fn activate(&mut self) -> Activation {
        if self.active {
            return Activation::AlreadyActive;
        }
        self.active = true;
        let fire_start = self.guard == StartGuard::Armed;
        self.guard = StartGuard::Fired;
        Activation::Activated { fire_start }
    }

    /// Switch live mode off and re-arm the guard. Returns whether the
    /// session was active.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.guard = StartGuard::Armed;
        was_active
    }
}
