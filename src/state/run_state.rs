/// Run state definitions for the crawl lifecycle
///
/// `Idle → Resetting → Running → Draining → Done`, with `Aborted` reachable
/// from `Resetting`, `Running` and `Draining`, and `Cancelled` from `Running`.
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Active States =====
    /// Not started yet
    Idle,

    /// Clearing and recreating the mirror root
    Resetting,

    /// Batch loop in progress
    Running,

    /// The frontier is empty and the last batch is in flight
    Draining,

    // ===== Terminal States =====
    /// Frontier exhausted, mirror complete
    Done,

    /// A fatal reset or persistence failure stopped the run
    Aborted,

    /// Cancellation was requested between batches
    Cancelled,
}

impl RunState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Cancelled)
    }

    /// Returns true only for a run that completed normally
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Resetting)
                | (Resetting, Running)
                | (Resetting, Aborted)
                | (Running, Running)
                | (Running, Draining)
                | (Running, Aborted)
                | (Running, Cancelled)
                | (Draining, Running)
                | (Draining, Done)
                | (Draining, Aborted)
        )
    }

    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resetting => "resetting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
