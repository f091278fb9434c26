use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every session transition produces an Event.
/// Drivers (CLI, server) render them; tests assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        goal: String,
        target_minutes: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// Tab hidden during an active, unpaused session; counted after debounce.
    FocusLost {
        violations: u32,
        at: DateTime<Utc>,
    },
    /// User locked back in after a focus loss.
    FocusRegained {
        at: DateTime<Utc>,
    },
    /// Fullscreen exited while the page stayed visible. Not a violation.
    FullscreenExited {
        at: DateTime<Utc>,
    },
    /// The exit guard rejected a termination request; the session continues.
    EndDenied {
        session_id: Uuid,
        feedback: String,
        at: DateTime<Utc>,
    },
    SessionEnded {
        session_id: Uuid,
        elapsed_secs: u64,
        focused_secs: u64,
        violations: u32,
        at: DateTime<Utc>,
    },
}
