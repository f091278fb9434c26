//! Focus monitor -- classifies visibility and fullscreen transitions.
//!
//! The monitor owns the focus flag and the violation debounce. It never
//! touches wall-clock time itself: callers pass `now` explicitly, so the
//! debounce window is testable without sleeping.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of feeding one browser-level signal into the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSignal {
    /// Counted focus loss. The caller surfaces an interrupt and may request
    /// a roast message.
    Violation,
    /// Focus loss within the debounce window -- coalesced into the previous
    /// violation. Anti-spam, not a bug.
    Debounced,
    /// Fullscreen exited while the page stayed visible. Warn, do not count.
    FullscreenExited,
    /// Nothing to report.
    Ignored,
}

/// Timestamp-window debounce. Fires at most once per window; the window is
/// measured from the last *fired* event, so rapid re-triggers coalesce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debounce {
    window_ms: i64,
    last: Option<DateTime<Utc>>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: window.num_milliseconds(),
            last: None,
        }
    }

    /// Returns true (and records `now`) when the window has elapsed since the
    /// last fired event.
    pub fn should_fire(&mut self, now: DateTime<Utc>) -> bool {
        let elapsed = match self.last {
            Some(last) => (now - last).num_milliseconds(),
            None => return self.fire(now),
        };
        if elapsed > self.window_ms {
            self.fire(now)
        } else {
            false
        }
    }

    fn fire(&mut self, now: DateTime<Utc>) -> bool {
        self.last = Some(now);
        true
    }
}

/// Tracks page visibility, fullscreen presence, and manual pause, and derives
/// the single focused/unfocused flag from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusMonitor {
    focused: bool,
    visible: bool,
    fullscreen: bool,
    paused: bool,
    debounce: Debounce,
}

impl FocusMonitor {
    /// A fresh session starts focused, visible, and in fullscreen.
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            focused: true,
            visible: true,
            fullscreen: true,
            paused: false,
            debounce: Debounce::new(debounce_window),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Page visibility flipped. Hiding the page during an unpaused session is
    /// a violation, subject to the debounce window. Becoming visible again
    /// does not restore focus -- the user must lock back in.
    pub fn visibility_changed(&mut self, visible: bool, now: DateTime<Utc>) -> FocusSignal {
        self.visible = visible;
        if visible {
            return FocusSignal::Ignored;
        }
        if self.paused {
            // Manual pause already marked the user unfocused; no violation.
            return FocusSignal::Ignored;
        }
        self.focused = false;
        if self.debounce.should_fire(now) {
            FocusSignal::Violation
        } else {
            FocusSignal::Debounced
        }
    }

    /// Fullscreen-element presence flipped. Leaving fullscreen while the page
    /// stays visible gets a warning interrupt without counting a violation.
    pub fn fullscreen_changed(&mut self, fullscreen: bool) -> FocusSignal {
        self.fullscreen = fullscreen;
        if !fullscreen && self.visible {
            FocusSignal::FullscreenExited
        } else {
            FocusSignal::Ignored
        }
    }

    /// Manual pause forces unfocused without counting a violation.
    pub fn pause(&mut self) {
        self.paused = true;
        self.focused = false;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.focused = true;
    }

    /// User chose to lock back in after a focus loss.
    pub fn lock_back_in(&mut self) {
        self.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn monitor() -> FocusMonitor {
        FocusMonitor::new(Duration::seconds(2))
    }

    #[test]
    fn hidden_page_is_a_violation() {
        let mut m = monitor();
        assert_eq!(m.visibility_changed(false, t(0)), FocusSignal::Violation);
        assert!(!m.is_focused());
    }

    #[test]
    fn rapid_toggles_coalesce_into_one_violation() {
        let mut m = monitor();
        assert_eq!(m.visibility_changed(false, t(0)), FocusSignal::Violation);
        m.visibility_changed(true, t(200));
        assert_eq!(m.visibility_changed(false, t(500)), FocusSignal::Debounced);
    }

    #[test]
    fn violations_separated_by_more_than_the_window_both_count() {
        let mut m = monitor();
        assert_eq!(m.visibility_changed(false, t(0)), FocusSignal::Violation);
        m.visibility_changed(true, t(1000));
        assert_eq!(m.visibility_changed(false, t(3000)), FocusSignal::Violation);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let mut m = monitor();
        assert_eq!(m.visibility_changed(false, t(0)), FocusSignal::Violation);
        assert_eq!(m.visibility_changed(false, t(2000)), FocusSignal::Debounced);
        assert_eq!(m.visibility_changed(false, t(4001)), FocusSignal::Violation);
    }

    #[test]
    fn becoming_visible_does_not_restore_focus() {
        let mut m = monitor();
        m.visibility_changed(false, t(0));
        assert_eq!(m.visibility_changed(true, t(100)), FocusSignal::Ignored);
        assert!(!m.is_focused());
        m.lock_back_in();
        assert!(m.is_focused());
    }

    #[test]
    fn fullscreen_exit_warns_without_counting() {
        let mut m = monitor();
        assert_eq!(m.fullscreen_changed(false), FocusSignal::FullscreenExited);
        // Focus flag untouched by fullscreen alone.
        assert!(m.is_focused());
    }

    #[test]
    fn fullscreen_exit_while_hidden_is_ignored() {
        let mut m = monitor();
        m.visibility_changed(false, t(0));
        assert_eq!(m.fullscreen_changed(false), FocusSignal::Ignored);
    }

    #[test]
    fn pause_suppresses_violations() {
        let mut m = monitor();
        m.pause();
        assert!(!m.is_focused());
        assert_eq!(m.visibility_changed(false, t(0)), FocusSignal::Ignored);
        m.resume();
        assert!(m.is_focused());
    }
}
