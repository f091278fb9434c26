//! Session state machine.
//!
//! The machine is a tick-driven value type -- no internal threads. The
//! driver calls `tick()` once per second of wall time and feeds
//! visibility/fullscreen signals as they arrive.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v (resolve_end with an allowing evaluation)
//!         Idle
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::SessionConfig;
use super::monitor::{FocusMonitor, FocusSignal};
use crate::events::Event;
use crate::guard::ExitEvaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

/// Running counters owned exclusively by the active session.
///
/// Invariant: `focused_secs <= elapsed_secs`; all three fields are monotonic
/// for the lifetime of the session and zeroed when a new one starts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionCounters {
    pub elapsed_secs: u64,
    pub focused_secs: u64,
    pub violations: u32,
}

/// Immutable view of the session handed to the exit guard. Carries the
/// session id so a stale in-flight evaluation cannot end a session the user
/// has already restarted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub goal: String,
    pub target_minutes: u32,
    pub elapsed_secs: u64,
    pub focused_secs: u64,
    pub violations: u32,
    pub checklist_complete: bool,
}

impl SessionSnapshot {
    /// Focused seconds over elapsed seconds, rounded to whole percent.
    /// 100 when nothing has elapsed yet.
    pub fn focus_pct(&self) -> u32 {
        focus_pct(self.focused_secs, self.elapsed_secs)
    }
}

pub(crate) fn focus_pct(focused_secs: u64, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 100;
    }
    ((focused_secs as f64 / elapsed_secs as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone)]
struct ActiveSession {
    id: Uuid,
    config: SessionConfig,
    counters: SessionCounters,
    monitor: FocusMonitor,
}

/// The session machine. One instance per controller; at most one session is
/// active at a time.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    debounce_window: Duration,
    session: Option<ActiveSession>,
}

impl SessionMachine {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            debounce_window,
            session: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn counters(&self) -> Option<SessionCounters> {
        self.session.as_ref().map(|s| s.counters)
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|s| SessionSnapshot {
            session_id: s.id,
            goal: s.config.goal.clone(),
            target_minutes: s.config.target_minutes,
            elapsed_secs: s.counters.elapsed_secs,
            focused_secs: s.counters.focused_secs,
            violations: s.counters.violations,
            checklist_complete: s.config.checklist_complete(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session from validated configuration. Counters reset to zero.
    /// Returns None if a session is already active.
    pub fn start(&mut self, config: SessionConfig) -> Option<Event> {
        if self.is_active() {
            return None;
        }
        let id = Uuid::new_v4();
        let goal = config.goal.clone();
        let target_minutes = config.target_minutes;
        self.session = Some(ActiveSession {
            id,
            config,
            counters: SessionCounters::default(),
            monitor: FocusMonitor::new(self.debounce_window),
        });
        self.state = SessionState::Running;
        Some(Event::SessionStarted {
            session_id: id,
            goal,
            target_minutes,
            at: Utc::now(),
        })
    }

    /// Advance one second of wall time. Suspended entirely outside Running;
    /// focused time advances only while the focus flag is set.
    pub fn tick(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.counters.elapsed_secs += 1;
            if session.monitor.is_focused() {
                session.counters.focused_secs += 1;
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        let session = self.session.as_mut()?;
        session.monitor.pause();
        self.state = SessionState::Paused;
        Some(Event::SessionPaused {
            elapsed_secs: session.counters.elapsed_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != SessionState::Paused {
            return None;
        }
        let session = self.session.as_mut()?;
        session.monitor.resume();
        self.state = SessionState::Running;
        Some(Event::SessionResumed {
            elapsed_secs: session.counters.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Page visibility flipped. Counted violations produce `FocusLost`.
    pub fn visibility_changed(&mut self, visible: bool, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let session = self.session.as_mut()?;
        match session.monitor.visibility_changed(visible, now) {
            FocusSignal::Violation => {
                session.counters.violations += 1;
                Some(Event::FocusLost {
                    violations: session.counters.violations,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Fullscreen-element presence flipped.
    pub fn fullscreen_changed(&mut self, fullscreen: bool) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let session = self.session.as_mut()?;
        match session.monitor.fullscreen_changed(fullscreen) {
            FocusSignal::FullscreenExited => Some(Event::FullscreenExited { at: Utc::now() }),
            _ => None,
        }
    }

    /// User locked back in after a focus loss.
    pub fn lock_back_in(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        let session = self.session.as_mut()?;
        session.monitor.lock_back_in();
        Some(Event::FocusRegained { at: Utc::now() })
    }

    pub fn set_checklist_item(&mut self, id: &str, completed: bool) -> bool {
        match self.session.as_mut() {
            Some(session) => session.config.set_item_completed(id, completed),
            None => false,
        }
    }

    /// Begin a guarded exit: hand the caller a snapshot to evaluate against.
    pub fn request_end(&self) -> Option<SessionSnapshot> {
        if !self.is_active() {
            return None;
        }
        self.snapshot()
    }

    /// Apply the outcome of an exit evaluation. Only an allowing evaluation
    /// for the *current* session ends it; a stale session id is ignored so an
    /// abandoned in-flight evaluation cannot resurface.
    pub fn resolve_end(&mut self, session_id: Uuid, evaluation: &ExitEvaluation) -> Option<Event> {
        let session = self.session.as_ref()?;
        if session.id != session_id {
            return None;
        }
        if !evaluation.allow {
            return Some(Event::EndDenied {
                session_id,
                feedback: evaluation.feedback.clone(),
                at: Utc::now(),
            });
        }
        self.end_current()
    }

    /// End the session unconditionally ("end anyway"). The guarded path is
    /// `request_end` + `resolve_end`.
    pub fn force_end(&mut self) -> Option<Event> {
        self.end_current()
    }

    fn end_current(&mut self) -> Option<Event> {
        let session = self.session.take()?;
        self.state = SessionState::Idle;
        Some(Event::SessionEnded {
            session_id: session.id,
            elapsed_secs: session.counters.elapsed_secs,
            focused_secs: session.counters.focused_secs,
            violations: session.counters.violations,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::ExitEvaluation;

    fn machine_with_session() -> SessionMachine {
        let mut machine = SessionMachine::new(Duration::seconds(2));
        let config = SessionConfig::new("read chapter 4", 25, vec![]).unwrap();
        assert!(machine.start(config).is_some());
        machine
    }

    fn allow_eval() -> ExitEvaluation {
        ExitEvaluation {
            allow: true,
            feedback: "done".to_string(),
            roast: String::new(),
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut machine = machine_with_session();
        assert_eq!(machine.state(), SessionState::Running);

        assert!(machine.pause().is_some());
        assert_eq!(machine.state(), SessionState::Paused);

        assert!(machine.resume().is_some());
        assert_eq!(machine.state(), SessionState::Running);
    }

    #[test]
    fn second_start_is_rejected_while_active() {
        let mut machine = machine_with_session();
        let config = SessionConfig::new("another", 10, vec![]).unwrap();
        assert!(machine.start(config).is_none());
    }

    #[test]
    fn tick_advances_both_counters_while_focused() {
        let mut machine = machine_with_session();
        for _ in 0..5 {
            machine.tick();
        }
        let counters = machine.counters().unwrap();
        assert_eq!(counters.elapsed_secs, 5);
        assert_eq!(counters.focused_secs, 5);
    }

    #[test]
    fn tick_is_suspended_while_paused() {
        let mut machine = machine_with_session();
        machine.tick();
        machine.pause();
        for _ in 0..10 {
            machine.tick();
        }
        let counters = machine.counters().unwrap();
        assert_eq!(counters.elapsed_secs, 1);
    }

    #[test]
    fn unfocused_ticks_advance_elapsed_only() {
        let mut machine = machine_with_session();
        machine.tick();
        machine.visibility_changed(false, Utc::now());
        machine.tick();
        machine.tick();
        let counters = machine.counters().unwrap();
        assert_eq!(counters.elapsed_secs, 3);
        assert_eq!(counters.focused_secs, 1);
        assert_eq!(counters.violations, 1);
    }

    #[test]
    fn focus_pct_is_100_before_first_tick() {
        let machine = machine_with_session();
        assert_eq!(machine.snapshot().unwrap().focus_pct(), 100);
    }

    #[test]
    fn denied_evaluation_keeps_the_session_running() {
        let mut machine = machine_with_session();
        let snap = machine.request_end().unwrap();
        let eval = ExitEvaluation {
            allow: false,
            feedback: "not yet".to_string(),
            roast: "keep going".to_string(),
        };
        match machine.resolve_end(snap.session_id, &eval) {
            Some(Event::EndDenied { .. }) => {}
            other => panic!("expected EndDenied, got {other:?}"),
        }
        assert!(machine.is_active());
    }

    #[test]
    fn allowed_evaluation_ends_the_session() {
        let mut machine = machine_with_session();
        let snap = machine.request_end().unwrap();
        match machine.resolve_end(snap.session_id, &allow_eval()) {
            Some(Event::SessionEnded { .. }) => {}
            other => panic!("expected SessionEnded, got {other:?}"),
        }
        assert_eq!(machine.state(), SessionState::Idle);
        assert!(machine.snapshot().is_none());
    }

    #[test]
    fn stale_evaluation_does_not_end_a_restarted_session() {
        let mut machine = machine_with_session();
        let stale = machine.request_end().unwrap();

        // User abandons the evaluation and restarts.
        machine.force_end();
        let config = SessionConfig::new("fresh start", 25, vec![]).unwrap();
        machine.start(config).unwrap();

        assert!(machine.resolve_end(stale.session_id, &allow_eval()).is_none());
        assert!(machine.is_active());
    }

    #[test]
    fn signals_are_ignored_when_idle() {
        let mut machine = SessionMachine::new(Duration::seconds(2));
        assert!(machine.visibility_changed(false, Utc::now()).is_none());
        assert!(machine.fullscreen_changed(false).is_none());
        assert!(machine.pause().is_none());
        assert!(machine.request_end().is_none());
    }
}
