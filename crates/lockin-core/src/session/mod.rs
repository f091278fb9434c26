mod config;
mod machine;
mod monitor;

pub use config::{ChecklistItem, SessionConfig};
pub use machine::{SessionCounters, SessionMachine, SessionSnapshot, SessionState};
pub(crate) use machine::focus_pct as machine_focus_pct;
pub use monitor::{Debounce, FocusMonitor, FocusSignal};
