//! # Lock-In Core Library
//!
//! This library provides the core business logic for Lock-In, a
//! distraction-guarded focus-session tool. All operations are available via
//! a standalone CLI binary, with the HTTP API server being a thin JSON layer
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Session Machine**: A tick-driven state machine that requires the
//!   caller to invoke `tick()` once per second for counter updates
//! - **Focus Monitor**: Classifies visibility/fullscreen transitions into
//!   debounced violations and owns the focused/unfocused flag
//! - **Exit Guard**: Decides whether a termination request is approved --
//!   chat collaborator first, deterministic local heuristic on any failure
//! - **Collaborators**: Chat-completion and PDF-extraction services consumed
//!   behind fixed contracts; failures always degrade to local behavior
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: Core session state machine
//! - [`ExitGuard`]: Guarded-exit evaluation flow
//! - [`RoastGenerator`]: Focus-loss messages with canned fallbacks
//! - [`StudyAssistant`]: Q&A over session and PDF context
//! - [`Config`]: Application configuration management

pub mod assistant;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod llm;
pub mod pdf;
pub mod roast;
pub mod session;

pub use assistant::{contextual_answer, define, Definition, SessionContext, StudyAssistant};
pub use config::Config;
pub use error::{ConfigError, CoreError, LlmError, PdfError, ValidationError};
pub use events::Event;
pub use guard::{evaluate_session, EvaluationInput, ExitEvaluation, ExitGuard};
pub use llm::LlmClient;
pub use pdf::PdfContext;
pub use roast::{RoastContext, RoastGenerator};
pub use session::{
    ChecklistItem, SessionConfig, SessionCounters, SessionMachine, SessionSnapshot, SessionState,
};
