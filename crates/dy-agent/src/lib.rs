//! dy-agent: Simulated agent conversations for the Dyad workspace.
//!
//! The agent never calls a model. Each submitted prompt is answered by a
//! scripted two-phase sequence (acknowledge, then complete) whose delays are
//! driven by an injectable [`Scheduler`], so the same state machine runs
//! against a virtual clock in tests and against tokio timers in the CLI.

pub mod conversation;
pub mod driver;
pub mod scheduler;
pub mod script;

pub use conversation::{Conversation, Phase, SubmitError, TranscriptSnapshot};
pub use driver::simulate;
pub use scheduler::{ManualScheduler, Scheduler, Timer, TimerId, TimerPhase, TokioScheduler};
pub use script::SimulatorConfig;
