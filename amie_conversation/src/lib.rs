#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversational practice sessions against the vocabulary store.
//!
//! One [`SessionMachine`] runs both modes; what differs between free chat and
//! the vocabulary drill is carried by a [`ModeProfile`]:
//! - the seeded system prompt and opening turn
//! - whether `[word]` flags are captured into the store
//! - whether the round ends with a rating pass and a memory-log summary
//!
//! Mode changes are typed in-band as slash commands (see [`Command`]).

mod command;
mod console;
mod error;
mod machine;
mod memory_log;
mod mode;
mod session;

pub use command::Command;
pub use console::{Console, StdConsole};
pub use error::SessionError;
pub use machine::{MachineConfig, SessionMachine, Transition};
pub use memory_log::MemoryLog;
pub use mode::{Mode, ModeProfile};
pub use session::ConversationSession;
