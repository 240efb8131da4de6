//! Application layer for Parley
//!
//! Pure state machines and a generic runtime for one-to-one terminal chat,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: session state machine (connection lifecycle, input decisions)
//! - [`Renderer`]: message log, prompt bar and input line over a [`Screen`]
//! - [`wrap`]: direction-aware line wrapping
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod cursor;
mod driver;
mod event;
mod input;
mod message;
mod renderer;
mod runtime;
mod screen;
mod state;
pub mod wrap;

pub use action::AppAction;
pub use app::App;
pub use cursor::{Cursor, Surface};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{EditOutcome, KeyInput, LineEditor};
pub use message::{Level, Message, MessageLog, Origin};
pub use renderer::{BAR_BLOCK, BAR_TIP, INDICATOR, Renderer};
pub use runtime::Runtime;
pub use screen::{Screen, Style};
pub use state::{CloseReason, ConnectionState, DEFAULT_PORT, ExitStatus, Role};
pub use wrap::{Row, Side, wrap};
