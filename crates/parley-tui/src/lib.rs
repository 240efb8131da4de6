//! Terminal chat over TCP
//!
//! A thin shell over [`parley_app::Driver`] that provides the production
//! I/O: a TCP [`ConnectionManager`], a crossterm [`CrosstermScreen`] and the
//! [`TerminalDriver`] that multiplexes them. All orchestration logic lives in
//! the generic [`parley_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod screen;
pub mod terminal;
pub mod transport;

pub use config::{Args, ChatConfig};
pub use parley_app::{AppEvent, Driver, ExitStatus, Role, Runtime};
pub use screen::CrosstermScreen;
pub use terminal::{TerminalDriver, TerminalError};
pub use transport::{ConnectionManager, NetEvent, TransportError};
