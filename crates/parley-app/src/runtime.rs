//! Generic runtime for application orchestration.
//!
//! The Runtime drives the session event loop, coordinating between:
//! - [`App`]: session state machine
//! - [`Renderer`]: message log and screen
//! - [`Driver`]: platform-specific I/O
//!
//! Each event is handled to completion before the next one is taken: the
//! handler path is synchronous, so no other event can observe the log or the
//! cursor halfway through an update.

use std::collections::VecDeque;

use crate::{
    App, AppAction, AppEvent, Driver, EditOutcome, ExitStatus, Message, Renderer, Role, Screen,
};

/// Generic runtime that orchestrates App, Renderer and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `S`: Terminal screen the renderer draws on
pub struct Runtime<D, S> {
    driver: D,
    app: App,
    renderer: Renderer<S>,
    role: Role,
    notices: Vec<Message>,
    /// Events raised by the runtime itself, handled before the driver's.
    pending: VecDeque<AppEvent>,
}

impl<D, S> Runtime<D, S>
where
    D: Driver,
    S: Screen,
{
    /// Create a new runtime for `role`.
    pub fn new(driver: D, screen: S, role: Role) -> Self {
        Self {
            driver,
            app: App::new(),
            renderer: Renderer::new(screen),
            role,
            notices: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Messages printed before the role starts, such as configuration
    /// warnings.
    #[must_use]
    pub fn with_notices(mut self, notices: Vec<Message>) -> Self {
        self.notices = notices;
        self
    }

    /// Run the session until it exits.
    ///
    /// Draws the initial screen, starts the role, then handles events one
    /// at a time until an exit is decided or the driver runs dry.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver or the terminal fails. Connection
    /// failures are not errors here; they end the session with
    /// [`ExitStatus::Failure`].
    pub async fn run(&mut self) -> Result<ExitStatus, D::Error> {
        self.start().await?;
        let status = loop {
            if let Some(status) = self.step().await? {
                break status;
            }
        };
        self.finish().await?;
        Ok(status)
    }

    /// Draw the initial screen and notices, then start the role.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        self.renderer.full_redraw()?;
        for notice in std::mem::take(&mut self.notices) {
            self.renderer.print_message(notice, false)?;
        }

        tracing::info!(role = %self.role, "starting session");
        let first = self.driver.start(&self.role).await;
        self.pending.push_back(first);
        Ok(())
    }

    /// Handle the next event to completion.
    ///
    /// Returns the exit status once the session is over.
    pub async fn step(&mut self) -> Result<Option<ExitStatus>, D::Error> {
        let event = match self.pending.pop_front() {
            Some(event) => event,
            None => match self.driver.next_event().await? {
                Some(event) => event,
                None => {
                    tracing::info!("event sources exhausted");
                    return Ok(Some(self.app.exit_status().unwrap_or(ExitStatus::Success)));
                },
            },
        };

        let actions = match event {
            AppEvent::Key(key) => match self.renderer.handle_key(key)? {
                EditOutcome::Submitted(line) => {
                    self.renderer.echo_newline()?;
                    self.app.handle(AppEvent::Line(line))
                },
                EditOutcome::Interrupt => self.app.handle(AppEvent::Interrupt),
                EditOutcome::Edited | EditOutcome::Ignored => return Ok(None),
            },
            AppEvent::Resize(columns, rows) => {
                self.renderer.resize(columns, rows);
                self.app.handle(AppEvent::Resize(columns, rows))
            },
            AppEvent::Data(ref bytes) => {
                tracing::trace!(len = bytes.len(), "data");
                self.app.handle(event)
            },
            other => {
                tracing::debug!(event = ?other, "event");
                self.app.handle(other)
            },
        };

        self.execute(actions)
    }

    /// Release the driver and leave the terminal below the prompt.
    pub async fn finish(&mut self) -> Result<(), D::Error> {
        tracing::info!(exit = ?self.app.exit_status(), "session finished");
        self.driver.shutdown().await;
        self.renderer.finish()?;
        Ok(())
    }

    /// Execute actions in order.
    fn execute(&mut self, actions: Vec<AppAction>) -> Result<Option<ExitStatus>, D::Error> {
        for action in actions {
            match action {
                AppAction::Print(message) => self.renderer.print_message(message, false)?,
                AppAction::Redraw => self.renderer.full_redraw()?,
                AppAction::OffsetEcho => self.renderer.offset_echo()?,
                AppAction::Send(bytes) => {
                    if let Err(e) = self.driver.send(bytes) {
                        tracing::warn!("send failed: {e}");
                        self.pending.push_front(AppEvent::Errored { message: e.to_string() });
                    }
                },
                AppAction::Close { graceful } => self.driver.close(graceful),
                AppAction::StopListening => self.driver.stop_listening(),
                AppAction::Exit(status) => return Ok(Some(status)),
            }
        }
        Ok(None)
    }

    /// Session state machine.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Renderer, including the message log.
    pub fn renderer(&self) -> &Renderer<S> {
        &self.renderer
    }

    /// Driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
