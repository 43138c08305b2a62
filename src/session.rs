//! Session: single-threaded event loop binding script commands, async image
//! loads and the picker.
//!
//! DESIGN
//! ======
//! Every command is handled synchronously against the [`Picker`]. Image loads
//! are the only asynchronous work: each runs as a spawned task (fetch +
//! decode) that posts its [`Completion`] on an unbounded channel. Starting a
//! new load aborts the previous task, and the surface's ticket check discards
//! any completion that still slips through. Completions are applied between
//! commands and on `await`, which joins the latest task so a panicked load
//! still resolves.
//!
//! ERROR HANDLING
//! ==============
//! Load and URL failures are user-facing outcomes and become reports, never
//! `Err`. Only host failures (report I/O, PNG writes) abort the session.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use picker::engine::{Action, Picker};
use picker::source::{ImageFetcher, validate_image_url};
use picker::surface::{LoadError, LoadTicket, decode_image};
use picker::viewport::ScreenMapping;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::script::Command;

/// A finished load, tagged with the ticket it was started under.
#[derive(Debug)]
pub struct Completion {
    pub ticket: LoadTicket,
    pub result: Result<DynamicImage, LoadError>,
}

/// Host events that do not originate in the picker engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    InvalidUrl { url: String, message: String },
}

/// One JSON line on the report stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Engine(Action),
    Host(HostEvent),
}

pub struct Session<F, W> {
    picker: Picker,
    fetcher: Arc<F>,
    out: W,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: Option<JoinHandle<()>>,
}

impl<F, W> Session<F, W>
where
    F: ImageFetcher + 'static,
    W: Write,
{
    pub fn new(fetcher: F, mapping: ScreenMapping, out: W) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { picker: Picker::new(mapping), fetcher: Arc::new(fetcher), out, tx, rx, in_flight: None }
    }

    #[must_use]
    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    /// Run every command, then wait for the last load to settle.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] if a report or image file cannot be written.
    pub async fn run(&mut self, commands: Vec<Command>) -> Result<(), AppError> {
        for command in commands {
            self.execute(command).await?;
        }
        self.settle().await
    }

    /// Handle one command, applying any load completions that arrived first.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] if a report or image file cannot be written.
    pub async fn execute(&mut self, command: Command) -> Result<(), AppError> {
        self.drain_ready()?;
        match command {
            Command::Load(url) => self.submit_url(&url)?,
            Command::Await => self.settle().await?,
            Command::Pick => {
                let actions = self.picker.toggle_pick_mode();
                self.emit_actions(actions)?;
            }
            Command::Move(client) => {
                let actions = self.picker.on_pointer_move(client);
                self.emit_actions(actions)?;
            }
            Command::Leave => {
                let actions = self.picker.on_pointer_leave();
                self.emit_actions(actions)?;
            }
            Command::Click(client) => {
                let actions = self.picker.on_click(client);
                self.emit_actions(actions)?;
            }
            Command::Frame => {
                self.picker.render_frame();
            }
            Command::Snapshot(path) => self.snapshot(&path)?,
            Command::SaveSurface(path) => {
                self.picker.surface().pixels().save(&path)?;
                info!(path = %path.display(), "surface written");
            }
        }
        Ok(())
    }

    // --- Loading ---

    fn submit_url(&mut self, url: &str) -> Result<(), AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(());
        }
        if let Err(e) = validate_image_url(url) {
            warn!(url, "rejected image URL");
            return self.emit(&Report::Host(HostEvent::InvalidUrl { url: url.to_string(), message: e.to_string() }));
        }
        self.start_load(url);
        Ok(())
    }

    fn start_load(&mut self, url: &str) {
        let ticket = self.picker.begin_load(url);
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = match fetcher.fetch(ticket.url()).await {
                Ok(bytes) => decode_image(&bytes),
                Err(e) => Err(e),
            };
            if tx.send(Completion { ticket, result }).is_err() {
                debug!("session closed before load completed");
            }
        }));
    }

    /// Apply completions already waiting on the channel.
    fn drain_ready(&mut self) -> Result<(), AppError> {
        while let Ok(completion) = self.rx.try_recv() {
            self.complete(completion)?;
        }
        Ok(())
    }

    /// Wait until no load is pending on the surface.
    ///
    /// Joins the latest load task. A task that panics settles as a failed load.
    async fn settle(&mut self) -> Result<(), AppError> {
        self.drain_ready()?;
        while let Some(ticket) = self.picker.surface().pending().cloned() {
            let Some(handle) = self.in_flight.take() else {
                break;
            };
            match handle.await {
                Ok(()) => self.drain_ready()?,
                Err(e) => {
                    warn!(url = ticket.url(), error = %e, "image load task failed");
                    let result = Err(LoadError::Fetch(format!("load task failed: {e}")));
                    self.complete(Completion { ticket, result })?;
                }
            }
        }
        Ok(())
    }

    fn complete(&mut self, completion: Completion) -> Result<(), AppError> {
        let actions = self.picker.finish_load(&completion.ticket, completion.result);
        self.emit_actions(actions)
    }

    // --- Output ---

    fn snapshot(&self, path: &Path) -> Result<(), AppError> {
        match self.picker.overlay().frame() {
            Some(frame) => {
                frame.save(path)?;
                info!(path = %path.display(), "magnifier snapshot written");
            }
            None => debug!(path = %path.display(), "magnifier hidden, snapshot skipped"),
        }
        Ok(())
    }

    fn emit_actions(&mut self, actions: Vec<Action>) -> Result<(), AppError> {
        for action in actions {
            if action == Action::RenderNeeded {
                continue;
            }
            self.emit(&Report::Engine(action))?;
        }
        Ok(())
    }

    fn emit(&mut self, report: &Report) -> Result<(), AppError> {
        serde_json::to_writer(&mut self.out, report)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
