//! Frame scheduling and the tokio-driven session loop.
//!
//! [`FrameLoop`] owns a [`GameClient`] and multiplexes four sources in a single
//! task: the shutdown signal, inbound server frames, host input events and the
//! next frame deadline. Everything runs on that one task, so messages and input
//! are always applied between frames, never during one.

use crate::game::{ClientState, GameClient};
use crate::input::InputEvent;
use crate::network::{Inbound, Transport};
use crate::surface::DrawSurface;
use log::{debug, info};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

/// Tracks frame starts against a fixed per-frame budget.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    budget: Duration,
    last_frame_start: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            last_frame_start: None,
        }
    }

    /// Marks the start of a frame and returns the milliseconds since the
    /// previous one. The first frame reports zero.
    pub fn begin_frame(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last_frame_start
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_frame_start = Some(now);
        elapsed.as_secs_f32() * 1000.0
    }

    /// Delay before the next frame, given how long this one took.
    pub fn remaining_budget(&self, work: Duration) -> Duration {
        self.budget.saturating_sub(work)
    }
}

/// Detects a server that has gone quiet.
#[derive(Debug, Clone)]
pub struct ServerWatchdog {
    timeout: Option<Duration>,
    last_heard: Instant,
}

impl ServerWatchdog {
    pub fn new(timeout: Option<Duration>, now: Instant) -> Self {
        Self {
            timeout: timeout.filter(|t| !t.is_zero()),
            last_heard: now,
        }
    }

    pub fn heard(&mut self, now: Instant) {
        self.last_heard = now;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| self.last_heard + timeout)
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline().map_or(false, |deadline| now >= deadline)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    Disconnected { reason: String },
    Shutdown,
}

/// Everything a finished loop hands back to its caller.
pub struct SessionOutcome<T: Transport, S: DrawSurface> {
    pub client: GameClient<T>,
    pub surface: S,
    pub end: SessionEnd,
}

pub struct FrameLoop<T: Transport, S: DrawSurface> {
    client: GameClient<T>,
    surface: S,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    input: mpsc::UnboundedReceiver<InputEvent>,
    shutdown: watch::Receiver<bool>,
    scheduler: FrameScheduler,
    watchdog: ServerWatchdog,
}

impl<T: Transport, S: DrawSurface> FrameLoop<T, S> {
    pub fn new(
        client: GameClient<T>,
        surface: S,
        inbound: mpsc::UnboundedReceiver<Inbound>,
        input: mpsc::UnboundedReceiver<InputEvent>,
        shutdown: watch::Receiver<bool>,
        frame_budget: Duration,
        server_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            surface,
            inbound,
            input,
            shutdown,
            scheduler: FrameScheduler::new(frame_budget),
            watchdog: ServerWatchdog::new(server_timeout, Instant::now()),
        }
    }

    /// Runs until the client disconnects or shutdown is signalled.
    pub async fn run(mut self) -> SessionOutcome<T, S> {
        self.client.start();
        self.watchdog.heard(Instant::now());
        let mut next_frame = Instant::now();

        let end = loop {
            if let ClientState::Disconnected { reason } = self.client.state() {
                break SessionEnd::Disconnected {
                    reason: reason.clone(),
                };
            }

            let stall_deadline = self.watchdog.deadline();

            tokio::select! {
                biased;

                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown requested, leaving the frame loop");
                        break SessionEnd::Shutdown;
                    }
                }

                event = self.inbound.recv() => {
                    apply_inbound(&mut self.client, &mut self.watchdog, event);
                }

                Some(event) = self.input.recv() => {
                    self.client.handle_input(event);
                }

                _ = sleep_until(next_frame) => {
                    let start = Instant::now();
                    let elapsed_ms = self.scheduler.begin_frame(start);
                    self.client.frame(elapsed_ms, &mut self.surface);
                    next_frame = Instant::now() + self.scheduler.remaining_budget(start.elapsed());
                }

                _ = sleep_until_opt(stall_deadline) => {
                    if self.watchdog.expired(Instant::now()) {
                        self.client.handle_server_timeout();
                    }
                }
            }
        };

        debug!("Frame loop finished after {} frames", self.client.frame_count());
        SessionOutcome {
            client: self.client,
            surface: self.surface,
            end,
        }
    }
}

/// Applies one event from the connection. `None` means the reader task is gone.
pub fn apply_inbound<T: Transport>(
    client: &mut GameClient<T>,
    watchdog: &mut ServerWatchdog,
    event: Option<Inbound>,
) {
    match event {
        Some(Inbound::Message(text)) => {
            watchdog.heard(Instant::now());
            client.handle_server_text(&text);
        }
        Some(Inbound::Error(e)) => client.handle_transport_error(&e),
        Some(Inbound::Closed) | None => {
            client.disconnect("Connection closed", "Connection to the server was lost.");
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
