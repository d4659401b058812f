//! Async session runtime
//!
//! A worker task owns the [`Session`] and is the only thing that touches
//! it. Player commands arrive over a channel, the clock advances on a fixed
//! frame interval, and both are handled one at a time. Renderers watch
//! snapshots; report text is broadcast as it arrives.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};

use crate::haptics::HapticsDriver;
use crate::report::ReportGenerator;
use crate::settings::{ReportSettings, Settings};
use crate::sim::{CommandError, GameEvent, PlayerCommand, Session, Snapshot};

const COMMAND_CAPACITY: usize = 64;
const REPORT_CAPACITY: usize = 16;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Messages accepted by the session worker
pub enum Command {
    Player {
        command: PlayerCommand,
        reply: oneshot::Sender<std::result::Result<Vec<GameEvent>, CommandError>>,
    },
    Shutdown,
}

/// Cloneable handle for input layers and renderers
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Snapshot>,
    report_tx: broadcast::Sender<String>,
}

impl SessionHandle {
    /// Send a player command and wait for the events it produced
    pub async fn send(&self, command: PlayerCommand) -> Result<Vec<GameEvent>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Player {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        let events = reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)??;
        Ok(events)
    }

    pub async fn move_player(&self, dx: i32, dy: i32) -> Result<Vec<GameEvent>> {
        self.send(PlayerCommand::Move { dx, dy }).await
    }

    pub async fn enter_or_exit(&self) -> Result<Vec<GameEvent>> {
        self.send(PlayerCommand::EnterOrExit).await
    }

    pub async fn defuse_selected_bomb(&self) -> Result<Vec<GameEvent>> {
        self.send(PlayerCommand::DefuseSelectedBomb).await
    }

    pub async fn detonate_selected_bomb(&self) -> Result<Vec<GameEvent>> {
        self.send(PlayerCommand::DetonateSelectedBomb).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every state change
    pub fn watch_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Reports produced after detonations
    pub fn subscribe_reports(&self) -> broadcast::Receiver<String> {
        self.report_tx.subscribe()
    }
}

/// Owns the worker task. Dropping it aborts the worker.
pub struct SessionRuntime {
    handle: SessionHandle,
    worker: Option<JoinHandle<Snapshot>>,
}

impl SessionRuntime {
    pub fn spawn(
        session: Session,
        reporter: Arc<dyn ReportGenerator>,
        haptics: HapticsDriver,
        settings: &Settings,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (report_tx, _) = broadcast::channel(REPORT_CAPACITY);

        let worker = SessionWorker {
            published: session.revision(),
            session,
            command_rx,
            snapshot_tx,
            report_tx: report_tx.clone(),
            reporter,
            report: settings.report.clone(),
            haptics,
            frame: Duration::from_millis(settings.frame_ms.max(1)),
            reports: JoinSet::new(),
        };
        let worker = tokio::spawn(worker.run());

        Self {
            handle: SessionHandle {
                command_tx,
                snapshot_rx,
                report_tx,
            },
            worker: Some(worker),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stop the worker, cancel its timers and pending reports, and return
    /// the final state
    pub async fn shutdown(mut self) -> Result<Snapshot> {
        let Some(worker) = self.worker.take() else {
            return Ok(self.handle.snapshot());
        };
        if self.handle.command_tx.send(Command::Shutdown).await.is_err() {
            log::debug!("Session worker already stopped");
        }
        worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

struct SessionWorker {
    session: Session,
    command_rx: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<Snapshot>,
    published: u64,
    report_tx: broadcast::Sender<String>,
    reporter: Arc<dyn ReportGenerator>,
    report: ReportSettings,
    haptics: HapticsDriver,
    frame: Duration,
    reports: JoinSet<()>,
}

impl SessionWorker {
    async fn run(mut self) -> Snapshot {
        let started = Instant::now();
        let mut frame = tokio::time::interval(self.frame);
        frame.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Player { command, reply }) => {
                        // Fire anything already due before the command lands
                        self.catch_up(started);
                        let result = self.session.apply(command);
                        if let Ok(events) = &result {
                            self.dispatch(events);
                        }
                        self.publish();
                        if reply.send(result).is_err() {
                            log::debug!("Command reply channel closed (caller dropped)");
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = frame.tick() => {
                    self.catch_up(started);
                    self.publish();
                }
            }

            while self.reports.try_join_next().is_some() {}
        }

        self.session.shutdown();
        self.reports.abort_all();
        self.session.snapshot()
    }

    /// Advance the session clock to wall time
    fn catch_up(&mut self, started: Instant) {
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let dt = elapsed.saturating_sub(self.session.now_ms());
        if dt > 0 {
            let events = self.session.advance(dt);
            self.dispatch(&events);
        }
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        self.haptics.dispatch(events);

        if !self.report.enabled {
            return;
        }
        for event in events {
            if let GameEvent::BombDetonated { bomb, .. } = event {
                log::debug!("Requesting report for bomb {}", bomb);
                let reporter = Arc::clone(&self.reporter);
                let report_tx = self.report_tx.clone();
                let request = self.report.request();
                self.reports.spawn(async move {
                    let text = reporter.generate_report(request).await;
                    // Nobody listening is fine
                    let _ = report_tx.send(text);
                });
            }
        }
    }

    fn publish(&mut self) {
        if self.session.revision() == self.published {
            return;
        }
        self.published = self.session.revision();
        self.snapshot_tx.send_replace(self.session.snapshot());
    }
}
