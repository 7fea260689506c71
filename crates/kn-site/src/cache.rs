//! Snapshot cache actor.
//!
//! One owner task holds the current [`Snapshot`] and is its only writer.
//! Handles talk to it over a bounded channel; every request carries a
//! oneshot reply. Refreshes run on the owner task itself, so requests
//! queued behind a refresh are answered only after the new snapshot is
//! published. Readers never see a partially built tree.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kn_config::RefreshConfig;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::snapshot::{LoadError, Snapshot, SnapshotSource};

/// Maximum number of requests waiting for the owner task.
pub const INBOX_CAPACITY: usize = 32;

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Cache error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The first load failed, so there is nothing to serve.
    #[error("Initial content load failed: {0}")]
    InitialLoad(#[source] LoadError),
    /// An explicit refresh failed; the previous snapshot is still served.
    #[error("Content refresh failed: {0}")]
    Refresh(#[source] LoadError),
    /// The owner task has shut down.
    #[error("Snapshot cache is closed")]
    Closed,
}

/// When the owner task rescans its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
    interval: Option<Duration>,
}

impl RefreshPolicy {
    /// Load once and never refresh.
    #[must_use]
    pub fn frozen() -> Self {
        Self { interval: None }
    }

    /// Refresh every `period`.
    #[must_use]
    pub fn every(period: Duration) -> Self {
        Self {
            interval: Some(period),
        }
    }

    /// Policy described by the `refresh` config section.
    #[must_use]
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self {
            interval: config.interval(),
        }
    }

    /// Whether refreshing is disabled.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.interval.is_none()
    }

    /// Refresh period, if any.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

enum Command {
    Get(oneshot::Sender<Arc<Snapshot>>),
    Refresh(oneshot::Sender<Result<Arc<Snapshot>, LoadError>>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the snapshot owner task.
///
/// Cheap to clone. The owner stops after [`shutdown`](Self::shutdown) or
/// once every handle is dropped.
#[derive(Clone, Debug)]
pub struct SnapshotCache {
    sender: mpsc::Sender<Command>,
    frozen: bool,
}

impl SnapshotCache {
    /// Load the first snapshot and spawn the owner task.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InitialLoad`] if the first load fails.
    pub async fn start<S: SnapshotSource>(
        source: S,
        policy: RefreshPolicy,
    ) -> Result<Self, CacheError> {
        let source = Arc::new(source);
        let start = Instant::now();

        let mut initial = load_blocking(&source)
            .await
            .map_err(CacheError::InitialLoad)?;
        initial.generation = 1;
        tracing::info!(
            entries = initial.root.iter().map(|f| f.entries.len()).sum::<usize>(),
            frozen = policy.is_frozen(),
            elapsed_ms = elapsed_ms(start),
            "Content loaded"
        );

        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let owner = Owner {
            source,
            current: Arc::new(initial),
            inbox,
        };
        tokio::spawn(owner.run(policy));

        Ok(Self {
            sender,
            frozen: policy.is_frozen(),
        })
    }

    /// Current snapshot.
    ///
    /// Waits while a refresh is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Closed`] after shutdown.
    pub async fn get(&self) -> Result<Arc<Snapshot>, CacheError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Get(reply)).await?;
        response.await.map_err(|_| CacheError::Closed)
    }

    /// Rescan the source now and return the resulting snapshot.
    ///
    /// In frozen mode this returns the current snapshot without rescanning.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Refresh`] if the rescan fails (the previous
    /// snapshot stays current) or [`CacheError::Closed`] after shutdown.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CacheError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Refresh(reply)).await?;
        response
            .await
            .map_err(|_| CacheError::Closed)?
            .map_err(CacheError::Refresh)
    }

    /// Stop the owner task.
    ///
    /// Requests already queued are answered before the task exits; later
    /// requests fail with [`CacheError::Closed`].
    pub async fn shutdown(&self) {
        let (reply, done) = oneshot::channel();
        if self.sender.send(Command::Shutdown(reply)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Whether this cache never refreshes.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    async fn send(&self, command: Command) -> Result<(), CacheError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| CacheError::Closed)
    }
}

struct Owner<S> {
    source: Arc<S>,
    current: Arc<Snapshot>,
    inbox: mpsc::Receiver<Command>,
}

impl<S: SnapshotSource> Owner<S> {
    async fn run(mut self, policy: RefreshPolicy) {
        let mut ticker = policy.interval().map(|period| {
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(Command::Get(reply)) => {
                        let _ = reply.send(Arc::clone(&self.current));
                    }
                    Some(Command::Refresh(reply)) => {
                        let result = if policy.is_frozen() {
                            Ok(Arc::clone(&self.current))
                        } else {
                            self.refresh().await
                        };
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown(reply)) => {
                        self.drain();
                        let _ = reply.send(());
                        break;
                    }
                    None => break,
                },
                () = next_tick(ticker.as_mut()) => {
                    // Failure is already logged and the old snapshot kept.
                    let _ = self.refresh().await;
                }
            }
        }

        tracing::debug!(generation = self.current.generation, "Snapshot cache stopped");
    }

    async fn refresh(&mut self) -> Result<Arc<Snapshot>, LoadError> {
        let start = Instant::now();
        match load_blocking(&self.source).await {
            Ok(mut snapshot) => {
                snapshot.generation = self.current.generation + 1;
                self.current = Arc::new(snapshot);
                tracing::info!(
                    generation = self.current.generation,
                    elapsed_ms = elapsed_ms(start),
                    "Content refreshed"
                );
                Ok(Arc::clone(&self.current))
            }
            Err(e) => {
                tracing::error!(
                    generation = self.current.generation,
                    error = %e,
                    "Content refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Answer everything already queued without rescanning.
    fn drain(&mut self) {
        self.inbox.close();
        while let Ok(command) = self.inbox.try_recv() {
            match command {
                Command::Get(reply) => {
                    let _ = reply.send(Arc::clone(&self.current));
                }
                Command::Refresh(reply) => {
                    let _ = reply.send(Ok(Arc::clone(&self.current)));
                }
                Command::Shutdown(reply) => {
                    let _ = reply.send(());
                }
            }
        }
    }
}

/// Wait for the next refresh tick, or forever when frozen.
async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn load_blocking<S: SnapshotSource>(source: &Arc<S>) -> Result<Snapshot, LoadError> {
    let source = Arc::clone(source);
    tokio::task::spawn_blocking(move || source.load())
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
}
