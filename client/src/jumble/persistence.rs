use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use shared::shared_jumble_game::UserUpdate;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::services::UserStore;

enum Command {
    Write { update: UserUpdate, revision: u64 },
    Flush(oneshot::Sender<()>),
}

/// Single writer for user-record updates. Writes are sent in the order they
/// were queued; a failed write is logged and dropped, never retried.
#[derive(Debug)]
pub struct Persister {
    commands: mpsc::UnboundedSender<Command>,
    failures: Arc<AtomicU64>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write { revision, .. } => write!(f, "Write(r{})", revision),
            Self::Flush(_) => write!(f, "Flush"),
        }
    }
}

impl Persister {
    pub fn spawn<U: UserStore>(store: Arc<U>, user_id: i64) -> Self {
        let (commands, mut rx) = mpsc::unbounded_channel::<Command>();
        let failures = Arc::new(AtomicU64::new(0));
        let worker_failures = failures.clone();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Write { update, revision } => {
                        if let Err(e) = store.update_user(user_id, &update).await {
                            worker_failures.fetch_add(1, Ordering::SeqCst);
                            warn!("Failed to persist update r{} for user {}: {}", revision, user_id, e);
                        } else {
                            debug!("Persisted update r{} for user {}", revision, user_id);
                        }
                    }
                    Command::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });

        Self { commands, failures }
    }

    pub fn write(&self, update: UserUpdate, revision: u64) {
        if update.is_empty() {
            return;
        }
        if self.commands.send(Command::Write { update, revision }).is_err() {
            warn!("Persistence worker stopped; dropping update r{}", revision);
        }
    }

    /// Resolves once every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(Command::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }
}
