use std::path::PathBuf;
use std::thread;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use anyhow::Result;
use shared::types::Button;
use crate::config::Config;

/// In-memory runtime flags mirrored from and persisted to the config file.
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub maintenance: bool,
    pub cache_cleared: Option<DateTime<Utc>>,
}

/// Outcome of a maintenance change. The in-memory flag always changes; the
/// write-back to disk may independently fail and is reported, not fatal.
#[derive(Debug)]
pub struct MaintenanceUpdate {
    pub maintenance: bool,
    pub persist_error: Option<String>,
}

/// Commands sent to the state thread
enum StateCommand {
    Buttons(oneshot::Sender<Vec<Button>>),
    Runtime(oneshot::Sender<RuntimeState>),
    SetMaintenance(Option<bool>, oneshot::Sender<MaintenanceUpdate>),
    ClearCache(oneshot::Sender<DateTime<Utc>>),
    Shutdown,
}

/// Handle to the single-writer state thread that owns the config value and
/// its file. All mutation is serialized through this thread, so concurrent
/// requests cannot interleave read-modify-write cycles on the file.
#[derive(Clone)]
pub struct StateHandle {
    tx: mpsc::Sender<StateCommand>,
}

impl StateHandle {
    /// Spawn the state thread. Config file I/O is synchronous, which is why
    /// this is a plain thread fed from async handlers via a channel.
    pub fn spawn(mut config: Config, config_path: PathBuf) -> Self {
        let (tx, mut rx) = mpsc::channel::<StateCommand>(64);

        thread::spawn(move || {
            let mut runtime = RuntimeState {
                maintenance: config.system.maintenance,
                cache_cleared: None,
            };

            while let Some(cmd) = rx.blocking_recv() {
                match cmd {
                    StateCommand::Buttons(reply) => {
                        let _ = reply.send(config.buttons.clone());
                    }
                    StateCommand::Runtime(reply) => {
                        let _ = reply.send(runtime.clone());
                    }
                    StateCommand::SetMaintenance(set, reply) => {
                        let new_state = set.unwrap_or(!runtime.maintenance);
                        runtime.maintenance = new_state;
                        config.system.maintenance = new_state;

                        let persist_error = config
                            .save(&config_path)
                            .err()
                            .map(|e| format!("{:#}", e));
                        if let Some(reason) = &persist_error {
                            tracing::error!("Failed to persist maintenance flag: {}", reason);
                        } else {
                            tracing::info!("Maintenance mode set to {}", new_state);
                        }

                        let _ = reply.send(MaintenanceUpdate {
                            maintenance: new_state,
                            persist_error,
                        });
                    }
                    StateCommand::ClearCache(reply) => {
                        let now = Utc::now();
                        runtime.cache_cleared = Some(now);
                        let _ = reply.send(now);
                    }
                    StateCommand::Shutdown => {
                        tracing::info!("State thread shutting down");
                        break;
                    }
                }
            }
        });

        Self { tx }
    }

    /// Configured buttons, unrendered
    pub async fn buttons(&self) -> Result<Vec<Button>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StateCommand::Buttons(reply)).await?;
        Ok(rx.await?)
    }

    /// Snapshot of the runtime flags
    pub async fn runtime(&self) -> Result<RuntimeState> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StateCommand::Runtime(reply)).await?;
        Ok(rx.await?)
    }

    /// Set the maintenance flag explicitly, or toggle it when `set` is None.
    /// The new value is persisted to the config file.
    pub async fn set_maintenance(&self, set: Option<bool>) -> Result<MaintenanceUpdate> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StateCommand::SetMaintenance(set, reply)).await?;
        Ok(rx.await?)
    }

    /// Record a simulated cache clear, returning its timestamp
    pub async fn clear_cache(&self) -> Result<DateTime<Utc>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StateCommand::ClearCache(reply)).await?;
        Ok(rx.await?)
    }

    /// Shutdown the state thread
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(StateCommand::Shutdown).await?;
        Ok(())
    }
}
