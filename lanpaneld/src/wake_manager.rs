use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use shared::types::WakeJobStatus;
use crate::config::WakeConfig;
use crate::net::probe::Probe;
use crate::net::wol::{send_wake, MacAddr, WakeError};

pub type JobId = u64;

/// How many finished jobs stay queryable. The registry is bounded so an
/// unauthenticated confirm endpoint cannot grow memory without limit on a
/// long-lived daemon: once more terminal jobs than this accumulate, the
/// oldest are dropped. Running jobs are never evicted.
const MAX_COMPLETED_JOBS: usize = 16;

#[derive(Default)]
struct JobRegistry {
    jobs: HashMap<JobId, watch::Receiver<WakeJobStatus>>,
    /// Terminal job ids in completion order, oldest first
    completed: VecDeque<JobId>,
}

impl JobRegistry {
    fn record_terminal(&mut self, id: JobId) {
        self.completed.push_back(id);
        while self.completed.len() > MAX_COMPLETED_JOBS {
            if let Some(evicted) = self.completed.pop_front() {
                self.jobs.remove(&evicted);
            }
        }
    }
}

/// Sends wake signals and tracks background confirmation jobs. The signal is
/// always sent synchronously; the polling that confirms the chain of
/// dependent targets runs off the request context and is observed through
/// `job_status`.
#[derive(Clone)]
pub struct WakeManager {
    prober: Arc<dyn Probe>,
    mac: MacAddr,
    config: Arc<WakeConfig>,
    cancel: CancellationToken,
    jobs: Arc<RwLock<JobRegistry>>,
    next_id: Arc<AtomicU64>,
}

impl WakeManager {
    pub fn new(
        prober: Arc<dyn Probe>,
        mac: MacAddr,
        config: Arc<WakeConfig>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            prober,
            mac,
            config,
            cancel,
            jobs: Arc::new(RwLock::new(JobRegistry::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Fire-and-forget variant: send the wake signal and return.
    pub async fn wake(&self) -> Result<(), WakeError> {
        send_wake(&self.mac, &self.config.broadcast).await
    }

    /// Send the wake signal, then start a background job that polls the
    /// configured targets in order until all are reachable. A signal failure
    /// propagates immediately and no polling is attempted.
    pub async fn wake_and_confirm(&self) -> Result<JobId, WakeError> {
        self.wake().await?;

        let (status_tx, status_rx) = watch::channel(WakeJobStatus::Signaled);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.jobs.write().await.jobs.insert(id, status_rx);

        let prober = Arc::clone(&self.prober);
        let config = Arc::clone(&self.config);
        let cancel = self.cancel.clone();
        let jobs = Arc::clone(&self.jobs);

        tokio::spawn(async move {
            let interval = Duration::from_secs(config.poll_interval_secs);
            let deadline = config
                .max_wait_secs
                .map(|secs| Instant::now() + Duration::from_secs(secs));

            let terminal = poll_plan(
                prober.as_ref(),
                &config.poll_targets,
                interval,
                deadline,
                &cancel,
                &status_tx,
            )
            .await;

            tracing::info!("Wake job {} finished: {:?}", id, terminal);
            let is_terminal = terminal.is_terminal();
            let _ = status_tx.send(terminal);
            if is_terminal {
                jobs.write().await.record_terminal(id);
            }
        });

        Ok(id)
    }

    /// Current status of a confirmation job, or None for unknown or
    /// long-since-evicted ids.
    pub async fn job_status(&self, id: JobId) -> Option<WakeJobStatus> {
        self.jobs
            .read()
            .await
            .jobs
            .get(&id)
            .map(|rx| rx.borrow().clone())
    }
}

/// Poll the plan's targets strictly in order: target i+1 is never probed
/// before target i reports reachable. Each miss publishes progress, then
/// waits out the interval unless cancelled. Without a deadline the loop
/// polls indefinitely; an empty plan is trivially done.
pub async fn poll_plan<P: Probe + ?Sized>(
    prober: &P,
    plan: &[String],
    interval: Duration,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
    status_tx: &watch::Sender<WakeJobStatus>,
) -> WakeJobStatus {
    for target in plan {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if prober.is_online(target).await {
                break;
            }

            tracing::info!(
                "Waiting for {} to come online (attempt {})",
                target,
                attempts
            );
            let _ = status_tx.send(WakeJobStatus::Waiting {
                target: target.clone(),
                attempts,
            });

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return WakeJobStatus::TimedOut;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => return WakeJobStatus::Cancelled,
            }
        }
    }

    WakeJobStatus::Done
}
