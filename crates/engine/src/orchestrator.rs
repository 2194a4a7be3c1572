// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job orchestration
//!
//! Submissions are validated and recorded synchronously, then handed to a
//! fixed pool of workers over an unbounded queue. Each worker runs one job
//! at a time in its own task, so a panicking executor fails only that job.
//! `abort` cancels those tasks; dropping a task kills its process group and
//! removes its workspace.

use crate::error::{JobError, QueryError, SubmitError};
use crate::executors::{ExecOptions, Executor, ExecutorRegistry};
use crate::normalize::normalize;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::Instrument;
use tsuite_adapters::{ProcessRunner, WorkspaceManager};
use tsuite_core::{
    Clock, Job, JobKey, JobRequest, JobStatus, Report, ResultsRecord, StatusRecord, SubmitAck,
};
use tsuite_storage::{JobRegistry, RegistryError};

/// Default size of the worker pool.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 5;

/// How often terminal jobs are checked against the retention window.
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Number of jobs executing at once. Values below 1 are raised to 1.
    pub max_concurrent_jobs: usize,
    /// Terminal jobs older than this are pruned. `None` keeps them forever.
    pub retention: Option<Duration>,
    pub prune_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            retention: None,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
        }
    }
}

/// Orchestrator dependencies
pub struct OrchestratorDeps<R, P, C> {
    pub registry: Arc<R>,
    pub executors: ExecutorRegistry,
    pub workspaces: WorkspaceManager<P>,
    pub clock: C,
}

/// Job counts by status plus pool size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub max_concurrent_jobs: usize,
}

struct WorkItem {
    job: Job,
    options: ExecOptions,
    executor: Arc<dyn Executor>,
}

/// Running job tasks, and whether new ones may start.
#[derive(Default)]
struct Inflight {
    aborted: bool,
    tasks: HashMap<JobKey, AbortHandle>,
}

struct Shared<R, P, C> {
    registry: Arc<R>,
    executors: ExecutorRegistry,
    workspaces: WorkspaceManager<P>,
    clock: C,
    inflight: Mutex<Inflight>,
}

pub struct Orchestrator<R, P, C> {
    shared: Arc<Shared<R, P, C>>,
    sender: Mutex<Option<mpsc::UnboundedSender<WorkItem>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    pruner: Mutex<Option<JoinHandle<()>>>,
    max_concurrent_jobs: usize,
}

impl<R, P, C> Orchestrator<R, P, C>
where
    R: JobRegistry,
    P: ProcessRunner,
    C: Clock,
{
    /// Start the worker pool. Must be called inside a tokio runtime.
    pub fn new(deps: OrchestratorDeps<R, P, C>, config: OrchestratorConfig) -> Self {
        let shared = Arc::new(Shared {
            registry: deps.registry,
            executors: deps.executors,
            workspaces: deps.workspaces,
            clock: deps.clock,
            inflight: Mutex::new(Inflight::default()),
        });
        let max_concurrent_jobs = config.max_concurrent_jobs.max(1);

        let (tx, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let workers = (0..max_concurrent_jobs)
            .map(|n| tokio::spawn(worker_loop(Arc::clone(&shared), Arc::clone(&rx), n)))
            .collect();

        let pruner = config.retention.map(|retention| {
            tokio::spawn(prune_loop(
                Arc::clone(&shared),
                retention,
                config.prune_interval,
            ))
        });

        tracing::info!(
            max_concurrent_jobs,
            retention_secs = config.retention.map(|r| r.as_secs()),
            "orchestrator started"
        );

        Self {
            shared,
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            pruner: Mutex::new(pruner),
            max_concurrent_jobs,
        }
    }

    /// Validate, record as queued, and enqueue. Never waits on execution.
    ///
    /// Rejections happen before any job record or workspace exists.
    pub fn submit(&self, request: JobRequest) -> Result<SubmitAck, SubmitError> {
        request.validate()?;
        let executor = self
            .shared
            .executors
            .lookup(request.kind, &request.subtype)?;

        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref().filter(|tx| !tx.is_closed()) else {
            return Err(SubmitError::ShuttingDown);
        };

        let job = Job::queued(&request, self.shared.clock.epoch_ms());
        self.shared.registry.create(job.clone())?;
        let ack = SubmitAck::queued(&job);
        let key = job.key();

        let item = WorkItem {
            job,
            options: ExecOptions::from(&request),
            executor,
        };
        if tx.send(item).is_err() {
            // The pool died between the check above and now; close the record out.
            if self.shared.start(&key).is_ok() {
                self.shared.record(&key, Err(JobError::Cancelled), Instant::now());
            }
            return Err(SubmitError::ShuttingDown);
        }

        tracing::info!(job = %key, subtype = %request.subtype, "job queued");
        Ok(ack)
    }

    pub fn status(&self, key: &JobKey) -> Result<StatusRecord, QueryError> {
        let job = self.shared.get(key)?;
        Ok(StatusRecord::from(&job))
    }

    /// Results of a terminal job; `NotReady` while it is queued or running.
    pub fn results(&self, key: &JobKey) -> Result<ResultsRecord, QueryError> {
        let job = self.shared.get(key)?;
        if !job.is_terminal() {
            return Err(QueryError::NotReady {
                key: key.clone(),
                status: job.status,
            });
        }
        Ok(ResultsRecord::from(&job))
    }

    pub fn health(&self) -> HealthSummary {
        let mut summary = HealthSummary {
            max_concurrent_jobs: self.max_concurrent_jobs,
            ..Default::default()
        };
        for job in self.shared.registry.list() {
            match job.status {
                JobStatus::Queued => summary.queued += 1,
                JobStatus::Running => summary.running += 1,
                JobStatus::Completed => summary.completed += 1,
                JobStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// Drop terminal jobs past the retention window. Returns how many went.
    pub fn prune(&self, retention: Duration) -> usize {
        self.shared.prune(retention)
    }

    pub fn max_concurrent_jobs(&self) -> usize {
        self.max_concurrent_jobs
    }

    /// Stop accepting work, let workers drain the queue, and join them.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        if let Some(pruner) = self.pruner.lock().take() {
            pruner.abort();
        }

        self.join_workers().await;
        tracing::info!("orchestrator stopped");
    }

    /// Stop accepting work and cancel every queued and running job.
    ///
    /// Cancelled jobs end `failed`. Returns once their processes are killed
    /// and their workspaces removed.
    pub async fn abort(&self) {
        drop(self.sender.lock().take());
        if let Some(pruner) = self.pruner.lock().take() {
            pruner.abort();
        }

        let cancelled = {
            let mut inflight = self.shared.inflight.lock();
            inflight.aborted = true;
            for task in inflight.tasks.values() {
                task.abort();
            }
            inflight.tasks.len()
        };
        tracing::warn!(cancelled, "aborting orchestrator");

        self.join_workers().await;
        tracing::info!("orchestrator stopped");
    }

    async fn join_workers(&self) {
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "worker exited abnormally");
            }
        }
    }
}

impl<R, P, C> Drop for Orchestrator<R, P, C> {
    fn drop(&mut self) {
        if let Some(pruner) = self.pruner.get_mut().take() {
            pruner.abort();
        }
    }
}

impl<R, P, C> Shared<R, P, C>
where
    R: JobRegistry,
    P: ProcessRunner,
    C: Clock,
{
    fn get(&self, key: &JobKey) -> Result<Job, QueryError> {
        self.registry.get(key).map_err(|e| match e {
            RegistryError::NotFound(key) => QueryError::NotFound(key),
            other => {
                tracing::error!(job = %key, error = %other, "registry read failed");
                QueryError::NotFound(key.clone())
            }
        })
    }

    fn start(&self, key: &JobKey) -> Result<(), RegistryError> {
        let now = self.clock.epoch_ms();
        self.registry.update(key, &mut |job| job.start(now))?;
        Ok(())
    }

    /// Commit the terminal state for a job that was started.
    fn record(&self, key: &JobKey, outcome: Result<Report, JobError>, started: Instant) {
        let now = self.clock.epoch_ms();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let mut outcome = Some(outcome);
        let committed = self.registry.update(key, &mut |job| {
            match outcome.take() {
                Some(Ok(report)) => job.finish(report, now),
                Some(Err(e)) => job.fail(e.to_string(), now),
                None => Ok(()),
            }
        });

        match committed {
            Ok(job) if job.status == JobStatus::Completed => {
                tracing::info!(job = %key, elapsed_ms, "job completed");
            }
            Ok(job) => {
                let error = job.error.as_deref().unwrap_or("tool reported failure");
                tracing::warn!(job = %key, elapsed_ms, error, "job failed");
            }
            Err(e) => {
                tracing::error!(job = %key, error = %e, "failed to record job outcome");
            }
        }
    }

    /// Start executing `item` unless the orchestrator is aborting.
    fn spawn(
        self: &Arc<Self>,
        key: &JobKey,
        item: WorkItem,
    ) -> Option<JoinHandle<Result<Report, JobError>>> {
        let mut inflight = self.inflight.lock();
        if inflight.aborted {
            return None;
        }
        let task = tokio::spawn(
            execute(Arc::clone(self), item).instrument(tracing::Span::current()),
        );
        inflight.tasks.insert(key.clone(), task.abort_handle());
        Some(task)
    }

    fn prune(&self, retention: Duration) -> usize {
        let cutoff = self
            .clock
            .epoch_ms()
            .saturating_sub(retention.as_millis() as u64);
        let removed = self.registry.prune_terminal(cutoff);
        if removed > 0 {
            tracing::info!(removed, "pruned terminal jobs");
        }
        removed
    }
}

async fn worker_loop<R, P, C>(
    shared: Arc<Shared<R, P, C>>,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<WorkItem>>>,
    worker: usize,
) where
    R: JobRegistry,
    P: ProcessRunner,
    C: Clock,
{
    tracing::debug!(worker, "worker started");
    loop {
        let item = rx.lock().await.recv().await;
        let Some(item) = item else {
            break;
        };

        let key = item.job.key();
        let span = tracing::info_span!(
            "job",
            id = %item.job.id,
            kind = %item.job.kind,
            subtype = %item.job.subtype,
            worker,
        );

        async {
            if let Err(e) = shared.start(&key) {
                tracing::error!(error = %e, "could not start job");
                return;
            }
            tracing::info!("job started");

            let started = Instant::now();
            let outcome = match shared.spawn(&key, item) {
                Some(task) => {
                    let outcome = task.await.unwrap_or_else(|e| Err(join_failure(e)));
                    shared.inflight.lock().tasks.remove(&key);
                    outcome
                }
                None => Err(JobError::Cancelled),
            };
            shared.record(&key, outcome, started);
        }
        .instrument(span)
        .await;
    }
    tracing::debug!(worker, "worker stopped");
}

/// Clone, run, normalize. The workspace is gone by the time this returns.
async fn execute<R, P, C>(shared: Arc<Shared<R, P, C>>, item: WorkItem) -> Result<Report, JobError>
where
    R: JobRegistry,
    P: ProcessRunner,
    C: Clock,
{
    let WorkItem {
        job,
        options,
        executor,
    } = item;
    let raw = shared
        .workspaces
        .with_workspace(&job.repository_url, &job.branch, |dir| async move {
            executor.execute(&dir, &options).await
        })
        .await?;
    Ok(normalize(raw))
}

async fn prune_loop<R, P, C>(shared: Arc<Shared<R, P, C>>, retention: Duration, every: Duration)
where
    R: JobRegistry,
    P: ProcessRunner,
    C: Clock,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        shared.prune(retention);
    }
}

fn join_failure(err: JoinError) -> JobError {
    if err.is_panic() {
        JobError::Panicked(panic_message(err.into_panic()))
    } else {
        JobError::Cancelled
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
