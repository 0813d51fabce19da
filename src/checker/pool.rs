// src/checker/pool.rs
// =============================================================================
// The check engine: dispatcher, worker pool and aggregator.
//
// How a run flows:
//
//   dispatcher ──jobs──▶ worker 1..N ──results──▶ aggregator (Checker::run)
//                          │
//                          └─ rate limiter ▶ check_with_retries
//
// 1. N workers are spawned before any job is sent
// 2. The dispatcher task sends each URL, in input order, then closes the queue
// 3. Each worker takes a job, waits on the rate limiter, checks the URL and
//    sends exactly one CheckResult
// 4. A watcher task waits for every worker, then closes the result channel
// 5. The aggregator counts results until the channel closes
//
// Every blocking step races the RunContext. A cancelled run simply produces
// fewer results: jobs never dispatched, or abandoned at the rate limiter, have
// no CheckResult at all.
// =============================================================================

use futures::future::join_all;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::context::RunContext;
use super::http::build_client;
use super::limiter::RateLimiter;
use super::retry::{check_with_retries, RetryPolicy};
use super::sink::ResultSink;
use super::types::{CheckResult, RunConfig, RunReport, RunSummary};

// One URL waiting to be checked
#[derive(Debug)]
struct CheckJob {
    url: String,
}

// Receiving side of the job queue, shared by all workers
type JobQueue = Arc<Mutex<mpsc::Receiver<CheckJob>>>;

// Aborts the run's background tasks when dropped, so a caller that drops the
// Checker::run future also stops the pool. Aborting a finished task is a no-op.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

// Everything a worker needs, cloned into each task
#[derive(Clone)]
struct WorkerContext {
    ctx: RunContext,
    client: Client,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

// Runs batches of URL checks under one RunConfig
#[derive(Debug, Clone)]
pub struct Checker {
    client: Client,
    config: RunConfig,
    policy: RetryPolicy,
}

impl Checker {
    // Creates a checker with its own HTTP client
    pub fn new(config: RunConfig) -> reqwest::Result<Self> {
        Ok(Self::with_client(build_client()?, config))
    }

    // Creates a checker around an existing HTTP client
    pub fn with_client(client: Client, config: RunConfig) -> Self {
        Self {
            client,
            config,
            policy: RetryPolicy::new(config.max_retries),
        }
    }

    // Overrides the retry policy (the retry count still comes from RunConfig)
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = RetryPolicy {
            max_retries: self.config.max_retries,
            ..policy
        };
        self
    }

    // Checks every URL and returns all results plus a summary
    //
    // `sink` sees each result as soon as it arrives. Results come back in
    // arrival order, which is generally not input order.
    pub async fn run(
        &self,
        ctx: &RunContext,
        urls: Vec<String>,
        sink: &mut dyn ResultSink,
    ) -> RunReport {
        let started = Instant::now();
        let workers = self.config.concurrency();

        info!(
            total_urls = urls.len(),
            workers,
            retries = self.config.max_retries,
            rate_limit = self.config.rate_limit,
            "Starting URL checks"
        );

        // Both queues hold the whole input, so neither side ever waits on
        // capacity. mpsc::channel panics on 0, hence the max(1).
        let capacity = urls.len().max(1);
        let (job_tx, job_rx) = mpsc::channel::<CheckJob>(capacity);
        let (result_tx, mut result_rx) = mpsc::channel::<CheckResult>(capacity);
        let jobs: JobQueue = Arc::new(Mutex::new(job_rx));

        let limiter = RateLimiter::per_second(self.config.rate_limit);
        if !limiter.is_unlimited() {
            debug!(per_second = self.config.rate_limit, "Rate limiting enabled");
        }

        let shared = WorkerContext {
            ctx: ctx.clone(),
            client: self.client.clone(),
            limiter: Arc::new(limiter),
            policy: self.policy,
        };

        // 1. Start the worker pool
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    shared.clone(),
                    jobs.clone(),
                    result_tx.clone(),
                ))
            })
            .collect();
        let mut tasks: Vec<AbortHandle> = handles.iter().map(|h| h.abort_handle()).collect();

        // 2. Dispatch jobs
        let dispatcher = tokio::spawn(dispatch(ctx.clone(), urls, job_tx));
        tasks.push(dispatcher.abort_handle());

        // 3. Close the result channel once every worker is gone
        let watcher = tokio::spawn(async move {
            for outcome in join_all(handles).await {
                if let Err(e) = outcome {
                    error!("Worker task failed: {}", e);
                }
            }
            drop(result_tx);
        });
        tasks.push(watcher.abort_handle());
        let _pool = AbortOnDrop(tasks);

        // 4. Aggregate
        let mut results = Vec::new();
        let (mut ok, mut fail) = (0, 0);
        while let Some(result) = result_rx.recv().await {
            sink.on_result(&result);
            if result.is_success() {
                ok += 1;
            } else {
                fail += 1;
            }
            results.push(result);
        }

        let summary = RunSummary {
            total: results.len(),
            ok,
            fail,
            duration: started.elapsed(),
            interrupted: ctx.reason(),
        };

        if let Some(reason) = summary.interrupted {
            warn!(%reason, produced = summary.total, "Run ended early");
        }

        RunReport { results, summary }
    }
}

// Sends every URL onto the job queue, stopping early on cancellation
//
// Dropping `jobs` when this returns is what closes the queue.
async fn dispatch(ctx: RunContext, urls: Vec<String>, jobs: mpsc::Sender<CheckJob>) {
    let total = urls.len();
    for (sent, url) in urls.into_iter().enumerate() {
        tokio::select! {
            biased;
            _ = ctx.done() => {
                debug!(sent, total, "Dispatch stopped by cancellation");
                return;
            }
            res = jobs.send(CheckJob { url }) => {
                if res.is_err() {
                    // Every worker has already exited
                    return;
                }
            }
        }
    }
}

// One worker: take a job, wait for the limiter, check it, report it
async fn worker(
    id: usize,
    shared: WorkerContext,
    jobs: JobQueue,
    results: mpsc::Sender<CheckResult>,
) {
    let ctx = &shared.ctx;
    loop {
        let job = tokio::select! {
            biased;
            _ = ctx.done() => break,
            job = next_job(&jobs) => match job {
                Some(job) => job,
                None => break,
            },
        };

        if shared.limiter.acquire(ctx).await.is_err() {
            debug!(worker = id, url = %job.url, "Job abandoned while waiting on rate limiter");
            break;
        }

        let result = check_with_retries(&shared.client, &job.url, ctx, &shared.policy).await;
        if results.send(result).await.is_err() {
            break;
        }
    }
    debug!(worker = id, "Worker exiting");
}

async fn next_job(jobs: &JobQueue) -> Option<CheckJob> {
    jobs.lock().await.recv().await
}
