use std::{
    cmp, io,
    num::NonZeroUsize,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, warn};

use crate::{
    context::TestContext,
    report::RunReport,
    scheduler::{SuiteState, run_suite},
    suite::Suite,
};

/// Runs suites on a pool of detached worker threads.
///
/// Dispatching never blocks the caller. Once every suite reported back, a
/// coordinator thread hands the collected [`RunReport`] to a completion callback.
#[derive(Debug, Clone, Copy)]
pub struct ParallelScheduler {
    threads: NonZeroUsize,
}

impl Default for ParallelScheduler {
    fn default() -> Self {
        Self {
            threads: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ParallelScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_count(self, count: NonZeroUsize) -> Self {
        Self { threads: count }
    }

    pub fn worker_count(&self, suite_count: usize) -> NonZeroUsize {
        NonZeroUsize::new(cmp::min(self.threads.get(), suite_count)).unwrap_or(NonZeroUsize::MIN)
    }

    /// Queue every suite and return immediately.
    ///
    /// `on_complete` runs on the coordinator thread after the last suite
    /// finished. Nothing times out, a hanging step delays it forever.
    pub fn dispatch<F>(
        &self,
        suites: Vec<Suite<'static>>,
        root: &TestContext,
        on_complete: F,
    ) -> io::Result<()>
    where
        F: FnOnce(RunReport) + Send + 'static,
    {
        let total = suites.len();
        let worker_count = self.worker_count(total);
        let start = Instant::now();

        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        for suite in suites {
            debug!(suite = %suite.title(), state = ?SuiteState::Pending, "suite queued");
            // `job_rx` is still alive, sending can not fail.
            let _ = job_tx.send(suite);
        }
        drop(job_tx);

        let (done_tx, done_rx) = crossbeam_channel::bounded(worker_count.get());
        for i in 0..worker_count.get() {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let root = root.clone();
            let spawned = thread::Builder::new()
                .name(format!("kispec-worker-{i}"))
                .spawn(move || {
                    while let Ok(suite) = job_rx.recv() {
                        let outcome = run_suite(&suite, &root, false);
                        if done_tx.send(outcome).is_err() {
                            // The coordinator is gone, nobody collects outcomes.
                            return;
                        }
                    }
                });
            if let Err(err) = spawned {
                warn!(worker = i, "could not spawn worker: {err}");
            }
        }
        drop(done_tx);
        drop(job_rx);

        let root = root.clone();
        thread::Builder::new()
            .name("kispec-coordinator".into())
            .spawn(move || {
                let mut outcomes = Vec::with_capacity(total);
                while outcomes.len() < total {
                    match done_rx.recv() {
                        Ok(outcome) => outcomes.push(outcome),
                        Err(_) => break,
                    }
                }

                let missing = total - outcomes.len();
                if missing > 0 {
                    warn!(missing, "workers stopped before every suite finished");
                    root.error(format!("{missing} of {total} suites did not finish"));
                }

                debug!(suites = outcomes.len(), "all suites finished");
                on_complete(RunReport {
                    outcomes,
                    duration: start.elapsed(),
                    declaration_errors: Vec::new(),
                    fmt_errors: Vec::new(),
                    interrupted: missing > 0,
                });
            })?;

        Ok(())
    }
}

/// Handle to a parallel run that was started without blocking.
#[derive(Debug)]
pub struct ParallelRun {
    report: Receiver<RunReport>,
}

impl ParallelRun {
    pub(crate) fn new(report: Receiver<RunReport>) -> Self {
        Self { report }
    }

    /// Block until the report was rendered and the `done` callback returned.
    ///
    /// If the run could not be started or stopped before reporting back, the
    /// returned report is empty and marked `interrupted`.
    pub fn join(self) -> RunReport {
        self.report.recv().unwrap_or_else(|_| {
            warn!("parallel run ended without a report");
            RunReport::never_reported()
        })
    }

    /// Like [`join`](Self::join), but give up after `timeout`.
    pub fn join_timeout(self, timeout: Duration) -> Result<RunReport, Self> {
        match self.report.recv_timeout(timeout) {
            Ok(report) => Ok(report),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(RunReport::never_reported()),
        }
    }
}
