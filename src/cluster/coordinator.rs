//! Cluster coordinator that spawns the worker threads and drives the runs.

use crate::cluster::channel::create_channels;
use crate::cluster::config::ClusterConfig;
use crate::cluster::error::ProtocolError;
use crate::cluster::master::{Job, Master};
use crate::cluster::result::{ClusterReport, RunRecord};
use crate::cluster::worker::Worker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use tracing::{debug, info, warn};

/// Run boundary shared by the master and every worker.
///
/// All participants meet here before each run. Once any of them fails it
/// aborts the gate and still arrives for the next run, so nobody is left
/// waiting; everyone then sees the abort and stops.
pub struct RunGate {
    barrier: Barrier,
    aborted: AtomicBool,
}

impl RunGate {
    pub fn new(participants: usize) -> Self {
        Self {
            barrier: Barrier::new(participants),
            aborted: AtomicBool::new(false),
        }
    }

    /// Wait for every participant. Returns `false` if the cluster was aborted.
    pub fn pass(&self) -> bool {
        self.barrier.wait();
        !self.is_aborted()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Run every job in order on a freshly spawned cluster.
///
/// Workers persist across runs. All participants meet at a [`RunGate`]
/// before each run, so messages of one run never mix with the next. After a
/// protocol error the remaining runs are skipped and every worker is joined
/// before the error is returned.
pub fn run_cluster(
    jobs: Vec<Job>,
    config: &ClusterConfig,
) -> Result<ClusterReport, ProtocolError> {
    let runs = jobs.len();
    let num_workers = config.num_workers;
    info!(workers = num_workers, runs, batch_size = config.batch_size, "starting cluster");

    let (master_channels, worker_channels) = create_channels(num_workers);
    let gate = Arc::new(RunGate::new(num_workers + 1));

    let worker_handles: Vec<_> = worker_channels
        .into_iter()
        .map(|channels| {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || Worker::new(channels).run(runs, &gate))
        })
        .collect();

    let master = Master::new(master_channels, config.clone());
    let outcome = drive_runs(master, jobs, &gate);

    let mut workers = Vec::with_capacity(num_workers);
    let mut worker_error = None;
    for (worker, handle) in worker_handles.into_iter().enumerate() {
        let result = handle
            .join()
            .map_err(|_| ProtocolError::WorkerPanicked { worker })?;
        match result {
            Ok(summary) => {
                debug!(worker, fragments = summary.fragments_processed(), "joined worker");
                workers.push(summary);
            }
            Err(err) => {
                debug!(worker, error = %err, "worker failed");
                worker_error.get_or_insert(err);
            }
        }
    }

    let records = outcome?;
    if let Some(err) = worker_error {
        return Err(err);
    }
    Ok(ClusterReport {
        runs: records,
        workers,
    })
}

/// Master side of the run loop. On failure the master's channels are closed
/// before the gate is released, so workers blocked mid-run wake up.
fn drive_runs(
    master: Master,
    jobs: Vec<Job>,
    gate: &RunGate,
) -> Result<Vec<RunRecord>, ProtocolError> {
    let runs = jobs.len();
    let mut records = Vec::with_capacity(runs);
    for (run, job) in jobs.into_iter().enumerate() {
        if !gate.pass() {
            warn!(run, "cluster aborted by a worker");
            break;
        }
        match master.run_job(run, job) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(run, error = %err, "run failed, releasing workers");
                gate.abort();
                drop(master);
                if run + 1 < runs {
                    gate.pass();
                }
                return Err(err);
            }
        }
    }
    Ok(records)
}
