//! Master coordinator: owns the fragment queue, feeds workers on demand,
//! detects the first solution and shuts every worker down with a confirmed
//! handshake.

use crate::board::Board;
use crate::cluster::channel::{
    ControlMessage, MasterChannels, WorkMessage, WorkerLink, WorkerMessage,
};
use crate::cluster::config::ClusterConfig;
use crate::cluster::error::ProtocolError;
use crate::cluster::result::{ProtocolStats, RunOutcome, RunRecord};
use crate::search::FragmentGenerator;
use crossbeam_channel::Select;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// The work of one run.
#[derive(Debug, Clone)]
pub enum Job {
    /// A seed puzzle, expanded into fragments before distribution
    Puzzle(Board),
    /// Fragments used as the queue directly
    Fragments(Vec<Board>),
}

/// Mutable state of a single run, owned by the master's thread.
struct RunState {
    queue: VecDeque<Board>,
    /// Workers that were handed an empty batch (or none at all)
    idle: Vec<bool>,
    stats: ProtocolStats,
}

impl RunState {
    fn exhausted(&self) -> bool {
        self.queue.is_empty() && self.idle.iter().all(|&idle| idle)
    }
}

pub struct Master {
    links: Vec<WorkerLink>,
    config: ClusterConfig,
    generator: FragmentGenerator,
}

impl Master {
    pub fn new(channels: MasterChannels, config: ClusterConfig) -> Self {
        let generator = FragmentGenerator::new(config.fragments.clone());
        Self {
            links: channels.links,
            config,
            generator,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.links.len()
    }

    /// Run one job to completion: distribute, wait for the outcome, then
    /// terminate every worker that is still working.
    pub fn run_job(&self, run: usize, job: Job) -> Result<RunRecord, ProtocolError> {
        let start = Instant::now();
        let queue: VecDeque<Board> = match job {
            Job::Puzzle(seed) => self.generator.expand(&seed).fragments.into(),
            Job::Fragments(fragments) => fragments.into(),
        };
        let fragments_generated = queue.len();
        info!(
            run,
            fragments = fragments_generated,
            workers = self.num_workers(),
            "starting run"
        );

        let mut state = RunState {
            queue,
            idle: vec![false; self.num_workers()],
            stats: ProtocolStats::default(),
        };

        self.distribute_initial(&mut state)?;
        let outcome = self.await_outcome(&mut state)?;
        let elapsed = start.elapsed();

        let solver = match &outcome {
            RunOutcome::Solved { worker, .. } => Some(*worker),
            RunOutcome::Exhausted => None,
        };
        self.shutdown(run, solver, &mut state)?;
        self.drain_stray(&mut state);

        match solver {
            Some(worker) => info!(run, worker, ?elapsed, "run solved"),
            None => warn!(run, ?elapsed, "run exhausted without a solution"),
        }

        Ok(RunRecord {
            run,
            outcome,
            elapsed,
            fragments_generated,
            stats: state.stats,
        })
    }

    /// Hand each worker in turn a batch until the queue runs dry. Workers
    /// left without one start out idle.
    fn distribute_initial(&self, state: &mut RunState) -> Result<(), ProtocolError> {
        for worker in 0..self.num_workers() {
            if state.queue.is_empty() {
                state.idle[worker] = true;
                continue;
            }
            self.send_batch(worker, state)?;
        }
        Ok(())
    }

    /// Send up to `batch_size` fragments from the head of the queue.
    fn send_batch(&self, worker: usize, state: &mut RunState) -> Result<(), ProtocolError> {
        let count = self.config.batch_size.min(state.queue.len());
        let link = &self.links[worker];
        let disconnected = |_| ProtocolError::Disconnected { worker };

        link.work
            .send(WorkMessage::BatchSize(count))
            .map_err(disconnected)?;
        for fragment in state.queue.drain(..count) {
            link.work
                .send(WorkMessage::Fragment(fragment))
                .map_err(disconnected)?;
        }

        state.idle[worker] = count == 0;
        state.stats.batches_sent += 1;
        state.stats.fragments_sent += count as u64;
        debug!(worker, count, remaining = state.queue.len(), "sent batch");
        Ok(())
    }

    /// Answer refill requests until a worker reports a solution or every
    /// worker has run out of work.
    fn await_outcome(&self, state: &mut RunState) -> Result<RunOutcome, ProtocolError> {
        loop {
            if state.exhausted() {
                return Ok(RunOutcome::Exhausted);
            }

            let mut select = Select::new();
            for link in &self.links {
                select.recv(&link.reports);
            }
            let operation = select.select();
            let worker = operation.index();
            let message = operation
                .recv(&self.links[worker].reports)
                .map_err(|_| ProtocolError::Disconnected { worker })?;
            trace!(worker, tag = message.tag(), "received report");

            match message {
                WorkerMessage::RefillRequest => {
                    state.stats.refills_received += 1;
                    self.send_batch(worker, state)?;
                }
                WorkerMessage::Solved(board) => {
                    if !(board.is_complete() && board.is_valid()) {
                        return Err(ProtocolError::InvalidSolution { worker });
                    }
                    info!(worker, "solution reported");
                    return Ok(RunOutcome::Solved { board, worker });
                }
                WorkerMessage::TerminateAck => {
                    return Err(ProtocolError::UnexpectedMessage {
                        worker,
                        tag: message.tag(),
                        state: "distributing",
                    });
                }
            }
        }
    }

    /// Send one termination token to every worker except `solver`, one at a
    /// time, and wait for each acknowledgment before moving on.
    ///
    /// A worker that already reported its own solution has stopped and may
    /// have hung up, so it gets no token.
    fn shutdown(
        &self,
        run: usize,
        solver: Option<usize>,
        state: &mut RunState,
    ) -> Result<(), ProtocolError> {
        for (worker, link) in self.links.iter().enumerate() {
            if Some(worker) == solver {
                continue;
            }
            if self.drain_pending(worker, state) {
                continue;
            }

            if link.control.send(ControlMessage::Terminate { run }).is_err() {
                // It may have solved and left between the drain and the send
                if self.drain_pending(worker, state) {
                    continue;
                }
                return Err(ProtocolError::Disconnected { worker });
            }
            state.stats.terminations_sent += 1;
            debug!(worker, run, "sent termination token");

            loop {
                let message = link
                    .reports
                    .recv()
                    .map_err(|_| ProtocolError::Disconnected { worker })?;
                match message {
                    WorkerMessage::TerminateAck => {
                        state.stats.acks_received += 1;
                        debug!(worker, run, "termination acknowledged");
                        break;
                    }
                    WorkerMessage::RefillRequest => {
                        state.stats.stray_drained += 1;
                        debug!(worker, "drained in-flight refill request");
                    }
                    WorkerMessage::Solved(_) => {
                        // The worker stopped on its own before seeing the token
                        self.record_late_solution(worker, state);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Discard whatever `worker` already sent. Returns `true` when that
    /// included a solution, meaning the worker has terminated by itself.
    fn drain_pending(&self, worker: usize, state: &mut RunState) -> bool {
        while let Ok(message) = self.links[worker].reports.try_recv() {
            match message {
                WorkerMessage::Solved(_) => {
                    self.record_late_solution(worker, state);
                    return true;
                }
                other => {
                    state.stats.stray_drained += 1;
                    debug!(worker, tag = other.tag(), "drained in-flight report");
                }
            }
        }
        false
    }

    fn record_late_solution(&self, worker: usize, state: &mut RunState) {
        state.stats.stray_drained += 1;
        state.stats.self_terminated += 1;
        debug!(worker, "drained late solution report");
    }

    /// Best-effort pass over every link so nothing leaks into the next run.
    fn drain_stray(&self, state: &mut RunState) {
        for (worker, link) in self.links.iter().enumerate() {
            while let Ok(message) = link.reports.try_recv() {
                state.stats.stray_drained += 1;
                debug!(worker, tag = message.tag(), "discarded stray message");
            }
        }
    }
}
