//! Worker agent: pulls fragment batches, searches them, reports back.
//!
//! State machine per run:
//!
//! ```text
//! AWAITING_BATCH -> SOLVING -> REQUESTING_MORE -> AWAITING_BATCH
//!                          \-> REPORTING_SOLVED -> TERMINATED
//! (any state) --termination token--> TERMINATED (acknowledged)
//! ```
//!
//! An empty batch means the master has nothing left; the worker then waits
//! for the next signal without asking again.

use crate::board::Board;
use crate::cluster::channel::{ControlMessage, WorkMessage, WorkerChannels, WorkerMessage};
use crate::cluster::coordinator::RunGate;
use crate::cluster::error::ProtocolError;
use crate::cluster::result::WorkerSummary;
use crate::search::{Backtracker, SolveOutcome};
use crossbeam_channel::{RecvError, TryRecvError, select};
use std::collections::VecDeque;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
enum WorkerState {
    AwaitingBatch,
    Solving,
    RequestingMore,
    ReportingSolved(Board),
    Terminated(Termination),
}

enum Incoming {
    Control(Result<ControlMessage, RecvError>),
    Work(Result<WorkMessage, RecvError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// A token for the current run arrived and must be acknowledged
    Token,
    /// This worker found the solution; the run is over for it
    Solved,
}

/// Aborts the gate and takes this worker's place at the next run boundary
/// when the run loop is left through an error or a panic.
struct GateRelease<'a> {
    gate: &'a RunGate,
    next_run: usize,
    runs: usize,
    armed: bool,
}

impl Drop for GateRelease<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.gate.abort();
        if self.next_run < self.runs {
            self.gate.pass();
        }
    }
}

/// One worker participant
pub struct Worker {
    channels: WorkerChannels,
    run: usize,
    batch: VecDeque<Board>,
    summary: WorkerSummary,
}

impl Worker {
    pub fn new(channels: WorkerChannels) -> Self {
        let summary = WorkerSummary::new(channels.id);
        Self {
            channels,
            run: 0,
            batch: VecDeque::new(),
            summary,
        }
    }

    pub fn id(&self) -> usize {
        self.channels.id
    }

    pub fn summary(&self) -> &WorkerSummary {
        &self.summary
    }

    /// Take part in `runs` consecutive runs, meeting the master at `gate`
    /// before each one. Stops early without error once the gate is aborted.
    pub fn run(self, runs: usize, gate: &RunGate) -> Result<WorkerSummary, ProtocolError> {
        // Declared before the worker so the channels close before it fires
        let mut release = GateRelease {
            gate,
            next_run: 0,
            runs,
            armed: true,
        };
        let mut worker = self;
        for run in 0..runs {
            if !gate.pass() {
                debug!(worker = worker.id(), run, "cluster aborted, leaving");
                break;
            }
            release.next_run = run + 1;
            worker.run_once(run)?;
        }
        release.armed = false;
        debug!(worker = worker.id(), "worker finished");
        Ok(worker.summary)
    }

    /// Drive the state machine for one run until this worker terminates.
    pub fn run_once(&mut self, run: usize) -> Result<(), ProtocolError> {
        self.run = run;
        self.batch.clear();

        let mut state = WorkerState::AwaitingBatch;
        loop {
            trace!(worker = self.id(), run, state = ?state, "worker state");
            state = match state {
                WorkerState::AwaitingBatch => self.await_batch()?,
                WorkerState::Solving => self.solve_next()?,
                WorkerState::RequestingMore => {
                    self.send(WorkerMessage::RefillRequest)?;
                    WorkerState::AwaitingBatch
                }
                WorkerState::ReportingSolved(board) => {
                    self.send(WorkerMessage::Solved(board))?;
                    WorkerState::Terminated(Termination::Solved)
                }
                WorkerState::Terminated(termination) => {
                    if termination == Termination::Token {
                        self.send(WorkerMessage::TerminateAck)?;
                        self.summary.acks_sent += 1;
                    }
                    self.drain_work();
                    debug!(worker = self.id(), run, ?termination, "worker terminated");
                    return Ok(());
                }
            };
        }
    }

    /// Wait for whichever comes first: a batch or a termination token.
    fn await_batch(&mut self) -> Result<WorkerState, ProtocolError> {
        if self.take_termination()? {
            return Ok(WorkerState::Terminated(Termination::Token));
        }

        loop {
            let incoming = select! {
                recv(self.channels.control) -> message => Incoming::Control(message),
                recv(self.channels.work) -> message => Incoming::Work(message),
            };
            match incoming {
                Incoming::Control(Ok(ControlMessage::Terminate { run })) if run == self.run => {
                    return Ok(WorkerState::Terminated(Termination::Token));
                }
                Incoming::Control(Ok(ControlMessage::Terminate { run })) => self.ignore_stale(run),
                Incoming::Work(Ok(WorkMessage::BatchSize(count))) => {
                    self.receive_batch(count)?;
                    if count == 0 {
                        debug!(worker = self.id(), "empty batch, idling");
                        continue;
                    }
                    return Ok(WorkerState::Solving);
                }
                Incoming::Work(Ok(WorkMessage::Fragment(_))) => {
                    return Err(ProtocolError::UnexpectedMessage {
                        worker: self.id(),
                        tag: "FRAGMENT",
                        state: "awaiting a batch",
                    });
                }
                Incoming::Control(Err(_)) | Incoming::Work(Err(_)) => {
                    return Err(self.disconnected());
                }
            }
        }
    }

    /// Read the `count` fragments that follow a batch header.
    fn receive_batch(&mut self, count: usize) -> Result<(), ProtocolError> {
        for received in 0..count {
            match self.channels.work.recv() {
                Ok(WorkMessage::Fragment(board)) => self.batch.push_back(board),
                Ok(WorkMessage::BatchSize(_)) => {
                    return Err(ProtocolError::BatchMismatch {
                        worker: self.id(),
                        expected: count,
                        received,
                    });
                }
                Err(_) => return Err(self.disconnected()),
            }
        }
        self.summary.batches_received += 1;
        if count == 0 {
            self.summary.empty_batches += 1;
        }
        debug!(worker = self.id(), count, "received batch");
        Ok(())
    }

    /// Search the next fragment of the local batch.
    fn solve_next(&mut self) -> Result<WorkerState, ProtocolError> {
        if self.take_termination()? {
            return Ok(WorkerState::Terminated(Termination::Token));
        }
        let board = match self.batch.pop_front() {
            Some(board) => board,
            None => return Ok(WorkerState::RequestingMore),
        };

        let run = self.run;
        let control = &self.channels.control;
        let mut stale = 0;
        let mut hung_up = false;
        let mut cancel = || match control.try_recv() {
            Ok(ControlMessage::Terminate { run: token_run }) if token_run == run => true,
            Ok(ControlMessage::Terminate { .. }) => {
                stale += 1;
                false
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                hung_up = true;
                true
            }
        };

        let mut search = Backtracker::new(board);
        let outcome = search.next_solution(&mut cancel);
        self.summary.nodes += search.nodes();
        self.summary.stale_tokens += stale;
        if hung_up {
            return Err(self.disconnected());
        }

        Ok(match outcome {
            SolveOutcome::Solved(board) => {
                self.summary.fragments_solved += 1;
                debug!(worker = self.id(), nodes = search.nodes(), "fragment solved");
                WorkerState::ReportingSolved(board)
            }
            SolveOutcome::Exhausted => {
                self.summary.fragments_exhausted += 1;
                trace!(worker = self.id(), nodes = search.nodes(), "fragment exhausted");
                WorkerState::Solving
            }
            SolveOutcome::Aborted => {
                self.summary.fragments_aborted += 1;
                debug!(worker = self.id(), "search aborted by termination token");
                WorkerState::Terminated(Termination::Token)
            }
        })
    }

    /// Non-blocking check for a termination token of the current run.
    fn take_termination(&mut self) -> Result<bool, ProtocolError> {
        loop {
            match self.channels.control.try_recv() {
                Ok(ControlMessage::Terminate { run }) if run == self.run => return Ok(true),
                Ok(ControlMessage::Terminate { run }) => self.ignore_stale(run),
                Err(TryRecvError::Empty) => return Ok(false),
                Err(TryRecvError::Disconnected) => return Err(self.disconnected()),
            }
        }
    }

    fn ignore_stale(&mut self, token_run: usize) {
        self.summary.stale_tokens += 1;
        debug!(
            worker = self.id(),
            run = self.run,
            token_run,
            "ignoring termination token from another run"
        );
    }

    /// Discard batches that were queued before the token was observed.
    fn drain_work(&mut self) {
        self.batch.clear();
        while let Ok(message) = self.channels.work.try_recv() {
            trace!(worker = self.id(), tag = message.tag(), "discarding queued work");
        }
    }

    fn send(&self, message: WorkerMessage) -> Result<(), ProtocolError> {
        trace!(worker = self.id(), tag = message.tag(), "sending report");
        self.channels
            .to_master
            .send(message)
            .map_err(|_| self.disconnected())
    }

    fn disconnected(&self) -> ProtocolError {
        ProtocolError::Disconnected { worker: self.id() }
    }
}
