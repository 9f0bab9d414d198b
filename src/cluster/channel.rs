//! Message channels between the master and its workers.
//!
//! Every worker gets its own set of channels so the master can wait on a
//! single worker (the shutdown handshake) as well as on all of them (the
//! main loop). Each link carries three logical tags:
//! - `work`: a `BatchSize(n)` header followed by exactly `n` fragments
//! - `control`: termination tokens, stamped with the run they belong to
//! - `reports`: refill requests, solutions and termination acknowledgments
//!
//! All channels are unbounded, so a send never blocks the sender.

use crate::board::Board;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Message sent from the master on a worker's `work` channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkMessage {
    /// Number of fragments that follow
    BatchSize(usize),
    /// One fragment of the current batch
    Fragment(Board),
}

impl WorkMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            WorkMessage::BatchSize(_) => "BATCH_SIZE",
            WorkMessage::Fragment(_) => "FRAGMENT",
        }
    }
}

/// Message sent from the master on a worker's `control` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Stop working on the given run and acknowledge
    Terminate { run: usize },
}

/// Message sent from a worker to the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerMessage {
    /// The local batch is exhausted without a solution
    RefillRequest,
    /// A completely filled, valid board
    Solved(Board),
    /// The worker observed a termination token and stopped
    TerminateAck,
}

impl WorkerMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            WorkerMessage::RefillRequest => "REFILL_REQUEST",
            WorkerMessage::Solved(_) => "SOLVED",
            WorkerMessage::TerminateAck => "TERMINATE_ACK",
        }
    }
}

/// Channel endpoints held by a worker.
pub struct WorkerChannels {
    /// Index of this worker
    pub id: usize,
    /// Receive batches from the master.
    pub work: Receiver<WorkMessage>,
    /// Receive termination tokens from the master.
    pub control: Receiver<ControlMessage>,
    /// Send reports to the master.
    pub to_master: Sender<WorkerMessage>,
}

/// The master's end of one worker's channels.
pub struct WorkerLink {
    pub work: Sender<WorkMessage>,
    pub control: Sender<ControlMessage>,
    pub reports: Receiver<WorkerMessage>,
}

/// Channel endpoints for the master, indexed by worker.
pub struct MasterChannels {
    pub links: Vec<WorkerLink>,
}

/// Create channels for a cluster with the given number of workers.
pub fn create_channels(num_workers: usize) -> (MasterChannels, Vec<WorkerChannels>) {
    let mut links = Vec::with_capacity(num_workers);
    let mut worker_channels = Vec::with_capacity(num_workers);

    for id in 0..num_workers {
        let (work_tx, work_rx) = unbounded();
        let (control_tx, control_rx) = unbounded();
        let (report_tx, report_rx) = unbounded();

        links.push(WorkerLink {
            work: work_tx,
            control: control_tx,
            reports: report_rx,
        });
        worker_channels.push(WorkerChannels {
            id,
            work: work_rx,
            control: control_rx,
            to_master: report_tx,
        });
    }

    (MasterChannels { links }, worker_channels)
}
