//! Master/worker search cluster.
//!
//! A single master expands a seed board into fragments and streams them to
//! a pool of worker threads in fixed-size batches. Workers search their
//! batch and either report a solution or ask for more. Once a solution is
//! reported the master sends a termination token to every other worker and
//! waits for each acknowledgment before the run ends.
//!
//! # Architecture
//!
//! - **channel**: per-worker `work`, `control` and `report` channels
//! - **master**: fragment queue, refills, solution detection, shutdown handshake
//! - **worker**: the batch/solve/refill state machine
//! - **coordinator**: spawns workers and drives consecutive runs
//!
//! # Example
//!
//! ```no_run
//! use sudoku_mesh::board::Board;
//! use sudoku_mesh::cluster::{ClusterConfig, Job, run_cluster};
//!
//! let config = ClusterConfig::default().with_workers(4).with_batch_size(8);
//! let report = run_cluster(vec![Job::Puzzle(Board::sample())], &config)?;
//! println!("{}", report.format_summary());
//! # Ok::<(), sudoku_mesh::cluster::ProtocolError>(())
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod master;
pub mod result;
pub mod worker;

pub use config::ClusterConfig;
pub use coordinator::{RunGate, run_cluster};
pub use error::ProtocolError;
pub use master::{Job, Master};
pub use result::{
    ClusterReport, ProtocolStats, RunOutcome, RunRecord, TimingSummary, WorkerSummary,
};
pub use worker::Worker;
