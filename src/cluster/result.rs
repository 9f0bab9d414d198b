//! Run records and statistics

use crate::board::Board;
use std::fmt;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A worker reported a completed board
    Solved { board: Board, worker: usize },
    /// Every fragment was searched and no worker found a solution
    Exhausted,
}

/// Message counts observed by the master during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    /// Batches sent, including empty ones
    pub batches_sent: u64,
    /// Fragments sent across all batches
    pub fragments_sent: u64,
    /// Refill requests answered in the main loop
    pub refills_received: u64,
    /// Termination tokens sent
    pub terminations_sent: u64,
    /// Termination acknowledgments received
    pub acks_received: u64,
    /// In-flight messages discarded during or after the handshake
    pub stray_drained: u64,
    /// Workers whose handshake ended with their own solution report
    pub self_terminated: u64,
}

/// The completion record of one run
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// Index of the run, starting at zero
    pub run: usize,
    pub outcome: RunOutcome,
    /// Time from the start of fragment generation to the solution (or to
    /// exhaustion)
    pub elapsed: Duration,
    /// Size of the fragment queue before distribution
    pub fragments_generated: usize,
    pub stats: ProtocolStats,
}

impl RunRecord {
    pub fn solution(&self) -> Option<&Board> {
        match &self.outcome {
            RunOutcome::Solved { board, .. } => Some(board),
            RunOutcome::Exhausted => None,
        }
    }

    pub fn solver(&self) -> Option<usize> {
        match &self.outcome {
            RunOutcome::Solved { worker, .. } => Some(*worker),
            RunOutcome::Exhausted => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solution().is_some()
    }
}

/// Work done by one worker across all runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker: usize,
    /// Batches received, including empty ones
    pub batches_received: u64,
    pub empty_batches: u64,
    pub fragments_solved: u64,
    pub fragments_exhausted: u64,
    pub fragments_aborted: u64,
    /// Termination tokens acknowledged
    pub acks_sent: u64,
    /// Stale termination tokens from earlier runs that were ignored
    pub stale_tokens: u64,
    /// Candidate values placed by the solver
    pub nodes: u64,
}

impl WorkerSummary {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }

    /// Fragments taken off the local batch (solved, exhausted or aborted)
    pub fn fragments_processed(&self) -> u64 {
        self.fragments_solved + self.fragments_exhausted + self.fragments_aborted
    }
}

/// Min/max/mean over the elapsed times of several runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSummary {
    pub runs: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

impl TimingSummary {
    /// Summarise the given times, or `None` when there are none
    pub fn from_durations(times: &[Duration]) -> Option<Self> {
        let min = *times.iter().min()?;
        let max = *times.iter().max()?;
        let total: Duration = times.iter().sum();
        Some(Self {
            runs: times.len(),
            min,
            max,
            mean: total / times.len() as u32,
        })
    }
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runs: {}", self.runs)?;
        writeln!(f, "Min time: {:.2?}", self.min)?;
        writeln!(f, "Max time: {:.2?}", self.max)?;
        write!(f, "Average time: {:.2?}", self.mean)
    }
}

/// Everything a cluster produced
#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub runs: Vec<RunRecord>,
    pub workers: Vec<WorkerSummary>,
}

impl ClusterReport {
    pub fn timing(&self) -> Option<TimingSummary> {
        let times: Vec<Duration> = self.runs.iter().map(|r| r.elapsed).collect();
        TimingSummary::from_durations(&times)
    }

    /// Format per-run results as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        for record in &self.runs {
            let outcome = match record.solver() {
                Some(worker) => format!("solved by worker {}", worker),
                None => "exhausted".to_string(),
            };
            s.push_str(&format!(
                "Run {}: {} in {:.2?} ({} fragments, {} terminations, {} acks, {} stray)\n",
                record.run,
                outcome,
                record.elapsed,
                record.fragments_generated,
                record.stats.terminations_sent,
                record.stats.acks_received,
                record.stats.stray_drained
            ));
        }
        if let Some(timing) = self.timing() {
            s.push_str(&format!("{}\n", timing));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(run: usize, millis: u64, outcome: RunOutcome) -> RunRecord {
        RunRecord {
            run,
            outcome,
            elapsed: Duration::from_millis(millis),
            fragments_generated: 4,
            stats: ProtocolStats::default(),
        }
    }

    #[test]
    fn test_timing_summary() {
        let times = [
            Duration::from_millis(30),
            Duration::from_millis(10),
            Duration::from_millis(20),
        ];
        let timing = TimingSummary::from_durations(&times).unwrap();
        assert_eq!(timing.runs, 3);
        assert_eq!(timing.min, Duration::from_millis(10));
        assert_eq!(timing.max, Duration::from_millis(30));
        assert_eq!(timing.mean, Duration::from_millis(20));
    }

    #[test]
    fn test_timing_summary_empty() {
        assert!(TimingSummary::from_durations(&[]).is_none());
    }

    #[test]
    fn test_run_record_accessors() {
        let solved = record(
            0,
            5,
            RunOutcome::Solved {
                board: Board::sample(),
                worker: 2,
            },
        );
        assert!(solved.is_solved());
        assert_eq!(solved.solver(), Some(2));
        assert_eq!(solved.solution(), Some(&Board::sample()));

        let exhausted = record(1, 5, RunOutcome::Exhausted);
        assert!(!exhausted.is_solved());
        assert_eq!(exhausted.solver(), None);
    }

    #[test]
    fn test_report_summary() {
        let report = ClusterReport {
            runs: vec![
                record(
                    0,
                    10,
                    RunOutcome::Solved {
                        board: Board::sample(),
                        worker: 1,
                    },
                ),
                record(1, 30, RunOutcome::Exhausted),
            ],
            workers: vec![WorkerSummary::new(0), WorkerSummary::new(1)],
        };
        let summary = report.format_summary();
        assert!(summary.contains("Run 0: solved by worker 1"));
        assert!(summary.contains("Run 1: exhausted"));
        assert!(summary.contains("Runs: 2"));
        assert_eq!(report.timing().unwrap().mean, Duration::from_millis(20));
    }

    #[test]
    fn test_fragments_processed() {
        let mut summary = WorkerSummary::new(3);
        summary.fragments_solved = 1;
        summary.fragments_exhausted = 5;
        summary.fragments_aborted = 1;
        assert_eq!(summary.fragments_processed(), 7);
    }
}
