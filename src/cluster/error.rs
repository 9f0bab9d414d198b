//! Fatal protocol conditions between the master and its workers

use std::fmt;

/// A violation of the master/worker message protocol.
///
/// Participants form a closed, trusted set, so none of these is retried: the
/// participant that observes one stops and reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A batch announced `expected` fragments but a new batch header arrived
    /// after only `received`
    BatchMismatch {
        worker: usize,
        expected: usize,
        received: usize,
    },
    /// A message kind that is not valid in the receiver's current state
    UnexpectedMessage {
        worker: usize,
        tag: &'static str,
        state: &'static str,
    },
    /// The peer of the given worker link hung up
    Disconnected { worker: usize },
    /// A worker reported a board that is not completely and validly filled
    InvalidSolution { worker: usize },
    /// A worker thread panicked
    WorkerPanicked { worker: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BatchMismatch {
                worker,
                expected,
                received,
            } => write!(
                f,
                "Worker {}: batch announced {} fragments but only {} arrived",
                worker, expected, received
            ),
            ProtocolError::UnexpectedMessage { worker, tag, state } => write!(
                f,
                "Worker {}: unexpected {} message while {}",
                worker, tag, state
            ),
            ProtocolError::Disconnected { worker } => {
                write!(f, "Worker {}: channel disconnected", worker)
            }
            ProtocolError::InvalidSolution { worker } => {
                write!(f, "Worker {}: reported an invalid solution", worker)
            }
            ProtocolError::WorkerPanicked { worker } => write!(f, "Worker {} panicked", worker),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ProtocolError::BatchMismatch {
            worker: 2,
            expected: 4,
            received: 1,
        };
        assert_eq!(
            err.to_string(),
            "Worker 2: batch announced 4 fragments but only 1 arrived"
        );

        let err = ProtocolError::UnexpectedMessage {
            worker: 0,
            tag: "TERMINATE_ACK",
            state: "distributing",
        };
        assert_eq!(
            err.to_string(),
            "Worker 0: unexpected TERMINATE_ACK message while distributing"
        );
    }
}
