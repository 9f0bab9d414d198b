//! Cooperative cancellation for long-running searches

/// Polled by the solver between candidate attempts. Implementations must not
/// block: a `true` answer makes the solver return [`SolveOutcome::Aborted`].
///
/// [`SolveOutcome::Aborted`]: crate::search::SolveOutcome::Aborted
pub trait CancelCheck {
    fn is_cancelled(&mut self) -> bool;
}

impl<F> CancelCheck for F
where
    F: FnMut() -> bool,
{
    fn is_cancelled(&mut self) -> bool {
        self()
    }
}

/// A check that never cancels, for sequential use of the solver
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelCheck for NeverCancel {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_cancel_check() {
        let mut polls = 0;
        let mut check = || {
            polls += 1;
            polls > 2
        };
        assert!(!check.is_cancelled());
        assert!(!check.is_cancelled());
        assert!(check.is_cancelled());
    }

    #[test]
    fn test_never_cancel() {
        let mut check = NeverCancel;
        assert!(!check.is_cancelled());
    }
}
