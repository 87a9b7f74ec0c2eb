//! Wall-clock budget for optimizer runs
//!
//! The optimizers have no cancellation points. [`run_with_deadline`] runs a
//! job on a worker thread and stops waiting once the budget expires; the
//! worker is detached and whatever it produces afterwards is dropped.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::warn;

use reflow_core::{DecisionError, DecisionResult};

/// Run `job`, failing with `OptimizationIncomplete` if it outlives `budget`
pub fn run_with_deadline<T, F>(budget: Duration, job: F) -> DecisionResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> DecisionResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    thread::Builder::new()
        .name("reflow-optimizer".to_string())
        .spawn(move || {
            // receiver is gone once the deadline passed
            let _ = tx.send(job());
        })
        .map_err(|e| DecisionError::incomplete(format!("could not start optimizer thread: {e}")))?;

    match rx.recv_timeout(budget) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!("optimizer exceeded its {:?} budget; result discarded", budget);
            Err(DecisionError::incomplete(format!("optimizer exceeded its {budget:?} budget")))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(DecisionError::incomplete("optimizer thread terminated without a result"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_result_within_budget() {
        let value = run_with_deadline(Duration::from_secs(5), || Ok(7)).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn timeout_is_incomplete() {
        let result: DecisionResult<()> = run_with_deadline(Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        assert!(matches!(result, Err(DecisionError::OptimizationIncomplete { .. })));
    }

    #[test]
    fn job_errors_pass_through() {
        let result: DecisionResult<()> =
            run_with_deadline(Duration::from_secs(5), || Err(DecisionError::validation("bad")));
        assert!(matches!(result, Err(DecisionError::Validation { .. })));
    }

    #[test]
    fn panicking_job_is_incomplete() {
        let result: DecisionResult<()> = run_with_deadline(Duration::from_secs(5), || panic!("boom"));
        assert!(matches!(result, Err(DecisionError::OptimizationIncomplete { .. })));
    }
}
