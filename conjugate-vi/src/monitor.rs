use crate::common::*;
use serde::Serialize;

/// How consecutive ELBO values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// converged when `0 < ELBO[n] - ELBO[n-1] < threshold`
    StrictIncrease,
    /// converged when `|ELBO[n] - ELBO[n-1]| < threshold`
    AbsoluteChange,
}

/// Where a run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitStatus {
    /// still iterating
    Running,
    /// the stopping rule fired
    Converged,
    /// `max_iter` ELBO values recorded without convergence
    MaxIterReached,
}

/// Relative size of an ELBO drop tolerated before warning
const DECREASE_TOL: f64 = 1e-8;

/// Append-only ELBO trace with a stopping rule
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    rule: StopRule,
    threshold: f64,
    max_iter: usize,
    trace: Vec<f64>,
    status: FitStatus,
}

impl ConvergenceMonitor {
    /// * `rule` - comparison of consecutive values
    /// * `threshold` - convergence tolerance
    /// * `max_iter` - maximum number of recorded values
    pub fn new(rule: StopRule, threshold: f64, max_iter: usize) -> Self {
        Self {
            rule,
            threshold,
            max_iter,
            trace: Vec::with_capacity(max_iter),
            status: FitStatus::Running,
        }
    }

    /// Append one ELBO value and return the updated status
    pub fn record(&mut self, elbo: f64) -> FitStatus {
        if self.status != FitStatus::Running {
            return self.status;
        }

        if let Some(&prev) = self.trace.last() {
            let change = elbo - prev;
            let converged = match self.rule {
                StopRule::StrictIncrease => change > 0.0 && change < self.threshold,
                StopRule::AbsoluteChange => change.abs() < self.threshold,
            };

            if self.rule == StopRule::StrictIncrease
                && change < -DECREASE_TOL * prev.abs().max(1.0)
            {
                warn!(
                    "ELBO decreased at iteration {}: {:.9} -> {:.9}",
                    self.trace.len() + 1,
                    prev,
                    elbo
                );
            }

            if converged {
                self.status = FitStatus::Converged;
            }
        }

        self.trace.push(elbo);

        if self.status == FitStatus::Running && self.trace.len() >= self.max_iter {
            self.status = FitStatus::MaxIterReached;
        }
        self.status
    }

    /// current status
    pub fn status(&self) -> FitStatus {
        self.status
    }

    /// number of recorded values
    pub fn num_iter(&self) -> usize {
        self.trace.len()
    }

    /// recorded values in order
    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    /// consume the monitor, keeping the trace
    pub fn into_trace(self) -> Vec<f64> {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_increase_needs_a_positive_step() {
        let mut mon = ConvergenceMonitor::new(StopRule::StrictIncrease, 1e-6, 10);
        assert_eq!(mon.record(-10.0), FitStatus::Running);
        assert_eq!(mon.record(-9.0), FitStatus::Running);
        // no change is not convergence under this rule
        assert_eq!(mon.record(-9.0), FitStatus::Running);
        assert_eq!(mon.record(-9.0 + 1e-7), FitStatus::Converged);
        assert_eq!(mon.num_iter(), 4);
    }

    #[test]
    fn absolute_change_accepts_small_decrease() {
        let mut mon = ConvergenceMonitor::new(StopRule::AbsoluteChange, 1e-6, 10);
        mon.record(5.0);
        assert_eq!(mon.record(5.0 - 1e-7), FitStatus::Converged);
    }

    #[test]
    fn stops_at_max_iter() {
        let mut mon = ConvergenceMonitor::new(StopRule::StrictIncrease, 1e-6, 3);
        mon.record(1.0);
        mon.record(2.0);
        assert_eq!(mon.record(3.0), FitStatus::MaxIterReached);
        // further values are ignored
        assert_eq!(mon.record(4.0), FitStatus::MaxIterReached);
        assert_eq!(mon.trace(), &[1.0, 2.0, 3.0]);
    }
}
