//! Order tracking steps and status updates.
//!
//! Every order carries the same five steps. Completion moves strictly
//! front-to-back: step `i` can only be completed once every step before it
//! is, and a completed step is never reopened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shophub_core::{OrderStatus, TransitionError};

/// Labels of the fulfillment sequence, in order.
pub const STEP_LABELS: [&str; 5] = [
    "Order Placed",
    "Processing",
    "Shipped",
    "Out for Delivery",
    "Delivered",
];

/// One stage in an order's fulfillment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStep {
    pub label: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TrackingStep {
    fn pending(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            completed: false,
            completed_at: None,
        }
    }
}

/// Errors raised when a status update violates the lifecycle rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The requested status is not reachable from the current one.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// An earlier step is still incomplete.
    #[error("tracking step {index} cannot complete before step {first_incomplete}")]
    StepOutOfOrder {
        index: usize,
        first_incomplete: usize,
    },

    /// Cancelled orders do not progress.
    #[error("cancelled orders cannot advance tracking steps")]
    OrderCancelled,
}

/// What completing a step would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step will be (or was) newly completed.
    Completed,
    /// The step was already complete; nothing changes.
    AlreadyCompleted,
    /// No step has that index; nothing changes.
    OutOfRange,
}

/// The ordered tracking steps of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingSteps(Vec<TrackingStep>);

impl TrackingSteps {
    /// Steps for a freshly placed order: "Order Placed" done at `placed_at`,
    /// the rest pending.
    #[must_use]
    pub fn initial(placed_at: DateTime<Utc>) -> Self {
        let mut steps: Vec<TrackingStep> = STEP_LABELS
            .iter()
            .map(|label| TrackingStep::pending(label))
            .collect();
        if let Some(first) = steps.first_mut() {
            first.completed = true;
            first.completed_at = Some(placed_at);
        }
        Self(steps)
    }

    /// Index of the first incomplete step, `None` once everything is done.
    #[must_use]
    pub fn current_step(&self) -> Option<usize> {
        self.0.iter().position(|step| !step.completed)
    }

    /// Whether every step is complete.
    #[must_use]
    pub fn all_complete(&self) -> bool {
        self.current_step().is_none()
    }

    /// Whether no incomplete step is followed by a completed one.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| matches!(pair, [before, after] if before.completed || !after.completed))
    }

    /// Decide what completing `index` would do, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::StepOutOfOrder` if an earlier step is
    /// incomplete.
    pub fn check(&self, index: usize) -> Result<StepOutcome, LifecycleError> {
        let Some(step) = self.0.get(index) else {
            return Ok(StepOutcome::OutOfRange);
        };
        if step.completed {
            return Ok(StepOutcome::AlreadyCompleted);
        }
        match self.current_step() {
            Some(first_incomplete) if first_incomplete < index => {
                Err(LifecycleError::StepOutOfOrder {
                    index,
                    first_incomplete,
                })
            }
            _ => Ok(StepOutcome::Completed),
        }
    }

    /// Complete step `index` at `now`.
    ///
    /// Re-completing a step and indexes past the end are no-ops.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::StepOutOfOrder` if an earlier step is
    /// incomplete.
    pub fn complete(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<StepOutcome, LifecycleError> {
        let outcome = self.check(index)?;
        if outcome == StepOutcome::Completed
            && let Some(step) = self.0.get_mut(index)
        {
            step.completed = true;
            step.completed_at = Some(now);
        }
        Ok(outcome)
    }

    /// The steps, in order.
    #[must_use]
    pub fn as_slice(&self) -> &[TrackingStep] {
        &self.0
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no steps at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An administrative status update: the new status and, optionally, a
/// tracking step to mark complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub step_index: Option<usize>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_initial_steps() {
        let steps = TrackingSteps::initial(at(9));
        assert_eq!(steps.len(), 5);
        assert!(steps.as_slice()[0].completed);
        assert_eq!(steps.as_slice()[0].completed_at, Some(at(9)));
        assert!(steps.as_slice()[1..].iter().all(|s| !s.completed && s.completed_at.is_none()));
        assert_eq!(steps.current_step(), Some(1));
        assert!(steps.is_monotonic());
    }

    #[test]
    fn test_complete_next_step() {
        let mut steps = TrackingSteps::initial(at(9));
        assert_eq!(steps.complete(1, at(10)).unwrap(), StepOutcome::Completed);
        assert_eq!(steps.as_slice()[1].completed_at, Some(at(10)));
        assert_eq!(steps.current_step(), Some(2));
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut steps = TrackingSteps::initial(at(9));
        steps.complete(1, at(10)).unwrap();
        assert_eq!(
            steps.complete(1, at(11)).unwrap(),
            StepOutcome::AlreadyCompleted
        );
        // Timestamp of the first completion is kept.
        assert_eq!(steps.as_slice()[1].completed_at, Some(at(10)));
    }

    #[test]
    fn test_skipping_a_step_is_rejected() {
        let mut steps = TrackingSteps::initial(at(9));
        let before = steps.clone();
        assert_eq!(
            steps.complete(3, at(10)),
            Err(LifecycleError::StepOutOfOrder {
                index: 3,
                first_incomplete: 1
            })
        );
        assert_eq!(steps, before);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut steps = TrackingSteps::initial(at(9));
        let before = steps.clone();
        assert_eq!(steps.complete(9, at(10)).unwrap(), StepOutcome::OutOfRange);
        assert_eq!(steps, before);
    }

    #[test]
    fn test_all_complete() {
        let mut steps = TrackingSteps::initial(at(9));
        for index in 1..STEP_LABELS.len() {
            steps.complete(index, at(10)).unwrap();
            assert!(steps.is_monotonic());
        }
        assert!(steps.all_complete());
        assert_eq!(steps.current_step(), None);
    }

    #[test]
    fn test_is_monotonic_detects_gap() {
        let json = r#"[
            {"label": "Order Placed", "completed": true, "completed_at": null},
            {"label": "Processing", "completed": false, "completed_at": null},
            {"label": "Shipped", "completed": true, "completed_at": null}
        ]"#;
        let steps: TrackingSteps = serde_json::from_str(json).unwrap();
        assert!(!steps.is_monotonic());
    }

    #[test]
    fn test_status_update_step_index_optional() {
        let update: StatusUpdate = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(update.status, OrderStatus::Processing);
        assert_eq!(update.step_index, None);
    }
}
