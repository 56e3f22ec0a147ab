//! Personal Best reconstruction
//!
//! Given one attempt, rebuild every segment's split from the segment history
//! and fill gaps from the attempt's run totals:
//!
//! - a missing final segment is the total minus everything before it
//! - a single missing earlier segment is the total minus all other segments
//! - two or more gaps the totals cannot pin down make the run irreconcilable
//!
//! A history entry of zero on both axes counts as a gap.

use lssr_common::timecode::{self, ABSENT};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RestoreError, Result};
use crate::store::{Diagnostic, DiagnosticKind, RecordStore, SegmentIndex, Times};

/// Outcome of a successful reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Splits were read or derived with a single unknown
    Success,
    /// Several splits were missing; the result is a best guess
    SuccessWithWarning,
}

impl PlanStatus {
    pub fn is_warning(self) -> bool {
        self == PlanStatus::SuccessWithWarning
    }
}

/// Proposed Personal Best split for one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    #[serde(skip)]
    pub segment: SegmentIndex,
    #[serde(rename = "segment")]
    pub name: String,
    /// Cumulative real time, or `None` when this segment added none
    pub real_time: String,
    /// Cumulative game time, or `None` when this segment added none
    pub game_time: String,
    #[serde(skip)]
    pub real_seconds: Option<f64>,
    #[serde(skip)]
    pub game_seconds: Option<f64>,
}

impl PlanEntry {
    fn new(segment: SegmentIndex, name: &str, real: Option<f64>, game: Option<f64>) -> Self {
        let render = |value: Option<f64>| value.map(timecode::format).unwrap_or_else(|| ABSENT.to_string());
        Self {
            segment,
            name: name.to_string(),
            real_time: render(real),
            game_time: render(game),
            real_seconds: real,
            game_seconds: game,
        }
    }
}

/// Reconstructed Personal Best for one attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub attempt_id: String,
    pub status: PlanStatus,
    pub entries: Vec<PlanEntry>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconstruct the splits of `attempt_id`.
///
/// Fails with [`RestoreError::InvalidAttempt`] for an id that is not a
/// retained attempt, and [`RestoreError::IrreconcilableRun`] when the totals
/// cannot account for the gaps.
pub fn reconstruct<N>(store: &RecordStore<N>, attempt_id: &str) -> Result<Plan> {
    let attempt = store
        .find_attempt(attempt_id)
        .ok_or_else(|| RestoreError::InvalidAttempt(attempt_id.to_string()))?;
    let last = store.last_index().ok_or(RestoreError::NoSegments)?;
    let total = attempt.times;

    let mut status = PlanStatus::Success;
    let mut sum = Times::ZERO;
    let mut missing = 0usize;
    let mut splits: Vec<Times> = Vec::with_capacity(store.segments().len());

    for segment in store.segments() {
        match segment.record_for(attempt_id) {
            Some(record) if record.times.is_recorded() => {
                sum += record.times;
                splits.push(record.times);
            }
            Some(_) => {
                debug!("Segment '{}' has an empty time for run {}", segment.name, attempt_id);
                missing += 1;
                splits.push(Times::ZERO);
            }
            None if segment.index == last => {
                splits.push((total - sum).rounded());
                sum = total;
                debug!("Final segment '{}' derived from run totals", segment.name);
                if missing > 0 {
                    status = PlanStatus::SuccessWithWarning;
                }
            }
            None => {
                debug!("Segment '{}' has no time for run {}", segment.name, attempt_id);
                missing += 1;
                splits.push(Times::ZERO);
            }
        }
    }

    // Placeholders that happen to reconcile keep Success without a warning
    if sum.rounded() != total.rounded() {
        if missing != 1 {
            return Err(RestoreError::IrreconcilableRun {
                attempt: attempt_id.to_string(),
                missing,
            });
        }
        if let Some(gap) = splits.iter_mut().find(|split| !split.is_recorded()) {
            *gap = total - sum;
        }
    }

    let mut diagnostics = Vec::new();
    let mut cumulative = Times::ZERO;
    let mut entries = Vec::with_capacity(splits.len());
    for (segment, split) in store.segments().iter().zip(&splits) {
        if split.real < 0.0 || split.game < 0.0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NegativeSegmentTime,
                format!("segment '{}', run {}", segment.name, attempt_id),
            ));
        }
        cumulative += *split;
        entries.push(PlanEntry::new(
            segment.index,
            &segment.name,
            (split.real != 0.0).then_some(cumulative.real),
            (split.game != 0.0).then_some(cumulative.game),
        ));
    }

    info!(
        "Planned {} splits for run {} ({:?}, {} missing)",
        entries.len(),
        attempt_id,
        status,
        missing
    );

    Ok(Plan {
        attempt_id: attempt_id.to_string(),
        status,
        entries,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Attempt, TimeRecord};

    fn record(id: &str, real: f64, game: f64) -> TimeRecord {
        TimeRecord {
            attempt_id: id.to_string(),
            times: Times::new(real, game),
        }
    }

    fn store(total: Times, segments: Vec<Vec<TimeRecord>>) -> RecordStore<()> {
        let mut store = RecordStore::default();
        store.push_attempt(Attempt {
            id: "3".to_string(),
            times: total,
        });
        for (i, records) in segments.into_iter().enumerate() {
            store.push_segment(format!("S{}", i), (), records);
        }
        store
    }

    fn real_times(plan: &Plan) -> Vec<&str> {
        plan.entries.iter().map(|e| e.real_time.as_str()).collect()
    }

    #[test]
    fn test_missing_last_segment_is_derived() {
        let store = store(
            Times::new(120.0, 100.0),
            vec![vec![record("3", 50.0, 40.0)], vec![]],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::Success);
        assert_eq!(plan.entries[0].real_time, "00:00:50.0000000");
        assert_eq!(plan.entries[0].game_time, "00:00:40.0000000");
        assert_eq!(plan.entries[1].real_time, "00:02:00.0000000");
        assert_eq!(plan.entries[1].game_time, "00:01:40.0000000");
    }

    #[test]
    fn test_complete_run_is_read_verbatim() {
        let store = store(
            Times::new(6.0, 0.0),
            vec![
                vec![record("3", 1.0, 0.0)],
                vec![record("3", 2.0, 0.0)],
                vec![record("3", 3.0, 0.0)],
            ],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::Success);
        assert_eq!(
            real_times(&plan),
            vec!["00:00:01.0000000", "00:00:03.0000000", "00:00:06.0000000"]
        );
        assert!(plan.entries.iter().all(|e| e.game_time == ABSENT));
        assert!(plan.entries.iter().all(|e| e.game_seconds.is_none()));
    }

    #[test]
    fn test_single_missing_middle_segment_is_repaired() {
        let store = store(
            Times::new(10.5, 9.0),
            vec![
                vec![record("3", 2.0, 2.0)],
                vec![],
                vec![record("3", 4.0, 3.0)],
            ],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::Success);
        let middle = plan.entries[1].real_seconds.unwrap() - 2.0;
        assert!((middle - 4.5).abs() < 1e-7);
        assert_eq!(plan.entries[1].game_time, "00:00:06.0000000");
        assert_eq!(plan.entries[2].real_time, "00:00:10.5000000");
    }

    #[test]
    fn test_zero_record_counts_as_missing() {
        let store = store(
            Times::new(10.0, 0.0),
            vec![vec![record("3", 0.0, 0.0)], vec![record("3", 4.0, 0.0)]],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::Success);
        assert_eq!(plan.entries[0].real_time, "00:00:06.0000000");
        assert_eq!(plan.entries[1].real_time, "00:00:10.0000000");
    }

    #[test]
    fn test_gaps_before_derived_last_segment_warn() {
        let store = store(
            Times::new(10.0, 0.0),
            vec![vec![], vec![record("3", 4.0, 0.0)], vec![]],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::SuccessWithWarning);
        assert_eq!(plan.entries[0].real_time, ABSENT);
        assert_eq!(plan.entries[0].real_seconds, None);
        assert_eq!(plan.entries[1].real_time, "00:00:04.0000000");
        assert_eq!(plan.entries[2].real_time, "00:00:10.0000000");
    }

    #[test]
    fn test_two_gaps_with_recorded_last_segment_are_irreconcilable() {
        let store = store(
            Times::new(10.0, 0.0),
            vec![vec![], vec![], vec![record("3", 4.0, 0.0)]],
        );
        let err = reconstruct(&store, "3").unwrap_err();
        assert!(matches!(
            err,
            RestoreError::IrreconcilableRun { ref attempt, missing: 2 } if attempt == "3"
        ));
    }

    #[test]
    fn test_placeholders_that_reconcile_keep_success() {
        // Known edge case: the empty first segment contributes nothing, the
        // recorded ones already sum to the total, and no warning is raised.
        let store = store(
            Times::new(5.0, 0.0),
            vec![
                vec![],
                vec![],
                vec![record("3", 2.0, 0.0)],
                vec![record("3", 3.0, 0.0)],
            ],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.status, PlanStatus::Success);
        assert_eq!(plan.entries[0].real_time, ABSENT);
        assert_eq!(plan.entries[1].real_time, ABSENT);
    }

    #[test]
    fn test_unknown_attempt_is_invalid() {
        let store = store(Times::new(1.0, 0.0), vec![vec![]]);
        assert!(matches!(
            reconstruct(&store, "99"),
            Err(RestoreError::InvalidAttempt(id)) if id == "99"
        ));
    }

    #[test]
    fn test_negative_repair_is_reported() {
        let store = store(
            Times::new(5.0, 0.0),
            vec![vec![record("3", 4.0, 0.0)], vec![], vec![record("3", 3.0, 0.0)]],
        );
        let plan = reconstruct(&store, "3").unwrap();

        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(plan.diagnostics[0].kind, DiagnosticKind::NegativeSegmentTime);
    }
}
