//! Typed records extracted from a splits file
//!
//! The loader fills a [`RecordStore`] in one pass; after that everything in
//! it is read-only. Segment node handles point back into the document, which
//! owns the nodes.

use std::ops::{Add, AddAssign, Sub};

use lssr_common::timecode::round_ticks;

/// A (real-time, game-time) pair in seconds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Times {
    pub real: f64,
    pub game: f64,
}

impl Times {
    pub const ZERO: Times = Times {
        real: 0.0,
        game: 0.0,
    };

    pub fn new(real: f64, game: f64) -> Self {
        Self { real, game }
    }

    /// At least one axis was recorded. Zero on both axes reads as "no record".
    pub fn is_recorded(&self) -> bool {
        self.real != 0.0 || self.game != 0.0
    }

    /// Both axes rounded to timecode precision
    pub fn rounded(&self) -> Times {
        Times::new(round_ticks(self.real), round_ticks(self.game))
    }
}

impl Add for Times {
    type Output = Times;

    fn add(self, other: Times) -> Times {
        Times::new(self.real + other.real, self.game + other.game)
    }
}

impl AddAssign for Times {
    fn add_assign(&mut self, other: Times) {
        self.real += other.real;
        self.game += other.game;
    }
}

impl Sub for Times {
    type Output = Times;

    fn sub(self, other: Times) -> Times {
        Times::new(self.real - other.real, self.game - other.game)
    }
}

/// A finished run from the attempt history
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub id: String,
    /// Run totals
    pub times: Times,
}

/// Position of a segment in document order.
///
/// Only [`RecordStore`] hands these out, so any index obtained from a store
/// is in range for that store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentIndex(usize);

impl SegmentIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// One historical time for a segment, tagged with its attempt id
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRecord {
    pub attempt_id: String,
    /// Segment duration (not cumulative)
    pub times: Times,
}

/// One leg of the run
#[derive(Debug, Clone)]
pub struct Segment<N> {
    pub index: SegmentIndex,
    pub name: String,
    /// The segment's <SplitTimes> container
    pub split_times: N,
    /// History entries belonging to retained attempts, in document order
    pub records: Vec<TimeRecord>,
}

impl<N> Segment<N> {
    /// First history entry for the attempt, if any
    pub fn record_for(&self, attempt_id: &str) -> Option<&TimeRecord> {
        self.records.iter().find(|r| r.attempt_id == attempt_id)
    }
}

/// Kind of a non-fatal problem noticed while reading or planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Unparseable timecode, read as zero
    MalformedTimecode,
    /// `H:M:S` without fraction, accepted
    TimecodeWithoutFraction,
    /// Second attempt with an id already seen, ignored
    DuplicateAttempt,
    /// Reconstruction produced a negative segment duration
    NegativeSegmentTime,
}

/// Structured warning for the caller to render
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub context: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            DiagnosticKind::MalformedTimecode => "invalid timecode, treated as 0",
            DiagnosticKind::TimecodeWithoutFraction => "timecode without fractional seconds",
            DiagnosticKind::DuplicateAttempt => "duplicate attempt id ignored",
            DiagnosticKind::NegativeSegmentTime => "reconstructed segment time is negative",
        };
        write!(f, "{}: {}", what, self.context)
    }
}

/// Attempts, segments and their history, as read from one document
#[derive(Debug, Clone)]
pub struct RecordStore<N> {
    attempts: Vec<Attempt>,
    segments: Vec<Segment<N>>,
    diagnostics: Vec<Diagnostic>,
}

impl<N> Default for RecordStore<N> {
    fn default() -> Self {
        Self {
            attempts: Vec::new(),
            segments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<N> RecordStore<N> {
    /// Retained attempts in history order
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn find_attempt(&self, id: &str) -> Option<&Attempt> {
        self.attempts.iter().find(|a| a.id == id)
    }

    /// Segments in document order
    pub fn segments(&self) -> &[Segment<N>] {
        &self.segments
    }

    pub fn segment(&self, index: SegmentIndex) -> Option<&Segment<N>> {
        self.segments.get(index.0)
    }

    /// Index of the final segment, if there are any segments
    pub fn last_index(&self) -> Option<SegmentIndex> {
        self.segments.len().checked_sub(1).map(SegmentIndex)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add an attempt unless its id is already present. Returns false on a
    /// duplicate.
    pub(crate) fn push_attempt(&mut self, attempt: Attempt) -> bool {
        if self.find_attempt(&attempt.id).is_some() {
            return false;
        }
        self.attempts.push(attempt);
        true
    }

    /// Append a segment, assigning it the next index
    pub(crate) fn push_segment(
        &mut self,
        name: String,
        split_times: N,
        records: Vec<TimeRecord>,
    ) -> SegmentIndex {
        let index = SegmentIndex(self.segments.len());
        self.segments.push(Segment {
            index,
            name,
            split_times,
            records,
        });
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_arithmetic() {
        let mut sum = Times::ZERO;
        sum += Times::new(1.5, 1.0);
        sum += Times::new(2.0, 0.5);
        assert_eq!(sum, Times::new(3.5, 1.5));
        assert_eq!(Times::new(10.0, 8.0) - sum, Times::new(6.5, 6.5));
        assert_eq!(sum + Times::new(0.5, 0.5), Times::new(4.0, 2.0));
    }

    #[test]
    fn test_recorded_means_any_axis_nonzero() {
        assert!(!Times::ZERO.is_recorded());
        assert!(Times::new(0.0, 1.0).is_recorded());
        assert!(Times::new(1.0, 0.0).is_recorded());
    }

    #[test]
    fn test_duplicate_attempts_rejected() {
        let mut store: RecordStore<()> = RecordStore::default();
        let attempt = Attempt {
            id: "1".to_string(),
            times: Times::new(1.0, 1.0),
        };
        assert!(store.push_attempt(attempt.clone()));
        assert!(!store.push_attempt(attempt));
        assert_eq!(store.attempts().len(), 1);
    }

    #[test]
    fn test_segment_indices_follow_insertion_order() {
        let mut store: RecordStore<()> = RecordStore::default();
        assert_eq!(store.last_index(), None);

        let a = store.push_segment("A".into(), (), Vec::new());
        let b = store.push_segment("B".into(), (), Vec::new());
        assert_eq!(a.get(), 0);
        assert_eq!(b.get(), 1);
        assert_eq!(store.last_index(), Some(b));
        assert_eq!(store.segment(b).map(|s| s.name.as_str()), Some("B"));
    }

    #[test]
    fn test_record_for_returns_first_match() {
        let segment = Segment {
            index: SegmentIndex(0),
            name: "A".to_string(),
            split_times: (),
            records: vec![
                TimeRecord {
                    attempt_id: "2".into(),
                    times: Times::new(1.0, 0.0),
                },
                TimeRecord {
                    attempt_id: "2".into(),
                    times: Times::new(9.0, 0.0),
                },
            ],
        };
        assert_eq!(segment.record_for("2").map(|r| r.times.real), Some(1.0));
        assert!(segment.record_for("3").is_none());
    }
}
