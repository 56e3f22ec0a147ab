//! Structural validation and record extraction
//!
//! One pass over the document, in document order. Each structural check that
//! fails aborts with its own [`RestoreError`] variant; bad individual time
//! values only produce diagnostics.

use lssr_common::timecode::{self, TimecodeIssue, ABSENT};
use lssr_common::DocumentTree;
use tracing::{debug, info};

use crate::error::{RestoreError, Result};
use crate::store::{Attempt, Diagnostic, DiagnosticKind, RecordStore, TimeRecord, Times};

pub const ATTEMPT_HISTORY: &str = "AttemptHistory";
pub const ATTEMPT: &str = "Attempt";
pub const SEGMENTS: &str = "Segments";
pub const SEGMENT: &str = "Segment";
pub const SPLIT_TIMES: &str = "SplitTimes";
pub const SPLIT_TIME: &str = "SplitTime";
pub const TIME: &str = "Time";
pub const NAME: &str = "Name";
pub const REAL_TIME: &str = "RealTime";
pub const GAME_TIME: &str = "GameTime";

/// Validate the document and extract its records.
pub fn load<D: DocumentTree>(doc: &D) -> Result<RecordStore<D::Node>> {
    let mut store = RecordStore::default();
    let root = doc.root();

    let histories = doc.descendants_by_tag(root, ATTEMPT_HISTORY);
    if histories.len() != 1 {
        return Err(RestoreError::AttemptHistoryCount(histories.len()));
    }

    // Only attempts that finished carry child data and a nonzero total
    for attempt in doc.descendants_by_tag(histories[0], ATTEMPT) {
        if !doc.has_content(attempt) {
            continue;
        }
        let id = match doc.attribute(attempt, "id").map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                debug!("Skipping <Attempt> without id");
                continue;
            }
        };

        let context = format!("attempt {}", id);
        let times = read_times(doc, attempt, &context, &mut store);
        if !times.is_recorded() {
            continue;
        }
        if !store.push_attempt(Attempt { id, times }) {
            store.push_diagnostic(Diagnostic::new(DiagnosticKind::DuplicateAttempt, context));
        }
    }

    if store.attempts().is_empty() {
        return Err(RestoreError::NoRestorableRuns);
    }

    let segment_list = doc
        .descendants_by_tag(root, SEGMENTS)
        .first()
        .copied()
        .ok_or(RestoreError::SegmentsMissing)?;

    let segments = doc.descendants_by_tag(segment_list, SEGMENT);
    if segments.is_empty() {
        return Err(RestoreError::NoSegments);
    }

    for (position, &segment) in segments.iter().enumerate() {
        let containers = doc.descendants_by_tag(segment, SPLIT_TIMES);
        if containers.len() != 1 {
            return Err(RestoreError::SplitTimesCount {
                segment: position,
                found: containers.len(),
            });
        }

        let name = doc
            .descendant_text(segment, NAME)
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| ABSENT.to_string());

        let mut records = Vec::new();
        for time in doc.descendants_by_tag(segment, TIME) {
            let attempt_id = match doc.attribute(time, "id").map(str::trim) {
                Some(id) if !id.is_empty() => id,
                _ => continue,
            };
            // History of attempts that never finished is dropped here
            if store.find_attempt(attempt_id).is_none() {
                continue;
            }
            let attempt_id = attempt_id.to_string();
            let context = format!("segment '{}', attempt {}", name, attempt_id);
            let times = read_times(doc, time, &context, &mut store);
            records.push(TimeRecord { attempt_id, times });
        }

        store.push_segment(name, containers[0], records);
    }

    info!(
        "Loaded {} restorable runs across {} segments",
        store.attempts().len(),
        store.segments().len()
    );
    Ok(store)
}

fn read_times<D: DocumentTree>(
    doc: &D,
    node: D::Node,
    context: &str,
    store: &mut RecordStore<D::Node>,
) -> Times {
    Times::new(
        read_time(doc, node, REAL_TIME, context, store),
        read_time(doc, node, GAME_TIME, context, store),
    )
}

fn read_time<D: DocumentTree>(
    doc: &D,
    node: D::Node,
    tag: &str,
    context: &str,
    store: &mut RecordStore<D::Node>,
) -> f64 {
    let Some(text) = doc.descendant_text(node, tag) else {
        return 0.0;
    };

    let parsed = timecode::parse(&text);
    if let Some(issue) = parsed.issue {
        let kind = match issue {
            TimecodeIssue::Invalid => DiagnosticKind::MalformedTimecode,
            TimecodeIssue::MissingFraction => DiagnosticKind::TimecodeWithoutFraction,
        };
        store.push_diagnostic(Diagnostic::new(
            kind,
            format!("{} {} '{}'", context, tag, text.trim()),
        ));
    }
    parsed.seconds
}
