//! Write a plan into the document's Personal Best splits
//!
//! Each segment's `<SplitTimes>` ends up with one
//! `<SplitTime name="Personal Best">` holding only the planned values.
//! Re-applying the same plan produces the same tree.

use lssr_common::timecode;
use lssr_common::DocumentTree;
use tracing::debug;

use crate::error::{RestoreError, Result};
use crate::loader::{GAME_TIME, REAL_TIME, SPLIT_TIME};
use crate::plan::Plan;
use crate::store::RecordStore;

/// Reserved `name` of the canonical split entry
pub const PERSONAL_BEST: &str = "Personal Best";

/// Rewrite every segment's Personal Best entry from `plan`.
///
/// Fails with [`RestoreError::NoPlan`] if the plan is empty or does not
/// line up with the store's segments; the tree is untouched in that case.
pub fn apply_plan<D: DocumentTree>(
    doc: &mut D,
    store: &RecordStore<D::Node>,
    plan: &Plan,
) -> Result<()> {
    if plan.is_empty() || plan.entries.len() != store.segments().len() {
        return Err(RestoreError::NoPlan);
    }

    // Resolve every container first so a mismatch leaves the tree untouched
    let mut targets = Vec::with_capacity(plan.entries.len());
    for entry in &plan.entries {
        let segment = store.segment(entry.segment).ok_or(RestoreError::NoPlan)?;
        targets.push((segment.split_times, entry));
    }

    for (container, entry) in targets {
        let personal_best = personal_best_entry(doc, container);

        if is_positive(entry.real_seconds) {
            append_text_child(doc, personal_best, REAL_TIME, &entry.real_time);
        }
        if is_positive(entry.game_seconds) {
            append_text_child(doc, personal_best, GAME_TIME, &entry.game_time);
        }
        debug!(
            "Segment '{}': RTA {} IGT {}",
            entry.name, entry.real_time, entry.game_time
        );
    }
    Ok(())
}

/// Existing Personal Best entry emptied, or a new one attached
fn personal_best_entry<D: DocumentTree>(doc: &mut D, container: D::Node) -> D::Node {
    let existing = doc
        .descendants_by_tag(container, SPLIT_TIME)
        .into_iter()
        .find(|&split| doc.attribute(split, "name").map(str::trim) == Some(PERSONAL_BEST));

    match existing {
        Some(split) => {
            doc.remove_children(split);
            split
        }
        None => {
            let split = doc.create_element(SPLIT_TIME);
            doc.set_attribute(split, "name", PERSONAL_BEST);
            doc.append_child(container, split);
            split
        }
    }
}

/// Positive once rounded to timecode precision
fn is_positive(seconds: Option<f64>) -> bool {
    seconds.is_some_and(|s| timecode::round_ticks(s) > 0.0)
}

fn append_text_child<D: DocumentTree>(doc: &mut D, parent: D::Node, tag: &str, text: &str) {
    let child = doc.create_element(tag);
    doc.set_text(child, text);
    doc.append_child(parent, child);
}
