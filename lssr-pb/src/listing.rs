//! Fixed-width text tables for attempts and plans

use std::fmt::Write;

use lssr_common::timecode;

use crate::plan::Plan;
use crate::store::Attempt;

const COLUMN_WIDTH: usize = 17;

fn row(cells: [&str; 3]) -> String {
    format!(
        "{:<w$} {:<w$} {:<w$}",
        cells[0],
        cells[1],
        cells[2],
        w = COLUMN_WIDTH
    )
    .trim_end()
    .to_string()
}

fn table<'a>(headers: [&str; 3], rows: impl Iterator<Item = [&'a str; 3]>, count_text: &str) -> String {
    let mut out = row(headers);
    let mut count = 0usize;
    for cells in rows {
        out.push('\n');
        out.push_str(&row(cells));
        count += 1;
    }
    // Writing to a String cannot fail
    let _ = write!(out, "\n{} {}", count, count_text);
    out
}

/// Table of restorable attempts with their run totals
pub fn attempts_table(attempts: &[Attempt]) -> String {
    let formatted: Vec<[String; 3]> = attempts
        .iter()
        .map(|a| {
            [
                a.id.clone(),
                timecode::format(a.times.real),
                timecode::format(a.times.game),
            ]
        })
        .collect();
    table(
        ["ID", "RTA", "IGT"],
        formatted.iter().map(|r| [r[0].as_str(), r[1].as_str(), r[2].as_str()]),
        "restorable runs found.",
    )
}

/// Table of proposed Personal Best splits
pub fn plan_table(plan: Option<&Plan>) -> String {
    let entries = plan.map(|p| p.entries.as_slice()).unwrap_or_default();
    table(
        ["Segment", "RTA", "IGT"],
        entries
            .iter()
            .map(|e| [e.name.as_str(), e.real_time.as_str(), e.game_time.as_str()]),
        "changes proposed.",
    )
}
