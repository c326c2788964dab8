//! CSV task-spec loader.
//!
//! # CSV format
//!
//! One row per task.  Empty cells mean "not set"; which parameters a kind
//! needs is checked later by [`build_task`][crate::build_task].
//!
//! ```csv
//! name,kind,priority,max_distance,interact_range,threshold,resume_at,timeout_ms,targets
//! rest,rest,1,,,0.35,0.9,30000,
//! party,party_wait,3,20,,,,,
//! gather,approach,5,60,4,,,2500,mining|herb
//! route,follow_route,10,,,,,,
//! ```
//!
//! **`targets`** is a `|`-separated list of classifications: `companion`,
//! `friendly`, `neutral`, `hostile`, `mining`, `herb`.
//!
//! Rows are returned in file order, which is the registration order the
//! scheduler uses to break priority ties.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use pt_behavior::Priority;
use pt_spatial::Classification;

use crate::{TaskConfigError, TaskConfigResult, TaskKind, TaskParams, TaskSpec};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SpecRecord {
    name:           String,
    kind:           String,
    priority:       u32,
    max_distance:   Option<f32>,
    interact_range: Option<f32>,
    threshold:      Option<f32>,
    resume_at:      Option<f32>,
    timeout_ms:     Option<u64>,
    targets:        Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load task specs from a CSV file.
pub fn load_specs_csv(path: &Path) -> TaskConfigResult<Vec<TaskSpec>> {
    let file = std::fs::File::open(path)?;
    load_specs_reader(file)
}

/// Like [`load_specs_csv`] but accepts any `Read` source.
pub fn load_specs_reader<R: Read>(reader: R) -> TaskConfigResult<Vec<TaskSpec>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<SpecRecord>()
        .map(|row| {
            let row = row.map_err(|e| TaskConfigError::Parse(e.to_string()))?;
            to_spec(row)
        })
        .collect()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_spec(row: SpecRecord) -> TaskConfigResult<TaskSpec> {
    let kind: TaskKind = row.kind.parse()?;
    let targets = match row.targets.as_deref() {
        None => Vec::new(),
        Some(list) => parse_targets(list)?,
    };
    Ok(TaskSpec {
        name: row.name,
        kind,
        priority: Priority(row.priority),
        params: TaskParams {
            max_distance:   row.max_distance,
            interact_range: row.interact_range,
            threshold:      row.threshold,
            resume_at:      row.resume_at,
            timeout_ms:     row.timeout_ms,
            targets,
        },
    })
}

fn parse_targets(list: &str) -> TaskConfigResult<Vec<Classification>> {
    list.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Classification>().map_err(TaskConfigError::from))
        .collect()
}
