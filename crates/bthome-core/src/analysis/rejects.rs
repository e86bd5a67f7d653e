use std::collections::HashMap;

use crate::RejectSummary;
use crate::protocols::bthome::{FrameError, Truncated};

pub(crate) const REJECT_SERVICE_ID: &str = "BH-SERVICE-ID";
pub(crate) const REJECT_SHORT_FRAME: &str = "BH-SHORT-FRAME";
pub(crate) const REJECT_VERSION: &str = "BH-VERSION";
pub(crate) const REJECT_TRUNCATED: &str = "BH-TRUNCATED";

const MAX_EXAMPLES: usize = 3;

#[derive(Debug)]
pub(crate) struct RejectStats {
    severity: &'static str,
    message: &'static str,
    count: u64,
    examples: Vec<String>,
}

pub(crate) fn add_frame_error(
    stats: &mut HashMap<&'static str, RejectStats>,
    address: &str,
    err: &FrameError,
) {
    let (id, message) = match err {
        FrameError::ServiceIdMismatch { .. } => (
            REJECT_SERVICE_ID,
            "frame does not carry the BTHome service identifier",
        ),
        FrameError::ShortFrame { .. } => (
            REJECT_SHORT_FRAME,
            "frame too short for the advertisement envelope",
        ),
        FrameError::UnsupportedVersion { .. } => {
            (REJECT_VERSION, "unsupported advertisement version")
        }
    };
    add(stats, id, "error", message, format!("{address}: {err}"));
}

pub(crate) fn add_truncation(
    stats: &mut HashMap<&'static str, RejectStats>,
    address: &str,
    cut: Truncated,
) {
    add(
        stats,
        REJECT_TRUNCATED,
        "warning",
        "payload ended mid-record or used an unknown object id",
        format!("{address}: {cut}"),
    );
}

fn add(
    stats: &mut HashMap<&'static str, RejectStats>,
    id: &'static str,
    severity: &'static str,
    message: &'static str,
    example: String,
) {
    let entry = stats.entry(id).or_insert_with(|| RejectStats {
        severity,
        message,
        count: 0,
        examples: Vec::new(),
    });
    entry.count += 1;
    if entry.examples.len() < MAX_EXAMPLES {
        entry.examples.push(example);
    }
}

pub(crate) fn build_reject_summaries(
    stats: HashMap<&'static str, RejectStats>,
) -> Vec<RejectSummary> {
    let mut rejects: Vec<RejectSummary> = stats
        .into_iter()
        .map(|(id, stats)| RejectSummary {
            id: id.to_string(),
            severity: stats.severity.to_string(),
            message: stats.message.to_string(),
            count: stats.count,
            examples: stats.examples,
        })
        .collect();

    rejects.sort_by(|a, b| a.id.cmp(&b.id));
    rejects
}
