use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::source::{FrameEvent, FrameSource, HexLogSource, SourceError};
use crate::{DEFAULT_GENERATED_AT, LogSummary, Report, make_stub_report};

mod devices;
mod rejects;

use devices::{DeviceStats, add_device_frame, build_device_summaries};
use rejects::{RejectStats, add_frame_error, add_truncation, build_reject_summaries};

use crate::protocols::bthome::decode_frame;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_log_file(path: &Path) -> Result<Report, AnalysisError> {
    let source = HexLogSource::open(path)?;
    analyze_source(path, source)
}

pub fn analyze_source<S: FrameSource>(
    path: &Path,
    mut source: S,
) -> Result<Report, AnalysisError> {
    let mut frames_total = 0u64;
    let mut frames_rejected = 0u64;
    let mut measurements_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut device_stats: HashMap<String, DeviceStats> = HashMap::new();
    let mut reject_stats: HashMap<&'static str, RejectStats> = HashMap::new();

    while let Some(FrameEvent { ts, address, frame }) = source.next_frame()? {
        frames_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        match decode_frame(&frame) {
            Ok(decoded) => {
                measurements_total += decoded.measurements.len() as u64;
                add_device_frame(&mut device_stats, &address, &decoded.measurements);
                if let Some(cut) = decoded.truncated {
                    add_truncation(&mut reject_stats, &address, cut);
                }
            }
            Err(err) => {
                frames_rejected += 1;
                add_frame_error(&mut reject_stats, &address, &err);
            }
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.log_summary = Some(LogSummary {
        frames_total,
        frames_rejected,
        measurements_total,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .log_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.devices = build_device_summaries(device_stats);
    report.rejects = build_reject_summaries(reject_stats);
    Ok(report)
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    match first {
        None => *first = Some(ts),
        Some(existing) => {
            if ts < *existing {
                *first = Some(ts);
            }
        }
    }
    match last {
        None => *last = Some(ts),
        Some(existing) => {
            if ts > *existing {
                *last = Some(ts);
            }
        }
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{ts_to_rfc3339, update_ts_bounds};

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        update_ts_bounds(&mut first, &mut last, Some(20.0));
        update_ts_bounds(&mut first, &mut last, None);
        update_ts_bounds(&mut first, &mut last, Some(10.0));
        update_ts_bounds(&mut first, &mut last, Some(30.0));
        assert_eq!(first, Some(10.0));
        assert_eq!(last, Some(30.0));
    }

    #[test]
    fn whole_second_ts_formats_without_fraction() {
        assert_eq!(
            ts_to_rfc3339(Some(1706745600.0)).as_deref(),
            Some("2024-02-01T00:00:00Z")
        );
        assert_eq!(ts_to_rfc3339(None), None);
    }
}
