//! Core library for BTHome v2 advertisement decoding and log analysis.
//!
//! This crate implements the offline analysis pipeline used by the CLI:
//! frame sources feed the analysis layer, which drives the advertisement
//! decoder (layout/registry/reader/parser) and aggregates results into a
//! deterministic report. Decoding is byte-oriented and side-effect free;
//! all I/O is isolated in `source` modules. Wire conventions are captured
//! in readers so parsers stay minimal.
//!
//! Invariants:
//! - Report outputs are deterministic and stable across runs.
//! - Each frame decodes independently; no state is kept across frames.
//! - The payload scan always terminates and never reads past the payload:
//!   an unknown object id or a cut-off value stops the whole scan and is
//!   reported alongside the measurements decoded before it.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur d'analyse hors ligne : sources -> analyse ->
//! décodeur d'annonces (layout/registry/reader/parser) -> rapport
//! déterministe. Les E/S restent dans `source`; chaque trame est décodée
//! indépendamment et le balayage s'arrête proprement sur un id inconnu ou
//! une valeur tronquée.
//!
//! # Examples
//! ```
//! use bthome_core::decode_frame;
//!
//! // Service id 0xFCD2, version 2, then Battery 100 %.
//! let frame = [0xD2, 0xFC, 0x40, 0x01, 0x64];
//! let decoded = decode_frame(&frame)?;
//! assert_eq!(decoded.measurements[0].to_string(), "Battery: 100%");
//! # Ok::<(), bthome_core::FrameError>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_log_file, analyze_source};
pub use protocols::bthome::registry::{FieldDescriptor, lookup};
pub use protocols::bthome::{
    DecodedPayload, FrameError, Measurement, Truncated, decode_frame, decode_payload,
    validate_frame,
};
pub use source::{FrameEvent, FrameSource, HexLogSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the log carries no capture times.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use bthome_core::make_stub_report;
///
/// let report = make_stub_report("gateway.btlog", 123);
/// assert_eq!(report.report_version, bthome_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input log metadata.
    pub input: InputInfo,

    /// Optional log summary (absent only in stub reports).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_summary: Option<LogSummary>,
    /// Per-device summaries in stable order.
    pub devices: Vec<DeviceSummary>,
    /// Rejected-frame summaries in stable order.
    pub rejects: Vec<RejectSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "bthome").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input log metadata embedded in reports.
///
/// # Examples
/// ```
/// use bthome_core::InputInfo;
///
/// let input = InputInfo {
///     path: "gateway.btlog".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic log summary (capture times may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSummary {
    /// Total advertisement count observed in the log.
    pub frames_total: u64,
    /// Frames rejected by envelope validation.
    pub frames_rejected: u64,
    /// Measurements decoded across all frames.
    pub measurements_total: u64,
    /// RFC3339 timestamp of the first capture (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last capture (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Per-device summary.
///
/// # Examples
/// ```
/// use bthome_core::DeviceSummary;
///
/// let device = DeviceSummary {
///     address: "a4:c1:38:2f:6e:01".to_string(),
///     frames: 2,
///     measurements: Vec::new(),
/// };
/// assert_eq!(device.frames, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Device address exactly as the source formatted it.
    pub address: String,
    /// Validated frames seen for this device.
    pub frames: u64,
    /// Last value and sample count per field, sorted by label.
    pub measurements: Vec<MeasurementSummary>,
}

/// Last observed value for one field of one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementSummary {
    /// Field label (e.g., "Temperature").
    pub label: String,
    /// Last value rendered with the field's decimal precision.
    pub last_value: String,
    /// Field unit (possibly empty).
    pub unit: String,
    /// Number of readings aggregated for this field.
    pub samples: u64,
}

/// Summary of one kind of rejected or truncated frame.
///
/// # Examples
/// ```
/// use bthome_core::RejectSummary;
///
/// let reject = RejectSummary {
///     id: "BH-SHORT-FRAME".to_string(),
///     severity: "error".to_string(),
///     message: "frame too short for the advertisement envelope".to_string(),
///     count: 1,
///     examples: Vec::new(),
/// };
/// assert_eq!(reject.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectSummary {
    /// Stable reject identifier (e.g., `BH-TRUNCATED`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    /// Human-readable message explaining the reject.
    pub message: String,
    /// Number of frames aggregated into this reject.
    pub count: u64,
    /// At most three example contexts, formatted as `address: detail`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use bthome_core::make_stub_report;
///
/// let report = make_stub_report("gateway.btlog", 123);
/// assert!(report.devices.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "bthome".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        log_summary: None,
        devices: vec![],
        rejects: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("gateway.btlog", 1);
        report.log_summary = Some(LogSummary {
            frames_total: 1,
            frames_rejected: 0,
            measurements_total: 2,
            time_start: None,
            time_end: None,
        });
        report.devices = vec![DeviceSummary {
            address: "a4:c1:38:2f:6e:01".to_string(),
            frames: 1,
            measurements: vec![MeasurementSummary {
                label: "Battery".to_string(),
                last_value: "100".to_string(),
                unit: "%".to_string(),
                samples: 1,
            }],
        }];
        report.rejects = vec![RejectSummary {
            id: "BH-TRUNCATED".to_string(),
            severity: "warning".to_string(),
            message: "payload ended mid-record or used an unknown object id".to_string(),
            count: 1,
            examples: vec![],
        }];

        let value = serde_json::to_value(&report).expect("report json");
        let summary = value.get("log_summary").expect("log_summary");
        assert!(summary.get("time_start").is_none());
        assert!(summary.get("time_end").is_none());

        let reject = &value["rejects"][0];
        assert!(reject.get("examples").is_none());

        let device = &value["devices"][0];
        assert_eq!(device["measurements"][0]["last_value"], "100");
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = make_stub_report("gateway.btlog", 42);
        let json = serde_json::to_string(&report).expect("serialize");
        let parsed: Report = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.input.bytes, 42);
        assert_eq!(parsed.tool.name, "bthome");
    }
}
