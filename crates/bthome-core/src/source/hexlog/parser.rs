use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::error::HexLogError;
use super::layout;
use crate::source::{FrameEvent, FrameSource, SourceError};

/// `FrameSource` over a `.btlog` advertisement log file.
pub struct HexLogSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl HexLogSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(SourceError::from)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl FrameSource for HexLogSource {
    fn next_frame(&mut self) -> Result<Option<FrameEvent>, SourceError> {
        for line in self.lines.by_ref() {
            let line = line.map_err(HexLogError::Io)?;
            self.line_no += 1;
            if let Some(event) = parse_line(&line, self.line_no)? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

/// Parse one log line into a frame event.
///
/// Returns `Ok(None)` for blank and comment lines.
fn parse_line(line: &str, line_no: usize) -> Result<Option<FrameEvent>, HexLogError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(layout::COMMENT_PREFIX) {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let mut token = tokens.next().unwrap_or_default();

    let ts = match token.strip_prefix(layout::TS_PREFIX) {
        Some(raw) => {
            let ts = raw.parse::<f64>().map_err(|err| HexLogError::Line {
                line: line_no,
                message: format!("invalid timestamp '{raw}': {err}"),
            })?;
            token = tokens.next().ok_or_else(|| HexLogError::Line {
                line: line_no,
                message: "missing advertisement after timestamp".to_string(),
            })?;
            Some(ts)
        }
        None => None,
    };

    if let Some(extra) = tokens.next() {
        return Err(HexLogError::Line {
            line: line_no,
            message: format!("unexpected trailing data '{extra}'"),
        });
    }

    let bytes = hex::decode(token).map_err(|err| HexLogError::Line {
        line: line_no,
        message: format!("invalid hex: {err}"),
    })?;
    if bytes.len() < layout::ADDRESS_LEN {
        return Err(HexLogError::Line {
            line: line_no,
            message: format!(
                "advertisement shorter than the {}-byte address",
                layout::ADDRESS_LEN
            ),
        });
    }

    let (address, frame) = bytes.split_at(layout::ADDRESS_LEN);
    Ok(Some(FrameEvent {
        ts,
        address: format_address(address),
        frame: frame.to_vec(),
    }))
}

/// Format address bytes as lowercase colon-separated pairs.
fn format_address(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(":")
}
