mod hexlog;

pub use hexlog::HexLogSource;

use thiserror::Error;

/// One advertisement pulled from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEvent {
    /// Capture time in seconds, when the log carries one.
    pub ts: Option<f64>,
    /// Pre-formatted device address, passed through to presentation.
    pub address: String,
    /// Raw frame bytes (envelope + payload).
    pub frame: Vec<u8>,
}

pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<FrameEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("log parse error: {0}")]
    Log(String),
}

impl From<hexlog::error::HexLogError> for SourceError {
    fn from(value: hexlog::error::HexLogError) -> Self {
        match value {
            hexlog::error::HexLogError::Io(err) => SourceError::Io(err),
            hexlog::error::HexLogError::Line { line, message } => {
                SourceError::Log(format!("line {line}: {message}"))
            }
        }
    }
}
