use thiserror::Error;

#[derive(Debug, Error)]
pub enum HexLogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("log parse error (line {line}): {message}")]
    Line { line: usize, message: String },
}
