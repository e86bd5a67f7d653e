//! Advertisement log source.
//!
//! This module provides a `FrameSource` backed by `.btlog` files: one
//! hex-encoded gateway broadcast per line (6 address bytes immediately
//! followed by the frame bytes), optionally preceded by an `@`-prefixed
//! capture timestamp. It handles file I/O, hex decoding and address
//! formatting, emitting raw frame events for the analysis pipeline.

pub mod error;
pub mod layout;
pub mod parser;

pub use parser::HexLogSource;
