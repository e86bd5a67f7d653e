//! Advertisement decoding modules.
//!
//! Each format follows a layered structure:
//! - `layout`: byte offsets and constants (source of truth)
//! - `registry`: the object-ID field table (per-field layout and scaling)
//! - `reader`: safe byte access and wire conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub mod bthome;
