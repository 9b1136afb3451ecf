//! BPE subword segmentation over compiled finite-state models.
//!
//! Given an input sequence of code units, the segmenter enumerates every
//! vocabulary match via a DFA walk, resolves conflicts by BPE merge
//! priority (lower token ids win), and reconstructs a contiguous,
//! non-overlapping cover of the whole input as `(id, start, end)`
//! triples. Positions without any match are reported under a
//! caller-chosen unknown id.
//!
//! # Architecture
//!
//! - [`limits`] -- hard input limits
//! - [`conf`] -- configuration binding and validation over a loaded model
//! - [`segment`] -- arc enumeration, priority cover and reconstruction

pub mod conf;
pub mod limits;
pub mod segment;

pub use conf::{ConfError, ModelSegmenter, SegmenterConf};
pub use segment::{BpeSegmenter, CodeUnit, Segment, SegmentError};
