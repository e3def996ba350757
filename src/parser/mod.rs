//! Message decoding: per-file pipeline, header decoding, and the MIME tree walk.

pub mod eml;
pub mod header;
pub mod mime;
