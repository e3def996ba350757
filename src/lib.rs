//! `emltext` — batch converter from `.eml` messages to plain-text reports.
//!
//! This crate provides the decoding pipeline (RFC 2047 header decoding and
//! the MIME tree walk), the fixed-layout report formatter, and the batch
//! driver used by the CLI.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
