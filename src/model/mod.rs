//! Core data model for decoded messages and their attachments.

pub mod attachment;
pub mod message;
