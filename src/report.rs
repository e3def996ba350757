//! Fixed-layout text reports and their output file naming.
//!
//! Pure formatting: all decoding has already happened by the time a
//! [`ParsedMessage`] reaches this module.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::DateTime;

use crate::config::CollisionPolicy;
use crate::error::{EmlError, Result};
use crate::model::message::ParsedMessage;

/// Characters not allowed in output filenames.
const INVALID_FILENAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Longest subject fragment kept in a generated filename.
const MAX_SUBJECT_CHARS: usize = 120;

/// Render the fixed-layout report for one message.
pub fn format_report(msg: &ParsedMessage) -> String {
    format!(
        "DATE: {}\n\
         FROM: {}\n\
         TO: {}\n\
         CC: {}\n\
         -----------------------\n\
         SUBJECT: {}\n\
         BODY:\n\
         {}\n\
         -----------------------\n\
         ATTACH_FILE_NAME:\n\
         {}\n",
        msg.date,
        msg.from_address,
        msg.to_address,
        msg.cc_address,
        msg.subject,
        msg.body,
        msg.attachment_names(),
    )
}

/// Strip filesystem-invalid characters (`\ / : * ? " < > |`) from a string.
pub fn sanitize_filename_part(s: &str) -> String {
    s.chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .collect()
}

/// Compute the output filename for a message.
///
/// `{YYYYMMDD_HHMMSS}_{subject}.txt` when the date was normalized,
/// `{subject}.txt` otherwise; the subject is sanitized and truncated, with a
/// `no_subject` fallback when nothing survives.
pub fn output_filename(msg: &ParsedMessage) -> String {
    let subject: String = sanitize_filename_part(&msg.subject)
        .chars()
        .take(MAX_SUBJECT_CHARS)
        .collect();
    let subject = if subject.is_empty() {
        "no_subject".to_string()
    } else {
        subject
    };

    match DateTime::parse_from_rfc3339(&msg.date) {
        Ok(dt) => format!("{}_{}.txt", dt.format("%Y%m%d_%H%M%S"), subject),
        Err(_) => format!("{subject}.txt"),
    }
}

/// Write a message's report under `output_dir`, honoring the collision policy.
///
/// Returns the path written. The directory is created if missing.
pub fn write_report(
    msg: &ParsedMessage,
    output_dir: &Path,
    collision: CollisionPolicy,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| EmlError::InvalidOutputDir {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let path = output_dir.join(output_filename(msg));
    let mut file = match collision {
        CollisionPolicy::Append => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path),
        CollisionPolicy::Overwrite => std::fs::File::create(&path),
    }
    .map_err(|e| EmlError::io(&path, e))?;

    file.write_all(format_report(msg).as_bytes())
        .map_err(|e| EmlError::io(&path, e))?;
    Ok(path)
}
