//! Per-file decode pipeline for `.eml` messages.

use std::path::Path;

use mail_parser::MessageParser;
use tracing::debug;

use crate::config::DecodeConfig;
use crate::error::{EmlError, Result};
use crate::model::message::ParsedMessage;
use crate::parser::{header, mime};

/// Parse a single `.eml` file into a fully-populated [`ParsedMessage`].
///
/// A missing file and an unparseable message structure are hard errors for
/// this file (never a partially-populated report); undecodable header or body
/// data degrades per the configured policies instead of failing.
pub fn parse_eml(path: impl AsRef<Path>, opts: &DecodeConfig) -> Result<ParsedMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EmlError::FileNotFound(path.to_path_buf())
        } else {
            EmlError::io(path, e)
        }
    })?;

    parse_message(&data, opts).ok_or_else(|| EmlError::Malformed(path.to_path_buf()))
}

/// Parse raw message bytes. `None` when the bytes are not a mail message.
pub fn parse_message(data: &[u8], opts: &DecodeConfig) -> Option<ParsedMessage> {
    let parser = MessageParser::default();
    let msg = parser.parse(data)?;

    let policy = opts.charset_errors;
    let subject = header::decode_header(msg.header_raw("Subject"), policy);
    let from_address = header::decode_header(msg.header_raw("From"), policy);
    let to_address = header::decode_header(msg.header_raw("To"), policy);
    let cc_address = header::decode_header(msg.header_raw("Cc"), policy);

    // Normalize to RFC 3339 when the date parses; keep the decoded raw text
    // otherwise. Either way a bad date never fails the message.
    let date_raw = header::decode_header(msg.header_raw("Date"), policy);
    let date = match header::parse_date(&date_raw) {
        Some(dt) => dt.to_rfc3339(),
        None => date_raw,
    };

    let (body, attachments) = mime::walk(&msg, opts);
    debug!(
        subject = %subject,
        body_len = body.len(),
        attachments = attachments.len(),
        "Decoded message"
    );

    Some(ParsedMessage {
        subject,
        from_address,
        to_address,
        cc_address,
        date,
        body,
        attachments,
    })
}
