//! Attachment data captured during the MIME tree walk.

/// A single attached file: its declared filename and the
/// content-transfer-decoded payload bytes.
///
/// The payload is the raw binary content (base64 / quoted-printable already
/// undone by the MIME parser). It is never charset-decoded — an attachment is
/// bytes, not text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename exactly as declared by the message. Duplicate names across
    /// attachments are preserved, not merged.
    pub name: String,

    /// Decoded payload bytes.
    pub data: Vec<u8>,
}
