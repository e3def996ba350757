//! The decoded form of one input message.

use super::attachment::Attachment;

/// Everything extracted from a single `.eml` file.
///
/// Built once per input file by [`crate::parser::eml::parse_eml`], consumed
/// once by the report formatter, then discarded. Header fields are already
/// RFC 2047-decoded; an absent header is the empty string, never `None`.
#[derive(Debug, Clone, Default)]
pub struct ParsedMessage {
    /// Decoded `Subject:` header.
    pub subject: String,

    /// Decoded `From:` header.
    pub from_address: String,

    /// Decoded `To:` header.
    pub to_address: String,

    /// Decoded `Cc:` header.
    pub cc_address: String,

    /// Normalized `Date:` header.
    ///
    /// RFC 3339 when the header parsed, the decoded raw header text when it
    /// did not, empty when absent. An unparseable date never fails the file.
    pub date: String,

    /// Concatenation of every decoded body leaf, in document order.
    ///
    /// Multiple text segments (e.g. plain + nested alternatives) are
    /// concatenated, not deduplicated.
    pub body: String,

    /// Attachments in document order. Duplicate filenames are kept.
    pub attachments: Vec<Attachment>,
}

impl ParsedMessage {
    /// Comma-joined list of attachment filenames, as printed in the report.
    pub fn attachment_names(&self) -> String {
        self.attachments
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
