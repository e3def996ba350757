//! MIME tree walk: body text accumulation and attachment collection.

use mail_parser::{Message, MessagePart, MimeHeaders, PartType};

use crate::config::{BadCharsetPolicy, DecodeConfig, MissingCharsetPolicy};
use crate::model::attachment::Attachment;
use crate::parser::header;

/// Walk the part tree of a parsed message in pre-order document order.
///
/// `multipart/*` parts are containers: never a content source, only their
/// children are visited. Every other part is a leaf classified by filename:
/// a declared filename makes it an attachment (raw transfer-decoded bytes,
/// never charset-decoded), anything else is body text appended to the
/// accumulator. An embedded `message/rfc822` without a filename is descended
/// into; with a filename it is a forwarded-message attachment. Traversal
/// order fixes both the body concatenation order and the attachment list
/// order.
pub fn walk(msg: &Message<'_>, opts: &DecodeConfig) -> (String, Vec<Attachment>) {
    let mut body = String::new();
    let mut attachments = Vec::new();
    walk_part(msg, 0, &mut body, &mut attachments, opts);
    (body, attachments)
}

fn walk_part(
    msg: &Message<'_>,
    part_id: usize,
    body: &mut String,
    attachments: &mut Vec<Attachment>,
    opts: &DecodeConfig,
) {
    let Some(part) = msg.parts.get(part_id) else {
        return;
    };

    match &part.body {
        PartType::Multipart(children) => {
            for &child in children {
                walk_part(msg, child, body, attachments, opts);
            }
        }
        // An unnamed embedded message is treated as a container; one with a
        // declared filename stays a leaf and is recorded as an attachment.
        PartType::Message(nested) if part.attachment_name().is_none() => {
            walk_part(nested, 0, body, attachments, opts);
        }
        _ => visit_leaf(part, body, attachments, opts),
    }
}

/// Classify a leaf and fold it into the accumulated result.
fn visit_leaf(
    part: &MessagePart<'_>,
    body: &mut String,
    attachments: &mut Vec<Attachment>,
    opts: &DecodeConfig,
) {
    if let Some(name) = part.attachment_name() {
        attachments.push(Attachment {
            name: name.to_string(),
            data: part.contents().to_vec(),
        });
        return;
    }

    let charset = declared_charset(part);
    match &part.body {
        // mail-parser has already applied the declared charset to text parts
        // (undecodable sequences become U+FFFD, matching the substitute
        // policy). The ignore policy drops leaves whose decode had errors,
        // and the missing-charset policy decides whether an unlabeled part
        // contributes at all.
        PartType::Text(text) | PartType::Html(text) => {
            if charset.is_none() && opts.missing_charset == MissingCharsetPolicy::Drop {
                return;
            }
            if opts.charset_errors == BadCharsetPolicy::Ignore && part.is_encoding_problem {
                return;
            }
            body.push_str(text);
        }
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => match charset {
            Some(label) => body.push_str(&header::decode_charset(label, bytes, opts.charset_errors)),
            None => {
                if opts.missing_charset == MissingCharsetPolicy::Substitute {
                    body.push_str(&String::from_utf8_lossy(bytes));
                }
            }
        },
        // Containers are handled by the caller
        PartType::Multipart(_) | PartType::Message(_) => {}
    }
}

/// The `charset` attribute of the part's `Content-Type`, if declared.
fn declared_charset<'a>(part: &'a MessagePart<'_>) -> Option<&'a str> {
    part.content_type().and_then(|ct| ct.attribute("charset"))
}
