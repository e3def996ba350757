//! Header decoding: RFC 2047 encoded-words and date normalization.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

use crate::config::BadCharsetPolicy;

/// Decode a raw header value into readable text.
///
/// An absent header decodes to the empty string; this never fails. The value
/// is unfolded, then every RFC 2047 encoded-word in it is decoded with the
/// given charset-failure policy. Fragments that were never encoded are kept
/// verbatim, and no separator is inserted between decoded fragments.
pub fn decode_header(raw: Option<&str>, policy: BadCharsetPolicy) -> String {
    match raw {
        None => String::new(),
        Some(value) => decode_encoded_words(&unfold(value), policy),
    }
}

/// Join folded header lines into a single-line value.
fn unfold(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
///
/// Whitespace between two adjacent encoded words is elided (RFC 2047 §6.2),
/// so split multi-word values concatenate directly. A token that does not
/// parse as an encoded word is kept as literal text.
pub fn decode_encoded_words(input: &str, policy: BadCharsetPolicy) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_marker = &remaining[start + 2..];
        match split_encoded_word(after_marker) {
            Some(word) => {
                result.push_str(&decode_one_word(&word, policy));
                remaining = &after_marker[word.consumed..];
                last_was_encoded = true;
            }
            None => {
                result.push_str("=?");
                remaining = after_marker;
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

/// One encoded word, split into its three `?`-separated fields.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    payload: &'a str,
    /// Bytes consumed after the leading `=?`, including the closing `?=`.
    consumed: usize,
}

/// Split `charset?encoding?payload?=` out of the text following `=?`.
fn split_encoded_word(s: &str) -> Option<EncodedWord<'_>> {
    let charset_end = s.find('?')?;
    let rest = &s[charset_end + 1..];
    let encoding_end = rest.find('?')?;
    let payload = &rest[encoding_end + 1..];
    let payload_end = payload.find("?=")?;

    Some(EncodedWord {
        charset: &s[..charset_end],
        encoding: &rest[..encoding_end],
        payload: &payload[..payload_end],
        consumed: charset_end + 1 + encoding_end + 1 + payload_end + 2,
    })
}

/// Decode the payload of one encoded word.
fn decode_one_word(word: &EncodedWord<'_>, policy: BadCharsetPolicy) -> String {
    let bytes = match word.encoding.to_ascii_uppercase().as_str() {
        "B" => match decode_base64(word.payload) {
            Some(bytes) => bytes,
            None => return format!("=?{}?{}?{}?=", word.charset, word.encoding, word.payload),
        },
        "Q" => decode_q_encoding(word.payload),
        // Unknown encoding tag: keep the token as literal text
        _ => return format!("=?{}?{}?{}?=", word.charset, word.encoding, word.payload),
    };

    decode_charset(word.charset, &bytes, policy)
}

/// Decode bytes using a named charset, under the configured failure policy.
///
/// An empty or absent label means the text was tagged but unlabeled: decode
/// as UTF-8 (the RFC 2047 default for modern mail).
pub fn decode_charset(label: &str, bytes: &[u8], policy: BadCharsetPolicy) -> String {
    if policy == BadCharsetPolicy::ForceUtf8 {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let label = label.trim();
    let encoding = if label.is_empty() {
        encoding_rs::UTF_8
    } else {
        match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(encoding) => encoding,
            None => {
                warn!(charset = label, "Unknown charset");
                return match policy {
                    BadCharsetPolicy::Substitute => String::from_utf8_lossy(bytes).into_owned(),
                    BadCharsetPolicy::Ignore => String::new(),
                    BadCharsetPolicy::ForceUtf8 => unreachable!(),
                };
            }
        }
    };

    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors && policy == BadCharsetPolicy::Ignore {
        return String::new();
    }
    decoded.into_owned()
}

/// Standard base64, tolerating embedded whitespace. `None` on foreign bytes.
fn decode_base64(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;

    for &b in input.as_bytes() {
        if b.is_ascii_whitespace() || b == b'=' {
            continue;
        }
        let value = match b {
            b'A'..=b'Z' => b - b'A',
            b'a'..=b'z' => b - b'a' + 26,
            b'0'..=b'9' => b - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            _ => return None,
        };
        acc = (acc << 6) | u32::from(value);
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }

    Some(out)
}

/// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
fn decode_q_encoding(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'=');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

/// Parse an email date string in the common real-world formats.
///
/// RFC 2822 first, then RFC 3339, then a handful of broken variants with
/// day-of-week stripping and named-timezone substitution.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let no_dow = strip_day_of_week(trimmed);
    let with_offset_tz = replace_named_tz(&no_dow);

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M %z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];

    for candidate in [no_dow.as_str(), with_offset_tz.as_str()] {
        for fmt in &formats {
            if let Ok(dt) = DateTime::parse_from_str(candidate, fmt) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }

    warn!(date = trimmed, "Could not parse date");
    None
}

/// Strip a leading day-of-week prefix (e.g. "Thu, " or "Thu ").
fn strip_day_of_week(s: &str) -> String {
    let days = [
        "Mon,", "Tue,", "Wed,", "Thu,", "Fri,", "Sat,", "Sun,", "Mon ", "Tue ", "Wed ", "Thu ",
        "Fri ", "Sat ", "Sun ",
    ];
    for day in &days {
        if let Some(rest) = s.strip_prefix(day) {
            return rest.trim().to_string();
        }
    }
    s.to_string()
}

/// Replace a trailing well-known timezone abbreviation with its offset.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CET", "+0100"),
        ("CEST", "+0200"),
        ("JST", "+0900"),
    ];
    let mut result = s.to_string();
    for (name, offset) in &tzs {
        if result.ends_with(name) {
            let pos = result.len() - name.len();
            result.replace_range(pos.., offset);
            return result;
        }
    }
    result
}
