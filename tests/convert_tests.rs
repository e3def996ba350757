//! Integration tests for the decode pipeline, report layout, and batch driver.

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;

use emltext::config::{CollisionPolicy, DecodeConfig, MissingCharsetPolicy};
use emltext::convert::{self, ConvertOptions};
use emltext::parser::eml::parse_eml;
use emltext::report;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

// ─── Decode pipeline ────────────────────────────────────────────────

#[test]
fn test_simple_message_fields() {
    let msg = parse_eml(fixture("simple.eml"), &DecodeConfig::default()).unwrap();
    assert_eq!(msg.subject, "Hello World");
    assert_eq!(msg.from_address, "User One <user1@example.com>");
    assert_eq!(msg.to_address, "alice@example.com");
    assert_eq!(msg.cc_address, "bob@example.com");
    assert!(msg.date.starts_with("2024-01-04T10:00:00"));
    assert_eq!(msg.body.trim_end(), "Hello");
    assert!(msg.attachments.is_empty());
}

#[test]
fn test_encoded_headers_and_qp_body() {
    let msg = parse_eml(fixture("encoded.eml"), &DecodeConfig::default()).unwrap();
    assert_eq!(msg.from_address, "José García <jose@example.com>");
    assert_eq!(msg.to_address, "山田太郎 <yamada@example.jp>");
    // Adjacent encoded words in different charsets concatenate directly
    assert_eq!(msg.subject, "café con leche");
    // +0900 normalizes to UTC
    assert!(msg.date.starts_with("2024-01-05T00:30:00"));
    assert_eq!(msg.body.trim_end(), "Buenos días");
}

#[test]
fn test_multipart_body_and_attachment() {
    let msg = parse_eml(fixture("multipart.eml"), &DecodeConfig::default()).unwrap();
    assert_eq!(msg.body.trim_end(), "Hi");
    assert_eq!(msg.attachments.len(), 1);
    assert_eq!(msg.attachments[0].name, "report.pdf");
    assert_eq!(msg.attachments[0].data, b"PDFDATA");
}

#[test]
fn test_unparseable_date_falls_back_to_raw() {
    let msg = parse_eml(fixture("nodate.eml"), &DecodeConfig::default()).unwrap();
    assert_eq!(msg.date, "broken date header");
    // No charset declared: the default policy keeps the content
    assert_eq!(msg.body.trim_end(), "no charset declared here");
}

#[test]
fn test_missing_charset_drop_policy() {
    let opts = DecodeConfig {
        missing_charset: MissingCharsetPolicy::Drop,
        ..Default::default()
    };
    let msg = parse_eml(fixture("nodate.eml"), &opts).unwrap();
    assert_eq!(msg.body, "");
}

// ─── Report layout and naming ───────────────────────────────────────

#[test]
fn test_report_layout_labels() {
    let msg = parse_eml(fixture("multipart.eml"), &DecodeConfig::default()).unwrap();
    let text = report::format_report(&msg);
    assert!(text.starts_with("DATE: 2024-01-08T14:00:00"));
    assert!(text.contains("\nFROM: Carol <carol@example.com>\n"));
    assert!(text.contains("\nTO: dave@example.com\n"));
    assert!(text.contains("\nSUBJECT: Monthly figures\n"));
    assert!(text.contains("\nBODY:\n"));
    assert!(text.ends_with("ATTACH_FILE_NAME:\nreport.pdf\n"));
    assert_eq!(text.matches("-----------------------\n").count(), 2);
}

#[test]
fn test_output_filename_sanitized() {
    // Subject "My/Report:2024" with an unparseable date: no prefix, invalid
    // characters stripped
    let msg = parse_eml(fixture("nodate.eml"), &DecodeConfig::default()).unwrap();
    assert_eq!(report::output_filename(&msg), "MyReport2024.txt");
}

// ─── Batch driver ───────────────────────────────────────────────────

#[test]
fn test_file_mode_writes_named_reports() {
    let out = assert_fs::TempDir::new().unwrap();
    let opts = ConvertOptions {
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    let summary = convert::convert_to_files(&[fixture("simple.eml")], &opts);
    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 0);

    out.child("20240104_100000_Hello World.txt")
        .assert(predicate::path::exists());
    out.child("20240104_100000_Hello World.txt")
        .assert(predicate::str::contains("SUBJECT: Hello World"));
}

#[test]
fn test_file_mode_append_on_duplicate() {
    let out = assert_fs::TempDir::new().unwrap();
    let opts = ConvertOptions {
        output_dir: out.path().to_path_buf(),
        collision: CollisionPolicy::Append,
        ..Default::default()
    };

    convert::convert_to_files(&[fixture("simple.eml"), fixture("simple.eml")], &opts);
    out.child("20240104_100000_Hello World.txt").assert(
        predicate::str::contains("SUBJECT: Hello World").count(2),
    );
}

#[test]
fn test_stream_mode_concatenates_in_order() {
    let opts = ConvertOptions::default();
    let mut out = Vec::new();
    let summary = convert::convert_to_stream(
        &[fixture("simple.eml"), fixture("multipart.eml")],
        &opts,
        &mut out,
    );
    assert_eq!(summary.converted, 2);

    let text = String::from_utf8(out).unwrap();
    let first = text.find("SUBJECT: Hello World").unwrap();
    let second = text.find("SUBJECT: Monthly figures").unwrap();
    assert!(first < second);
    assert_eq!(text.matches("ATTACH_FILE_NAME:").count(), 2);
}

#[test]
fn test_batch_continues_past_bad_file() {
    let out = assert_fs::TempDir::new().unwrap();
    let opts = ConvertOptions {
        output_dir: out.path().to_path_buf(),
        ..Default::default()
    };

    let summary = convert::convert_to_files(
        &[PathBuf::from("/nonexistent/ghost.eml"), fixture("simple.eml")],
        &opts,
    );
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.converted, 1);
    out.child("20240104_100000_Hello World.txt")
        .assert(predicate::path::exists());
}
