//! Tests for loading markup sources from disk.

use std::fs;
use std::path::PathBuf;

use bramble_common::source::{LoadError, SourceFile};

/// Write `content` to a uniquely named file in the temp directory.
fn temp_file(name: &str, content: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bramble-{}-{name}", std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_reads_content_and_location() {
    let path = temp_file("page.html", b"<p>hi</p>");
    let source = SourceFile::load(&path).unwrap();

    assert_eq!(source.content(), "<p>hi</p>");
    assert_eq!(source.location(), path.as_path());
    assert!(source.filename().ends_with("page.html"));

    fs::remove_file(path).unwrap();
}

#[test]
fn test_load_replaces_invalid_utf8() {
    let path = temp_file("latin1.html", b"caf\xe9");
    let source = SourceFile::load(&path).unwrap();

    assert_eq!(source.content(), "caf\u{fffd}");

    fs::remove_file(path).unwrap();
}

#[test]
fn test_load_missing_file() {
    let err = SourceFile::load("/definitely/not/here.html").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.html"));
}

#[test]
fn test_load_directory_is_rejected() {
    let err = SourceFile::load(std::env::temp_dir()).unwrap_err();
    assert!(matches!(err, LoadError::NotAFile { .. }));
}

#[test]
fn test_from_content() {
    let source = SourceFile::from_content("inline.html", "<b>x</b>");
    assert_eq!(source.filename(), "inline.html");
    assert_eq!(source.into_content(), "<b>x</b>");
}
