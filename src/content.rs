//! Text/binary classification and content capture
//!
//! A file is text when its first 1024 bytes are plain ASCII (allowing
//! newline, carriage return and tab). JSON files are parsed and re-serialized
//! with 4-space indentation before line splitting, so later diffs reflect
//! structural changes rather than formatting noise.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{WatchpostError, WatchpostResult};

/// Number of leading bytes probed for the text heuristic
const PROBE_LEN: usize = 1024;

/// Classified file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Readable text, captured as its logical line sequence
    Text(Vec<String>),
    /// Opaque binary data; content is not captured
    Binary,
}

impl FileContent {
    /// Line sequence for text content, `None` for binary
    pub fn into_lines(self) -> Option<Vec<String>> {
        match self {
            FileContent::Text(lines) => Some(lines),
            FileContent::Binary => None,
        }
    }
}

/// Classify a file as text or binary and capture its lines.
///
/// `.json` files are always attempted as structured text first, regardless
/// of the byte heuristic; a parse failure is an error, not a binary verdict.
pub fn classify(path: &Path) -> WatchpostResult<FileContent> {
    if path.extension().map(|e| e == "json").unwrap_or(false) {
        let raw = std::fs::read_to_string(path)?;
        let lines = pretty_json_lines(path, &raw)?;
        debug!("classified {} as JSON text", path.display());
        return Ok(FileContent::Text(lines));
    }

    if !is_text_file(path)? {
        debug!("classified {} as binary", path.display());
        return Ok(FileContent::Binary);
    }

    let content = std::fs::read_to_string(path)?;
    debug!("classified {} as text", path.display());
    Ok(FileContent::Text(
        content.lines().map(str::to_string).collect(),
    ))
}

/// Dispatcher-facing wrapper: `Some(lines)` for text, `None` for binary.
///
/// Read failures are logged and mapped to empty content so a file that
/// cannot be read right now stays tracked (distinct from binary).
pub fn read_lines_or_empty(path: &Path) -> Option<Vec<String>> {
    match classify(path) {
        Ok(content) => content.into_lines(),
        Err(e) => {
            error!("failed to read file {}: {}", path.display(), e);
            Some(Vec::new())
        }
    }
}

/// Check whether the first 1024 bytes look like ASCII text
fn is_text_file(path: &Path) -> WatchpostResult<bool> {
    let mut file = File::open(path)?;
    let mut chunk = [0u8; PROBE_LEN];
    let mut filled = 0;
    // File::read may return short counts; fill the probe until EOF
    loop {
        let n = file.read(&mut chunk[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == PROBE_LEN {
            break;
        }
    }
    Ok(chunk[..filled]
        .iter()
        .all(|&b| b < 128 || b == b'\n' || b == b'\r' || b == b'\t'))
}

/// Parse JSON and re-serialize with 4-space indentation, split into lines
fn pretty_json_lines(path: &Path, raw: &str) -> WatchpostResult<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| WatchpostError::InvalidJson {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| WatchpostError::InvalidJson {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let text = String::from_utf8(buf).map_err(|e| WatchpostError::InvalidJson {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(text.lines().map(str::to_string).collect())
}
