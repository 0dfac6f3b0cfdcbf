//! Import coordinates from `.txt`, `.csv`, `.dat` and `.xyz` files.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CoordGeomError, Result};
use crate::io::coords::{
    data_lines, parse_number, parse_text, IdColumn, ParseOptions, ParseReport, Separator,
};

/// File extensions accepted by [`validate_file`], lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["txt", "csv", "dat", "xyz"];

/// Default upper bound on the size of an imported file.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Number of leading data lines inspected by [`detect_format`].
const SAMPLE_LINES: usize = 10;

/// Separators tried by [`detect_format`], in order.
const CANDIDATES: [Separator; 4] = [
    Separator::Comma,
    Separator::Tab,
    Separator::Space,
    Separator::Semicolon,
];

/// Options for the file importer.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Files larger than this are rejected by validation.
    pub max_file_size: u64,
}

impl ImportOptions {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::new(MAX_FILE_SIZE)
    }
}

/// The layout of a coordinate file as guessed by [`detect_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedFormat {
    pub separator: Separator,
    pub has_id: bool,
    pub field_count: usize,
}

impl From<DetectedFormat> for ParseOptions {
    fn from(value: DetectedFormat) -> Self {
        ParseOptions::new(Some(value.separator), IdColumn::from(value.has_id))
    }
}

/// Guess separator and ID column from the first lines of a file.
///
/// The first sample line whose last two fields are numeric under one of the candidate
/// separators decides the format; lines that match no separator (such as a header row)
/// are skipped.
pub fn detect_format(content: &str) -> Option<DetectedFormat> {
    data_lines(content)
        .take(SAMPLE_LINES)
        .find_map(|(_, line)| detect_line(line))
}

fn detect_line(line: &str) -> Option<DetectedFormat> {
    CANDIDATES.iter().find_map(|separator| {
        let fields = separator.split(line);
        match fields.as_slice() {
            [.., x, y] if parse_number(x).is_some() && parse_number(y).is_some() => {
                Some(DetectedFormat {
                    separator: *separator,
                    has_id: fields.len() > 2,
                    field_count: fields.len(),
                })
            }
            _ => None,
        }
    })
}

/// Check that a file exists, is not empty, is not too large and has a supported extension.
pub fn validate_file(path: impl AsRef<Path>, options: &ImportOptions) -> Result<()> {
    let path = path.as_ref();
    let invalid = |reason: String| CoordGeomError::InvalidFile {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(path).map_err(|_| invalid("File does not exist".to_string()))?;
    if !metadata.is_file() {
        return Err(invalid("Not a regular file".to_string()));
    }
    if metadata.len() == 0 {
        return Err(invalid("File is empty".to_string()));
    }
    if metadata.len() > options.max_file_size {
        return Err(invalid(format!(
            "File is too large (>{} MB)",
            options.max_file_size / (1024 * 1024)
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid(format!("Unsupported file type: .{extension}")));
    }

    Ok(())
}

/// Read a text file as UTF-8, falling back to Latin-1.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            debug!(path = %path.display(), "file is not valid UTF-8, decoding as Latin-1");
            Ok(err.into_bytes().into_iter().map(char::from).collect())
        }
    }
}

/// Read a coordinate file, detect its format and parse it.
///
/// A file whose format cannot be detected yields an empty report.
pub fn import_file(path: impl AsRef<Path>) -> Result<ParseReport> {
    let path = path.as_ref();
    let content = read_text(path)?;

    let Some(format) = detect_format(&content) else {
        info!(path = %path.display(), "no coordinate layout detected");
        return Ok(ParseReport::empty());
    };
    debug!(path = %path.display(), ?format, "detected file format");

    let report = parse_text(&content, &format.into());
    info!(
        path = %path.display(),
        records = report.records.len(),
        rejected = report.rejected.len(),
        "imported coordinate file"
    );
    Ok(report)
}

/// The first `max_lines` lines of a file, followed by `...` when there are more.
pub fn preview_file(path: impl AsRef<Path>, max_lines: usize) -> Result<String> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut lines = reader.split(b'\n');

    let mut preview = Vec::with_capacity(max_lines + 1);
    for line in lines.by_ref().take(max_lines) {
        let line = line?;
        preview.push(String::from_utf8_lossy(&line).trim_end().to_string());
    }
    if lines.next().is_some() {
        preview.push("...".to_string());
    }
    Ok(preview.join("\n"))
}
