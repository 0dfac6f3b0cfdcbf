use std::fmt::Display;

use tracing::{debug, warn};

use crate::coord::CoordRecord;
use crate::datatypes::GeometryType;
use crate::error::{CoordGeomError, Result};
use crate::io::coords::Separator;

/// Whether the first field of each line is an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdColumn {
    /// Decide from the first data line: more than two fields means an ID column.
    #[default]
    Auto,
    Present,
    Absent,
}

impl From<bool> for IdColumn {
    fn from(value: bool) -> Self {
        if value {
            IdColumn::Present
        } else {
            IdColumn::Absent
        }
    }
}

/// Options for [`parse_text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Field separator, or `None` to detect it from the first data line.
    pub separator: Option<Separator>,

    pub id_column: IdColumn,
}

impl ParseOptions {
    pub fn new(separator: Option<Separator>, id_column: IdColumn) -> Self {
        Self {
            separator,
            id_column,
        }
    }
}

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.reason)
    }
}

/// The result of parsing a block of coordinate text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub records: Vec<CoordRecord>,
    pub rejected: Vec<LineError>,
    /// The separator that was used, after detection.
    pub separator: Separator,
    /// Whether lines were read with a leading ID, after detection.
    pub has_id: bool,
}

impl ParseReport {
    pub(crate) fn empty() -> Self {
        Self {
            records: vec![],
            rejected: vec![],
            separator: Separator::Space,
            has_id: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fail with [`CoordGeomError::NoCoordinates`] when nothing was parsed.
    pub fn require_records(self) -> Result<Self> {
        if self.records.is_empty() {
            Err(CoordGeomError::NoCoordinates)
        } else {
            Ok(self)
        }
    }
}

/// Lines worth parsing: not blank and not a `#` comment. Yields 1-based line numbers.
pub(crate) fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Parse one numeric token. Only finite values are coordinates.
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    lexical_core::parse::<f64>(token.as_bytes())
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse coordinate text, one coordinate per line.
///
/// Blank lines and lines starting with `#` are skipped. Lines that do not parse are
/// collected in [`ParseReport::rejected`] and parsing continues with the next line.
///
/// ```
/// use coordgeom::io::coords::{parse_text, ParseOptions};
///
/// let report = parse_text("P1 100.5 200.3\nP2 150 250", &ParseOptions::default());
/// assert_eq!(report.records.len(), 2);
/// assert_eq!(report.records[0].id.as_deref(), Some("P1"));
/// assert_eq!(report.records[1].x, 150.0);
/// ```
pub fn parse_text(text: &str, options: &ParseOptions) -> ParseReport {
    let Some((_, first)) = data_lines(text).next() else {
        return ParseReport::empty();
    };

    let separator = options
        .separator
        .unwrap_or_else(|| Separator::detect(first));
    let has_id = match options.id_column {
        IdColumn::Present => true,
        IdColumn::Absent => false,
        IdColumn::Auto => separator.split(first).len() > 2,
    };
    debug!(%separator, has_id, "parsing coordinate text");

    let mut records = vec![];
    let mut rejected = vec![];
    for (line_no, line) in data_lines(text) {
        match parse_line(line, line_no, separator, has_id) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(line = line_no, "skipping coordinate line: {reason}");
                rejected.push(LineError {
                    line: line_no,
                    content: line.to_string(),
                    reason,
                });
            }
        }
    }

    ParseReport {
        records,
        rejected,
        separator,
        has_id,
    }
}

fn parse_line(
    line: &str,
    line_no: usize,
    separator: Separator,
    has_id: bool,
) -> std::result::Result<CoordRecord, String> {
    let fields = separator.split(line);
    let expected = if has_id { 3 } else { 2 };
    if fields.len() != expected {
        let layout = if has_id { "ID X Y" } else { "X Y" };
        return Err(format!(
            "Invalid format: expected {layout} separated by {separator}, got '{line}'"
        ));
    }

    let (id, x, y) = if has_id {
        (Some(fields[0]), fields[1], fields[2])
    } else {
        (None, fields[0], fields[1])
    };
    let x = parse_number(x).ok_or_else(|| format!("Invalid X value '{x}'"))?;
    let y = parse_number(y).ok_or_else(|| format!("Invalid Y value '{y}'"))?;

    Ok(CoordRecord {
        id: id.map(str::to_string),
        x,
        y,
        line: line_no,
    })
}

/// Check that there are enough records to build the geometry type.
pub fn validate_records(records: &[CoordRecord], geometry_type: GeometryType) -> Result<()> {
    if records.is_empty() {
        return Err(CoordGeomError::NoCoordinates);
    }

    let required = geometry_type.min_coords();
    if records.len() < required {
        return Err(CoordGeomError::InsufficientPoints {
            geometry_type,
            required,
            found: records.len(),
        });
    }
    Ok(())
}
