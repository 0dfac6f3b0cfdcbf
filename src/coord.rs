//! The coordinate record produced by the parser.

use std::borrow::Cow;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One parsed input line: an optional identifier and an X/Y pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordRecord {
    /// Identifier taken from the leading token of the line, if the input has an ID column.
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    /// 1-based line number in the source text.
    pub line: usize,
}

impl CoordRecord {
    pub fn new(x: f64, y: f64, line: usize) -> Self {
        Self {
            id: None,
            x,
            y,
            line,
        }
    }

    pub fn with_id(id: impl Into<String>, x: f64, y: f64, line: usize) -> Self {
        Self {
            id: Some(id.into()),
            x,
            y,
            line,
        }
    }

    /// The identifier, or `P<line>` when the input had none.
    pub fn label(&self) -> Cow<'_, str> {
        match &self.id {
            Some(id) => Cow::Borrowed(id),
            None => Cow::Owned(format!("P{}", self.line)),
        }
    }

    pub fn coord(&self) -> geo::Coord {
        geo::coord! { x: self.x, y: self.y }
    }
}

impl Display for CoordRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ({}, {})", self.label(), self.x, self.y)
    }
}

impl From<&CoordRecord> for geo::Coord {
    fn from(value: &CoordRecord) -> Self {
        value.coord()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn label_falls_back_to_line_number() {
        assert_eq!(CoordRecord::new(1., 2., 7).label(), "P7");
        assert_eq!(CoordRecord::with_id("B12", 1., 2., 7).label(), "B12");
    }

    #[test]
    fn display() {
        let record = CoordRecord::with_id("P1", 100.5, 200.3, 1);
        assert_eq!(record.to_string(), "P1: (100.5, 200.3)");
    }
}
