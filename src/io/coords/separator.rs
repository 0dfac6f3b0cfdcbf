use std::fmt::Display;
use std::str::FromStr;

use crate::error::CoordGeomError;

/// Field separator within one coordinate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// Any run of whitespace.
    Space,
    Comma,
    Tab,
    Semicolon,
}

impl Separator {
    /// Guess the separator from a sample line: comma, then tab, then space.
    pub fn detect(sample: &str) -> Self {
        if sample.contains(',') {
            Separator::Comma
        } else if sample.contains('\t') {
            Separator::Tab
        } else {
            Separator::Space
        }
    }

    /// Split a line into trimmed, non-empty fields.
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        let fields: Box<dyn Iterator<Item = &'a str>> = match self {
            Separator::Space => Box::new(line.split_whitespace()),
            Separator::Comma => Box::new(line.split(',')),
            Separator::Tab => Box::new(line.split('\t')),
            Separator::Semicolon => Box::new(line.split(';')),
        };
        fields
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Separator::Space => "space",
            Separator::Comma => "comma",
            Separator::Tab => "tab",
            Separator::Semicolon => "semicolon",
        }
    }
}

impl Display for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Separator {
    type Err = CoordGeomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            " " => return Ok(Separator::Space),
            "\t" => return Ok(Separator::Tab),
            _ => {}
        }
        let separator = match s.trim().to_ascii_lowercase().as_str() {
            "space" | "whitespace" => Separator::Space,
            "comma" | "," => Separator::Comma,
            "tab" | "\\t" => Separator::Tab,
            "semicolon" | ";" => Separator::Semicolon,
            other => {
                return Err(CoordGeomError::InvalidFormat(
                    format!("unknown separator '{other}'").into(),
                ))
            }
        };
        Ok(separator)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn detect() {
        assert_eq!(Separator::detect("100.5,200.3"), Separator::Comma);
        assert_eq!(Separator::detect("P1\t100.5\t200.3"), Separator::Tab);
        assert_eq!(Separator::detect("100.5 200.3"), Separator::Space);
        // Comma wins over tab.
        assert_eq!(Separator::detect("P1,\t1,2"), Separator::Comma);
    }

    #[test]
    fn split_trims_and_drops_empty_fields() {
        assert_eq!(
            Separator::Comma.split("P1, 100.5 ,200.3"),
            vec!["P1", "100.5", "200.3"]
        );
        assert_eq!(Separator::Space.split("  1   2 "), vec!["1", "2"]);
        assert_eq!(Separator::Tab.split("1\t\t2"), vec!["1", "2"]);
        assert_eq!(Separator::Semicolon.split("1;2;"), vec!["1", "2"]);
    }

    #[test]
    fn parse_names() {
        assert_eq!("Comma".parse::<Separator>().unwrap(), Separator::Comma);
        assert_eq!("\t".parse::<Separator>().unwrap(), Separator::Tab);
        assert_eq!(" ".parse::<Separator>().unwrap(), Separator::Space);
        assert!("pipe".parse::<Separator>().is_err());
    }
}
