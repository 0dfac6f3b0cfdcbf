//! Read coordinate text: one `X Y` or `ID X Y` pair per line.

pub use reader::{
    parse_text, validate_records, IdColumn, LineError, ParseOptions, ParseReport,
};
pub use separator::Separator;

pub(crate) use reader::{data_lines, parse_number};

mod reader;
mod separator;
