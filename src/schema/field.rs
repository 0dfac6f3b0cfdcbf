use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{CoordGeomError, Result};
use crate::io::coords::parse_number;
use crate::schema::validate_field_name;

/// The storage type of an attribute field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Double,
    Date,
    DateTime,
    Boolean,
}

impl FieldType {
    /// Look up a type by name. Unknown names fall back to [`FieldType::String`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "integer64" => FieldType::Integer,
            "double" | "real" | "float" => FieldType::Double,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "boolean" | "bool" => FieldType::Boolean,
            _ => FieldType::String,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Integer => "Integer",
            FieldType::Double => "Double",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
            FieldType::Boolean => "Boolean",
        }
    }

    /// The type that best holds a JSON value, or `None` for `null`.
    pub fn infer(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(FieldType::Boolean),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(FieldType::Integer)
            }
            Value::Number(_) => Some(FieldType::Double),
            _ => Some(FieldType::String),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Definition of one attribute field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Value written when a feature is created, as text. Empty means no value.
    #[serde(default)]
    pub default: String,

    pub length: u32,

    pub precision: u32,
}

impl FieldDef {
    /// A field with the usual length and precision for its type and no default.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let length = match field_type {
            FieldType::String => 255,
            _ => 10,
        };
        let precision = match field_type {
            FieldType::Double => 3,
            _ => 0,
        };
        Self {
            name: name.into(),
            field_type,
            default: String::new(),
            length,
            precision,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Parse `name[:type][=default]`, e.g. `elevation:Double=0`.
    ///
    /// ```
    /// use coordgeom::schema::{FieldDef, FieldType};
    ///
    /// let field = FieldDef::parse_spec("elevation:Double=12.5").unwrap();
    /// assert_eq!(field.name, "elevation");
    /// assert_eq!(field.field_type, FieldType::Double);
    /// assert_eq!(field.default, "12.5");
    /// ```
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let (head, default) = match spec.split_once('=') {
            Some((head, default)) => (head, default),
            None => (spec, ""),
        };
        let (name, field_type) = match head.split_once(':') {
            Some((name, type_name)) => (name.trim(), FieldType::from_name(type_name)),
            None => (head.trim(), FieldType::String),
        };
        validate_field_name(name, &[])?;

        let field = Self::new(name, field_type).with_default(default.trim());
        // Reject defaults that can never be stored.
        field.default_value()?;
        Ok(field)
    }

    /// Convert text into a JSON value of this field's type. Empty text is `null`.
    pub fn coerce(&self, value: &str) -> Result<Value> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Value::Null);
        }

        let invalid = |reason: &'static str| CoordGeomError::InvalidFieldValue {
            field: self.name.clone(),
            value: value.to_string(),
            reason: reason.into(),
        };

        let coerced = match self.field_type {
            FieldType::String => Value::String(value.to_string()),
            FieldType::Integer => i64::from_str(value)
                .map(Value::from)
                .map_err(|_| invalid("expected an integer"))?,
            FieldType::Double => parse_number(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| invalid("expected a number"))?,
            FieldType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
                .map_err(|_| invalid("expected a date as YYYY-MM-DD"))?,
            FieldType::DateTime => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
                .map(|datetime| Value::String(datetime.format("%Y-%m-%dT%H:%M:%S").to_string()))
                .map_err(|_| invalid("expected a datetime as YYYY-MM-DDTHH:MM:SS"))?,
            FieldType::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Value::Bool(true),
                "false" | "no" | "0" => Value::Bool(false),
                _ => return Err(invalid("expected true or false")),
            },
        };
        Ok(coerced)
    }

    /// The default value converted to this field's type.
    pub fn default_value(&self) -> Result<Value> {
        self.coerce(&self.default)
    }
}
