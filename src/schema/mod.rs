//! Attribute fields of a layer: definitions, defaults per geometry type, and validation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::datatypes::{GeometryFamily, GeometryType};
use crate::error::{CoordGeomError, Result};

pub use field::{FieldDef, FieldType};

mod field;

/// Longest accepted field name.
pub const MAX_FIELD_NAME_LEN: usize = 63;

/// Names that also clash with differently-cased existing fields.
const RESERVED_NAMES: [&str; 5] = ["id", "fid", "geom", "geometry", "shape"];

/// Check a field name against naming rules and the names already in use.
pub fn validate_field_name(name: &str, existing: &[&str]) -> Result<()> {
    let invalid = |reason: String| Err(CoordGeomError::InvalidFieldName(reason));

    if name.trim().is_empty() {
        return invalid("Field name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_FIELD_NAME_LEN {
        return invalid(format!(
            "Field name too long (max {MAX_FIELD_NAME_LEN} characters)"
        ));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return invalid(format!(
            "'{name}': field name can only contain letters, numbers, and underscores"
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return invalid(format!("'{name}': field name cannot start with a number"));
    }

    let lower = name.to_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str())
        && existing.iter().any(|other| other.to_lowercase() == lower)
    {
        return invalid(format!("'{name}' is already in use"));
    }
    if existing.contains(&name) {
        return invalid(format!("Field '{name}' already exists"));
    }
    Ok(())
}

/// The fields offered for a new layer of the given geometry type.
pub fn default_fields(geometry_type: GeometryType) -> Vec<FieldDef> {
    let mut fields = vec![
        FieldDef::new("id", FieldType::String).with_length(50),
        FieldDef::new("name", FieldType::String).with_length(100),
        FieldDef::new("description", FieldType::String).with_length(255),
    ];
    let measure = |name: &str, precision| {
        FieldDef::new(name, FieldType::Double)
            .with_precision(precision)
            .with_default("0")
    };
    match geometry_type.family() {
        GeometryFamily::Point => fields.push(measure("elevation", 2)),
        GeometryFamily::Line => fields.push(measure("length", 3)),
        GeometryFamily::Polygon => {
            fields.push(measure("area", 3));
            fields.push(measure("perimeter", 3));
        }
    }
    fields
}

/// Ordered set of field definitions, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FieldDef>", into = "Vec<FieldDef>")]
pub struct Schema {
    fields: IndexMap<String, FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema, validating every name against the ones before it.
    pub fn try_from_fields(fields: impl IntoIterator<Item = FieldDef>) -> Result<Self> {
        let mut schema = Self::new();
        for field in fields {
            schema.push(field)?;
        }
        Ok(schema)
    }

    /// Add a field after validating its name.
    pub fn push(&mut self, field: FieldDef) -> Result<()> {
        validate_field_name(&field.name, &self.names())?;
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// Add the fields of `other` that this schema lacks, keeping their order. Returns how many
    /// fields were added.
    pub fn merge(&mut self, other: &Schema) -> usize {
        let mut added = 0;
        for field in other.iter() {
            if !self.fields.contains_key(&field.name) {
                self.fields.insert(field.name.clone(), field.clone());
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Infer a schema from feature properties, for layers written without schema metadata.
    ///
    /// A field's type is taken from its first non-null value. Fields that only ever hold
    /// `null` become strings.
    pub fn infer<'a>(properties: impl IntoIterator<Item = &'a Map<String, Value>>) -> Self {
        let mut types: IndexMap<String, Option<FieldType>> = IndexMap::new();
        for map in properties {
            for (name, value) in map {
                let entry = types.entry(name.clone()).or_insert(None);
                if entry.is_none() {
                    *entry = FieldType::infer(value);
                }
            }
        }

        let fields = types
            .into_iter()
            .map(|(name, field_type)| {
                let field = FieldDef::new(name.clone(), field_type.unwrap_or_default());
                (name, field)
            })
            .collect();
        Self { fields }
    }
}

impl From<Vec<FieldDef>> for Schema {
    fn from(value: Vec<FieldDef>) -> Self {
        Self {
            fields: value
                .into_iter()
                .map(|field| (field.name.clone(), field))
                .collect(),
        }
    }
}

impl From<Schema> for Vec<FieldDef> {
    fn from(value: Schema) -> Self {
        value.fields.into_values().collect()
    }
}
