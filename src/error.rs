//! Defines [`CoordGeomError`], representing all errors returned by this crate.

use std::borrow::Cow;
use std::fmt::Debug;
use std::path::PathBuf;

use thiserror::Error;

use crate::datatypes::GeometryType;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoordGeomError {
    /// Parsing finished without a single usable coordinate.
    #[error("No valid coordinates found")]
    NoCoordinates,

    /// A new layer was requested without a name.
    #[error("Please enter a layer name")]
    MissingLayerName,

    /// An existing layer was requested without naming it.
    #[error("Please select a target layer")]
    MissingTargetLayer,

    /// Too few coordinates for the requested geometry type.
    #[error("{geometry_type} geometry requires at least {required} coordinate{}, got {found}", plural(.required))]
    InsufficientPoints {
        geometry_type: GeometryType,
        required: usize,
        found: usize,
    },

    /// A coordinate line or token could not be understood.
    #[error("Invalid coordinate format: {0}")]
    InvalidFormat(Cow<'static, str>),

    /// Polygon ring is open and auto-closing was disabled.
    #[error("Polygon ring is not closed: first and last coordinates differ")]
    UnclosedRing,

    /// No layer with this name exists in the store.
    #[error("Layer '{0}' not found")]
    UnknownLayer(String),

    /// A layer with this name already exists in the store.
    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    /// Geometry type does not match the target layer.
    #[error("Incompatible geometry type: layer '{layer}' holds {layer_type} geometries, got {requested}")]
    IncompatibleGeometry {
        layer: String,
        layer_type: GeometryType,
        requested: GeometryType,
    },

    /// Unknown geometry type name.
    #[error("Unknown geometry type: {0}")]
    UnknownGeometryType(String),

    /// Field name rejected by validation.
    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    /// Value that cannot be stored in a field of the given type.
    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: Cow<'static, str>,
    },

    /// Input file rejected before import.
    #[error("Invalid file {}: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },

    /// CRS identifier that is not `AUTHORITY:CODE`.
    #[error("CRS related error: {0}")]
    Crs(String),

    /// Layer file that does not describe a layer.
    #[error("Invalid layer file: {0}")]
    InvalidLayer(String),

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// [geojson::Error]
    #[error(transparent)]
    GeoJsonError(#[from] geojson::Error),
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, CoordGeomError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insufficient_points_message() {
        let err = CoordGeomError::InsufficientPoints {
            geometry_type: GeometryType::Polygon,
            required: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Polygon geometry requires at least 3 coordinates, got 2"
        );

        let err = CoordGeomError::InsufficientPoints {
            geometry_type: GeometryType::Point,
            required: 1,
            found: 0,
        };
        assert_eq!(
            err.to_string(),
            "Point geometry requires at least 1 coordinate, got 0"
        );
    }

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            CoordGeomError::NoCoordinates.to_string(),
            "No valid coordinates found"
        );
        assert_eq!(
            CoordGeomError::MissingLayerName.to_string(),
            "Please enter a layer name"
        );
    }
}
