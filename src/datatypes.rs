use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoordGeomError;

/// The geometry type of a layer or of the features built from coordinates.
///
/// Only [`Point`][Self::Point], [`LineString`][Self::LineString] and
/// [`Polygon`][Self::Polygon] can be built from a single coordinate list. The multi variants
/// appear as the type of existing layers, which accept single geometries of the same
/// [family][GeometryFamily].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

/// Point, line, or polygon, regardless of single or multi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
}

impl GeometryType {
    pub fn family(&self) -> GeometryFamily {
        match self {
            GeometryType::Point | GeometryType::MultiPoint => GeometryFamily::Point,
            GeometryType::LineString | GeometryType::MultiLineString => GeometryFamily::Line,
            GeometryType::Polygon | GeometryType::MultiPolygon => GeometryFamily::Polygon,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            GeometryType::MultiPoint | GeometryType::MultiLineString | GeometryType::MultiPolygon
        )
    }

    /// Minimum number of coordinate records needed to build one geometry of this type.
    pub fn min_coords(&self) -> usize {
        match self.family() {
            GeometryFamily::Point => 1,
            GeometryFamily::Line => 2,
            GeometryFamily::Polygon => 3,
        }
    }

    /// The multi type of the same family.
    pub fn to_multi(&self) -> GeometryType {
        match self.family() {
            GeometryFamily::Point => GeometryType::MultiPoint,
            GeometryFamily::Line => GeometryType::MultiLineString,
            GeometryFamily::Polygon => GeometryType::MultiPolygon,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }

    /// The type of a [`geo::Geometry`], if it is one of the supported variants.
    pub fn of_geometry(geometry: &geo::Geometry) -> Option<Self> {
        match geometry {
            geo::Geometry::Point(_) => Some(GeometryType::Point),
            geo::Geometry::LineString(_) => Some(GeometryType::LineString),
            geo::Geometry::Polygon(_) => Some(GeometryType::Polygon),
            geo::Geometry::MultiPoint(_) => Some(GeometryType::MultiPoint),
            geo::Geometry::MultiLineString(_) => Some(GeometryType::MultiLineString),
            geo::Geometry::MultiPolygon(_) => Some(GeometryType::MultiPolygon),
            _ => None,
        }
    }
}

impl Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeometryType {
    type Err = CoordGeomError;

    /// Case-insensitive; `Line` is accepted as an alias of `LineString`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let geometry_type = match s.trim().to_ascii_lowercase().as_str() {
            "point" => GeometryType::Point,
            "line" | "linestring" => GeometryType::LineString,
            "polygon" => GeometryType::Polygon,
            "multipoint" => GeometryType::MultiPoint,
            "multiline" | "multilinestring" => GeometryType::MultiLineString,
            "multipolygon" => GeometryType::MultiPolygon,
            _ => return Err(CoordGeomError::UnknownGeometryType(s.to_string())),
        };
        Ok(geometry_type)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(
            "linestring".parse::<GeometryType>().unwrap(),
            GeometryType::LineString
        );
        assert_eq!("Line".parse::<GeometryType>().unwrap(), GeometryType::LineString);
        assert_eq!(
            " MultiPolygon ".parse::<GeometryType>().unwrap(),
            GeometryType::MultiPolygon
        );
        assert!(matches!(
            "triangle".parse::<GeometryType>(),
            Err(CoordGeomError::UnknownGeometryType(_))
        ));
    }

    #[test]
    fn families() {
        assert_eq!(GeometryType::MultiPoint.family(), GeometryFamily::Point);
        assert_eq!(GeometryType::LineString.to_multi(), GeometryType::MultiLineString);
        assert!(!GeometryType::Polygon.is_multi());
        assert_eq!(GeometryType::Polygon.min_coords(), 3);
        assert_eq!(GeometryType::LineString.min_coords(), 2);
    }
}
