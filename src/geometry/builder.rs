use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use tracing::debug;

use crate::coord::CoordRecord;
use crate::datatypes::{GeometryFamily, GeometryType};
use crate::error::{CoordGeomError, Result};
use crate::io::coords::validate_records;

/// Options for [`build_features`].
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    /// Append the first coordinate to an open polygon ring.
    pub auto_close: bool,
}

impl BuildOptions {
    pub fn new(auto_close: bool) -> Self {
        Self { auto_close }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A geometry waiting to be written into a layer, with the label of the record it
/// came from (the first record for lines and polygons).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraft {
    pub geometry: Geometry,
    pub label: String,
}

impl FeatureDraft {
    pub fn new(geometry: impl Into<Geometry>, label: impl Into<String>) -> Self {
        Self {
            geometry: geometry.into(),
            label: label.into(),
        }
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        GeometryType::of_geometry(&self.geometry)
    }
}

/// Build features from parsed coordinate records.
///
/// - Point: one feature per record.
/// - LineString: one feature using all records in order.
/// - Polygon: one feature whose exterior ring uses all records in order.
///
/// Multi types produce a single feature. MultiPoint holds one point per record;
/// MultiLineString and MultiPolygon hold one part built from all records.
///
/// ```
/// use coordgeom::coord::CoordRecord;
/// use coordgeom::datatypes::GeometryType;
/// use coordgeom::geometry::{build_features, BuildOptions};
///
/// let records = vec![
///     CoordRecord::new(0., 0., 1),
///     CoordRecord::new(4., 0., 2),
///     CoordRecord::new(4., 3., 3),
/// ];
/// let features =
///     build_features(&records, GeometryType::Polygon, &BuildOptions::default()).unwrap();
/// assert_eq!(features.len(), 1);
/// assert_eq!(features[0].label, "P1");
/// ```
pub fn build_features(
    records: &[CoordRecord],
    geometry_type: GeometryType,
    options: &BuildOptions,
) -> Result<Vec<FeatureDraft>> {
    validate_records(records, geometry_type)?;
    // validate_records guarantees at least one record.
    let label = records[0].label().into_owned();

    let drafts = match geometry_type {
        GeometryType::Point => records
            .iter()
            .map(|record| FeatureDraft::new(Point::from(record.coord()), record.label()))
            .collect(),
        GeometryType::LineString => vec![FeatureDraft::new(line_string(records), label)],
        GeometryType::Polygon => {
            vec![FeatureDraft::new(polygon(records, options.auto_close)?, label)]
        }
        GeometryType::MultiPoint => vec![FeatureDraft::new(multi_point([records]), label)],
        GeometryType::MultiLineString => vec![FeatureDraft::new(
            MultiLineString::new(vec![line_string(records)]),
            label,
        )],
        GeometryType::MultiPolygon => vec![FeatureDraft::new(
            MultiPolygon::new(vec![polygon(records, options.auto_close)?]),
            label,
        )],
    };
    debug!(%geometry_type, features = drafts.len(), "built features");
    Ok(drafts)
}

/// Build one multi-part geometry, one part per record group.
///
/// Polygon rings are always closed. Each part must have enough records for the
/// geometry family.
pub fn build_multi_geometry(
    parts: &[Vec<CoordRecord>],
    geometry_type: GeometryType,
) -> Result<Geometry> {
    if parts.iter().all(|part| part.is_empty()) {
        return Err(CoordGeomError::NoCoordinates);
    }
    for part in parts {
        validate_records(part, geometry_type)?;
    }

    let geometry = match geometry_type.family() {
        GeometryFamily::Point => Geometry::MultiPoint(multi_point(parts.iter().map(Vec::as_slice))),
        GeometryFamily::Line => Geometry::MultiLineString(MultiLineString::new(
            parts.iter().map(|part| line_string(part)).collect(),
        )),
        GeometryFamily::Polygon => Geometry::MultiPolygon(MultiPolygon::new(
            parts
                .iter()
                .map(|part| polygon(part, true))
                .collect::<Result<_>>()?,
        )),
    };
    Ok(geometry)
}

/// Wrap a single geometry into the multi geometry of its family. Multi geometries are
/// returned unchanged.
pub fn promote_to_multi(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::Point(point) => Geometry::MultiPoint(MultiPoint::new(vec![point])),
        Geometry::LineString(line) => Geometry::MultiLineString(MultiLineString::new(vec![line])),
        Geometry::Polygon(polygon) => Geometry::MultiPolygon(MultiPolygon::new(vec![polygon])),
        other => other,
    }
}

/// Unwrap a multi geometry with exactly one part. Single geometries are returned
/// unchanged; multi geometries with several parts give `None`.
pub fn single_part(geometry: Geometry) -> Option<Geometry> {
    let geometry = match geometry {
        Geometry::MultiPoint(MultiPoint(mut points)) if points.len() == 1 => {
            Geometry::Point(points.remove(0))
        }
        Geometry::MultiLineString(MultiLineString(mut lines)) if lines.len() == 1 => {
            Geometry::LineString(lines.remove(0))
        }
        Geometry::MultiPolygon(MultiPolygon(mut polygons)) if polygons.len() == 1 => {
            Geometry::Polygon(polygons.remove(0))
        }
        Geometry::MultiPoint(_) | Geometry::MultiLineString(_) | Geometry::MultiPolygon(_) => {
            return None
        }
        other => other,
    };
    Some(geometry)
}

fn multi_point<'a>(parts: impl IntoIterator<Item = &'a [CoordRecord]>) -> MultiPoint {
    parts
        .into_iter()
        .flatten()
        .map(|record| Point::from(record.coord()))
        .collect::<Vec<_>>()
        .into()
}

fn line_string(records: &[CoordRecord]) -> LineString {
    LineString::new(records.iter().map(Coord::from).collect())
}

fn polygon(records: &[CoordRecord], auto_close: bool) -> Result<Polygon> {
    let mut ring: Vec<Coord> = records.iter().map(Coord::from).collect();

    if ring.first() != ring.last() {
        if !auto_close {
            return Err(CoordGeomError::UnclosedRing);
        }
        ring.push(ring[0]);
    }

    // A closed ring needs three distinct positions plus the closing one.
    if ring.len() < 4 {
        return Err(CoordGeomError::InsufficientPoints {
            geometry_type: GeometryType::Polygon,
            required: 3,
            found: ring.len().saturating_sub(1),
        });
    }

    Ok(Polygon::new(LineString::new(ring), vec![]))
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use geo::{coord, Area};

    use super::*;
    use crate::test::records;

    #[test]
    fn points_one_feature_per_record() {
        let drafts =
            build_features(&records::triangle(), GeometryType::Point, &BuildOptions::default())
                .unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[1].label, "B2");
        assert_eq!(
            drafts[1].geometry,
            Geometry::Point(Point::new(4., 0.))
        );
    }

    #[test]
    fn line_string_uses_first_label() {
        let drafts = build_features(
            &records::triangle(),
            GeometryType::LineString,
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].label, "B1");
        let Geometry::LineString(line) = &drafts[0].geometry else {
            panic!("expected a line string");
        };
        assert_eq!(line.0.len(), 3);
        assert!(!line.is_closed());
    }

    #[test]
    fn polygon_auto_close() {
        let drafts = build_features(
            &records::triangle(),
            GeometryType::Polygon,
            &BuildOptions::default(),
        )
        .unwrap();
        let Geometry::Polygon(polygon) = &drafts[0].geometry else {
            panic!("expected a polygon");
        };
        let exterior = polygon.exterior();
        assert_eq!(exterior.0.len(), 4);
        assert_eq!(exterior.0[3], coord! { x: 0., y: 0. });
        assert_relative_eq!(polygon.unsigned_area(), 6.0);
    }

    #[test]
    fn polygon_already_closed_is_unchanged() {
        let mut closed = records::triangle();
        closed.push(CoordRecord::new(0., 0., 4));
        let drafts =
            build_features(&closed, GeometryType::Polygon, &BuildOptions::new(false)).unwrap();
        let Geometry::Polygon(polygon) = &drafts[0].geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn polygon_open_without_auto_close() {
        let err = build_features(
            &records::triangle(),
            GeometryType::Polygon,
            &BuildOptions::new(false),
        )
        .unwrap_err();
        assert!(matches!(err, CoordGeomError::UnclosedRing));
    }

    #[test]
    fn polygon_degenerate_ring() {
        let records = vec![
            CoordRecord::new(0., 0., 1),
            CoordRecord::new(1., 1., 2),
            CoordRecord::new(0., 0., 3),
        ];
        let err =
            build_features(&records, GeometryType::Polygon, &BuildOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CoordGeomError::InsufficientPoints { found: 2, .. }
        ));
    }

    #[test]
    fn insufficient_points() {
        let records = vec![CoordRecord::new(0., 0., 1)];
        let err = build_features(&records, GeometryType::LineString, &BuildOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CoordGeomError::InsufficientPoints {
                geometry_type: GeometryType::LineString,
                required: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn multi_geometries() {
        let parts = vec![records::triangle(), records::square()];

        let Geometry::MultiPoint(points) =
            build_multi_geometry(&parts, GeometryType::Point).unwrap()
        else {
            panic!("expected a multi point");
        };
        assert_eq!(points.0.len(), 7);

        let Geometry::MultiLineString(lines) =
            build_multi_geometry(&parts, GeometryType::LineString).unwrap()
        else {
            panic!("expected a multi line string");
        };
        assert_eq!(lines.0.len(), 2);

        let Geometry::MultiPolygon(polygons) =
            build_multi_geometry(&parts, GeometryType::MultiPolygon).unwrap()
        else {
            panic!("expected a multi polygon");
        };
        assert_eq!(polygons.0.len(), 2);
        assert!(polygons.0.iter().all(|p| p.exterior().is_closed()));
        assert_relative_eq!(polygons.unsigned_area(), 6.0 + 100.0);
    }

    #[test]
    fn single_part_unwraps_one_part() {
        let square = polygon(&records::square(), true).unwrap();
        assert_eq!(
            single_part(promote_to_multi(Geometry::Polygon(square.clone()))),
            Some(Geometry::Polygon(square.clone()))
        );
        assert_eq!(
            single_part(Geometry::Polygon(square.clone())),
            Some(Geometry::Polygon(square))
        );

        let parts = vec![records::triangle()];
        let points = build_multi_geometry(&parts, GeometryType::MultiPoint).unwrap();
        assert_eq!(single_part(points), None);
    }

    #[test]
    fn multi_part_too_small() {
        let parts = vec![records::triangle(), vec![CoordRecord::new(0., 0., 9)]];
        assert!(build_multi_geometry(&parts, GeometryType::LineString).is_err());
        assert!(matches!(
            build_multi_geometry(&[], GeometryType::Point),
            Err(CoordGeomError::NoCoordinates)
        ));
    }

    #[test]
    fn promote() {
        let point = Geometry::Point(Point::new(1., 2.));
        assert_eq!(
            promote_to_multi(point),
            Geometry::MultiPoint(MultiPoint::new(vec![Point::new(1., 2.)]))
        );
    }

    #[test]
    fn multi_type_builds_single_part() {
        let drafts = build_features(
            &records::square(),
            GeometryType::MultiPolygon,
            &BuildOptions::default(),
        )
        .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].geometry_type(), Some(GeometryType::MultiPolygon));
    }
}
