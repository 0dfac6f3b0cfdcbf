//! Layers: named collections of features with an attribute schema, and the stores
//! that hold them.

use geo::{coord, BoundingRect, Geometry, Rect};
use serde_json::{Map, Value};

use crate::crs::Crs;
use crate::datatypes::GeometryType;
use crate::schema::Schema;

pub use manager::{LayerManager, LayerSummary};
pub use store::{DirectoryStore, LayerStore, MemoryStore};

mod manager;
mod store;

/// A geometry with its attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Feature id, unique within its layer.
    pub fid: u64,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

/// A named set of features sharing one geometry type, CRS, and schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    geometry_type: GeometryType,
    crs: Crs,
    schema: Schema,
    features: Vec<Feature>,
}

impl Layer {
    /// An empty layer.
    pub fn new(
        name: impl Into<String>,
        geometry_type: GeometryType,
        crs: Crs,
        schema: Schema,
    ) -> Self {
        Self {
            name: name.into(),
            geometry_type,
            crs,
            schema,
            features: vec![],
        }
    }

    pub(crate) fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The id the next added feature gets.
    pub fn next_fid(&self) -> u64 {
        self.features
            .iter()
            .map(|feature| feature.fid)
            .max()
            .map_or(1, |fid| fid + 1)
    }

    pub(crate) fn extend(&mut self, features: impl IntoIterator<Item = Feature>) {
        self.features.extend(features);
    }

    /// Bounding rectangle of all features, or `None` for a layer without coordinates.
    pub fn extent(&self) -> Option<Rect> {
        self.features
            .iter()
            .filter_map(|feature| feature.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}

#[cfg(test)]
mod test {
    use geo::{point, Geometry};

    use super::*;
    use crate::test::linestring;

    fn feature(fid: u64, geometry: impl Into<Geometry>) -> Feature {
        Feature {
            fid,
            geometry: geometry.into(),
            properties: Map::new(),
        }
    }

    #[test]
    fn extent_covers_all_features() {
        let layer = Layer::new("lines", GeometryType::LineString, Crs::wgs84(), Schema::new())
            .with_features(vec![
                feature(1, linestring::ls0()),
                feature(2, linestring::ls1()),
            ]);
        let extent = layer.extent().unwrap();
        assert_eq!(extent.min(), coord! { x: 0., y: 1. });
        assert_eq!(extent.max(), coord! { x: 5., y: 6. });
    }

    #[test]
    fn empty_layer() {
        let layer = Layer::new("empty", GeometryType::Point, Crs::wgs84(), Schema::new());
        assert!(layer.extent().is_none());
        assert_eq!(layer.next_fid(), 1);
    }

    #[test]
    fn next_fid_after_gaps() {
        let layer = Layer::new("points", GeometryType::Point, Crs::wgs84(), Schema::new())
            .with_features(vec![
                feature(3, point!(x: 0., y: 0.)),
                feature(7, point!(x: 1., y: 1.)),
            ]);
        assert_eq!(layer.next_fid(), 8);
        assert_eq!(layer.len(), 2);
    }
}
