use std::io::Write;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::{json, Value};

use crate::error::Result;
use crate::io::geojson::SCHEMA_MEMBER;
use crate::layer::Layer;

/// Convert a layer into a GeoJSON feature collection with its metadata as foreign members.
pub fn layer_to_feature_collection(layer: &Layer) -> FeatureCollection {
    let features = layer
        .features()
        .iter()
        .map(|feature| Feature {
            bbox: None,
            geometry: Some(Geometry::new((&feature.geometry).into())),
            id: Some(Id::Number(feature.fid.into())),
            properties: Some(feature.properties.clone()),
            foreign_members: None,
        })
        .collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), Value::String(layer.name().to_string()));
    foreign_members.insert("crs".to_string(), layer.crs().to_geojson_member());
    foreign_members.insert(
        SCHEMA_MEMBER.to_string(),
        json!({
            "geometry_type": layer.geometry_type(),
            "fields": layer.schema(),
        }),
    );

    FeatureCollection {
        bbox: layer
            .extent()
            .map(|rect| vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]),
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Write a layer as pretty-printed GeoJSON.
///
/// Note: Does not reproject to WGS84 for you
pub fn write_layer<W: Write>(layer: &Layer, mut writer: W) -> Result<()> {
    let collection = layer_to_feature_collection(layer);
    serde_json::to_writer_pretty(&mut writer, &collection)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
