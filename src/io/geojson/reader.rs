use std::io::Read;

use geojson::GeoJson;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::crs::Crs;
use crate::datatypes::GeometryType;
use crate::error::{CoordGeomError, Result};
use crate::io::geojson::SCHEMA_MEMBER;
use crate::layer::{Feature, Layer};
use crate::schema::Schema;

#[derive(Deserialize)]
struct SchemaMember {
    geometry_type: GeometryType,
    fields: Schema,
}

/// Read a layer from GeoJSON.
///
/// `fallback_name` names the layer when the collection has no `name` member. Collections
/// written by other tools are accepted: the geometry type then comes from the first
/// feature and the schema is inferred from the properties.
pub fn read_layer<R: Read>(mut reader: R, fallback_name: &str) -> Result<Layer> {
    let mut geojson_str = String::new();
    reader.read_to_string(&mut geojson_str)?;
    read_layer_str(&geojson_str, fallback_name)
}

/// Read a layer from a GeoJSON string. See [`read_layer`].
pub fn read_layer_str(geojson_str: &str, fallback_name: &str) -> Result<Layer> {
    let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
        return Err(CoordGeomError::InvalidLayer(
            "expected a FeatureCollection".to_string(),
        ));
    };
    let foreign_members = collection.foreign_members.unwrap_or_default();

    let mut features = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.into_iter().enumerate() {
        let geometry = feature.geometry.ok_or_else(|| {
            CoordGeomError::InvalidLayer(format!("feature {idx} has no geometry"))
        })?;
        let fid = match &feature.id {
            Some(geojson::feature::Id::Number(number)) => number.as_u64(),
            _ => None,
        };
        features.push(Feature {
            fid: fid.unwrap_or(idx as u64 + 1),
            geometry: geo::Geometry::try_from(geometry.value)?,
            properties: feature.properties.unwrap_or_default(),
        });
    }

    let name = foreign_members
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(fallback_name)
        .to_string();
    let crs = foreign_members
        .get("crs")
        .and_then(Crs::from_geojson_member)
        .unwrap_or_default();

    let (geometry_type, schema) = match foreign_members.get(SCHEMA_MEMBER) {
        Some(member) => {
            let member = SchemaMember::deserialize(member)?;
            (member.geometry_type, member.fields)
        }
        None => {
            debug!(layer = %name, "no schema member, inferring from features");
            let geometry_type = features
                .first()
                .and_then(|feature| GeometryType::of_geometry(&feature.geometry))
                .ok_or_else(|| {
                    CoordGeomError::InvalidLayer(format!(
                        "cannot determine the geometry type of layer '{name}'"
                    ))
                })?;
            let schema = Schema::infer(features.iter().map(|feature| &feature.properties));
            (geometry_type, schema)
        }
    };

    Ok(Layer::new(name, geometry_type, crs, schema).with_features(features))
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::io::geojson::write_layer;
    use crate::schema::{FieldDef, FieldType};

    #[test]
    fn read_foreign_collection() {
        let input = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                    "properties": {"name": "road", "lanes": 2}
                },
                {
                    "type": "Feature",
                    "id": 10,
                    "geometry": {"type": "LineString", "coordinates": [[1, 1], [2, 0]]},
                    "properties": {"name": "path", "lanes": null}
                }
            ]
        }"#;
        let layer = read_layer(Cursor::new(input), "roads").unwrap();
        assert_eq!(layer.name(), "roads");
        assert_eq!(layer.geometry_type(), GeometryType::LineString);
        assert_eq!(layer.crs(), &Crs::wgs84());
        assert_eq!(layer.schema().names(), ["name", "lanes"]);
        assert_eq!(
            layer.schema().get("lanes").unwrap().field_type,
            FieldType::Integer
        );
        assert_eq!(layer.features()[0].fid, 1);
        assert_eq!(layer.features()[1].fid, 10);
    }

    #[test]
    fn written_layer_reads_back() {
        let schema = Schema::try_from_fields([
            FieldDef::new("id", FieldType::String).with_length(50),
            FieldDef::new("surveyed", FieldType::Date),
        ])
        .unwrap();
        let layer = Layer::new("empty", GeometryType::Polygon, Crs::web_mercator(), schema);

        let mut buffer = Vec::new();
        write_layer(&layer, &mut buffer).unwrap();
        let back = read_layer(buffer.as_slice(), "ignored").unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn empty_foreign_collection_is_rejected() {
        let input = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(
            read_layer_str(input, "x"),
            Err(CoordGeomError::InvalidLayer(_))
        ));
    }

    #[test]
    fn not_a_collection() {
        let input = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        assert!(matches!(
            read_layer_str(input, "x"),
            Err(CoordGeomError::InvalidLayer(_))
        ));
        assert!(matches!(
            read_layer_str("{", "x"),
            Err(CoordGeomError::GeoJsonError(_))
        ));
    }
}
