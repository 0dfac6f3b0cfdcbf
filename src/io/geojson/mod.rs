//! Read and write layers as [GeoJSON](https://geojson.org/) feature collections.
//!
//! Layer metadata travels in foreign members of the feature collection: `name`, a named
//! `crs` object, and [`SCHEMA_MEMBER`] holding the geometry type and the field list.

pub use reader::{read_layer, read_layer_str};
pub use writer::{layer_to_feature_collection, write_layer};

mod reader;
mod writer;

/// Foreign member holding the geometry type and field definitions.
pub const SCHEMA_MEMBER: &str = "coordgeom:schema";
