//! Readers and writers: coordinate text, coordinate files, and GeoJSON layers.

pub mod coords;
pub mod file;
pub mod geojson;
