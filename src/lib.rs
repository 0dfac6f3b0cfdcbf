//! Build point, line and polygon features from coordinate text.
//!
//! Coordinates are typed in or read from delimited text files, parsed into
//! [`CoordRecord`](coord::CoordRecord)s, validated against the chosen geometry type, turned
//! into [`geo`] geometries and appended to a named layer with an attribute schema. Layers
//! live in a [`LayerStore`](layer::LayerStore): in memory, or as GeoJSON files in a
//! directory.
//!
//! ```
//! use coordgeom::crs::Crs;
//! use coordgeom::datatypes::GeometryType;
//! use coordgeom::layer::{LayerManager, MemoryStore};
//! use coordgeom::workflow::{create, Input, Request, Target};
//!
//! let mut manager = LayerManager::new(MemoryStore::new());
//! let request = Request::new(
//!     Input::text("0 0\n10 0\n10 10\n0 10"),
//!     GeometryType::Polygon,
//!     Target::NewLayer { name: "parcel".to_string(), crs: Crs::wgs84() },
//! );
//! let outcome = create(&request, &mut manager).unwrap();
//! assert_eq!(outcome.features_created, 1);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod coord;
pub mod crs;
pub mod datatypes;
pub mod error;
pub mod geometry;
pub mod io;
pub mod layer;
pub mod logging;
pub mod schema;
#[cfg(test)]
pub(crate) mod test;
pub mod workflow;
