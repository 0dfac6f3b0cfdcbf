//! Assemble point, line, and polygon geometries from coordinate records.

pub use builder::{
    build_features, build_multi_geometry, promote_to_multi, single_part, BuildOptions,
    FeatureDraft,
};

mod builder;
