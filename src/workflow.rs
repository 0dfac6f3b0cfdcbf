//! Turn coordinate input into features of a new or existing layer.
//!
//! [`create`] runs the whole pipeline: check the request, parse the input, validate the
//! coordinate count, build the geometries and append them to the target layer. [`preview`]
//! parses the same input without touching any layer.

use std::fmt::{self, Display};
use std::path::PathBuf;

use geo::Rect;
use itertools::Itertools;
use tracing::{debug, info};

use crate::coord::CoordRecord;
use crate::crs::Crs;
use crate::datatypes::GeometryType;
use crate::error::{CoordGeomError, Result};
use crate::geometry::{build_features, BuildOptions};
use crate::io::coords::{parse_text, validate_records, LineError, ParseOptions, ParseReport};
use crate::io::file::{import_file, validate_file, ImportOptions};
use crate::layer::{LayerManager, LayerStore};
use crate::schema::{FieldDef, Schema};

/// Number of coordinates listed by [`preview`].
pub const PREVIEW_POINTS: usize = 5;

/// Where coordinates come from.
#[derive(Debug, Clone)]
pub enum Input {
    /// Coordinate text, parsed with the given options.
    Text { text: String, options: ParseOptions },
    /// A coordinate file whose layout is detected.
    File(PathBuf),
}

impl Input {
    /// Text with the separator and ID column detected.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            options: ParseOptions::default(),
        }
    }
}

/// Which layer receives the features.
#[derive(Debug, Clone)]
pub enum Target {
    NewLayer { name: String, crs: Crs },
    Existing(String),
}

/// Everything needed to create features from coordinates.
#[derive(Debug, Clone)]
pub struct Request {
    pub input: Input,
    pub geometry_type: GeometryType,
    pub target: Target,
    pub build: BuildOptions,
    /// Fields of a new layer, after the `id` field.
    pub fields: Vec<FieldDef>,
    /// Existing layer whose fields are added to those of a new layer.
    pub copy_fields_from: Option<String>,
    pub import: ImportOptions,
}

impl Request {
    pub fn new(input: Input, geometry_type: GeometryType, target: Target) -> Self {
        Self {
            input,
            geometry_type,
            target,
            build: BuildOptions::default(),
            fields: vec![],
            copy_fields_from: None,
            import: ImportOptions::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_build_options(mut self, build: BuildOptions) -> Self {
        self.build = build;
        self
    }

    pub fn with_import_options(mut self, import: ImportOptions) -> Self {
        self.import = import;
        self
    }

    pub fn copy_fields_from(mut self, layer: impl Into<String>) -> Self {
        self.copy_fields_from = Some(layer.into());
        self
    }
}

/// What [`create`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub layer: String,
    pub features_created: usize,
    /// Extent of the whole layer after the features were added.
    pub extent: Option<Rect>,
    /// Input lines that were skipped.
    pub rejected: Vec<LineError>,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully created {} feature{} in layer '{}'",
            self.features_created,
            if self.features_created == 1 { "" } else { "s" },
            self.layer
        )
    }
}

/// Parse the request input.
pub fn read_input(input: &Input, import: &ImportOptions) -> Result<ParseReport> {
    match input {
        Input::Text { text, options } => Ok(parse_text(text, options)),
        Input::File(path) => {
            validate_file(path, import)?;
            import_file(path)
        }
    }
}

/// Create features from the request and add them to its target layer.
///
/// Nothing is written when any step fails: a new layer is only created once its features
/// have been built.
pub fn create<S: LayerStore>(request: &Request, manager: &mut LayerManager<S>) -> Result<Outcome> {
    let layer_name = match &request.target {
        Target::NewLayer { name, .. } if name.trim().is_empty() => {
            return Err(CoordGeomError::MissingLayerName)
        }
        Target::Existing(name) if name.trim().is_empty() => {
            return Err(CoordGeomError::MissingTargetLayer)
        }
        Target::NewLayer { name, .. } | Target::Existing(name) => name.trim(),
    };

    let report = read_input(&request.input, &request.import)?.require_records()?;
    validate_records(&report.records, request.geometry_type)?;

    if let Target::Existing(_) = &request.target {
        let layer = manager.layer(layer_name)?;
        if !LayerManager::<S>::validate_compatibility(&layer, request.geometry_type) {
            return Err(CoordGeomError::IncompatibleGeometry {
                layer: layer_name.to_string(),
                layer_type: layer.geometry_type(),
                requested: request.geometry_type,
            });
        }
        if !request.fields.is_empty() {
            debug!(layer = layer_name, "ignoring fields for an existing layer");
        }
    }

    let drafts = build_features(&report.records, request.geometry_type, &request.build)?;

    if let Target::NewLayer { crs, .. } = &request.target {
        let mut schema = Schema::try_from_fields(request.fields.iter().cloned())?;
        if let Some(source) = &request.copy_fields_from {
            let added = schema.merge(&manager.fields_info(source)?);
            debug!(source = %source, added, "copied fields");
        }
        manager.create_layer(layer_name, request.geometry_type, crs.clone(), schema.into())?;
    }

    let features_created = manager.add_features(layer_name, drafts)?;
    let extent = manager.layer(layer_name)?.extent();
    info!(
        layer = layer_name,
        features_created,
        rejected = report.rejected.len(),
        "created features"
    );

    Ok(Outcome {
        layer: layer_name.to_string(),
        features_created,
        extent,
        rejected: report.rejected,
    })
}

/// A summary of the coordinates a request would use.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub geometry_type: GeometryType,
    /// Number of valid coordinates.
    pub count: usize,
    /// The first coordinates.
    pub shown: Vec<CoordRecord>,
    pub rejected: Vec<LineError>,
}

impl Preview {
    /// Coordinates not listed in [`Preview::shown`].
    pub fn remaining(&self) -> usize {
        self.count - self.shown.len()
    }
}

impl Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Preview: {} with {} points",
            self.geometry_type, self.count
        )?;
        write!(f, "First few coordinates:")?;
        if !self.shown.is_empty() {
            write!(f, "\n  {}", self.shown.iter().join("\n  "))?;
        }
        if self.remaining() > 0 {
            write!(f, "\n  ... and {} more points", self.remaining())?;
        }
        Ok(())
    }
}

/// Preview the request input, listing the first [`PREVIEW_POINTS`] coordinates.
pub fn preview(request: &Request) -> Result<Preview> {
    preview_limited(request, PREVIEW_POINTS)
}

/// Preview the request input, listing at most `limit` coordinates.
pub fn preview_limited(request: &Request, limit: usize) -> Result<Preview> {
    let report = read_input(&request.input, &request.import)?.require_records()?;
    Ok(Preview {
        geometry_type: request.geometry_type,
        count: report.records.len(),
        shown: report.records.iter().take(limit).cloned().collect(),
        rejected: report.rejected,
    })
}
