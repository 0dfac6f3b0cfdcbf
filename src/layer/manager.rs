use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::crs::Crs;
use crate::datatypes::{GeometryFamily, GeometryType};
use crate::error::{CoordGeomError, Result};
use crate::geometry::{promote_to_multi, single_part, FeatureDraft};
use crate::layer::{Feature, Layer, LayerStore};
use crate::schema::{FieldDef, FieldType, Schema};

/// Fields that receive a feature's label, in order of preference.
const ID_FIELDS: [&str; 6] = ["id", "ID", "fid", "FID", "name", "Name"];

/// Name, type and size of a layer, as listed by [`LayerManager::list_layers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: String,
    pub geometry_type: GeometryType,
    pub feature_count: usize,
}

/// Creates layers and appends features to them.
#[derive(Debug)]
pub struct LayerManager<S: LayerStore> {
    store: S,
}

impl<S: LayerStore> LayerManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// All layers, optionally only those of one geometry family. Layers that cannot be
    /// read are skipped with a warning.
    pub fn list_layers(&self, family: Option<GeometryFamily>) -> Result<Vec<LayerSummary>> {
        let mut layers = vec![];
        for name in self.store.names()? {
            let layer = match self.store.load(&name) {
                Ok(Some(layer)) => layer,
                Ok(None) => continue,
                Err(err) => {
                    warn!(layer = %name, "skipping unreadable layer: {err}");
                    continue;
                }
            };
            if family.is_some_and(|family| layer.geometry_type().family() != family) {
                continue;
            }
            layers.push(LayerSummary {
                name,
                geometry_type: layer.geometry_type(),
                feature_count: layer.len(),
            });
        }
        Ok(layers)
    }

    /// The layer with this name.
    pub fn layer(&self, name: &str) -> Result<Layer> {
        self.store
            .load(name)?
            .ok_or_else(|| CoordGeomError::UnknownLayer(name.to_string()))
    }

    /// Create an empty layer.
    ///
    /// The schema always starts with an `id` string field; the given fields follow, in order.
    /// A requested `id` field is merged into that first field. Every default must be valid
    /// for its field type before the layer is stored.
    pub fn create_layer(
        &mut self,
        name: &str,
        geometry_type: GeometryType,
        crs: Crs,
        fields: Vec<FieldDef>,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoordGeomError::MissingLayerName);
        }

        let mut id_field = FieldDef::new("id", FieldType::String).with_length(50);
        let mut rest = Vec::with_capacity(fields.len());
        for field in fields {
            if field.name == "id" {
                id_field.default = field.default;
            } else {
                rest.push(field);
            }
        }
        let schema = Schema::try_from_fields(std::iter::once(id_field).chain(rest))?;
        for field in schema.iter() {
            field.default_value()?;
        }

        info!(layer = name, %geometry_type, %crs, fields = schema.len(), "creating layer");
        self.store
            .insert(Layer::new(name, geometry_type, crs, schema))
    }

    /// Whether geometries of `geometry_type` can be added to the layer.
    pub fn validate_compatibility(layer: &Layer, geometry_type: GeometryType) -> bool {
        layer.geometry_type().family() == geometry_type.family()
    }

    /// Append features to a layer. Either all features are added or none.
    ///
    /// Returns the number of features added.
    pub fn add_features(&mut self, name: &str, drafts: Vec<FeatureDraft>) -> Result<usize> {
        let mut layer = self.layer(name)?;
        if drafts.is_empty() {
            return Ok(0);
        }

        let defaults = layer
            .schema()
            .iter()
            .map(|field| Ok((field.name.clone(), field.default_value()?)))
            .collect::<Result<Map<String, Value>>>()?;

        let mut fid = layer.next_fid();
        let mut features = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let requested = draft
                .geometry_type()
                .ok_or_else(|| CoordGeomError::InvalidLayer("unsupported geometry".to_string()))?;
            if !Self::validate_compatibility(&layer, requested) {
                return Err(CoordGeomError::IncompatibleGeometry {
                    layer: layer.name().to_string(),
                    layer_type: layer.geometry_type(),
                    requested,
                });
            }

            let geometry = if layer.geometry_type().is_multi() {
                promote_to_multi(draft.geometry)
            } else {
                // A single-type layer only takes multi geometries with one part.
                single_part(draft.geometry).ok_or_else(|| CoordGeomError::IncompatibleGeometry {
                    layer: layer.name().to_string(),
                    layer_type: layer.geometry_type(),
                    requested,
                })?
            };

            let mut properties = defaults.clone();
            assign_label(layer.schema(), &mut properties, &draft.label);

            features.push(Feature {
                fid,
                geometry,
                properties,
            });
            fid += 1;
        }

        let count = features.len();
        layer.extend(features);
        self.store.replace(layer)?;
        info!(layer = name, count, "added features");
        Ok(count)
    }

    /// Field definitions of a layer.
    pub fn fields_info(&self, name: &str) -> Result<Schema> {
        Ok(self.layer(name)?.schema().clone())
    }
}

/// Store the label in the first ID-like field that accepts it.
fn assign_label(schema: &Schema, properties: &mut Map<String, Value>, label: &str) {
    for name in ID_FIELDS {
        let Some(field) = schema.get(name) else {
            continue;
        };
        match field.coerce(label) {
            Ok(value) => {
                properties.insert(name.to_string(), value);
                return;
            }
            Err(err) => debug!("label does not fit field '{name}': {err}"),
        }
    }
}
