use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{CoordGeomError, Result};
use crate::io::geojson::{read_layer, write_layer};
use crate::layer::Layer;

/// File extension of layers kept by [`DirectoryStore`].
const LAYER_EXTENSION: &str = "geojson";

/// The registry of loaded layers.
pub trait LayerStore {
    /// Names of all layers, in a stable order.
    fn names(&self) -> Result<Vec<String>>;

    /// The layer with this name, if any.
    fn load(&self, name: &str) -> Result<Option<Layer>>;

    /// Add a new layer. Fails with [`CoordGeomError::DuplicateLayer`] if the name is taken.
    fn insert(&mut self, layer: Layer) -> Result<()>;

    /// Overwrite an existing layer. Fails with [`CoordGeomError::UnknownLayer`] if there is
    /// no layer with this name.
    fn replace(&mut self, layer: Layer) -> Result<()>;
}

/// Temporary layers that live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    layers: IndexMap<String, Layer>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayerStore for MemoryStore {
    fn names(&self) -> Result<Vec<String>> {
        Ok(self.layers.keys().cloned().collect())
    }

    fn load(&self, name: &str) -> Result<Option<Layer>> {
        Ok(self.layers.get(name).cloned())
    }

    fn insert(&mut self, layer: Layer) -> Result<()> {
        if self.layers.contains_key(layer.name()) {
            return Err(CoordGeomError::DuplicateLayer(layer.name().to_string()));
        }
        self.layers.insert(layer.name().to_string(), layer);
        Ok(())
    }

    fn replace(&mut self, layer: Layer) -> Result<()> {
        match self.layers.get_mut(layer.name()) {
            Some(slot) => {
                *slot = layer;
                Ok(())
            }
            None => Err(CoordGeomError::UnknownLayer(layer.name().to_string())),
        }
    }
}

/// Layers kept as `<name>.geojson` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the named layer.
    pub fn layer_path(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.trim().is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if !valid {
            return Err(CoordGeomError::InvalidLayer(format!(
                "'{name}' cannot be used as a layer file name"
            )));
        }
        Ok(self.root.join(format!("{name}.{LAYER_EXTENSION}")))
    }

    /// Write through a temporary file so a failed write leaves the old layer intact.
    fn write(&self, layer: &Layer) -> Result<()> {
        let path = self.layer_path(layer.name())?;
        let tmp_path = path.with_extension(format!("{LAYER_EXTENSION}.tmp"));
        let written = File::create(&tmp_path)
            .map_err(CoordGeomError::from)
            .and_then(|file| write_layer(layer, BufWriter::new(file)))
            .and_then(|()| Ok(fs::rename(&tmp_path, &path)?));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        debug!(path = %path.display(), features = layer.len(), "wrote layer file");
        Ok(())
    }
}

impl LayerStore for DirectoryStore {
    fn names(&self) -> Result<Vec<String>> {
        let mut names = vec![];
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LAYER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<Option<Layer>> {
        let path = self.layer_path(name)?;
        if !path.is_file() {
            return Ok(None);
        }
        let layer = read_layer(BufReader::new(File::open(&path)?), name)?;
        if layer.name() != name {
            return Err(CoordGeomError::InvalidLayer(format!(
                "{} holds layer '{}'",
                path.display(),
                layer.name()
            )));
        }
        Ok(Some(layer))
    }

    fn insert(&mut self, layer: Layer) -> Result<()> {
        if self.layer_path(layer.name())?.exists() {
            return Err(CoordGeomError::DuplicateLayer(layer.name().to_string()));
        }
        self.write(&layer)
    }

    fn replace(&mut self, layer: Layer) -> Result<()> {
        if !self.layer_path(layer.name())?.is_file() {
            return Err(CoordGeomError::UnknownLayer(layer.name().to_string()));
        }
        self.write(&layer)
    }
}
