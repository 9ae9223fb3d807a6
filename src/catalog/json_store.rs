use super::{CatalogStore, CatalogStoreError, Cube};
use crate::config::CatalogJSONConfig;
use log::{debug, error};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Catalog loaded once from a JSON array of cubes.
#[derive(Clone, Debug)]
pub struct JsonCatalogStore {
    cubes: BTreeMap<String, Cube>,
}

impl JsonCatalogStore {
    pub fn new(config: &CatalogJSONConfig) -> Result<Self, CatalogStoreError> {
        Self::from_path(&config.json_path)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogStoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read catalog file {}: {}", path.display(), e);
            CatalogStoreError::FileNotFound(path.display().to_string())
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogStoreError> {
        let cubes: Vec<Cube> = serde_json::from_str(content)
            .map_err(|e| CatalogStoreError::InvalidJsonFormat(e.to_string()))?;
        debug!("Loaded {} cubes from JSON catalog", cubes.len());

        Ok(JsonCatalogStore {
            cubes: cubes.into_iter().map(|c| (c.name.clone(), c)).collect(),
        })
    }
}

impl CatalogStore for JsonCatalogStore {
    fn get_cube(&self, name: &str) -> Result<Cube, CatalogStoreError> {
        self.cubes
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogStoreError::CubeNotFound(name.to_string()))
    }

    fn get_all_cubes(&self) -> Result<BTreeMap<String, Cube>, CatalogStoreError> {
        Ok(self.cubes.clone())
    }
}
