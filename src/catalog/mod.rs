pub mod json_store;
pub mod local_store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Allow-list of the tokens one cube accepts from callers.
///
/// Only tokens listed here are ever interpolated into an MDX statement.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Cube {
    pub name: String,
    pub label: String,
    pub default_measure: String,
    pub measures: Vec<Measure>,
    pub dimensions: Vec<String>,
}

impl Cube {
    pub fn measure(&self, token: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == token)
    }

    pub fn allows_dimension(&self, token: &str) -> bool {
        self.dimensions.iter().any(|d| d == token)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Measure {
    /// Fully qualified token, e.g. `[Measures].[Sales Amount]`.
    pub name: String,
    /// Equivalent SQL aggregate over the flat fact table, if one exists.
    #[serde(default)]
    pub sql: Option<String>,
}

impl Measure {
    pub fn new(name: &str, sql: Option<&str>) -> Self {
        Measure {
            name: name.to_string(),
            sql: sql.map(str::to_string),
        }
    }
}

pub trait CatalogStore: Clone {
    fn get_cube(&self, name: &str) -> Result<Cube, CatalogStoreError>;
    fn get_all_cubes(&self) -> Result<BTreeMap<String, Cube>, CatalogStoreError>;
}

#[derive(Error, Debug)]
pub enum CatalogStoreError {
    #[error("Cube not found: {0}")]
    CubeNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid JSON format: {0}")]
    InvalidJsonFormat(String),
}
