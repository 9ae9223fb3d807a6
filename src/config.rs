use std::time::Duration;

use envconfig::Envconfig;
use log::debug;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "SERVER_HOST", default = "127.0.0.1")]
    pub server_host: String,

    #[envconfig(from = "SERVER_PORT", default = "8000")]
    pub server_port: u16,
}

impl Config {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "Config loaded: server_host={}, server_port={}",
            config.server_host, config.server_port
        );
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Where the OLAP server lives and which catalog every statement runs against.
#[derive(Envconfig, Clone)]
pub struct XmlaConfig {
    #[envconfig(from = "XMLA_URL", default = "http://localhost:8080/mondrian/xmla")]
    pub url: String,

    #[envconfig(from = "XMLA_CATALOG", default = "AdventureWorks")]
    pub catalog: String,

    #[envconfig(from = "XMLA_TIMEOUT_SECS", default = "60")]
    pub timeout_secs: u64,
}

impl XmlaConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "XmlaConfig loaded: url={}, catalog={}, timeout_secs={}",
            config.url, config.catalog, config.timeout_secs
        );
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Envconfig, Clone)]
pub struct CatalogJSONConfig {
    #[envconfig(from = "CATALOG_JSON_PATH", default = "cube_catalog.json")]
    pub json_path: String,
}

impl CatalogJSONConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!("CatalogJSONConfig loaded: json_path={}", config.json_path);
        Ok(config)
    }
}
