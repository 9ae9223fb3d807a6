use log::error;
use std::process;

use olap_dashboard::{
    catalog::local_store::LocalCatalogStore,
    config::{Config, XmlaConfig},
    query_handler::QueryHandler,
    xmla::HttpXmlaClient,
    DashboardServer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::new().map_err(|e| {
        error!("Failed to initialize config: {}", e);
        e
    })?;

    let xmla_config = XmlaConfig::new().map_err(|e| {
        error!("Failed to initialize XMLA config: {}", e);
        e
    })?;

    let transport = HttpXmlaClient::from_config(&xmla_config).map_err(|e| {
        error!("Failed to create XMLA client: {}", e);
        e
    })?;

    let handler = QueryHandler::new(transport, LocalCatalogStore::mock());
    let server = DashboardServer::new(config, handler);

    if let Err(e) = server.run().await {
        error!("Server encountered an error: {}", e);
        process::exit(1);
    }

    Ok(())
}
