use crate::catalog::{CatalogStore, Cube};
use crate::config::Config;
use crate::queries::{self, NamedQuery};
use crate::query_handler::{OlapError, OlapRequest, QueryHandler};
use crate::xmla::{ResultRow, TransportErrorKind, XmlaTransport};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct AppState<T, C> {
    handler: Arc<QueryHandler<T, C>>,
}

impl<T, C> Clone for AppState<T, C> {
    fn clone(&self) -> Self {
        AppState {
            handler: self.handler.clone(),
        }
    }
}

impl OlapError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OlapError::Validation(_) => StatusCode::BAD_REQUEST,
            OlapError::UnknownQuery(_) => StatusCode::NOT_FOUND,
            OlapError::Transport(e) if e.kind == TransportErrorKind::Timeout => {
                StatusCode::GATEWAY_TIMEOUT
            }
            OlapError::Transport(_) | OlapError::Parse(_) => StatusCode::BAD_GATEWAY,
            OlapError::MdxExecution(_) | OlapError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        json!({ "error": format!("OLAP Query Failed: {}", self) })
    }
}

impl IntoResponse for OlapError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Responding {}: {}", status, self);
        }
        (status, Json(self.body())).into_response()
    }
}

pub fn router<T, C>(handler: Arc<QueryHandler<T, C>>) -> Router
where
    T: XmlaTransport + 'static,
    C: CatalogStore + Send + Sync + 'static,
{
    Router::new()
        .route("/api/olap/cubes", get(list_cubes::<T, C>))
        .route("/api/olap/cubes/{cube}", post(query_cube::<T, C>))
        .route("/api/olap/queries", get(list_queries))
        .route("/api/olap/queries/{name}", get(run_named::<T, C>))
        .route("/api/olap/summary", get(summary::<T, C>))
        .with_state(AppState { handler })
}

async fn list_cubes<T, C>(State(state): State<AppState<T, C>>) -> Result<Json<Vec<Cube>>, OlapError>
where
    T: XmlaTransport,
    C: CatalogStore,
{
    let cubes = state.handler.catalog().get_all_cubes()?;
    Ok(Json(cubes.into_values().collect()))
}

async fn query_cube<T, C>(
    State(state): State<AppState<T, C>>,
    Path(cube): Path<String>,
    Json(request): Json<OlapRequest>,
) -> Result<Json<Vec<ResultRow>>, OlapError>
where
    T: XmlaTransport,
    C: CatalogStore + Sync,
{
    Ok(Json(state.handler.query_cube(&cube, &request).await?))
}

async fn list_queries() -> Json<&'static [NamedQuery]> {
    Json(queries::all())
}

async fn run_named<T, C>(
    State(state): State<AppState<T, C>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ResultRow>>, OlapError>
where
    T: XmlaTransport,
    C: CatalogStore + Sync,
{
    Ok(Json(state.handler.run_named(&name).await?))
}

async fn summary<T, C>(State(state): State<AppState<T, C>>) -> Json<Value>
where
    T: XmlaTransport,
    C: CatalogStore + Sync,
{
    let mut panels = Map::new();
    for (name, result) in state.handler.summary().await {
        let panel = match result {
            Ok(rows) => json!(rows),
            Err(e) => {
                error!("Summary panel {} failed: {}", name, e);
                e.body()
            }
        };
        panels.insert(name.to_string(), panel);
    }
    Json(Value::Object(panels))
}

pub struct DashboardServer<T, C> {
    config: Config,
    handler: Arc<QueryHandler<T, C>>,
}

impl<T, C> DashboardServer<T, C>
where
    T: XmlaTransport + 'static,
    C: CatalogStore + Send + Sync + 'static,
{
    pub fn new(config: Config, handler: QueryHandler<T, C>) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    pub async fn run(&self) -> Result<(), std::io::Error> {
        let server_address = self.config.server_address();
        info!("Starting server at {}", server_address);

        let listener = TcpListener::bind(&server_address).await.map_err(|e| {
            error!("Failed to bind server address {}: {}", server_address, e);
            e
        })?;
        info!("Listening for connections on {}", server_address);

        axum::serve(listener, router(self.handler.clone())).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mdx::ValidationError;
    use crate::xmla::TransportError;

    #[test]
    fn errors_map_to_statuses() {
        let cases = vec![
            (
                OlapError::Validation(ValidationError::UnknownTimeLevel("Week".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (OlapError::UnknownQuery("nope".to_string()), StatusCode::NOT_FOUND),
            (
                OlapError::Transport(TransportError::new(TransportErrorKind::Timeout, "slow")),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                OlapError::Transport(TransportError::new(TransportErrorKind::Network, "refused")),
                StatusCode::BAD_GATEWAY,
            ),
            (OlapError::Parse("eof".to_string()), StatusCode::BAD_GATEWAY),
            (
                OlapError::MdxExecution("bad member".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{}", error);
        }
    }

    #[test]
    fn error_body_carries_message() {
        let body = OlapError::MdxExecution("Member not found".to_string()).body();
        assert_eq!(
            body,
            json!({ "error": "OLAP Query Failed: MDX Execution Error: Member not found" })
        );
    }
}
