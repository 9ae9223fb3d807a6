use crate::catalog::{CatalogStore, CatalogStoreError};
use crate::mdx::{DimensionFilter, MdxBuilder, MdxStatement, TimeLevel, ValidationError};
use crate::queries::{self, SUMMARY_QUERIES};
use crate::xmla::normalizer::fault_message;
use crate::xmla::{normalize, NormalizeError, ResultRow, TransportError, TransportErrorKind, XmlaTransport};
use futures::future::join_all;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Parameters a dashboard panel sends for one cube query.
#[derive(Debug, Default, Deserialize)]
pub struct OlapRequest {
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub time_level: Option<String>,
    #[serde(default)]
    pub filters: DimensionFilter,
}

#[derive(Error, Debug)]
pub enum OlapError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("XMLA response could not be parsed: {0}")]
    Parse(String),

    #[error("MDX Execution Error: {0}")]
    MdxExecution(String),

    #[error(transparent)]
    Catalog(CatalogStoreError),

    #[error("Unknown query: {0}")]
    UnknownQuery(String),
}

impl From<NormalizeError> for OlapError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::Parse(message) => OlapError::Parse(message),
            NormalizeError::MdxExecution { message } => OlapError::MdxExecution(message),
        }
    }
}

impl From<CatalogStoreError> for OlapError {
    fn from(e: CatalogStoreError) -> Self {
        match e {
            CatalogStoreError::CubeNotFound(name) => ValidationError::UnknownCube(name).into(),
            other => OlapError::Catalog(other),
        }
    }
}

/// Runs one query end to end: build, send, normalize. Holds no per-request
/// state, so one instance serves all requests concurrently.
pub struct QueryHandler<T, C> {
    transport: T,
    catalog: C,
}

impl<T, C> QueryHandler<T, C>
where
    T: XmlaTransport,
    C: CatalogStore,
{
    pub fn new(transport: T, catalog: C) -> Self {
        Self { transport, catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn build(&self, cube: &str, request: &OlapRequest) -> Result<MdxStatement, OlapError> {
        let cube = self.catalog.get_cube(cube)?;
        let time_level = match request.time_level.as_deref() {
            Some(token) => TimeLevel::parse(token)?,
            None => TimeLevel::default(),
        };

        let builder = MdxBuilder::new(cube);
        Ok(builder.build(&request.measures, time_level, &request.filters)?)
    }

    pub async fn query_cube(&self, cube: &str, request: &OlapRequest) -> Result<Vec<ResultRow>, OlapError> {
        let statement = self.build(cube, request)?;
        self.execute(&statement).await
    }

    pub async fn run_named(&self, name: &str) -> Result<Vec<ResultRow>, OlapError> {
        let query = queries::lookup(name).ok_or_else(|| OlapError::UnknownQuery(name.to_string()))?;
        debug!("Running named query {} against {}", query.name, query.cube);
        self.execute(&query.statement()).await
    }

    /// Runs the summary panels concurrently; each panel fails on its own.
    pub async fn summary(&self) -> Vec<(&'static str, Result<Vec<ResultRow>, OlapError>)> {
        let results = join_all(SUMMARY_QUERIES.iter().map(|name| self.run_named(name))).await;
        SUMMARY_QUERIES.iter().copied().zip(results).collect()
    }

    pub async fn execute(&self, statement: &MdxStatement) -> Result<Vec<ResultRow>, OlapError> {
        let raw = match self.transport.execute(statement).await {
            Ok(raw) => raw,
            Err(e) => return Err(fault_from_status(e)),
        };
        Ok(normalize(&raw)?)
    }
}

/// XMLA servers answer faults with HTTP 500 and a SOAP body; surface those as
/// execution errors instead of transport failures.
fn fault_from_status(error: TransportError) -> OlapError {
    if let (TransportErrorKind::Status(status), Some(body)) = (error.kind, error.body.as_deref()) {
        if let Some(message) = fault_message(body) {
            warn!("OLAP server reported a fault with HTTP {}", status);
            return OlapError::MdxExecution(message);
        }
    }
    OlapError::Transport(error)
}

#[cfg(test)]
mod test {
    use super::*;

    fn status_error(status: u16, body: &str) -> TransportError {
        TransportError {
            kind: TransportErrorKind::Status(status),
            message: format!("HTTP {}", status),
            body: Some(body.to_string()),
        }
    }

    #[test]
    fn fault_body_on_error_status_is_an_execution_error() {
        let body = r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/"><Body><Fault>
            <detail><XA:error xmlns:XA="http://mondrian.sourceforge.net"><XA:desc>Cube 'X' not found</XA:desc></XA:error></detail>
        </Fault></Body></Envelope>"#;
        match fault_from_status(status_error(500, body)) {
            OlapError::MdxExecution(message) => assert_eq!(message, "Cube 'X' not found"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn other_error_bodies_stay_transport_errors() {
        let err = fault_from_status(status_error(502, "<html>Bad Gateway</html>"));
        assert!(matches!(
            err,
            OlapError::Transport(TransportError { kind: TransportErrorKind::Status(502), .. })
        ));

        let err = fault_from_status(TransportError::new(TransportErrorKind::Timeout, "timed out"));
        assert!(matches!(
            err,
            OlapError::Transport(TransportError { kind: TransportErrorKind::Timeout, .. })
        ));
    }

    #[test]
    fn missing_cube_is_a_validation_error() {
        let err: OlapError = CatalogStoreError::CubeNotFound("HrCube".to_string()).into();
        assert!(matches!(err, OlapError::Validation(ValidationError::UnknownCube(name)) if name == "HrCube"));

        let err: OlapError = CatalogStoreError::InvalidJsonFormat("eof".to_string()).into();
        assert!(matches!(err, OlapError::Catalog(_)));
    }

    #[test]
    fn request_fields_are_optional() {
        let request: OlapRequest = serde_json::from_str("{}").unwrap();
        assert!(request.measures.is_empty());
        assert!(request.time_level.is_none());
        assert!(request.filters.is_empty());

        let request: OlapRequest = serde_json::from_str(
            r#"{"measures": ["[Measures].[Actual Cost]"], "time_level": "Month", "filters": {"[Location].[Location]": ["Seattle"]}}"#,
        )
        .unwrap();
        assert_eq!(request.filters["[Location].[Location]"], vec!["Seattle".to_string()]);
    }
}
