pub mod envelope;
pub mod names;
pub mod normalizer;
pub mod transport;
pub mod value;

pub use normalizer::{normalize, NormalizeError};
pub use transport::{HttpXmlaClient, TransportError, TransportErrorKind, XmlaTransport};
pub use value::CellValue;

use serde::Serialize;

/// One chart-ready record.
///
/// `measure` is the row caption (caption/value responses) or the decoded
/// measure name (flat cell lists).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub measure: String,
    pub value: CellValue,
}
