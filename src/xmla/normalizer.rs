use super::names::{is_caption, label_for};
use super::value::CellValue;
use super::ResultRow;
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use thiserror::Error;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP12_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const MDDATASET_NS: &str = "urn:schemas-microsoft-com:xml-analysis:mddataset";
pub const MONDRIAN_NS: &str = "http://mondrian.sourceforge.net";

const UNKNOWN_MDX_ERROR: &str = "Unknown MDX Error";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("XMLA response could not be parsed: {0}")]
    Parse(String),

    #[error("MDX Execution Error: {message}")]
    MdxExecution { message: String },
}

/// How the rows of a response lay out their cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseShape {
    /// Each row carries a `MEMBER_CAPTION` cell labelling its measure cells.
    CaptionValue,
    /// Rows are plain lists of measure cells named after the measure.
    FlatCells,
}

/// Parses a raw XMLA response into chart rows.
///
/// A SOAP fault anywhere in the document wins over any row data it also
/// carries. A well-formed response without rows yields no records.
pub fn normalize(xml: &str) -> Result<Vec<ResultRow>, NormalizeError> {
    let document = scan(xml)?;

    if document.fault {
        let message = document
            .fault_description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN_MDX_ERROR.to_string());
        warn!("OLAP server returned a SOAP fault: {}", message);
        return Err(NormalizeError::MdxExecution { message });
    }

    let shape = sniff_shape(&document.rows);
    let records = match shape {
        ResponseShape::CaptionValue => caption_records(document.rows),
        ResponseShape::FlatCells => flat_records(document.rows),
    };
    debug!("Normalized {:?} response into {} records", shape, records.len());
    Ok(records)
}

/// Reports whether `xml` is a SOAP fault without extracting any rows.
pub fn fault_message(xml: &str) -> Option<String> {
    match normalize(xml) {
        Err(NormalizeError::MdxExecution { message }) => Some(message),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct RawCell {
    name: String,
    text: String,
}

#[derive(Debug, Default)]
struct RawRow {
    cells: Vec<RawCell>,
}

#[derive(Debug, Default)]
struct ScannedDocument {
    fault: bool,
    fault_description: Option<String>,
    rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Fault,
    VendorError,
    Description,
    Row,
    Cell,
    Other,
}

#[derive(Default)]
struct Scanner {
    stack: Vec<Tag>,
    document: ScannedDocument,
    cell: Option<RawCell>,
    description: Option<String>,
    saw_root: bool,
}

impl Scanner {
    fn in_row(&self) -> bool {
        self.stack.contains(&Tag::Row)
    }

    fn classify(&self, ns: &ResolveResult, local: &str) -> Tag {
        let parent = self.stack.last().copied();

        if parent == Some(Tag::Row) {
            return if local == "schemaLocation" {
                Tag::Other
            } else {
                Tag::Cell
            };
        }
        if self.in_row() {
            return Tag::Other;
        }

        match (namespace_of(ns), local) {
            (Some(SOAP_ENV_NS) | Some(SOAP12_ENV_NS), "Fault") => Tag::Fault,
            (Some(MONDRIAN_NS), "error") => Tag::VendorError,
            (Some(MONDRIAN_NS), "desc")
                if parent == Some(Tag::VendorError)
                    && self.document.fault_description.is_none() =>
            {
                Tag::Description
            }
            (Some(MDDATASET_NS), "row") => Tag::Row,
            _ => Tag::Other,
        }
    }

    fn open(&mut self, ns: &ResolveResult, element: &BytesStart) -> Result<Tag, NormalizeError> {
        self.saw_root = true;
        let local = local_name(element)?;
        let tag = self.classify(ns, &local);

        match tag {
            Tag::Fault => self.document.fault = true,
            Tag::Description => self.description = Some(String::new()),
            Tag::Row => self.document.rows.push(RawRow::default()),
            Tag::Cell => {
                self.cell = Some(RawCell {
                    name: local,
                    text: String::new(),
                })
            }
            Tag::VendorError | Tag::Other => {}
        }
        Ok(tag)
    }

    fn close(&mut self, tag: Tag) {
        match tag {
            Tag::Cell => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.document.rows.last_mut()) {
                    row.cells.push(cell);
                }
            }
            Tag::Description => {
                self.document.fault_description = self.description.take();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.text.push_str(text);
        }
        if let Some(description) = self.description.as_mut() {
            description.push_str(text);
        }
    }
}

fn scan(xml: &str) -> Result<ScannedDocument, NormalizeError> {
    let mut reader = NsReader::from_str(xml);
    let mut scanner = Scanner::default();

    loop {
        let (ns, event) = match reader.read_resolved_event() {
            Ok(resolved) => resolved,
            Err(e) => {
                return Err(NormalizeError::Parse(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
        };

        match event {
            Event::Start(element) => {
                let tag = scanner.open(&ns, &element)?;
                scanner.stack.push(tag);
            }
            Event::Empty(element) => {
                let tag = scanner.open(&ns, &element)?;
                scanner.close(tag);
            }
            Event::End(_) => match scanner.stack.pop() {
                Some(tag) => scanner.close(tag),
                None => return Err(NormalizeError::Parse("unbalanced end tag".to_string())),
            },
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| NormalizeError::Parse(e.to_string()))?;
                scanner.text(&text);
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| NormalizeError::Parse(e.to_string()))?;
                scanner.text(text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !scanner.saw_root {
        return Err(NormalizeError::Parse("document has no root element".to_string()));
    }
    if !scanner.stack.is_empty() {
        return Err(NormalizeError::Parse(format!(
            "document ended with {} unclosed elements",
            scanner.stack.len()
        )));
    }
    Ok(scanner.document)
}

fn namespace_of<'a>(ns: &'a ResolveResult) -> Option<&'a str> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => std::str::from_utf8(uri).ok(),
        _ => None,
    }
}

fn local_name(element: &BytesStart) -> Result<String, NormalizeError> {
    std::str::from_utf8(element.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| NormalizeError::Parse(e.to_string()))
}

fn sniff_shape(rows: &[RawRow]) -> ResponseShape {
    let captioned = rows
        .iter()
        .any(|row| row.cells.iter().any(|cell| is_caption(&cell.name)));
    if captioned {
        ResponseShape::CaptionValue
    } else {
        ResponseShape::FlatCells
    }
}

/// One record per row: the joined captions label the last value cell in the
/// row. Earlier value cells are property columns or extra measures and are
/// not charted.
fn caption_records(rows: Vec<RawRow>) -> Vec<ResultRow> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let (captions, mut values): (Vec<RawCell>, Vec<RawCell>) =
            row.cells.into_iter().partition(|cell| is_caption(&cell.name));

        if captions.is_empty() || values.is_empty() {
            warn!(
                "Dropping row {}: {} caption cells, {} value cells",
                index,
                captions.len(),
                values.len()
            );
            continue;
        }
        if values.len() > 1 {
            debug!("Row {} has {} value cells, keeping the last", index, values.len());
        }
        let Some(value) = values.pop() else {
            continue;
        };

        let caption = captions
            .iter()
            .map(|cell| cell.text.trim())
            .collect::<Vec<_>>()
            .join(" / ");

        records.push(ResultRow {
            measure: caption,
            value: CellValue::coerce(&value.text),
        });
    }
    records
}

fn flat_records(rows: Vec<RawRow>) -> Vec<ResultRow> {
    rows.into_iter()
        .flat_map(|row| row.cells)
        .map(|cell| ResultRow {
            measure: label_for(&cell.name),
            value: CellValue::coerce(&cell.text),
        })
        .collect()
}
