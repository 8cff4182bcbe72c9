//! Parsed metadata documents.
//!
//! Each sensor family ships its metadata in one of three dialects: DIMAP
//! style XML, Landsat `KEY = value` text, or a GeoJSON-like feature record.
//! The types here turn those into immutable in-memory views with optional
//! lookups. Missing fields are `None`; only structurally broken documents
//! are errors.

mod json;
mod mtl;
mod xml;

pub use json::JsonDocument;
pub use mtl::MtlDocument;
pub use xml::{XmlDocument, XmlElement};

use encoding_rs::{Encoding, WINDOWS_1252};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::error::{IngestionError, Result};

/// Why a document could not be parsed.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Structure(String),
}

/// Read a whole metadata file as text.
///
/// UTF-8 is tried first. Anything else is decoded with the encoding named
/// in the XML declaration, or as Latin-1 when there is none. Detection and
/// parsing both read through here, so they always see the same text.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| IngestionError::file_read(path, e))?;
    decode_text(bytes).map_err(|e| IngestionError::document(path, e))
}

fn decode_text(bytes: Vec<u8>) -> std::result::Result<String, DocumentError> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(err) => err.into_bytes(),
    };
    let encoding = declared_encoding(&bytes).unwrap_or(WINDOWS_1252);
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            DocumentError::Structure(format!("not valid {} text", encoding.name()))
        })
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => {
            let label = decl.encoding()?.ok()?;
            Encoding::for_label(&label)
        }
        _ => None,
    }
}

/// Parse an optional raw field value.
///
/// Absent or blank values are `Ok(None)`; a value that is present but does
/// not parse is an [`IngestionError::InvalidValue`].
pub fn parse_field<T: FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| IngestionError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            }),
    }
}
