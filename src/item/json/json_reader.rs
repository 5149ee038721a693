use std::{fs, io::Read, path::Path};

use log::{debug, error};
use serde_json::Value;

use crate::{
    core::item::{Document, Item},
    ImportError,
};

/// Loads a whole JSON file as a sequence of items.
///
/// The decoded top-level value is cast to a list of entries, and each entry
/// to a list of fields:
///
/// | value  | as entries            | as fields                      |
/// |--------|-----------------------|--------------------------------|
/// | array  | its elements          | `("0", v0)`, `("1", v1)`, ...  |
/// | object | its values, in order  | its members, in order          |
/// | scalar | the scalar itself     | `("0", scalar)`                |
///
/// A document whose value is `null` counts as undecodable.
#[derive(Default, Debug, Clone, Copy)]
pub struct JsonDocumentReaderBuilder {}

impl JsonDocumentReaderBuilder {
    pub fn new() -> JsonDocumentReaderBuilder {
        Self {}
    }

    pub fn from_str(&self, content: &str) -> Result<Document, ImportError> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            debug!("Invalid JSON: {}", e);
            ImportError::InvalidJson(e.to_string())
        })?;

        if value.is_null() {
            return Err(ImportError::InvalidJson("Document is null".to_string()));
        }

        let items: Vec<Item> = entries(value).into_iter().map(fields).collect();
        debug!("Decoded {} JSON entries", items.len());

        Ok(Document::new(items))
    }

    pub fn from_reader<R: Read>(&self, mut rdr: R) -> Result<Document, ImportError> {
        let mut content = String::new();
        rdr.read_to_string(&mut content).map_err(|e| {
            error!("Failed to read JSON content: {}", e);
            ImportError::InvalidJson(e.to_string())
        })?;
        self.from_str(&content)
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Document, ImportError> {
        let file_path = path.as_ref();
        let content = fs::read_to_string(file_path).map_err(|e| {
            error!("Failed to read JSON file {}: {}", file_path.display(), e);
            ImportError::InvalidJson(format!(
                "Failed to read JSON file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        self.from_str(&content)
    }
}

fn entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        Value::Object(map) => map.into_iter().map(|(_, value)| value).collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

fn fields(value: Value) -> Item {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(values) => values
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        Value::Null => Item::new(),
        scalar => vec![("0", scalar)].into_iter().collect(),
    }
}
