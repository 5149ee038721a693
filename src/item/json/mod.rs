/// JSON support for loading item documents.
///
/// The whole file is decoded with `serde_json` (member order preserved) and
/// the top-level value is cast to a list of entries. Field values are handed
/// to records exactly as decoded.
///
/// ```
/// use model_importer::item::json::JsonDocumentReaderBuilder;
/// use serde_json::json;
///
/// let document = JsonDocumentReaderBuilder::new()
///     .from_str(r#"[{"title": "A", "year": 1948}, {"title": "B"}]"#)
///     .unwrap();
///
/// assert_eq!(document.len(), 2);
/// assert_eq!(document.items()[0].get("year"), Some(&json!(1948)));
/// ```
pub mod json_reader;

pub use json_reader::JsonDocumentReaderBuilder;
