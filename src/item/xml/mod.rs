/// XML support for loading item documents.
///
/// The reader uses `quick-xml` to build a lightweight element tree of the
/// whole file, drops blank text nodes, then selects every element named like
/// the configured node (default `item`) anywhere in the tree.
///
/// Each child element of a selected node becomes one field. The field value
/// is the child's markup with exactly its own tag removed, so nested markup
/// reaches the record verbatim:
///
/// ```
/// use model_importer::item::xml::XmlDocumentReaderBuilder;
/// use serde_json::json;
///
/// let document = XmlDocumentReaderBuilder::new()
///     .from_str("<root><item><title>A <i>B</i></title></item></root>")
///     .unwrap();
///
/// assert_eq!(document.items()[0].get("title"), Some(&json!("A <i>B</i>")));
/// ```
pub mod xml_reader;

pub use xml_reader::{XmlDocumentReaderBuilder, DEFAULT_NODE_NAME};
