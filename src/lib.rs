#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Model Importer

 Bulk-imports structured records from XML or JSON files into persisted
 models. Each item of the file becomes one record: fields are copied into
 the like-named settable properties of the record, then the record saves
 itself, running its own validation. Failed saves are reported in full and,
 in interactive mode, the operator decides whether the import goes on.

 ## Core Concepts

- **Document / Item:** the ordered items read from a file, each an ordered list of named field values.
- **Record:** the domain object built per item. It knows which properties it can set, how to save itself and why a save failed.
- **ModelRegistry:** maps a model class name to a factory building fresh records.
- **Importer:** the single pass over a document: build, assign, save, report, ask.

 ## Features

| **Feature**   | **Description**                                                |
|---------------|----------------------------------------------------------------|
| xml           | Enables the XML document reader                                |
| json          | Enables the JSON document reader                               |
| rdbc-sqlite   | Enables the SQLite record store                                |
| logger        | Enables a record store that only logs rows (dry runs)          |
| cli           | Enables the `model-import` binary                              |
| full          | Enables all available features (default)                       |

 ## Getting Started

```rust
# use model_importer::{
#     core::{import::ImporterBuilder, registry::ModelRegistry, report::ConsoleReporter},
#     item::xml::XmlDocumentReaderBuilder,
#     model::{MemoryRecordStore, ModelCatalog},
# };
let catalog = ModelCatalog::from_str(r#"{
    "models": [{
        "name": "app\\models\\Article",
        "table": "article",
        "fields": [{ "name": "title", "required": true }]
    }]
}"#).unwrap();

let store = MemoryRecordStore::new();
let mut registry = ModelRegistry::new();
catalog.register_all(&mut registry, &store);

let reporter = ConsoleReporter::new(Vec::<u8>::new(), Vec::<u8>::new());
let importer = ImporterBuilder::new()
    .registry(&registry)
    .reporter(&reporter)
    .build();

let document = XmlDocumentReaderBuilder::new()
    .from_str("<root><item><title>A</title></item><item><title>B</title></item></root>")
    .unwrap();

let execution = importer.import_document(document, "app\\models\\Article").unwrap();

assert_eq!(execution.saved_count, 2);
assert_eq!(store.rows("article").len(), 2);
```

 ## Command line

```text
model-import --models models.json --database sqlite://app.db xml @data/items.xml 'app\models\Article' --node-name item
model-import json items.json 'app\models\Article' --interactive 0
```
 */

/// Core module: items, records, registry and the import loop
pub mod core;

/// Error types for imports
pub mod error;

#[doc(inline)]
pub use error::*;

/// Document readers and record stores
pub mod item;

/// Host models backed by a record store
pub mod model;

/// Run configuration and path aliases
pub mod config;

#[cfg(feature = "cli")]
/// Command line surface
pub mod cli;
