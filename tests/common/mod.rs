#![allow(dead_code)]

pub mod mocks;

pub use mocks::MockRecord;

use std::io::Write;

use model_importer::{
    core::report::ConsoleReporter,
    model::ModelCatalog,
};
use tempfile::NamedTempFile;

pub const ARTICLE: &str = "app\\models\\Article";

pub fn catalog() -> ModelCatalog {
    ModelCatalog::from_str(
        r#"{
            "models": [
                {
                    "name": "app\\models\\Article",
                    "table": "article",
                    "fields": [
                        { "name": "id", "type": "integer", "read_only": true },
                        { "name": "title", "required": true, "max_length": 20 },
                        { "name": "body" },
                        { "name": "year", "type": "integer" }
                    ]
                }
            ]
        }"#,
    )
    .expect("valid model definitions")
}

pub fn reporter() -> ConsoleReporter<Vec<u8>, Vec<u8>> {
    let _ = env_logger::builder().is_test(true).try_init();
    colored::control::set_override(false);
    ConsoleReporter::new(Vec::new(), Vec::new())
}

/// Standard output and standard error written so far.
pub fn outputs(reporter: ConsoleReporter<Vec<u8>, Vec<u8>>) -> (String, String) {
    let (out, err) = reporter.into_inner();
    (
        String::from_utf8(out).expect("utf-8 stdout"),
        String::from_utf8(err).expect("utf-8 stderr"),
    )
}

pub fn file_with(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temporary file");
    file.write_all(content.as_bytes()).expect("write temporary file");
    file
}
