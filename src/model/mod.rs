//! Host models: definitions loaded from a JSON model file, and the
//! validating [`ActiveRecord`] built from them.
//!
//! ```json
//! {
//!   "models": [
//!     {
//!       "name": "app\\models\\Article",
//!       "table": "article",
//!       "fields": [
//!         { "name": "id", "type": "integer", "read_only": true },
//!         { "name": "title", "required": true, "max_length": 255 },
//!         { "name": "year", "type": "integer" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::{fs, path::Path};

use log::debug;
use serde::Deserialize;

use crate::{core::registry::ModelRegistry, ImportError};

pub mod active_record;

pub mod store;

pub use active_record::ActiveRecord;
pub use store::{ColumnValue, MemoryRecordStore, RecordStore, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Read-only fields exist on the record but cannot be assigned.
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldDefinition {
    pub fn new<S: Into<String>>(name: S, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            max_length: None,
            read_only: false,
            label: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Label used in validation messages.
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => generate_label(&self.name),
        }
    }
}

/// Turns `first_name`, `first-name` or `firstName` into `First Name`.
pub fn generate_label(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDefinition {
    /// Class name the command line refers to.
    pub name: String,
    pub table: String,
    pub fields: Vec<FieldDefinition>,
}

impl ModelDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// All models known to the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<ModelDefinition>,
}

impl ModelCatalog {
    pub fn from_str(content: &str) -> Result<Self, ImportError> {
        let catalog: ModelCatalog = serde_json::from_str(content)
            .map_err(|e| ImportError::ModelDefinition(e.to_string()))?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let path = path.as_ref();
        debug!("Loading model definitions from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            ImportError::ModelDefinition(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Registers an [`ActiveRecord`] factory for every model, writing to `store`.
    pub fn register_all<'a>(&'a self, registry: &mut ModelRegistry<'a>, store: &'a dyn RecordStore) {
        for model in &self.models {
            registry.register(model.name.clone(), move || {
                Box::new(ActiveRecord::new(model, store))
            });
        }
    }

    fn check(&self) -> Result<(), ImportError> {
        for model in &self.models {
            if model.name.trim().is_empty() {
                return Err(ImportError::ModelDefinition("A model has no name".to_string()));
            }
            if !is_identifier(&model.table) {
                return Err(ImportError::ModelDefinition(format!(
                    "Model '{}' has an invalid table name '{}'",
                    model.name, model.table
                )));
            }
            for (index, field) in model.fields.iter().enumerate() {
                if !is_identifier(&field.name) {
                    return Err(ImportError::ModelDefinition(format!(
                        "Model '{}' has an invalid field name '{}'",
                        model.name, field.name
                    )));
                }
                if model.fields[..index].iter().any(|other| other.name == field.name) {
                    return Err(ImportError::ModelDefinition(format!(
                        "Model '{}' declares field '{}' twice",
                        model.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Table and column names are interpolated into SQL, so only plain
/// identifiers are accepted.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS: &str = r#"{
        "models": [
            {
                "name": "app\\models\\Article",
                "table": "article",
                "fields": [
                    { "name": "id", "type": "integer", "read_only": true },
                    { "name": "title", "required": true, "max_length": 10 },
                    { "name": "rating", "type": "number", "label": "Score" },
                    { "name": "published", "type": "boolean" }
                ]
            }
        ]
    }"#;

    #[test]
    fn catalog_should_load_definitions_with_defaults() {
        let catalog = ModelCatalog::from_str(MODELS).unwrap();

        let article = catalog.get("app\\models\\Article").unwrap();
        assert_eq!(article.table, "article");
        assert_eq!(article.fields.len(), 4);

        let title = article.field("title").unwrap();
        assert_eq!(title.kind, FieldKind::String);
        assert!(title.required);
        assert_eq!(title.max_length, Some(10));
        assert!(!title.read_only);

        assert!(article.field("id").unwrap().read_only);
        assert_eq!(article.field("rating").unwrap().label(), "Score");
        assert!(catalog.get("Article").is_none());
    }

    #[test]
    fn catalog_should_reject_unsafe_names_and_duplicates() {
        let bad_table = r#"{"models": [{"name": "A", "table": "a; drop", "fields": []}]}"#;
        let duplicate = r#"{"models": [{"name": "A", "table": "a", "fields": [{"name": "x"}, {"name": "x"}]}]}"#;
        let bad_type = r#"{"models": [{"name": "A", "table": "a", "fields": [{"name": "x", "type": "date"}]}]}"#;

        for content in [bad_table, duplicate, bad_type, "not json"] {
            assert!(matches!(
                ModelCatalog::from_str(content),
                Err(ImportError::ModelDefinition(_))
            ));
        }
    }

    #[test]
    fn labels_should_be_generated_from_names() {
        assert_eq!(generate_label("title"), "Title");
        assert_eq!(generate_label("first_name"), "First Name");
        assert_eq!(generate_label("firstName"), "First Name");
        assert_eq!(generate_label("post-id"), "Post Id");
    }

    #[test]
    fn register_all_should_expose_every_model() {
        let catalog = ModelCatalog::from_str(MODELS).unwrap();
        let store = MemoryRecordStore::new();
        let mut registry = ModelRegistry::new();

        catalog.register_all(&mut registry, &store);

        assert!(registry.contains("app\\models\\Article"));
        let mut record = registry.resolve("app\\models\\Article").unwrap()();
        assert!(record.try_set("title", "Hello".into()));
        assert!(record.save());
        assert_eq!(store.rows("article").len(), 1);
    }
}
