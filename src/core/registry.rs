use std::collections::HashMap;

use log::debug;

use crate::{core::item::Record, ImportError};

/// Builds a fresh record for one item.
pub type RecordFactory<'a> = Box<dyn Fn() -> Box<dyn Record + 'a> + 'a>;

/// Maps model class names to record factories.
///
/// Names are matched exactly, including namespace separators such as
/// `app\models\Article`.
///
/// # Examples
///
/// ```
/// use model_importer::core::item::{FieldValue, Record, ValidationErrors};
/// use model_importer::core::registry::ModelRegistry;
///
/// struct Note;
///
/// impl Record for Note {
///     fn try_set(&mut self, _field: &str, _value: FieldValue) -> bool { false }
///     fn save(&mut self) -> bool { true }
///     fn errors(&self) -> ValidationErrors { ValidationErrors::new() }
/// }
///
/// let mut registry = ModelRegistry::new();
/// registry.register("Note", || Box::new(Note));
///
/// assert!(registry.contains("Note"));
/// assert!(registry.resolve("Missing").is_err());
/// ```
#[derive(Default)]
pub struct ModelRegistry<'a> {
    factories: HashMap<String, RecordFactory<'a>>,
}

impl<'a> ModelRegistry<'a> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` under `name`, replacing any previous registration.
    pub fn register<S, F>(&mut self, name: S, factory: F)
    where
        S: Into<String>,
        F: Fn() -> Box<dyn Record + 'a> + 'a,
    {
        let name = name.into();
        debug!("Registering model '{}'", name);
        self.factories.insert(name, Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Looks up the factory registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&RecordFactory<'a>, ImportError> {
        self.factories
            .get(name)
            .ok_or_else(|| ImportError::UnknownType(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{FieldValue, ValidationErrors};

    struct Dummy;

    impl Record for Dummy {
        fn try_set(&mut self, _field: &str, _value: FieldValue) -> bool {
            true
        }

        fn save(&mut self) -> bool {
            true
        }

        fn errors(&self) -> ValidationErrors {
            ValidationErrors::new()
        }
    }

    #[test]
    fn resolve_should_fail_with_unknown_type() {
        let registry = ModelRegistry::new();

        let result = registry.resolve("app\\models\\Missing");

        match result {
            Err(ImportError::UnknownType(name)) => assert_eq!(name, "app\\models\\Missing"),
            _ => panic!("expected UnknownType"),
        }
    }

    #[test]
    fn resolve_should_build_fresh_records() {
        let mut registry = ModelRegistry::new();
        registry.register("Dummy", || Box::new(Dummy));
        registry.register("Other", || Box::new(Dummy));

        let factory = registry.resolve("Dummy").unwrap();
        let mut record = factory();

        assert!(record.save());
        assert_eq!(registry.names(), vec!["Dummy", "Other"]);
    }
}
