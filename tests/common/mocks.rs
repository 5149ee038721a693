//! Mock version of a Record.
use mockall::mock;

use model_importer::core::item::{FieldValue, Record, ValidationErrors};

mock! {
    pub Record {}
    impl Record for Record {
        fn try_set(&mut self, field: &str, value: FieldValue) -> bool;
        fn save(&mut self) -> bool;
        fn errors(&self) -> ValidationErrors;
    }
}
