mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use common::{outputs, reporter, MockRecord};
use serde_json::{json, Value};

use model_importer::{
    core::{
        import::{ImportStatus, ImporterBuilder},
        item::{Document, Item, ValidationErrors},
        registry::ModelRegistry,
    },
    ImportError,
};

fn document(titles: &[&str]) -> Document {
    Document::new(
        titles
            .iter()
            .map(|title| vec![("title", json!(title))].into_iter().collect::<Item>())
            .collect(),
    )
}

fn refused() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add("title", "Title is taken.");
    errors
}

#[test]
fn fields_should_reach_the_record_in_document_order() {
    let assigned: Arc<Mutex<Vec<(String, Value)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut registry = ModelRegistry::new();
    let sink = Arc::clone(&assigned);
    registry.register("Mock", move || {
        let sink = Arc::clone(&sink);
        let mut record = MockRecord::new();
        record.expect_try_set().returning(move |field, value| {
            sink.lock().unwrap().push((field.to_string(), value));
            true
        });
        record.expect_save().times(1).return_const(true);
        record.expect_errors().never();
        Box::new(record)
    });

    let item: Item = vec![
        ("title", json!("A")),
        ("body", json!("<p>x</p>")),
        ("year", json!(1999)),
    ]
    .into_iter()
    .collect();

    let reporter = reporter();
    let execution = {
        let importer = ImporterBuilder::new()
            .registry(&registry)
            .reporter(&reporter)
            .build();
        importer
            .import_document(Document::new(vec![item]), "Mock")
            .unwrap()
    };

    assert_eq!(execution.saved_count, 1);
    assert_eq!(
        *assigned.lock().unwrap(),
        vec![
            ("title".to_string(), json!("A")),
            ("body".to_string(), json!("<p>x</p>")),
            ("year".to_string(), json!(1999)),
        ]
    );
}

#[test]
fn record_errors_should_only_be_read_after_a_failed_save() {
    let mut registry = ModelRegistry::new();
    registry.register("Mock", || {
        let mut record = MockRecord::new();
        record.expect_try_set().return_const(true);
        record.expect_save().times(1).return_const(false);
        record.expect_errors().times(1).returning(refused);
        Box::new(record)
    });

    let reporter = reporter();
    let execution = {
        let importer = ImporterBuilder::new()
            .registry(&registry)
            .reporter(&reporter)
            .build();
        importer.import_document(document(&["A", "B"]), "Mock").unwrap()
    };

    assert_eq!(execution.status, ImportStatus::Completed);
    assert_eq!(execution.failed_count, 2);

    let (out, err) = outputs(reporter);
    assert_eq!(out, "\nSaved 0 items\n");
    assert_eq!(
        err,
        "Item 1 can not be saved\ntitle:\n - Title is taken.\n\
         Item 2 can not be saved\ntitle:\n - Title is taken.\n"
    );
}

#[test]
fn declined_import_should_not_build_further_records() {
    let built = Arc::new(AtomicUsize::new(0));
    let asked = AtomicUsize::new(0);

    let mut registry = ModelRegistry::new();
    let counter = Arc::clone(&built);
    registry.register("Mock", move || {
        let ordinal = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut record = MockRecord::new();
        record.expect_try_set().return_const(true);
        record.expect_save().times(1).return_const(ordinal != 2);
        record.expect_errors().returning(refused);
        Box::new(record)
    });

    let decline = || {
        asked.fetch_add(1, Ordering::SeqCst);
        false
    };

    let reporter = reporter();
    let execution = {
        let importer = ImporterBuilder::new()
            .registry(&registry)
            .reporter(&reporter)
            .interactive(true, &decline)
            .build();
        importer
            .import_document(document(&["A", "B", "C", "D"]), "Mock")
            .unwrap()
    };

    assert_eq!(execution.status, ImportStatus::Stopped);
    assert_eq!(execution.processed_count, 2);
    assert_eq!(execution.saved_count, 1);
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert_eq!(asked.load(Ordering::SeqCst), 1);

    let (out, err) = outputs(reporter);
    assert!(out.is_empty());
    assert!(err.starts_with("Item 2 can not be saved\n"));
    assert!(err.ends_with("\nStopped import\n"));
}

#[test]
fn accepted_failures_should_keep_the_import_going() {
    let mut registry = ModelRegistry::new();
    registry.register("Mock", || {
        let mut record = MockRecord::new();
        record.expect_try_set().return_const(true);
        record.expect_save().times(1).return_const(false);
        record.expect_errors().returning(ValidationErrors::new);
        Box::new(record)
    });

    let asked = AtomicUsize::new(0);
    let accept = || {
        asked.fetch_add(1, Ordering::SeqCst);
        true
    };

    let reporter = reporter();
    let execution = {
        let importer = ImporterBuilder::new()
            .registry(&registry)
            .reporter(&reporter)
            .interactive(true, &accept)
            .build();
        importer
            .import_document(document(&["A", "B", "C"]), "Mock")
            .unwrap()
    };

    assert_eq!(execution.status, ImportStatus::Completed);
    assert_eq!(execution.processed_count, 3);
    assert_eq!(asked.load(Ordering::SeqCst), 3);
}

#[test]
fn unknown_type_should_be_reported_before_touching_the_file() {
    let mut registry = ModelRegistry::new();
    registry.register("Mock", || panic!("no record may be built"));

    let reporter = reporter();
    let importer = ImporterBuilder::new()
        .registry(&registry)
        .reporter(&reporter)
        .build();

    let result = importer.import_json("/nonexistent/items.json", "Other");
    assert!(matches!(result, Err(ImportError::UnknownType(ref name)) if name == "Other"));

    let result = importer.import_document(document(&["A"]), "Other");
    assert!(matches!(result, Err(ImportError::UnknownType(_))));
}
