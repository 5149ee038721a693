use std::cell::RefCell;
use std::fmt;

use crate::ImportError;

use super::ModelDefinition;

/// A typed column value ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "NULL"),
            ColumnValue::Text(text) => write!(f, "{:?}", text),
            ColumnValue::Integer(value) => write!(f, "{}", value),
            ColumnValue::Real(value) => write!(f, "{}", value),
            ColumnValue::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// One row: column name and value, in model field order.
pub type Row = Vec<(String, ColumnValue)>;

/// Persistence backend of [`super::ActiveRecord`].
pub trait RecordStore {
    /// Makes the store ready to receive rows of `model`.
    fn prepare(&self, _model: &ModelDefinition) -> Result<(), ImportError> {
        Ok(())
    }

    /// Inserts one row into `table`.
    fn insert(&self, table: &str, row: &Row) -> Result<(), ImportError>;
}

/// Keeps inserted rows in memory.
#[derive(Default, Debug)]
pub struct MemoryRecordStore {
    rows: RefCell<Vec<(String, Row)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows inserted into `table`, oldest first.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.rows
            .borrow()
            .iter()
            .filter(|(name, _)| name == table)
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn insert(&self, table: &str, row: &Row) -> Result<(), ImportError> {
        self.rows
            .borrow_mut()
            .push((table.to_string(), row.clone()));
        Ok(())
    }
}
