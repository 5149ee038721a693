use sqlx::{query_builder::Separated, Database, Sqlite};

use crate::model::{ColumnValue, Row};

/// This module contains the SQLite record store.
pub mod sqlite_store;

/// Trait for binding item data to database query parameters.
///
/// # Type Parameters
///
/// * `O` - The item type to bind
/// * `DB` - The SQLx database type
pub trait DatabaseItemBinder<O, DB: Database> {
    /// Binds the properties of an item to a separated query builder.
    ///
    /// # Arguments
    ///
    /// * `item` - The item whose properties should be bound.
    /// * `query_builder` - The separated query builder to bind parameters to.
    fn bind(&self, item: &O, query_builder: Separated<DB, &str>);
}

/// Binds the values of a [`Row`] in column order.
#[derive(Default, Debug, Clone, Copy)]
pub struct RowBinder;

impl DatabaseItemBinder<Row, Sqlite> for RowBinder {
    fn bind(&self, item: &Row, mut query_builder: Separated<Sqlite, &str>) {
        for (_, value) in item {
            match value {
                ColumnValue::Null => query_builder.push_bind(None::<String>),
                ColumnValue::Text(text) => query_builder.push_bind(text.clone()),
                ColumnValue::Integer(number) => query_builder.push_bind(*number),
                ColumnValue::Real(number) => query_builder.push_bind(*number),
                ColumnValue::Boolean(flag) => query_builder.push_bind(*flag),
            };
        }
    }
}

pub use sqlite_store::SqliteRecordStore;
