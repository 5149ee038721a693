use std::str::FromStr;

use log::{debug, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, QueryBuilder, Sqlite,
};
use tokio::runtime::Runtime;

use crate::item::rdbc::{DatabaseItemBinder, RowBinder};
use crate::model::{FieldKind, ModelDefinition, RecordStore, Row};
use crate::ImportError;

fn database_error(error: sqlx::Error) -> ImportError {
    ImportError::Database(error.to_string())
}

fn column_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "TEXT",
        FieldKind::Integer => "INTEGER",
        FieldKind::Number => "REAL",
        FieldKind::Boolean => "BOOLEAN",
    }
}

/// A record store inserting rows into a SQLite database using SQLx.
///
/// The store owns a single-threaded tokio runtime and blocks on every
/// statement, so records can save themselves synchronously. The database
/// file is created when missing.
///
/// # Examples
///
/// ```no_run
/// use model_importer::item::rdbc::SqliteRecordStore;
/// use model_importer::model::{ModelCatalog, RecordStore};
///
/// let catalog = ModelCatalog::from_path("models.json").unwrap();
/// let store = SqliteRecordStore::connect("sqlite://import.db").unwrap();
/// for model in &catalog.models {
///     store.prepare(model).unwrap();
/// }
/// ```
pub struct SqliteRecordStore {
    runtime: Runtime,
    pool: Pool<Sqlite>,
    binder: RowBinder,
}

impl SqliteRecordStore {
    /// Opens the database at `url`, e.g. `sqlite://import.db` or `sqlite::memory:`.
    pub fn connect(url: &str) -> Result<Self, ImportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(database_error)?
            .create_if_missing(true);

        // one connection, so that in-memory databases are shared by every statement
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(database_error)?;

        info!("Connected to {}", url);

        Ok(Self {
            runtime,
            pool,
            binder: RowBinder,
        })
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> Result<i64, ImportError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        self.runtime
            .block_on(sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool))
            .map_err(database_error)
    }

    fn create_table_sql(model: &ModelDefinition) -> String {
        let mut columns = Vec::with_capacity(model.fields.len() + 1);

        if model.field("id").is_none() {
            columns.push("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
        }
        for field in &model.fields {
            let mut column = format!("\"{}\" {}", field.name, column_type(field.kind));
            if field.name == "id" {
                column.push_str(" PRIMARY KEY");
            }
            columns.push(column);
        }

        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            model.table,
            columns.join(", ")
        )
    }
}

impl RecordStore for SqliteRecordStore {
    fn prepare(&self, model: &ModelDefinition) -> Result<(), ImportError> {
        let sql = Self::create_table_sql(model);
        debug!("{}", sql);
        self.runtime
            .block_on(sqlx::query(&sql).execute(&self.pool))
            .map_err(database_error)?;
        Ok(())
    }

    fn insert(&self, table: &str, row: &Row) -> Result<(), ImportError> {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("INSERT INTO \"{}\"", table));

        if row.is_empty() {
            query_builder.push(" DEFAULT VALUES");
        } else {
            query_builder.push(" (");
            let mut columns = query_builder.separated(", ");
            for (name, _) in row {
                columns.push(format!("\"{}\"", name));
            }
            query_builder.push(") VALUES (");
            self.binder.bind(row, query_builder.separated(", "));
            query_builder.push(")");
        }

        let query = query_builder.build();
        let result = self
            .runtime
            .block_on(query.execute(&self.pool))
            .map_err(database_error)?;

        debug!("Inserted {} row into {}", result.rows_affected(), table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnValue, FieldDefinition, FieldKind};

    fn article() -> ModelDefinition {
        ModelDefinition {
            name: "Article".to_string(),
            table: "article".to_string(),
            fields: vec![
                FieldDefinition::new("title", FieldKind::String),
                FieldDefinition::new("year", FieldKind::Integer),
                FieldDefinition::new("published", FieldKind::Boolean),
            ],
        }
    }

    #[test]
    fn create_table_should_add_implicit_id() {
        assert_eq!(
            SqliteRecordStore::create_table_sql(&article()),
            "CREATE TABLE IF NOT EXISTS \"article\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"title\" TEXT, \"year\" INTEGER, \"published\" BOOLEAN)"
        );

        let mut model = article();
        model.fields.insert(0, FieldDefinition::new("id", FieldKind::Integer));
        assert!(SqliteRecordStore::create_table_sql(&model)
            .contains("(\"id\" INTEGER PRIMARY KEY, \"title\" TEXT"));
    }

    #[test]
    fn rows_should_be_inserted_in_memory_database() -> Result<(), ImportError> {
        let store = SqliteRecordStore::connect("sqlite::memory:")?;
        let model = article();
        store.prepare(&model)?;
        store.prepare(&model)?;

        store.insert(
            "article",
            &vec![
                ("title".to_string(), ColumnValue::Text("A".to_string())),
                ("year".to_string(), ColumnValue::Integer(1948)),
                ("published".to_string(), ColumnValue::Boolean(true)),
            ],
        )?;
        store.insert(
            "article",
            &vec![("title".to_string(), ColumnValue::Null)],
        )?;
        store.insert("article", &Vec::new())?;

        assert_eq!(store.count("article")?, 3);

        let titles: Vec<Option<String>> = store
            .runtime
            .block_on(
                sqlx::query_scalar("SELECT title FROM article ORDER BY id").fetch_all(&store.pool),
            )
            .map_err(database_error)?;
        assert_eq!(titles, vec![Some("A".to_string()), None, None]);

        Ok(())
    }

    #[test]
    fn missing_table_should_be_reported() {
        let store = SqliteRecordStore::connect("sqlite::memory:").unwrap();

        let result = store.insert(
            "missing",
            &vec![("title".to_string(), ColumnValue::Text("A".to_string()))],
        );

        assert!(matches!(result, Err(ImportError::Database(_))));
    }
}
