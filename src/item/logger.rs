use log::info;

use crate::{
    model::{RecordStore, Row},
    ImportError,
};

/// Logs every row instead of persisting it. Used for dry runs.
#[derive(Default)]
pub struct LoggerRecordStore {}

impl RecordStore for LoggerRecordStore {
    fn insert(&self, table: &str, row: &Row) -> Result<(), ImportError> {
        let columns: Vec<String> = row
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        info!("Record:{} {{{}}}", table, columns.join(", "));
        Ok(())
    }
}
