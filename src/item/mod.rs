#[cfg(feature = "logger")]
/// This module provides a record store that only logs rows, for dry runs.
pub mod logger;

#[cfg(feature = "json")]
/// This module provides the JSON document reader.
pub mod json;

#[cfg(feature = "xml")]
/// This module provides the XML document reader.
pub mod xml;

#[cfg(feature = "rdbc-sqlite")]
/// This module provides the SQLite record store.
pub mod rdbc;
