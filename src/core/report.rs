use std::{
    cell::RefCell,
    fmt::Display,
    io::{self, Stderr, Stdout, Write},
};

use colored::Colorize;
use log::warn;

use super::item::ValidationErrors;

/// Receives the user-facing progress of an import.
///
/// `ordinal` is the 1-based position of the item among all items processed
/// so far, failed ones included.
pub trait ImportReporter {
    /// A field of item `ordinal` had no settable counterpart on the record.
    fn field_skipped(&self, field: &str, ordinal: usize);

    /// Item `ordinal` could not be saved.
    fn save_failed(&self, ordinal: usize, errors: &ValidationErrors);

    /// The operator declined to continue after a failed save.
    fn stopped(&self);

    /// The import went through every item.
    fn finished(&self, saved_count: usize);

    /// A fatal condition halted the import before or during processing.
    fn fatal(&self, error: &dyn Display);
}

/// Builds the summary line, e.g. `Saved 1 item` or `Saved 3 items`.
pub fn summary_line(saved_count: usize) -> String {
    let plural = if saved_count == 1 { "" } else { "s" };
    format!("Saved {} item{}", saved_count, plural)
}

/// Writes colored status lines: notices and the summary to `out`, failures to `err`.
pub struct ConsoleReporter<O: Write, E: Write> {
    out: RefCell<O>,
    err: RefCell<E>,
}

impl ConsoleReporter<Stdout, Stderr> {
    /// Reporter bound to the process standard output and error.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out: RefCell::new(out),
            err: RefCell::new(err),
        }
    }

    /// Gives back the underlying writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out.into_inner(), self.err.into_inner())
    }

    fn stdout(&self, line: impl Display) {
        let mut out = self.out.borrow_mut();
        if let Err(error) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("Unable to write to standard output: {}", error);
        }
    }

    fn stderr(&self, line: impl Display) {
        let mut err = self.err.borrow_mut();
        if let Err(error) = writeln!(err, "{}", line).and_then(|_| err.flush()) {
            warn!("Unable to write to standard error: {}", error);
        }
    }
}

impl<O: Write, E: Write> ImportReporter for ConsoleReporter<O, E> {
    fn field_skipped(&self, field: &str, ordinal: usize) {
        self.stdout(format!("Can not set attribute '{}' for item {}", field, ordinal).blue());
    }

    fn save_failed(&self, ordinal: usize, errors: &ValidationErrors) {
        self.stderr(format!("Item {} can not be saved", ordinal).red());
        for (attribute, messages) in errors.iter() {
            self.stderr(format!("{}:", attribute).red());
            for message in messages {
                self.stderr(format!(" - {}", message).red());
            }
        }
    }

    fn stopped(&self) {
        self.stderr(format!("\n{}", "Stopped import".red()));
    }

    fn finished(&self, saved_count: usize) {
        self.stdout(format!("\n{}", summary_line(saved_count).green()));
    }

    fn fatal(&self, error: &dyn Display) {
        self.stderr(error.to_string().red());
    }
}
