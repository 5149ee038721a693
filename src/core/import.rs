use std::{
    cell::{Cell, RefCell},
    io::{self, BufRead, Stdin, Stdout, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::{config::AliasResolver, ImportError};

use super::{
    build_name,
    item::{Document, Item},
    registry::{ModelRegistry, RecordFactory},
    report::ImportReporter,
};

/// Decides whether the import goes on after a failed save.
pub trait ContinueDecision {
    fn confirm_continue(&self) -> bool;
}

impl<F: Fn() -> bool> ContinueDecision for F {
    fn confirm_continue(&self) -> bool {
        self()
    }
}

/// Non-interactive policy: always proceed with the next item.
#[derive(Default, Debug, Clone, Copy)]
pub struct AlwaysContinue;

impl ContinueDecision for AlwaysContinue {
    fn confirm_continue(&self) -> bool {
        true
    }
}

/// Asks the operator `Continue import? (yes|no) [yes]:`.
///
/// An empty answer or end of input takes the default (continue). Anything
/// other than `y`, `yes`, `n` or `no` asks again.
pub struct PromptDecision<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl PromptDecision<io::StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptDecision<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn ask(&self) -> io::Result<Option<bool>> {
        let mut output = self.output.borrow_mut();
        write!(output, "Continue import? (yes|no) [yes]:")?;
        output.flush()?;

        let mut answer = String::new();
        if self.input.borrow_mut().read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(Some(true));
        }

        Ok(match answer.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        })
    }
}

impl<R: BufRead, W: Write> ContinueDecision for PromptDecision<R, W> {
    fn confirm_continue(&self) -> bool {
        loop {
            match self.ask() {
                Ok(Some(answer)) => return answer,
                Ok(None) => continue,
                Err(error) => {
                    warn!("Unable to read the answer, continuing: {}", error);
                    return true;
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImportStatus {
    /// Every item was processed.
    Completed,
    /// The operator declined to continue after a failed save.
    Stopped,
}

/// Outcome of one import run.
#[derive(Debug)]
pub struct ImportExecution {
    pub id: Uuid,
    pub name: String,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    pub status: ImportStatus,
    /// Items handed to a record, saved or not.
    pub processed_count: usize,
    /// Items whose record saved.
    pub saved_count: usize,
    pub failed_count: usize,
    pub skipped_field_count: usize,
}

/// Maps the items of a document onto records and saves them one by one.
pub struct Importer<'a, 'r> {
    id: Uuid,
    name: String,
    registry: &'a ModelRegistry<'r>,
    reporter: &'a dyn ImportReporter,
    decision: &'a dyn ContinueDecision,
    aliases: Option<&'a AliasResolver>,
    processed_count: Cell<usize>,
    saved_count: Cell<usize>,
    failed_count: Cell<usize>,
    skipped_field_count: Cell<usize>,
}

impl<'a, 'r> Importer<'a, 'r> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Imports every `node_name` element of the XML file at `file_path` as a
    /// `type_name` record.
    #[cfg(feature = "xml")]
    pub fn import_xml<P: AsRef<Path>>(
        &self,
        file_path: P,
        type_name: &str,
        node_name: &str,
    ) -> Result<ImportExecution, ImportError> {
        use crate::item::xml::XmlDocumentReaderBuilder;

        let factory = self.registry.resolve(type_name)?;
        let path = self.resolve_path(file_path.as_ref())?;

        let document = XmlDocumentReaderBuilder::new()
            .node_name(node_name)
            .from_path(&path)?;

        if document.is_empty() {
            return Err(ImportError::NoMatchingNodes(node_name.to_string()));
        }

        info!(
            "Importing {} '{}' nodes from {} as {}",
            document.len(),
            node_name,
            path.display(),
            type_name
        );
        Ok(self.run(factory, document))
    }

    /// Imports the entries of the JSON file at `file_path` as `type_name` records.
    #[cfg(feature = "json")]
    pub fn import_json<P: AsRef<Path>>(
        &self,
        file_path: P,
        type_name: &str,
    ) -> Result<ImportExecution, ImportError> {
        use crate::item::json::JsonDocumentReaderBuilder;

        let factory = self.registry.resolve(type_name)?;
        let path = self.resolve_path(file_path.as_ref())?;

        let document = JsonDocumentReaderBuilder::new().from_path(&path)?;

        info!(
            "Importing {} entries from {} as {}",
            document.len(),
            path.display(),
            type_name
        );
        Ok(self.run(factory, document))
    }

    /// Imports an already loaded document as `type_name` records.
    pub fn import_document(
        &self,
        document: Document,
        type_name: &str,
    ) -> Result<ImportExecution, ImportError> {
        let factory = self.registry.resolve(type_name)?;
        Ok(self.run(factory, document))
    }

    fn resolve_path(&self, file_path: &Path) -> Result<PathBuf, ImportError> {
        match self.aliases {
            Some(aliases) => aliases.resolve_file(file_path),
            None => AliasResolver::new().resolve_file(file_path),
        }
    }

    fn run(&self, factory: &RecordFactory<'r>, document: Document) -> ImportExecution {
        let start = Instant::now();

        debug!("Start of import {}", self.name);

        self.processed_count.set(0);
        self.saved_count.set(0);
        self.failed_count.set(0);
        self.skipped_field_count.set(0);

        let mut status = ImportStatus::Completed;

        for item in document {
            self._inc_processed_count();
            let ordinal = self.processed_count.get();

            if !self._import_item(factory, item, ordinal) {
                self._inc_failed_count();

                if !self.decision.confirm_continue() {
                    status = ImportStatus::Stopped;
                    break;
                }
            }
        }

        match status {
            ImportStatus::Completed => self.reporter.finished(self.saved_count.get()),
            ImportStatus::Stopped => self.reporter.stopped(),
        }

        info!(
            "End of import {}: {} processed, {} saved, {} failed",
            self.name,
            self.processed_count.get(),
            self.saved_count.get(),
            self.failed_count.get()
        );

        ImportExecution {
            id: self.id,
            name: self.name.clone(),
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            status,
            processed_count: self.processed_count.get(),
            saved_count: self.saved_count.get(),
            failed_count: self.failed_count.get(),
            skipped_field_count: self.skipped_field_count.get(),
        }
    }

    /// Returns whether the record built from `item` was saved.
    fn _import_item(&self, factory: &RecordFactory<'r>, item: Item, ordinal: usize) -> bool {
        let mut record = factory();

        for (field, value) in item {
            if record.try_set(&field, value) {
                debug!("Item {}: set '{}'", ordinal, field);
            } else {
                self._inc_skipped_field_count();
                self.reporter.field_skipped(&field, ordinal);
            }
        }

        if record.save() {
            self._inc_saved_count();
            debug!("Item {} saved", ordinal);
            true
        } else {
            self.reporter.save_failed(ordinal, &record.errors());
            false
        }
    }

    fn _inc_processed_count(&self) {
        self.processed_count.set(self.processed_count.get() + 1);
    }

    fn _inc_saved_count(&self) {
        self.saved_count.set(self.saved_count.get() + 1);
    }

    fn _inc_failed_count(&self) {
        self.failed_count.set(self.failed_count.get() + 1);
    }

    fn _inc_skipped_field_count(&self) {
        self.skipped_field_count
            .set(self.skipped_field_count.get() + 1);
    }
}

pub struct ImporterBuilder<'a, 'r> {
    name: Option<String>,
    registry: Option<&'a ModelRegistry<'r>>,
    reporter: Option<&'a dyn ImportReporter>,
    decision: Option<&'a dyn ContinueDecision>,
    aliases: Option<&'a AliasResolver>,
}

impl Default for ImporterBuilder<'_, '_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, 'r> ImporterBuilder<'a, 'r> {
    pub fn new() -> Self {
        Self {
            name: None,
            registry: None,
            reporter: None,
            decision: None,
            aliases: None,
        }
    }

    pub fn name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn registry(mut self, registry: &'a ModelRegistry<'r>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn reporter(mut self, reporter: &'a impl ImportReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Decision asked after each failed save. Defaults to [`AlwaysContinue`].
    pub fn decision(mut self, decision: &'a dyn ContinueDecision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Selects between the interactive prompt on stdin and [`AlwaysContinue`].
    pub fn interactive(self, interactive: bool, prompt: &'a dyn ContinueDecision) -> Self {
        if interactive {
            self.decision(prompt)
        } else {
            self.decision(&AlwaysContinue)
        }
    }

    pub fn aliases(mut self, aliases: &'a AliasResolver) -> Self {
        self.aliases = Some(aliases);
        self
    }

    /// # Panics
    ///
    /// Panics when no registry or reporter was given.
    pub fn build(self) -> Importer<'a, 'r> {
        Importer {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            registry: self.registry.expect("an importer needs a model registry"),
            reporter: self.reporter.expect("an importer needs a reporter"),
            decision: self.decision.unwrap_or(&AlwaysContinue),
            aliases: self.aliases,
            processed_count: Cell::new(0),
            saved_count: Cell::new(0),
            failed_count: Cell::new(0),
            skipped_field_count: Cell::new(0),
        }
    }
}
