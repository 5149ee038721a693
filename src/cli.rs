//! `model-import` command line.

use std::path::{Path, PathBuf};

use clap::{builder::BoolishValueParser, ArgAction, Args, Parser, Subcommand};
use log::debug;

use crate::{
    config::{AliasResolver, ImportConfig, DEFAULT_DATABASE_URL, DEFAULT_MODELS_PATH},
    core::{
        import::{ImportExecution, ImporterBuilder, PromptDecision},
        registry::ModelRegistry,
        report::ConsoleReporter,
    },
    item::{logger::LoggerRecordStore, rdbc::SqliteRecordStore, xml::DEFAULT_NODE_NAME},
    model::{ModelCatalog, RecordStore},
    ImportError,
};

/// Import XML or JSON records into models.
///
/// Hint: use `--interactive 0` to run an import without a break.
#[derive(Parser, Debug)]
#[command(name = "model-import", version, about)]
pub struct Cli {
    /// JSON file defining the models
    #[arg(long, global = true, env = "MODEL_IMPORT_MODELS", default_value = DEFAULT_MODELS_PATH)]
    pub models: PathBuf,

    /// Database the records are saved to
    #[arg(long, global = true, env = "MODEL_IMPORT_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database: String,

    /// Path alias usable as `@NAME/...` in file paths (repeatable)
    #[arg(long = "alias", value_name = "NAME=PATH", global = true)]
    pub aliases: Vec<String>,

    /// Validate and log records without saving them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import XML files
    Xml(XmlArgs),
    /// Import JSON files
    Json(JsonArgs),
}

#[derive(Args, Debug)]
pub struct XmlArgs {
    /// Path to the .xml file
    pub file_path: PathBuf,

    /// Name of the model the items are converted to
    pub model_class: String,

    /// Name of the enclosing node of each item
    #[arg(long, default_value = DEFAULT_NODE_NAME)]
    pub node_name: String,

    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Args, Debug)]
pub struct JsonArgs {
    /// Path to the .json file
    pub file_path: PathBuf,

    /// Name of the model the items are converted to
    pub model_class: String,

    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Ask whether to continue after an item failed to save
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub interactive: bool,
}

impl Cli {
    pub fn model_class(&self) -> &str {
        match &self.command {
            Commands::Xml(args) => &args.model_class,
            Commands::Json(args) => &args.model_class,
        }
    }

    pub fn file_path(&self) -> &Path {
        match &self.command {
            Commands::Xml(args) => &args.file_path,
            Commands::Json(args) => &args.file_path,
        }
    }

    pub fn config(&self) -> Result<ImportConfig, ImportError> {
        let aliases = self
            .aliases
            .iter()
            .map(|definition| AliasResolver::parse_definition(definition))
            .collect::<Result<AliasResolver, ImportError>>()?;

        let interactive = match &self.command {
            Commands::Xml(args) => args.prompt.interactive,
            Commands::Json(args) => args.prompt.interactive,
        };

        Ok(ImportConfig {
            models_path: self.models.clone(),
            database_url: self.database.clone(),
            aliases,
            dry_run: self.dry_run,
            interactive,
        })
    }
}

/// Runs the parsed command.
///
/// The model class is resolved first, then the import file is checked.
/// The database is only opened once both exist.
pub fn run(cli: &Cli) -> Result<ImportExecution, ImportError> {
    let config = cli.config()?;
    let catalog = ModelCatalog::from_path(&config.models_path)?;

    let model = catalog
        .get(cli.model_class())
        .ok_or_else(|| ImportError::UnknownType(cli.model_class().to_string()))?;
    config.aliases.resolve_file(cli.file_path())?;

    let store: Box<dyn RecordStore> = if config.dry_run {
        debug!("Dry run, records are only logged");
        Box::new(LoggerRecordStore::default())
    } else {
        Box::new(SqliteRecordStore::connect(&config.database_url)?)
    };
    store.prepare(model)?;

    let mut registry = ModelRegistry::new();
    catalog.register_all(&mut registry, store.as_ref());

    let reporter = ConsoleReporter::stdio();
    let prompt = PromptDecision::stdio();

    let importer = ImporterBuilder::new()
        .registry(&registry)
        .reporter(&reporter)
        .interactive(config.interactive, &prompt)
        .aliases(&config.aliases)
        .build();

    match &cli.command {
        Commands::Xml(args) => {
            importer.import_xml(&args.file_path, &args.model_class, &args.node_name)
        }
        Commands::Json(args) => importer.import_json(&args.file_path, &args.model_class),
    }
}
