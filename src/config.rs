use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::debug;

use crate::ImportError;

pub const DEFAULT_MODELS_PATH: &str = "models.json";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://import.db";

/// Expands `@alias` prefixes of file paths.
///
/// `@data/items.xml` resolves to `<data path>/items.xml`. Paths without a
/// leading `@` are returned unchanged; an unknown alias resolves to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasResolver {
    aliases: HashMap<String, PathBuf>,
}

impl AliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `@name`. A leading `@` in `name` is optional.
    pub fn insert<S: AsRef<str>, P: Into<PathBuf>>(&mut self, name: S, path: P) {
        let name = name.as_ref().trim_start_matches('@').to_string();
        self.aliases.insert(name, path.into());
    }

    /// Parses a `name=path` definition.
    pub fn parse_definition(definition: &str) -> Result<(String, PathBuf), ImportError> {
        match definition.split_once('=') {
            Some((name, path)) if !name.trim_start_matches('@').is_empty() && !path.is_empty() => {
                Ok((name.trim_start_matches('@').to_string(), PathBuf::from(path)))
            }
            _ => Err(ImportError::Config(format!(
                "Invalid alias '{}', expected NAME=PATH",
                definition
            ))),
        }
    }

    pub fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let Some(text) = path.to_str() else {
            return Some(path.to_path_buf());
        };
        let Some(aliased) = text.strip_prefix('@') else {
            return Some(path.to_path_buf());
        };

        let (name, rest) = match aliased.split_once('/') {
            Some((name, rest)) => (name, Some(rest)),
            None => (aliased, None),
        };

        let base = self.aliases.get(name)?;
        Some(match rest {
            Some(rest) => base.join(rest),
            None => base.clone(),
        })
    }

    /// Resolves `path` and checks that it names an existing regular file.
    pub fn resolve_file(&self, path: &Path) -> Result<PathBuf, ImportError> {
        match self.resolve(path) {
            Some(resolved) if resolved.is_file() => Ok(resolved),
            Some(resolved) => {
                debug!("{} is not a regular file", resolved.display());
                Err(ImportError::FileNotFound)
            }
            None => {
                debug!("Unable to resolve alias of {}", path.display());
                Err(ImportError::FileNotFound)
            }
        }
    }
}

impl<S: AsRef<str>, P: Into<PathBuf>> FromIterator<(S, P)> for AliasResolver {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        let mut resolver = Self::new();
        for (name, path) in iter {
            resolver.insert(name, path);
        }
        resolver
    }
}

/// Settings of one command line run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub models_path: PathBuf,
    pub database_url: String,
    pub aliases: AliasResolver,
    /// Log rows instead of writing them.
    pub dry_run: bool,
    /// Ask before going on after a failed save.
    pub interactive: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            models_path: PathBuf::from(DEFAULT_MODELS_PATH),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            aliases: AliasResolver::new(),
            dry_run: false,
            interactive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_should_pass_through() {
        let resolver = AliasResolver::new();

        assert_eq!(
            resolver.resolve(Path::new("data/items.xml")),
            Some(PathBuf::from("data/items.xml"))
        );
    }

    #[test]
    fn aliases_should_be_expanded_by_root_segment() {
        let resolver: AliasResolver = vec![("@data", "/srv/import"), ("app", "/srv/app")]
            .into_iter()
            .collect();

        assert_eq!(
            resolver.resolve(Path::new("@data/2024/items.xml")),
            Some(PathBuf::from("/srv/import/2024/items.xml"))
        );
        assert_eq!(
            resolver.resolve(Path::new("@app")),
            Some(PathBuf::from("/srv/app"))
        );
        assert_eq!(resolver.resolve(Path::new("@runtime/items.xml")), None);
    }

    #[test]
    fn resolve_file_should_require_an_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let directory = file.path().parent().unwrap().to_path_buf();
        let file_name = file.path().file_name().unwrap().to_str().unwrap();
        let resolver: AliasResolver = vec![("tmp", directory.clone())].into_iter().collect();

        assert_eq!(
            resolver
                .resolve_file(Path::new(&format!("@tmp/{}", file_name)))
                .unwrap(),
            directory.join(file_name)
        );
        assert!(matches!(
            resolver.resolve_file(&directory),
            Err(ImportError::FileNotFound)
        ));
        assert!(matches!(
            resolver.resolve_file(Path::new("@other/items.xml")),
            Err(ImportError::FileNotFound)
        ));
        assert!(matches!(
            resolver.resolve_file(Path::new("/nonexistent/items.xml")),
            Err(ImportError::FileNotFound)
        ));
    }

    #[test]
    fn alias_definitions_should_be_parsed() {
        assert_eq!(
            AliasResolver::parse_definition("@data=/srv/import").unwrap(),
            ("data".to_string(), PathBuf::from("/srv/import"))
        );
        assert!(AliasResolver::parse_definition("data").is_err());
        assert!(AliasResolver::parse_definition("=/srv").is_err());
        assert!(AliasResolver::parse_definition("data=").is_err());
    }
}
