use crate::error::Error;
use crate::policy::{ConflictPolicy, SelectionPolicy};
use crate::scanner;
use crate::store::HistoryStore;
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base name of the optional configuration file in the working directory
/// (`pick-files.yaml`, `pick-files.toml`, ...).
pub const DEFAULT_CONFIG_NAME: &str = "pick-files";
pub const ENV_PREFIX: &str = "PICK_FILES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(alias = "folder")]
    pub folders: Vec<String>,
    pub destination: String,
    #[serde(alias = "destination-option")]
    pub destination_option: ConflictPolicy,
    pub number: usize,
    #[serde(alias = "suffix")]
    pub suffixes: Vec<String>,
    /// Humantime duration such as `36h` or `2w`; empty disables blocking.
    #[serde(alias = "block-selection")]
    pub block_selection: String,
    pub retention: String,
    #[serde(alias = "ignore-patterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            destination: "output".to_string(),
            destination_option: ConflictPolicy::Fail,
            number: 1,
            suffixes: Vec::new(),
            block_selection: String::new(),
            retention: "120d".to_string(),
            ignore_patterns: Vec::new(),
            database: None,
        }
    }
}

/// Layer defaults, `pick-files.*` in the working directory, an explicit file
/// (required when given) and `PICK_FILES_*` environment variables.
pub fn load_configuration(explicit: Option<&Path>) -> Result<AppConfig, Error> {
    let mut builder =
        Config::builder().add_source(ConfigFile::with_name(DEFAULT_CONFIG_NAME).required(false));

    if let Some(path) = explicit {
        builder = builder.add_source(ConfigFile::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("folders")
                .with_list_parse_key("suffixes")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;

    Ok(config.try_deserialize::<AppConfig>()?)
}

/// Parse a humantime duration; empty means zero.
pub fn parse_duration(input: &str) -> Result<Duration, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(trimmed)
        .map_err(|e| Error::InvalidPolicy(format!("invalid duration '{}': {}", input, e)))
}

impl AppConfig {
    pub fn selection_policy(&self, dry_run: bool) -> Result<SelectionPolicy, Error> {
        let policy = SelectionPolicy::new(self.number, &self.destination)
            .with_suffixes(&self.suffixes)
            .with_block_duration(parse_duration(&self.block_selection)?)
            .with_conflict_policy(self.destination_option)
            .with_retention(parse_duration(&self.retention)?)
            .with_dry_run(dry_run);
        policy.validate()?;
        Ok(policy)
    }

    /// Configured folders with nested duplicates removed.
    pub fn source_folders(&self) -> Result<Vec<String>, Error> {
        if self.folders.is_empty() {
            return Err(Error::InvalidPolicy(
                "no folders were specified; use --folder".to_string(),
            ));
        }
        Ok(scanner::non_overlapping_directories(self.folders.clone()))
    }

    pub fn history_store(&self) -> HistoryStore {
        match &self.database {
            Some(path) => HistoryStore::open(path),
            None => HistoryStore::open_default(),
        }
    }

    /// YAML rendering that `load_configuration` accepts back.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}
