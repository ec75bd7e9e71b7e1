//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{collections::HashSet, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::domain::pages::{DocumentId, PageNaming};

mod cli;

pub use cli::{
    BuildArgs, BuildOverrides, CacheArgs, CacheClearArgs, CacheCommand, CachePathOverride,
    CliArgs, Command, NamingArg,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blocksite";
const ENV_PREFIX: &str = "BLOCKSITE";
const DEFAULT_SNAPSHOT_DIR: &str = "snapshot";
const DEFAULT_OUTPUT_DIR: &str = "build";
const DEFAULT_CACHE_PATH: &str = ".blocksite-cache.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: SourceSettings,
    /// Documents to build, in navigation order.
    pub documents: Vec<DocumentId>,
    pub output: OutputSettings,
    pub site: SiteSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub snapshot_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
    pub assets_dir: Option<PathBuf>,
    pub clean: bool,
    pub naming: PageNaming,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(environment());

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Build(args)) => raw.apply_build_overrides(&args.overrides),
        Some(Command::Cache(args)) => match &args.command {
            CacheCommand::Clear(clear) => raw.apply_cache_path_override(&clear.cache),
        },
        None => raw.apply_build_overrides(&BuildOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// `BLOCKSITE__<SECTION>__<KEY>` variables; list values are comma-separated.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    source: RawSourceSettings,
    documents: Option<RawDocuments>,
    output: RawOutputSettings,
    site: RawSiteSettings,
    cache: RawCacheSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_build_overrides(&mut self, overrides: &BuildOverrides) {
        if let Some(dir) = overrides.snapshot_dir.as_ref() {
            self.source.snapshot_dir = Some(dir.clone());
        }
        if !overrides.documents.is_empty() {
            self.documents = Some(RawDocuments::List(overrides.documents.clone()));
        }
        if let Some(dir) = overrides.output_dir.as_ref() {
            self.output.directory = Some(dir.clone());
        }
        if let Some(dir) = overrides.assets_dir.as_ref() {
            self.output.assets_dir = Some(dir.clone());
        }
        if let Some(clean) = overrides.clean {
            self.output.clean = Some(clean);
        }
        if let Some(naming) = overrides.naming {
            self.output.naming = Some(
                match naming {
                    NamingArg::Positional => "positional",
                    NamingArg::Title => "title",
                }
                .to_string(),
            );
        }
        if let Some(title) = overrides.site_title.as_ref() {
            self.site.title = Some(title.clone());
        }
        if overrides.no_cache {
            self.cache.enabled = Some(false);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }

        self.apply_cache_path_override(&overrides.cache);
    }

    fn apply_cache_path_override(&mut self, overrides: &CachePathOverride) {
        if let Some(path) = overrides.cache_path.as_ref() {
            self.cache.path = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            source,
            documents,
            output,
            site,
            cache,
            logging,
        } = raw;

        let source = build_source_settings(source)?;
        let documents = build_documents(documents)?;
        let output = build_output_settings(output)?;
        let site = build_site_settings(site);
        let cache = build_cache_settings(cache)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            source,
            documents,
            output,
            site,
            cache,
            logging,
        })
    }
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let snapshot_dir = source
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_DIR));
    non_empty_path(&snapshot_dir, "source.snapshot_dir")?;
    Ok(SourceSettings { snapshot_dir })
}

fn build_documents(documents: Option<RawDocuments>) -> Result<Vec<DocumentId>, LoadError> {
    let values = match documents {
        Some(RawDocuments::List(values)) => values,
        Some(RawDocuments::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(values.len());
    for value in values {
        let id = DocumentId::new(value);
        if id.as_str().is_empty() {
            continue;
        }
        if !seen.insert(id.clone()) {
            return Err(LoadError::invalid(
                "documents",
                format!("document `{id}` is listed more than once"),
            ));
        }
        ids.push(id);
    }
    Ok(ids)
}

fn build_output_settings(output: RawOutputSettings) -> Result<OutputSettings, LoadError> {
    let directory = output
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    non_empty_path(&directory, "output.directory")?;

    let assets_dir = output
        .assets_dir
        .filter(|path| !path.as_os_str().is_empty());

    let naming = match output.naming.as_deref().map(str::trim) {
        None | Some("") | Some("positional") => PageNaming::Positional,
        Some("title") => PageNaming::Title,
        Some(other) => {
            return Err(LoadError::invalid(
                "output.naming",
                format!("expected `positional` or `title`, got `{other}`"),
            ));
        }
    };

    Ok(OutputSettings {
        directory,
        assets_dir,
        clean: output.clean.unwrap_or(true),
        naming,
    })
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        title: site
            .title
            .map(|title| title.trim().to_string())
            .unwrap_or_default(),
    }
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let path = cache
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
    non_empty_path(&path, "cache.path")?;
    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        path,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty_path(path: &std::path::Path, key: &'static str) -> Result<(), LoadError> {
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(())
}

/// A list in configuration files; a comma-separated string from the
/// environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawDocuments {
    List(Vec<String>),
    Joined(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    snapshot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOutputSettings {
    directory: Option<PathBuf>,
    assets_dir: Option<PathBuf>,
    clean: Option<bool>,
    naming: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests;
