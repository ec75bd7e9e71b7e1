use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the blocksite binary.
#[derive(Debug, Parser)]
#[command(
    name = "blocksite",
    version,
    about = "Render Notion-style block snapshots into a static site"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "BLOCKSITE_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render every configured document and write the site (default).
    Build(Box<BuildArgs>),
    /// Manage the incremental render cache.
    Cache(CacheArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub overrides: BuildOverrides,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    Positional,
    Title,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildOverrides {
    /// Override the snapshot directory documents are read from.
    #[arg(long = "snapshot-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub snapshot_dir: Option<PathBuf>,

    /// Document to build, in navigation order. Repeat to build several;
    /// replaces the configured list.
    #[arg(long = "document", value_name = "ID")]
    pub documents: Vec<String>,

    /// Override the output directory.
    #[arg(long = "output-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Directory copied to `<output>/assets` before pages are written.
    #[arg(long = "assets-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub assets_dir: Option<PathBuf>,

    /// Empty the output directory before writing.
    #[arg(
        long = "clean",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub clean: Option<bool>,

    /// How output filenames are chosen.
    #[arg(long = "naming", value_enum, value_name = "MODE")]
    pub naming: Option<NamingArg>,

    /// Override the site title shown in every page title.
    #[arg(long = "site-title", value_name = "TITLE")]
    pub site_title: Option<String>,

    /// Ignore and do not update the render cache.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue)]
    pub no_cache: bool,

    #[command(flatten)]
    pub cache: CachePathOverride,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CachePathOverride {
    /// Override the cache file location.
    #[arg(long = "cache-path", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub cache_path: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CacheCommand {
    /// Delete the cache file so the next build renders everything.
    Clear(CacheClearArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct CacheClearArgs {
    #[command(flatten)]
    pub cache: CachePathOverride,
}
