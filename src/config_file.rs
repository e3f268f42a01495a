use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{Args, Mode};
use crate::grid_processing::batch::DEFAULT_EXTENSIONS;
use crate::grid_processing::{ResizeFilter, DEFAULT_GRID_SIZE};
use crate::utils::parse_extensions;

/// Optional defaults loaded with `--config`.
///
/// ```json
/// { "width": 64, "height": 48, "filter": "mitchell", "compact": true }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub output: Option<PathBuf>,
    pub filter: Option<ResizeFilter>,
    pub compact: Option<bool>,
    pub jobs: Option<usize>,
    pub extensions: Option<String>,
    pub report: Option<bool>,
    pub verbose: Option<bool>,
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Effective settings after merging flags, config file and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: Mode,
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    /// Unvalidated; the converter rejects values below 1
    pub width: i64,
    pub height: i64,
    pub filter: ResizeFilter,
    pub pretty: bool,
    pub jobs: usize,
    pub extensions: Vec<String>,
    pub report: bool,
    pub verbose: bool,
    pub json_progress: bool,
}

impl Settings {
    /// Command-line flags win over the config file, which wins over defaults
    pub fn resolve(args: Args, config: ConfigFile) -> Self {
        let mode = args.mode();
        let jobs = args.jobs.or(config.jobs).unwrap_or(0);
        let extensions = args
            .extensions
            .or(config.extensions)
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.to_string());

        Self {
            mode,
            output: args.output.or(config.output),
            width: args
                .width
                .or(config.width)
                .unwrap_or(i64::from(DEFAULT_GRID_SIZE)),
            height: args
                .height
                .or(config.height)
                .unwrap_or(i64::from(DEFAULT_GRID_SIZE)),
            filter: args.filter.or(config.filter).unwrap_or_default(),
            pretty: !(args.compact || config.compact.unwrap_or(false)),
            jobs: if jobs == 0 { num_cpus::get() } else { jobs },
            extensions: parse_extensions(&extensions),
            report: args.report || config.report.unwrap_or(false),
            verbose: args.verbose || config.verbose.unwrap_or(false),
            json_progress: args.json_progress,
            inputs: args.inputs,
        }
    }

    /// Load the config file named by `--config`, if any, and resolve
    pub fn from_args(args: Args) -> Result<Self> {
        let config = match &args.config_file {
            Some(path) => load_config(path)?,
            None => ConfigFile::default(),
        };
        Ok(Self::resolve(args, config))
    }
}
