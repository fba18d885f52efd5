//! Application configuration for autodict.
//!
//! User config lives at `~/.autodict/autodict.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AutodictError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "autodict.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".autodict";

/// Standard binary directories scanned when none are configured.
pub const DEFAULT_DIRECTORIES: &[&str] = &["/bin", "/usr/bin", "/usr/local/bin", "/sbin", "/usr/sbin"];

/// Tag vocabulary applied to every dictionary entry.
pub const DEFAULT_TAGS: &[&str] = &["start", "open", "launch", "run", "service", "daemon"];

/// Default output artifact, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "auto_dictionary.json";

// ---------------------------------------------------------------------------
// Config structs (matching autodict.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Executable discovery.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Output dictionary.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Documentation services.
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// `[scan]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directories to scan, in order.
    #[serde(default = "default_directories")]
    pub directories: Vec<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directories: default_directories(),
        }
    }
}

fn default_directories() -> Vec<PathBuf> {
    DEFAULT_DIRECTORIES.iter().map(PathBuf::from).collect()
}

/// `[catalog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Tags attached to every entry, in order.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,

    /// Output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            output: default_output(),
        }
    }
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| (*t).to_string()).collect()
}
fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

/// `[lookup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// One-line summary service (invoked as `<cmd> <name>`).
    #[serde(default = "default_summary_command")]
    pub summary_command: String,

    /// Full manual service (invoked as `<cmd> <name>`).
    #[serde(default = "default_manual_command")]
    pub manual_command: String,

    /// Per-lookup timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum commands enriched at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            summary_command: default_summary_command(),
            manual_command: default_manual_command(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_summary_command() -> String {
    "whatis".into()
}
fn default_manual_command() -> String {
    "man".into()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_concurrency() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directories to scan for executables.
    pub directories: Vec<PathBuf>,
    /// Tags attached to every entry.
    pub tags: Vec<String>,
    /// Where the dictionary is written.
    pub output: PathBuf,
    /// Summary service command.
    pub summary_command: String,
    /// Manual service command.
    pub manual_command: String,
    /// Per-lookup timeout.
    pub timeout: Duration,
    /// Maximum concurrent enrichments.
    pub concurrency: usize,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            directories: config.scan.directories.clone(),
            tags: config.catalog.tags.clone(),
            output: config.catalog.output.clone(),
            summary_command: config.lookup.summary_command.clone(),
            manual_command: config.lookup.manual_command.clone(),
            timeout: Duration::from_secs(config.lookup.timeout_secs),
            concurrency: config.lookup.concurrency,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AutodictError::config("concurrency must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(AutodictError::config("lookup timeout must be at least 1 second"));
        }
        if self.summary_command.trim().is_empty() || self.manual_command.trim().is_empty() {
            return Err(AutodictError::config("documentation service commands must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.autodict/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AutodictError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.autodict/autodict.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AutodictError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| AutodictError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AutodictError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| AutodictError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AutodictError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
