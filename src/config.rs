use serde::Deserialize;
use std::path::PathBuf;
use directories::ProjectDirs;
use anyhow::{Context, Result};
use std::fs;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Substring,
    Fuzzy,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub library_path: Option<PathBuf>,
    /// Command prefix for starting executables, e.g. "wine".
    #[serde(default)]
    pub exe_runner: Option<String>,
    #[serde(default)]
    pub search_mode: SearchMode,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScannerConfig {
    #[serde(default = "default_image_names")]
    pub image_names: Vec<String>,
    #[serde(default = "default_exe_ignore_prefixes")]
    pub exe_ignore_prefixes: Vec<String>,
    #[serde(default = "default_nested_exe_ignore_prefixes")]
    pub nested_exe_ignore_prefixes: Vec<String>,
    #[serde(default = "default_folder_ignore_names")]
    pub folder_ignore_names: Vec<String>,
    #[serde(default = "default_executable_extension")]
    pub executable_extension: String,
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_image_names() -> Vec<String> { strings(&["cover.png", "cover.jpg", "icon.png", "icon.jpg"]) }
fn default_exe_ignore_prefixes() -> Vec<String> { strings(&["UnityCrashHandler", "unins"]) }
fn default_nested_exe_ignore_prefixes() -> Vec<String> { strings(&["UnityCrashHandler"]) }
fn default_folder_ignore_names() -> Vec<String> { strings(&["_CommonRedist", "MonoBleedingEdge", "redist", "vcredist"]) }
fn default_executable_extension() -> String { "exe".to_string() }
fn default_manifest_name() -> String { "urls.json".to_string() }

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            image_names: default_image_names(),
            exe_ignore_prefixes: default_exe_ignore_prefixes(),
            nested_exe_ignore_prefixes: default_nested_exe_ignore_prefixes(),
            folder_ignore_names: default_folder_ignore_names(),
            executable_extension: default_executable_extension(),
            manifest_name: default_manifest_name(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Regexes matched against entry name and display path.
    #[serde(default)]
    pub hidden: Vec<String>,
}

pub fn config_path() -> PathBuf {
    match ProjectDirs::from("org", "appshelf", "appshelf") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = config_path();
    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    parse_config(&content).with_context(|| format!("parsing {}", config_path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}
