use std::env;
use std::path::{Path, PathBuf};
use directories::BaseDirs;
use log::debug;
use crate::config::Config;
use crate::model::Category;

pub const LIBRARY_ENV: &str = "MG_LIBRARY_PATH";

/// Picks the library root: environment, then config, then the platform default,
/// then a development layout next to the binary.
pub fn resolve_library_root(config: &Config) -> PathBuf {
    let exe_candidate = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("..").join("..").join("..").join("Game")));

    resolve_from(
        env::var(LIBRARY_ENV).ok().as_deref(),
        config.general.library_path.as_deref(),
        &default_library_root(),
        exe_candidate.as_deref(),
    )
}

pub fn default_library_root() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join("Apps"),
        None => PathBuf::from("Apps"),
    }
}

pub fn category_dir(root: &Path, category: Category) -> PathBuf {
    root.join(category.as_str())
}

fn resolve_from(
    env_value: Option<&str>,
    configured: Option<&Path>,
    default: &Path,
    exe_candidate: Option<&Path>,
) -> PathBuf {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        let path = Path::new(value);
        if path.is_dir() {
            debug!("Library root from {}: {:?}", LIBRARY_ENV, path);
            return path.to_path_buf();
        }
        debug!("{} points at {:?}, which is not a directory", LIBRARY_ENV, path);
    }

    if let Some(path) = configured.filter(|p| p.is_dir()) {
        debug!("Library root from config: {:?}", path);
        return path.to_path_buf();
    }

    if default.is_dir() {
        return default.to_path_buf();
    }

    if let Some(candidate) = exe_candidate.filter(|p| p.is_dir()) {
        debug!("Library root from development layout: {:?}", candidate);
        return candidate.to_path_buf();
    }

    default.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn env_wins_when_directory_exists() {
        let env_dir = tempdir().unwrap();
        let config_dir = tempdir().unwrap();
        let env_value = env_dir.path().to_str().unwrap();

        let root = resolve_from(Some(env_value), Some(config_dir.path()), Path::new("/nope"), None);
        assert_eq!(root, env_dir.path());
    }

    #[test]
    fn blank_or_missing_env_falls_through_to_config() {
        let config_dir = tempdir().unwrap();

        let root = resolve_from(Some("   "), Some(config_dir.path()), Path::new("/nope"), None);
        assert_eq!(root, config_dir.path());

        let root = resolve_from(Some("/does/not/exist"), Some(config_dir.path()), Path::new("/nope"), None);
        assert_eq!(root, config_dir.path());
    }

    #[test]
    fn default_preferred_over_development_layout() {
        let default = tempdir().unwrap();
        let dev = tempdir().unwrap();

        let root = resolve_from(None, None, default.path(), Some(dev.path()));
        assert_eq!(root, default.path());
    }

    #[test]
    fn development_layout_used_when_default_missing() {
        let dev = tempdir().unwrap();
        let game = dev.path().join("Game");
        fs::create_dir(&game).unwrap();

        let root = resolve_from(None, Some(Path::new("/nope/config")), Path::new("/nope"), Some(game.as_path()));
        assert_eq!(root, game);
    }

    #[test]
    fn nothing_exists_returns_default() {
        let root = resolve_from(None, None, Path::new("/nope/Apps"), Some(Path::new("/nope/Game")));
        assert_eq!(root, PathBuf::from("/nope/Apps"));
    }

    #[test]
    fn category_dir_uses_category_name() {
        assert_eq!(category_dir(Path::new("/lib"), Category::Web), PathBuf::from("/lib/Web"));
    }
}
