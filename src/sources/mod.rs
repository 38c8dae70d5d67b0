use crate::config::ScannerConfig;
use crate::model::{Category, Entry, SourceKind};
use anyhow::Result;
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait Source {
    fn scan(&self, root: &Path, category: Category) -> Result<Vec<Entry>>;
}

pub mod apps;
pub mod web;

use apps::AppSource;
use web::WebSource;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Names and patterns the scanner matches against while resolving entries.
#[derive(Debug, Clone)]
pub struct ScanRules {
    pub image_names: Vec<String>,
    pub exe_ignore_prefixes: Vec<String>,
    pub nested_exe_ignore_prefixes: Vec<String>,
    pub folder_ignore_names: Vec<String>,
    pub executable_extension: String,
    pub manifest_name: String,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanRules {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            image_names: config.image_names.clone(),
            exe_ignore_prefixes: config.exe_ignore_prefixes.clone(),
            nested_exe_ignore_prefixes: config.nested_exe_ignore_prefixes.clone(),
            folder_ignore_names: config.folder_ignore_names.clone(),
            executable_extension: config.executable_extension.trim_start_matches('.').to_string(),
            manifest_name: config.manifest_name.clone(),
        }
    }
}

impl ScanRules {
    pub fn is_executable(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.executable_extension))
    }

    pub fn is_ignored_folder(&self, name: &str) -> bool {
        self.folder_ignore_names.iter().any(|ignored| ignored.eq_ignore_ascii_case(name))
    }

    /// First of `image_names` present in `dir`.
    pub fn find_cover(&self, dir: &Path) -> Option<PathBuf> {
        self.image_names
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

pub fn starts_with_any(file_name: &str, prefixes: &[String]) -> bool {
    let lowered = file_name.to_lowercase();
    prefixes.iter().any(|prefix| lowered.starts_with(&prefix.to_lowercase()))
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Immediate children of `dir`, split into files and directories, each sorted by name.
pub fn list_dir(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ScanError> {
    let read_dir = fs::read_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

/// Upper-cases one char at a time; chars whose upper case expands (`ß`) stay as they are.
fn ordinal_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}

/// Case-insensitive ordinal order on names; equal names keep scan order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|entry| ordinal_key(&entry.name));
}

pub struct LibraryScanner {
    rules: ScanRules,
}

impl Default for LibraryScanner {
    fn default() -> Self {
        Self::new(ScanRules::default())
    }
}

impl LibraryScanner {
    pub fn new(rules: ScanRules) -> Self {
        Self { rules }
    }

    /// Scans one category directory. Never fails: a missing root or broken
    /// manifest yields an empty list, unresolvable candidates are skipped.
    pub fn scan(&self, root: &Path, category: Category) -> Vec<Entry> {
        if !root.is_dir() {
            debug!("{}: root {:?} does not exist, skipping", category, root);
            return Vec::new();
        }

        let result = match category.kind() {
            SourceKind::FileSystem => AppSource::new(&self.rules).scan(root, category),
            SourceKind::Web => WebSource::new(&self.rules).scan(root, category),
        };

        let mut entries = result.unwrap_or_else(|e| {
            warn!("{}: scan of {:?} failed: {:#}", category, root, e);
            Vec::new()
        });
        sort_entries(&mut entries);

        info!("{}: found {} entries", category, entries.len());
        entries
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempdir().unwrap();
        let scanner = LibraryScanner::default();
        for category in Category::ALL {
            assert!(scanner.scan(&dir.path().join("absent"), category).is_empty());
        }
    }

    #[test]
    fn entries_sorted_case_insensitively() {
        let dir = tempdir().unwrap();
        for name in ["zeta", "Alpha", "beta"] {
            touch(&dir.path().join(name).join(format!("{}.exe", name)));
        }

        let entries = LibraryScanner::default().scan(dir.path(), Category::Game);
        assert_eq!(names(&entries), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn sort_key_maps_chars_one_to_one() {
        assert_eq!(ordinal_key("Straße"), "STRAßE");
        assert_eq!(ordinal_key("éclair_x"), "ÉCLAIR_X");

        let entry = |name: &str| {
            Entry::new_app(
                name.to_string(),
                PathBuf::from(format!("/lib/{name}/{name}.exe")),
                PathBuf::from(format!("/lib/{name}")),
                None,
                Category::Game,
            )
        };
        let mut entries = vec![entry("Straße"), entry("strasse"), entry("_tools"), entry("Alpha")];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["Alpha", "strasse", "Straße", "_tools"]);
    }

    #[test]
    fn folders_without_executables_are_skipped() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Docs").join("readme.txt"));
        touch(&dir.path().join("Empty").join("nested").join("data.bin"));

        assert!(LibraryScanner::default().scan(dir.path(), Category::Desktop).is_empty());
    }

    #[test]
    fn rescan_reflects_current_filesystem() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Old").join("Old.exe"));
        let scanner = LibraryScanner::default();
        assert_eq!(names(&scanner.scan(dir.path(), Category::Game)), vec!["Old"]);

        fs::remove_dir_all(dir.path().join("Old")).unwrap();
        touch(&dir.path().join("New").join("New.exe"));
        assert_eq!(names(&scanner.scan(dir.path(), Category::Game)), vec!["New"]);
    }

    #[test]
    fn prefix_match_ignores_case() {
        let prefixes = vec!["UnityCrashHandler".to_string(), "unins".to_string()];
        assert!(starts_with_any("UNINS000.exe", &prefixes));
        assert!(starts_with_any("unitycrashhandler64.exe", &prefixes));
        assert!(!starts_with_any("Launcher.exe", &prefixes));
    }

    #[test]
    fn executable_extension_matches_case_insensitively() {
        let rules = ScanRules::default();
        assert!(rules.is_executable(Path::new("/a/Game.EXE")));
        assert!(!rules.is_executable(Path::new("/a/Game.exe.bak")));
        assert!(!rules.is_executable(Path::new("/a/exe")));
    }

    #[test]
    fn cover_lookup_follows_candidate_order() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("icon.png"));
        touch(&dir.path().join("cover.jpg"));

        let rules = ScanRules::default();
        assert_eq!(rules.find_cover(dir.path()), Some(dir.path().join("cover.jpg")));
    }
}
