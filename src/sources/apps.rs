use crate::model::{Category, Entry};
use crate::sources::{ScanError, ScanRules, Source, absolutize, file_name_of, list_dir, starts_with_any};
use anyhow::Result;
use log::{debug, warn};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Installed applications: one candidate folder per entry, executable located heuristically.
pub struct AppSource<'a> {
    rules: &'a ScanRules,
}

impl<'a> AppSource<'a> {
    pub fn new(rules: &'a ScanRules) -> Self {
        Self { rules }
    }

    pub fn resolve(&self, app_dir: &Path, category: Category) -> Result<Option<Entry>, ScanError> {
        let name = file_name_of(app_dir);
        let (files, dirs) = list_dir(app_dir)?;

        // A binary named after its folder short-circuits every other rule.
        if let Some(preferred) = self.find_self_named(&name, &files) {
            return Ok(Some(self.build_entry(name, &preferred, app_dir, category)));
        }

        let Some(exe) = self.find_candidate(files, dirs)? else {
            return Ok(None);
        };
        let working_dir = exe.parent().unwrap_or(app_dir).to_path_buf();
        Ok(Some(self.build_entry(name, &exe, &working_dir, category)))
    }

    /// Executable whose stem equals the folder name, exact case first.
    fn find_self_named(&self, name: &str, files: &[PathBuf]) -> Option<PathBuf> {
        let executables: Vec<&PathBuf> = files.iter().filter(|p| self.rules.is_executable(p)).collect();

        let lowered = name.to_lowercase();
        executables
            .iter()
            .find(|p| stem_of(p) == name)
            .or_else(|| executables.iter().find(|p| stem_of(p).to_lowercase() == lowered))
            .map(|p| p.to_path_buf())
    }

    fn find_candidate(&self, files: Vec<PathBuf>, dirs: Vec<PathBuf>) -> Result<Option<PathBuf>, ScanError> {
        let top_level = files.into_iter().find(|path| {
            self.rules.is_executable(path)
                && !starts_with_any(&file_name_of(path), &self.rules.exe_ignore_prefixes)
        });
        if top_level.is_some() {
            return Ok(top_level);
        }

        for sub in dirs {
            if self.rules.is_ignored_folder(&file_name_of(&sub)) {
                debug!("Ignoring bundled folder {:?}", sub);
                continue;
            }
            if let Some(exe) = self.find_nested(&sub)? {
                return Ok(Some(exe));
            }
        }
        Ok(None)
    }

    /// Depth-first search below `dir`, files of a directory before its subdirectories.
    fn find_nested(&self, dir: &Path) -> Result<Option<PathBuf>, ScanError> {
        let walker = WalkDir::new(dir).min_depth(1).sort_by(|a, b| {
            match (a.file_type().is_dir(), b.file_type().is_dir()) {
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                _ => a.file_name().cmp(b.file_name()),
            }
        });

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && self.rules.is_executable(path)
                && !starts_with_any(&file_name_of(path), &self.rules.nested_exe_ignore_prefixes)
            {
                return Ok(Some(path.to_path_buf()));
            }
        }
        Ok(None)
    }

    fn build_entry(&self, name: String, exe: &Path, working_dir: &Path, category: Category) -> Entry {
        let image = self.rules.find_cover(working_dir);
        Entry::new_app(
            name,
            absolutize(exe),
            absolutize(working_dir),
            image.as_deref().map(absolutize),
            category,
        )
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl Source for AppSource<'_> {
    fn scan(&self, root: &Path, category: Category) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let (_, app_dirs) = list_dir(root)?;

        for app_dir in app_dirs {
            match self.resolve(&app_dir, category) {
                Ok(Some(entry)) => {
                    debug!("{}: {:?} -> {}", category, app_dir, entry.display_path());
                    entries.push(entry);
                }
                Ok(None) => debug!("{}: no executable in {:?}", category, app_dir),
                Err(e) => warn!("{}: skipping {:?}: {}", category, app_dir, e),
            }
        }
        Ok(entries)
    }
}
