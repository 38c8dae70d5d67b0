use crate::config::{Config, SearchMode};
use crate::matcher::FuzzyMatcher;
use crate::model::{Category, Entry};
use crate::paths::category_dir;
use crate::sources::LibraryScanner;
use log::{info, warn};
use regex::Regex;
use std::path::Path;

/// Scanned entries plus the category/text filter applied to them.
pub struct Catalog {
    pub entries: Vec<Entry>,
    pub filtered_indices: Vec<usize>,
    pub category: Option<Category>,
    pub query: String,
    pub search_mode: SearchMode,
    matcher: FuzzyMatcher,
    hidden: Vec<Regex>,
}

impl Catalog {
    pub fn new(config: &Config) -> Self {
        let hidden = config
            .catalog
            .hidden
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring invalid hidden pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();

        Self {
            entries: Vec::new(),
            filtered_indices: Vec::new(),
            category: None,
            query: String::new(),
            search_mode: config.general.search_mode,
            matcher: FuzzyMatcher::new(),
            hidden,
        }
    }

    /// Rescans every category under `root`, replacing all previous entries.
    pub fn refresh(&mut self, root: &Path, scanner: &LibraryScanner) {
        let mut entries = Vec::new();
        for category in Category::ALL {
            let dir = category_dir(root, category);
            if dir.is_dir() {
                entries.extend(scanner.scan(&dir, category));
            }
        }
        self.set_entries(entries);
    }

    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.update_filter();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.category = category;
        self.update_filter();
    }

    pub fn update_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.update_filter();
    }

    pub fn update_filter(&mut self) {
        let in_category: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| self.category.is_none_or(|c| e.category == c))
            .map(|(i, _)| i)
            .collect();

        let query = self.query.trim();
        let mut indices = if query.is_empty() {
            in_category
        } else {
            match self.search_mode {
                SearchMode::Substring => {
                    let needle = query.to_lowercase();
                    in_category
                        .into_iter()
                        .filter(|&i| matches_substring(&self.entries[i], &needle))
                        .collect()
                }
                SearchMode::Fuzzy => self.matcher.rank(query, &self.entries, &in_category),
            }
        };

        if !self.hidden.is_empty() {
            indices.retain(|&i| {
                let e = &self.entries[i];
                let display = e.display_path();
                !self.hidden.iter().any(|re| re.is_match(&e.name) || re.is_match(&display))
            });
        }

        info!(
            "Catalog: category={:?}, query='{}', filtered_count={}",
            self.category,
            self.query,
            indices.len()
        );
        self.filtered_indices = indices;
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Entry> {
        self.filtered_indices.iter().map(|&idx| &self.entries[idx])
    }

    /// First visible entry whose name equals `name`, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Entry> {
        let wanted = name.trim().to_lowercase();
        self.filtered().find(|e| e.name.to_lowercase() == wanted)
    }
}

fn matches_substring(entry: &Entry, needle: &str) -> bool {
    entry.name.to_lowercase().contains(needle)
        || entry
            .executable_path()
            .is_some_and(|p| p.to_string_lossy().to_lowercase().contains(needle))
}
