use crate::model::{Category, Entry};
use crate::sources::{ScanError, ScanRules, Source, absolutize};
use anyhow::Result;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path};

/// One record of the web manifest. Keys are matched case-insensitively.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WebAppRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

pub fn parse_manifest(content: &str) -> Result<Vec<WebAppRecord>, serde_json::Error> {
    let raw: Vec<Map<String, Value>> = serde_json::from_str(content)?;
    raw.into_iter()
        .map(|object| {
            let lowered: Map<String, Value> = object
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect();
            serde_json::from_value(Value::Object(lowered))
        })
        .collect()
}

/// Record names must be a plain folder name under the manifest's directory.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Icon paths must stay inside the app folder: relative, no `..`.
fn is_contained_path(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Web apps listed in a manifest next to their per-app folders.
pub struct WebSource<'a> {
    rules: &'a ScanRules,
}

impl<'a> WebSource<'a> {
    pub fn new(rules: &'a ScanRules) -> Self {
        Self { rules }
    }

    fn build_entry(&self, app_dir: &Path, record: WebAppRecord, category: Category) -> Entry {
        let explicit_icon = record
            .icon
            .as_deref()
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .filter(|icon| {
                let contained = is_contained_path(icon);
                if !contained {
                    warn!("Icon {:?} for {:?} points outside its folder, ignoring", icon, record.name);
                }
                contained
            })
            .map(|icon| app_dir.join(icon))
            .filter(|path| path.is_file());
        let image = explicit_icon.or_else(|| self.rules.find_cover(app_dir));

        Entry::new_web(
            record.name,
            record.url,
            absolutize(app_dir),
            image.as_deref().map(absolutize),
            category,
        )
    }
}

impl Source for WebSource<'_> {
    fn scan(&self, root: &Path, category: Category) -> Result<Vec<Entry>> {
        let manifest_path = root.join(&self.rules.manifest_name);
        if !manifest_path.is_file() {
            debug!("{}: no manifest at {:?}", category, manifest_path);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&manifest_path).map_err(|source| ScanError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let records = parse_manifest(&content).map_err(|source| ScanError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for record in records {
            if !is_plain_name(&record.name) {
                warn!("{}: manifest record {:?} has no usable name, skipping", category, record.name);
                continue;
            }
            if record.url.trim().is_empty() {
                warn!("{}: manifest record {:?} has no url, skipping", category, record.name);
                continue;
            }
            let app_dir = root.join(&record.name);
            if !app_dir.is_dir() {
                debug!("{}: folder for {:?} missing, skipping", category, record.name);
                continue;
            }
            entries.push(self.build_entry(&app_dir, record, category));
        }
        Ok(entries)
    }
}
