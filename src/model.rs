use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use image::{ImageReader, RgbaImage};
use log::debug;

/// How entries of a category are discovered on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    FileSystem,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Game,
    Desktop,
    Web,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Game, Category::Desktop, Category::Web];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Game => "Game",
            Category::Desktop => "Desktop",
            Category::Web => "Web",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Category::Game | Category::Desktop => SourceKind::FileSystem,
            Category::Web => SourceKind::Web,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Category::Game => "🎮",
            Category::Desktop => "💻",
            Category::Web => "🌐",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category '{}' (expected Game, Desktop or Web)", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Executable(PathBuf),
    Url(String),
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub target: LaunchTarget,
    pub working_directory: PathBuf,
    pub image_path: Option<PathBuf>,
    pub category: Category,
    cover: OnceLock<Option<Arc<RgbaImage>>>,
}

impl Entry {
    pub fn new_app(
        name: String,
        executable: PathBuf,
        working_directory: PathBuf,
        image_path: Option<PathBuf>,
        category: Category,
    ) -> Self {
        Self {
            name,
            target: LaunchTarget::Executable(executable),
            working_directory,
            image_path,
            category,
            cover: OnceLock::new(),
        }
    }

    pub fn new_web(
        name: String,
        url: String,
        working_directory: PathBuf,
        image_path: Option<PathBuf>,
        category: Category,
    ) -> Self {
        Self {
            name,
            target: LaunchTarget::Url(url),
            working_directory,
            image_path,
            category,
            cover: OnceLock::new(),
        }
    }

    pub fn executable_path(&self) -> Option<&Path> {
        match &self.target {
            LaunchTarget::Executable(path) => Some(path),
            LaunchTarget::Url(_) => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.target {
            LaunchTarget::Url(url) => Some(url),
            LaunchTarget::Executable(_) => None,
        }
    }

    /// URL for web entries, executable path otherwise.
    pub fn display_path(&self) -> String {
        match &self.target {
            LaunchTarget::Url(url) => url.clone(),
            LaunchTarget::Executable(path) => path.to_string_lossy().to_string(),
        }
    }

    pub fn icon_glyph(&self) -> &'static str {
        self.category.glyph()
    }

    /// Decoded cover art. The first call reads `image_path`; success and failure
    /// are both cached for the lifetime of the entry.
    pub fn cover(&self) -> Option<Arc<RgbaImage>> {
        self.cover
            .get_or_init(|| {
                let path = self.image_path.as_deref()?;
                load_cover(path).map(Arc::new)
            })
            .clone()
    }
}

fn load_cover(path: &Path) -> Option<RgbaImage> {
    let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
        Ok(reader) => reader,
        Err(e) => {
            debug!("Cover {:?} unreadable: {}", path, e);
            return None;
        }
    };
    match reader.decode() {
        Ok(img) => Some(img.into_rgba8()),
        Err(e) => {
            debug!("Cover {:?} failed to decode: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn app_with_image(image_path: Option<PathBuf>) -> Entry {
        Entry::new_app(
            "Foo".to_string(),
            PathBuf::from("/apps/Foo/Foo.exe"),
            PathBuf::from("/apps/Foo"),
            image_path,
            Category::Game,
        )
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("game".parse::<Category>(), Ok(Category::Game));
        assert_eq!(" DESKTOP ".parse::<Category>(), Ok(Category::Desktop));
        assert_eq!("Web".parse::<Category>(), Ok(Category::Web));
        assert!("Music".parse::<Category>().is_err());
    }

    #[test]
    fn only_web_category_uses_manifest_source() {
        assert_eq!(Category::Game.kind(), SourceKind::FileSystem);
        assert_eq!(Category::Desktop.kind(), SourceKind::FileSystem);
        assert_eq!(Category::Web.kind(), SourceKind::Web);
    }

    #[test]
    fn web_entry_displays_url() {
        let entry = Entry::new_web(
            "Docs".to_string(),
            "https://example.com".to_string(),
            PathBuf::from("/apps/Docs"),
            None,
            Category::Web,
        );
        assert_eq!(entry.display_path(), "https://example.com");
        assert_eq!(entry.url(), Some("https://example.com"));
        assert!(entry.executable_path().is_none());
        assert_eq!(entry.icon_glyph(), "🌐");
    }

    #[test]
    fn app_entry_displays_executable() {
        let entry = app_with_image(None);
        assert_eq!(entry.display_path(), "/apps/Foo/Foo.exe");
        assert!(entry.url().is_none());
        assert!(entry.cover().is_none());
    }

    #[test]
    fn cover_decodes_once_and_is_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        RgbaImage::new(2, 3).save(&path).unwrap();

        let entry = app_with_image(Some(path.clone()));
        let first = entry.cover().expect("cover should decode");
        assert_eq!((first.width(), first.height()), (2, 3));

        fs::remove_file(&path).unwrap();
        let second = entry.cover().expect("cached cover survives file removal");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn corrupt_cover_degrades_to_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        fs::write(&path, b"not an image").unwrap();

        let entry = app_with_image(Some(path.clone()));
        assert!(entry.cover().is_none());

        // A later fix on disk is not picked up; the failure is terminal.
        RgbaImage::new(1, 1).save(&path).unwrap();
        assert!(entry.cover().is_none());
    }

    #[test]
    fn vanished_cover_is_treated_as_missing() {
        let dir = tempdir().unwrap();
        let entry = app_with_image(Some(dir.path().join("gone.jpg")));
        assert!(entry.cover().is_none());
    }
}
