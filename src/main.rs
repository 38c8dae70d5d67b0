mod catalog;
mod config;
mod executor;
mod matcher;
mod model;
mod paths;
mod sources;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use crate::catalog::Catalog;
use crate::config::load_config;
use crate::model::{Category, Entry};
use crate::paths::resolve_library_root;
use crate::sources::{LibraryScanner, ScanRules};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Library root, overriding MG_LIBRARY_PATH and the config file
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List the scanned catalog
    List {
        /// Only show one category (Game, Desktop, Web)
        #[arg(short, long)]
        category: Option<Category>,
        /// Filter by name or executable path
        #[arg(short, long)]
        search: Option<String>,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
        /// Decode cover art and include its dimensions in JSON output
        #[arg(long, requires = "json")]
        covers: bool,
    },
    /// Launch an entry by name
    Launch {
        name: String,
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Print the resolved library root
    Root,
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    category: &'static str,
    executable_path: Option<&'a Path>,
    working_directory: &'a Path,
    image_path: Option<&'a Path>,
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_size: Option<(u32, u32)>,
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a Entry, with_cover: bool) -> Self {
        let cover_size = if with_cover {
            entry.cover().map(|img| img.dimensions())
        } else {
            None
        };
        Self {
            name: &entry.name,
            category: entry.category.as_str(),
            executable_path: entry.executable_path(),
            working_directory: &entry.working_directory,
            image_path: entry.image_path.as_deref(),
            url: entry.url(),
            cover_size,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = load_config()?;
    let root = args.library.clone().unwrap_or_else(|| resolve_library_root(&config));
    log::debug!("Library root: {:?}", root);

    let command = args.command.unwrap_or(Cmd::List {
        category: None,
        search: None,
        json: false,
        covers: false,
    });

    if let Cmd::Root = command {
        println!("{}", root.display());
        return Ok(());
    }

    // 2. Scan
    let scanner = LibraryScanner::new(ScanRules::from(&config.scanner));
    let mut catalog = Catalog::new(&config);
    catalog.refresh(&root, &scanner);

    // 3. Act on the filtered view
    match command {
        Cmd::List { category, search, json, covers } => {
            catalog.set_category(category);
            catalog.update_query(search.as_deref().unwrap_or_default());
            if json {
                let views: Vec<EntryView> = catalog
                    .filtered()
                    .map(|entry| EntryView::new(entry, covers))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                for entry in catalog.filtered() {
                    println!("{} {:<32} {}", entry.icon_glyph(), entry.name, entry.display_path());
                }
            }
        }
        Cmd::Launch { name, category } => {
            catalog.set_category(category);
            match catalog.find(&name) {
                Some(entry) => {
                    if let Err(e) = executor::launch(entry, &config) {
                        log::error!("{}", e);
                    }
                }
                None => log::warn!("No entry named {:?} under {:?}", name, root),
            }
        }
        Cmd::Root => {}
    }

    Ok(())
}
