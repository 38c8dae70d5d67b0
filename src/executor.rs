use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use log::info;
use crate::config::Config;
use crate::model::{Entry, LaunchTarget};

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to open {url}: {source}")]
    Open {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Builds the process for an executable entry, prefixed by the configured runner.
pub fn build_command(executable: &Path, working_directory: &Path, config: &Config) -> Command {
    let runner: Vec<&str> = config
        .general
        .exe_runner
        .as_deref()
        .map(|r| r.split_whitespace().collect())
        .unwrap_or_default();

    let mut command = match runner.split_first() {
        Some((program, args)) => {
            let mut command = Command::new(program);
            command.args(args).arg(executable);
            command
        }
        None => Command::new(executable),
    };

    command
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

pub fn launch(entry: &Entry, config: &Config) -> Result<(), LaunchError> {
    match &entry.target {
        LaunchTarget::Url(url) => {
            info!("Opening {} ({})", entry.name, url);
            open::that_detached(url).map_err(|source| LaunchError::Open {
                url: url.clone(),
                source,
            })
        }
        LaunchTarget::Executable(path) => {
            info!("Starting {} ({:?} in {:?})", entry.name, path, entry.working_directory);
            build_command(path, &entry.working_directory, config)
                .spawn()
                .map(|_| ())
                .map_err(|source| LaunchError::Spawn {
                    path: path.clone(),
                    source,
                })
        }
    }
}
