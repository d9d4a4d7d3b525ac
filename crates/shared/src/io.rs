use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "ai-news-podcast";

/// Root of everything the generator keeps on disk
pub fn get_default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join(APP_DIR_NAME);

    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    Ok(data_dir)
}

/// Get the default location of the episode database
pub fn get_default_database_path() -> Result<PathBuf> {
    Ok(get_default_data_dir()?.join("episodes.db"))
}

/// Get the default directory for storing episode audio
pub fn get_default_episodes_dir() -> Result<PathBuf> {
    let episodes_dir = get_default_data_dir()?.join("episodes");

    fs::create_dir_all(&episodes_dir).context("Failed to create episodes directory")?;

    Ok(episodes_dir)
}

/// Pick the episode database: command-line flag, then configured path, then
/// the default location
pub fn resolve_database_path(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<PathBuf> {
    resolve_database_path_with(explicit, configured, get_default_database_path)
}

fn resolve_database_path_with(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
    default: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    match explicit.or(configured) {
        Some(path) => Ok(path),
        None => default(),
    }
}

/// Make sure a user-supplied output directory exists
pub fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.to_path_buf())
}

/// Copy a finished episode to a user-chosen location.
///
/// If `destination` is an existing directory the file keeps its name.
pub fn copy_episode(audio: &Path, destination: &Path) -> Result<PathBuf> {
    let target = if destination.is_dir() {
        let name = audio
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid audio filename: {}", audio.display()))?;
        destination.join(name)
    } else {
        destination.to_path_buf()
    };

    fs::copy(audio, &target).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            audio.display(),
            target.display()
        )
    })?;

    Ok(target)
}
