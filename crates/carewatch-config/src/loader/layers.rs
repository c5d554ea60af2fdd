//! Discovery and reading of config layers on disk.

use super::{
    CONFIG_DIR, CONFIG_FILE, ConfigLayer, ConfigLayerSource, LoadedLayer, SYSTEM_CONFIG_PATH,
    SYSTEM_REQUIREMENTS_PATH, schema,
};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a layer when `path` is set and exists.
pub(super) fn read_optional(
    source: ConfigLayerSource,
    path: Option<&Path>,
) -> Result<Option<LoadedLayer>, ConfigError> {
    match path {
        Some(path) if path.exists() => read_required(source, path).map(Some),
        Some(path) => {
            debug!(
                "optional layer missing (source={:?}, path={})",
                source,
                path.display()
            );
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Read and schema-check a layer that must exist.
pub(super) fn read_required(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    schema::validate_layer(&value, &label(source, path))?;
    debug!(
        "read config layer (source={:?}, path={})",
        source,
        path.display()
    );
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: Some(path.to_path_buf()),
        },
        value,
    })
}

/// Prefix used in schema errors, e.g. `user(/home/a/.carewatch/carewatch.json5)`.
pub(super) fn label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::Requirements => "requirements",
        ConfigLayerSource::System => "system",
        ConfigLayerSource::User => "user",
        ConfigLayerSource::Project => "project",
        ConfigLayerSource::Cwd => "cwd",
        ConfigLayerSource::Repo => "repo",
        ConfigLayerSource::Runtime => "runtime",
    };
    format!("{name}({})", path.display())
}

pub(super) fn system_config_path() -> Option<PathBuf> {
    cfg!(unix).then(|| PathBuf::from(SYSTEM_CONFIG_PATH))
}

pub(super) fn requirements_path() -> Option<PathBuf> {
    cfg!(unix).then(|| PathBuf::from(SYSTEM_REQUIREMENTS_PATH))
}

pub(super) fn user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Canonical form of `path`, or the path itself when it does not exist yet.
pub(super) fn canonical(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.canonicalize() {
        Ok(path) => Ok(path),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(ConfigError::ReadFailed(err)),
    }
}

/// Nearest ancestor of `cwd` containing one of `markers`.
pub(super) fn project_root(cwd: &Path, markers: &[String]) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| markers.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}
