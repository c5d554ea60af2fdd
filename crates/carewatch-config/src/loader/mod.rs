//! Layered configuration loader with locked requirements.
//!
//! Discovers configuration layers (system/user/project/etc), validates each
//! against the schema, merges them while honoring requirement locks, and
//! produces a final `CarewatchConfig`.

mod layers;
mod merge;
mod schema;


use crate::{CarewatchConfig, ConfigError, MAX_PROVIDER_ATTEMPTS};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename looked up in every local layer.
const CONFIG_FILE: &str = "carewatch.json5";
/// Config directory under user or repo roots.
const CONFIG_DIR: &str = ".carewatch";
/// Marker files/dirs that identify a project root.
const PROJECT_ROOT_MARKERS: &[&str] = &[".git"];
const SYSTEM_CONFIG_PATH: &str = "/etc/carewatch/carewatch.json5";
const SYSTEM_REQUIREMENTS_PATH: &str = "/etc/carewatch/requirements.json5";

/// Effective config plus the layers it was built from.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: CarewatchConfig,
    pub layers: Vec<ConfigLayer>,
}

/// Origin of a config layer, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Locked values no other layer may override.
    Requirements,
    System,
    User,
    Project,
    Cwd,
    Repo,
    /// Explicit override files (highest precedence).
    Runtime,
}

/// Metadata about a loaded layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: Option<PathBuf>,
}

/// Options controlling layer discovery.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find local layers.
    pub cwd: PathBuf,
    pub system_config_path: Option<PathBuf>,
    pub user_config_path: Option<PathBuf>,
    pub requirements_path: Option<PathBuf>,
    /// Override files applied last, in order.
    pub runtime_paths: Vec<PathBuf>,
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Options with the default layer locations for `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layers::system_config_path(),
            user_config_path: layers::user_config_path(),
            requirements_path: layers::requirements_path(),
            runtime_paths: Vec::new(),
            project_root_markers: PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl CarewatchConfig {
    /// Load a single config file (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        schema::validate_layer(&value, "config")?;
        finish(value)
    }

    /// Load the layered stack from the default locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layered stack from explicit locations.
    ///
    /// Precedence (low -> high): requirements, system, user, project, cwd,
    /// repo, runtime. Keys present in requirements are locked.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = layers::canonical(&options.cwd)?;
        let mut loaded = Vec::new();

        let requirements = layers::read_optional(
            ConfigLayerSource::Requirements,
            options.requirements_path.as_deref(),
        )?;
        let locked = requirements.as_ref().map(|layer| layer.value.clone());
        if let Some(layer) = requirements {
            loaded.push(layer);
        }

        for (source, path) in [
            (ConfigLayerSource::System, options.system_config_path.as_deref()),
            (ConfigLayerSource::User, options.user_config_path.as_deref()),
        ] {
            if let Some(layer) = layers::read_optional(source, path)? {
                loaded.push(layer);
            }
        }

        let root = layers::project_root(&cwd, &options.project_root_markers);
        let mut local = Vec::new();
        if let Some(root) = root.as_ref() {
            debug!("resolved project root: {}", root.display());
            local.push((ConfigLayerSource::Project, root.join(CONFIG_FILE)));
        }
        local.push((ConfigLayerSource::Cwd, cwd.join(CONFIG_FILE)));
        if let Some(root) = root.as_ref() {
            local.push((
                ConfigLayerSource::Repo,
                root.join(CONFIG_DIR).join(CONFIG_FILE),
            ));
        }

        let mut seen = HashSet::new();
        for (source, path) in local {
            if !path.exists() {
                continue;
            }
            if !seen.insert(layers::canonical(&path)?) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            loaded.push(layers::read_required(source, &path)?);
        }

        for path in &options.runtime_paths {
            loaded.push(layers::read_required(ConfigLayerSource::Runtime, path)?);
        }

        let mut merged = locked
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let mut metas = Vec::with_capacity(loaded.len());
        for layer in loaded {
            if layer.meta.source != ConfigLayerSource::Requirements {
                merge::overlay(&mut merged, &layer.value, locked.as_ref());
            }
            metas.push(layer.meta);
        }

        let config = finish(merged)?;
        info!("layered config loaded (layers={})", metas.len());
        Ok(LayeredConfig {
            config,
            layers: metas,
        })
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let assessment = &self.assessment;
        if assessment.history_window == 0 {
            return Err(ConfigError::field(
                "assessment.history_window",
                "must be at least 1",
            ));
        }
        if !(assessment.trend_threshold.is_finite() && assessment.trend_threshold > 0.0) {
            return Err(ConfigError::field(
                "assessment.trend_threshold",
                "must be a positive number",
            ));
        }
        if !(assessment.concerning_threshold.is_finite()
            && assessment.concerning_threshold >= assessment.trend_threshold)
        {
            return Err(ConfigError::field(
                "assessment.concerning_threshold",
                "must be at least assessment.trend_threshold",
            ));
        }
        if !(1..=MAX_PROVIDER_ATTEMPTS).contains(&self.provider.retry.max_attempts) {
            return Err(ConfigError::field(
                "provider.retry.max_attempts",
                format!("must be between 1 and {MAX_PROVIDER_ATTEMPTS}"),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::field(
                "provider.timeout_secs",
                "must be at least 1",
            ));
        }
        let checkins = &self.checkins;
        if checkins.max_limit == 0 || checkins.default_limit == 0 {
            return Err(ConfigError::field("checkins", "limits must be at least 1"));
        }
        if checkins.default_limit > checkins.max_limit {
            return Err(ConfigError::field(
                "checkins.default_limit",
                "must not exceed checkins.max_limit",
            ));
        }
        Ok(())
    }
}

/// A layer read from disk.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn finish(value: Value) -> Result<CarewatchConfig, ConfigError> {
    let config: CarewatchConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
