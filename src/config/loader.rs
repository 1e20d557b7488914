//! Configuration loader.
//!
//! Finds the first config file along the lookup chain, then applies
//! environment overrides on top.

use super::types::Config;
use crate::types::ActorId;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "KANBAN_CONFIG_PATH";

/// Candidate config file locations, highest priority first.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Explicit file from `--config` or `KANBAN_CONFIG_PATH`.
    pub explicit: Option<PathBuf>,
    /// Project-level file (`./kanban/config.yaml`).
    pub project: Option<PathBuf>,
    /// User-level file (`~/.kanban/config.yaml`).
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        let explicit = explicit.or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));
        let project = Some(PathBuf::from("kanban").join("config.yaml"));
        let user = dirs::home_dir().map(|h| h.join(".kanban").join("config.yaml"));

        Self {
            explicit,
            project,
            user,
        }
    }

    /// Candidates in lookup order.
    fn candidates(&self) -> impl Iterator<Item = &PathBuf> {
        self.explicit
            .iter()
            .chain(self.project.iter())
            .chain(self.user.iter())
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration along the discovered lookup chain.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self> {
        Self::load_from(&ConfigPaths::discover(explicit), |key| std::env::var(key).ok())
    }

    /// Load using explicit paths and an environment lookup function.
    ///
    /// An explicit path that does not exist is an error; missing project or
    /// user files are skipped.
    pub fn load_from<E>(paths: &ConfigPaths, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &paths.explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let mut loader = Self {
            config: Config::default(),
            config_path: None,
        };

        if let Some(path) = paths.candidates().find(|p| p.exists()) {
            loader.config = read_config(path)?;
            loader.config_path = Some(path.clone());
            debug!(path = %path.display(), "Loaded configuration file");
        }

        loader.apply_env(env);
        Ok(loader)
    }

    /// Apply `KANBAN_*` environment overrides. Unparseable values are ignored
    /// with a warning.
    fn apply_env<E>(&mut self, env: E)
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("KANBAN_DB_PATH") {
            self.config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(port) = env("KANBAN_PORT") {
            match port.parse() {
                Ok(port) => self.config.server.port = port,
                Err(_) => warn!("Ignoring invalid KANBAN_PORT '{}'", port),
            }
        }

        if let Some(actor) = env("KANBAN_ACTOR_ID") {
            match actor.parse() {
                Ok(actor) => self.config.server.actor_id = ActorId(actor),
                Err(_) => warn!("Ignoring invalid KANBAN_ACTOR_ID '{}'", actor),
            }
        }

        if let Some(url) = env("KANBAN_URL") {
            self.config.client.base_url = url;
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access for CLI overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// The file the configuration was read from, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
