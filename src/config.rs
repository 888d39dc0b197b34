use crate::{
    app_dirs::AppDirs,
    backend::{remote::DEFAULT_SERVER_URL, BackendKind},
};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub server_url: String,
    pub session_cookie: Option<String>,
    pub profile: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            server_url: DEFAULT_SERVER_URL.to_string(),
            session_cookie: None,
            profile: default_profile(),
            log_level: "info".to_string(),
        }
    }
}

fn default_profile() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "player".to_string())
}

/// One-run overrides, typically parsed from the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub backend: Option<BackendKind>,
    pub server_url: Option<String>,
    pub session_cookie: Option<String>,
    pub profile: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn merged(mut self, overrides: Overrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(url) = overrides.server_url {
            self.server_url = url;
        }
        if overrides.session_cookie.is_some() {
            self.session_cookie = overrides.session_cookie;
        }
        if let Some(profile) = overrides.profile {
            self.profile = profile;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typesprint_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring malformed config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}
