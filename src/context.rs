use crate::error::{Error, Result};
use crate::shell::registry::{Registry, RegistryKind};
use crate::shell::ShellCommands;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub plugins: BTreeMap<String, PluginConfig>,
}

impl Config {
    pub fn from_toml(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Locates the config file; `None` means run on defaults.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TASKSHELL_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from("taskshell.toml");
        if local.exists() {
            return Some(local);
        }

        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/taskshell/config.toml"))
            .filter(|path| path.exists())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

impl AppConfig {
    /// Last component of the application path.
    pub fn dir(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            name: "Taskshell".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PluginConfig {
    pub path: Option<PathBuf>,
    pub autoload: bool,
}

/// Process-wide record of which configured plugins are loaded.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    available: BTreeMap<String, PluginConfig>,
    loaded: RefCell<BTreeSet<String>>,
}

impl PluginRegistry {
    pub fn new(available: BTreeMap<String, PluginConfig>) -> Self {
        let autoload = available
            .iter()
            .filter(|(_, plugin)| plugin.autoload)
            .map(|(name, _)| name.clone())
            .collect();

        PluginRegistry {
            available,
            loaded: RefCell::new(autoload),
        }
    }

    pub fn load(&self, name: &str) -> Result<()> {
        if !self.available.contains_key(name) {
            return Err(Error::MissingPlugin(name.to_string()));
        }
        if self.loaded.borrow_mut().insert(name.to_string()) {
            tracing::info!(plugin = name, "Plugin loaded");
        }
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.borrow().contains(name)
    }

    pub fn loaded(&self) -> Vec<String> {
        self.loaded.borrow().iter().cloned().collect()
    }

    pub fn available(&self) -> impl Iterator<Item = (&String, &PluginConfig)> {
        self.available.iter()
    }
}

/// Everything a dispatch needs from the process: configuration, the plugin
/// registry and the shell/task factories. Built once, then shared by `Rc`.
pub struct Context {
    config: Config,
    plugins: PluginRegistry,
    shells: Registry,
    tasks: Registry,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let plugins = PluginRegistry::new(config.plugins.clone());

        Context {
            config,
            plugins,
            shells: Registry::new(RegistryKind::Shell),
            tasks: Registry::new(RegistryKind::Task),
        }
    }

    pub fn init() -> Result<Self> {
        let config = match Config::config_path() {
            Some(path) => Config::from_toml(&path)?,
            None => Config::default(),
        };

        Ok(Context::new(config))
    }

    pub fn with_shell<F>(mut self, class: &str, factory: F) -> Self
    where
        F: Fn(&toml::Table) -> Box<dyn ShellCommands> + 'static,
    {
        self.shells.register(class, factory);
        self
    }

    pub fn with_task<F>(mut self, class: &str, factory: F) -> Self
    where
        F: Fn(&toml::Table) -> Box<dyn ShellCommands> + 'static,
    {
        self.tasks.register(class, factory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn shells(&self) -> &Registry {
        &self.shells
    }

    pub fn tasks(&self) -> &Registry {
        &self.tasks
    }
}
