use crate::context::PluginRegistry;
use crate::error::{Error, Result};
use crate::shell::ShellCommands;
use crate::utils::plugin_split;
use std::collections::BTreeMap;
use std::fmt;

pub type Factory = Box<dyn Fn(&toml::Table) -> Box<dyn ShellCommands>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Shell,
    Task,
}

/// Factories for shells or tasks, keyed by class name (`Name` or `Plugin.Name`).
pub struct Registry {
    kind: RegistryKind,
    factories: BTreeMap<String, Factory>,
}

impl Registry {
    pub fn new(kind: RegistryKind) -> Self {
        Registry {
            kind,
            factories: BTreeMap::new(),
        }
    }

    pub fn register<F>(&mut self, class: &str, factory: F)
    where
        F: Fn(&toml::Table) -> Box<dyn ShellCommands> + 'static,
    {
        self.factories.insert(class.to_string(), Box::new(factory));
    }

    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &String> {
        self.factories.keys()
    }

    fn missing(&self, class: &str) -> Error {
        match self.kind {
            RegistryKind::Shell => Error::MissingShell(class.to_string()),
            RegistryKind::Task => Error::MissingTask(class.to_string()),
        }
    }

    /// Builds an instance of `class`. Plugin qualified classes need their
    /// plugin loaded first.
    pub fn load(
        &self,
        class: &str,
        config: &toml::Table,
        plugins: &PluginRegistry,
    ) -> Result<Box<dyn ShellCommands>> {
        let factory = self.factories.get(class).ok_or_else(|| self.missing(class))?;

        if let (Some(plugin), _) = plugin_split(class) {
            if !plugins.is_loaded(plugin) {
                return Err(Error::MissingPlugin(plugin.to_string()));
            }
        }

        Ok(factory(config))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("classes", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
