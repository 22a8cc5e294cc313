use crate::error::{Error, Result};
use crate::utils::{camelize, plugin_split};
use std::collections::BTreeMap;

/// A task as declared by a shell: its class and construction config.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDeclaration {
    pub class: String,
    pub config: toml::Table,
}

impl TaskDeclaration {
    pub fn new(class: &str) -> Self {
        TaskDeclaration {
            class: class.to_string(),
            config: toml::Table::new(),
        }
    }

    pub fn with_config(mut self, config: toml::Table) -> Self {
        self.config = config;
        self
    }
}

impl From<&str> for TaskDeclaration {
    fn from(class: &str) -> Self {
        TaskDeclaration::new(class)
    }
}

pub type TaskDescriptor = TaskDeclaration;

/// Normalized task descriptors keyed by the camelized task name, plus the
/// ordered list of task names.
#[derive(Debug, Clone, Default)]
pub struct TaskMap {
    descriptors: BTreeMap<String, TaskDescriptor>,
    names: Vec<String>,
}

impl TaskMap {
    pub fn new() -> Self {
        TaskMap::default()
    }

    /// Keys each declaration by its class name with any plugin prefix removed.
    pub fn normalize(declarations: &[TaskDeclaration]) -> Vec<(String, TaskDescriptor)> {
        declarations
            .iter()
            .map(|declaration| {
                let (_, name) = plugin_split(&declaration.class);
                (name.to_string(), declaration.clone())
            })
            .collect()
    }

    /// Merges `declarations` into the map. Loading the same declarations again
    /// changes nothing. Any class already present in `lineage` is a cycle.
    pub fn load(&mut self, declarations: &[TaskDeclaration], lineage: &[String]) -> Result<()> {
        for (name, descriptor) in TaskMap::normalize(declarations) {
            if lineage.contains(&descriptor.class) {
                let mut chain = lineage.to_vec();
                chain.push(descriptor.class.clone());
                return Err(Error::TaskCycle(chain.join(" -> ")));
            }
            if !self.names.contains(&name) {
                self.names.push(name.clone());
            }
            self.descriptors.insert(name, descriptor);
        }
        Ok(())
    }

    /// Whether `command` names a task once camelized.
    pub fn has_task(&self, command: &str) -> bool {
        self.descriptors.contains_key(&camelize(command))
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.descriptors.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_plugin() {
        let declarations = vec![
            TaskDeclaration::from("Api"),
            TaskDeclaration::from("Blog.Publish"),
        ];

        // Test
        let normalized = TaskMap::normalize(&declarations);

        // Validate
        assert_eq!(normalized[0].0, "Api");
        assert_eq!(normalized[1].0, "Publish");
        assert_eq!(normalized[1].1.class, "Blog.Publish");
    }

    #[test]
    fn test_load_is_idempotent() -> Result<()> {
        let declarations = vec![TaskDeclaration::from("Api"), TaskDeclaration::from("ApiDocs")];
        let mut map = TaskMap::new();

        // Test
        map.load(&declarations, &[])?;
        map.load(&declarations, &[])?;

        // Validate
        assert_eq!(map.names(), &["Api".to_string(), "ApiDocs".to_string()]);
        assert!(map.has_task("api"));
        assert!(map.has_task("api_docs"));
        assert!(map.has_task("Api"));
        assert!(!map.has_task("docs"));
        assert!(!map.has_task(""));
        Ok(())
    }

    #[test]
    fn test_load_rejects_cycle() {
        let mut map = TaskMap::new();
        let lineage = vec!["Api".to_string(), "Docs".to_string()];

        // Test
        let result = map.load(&[TaskDeclaration::from("Api")], &lineage);

        // Validate
        assert!(matches!(result, Err(Error::TaskCycle(chain)) if chain == "Api -> Docs -> Api"));
    }
}
