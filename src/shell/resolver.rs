use crate::shell::tasks::TaskMap;
use std::collections::BTreeSet;

/// Command token used when a shell runs as another shell's task.
pub const EXECUTE: &str = "execute";
/// Fallback entry point.
pub const MAIN: &str = "main";

/// Operations every shell has. They are never dispatch targets even if a
/// concrete shell registers one of these names.
const BASE_OPERATIONS: &[&str] = &[
    "initialize",
    "startup",
    "load_tasks",
    "has_task",
    "has_method",
    "run_command",
    "dispatch_shell",
    "option_parser",
    "input",
    "out",
    "err",
    "nl",
    "hr",
    "error",
    "stop",
    "clear",
    "welcome",
];

/// The entry points a shell exposes, declared when the shell is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    names: BTreeSet<String>,
}

impl CommandSet {
    pub fn new() -> Self {
        CommandSet::default()
    }

    pub fn command(mut self, name: &str) -> Self {
        self.names.insert(name.to_string());
        self
    }

    /// Adds `main`.
    pub fn main(self) -> Self {
        self.command(MAIN)
    }

    /// Whether `name` is a callable command: registered, not underscore
    /// prefixed and not one of the base operations.
    pub fn exposes(&self, name: &str) -> bool {
        !name.starts_with('_') && !BASE_OPERATIONS.contains(&name) && self.names.contains(name)
    }

    /// Exposed names, `main` included.
    pub fn exposed(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(move |name| self.exposes(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Task,
    Method,
    Main,
    Unresolved,
}

/// What a command token can resolve to for one shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_task: bool,
    pub is_method: bool,
    pub is_main: bool,
}

impl Classification {
    pub fn classify(command: &str, tasks: &TaskMap, commands: &CommandSet) -> Self {
        Classification {
            is_task: tasks.has_task(command),
            is_method: commands.exposes(command),
            is_main: commands.exposes(MAIN),
        }
    }

    /// Whether the command token is dropped from argv before parsing.
    pub fn shifts_argv(&self, command: &str) -> bool {
        self.is_task || (self.is_method && command != EXECUTE)
    }

    /// Whether the startup hook runs before the command body.
    pub fn runs_startup(&self, command: &str) -> bool {
        (self.is_task || self.is_method || self.is_main) && command != EXECUTE
    }

    /// The single dispatch path. `execute` never redirects to a task.
    pub fn outcome(&self, command: &str) -> Outcome {
        if self.is_task && command != EXECUTE {
            Outcome::Task
        } else if self.is_method {
            Outcome::Method
        } else if self.is_main {
            Outcome::Main
        } else {
            Outcome::Unresolved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::shell::tasks::TaskDeclaration;

    fn tasks(names: &[&str]) -> Result<TaskMap> {
        let declarations: Vec<TaskDeclaration> = names.iter().map(|n| TaskDeclaration::from(*n)).collect();
        let mut map = TaskMap::new();
        map.load(&declarations, &[])?;
        Ok(map)
    }

    #[test]
    fn test_exposes_only_registered_public_names() {
        let commands = CommandSet::new()
            .command("build")
            .command("_secret")
            .command("out")
            .main();

        // Validate
        assert!(commands.exposes("build"));
        assert!(commands.exposes("main"));
        assert!(!commands.exposes("_secret"));
        assert!(!commands.exposes("out"));
        assert!(!commands.exposes("Build"));
        assert!(!commands.exposes("missing"));
        assert_eq!(commands.exposed().collect::<Vec<_>>(), vec!["build", "main"]);
    }

    #[test]
    fn test_method_classification() -> Result<()> {
        let commands = CommandSet::new().command("build");

        // Test
        let class = Classification::classify("build", &tasks(&["Api"])?, &commands);

        // Validate
        assert!(class.is_method);
        assert!(!class.is_task);
        assert!(!class.is_main);
        assert_eq!(class.outcome("build"), Outcome::Method);
        assert!(class.shifts_argv("build"));
        assert!(class.runs_startup("build"));
        Ok(())
    }

    #[test]
    fn test_task_beats_method() -> Result<()> {
        let commands = CommandSet::new().command("api").main();

        // Test
        let class = Classification::classify("api", &tasks(&["Api"])?, &commands);

        // Validate
        assert!(class.is_task && class.is_method);
        assert_eq!(class.outcome("api"), Outcome::Task);
        Ok(())
    }

    #[test]
    fn test_execute_never_redirects_to_task() -> Result<()> {
        let commands = CommandSet::new().command("execute");

        // Test
        let class = Classification::classify("execute", &tasks(&["Execute"])?, &commands);

        // Validate
        assert!(class.is_task);
        assert_eq!(class.outcome("execute"), Outcome::Method);
        assert!(!class.runs_startup("execute"));
        Ok(())
    }

    #[test]
    fn test_execute_method_keeps_argv() {
        let commands = CommandSet::new().command("execute");
        let class = Classification::classify("execute", &TaskMap::new(), &commands);
        assert!(!class.shifts_argv("execute"));
    }

    #[test]
    fn test_empty_command_falls_to_main() {
        let commands = CommandSet::new().main();

        // Test
        let class = Classification::classify("", &TaskMap::new(), &commands);

        // Validate
        assert_eq!(class.outcome(""), Outcome::Main);
        assert!(!class.shifts_argv(""));
        assert!(class.runs_startup(""));
    }

    #[test]
    fn test_unresolved() {
        let class = Classification::classify("unknownThing", &TaskMap::new(), &CommandSet::new());
        assert_eq!(class.outcome("unknownThing"), Outcome::Unresolved);
        assert!(!class.runs_startup("unknownThing"));
    }
}
