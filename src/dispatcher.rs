use crate::context::Context;
use crate::error::{Error, Result};
use crate::io::{ConsoleIo, Verbosity};
use crate::shell::Shell;
use crate::utils::{camelize, plugin_split, underscore};
use std::rc::Rc;
use tracing::{debug, warn};

/// What completion and menus need to know about a registered shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSummary {
    pub name: String,
    pub description: Option<String>,
    pub commands: Vec<String>,
    pub options: Vec<String>,
}

/// Resolves a shell from the command line and runs it.
pub struct ShellDispatcher {
    context: Rc<Context>,
    io: Rc<ConsoleIo>,
}

impl ShellDispatcher {
    pub fn new(context: Rc<Context>, io: Rc<ConsoleIo>) -> Self {
        ShellDispatcher { context, io }
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    pub fn io(&self) -> &Rc<ConsoleIo> {
        &self.io
    }

    fn resolve_class(&self, name: &str) -> Result<String> {
        let shells = self.context.shells();
        if shells.contains(name) {
            return Ok(name.to_string());
        }

        let class = match plugin_split(name) {
            (Some(plugin), shell) => format!("{}.{}", camelize(plugin), camelize(shell)),
            (None, shell) => camelize(shell),
        };
        if shells.contains(&class) {
            return Ok(class);
        }
        Err(Error::MissingShell(name.to_string()))
    }

    /// Builds the shell registered under `name` (`plugin`, `Plugin` or `Blog.Posts`).
    pub fn find_shell(&self, name: &str) -> Result<Shell> {
        let class = self.resolve_class(name)?;
        let commands =
            self.context
                .shells()
                .load(&class, &toml::Table::new(), self.context.plugins())?;
        let (plugin, _) = plugin_split(&class);

        Ok(Shell::new(commands, Rc::clone(&self.io), Rc::clone(&self.context)).with_plugin(plugin))
    }

    /// Runs `argv`: the shell name followed by the command line handed to
    /// the shell's `run_command`.
    pub fn dispatch(&self, argv: &[String]) -> Result<bool> {
        let Some((name, rest)) = argv.split_first() else {
            self.list_shells()?;
            return Ok(false);
        };

        let mut shell = self.find_shell(name)?;
        shell.initialize()?;

        let command = rest.first().cloned().unwrap_or_default();
        debug!(shell = %shell.name(), command = %command, "Dispatching");

        shell.run_command(&command, rest.to_vec())
    }

    /// Like `dispatch`, mapped to a process exit status.
    pub fn run(&self, argv: &[String]) -> i32 {
        match self.dispatch(argv) {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(Error::Stop(status)) => status,
            Err(err) => {
                if let Err(write_err) = self.io.err(&format!("<error>Error:</error> {}", err), 1) {
                    warn!(error = %err, write_error = %write_err, "Could not report error");
                }
                err.exit_code()
            }
        }
    }

    pub fn list_shells(&self) -> Result<()> {
        let shells = self.describe_shells()?;
        let width = shells.iter().map(|s| s.name.len()).max().unwrap_or(0);

        self.io.out("<info>Available Shells:</info>", 2, Verbosity::Normal)?;
        for shell in &shells {
            let line = format!(
                "  {:width$}  {}",
                shell.name,
                shell.description.as_deref().unwrap_or_default(),
                width = width
            );
            self.io.out(line.trim_end(), 1, Verbosity::Normal)?;
        }
        self.io.out("", 1, Verbosity::Normal)?;
        self.io.out(
            "To run a command, type <info>taskshell <shell> [command] [args]</info>",
            1,
            Verbosity::Normal,
        )?;
        Ok(())
    }

    /// Summaries of every shell whose plugin, if any, is loaded.
    pub fn describe_shells(&self) -> Result<Vec<ShellSummary>> {
        let plugins = self.context.plugins();
        let classes: Vec<String> = self
            .context
            .shells()
            .classes()
            .filter(|class| match plugin_split(class) {
                (Some(plugin), _) => plugins.is_loaded(plugin),
                (None, _) => true,
            })
            .cloned()
            .collect();

        classes.iter().map(|class| self.describe(class)).collect()
    }

    pub fn describe(&self, name: &str) -> Result<ShellSummary> {
        let shell = self.find_shell(name)?;
        let parser = shell.option_parser();

        let mut options = Vec::new();
        for option in parser.options() {
            options.push(format!("--{}", option.name()));
            if let Some(short) = option.short_name() {
                options.push(format!("-{}", short));
            }
        }

        Ok(ShellSummary {
            name: underscore(parser.command_name()),
            description: parser.about().map(str::to_string),
            commands: shell.command_names(),
            options,
        })
    }
}
