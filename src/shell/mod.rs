//! Dispatchable shells.
//!
//! A [`Shell`] pairs the behaviour of a concrete shell ([`ShellCommands`])
//! with the state every shell shares ([`ShellState`]): parsed params and
//! args, the console channel, the process context and its lazily built tasks.
//!
//! `run_command` resolves a command token in this order:
//!
//! - a declared task (except for `execute`), run as `execute` on the task,
//! - a registered command method,
//! - `main`,
//!
//! and otherwise prints the usage for the command.

pub mod commands;
pub mod registry;
pub mod resolver;
pub mod tasks;

use crate::context::Context;
use crate::dispatcher::ShellDispatcher;
use crate::error::{Error, Result};
use crate::io::output::OutputMode;
use crate::io::{ConsoleIo, Verbosity};
use crate::parser::{HelpFormat, OptionParser, Params};
use crate::utils::{camelize, plugin_split, underscore, wrap_text};
use resolver::{Classification, CommandSet, Outcome, EXECUTE, MAIN};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;
use tasks::{TaskDeclaration, TaskMap};
use tracing::{debug, info};

pub type Shared<T> = Rc<RefCell<T>>;

const HR_WIDTH: usize = 63;
const ERROR_WIDTH: usize = 80;

/// Behaviour of a concrete shell or task.
pub trait ShellCommands {
    /// Camelized name, e.g. `Completion`.
    fn name(&self) -> &str;

    /// Entry points this shell exposes as commands.
    fn commands(&self) -> CommandSet;

    /// Tasks this shell declares.
    fn tasks(&self) -> Vec<TaskDeclaration> {
        Vec::new()
    }

    /// Configures the option parser for this shell.
    fn option_parser(&self, parser: OptionParser) -> OptionParser {
        parser
    }

    fn initialize(&mut self, _shell: &mut ShellState) -> Result<()> {
        Ok(())
    }

    /// Runs once before a task, method or `main` body. Prints the welcome banner by default.
    fn startup(&mut self, shell: &mut ShellState) -> Result<()> {
        shell.welcome()
    }

    /// Runs the registered command `command` (`main` included).
    fn invoke(&mut self, command: &str, shell: &mut ShellState) -> Result<bool>;
}

/// State a shell shares with its command bodies.
pub struct ShellState {
    name: String,
    plugin: Option<String>,
    command: Option<String>,
    params: Shared<Params>,
    args: Shared<Vec<String>>,
    interactive: bool,
    io: Rc<ConsoleIo>,
    context: Rc<Context>,
    lineage: Vec<String>,
    task_map: TaskMap,
    loaded: HashMap<String, Shell>,
}

impl ShellState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// The command currently being run.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn params(&self) -> Ref<'_, Params> {
        self.params.borrow()
    }

    pub fn params_mut(&self) -> RefMut<'_, Params> {
        self.params.borrow_mut()
    }

    pub fn args(&self) -> Ref<'_, Vec<String>> {
        self.args.borrow()
    }

    pub fn args_mut(&self) -> RefMut<'_, Vec<String>> {
        self.args.borrow_mut()
    }

    pub fn io(&self) -> &Rc<ConsoleIo> {
        &self.io
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn task_names(&self) -> &[String] {
        self.task_map.names()
    }

    pub fn out(&self, message: &str) -> Result<usize> {
        self.io.out(message, 1, Verbosity::Normal)
    }

    /// Writes `message` followed by `newlines` line breaks when `level` is
    /// within the current verbosity.
    pub fn out_with(&self, message: &str, newlines: usize, level: Verbosity) -> Result<usize> {
        self.io.out(message, newlines, level)
    }

    pub fn err(&self, message: &str) -> Result<usize> {
        self.io.err(message, 1)
    }

    pub fn hr(&self, newlines: usize, width: usize) -> Result<()> {
        self.io.hr(newlines, width)
    }

    /// Word-wraps `text` to `width` columns, indenting every line by `indent`.
    pub fn wrap_text(&self, text: &str, width: usize, indent: usize) -> String {
        wrap_text(text, width, indent)
    }

    /// Prints the welcome banner.
    pub fn welcome(&self) -> Result<()> {
        let app = &self.context.config().app;

        self.out("")?;
        self.out(&format!("<info>Welcome to {} v{} Console</info>", app.name, app.version))?;
        self.hr(0, HR_WIDTH)?;
        self.out(&format!("App : {}", app.dir()))?;
        self.out(&format!("Path: {}", app.path.display()))?;
        self.hr(0, HR_WIDTH)
    }

    /// Prompts for input. Non-interactive shells get `default` back without prompting.
    pub fn input(&self, prompt: &str, options: &[&str], default: Option<&str>) -> Result<Option<String>> {
        if !self.interactive {
            return Ok(default.map(str::to_string));
        }
        if options.is_empty() {
            return self.io.ask(prompt, default).map(Some);
        }
        self.io.ask_choice(prompt, options, default).map(Some)
    }

    /// Prints a formatted error and stops with status 1.
    pub fn error(&self, title: &str, message: Option<&str>) -> Result<bool> {
        self.io.err(&format!("<error>Error:</error> {}", title), 1)?;

        if let Some(message) = message.filter(|m| !m.is_empty()) {
            self.io.err(&wrap_text(message, ERROR_WIDTH, 0), 1)?;
        }
        self.stop(1)
    }

    pub fn stop(&self, status: i32) -> Result<bool> {
        info!(shell = %self.name, status, "Shell stopped");
        Err(Error::Stop(status))
    }

    /// Clears the terminal unless `--noclear` was given.
    pub fn clear(&self) -> Result<()> {
        if !self.params().flag("noclear") {
            console::Term::stdout().clear_screen()?;
        }
        Ok(())
    }

    /// Runs another shell, e.g. `["plugin", "load", "Blog"]`.
    pub fn dispatch_shell(&self, args: &[&str]) -> Result<bool> {
        let args: Vec<String> = match args {
            [single] => single.split(' ').map(str::to_string).collect(),
            _ => args.iter().map(|a| a.to_string()).collect(),
        };

        ShellDispatcher::new(Rc::clone(&self.context), Rc::clone(&self.io)).dispatch(&args)
    }

    /// The declared task `name`, built and initialized on first access and
    /// cached afterwards. `None` when no such task is declared.
    pub fn task(&mut self, name: &str) -> Result<Option<&mut Shell>> {
        if !self.loaded.contains_key(name) {
            let Some(descriptor) = self.task_map.get(name).cloned() else {
                return Ok(None);
            };

            let commands = self.context.tasks().load(
                &descriptor.class,
                &descriptor.config,
                self.context.plugins(),
            )?;

            let mut lineage = self.lineage.clone();
            lineage.push(descriptor.class.clone());

            let mut task = Shell::new(commands, Rc::clone(&self.io), Rc::clone(&self.context));
            task.state.plugin = plugin_split(&descriptor.class)
                .0
                .map(str::to_string)
                .or_else(|| self.plugin.clone());
            task.state.lineage = lineage;
            task.state.interactive = self.interactive;
            task.state.params = Rc::clone(&self.params);
            task.state.args = Rc::clone(&self.args);
            task.initialize()?;
            task.load_tasks()?;

            debug!(shell = %self.name, task = name, class = %descriptor.class, "Task materialized");
            self.loaded.insert(name.to_string(), task);
        }

        Ok(self.loaded.get_mut(name))
    }
}

/// A command container: a concrete shell's behaviour plus its state.
pub struct Shell {
    commands: Box<dyn ShellCommands>,
    exposed: CommandSet,
    state: ShellState,
}

impl Shell {
    pub fn new(commands: Box<dyn ShellCommands>, io: Rc<ConsoleIo>, context: Rc<Context>) -> Self {
        let exposed = commands.commands();
        let state = ShellState {
            name: commands.name().to_string(),
            plugin: None,
            command: None,
            params: Rc::new(RefCell::new(Params::new())),
            args: Rc::new(RefCell::new(Vec::new())),
            interactive: true,
            io,
            context,
            lineage: Vec::new(),
            task_map: TaskMap::new(),
            loaded: HashMap::new(),
        };

        Shell {
            commands,
            exposed,
            state,
        }
    }

    pub fn with_plugin(mut self, plugin: Option<&str>) -> Self {
        self.state.plugin = plugin.map(str::to_string);
        self
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Runs the shell's `initialize` hook, then loads its tasks.
    pub fn initialize(&mut self) -> Result<()> {
        self.commands.initialize(&mut self.state)?;
        self.load_tasks()
    }

    /// Builds the task map from the declared tasks. Safe to call repeatedly.
    pub fn load_tasks(&mut self) -> Result<()> {
        let declarations = self.commands.tasks();
        if declarations.is_empty() {
            return Ok(());
        }
        self.state.task_map.load(&declarations, &self.state.lineage)
    }

    pub fn has_task(&self, command: &str) -> bool {
        self.state.task_map.has_task(command)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.exposed.exposes(name)
    }

    pub fn classify(&self, command: &str) -> Classification {
        Classification::classify(command, &self.state.task_map, &self.exposed)
    }

    /// The configured option parser, named `Plugin.Name` for plugin shells.
    pub fn option_parser(&self) -> OptionParser {
        let name = match &self.state.plugin {
            Some(plugin) => format!("{}.{}", plugin, self.state.name),
            None => self.state.name.clone(),
        };
        self.commands.option_parser(OptionParser::new(&name))
    }

    pub fn task(&mut self, name: &str) -> Result<Option<&mut Shell>> {
        self.state.task(name)
    }

    /// Command names offered for completion: exposed methods other than
    /// `main`, then declared tasks underscored.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .exposed
            .exposed()
            .filter(|name| *name != MAIN)
            .map(str::to_string)
            .collect();

        for (name, _) in TaskMap::normalize(&self.commands.tasks()) {
            let name = underscore(&name);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Resolves `command` and runs it. `argv` still holds the command token
    /// at its head; tasks receive it unchanged.
    ///
    /// Usage problems and unknown commands print help and return `Ok(false)`.
    /// `Err` is reserved for stops and failures outside the command line.
    pub fn run_command(&mut self, command: &str, argv: Vec<String>) -> Result<bool> {
        let classification = self.classify(command);
        debug!(shell = %self.state.name, command, ?classification, "Classified command");

        let mut parse_argv = argv.clone();
        if classification.shifts_argv(command) && !parse_argv.is_empty() {
            parse_argv.remove(0);
        }

        let parser = self.option_parser();
        let (params, args) = match parser.parse(&parse_argv, Some(command)) {
            Ok(parsed) => parsed,
            Err(Error::UsageError(err)) => {
                debug!(shell = %self.state.name, command, error = %err, "Invalid command line");
                self.state.out(&parser.help(Some(command), HelpFormat::Text))?;
                return Ok(false);
            }
            Err(err) => return Err(err),
        };
        *self.state.params.borrow_mut() = params;
        *self.state.args.borrow_mut() = args;

        self.apply_params()?;
        self.state.command = Some(command.to_string());

        if self.state.params().flag("help") {
            return self.display_help(&parser, command);
        }

        if classification.runs_startup(command) {
            self.commands.startup(&mut self.state)?;
        }

        match classification.outcome(command) {
            Outcome::Task => {
                let name = camelize(command);
                let task = self
                    .state
                    .task(&name)?
                    .ok_or_else(|| Error::MissingTask(name.clone()))?;
                task.run_command(EXECUTE, argv)
            }
            Outcome::Method => self.commands.invoke(command, &mut self.state),
            Outcome::Main => self.commands.invoke(MAIN, &mut self.state),
            Outcome::Unresolved => {
                self.state.out(&parser.help(Some(command), HelpFormat::Text))?;
                Ok(false)
            }
        }
    }

    /// Applies `quiet`, then `verbose`, then `plugin`.
    fn apply_params(&self) -> Result<()> {
        let (quiet, verbose, plugin) = {
            let params = self.state.params();
            (
                params.flag("quiet"),
                params.flag("verbose"),
                params.value("plugin").map(str::to_string),
            )
        };

        if quiet {
            self.state.io.set_level(Verbosity::Quiet);
            self.state.io.set_loggers(false);
        }
        if verbose {
            self.state.io.set_level(Verbosity::Verbose);
        }
        if let Some(plugin) = plugin {
            self.state.context.plugins().load(&plugin)?;
        }
        Ok(())
    }

    fn display_help(&self, parser: &OptionParser, command: &str) -> Result<bool> {
        let xml = self.state.args().first().is_some_and(|arg| arg == "xml");

        let format = if xml {
            self.state.io.output_as(OutputMode::Raw);
            HelpFormat::Xml
        } else {
            self.state.welcome()?;
            HelpFormat::Text
        };

        self.state.out(&parser.help(Some(command), format))?;
        Ok(true)
    }
}
