use crate::error::Result;
use crate::io::Verbosity;
use crate::io::table::render_table;
use crate::parser::{OptionParser, ParserSubcommand};
use crate::shell::resolver::{CommandSet, EXECUTE, MAIN};
use crate::shell::tasks::TaskDeclaration;
use crate::shell::{ShellCommands, ShellState};

#[derive(Debug)]
pub struct PluginShell;

impl ShellCommands for PluginShell {
    fn name(&self) -> &str {
        "Plugin"
    }

    fn commands(&self) -> CommandSet {
        CommandSet::new().command("loaded").main()
    }

    fn tasks(&self) -> Vec<TaskDeclaration> {
        vec!["Load".into()]
    }

    fn option_parser(&self, parser: OptionParser) -> OptionParser {
        parser
            .description("Inspect and load configured plugins.")
            .subcommand(ParserSubcommand::new("loaded").help("List the loaded plugins."))
            .subcommand(ParserSubcommand::new("load").help("Load one or more plugins by name."))
    }

    fn invoke(&mut self, command: &str, shell: &mut ShellState) -> Result<bool> {
        let plugins = shell.context().plugins();

        match command {
            "loaded" => {
                let loaded = plugins.loaded();
                if loaded.is_empty() {
                    shell.out("No plugins loaded.")?;
                }
                for name in &loaded {
                    shell.out(name)?;
                }
                let summary = format!(
                    "<comment>{} of {} configured plugins loaded</comment>",
                    loaded.len(),
                    plugins.available().count()
                );
                shell.out_with(&summary, 1, Verbosity::Verbose)?;
            }
            MAIN => {
                let rows: Vec<Vec<String>> = plugins
                    .available()
                    .map(|(name, config)| {
                        vec![
                            name.clone(),
                            config
                                .path
                                .as_ref()
                                .map(|path| path.display().to_string())
                                .unwrap_or_default(),
                            if plugins.is_loaded(name) { "yes" } else { "no" }.to_string(),
                        ]
                    })
                    .collect();

                if rows.is_empty() {
                    shell.out("No plugins configured.")?;
                } else {
                    shell.out(&render_table(&["Plugin", "Path", "Loaded"], &rows))?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// `plugin load <name>...`
#[derive(Debug)]
pub struct LoadTask;

impl ShellCommands for LoadTask {
    fn name(&self) -> &str {
        "Load"
    }

    fn commands(&self) -> CommandSet {
        CommandSet::new().command(EXECUTE)
    }

    fn invoke(&mut self, command: &str, shell: &mut ShellState) -> Result<bool> {
        if command != EXECUTE {
            return Ok(false);
        }

        // args[0] is the `load` token itself
        let names: Vec<String> = shell.args().iter().skip(1).cloned().collect();
        if names.is_empty() {
            return shell.error("No plugin name given.", Some("Usage: plugin load <name>..."));
        }

        for name in &names {
            if shell.context().plugins().load(name).is_err() {
                return shell.error(&format!("Plugin {} could not be found.", name), None);
            }
            shell.out(&format!("<success>Loaded</success> plugin `{}`", name))?;
        }
        Ok(true)
    }
}
