use crate::dispatcher::ShellDispatcher;
use crate::error::Result;
use crate::parser::{HelpFormat, OptionParser, ParserArgument, ParserSubcommand};
use crate::shell::resolver::{CommandSet, MAIN};
use crate::shell::{ShellCommands, ShellState};
use std::rc::Rc;

/// Lists shells, commands and options for shell completion scripts.
#[derive(Debug)]
pub struct CompletionShell;

impl CompletionShell {
    fn dispatcher(shell: &ShellState) -> ShellDispatcher {
        ShellDispatcher::new(Rc::clone(shell.context()), Rc::clone(shell.io()))
    }

    fn shell_arg(shell: &ShellState) -> Option<String> {
        shell.args().first().cloned()
    }
}

impl ShellCommands for CompletionShell {
    fn name(&self) -> &str {
        "Completion"
    }

    fn commands(&self) -> CommandSet {
        CommandSet::new()
            .command("commands")
            .command("subcommands")
            .command("options")
            .command("fuzzy")
            .main()
    }

    fn option_parser(&self, parser: OptionParser) -> OptionParser {
        let shell_argument = || {
            OptionParser::new("shell").argument(ParserArgument::new("shell").help("The shell name."))
        };

        parser
            .description("Used by shells like bash to autocomplete command names, options and arguments.")
            .subcommand(ParserSubcommand::new("commands").help("Output a list of available shells."))
            .subcommand(
                ParserSubcommand::new("subcommands")
                    .help("Output a list of available subcommands of a shell.")
                    .parser(shell_argument()),
            )
            .subcommand(
                ParserSubcommand::new("options")
                    .help("Output a list of available options of a shell.")
                    .parser(shell_argument()),
            )
            .subcommand(ParserSubcommand::new("fuzzy").help("Guess autocomplete."))
            .epilog("This command is not intended to be called manually.")
    }

    /// Completion output is machine read, so no banner.
    fn startup(&mut self, _shell: &mut ShellState) -> Result<()> {
        Ok(())
    }

    fn invoke(&mut self, command: &str, shell: &mut ShellState) -> Result<bool> {
        match command {
            "commands" => {
                let names: Vec<String> = Self::dispatcher(shell)
                    .describe_shells()?
                    .into_iter()
                    .map(|summary| summary.name)
                    .collect();
                shell.out(&names.join(" "))?;
            }
            "subcommands" => {
                let commands = match Self::shell_arg(shell) {
                    Some(name) => Self::dispatcher(shell)
                        .describe(&name)
                        .map(|summary| summary.commands)
                        .unwrap_or_default(),
                    None => Vec::new(),
                };
                shell.out(&commands.join(" "))?;
            }
            "options" => {
                let options = match Self::shell_arg(shell) {
                    Some(name) => Self::dispatcher(shell)
                        .describe(&name)
                        .map(|summary| summary.options)
                        .unwrap_or_default(),
                    None => Self::dispatcher(shell).describe(self.name())?.options,
                };
                shell.out(&options.join(" "))?;
            }
            "fuzzy" => {}
            MAIN => {
                let parser = self.option_parser(OptionParser::new(self.name()));
                shell.out(&parser.help(None, HelpFormat::Text))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
