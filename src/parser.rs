//! Declarative option parser compiled to `clap` commands.
//!
//! A shell describes its options, positional arguments and subcommands once;
//! parsing is keyed by the command being run so a subcommand with its own
//! parser is parsed with that parser instead of the root one.

use crate::error::Result;
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;

const EXTRA_ARGS: &str = "__args";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Flag(bool),
    Value(String),
}

/// Parsed option values keyed by option name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn set(&mut self, name: &str, value: ParamValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// True for a set flag or a non-empty value.
    pub fn flag(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(ParamValue::Flag(set)) => *set,
            Some(ParamValue::Value(value)) => !value.is_empty(),
            None => false,
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Value(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpFormat {
    Text,
    Xml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOption {
    name: String,
    short: Option<char>,
    help: String,
    boolean: bool,
    default: Option<String>,
    choices: Vec<String>,
}

impl ParserOption {
    /// A boolean switch.
    pub fn flag(name: &str) -> Self {
        ParserOption {
            name: name.to_string(),
            short: None,
            help: String::new(),
            boolean: true,
            default: None,
            choices: Vec::new(),
        }
    }

    /// An option taking a value.
    pub fn value(name: &str) -> Self {
        ParserOption {
            boolean: false,
            ..ParserOption::flag(name)
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn default_value(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.help.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }

        if self.boolean {
            return arg.action(ArgAction::SetTrue);
        }

        arg = arg.action(ArgAction::Set).num_args(1);
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        if !self.choices.is_empty() {
            arg = arg.value_parser(PossibleValuesParser::new(self.choices.clone()));
        }
        arg
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserArgument {
    name: String,
    help: String,
    required: bool,
    choices: Vec<String>,
}

impl ParserArgument {
    pub fn new(name: &str) -> Self {
        ParserArgument {
            name: name.to_string(),
            help: String::new(),
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }

    fn to_arg(&self, relaxed: bool) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .help(self.help.clone())
            .action(ArgAction::Set)
            .required(self.required && !relaxed);
        if !self.choices.is_empty() {
            arg = arg.value_parser(PossibleValuesParser::new(self.choices.clone()));
        }
        arg
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSubcommand {
    name: String,
    help: String,
    parser: Option<OptionParser>,
}

impl ParserSubcommand {
    pub fn new(name: &str) -> Self {
        ParserSubcommand {
            name: name.to_string(),
            help: String::new(),
            parser: None,
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn parser(mut self, parser: OptionParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionParser {
    command: String,
    description: Option<String>,
    epilog: Option<String>,
    options: Vec<ParserOption>,
    arguments: Vec<ParserArgument>,
    subcommands: Vec<ParserSubcommand>,
}

impl OptionParser {
    /// A parser for `command` carrying the default `help`, `verbose`, `quiet`
    /// and `plugin` options.
    pub fn new(command: &str) -> Self {
        OptionParser {
            command: command.to_string(),
            description: None,
            epilog: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
        }
        .option(
            ParserOption::flag("help")
                .short('h')
                .help("Display this help."),
        )
        .option(
            ParserOption::flag("verbose")
                .short('v')
                .help("Enable verbose output."),
        )
        .option(
            ParserOption::flag("quiet")
                .short('q')
                .help("Enable quiet output."),
        )
        .option(
            ParserOption::value("plugin")
                .short('p')
                .help("Plugin to load before running the command."),
        )
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    /// Adds an option, replacing any option or argument with the same name.
    /// An earlier option holding the same short flag loses it.
    pub fn option(mut self, option: ParserOption) -> Self {
        self.options.retain(|o| o.name != option.name);
        self.arguments.retain(|a| a.name != option.name);
        if let Some(short) = option.short {
            for earlier in self.options.iter_mut().filter(|o| o.short == Some(short)) {
                earlier.short = None;
            }
        }
        self.options.push(option);
        self
    }

    /// Adds a positional argument, replacing any option or argument with the same name.
    pub fn argument(mut self, argument: ParserArgument) -> Self {
        self.options.retain(|o| o.name != argument.name);
        self.arguments.retain(|a| a.name != argument.name);
        self.arguments.push(argument);
        self
    }

    pub fn subcommand(mut self, subcommand: ParserSubcommand) -> Self {
        self.subcommands.retain(|s| s.name != subcommand.name);
        self.subcommands.push(subcommand);
        self
    }

    pub fn command_name(&self) -> &str {
        &self.command
    }

    pub fn about(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &[ParserOption] {
        &self.options
    }

    pub fn subcommands(&self) -> &[ParserSubcommand] {
        &self.subcommands
    }

    fn subcommand_parser(&self, command: &str) -> Option<&OptionParser> {
        self.subcommands
            .iter()
            .find(|s| s.name == command)
            .and_then(|s| s.parser.as_ref())
    }

    fn build(&self, relaxed: bool) -> Command {
        let mut cmd = Command::new(self.command.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true);
        if let Some(description) = &self.description {
            cmd = cmd.about(description.clone());
        }
        if let Some(epilog) = &self.epilog {
            cmd = cmd.after_help(epilog.clone());
        }

        for option in &self.options {
            cmd = cmd.arg(option.to_arg());
        }
        for argument in &self.arguments {
            cmd = cmd.arg(argument.to_arg(relaxed));
        }
        if self.arguments.is_empty() {
            cmd = cmd.arg(
                Arg::new(EXTRA_ARGS)
                    .action(ArgAction::Append)
                    .num_args(0..)
                    .value_name("ARGS")
                    .hide(true),
            );
        }
        cmd
    }

    /// Parses `argv` for `command`, returning the option values and the
    /// positional arguments in order.
    pub fn parse(&self, argv: &[String], command: Option<&str>) -> Result<(Params, Vec<String>)> {
        if let Some(parser) = command.and_then(|c| self.subcommand_parser(c)) {
            return parser.parse(argv, None);
        }

        let relaxed = argv.iter().any(|a| a == "--help" || a == "-h");
        let matches = self.build(relaxed).try_get_matches_from(argv)?;

        Ok((self.params_from(&matches), self.args_from(&matches)))
    }

    fn params_from(&self, matches: &ArgMatches) -> Params {
        let mut params = Params::new();
        for option in &self.options {
            if option.boolean {
                params.set(&option.name, ParamValue::Flag(matches.get_flag(&option.name)));
            } else if let Some(value) = matches.get_one::<String>(&option.name) {
                params.set(&option.name, ParamValue::Value(value.clone()));
            }
        }
        params
    }

    fn args_from(&self, matches: &ArgMatches) -> Vec<String> {
        if self.arguments.is_empty() {
            return matches
                .get_many::<String>(EXTRA_ARGS)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
        }

        self.arguments
            .iter()
            .filter_map(|argument| matches.get_one::<String>(&argument.name).cloned())
            .collect()
    }

    /// Help for `command`: the subcommand's own parser when it has one,
    /// otherwise the root help.
    pub fn help(&self, command: Option<&str>, format: HelpFormat) -> String {
        if let Some(parser) = command.and_then(|c| self.subcommand_parser(c)) {
            let mut parser = parser.clone();
            parser.command = format!("{} {}", self.command, parser.command);
            return parser.help(None, format);
        }

        match format {
            HelpFormat::Text => self.text_help(),
            HelpFormat::Xml => self.xml_help(),
        }
    }

    fn text_help(&self) -> String {
        let mut cmd = self.build(true);

        if !self.subcommands.is_empty() {
            let width = self.subcommands.iter().map(|s| s.name.len()).max().unwrap_or(0);
            let mut listing = String::from("Subcommands:\n");
            for subcommand in &self.subcommands {
                listing.push_str(&format!(
                    "  {:width$}  {}\n",
                    subcommand.name,
                    subcommand.help,
                    width = width
                ));
            }
            if let Some(epilog) = &self.epilog {
                listing.push('\n');
                listing.push_str(epilog);
            }
            cmd = cmd.after_help(listing);
        }

        cmd.render_help().to_string()
    }

    fn xml_help(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<shell>\n");
        xml.push_str(&format!("<command>{}</command>\n", escape(&self.command)));
        xml.push_str(&format!(
            "<description>{}</description>\n",
            escape(self.description.as_deref().unwrap_or_default())
        ));

        xml.push_str("<subcommands>\n");
        for subcommand in &self.subcommands {
            xml.push_str(&format!(
                "<command name=\"{}\" help=\"{}\"/>\n",
                escape(&subcommand.name),
                escape(&subcommand.help)
            ));
        }
        xml.push_str("</subcommands>\n<options>\n");
        for option in &self.options {
            let short = option.short.map(|s| format!("-{}", s)).unwrap_or_default();
            xml.push_str(&format!(
                "<option name=\"--{}\" short=\"{}\" help=\"{}\" boolean=\"{}\">",
                escape(&option.name),
                short,
                escape(&option.help),
                u8::from(option.boolean)
            ));
            xml.push_str(&format!(
                "<default>{}</default>",
                escape(option.default.as_deref().unwrap_or_default())
            ));
            xml.push_str(&choices_xml(&option.choices));
            xml.push_str("</option>\n");
        }
        xml.push_str("</options>\n<arguments>\n");
        for argument in &self.arguments {
            xml.push_str(&format!(
                "<argument name=\"{}\" help=\"{}\" required=\"{}\">",
                escape(&argument.name),
                escape(&argument.help),
                u8::from(argument.required)
            ));
            xml.push_str(&choices_xml(&argument.choices));
            xml.push_str("</argument>\n");
        }
        xml.push_str("</arguments>\n");
        xml.push_str(&format!(
            "<epilog>{}</epilog>\n</shell>",
            escape(self.epilog.as_deref().unwrap_or_default())
        ));
        xml
    }
}

fn choices_xml(choices: &[String]) -> String {
    let inner: String = choices
        .iter()
        .map(|choice| format!("<choice>{}</choice>", escape(choice)))
        .collect();
    format!("<choices>{}</choices>", inner)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    fn parser() -> OptionParser {
        OptionParser::new("Deploy")
            .description("Deploys things.")
            .option(ParserOption::flag("dry").short('d').help("Dry run."))
            .option(ParserOption::value("env").choices(&["dev", "prod"]))
            .subcommand(
                ParserSubcommand::new("api")
                    .help("Deploy the api.")
                    .parser(
                        OptionParser::new("api")
                            .option(ParserOption::flag("force"))
                            .argument(ParserArgument::new("target").required(true)),
                    ),
            )
            .subcommand(ParserSubcommand::new("web").help("Deploy the web app."))
    }

    #[test]
    fn test_parse_defaults_and_positionals() -> Result<()> {
        // Test
        let (params, args) = parser().parse(&argv(&["one", "--dry", "two", "-v"]), None)?;

        // Validate
        assert!(params.flag("dry"));
        assert!(params.flag("verbose"));
        assert!(!params.flag("quiet"));
        assert!(!params.flag("help"));
        assert_eq!(params.value("plugin"), None);
        assert_eq!(args, argv(&["one", "two"]));
        Ok(())
    }

    #[test]
    fn test_parse_value_option() -> Result<()> {
        let (params, _) = parser().parse(&argv(&["--env", "prod", "--plugin", "Blog"]), None)?;

        // Validate
        assert_eq!(params.value("env"), Some("prod"));
        assert_eq!(params.value("plugin"), Some("Blog"));
        Ok(())
    }

    #[test]
    fn test_unknown_option_is_usage_error() {
        let result = parser().parse(&argv(&["--nope"]), None);
        assert!(matches!(result, Err(Error::UsageError(_))));
    }

    #[test]
    fn test_invalid_choice_is_usage_error() {
        let result = parser().parse(&argv(&["--env", "staging"]), None);
        assert!(matches!(result, Err(Error::UsageError(_))));
    }

    #[test]
    fn test_subcommand_parser_is_used() -> Result<()> {
        // Test
        let (params, args) = parser().parse(&argv(&["--force", "cluster"]), Some("api"))?;

        // Validate
        assert!(params.flag("force"));
        assert_eq!(params.get("dry"), None);
        assert_eq!(args, argv(&["cluster"]));
        Ok(())
    }

    #[test]
    fn test_required_argument_relaxed_for_help() -> Result<()> {
        assert!(parser().parse(&argv(&[]), Some("api")).is_err());

        // Test
        let (params, args) = parser().parse(&argv(&["--help"]), Some("api"))?;

        // Validate
        assert!(params.flag("help"));
        assert!(args.is_empty());
        Ok(())
    }

    #[test]
    fn test_subcommand_without_parser_uses_root() -> Result<()> {
        let (params, _) = parser().parse(&argv(&["--dry"]), Some("web"))?;
        assert!(params.flag("dry"));
        Ok(())
    }

    #[test]
    fn test_text_help() {
        // Test
        let help = parser().help(None, HelpFormat::Text);

        // Validate
        assert!(help.contains("Usage: Deploy"));
        assert!(help.contains("Deploys things."));
        assert!(help.contains("--dry"));
        assert!(help.contains("api"));
    }

    #[test]
    fn test_subcommand_help_is_prefixed() {
        let help = parser().help(Some("api"), HelpFormat::Text);
        assert!(help.contains("Usage: Deploy api"));
        assert!(help.contains("--force"));
    }

    #[test]
    fn test_xml_help() {
        // Test
        let xml = parser().help(None, HelpFormat::Xml);

        // Validate
        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<command>Deploy</command>"));
        assert!(xml.contains("<command name=\"api\" help=\"Deploy the api.\"/>"));
        assert!(xml.contains("name=\"--dry\" short=\"-d\""));
        assert!(xml.contains("<choice>prod</choice>"));
    }

    #[test]
    fn test_params_flag_semantics() {
        let mut params = Params::new();
        params.set("plugin", ParamValue::Value(String::new()));
        params.set("noclear", ParamValue::Flag(true));

        // Validate
        assert!(!params.flag("plugin"));
        assert!(params.flag("noclear"));
        assert!(!params.flag("missing"));
    }

    #[test]
    fn test_later_option_takes_over_short_flag() -> Result<()> {
        let parser = OptionParser::new("Deploy").option(ParserOption::flag("version").short('v'));

        // Test
        let (params, _) = parser.parse(&argv(&["-v", "--verbose"]), None)?;
        let help = parser.help(None, HelpFormat::Text);

        // Validate
        assert!(params.flag("version"));
        assert!(params.flag("verbose"));
        assert_eq!(parser.options().iter().filter(|o| o.short_name() == Some('v')).count(), 1);
        assert!(help.contains("--version"));
        Ok(())
    }

    #[test]
    fn test_argument_replaces_option_of_same_name() -> Result<()> {
        let parser = OptionParser::new("Deploy").argument(ParserArgument::new("plugin"));

        // Test
        let (params, args) = parser.parse(&argv(&["Blog"]), None)?;

        // Validate
        assert!(parser.options().iter().all(|o| o.name() != "plugin"));
        assert_eq!(params.get("plugin"), None);
        assert_eq!(args, argv(&["Blog"]));
        Ok(())
    }
}
