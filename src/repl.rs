pub mod completer;
pub mod header;
pub mod prompt;

use crate::dispatcher::ShellDispatcher;
use crate::error::{Error, Result};
use crate::io::output::OutputMode;
use crate::io::Verbosity;
use crate::logger::system_logger;
use completer::ReplCompleter;
use header::{clear_terminal, print_header, print_menu};
use nu_ansi_term::{Color, Style};
use prompt::ShellPrompt;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultValidator, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, MenuBuilder, ReedlineEvent,
};
use reedline::{DefaultHinter, Reedline, ReedlineMenu, Signal};
use std::path::PathBuf;

/// Interactive loop handing each line to the shell dispatcher.
pub struct Repl {
    name: String,
    prompt: ShellPrompt,
    dispatcher: ShellDispatcher,
    history: Option<PathBuf>,
    history_capacity: Option<usize>,
    keybindings: Keybindings,
    hinter_style: Style,
    config_dir: PathBuf,
    output_mode: OutputMode,
}

impl Repl {
    pub fn new(dispatcher: ShellDispatcher) -> Self {
        let name = dispatcher.context().config().app.name.clone();
        let prompt = ShellPrompt::new(&name);
        let style = Style::new().italic().fg(Color::LightGray);
        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::Menu("completion_menu".to_string()),
        );
        let config_dir = Self::config_dir();
        let output_mode = dispatcher.io().output_mode();

        Self {
            name,
            prompt,
            dispatcher,
            history: None,
            history_capacity: None,
            keybindings,
            hinter_style: style,
            config_dir,
            output_mode,
        }
    }

    fn config_dir() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/taskshell"),
            Err(_) => PathBuf::from("."),
        }
    }

    pub fn with_logger(self, log_level: &str) -> Result<Self> {
        std::fs::create_dir_all(&self.config_dir)?;
        system_logger(
            Some(self.config_dir.as_path()),
            log_level,
            self.dispatcher.io().log_switch(),
        )?;

        Ok(self)
    }

    pub fn with_history(mut self, capacity: usize) -> Self {
        let path = self.config_dir.join("history.txt");
        self.history = Some(path);
        self.history_capacity = Some(capacity);

        self
    }

    pub fn with_hinter_style(mut self, style: Style) -> Self {
        self.hinter_style = style;

        self
    }

    fn build_line_editor(&mut self) -> Result<Reedline> {
        let completer = Box::new(ReplCompleter::new(self.dispatcher.describe_shells()?));
        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));
        let validator = Box::new(DefaultValidator);

        let mut line_editor = Reedline::create()
            .with_edit_mode(Box::new(Emacs::new(self.keybindings.clone())))
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_validator(validator);

        line_editor = line_editor.with_hinter(Box::new(
            DefaultHinter::default().with_style(self.hinter_style),
        ));

        if let (Some(history_path), Some(capacity)) = (&self.history, self.history_capacity) {
            let history = FileBackedHistory::with_file(capacity, history_path.to_path_buf())?;
            line_editor = line_editor.with_history(Box::new(history));
        }

        Ok(line_editor)
    }

    /// Flags like `--quiet` only last for the line that set them.
    fn reset_io(&self) {
        let io = self.dispatcher.io();
        io.set_level(Verbosity::Normal);
        io.set_loggers(true);
        io.output_as(self.output_mode);
    }

    /// Handles one input line. Returns false when the loop should end.
    fn parse_commands(&mut self, input: &str) -> Result<bool> {
        let args: Vec<String> = input.split_whitespace().map(str::to_string).collect();

        match args.first().map(String::as_str) {
            None => Ok(true),
            Some("exit") | Some("quit") => Ok(false),
            Some("clear") => {
                clear_terminal()?;
                print_header(&self.name);
                print_menu(&self.dispatcher.describe_shells()?);
                Ok(true)
            }
            Some(_) => {
                let result = self.dispatcher.dispatch(&args);
                self.reset_io();

                match result {
                    Ok(_) => Ok(true),
                    Err(Error::Stop(status)) => Err(Error::Stop(status)),
                    Err(err) => {
                        self.dispatcher
                            .io()
                            .err(&format!("<error>Error:</error> {}", err), 1)?;
                        Ok(true)
                    }
                }
            }
        }
    }

    pub fn run(&mut self) -> Result<()> {
        clear_terminal()?;
        print_header(&self.name);
        print_menu(&self.dispatcher.describe_shells()?);

        let mut line_editor = self.build_line_editor()?;

        loop {
            let sig = line_editor.read_line(&self.prompt);

            match sig {
                Ok(Signal::Success(input)) => {
                    if !self.parse_commands(&input)? {
                        break;
                    }
                }
                Ok(Signal::CtrlD) => {
                    println!("\nExiting...");
                    break;
                }
                Ok(Signal::CtrlC) => {
                    continue;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }
}
