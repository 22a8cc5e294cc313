pub mod output;
pub mod table;

use crate::error::Result;
use crate::logger::LogSwitch;
use inquire::{Select, Text};
use output::{ConsoleOutput, OutputMode};
use std::cell::{Cell, RefCell};
use std::io::{BufRead, Write};

/// Output verbosity, ordered so that `Quiet < Normal < Verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Where answers to prompts come from.
enum Input {
    /// An attended terminal, prompted through `inquire`.
    Terminal,
    /// Piped stdin or an injected reader, one answer per line.
    Stream(RefCell<Box<dyn BufRead>>),
}

/// Line oriented console channel shared by a shell and its tasks.
pub struct ConsoleIo {
    out: RefCell<ConsoleOutput>,
    err: RefCell<ConsoleOutput>,
    input: Input,
    level: Cell<Verbosity>,
    loggers: LogSwitch,
}

impl ConsoleIo {
    pub fn new() -> Self {
        ConsoleIo {
            out: RefCell::new(ConsoleOutput::stdout()),
            err: RefCell::new(ConsoleOutput::stderr()),
            input: if console::user_attended() {
                Input::Terminal
            } else {
                Input::Stream(RefCell::new(Box::new(std::io::BufReader::new(std::io::stdin()))))
            },
            level: Cell::new(Verbosity::Normal),
            loggers: LogSwitch::default(),
        }
    }

    /// Builds a channel over arbitrary streams, writing in plain mode.
    pub fn with_streams(out: Box<dyn Write>, err: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        ConsoleIo {
            out: RefCell::new(ConsoleOutput::new(out, OutputMode::Plain)),
            err: RefCell::new(ConsoleOutput::new(err, OutputMode::Plain)),
            input: Input::Stream(RefCell::new(input)),
            level: Cell::new(Verbosity::Normal),
            loggers: LogSwitch::default(),
        }
    }

    pub fn with_log_switch(mut self, switch: LogSwitch) -> Self {
        self.loggers = switch;
        self
    }

    pub fn level(&self) -> Verbosity {
        self.level.get()
    }

    pub fn set_level(&self, level: Verbosity) {
        self.level.set(level);
    }

    /// Enables or disables the console log sink.
    pub fn set_loggers(&self, enabled: bool) {
        self.loggers.set(enabled);
    }

    pub fn loggers_enabled(&self) -> bool {
        self.loggers.is_enabled()
    }

    pub fn log_switch(&self) -> &LogSwitch {
        &self.loggers
    }

    pub fn output_as(&self, mode: OutputMode) {
        self.out.borrow_mut().set_mode(mode);
    }

    pub fn output_mode(&self) -> OutputMode {
        self.out.borrow().mode()
    }

    /// Writes to stdout when `level` is within the current verbosity. Returns
    /// the bytes written, zero when the message was filtered.
    pub fn out(&self, message: &str, newlines: usize, level: Verbosity) -> Result<usize> {
        if level > self.level.get() {
            return Ok(0);
        }
        Ok(self.out.borrow_mut().write(message, newlines)?)
    }

    pub fn err(&self, message: &str, newlines: usize) -> Result<usize> {
        Ok(self.err.borrow_mut().write(message, newlines)?)
    }

    /// Writes a horizontal rule of `width` dashes padded by `newlines` blank
    /// lines. Suppressed in quiet mode like any normal output.
    pub fn hr(&self, newlines: usize, width: usize) -> Result<()> {
        if Verbosity::Normal > self.level.get() {
            return Ok(());
        }
        let mut out = self.out.borrow_mut();
        if newlines > 0 {
            out.write("", newlines)?;
        }
        out.write(&"-".repeat(width), 1)?;
        if newlines > 0 {
            out.write("", newlines)?;
        }
        Ok(())
    }

    /// Prompts for a line of input, falling back to `default` on an empty answer.
    pub fn ask(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let reader = match &self.input {
            Input::Terminal => {
                let mut text = Text::new(prompt);
                if let Some(default) = default {
                    text = text.with_default(default);
                }
                return Ok(text.prompt()?);
            }
            Input::Stream(reader) => reader,
        };

        self.write_question(prompt, default)?;
        let mut line = String::new();
        reader.borrow_mut().read_line(&mut line)?;
        let answer = line.trim();

        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer.to_string())
    }

    /// Prompts until one of `options` is given. End of input yields the default.
    pub fn ask_choice(&self, prompt: &str, options: &[&str], default: Option<&str>) -> Result<String> {
        let reader = match &self.input {
            Input::Terminal => {
                let answer = Select::new(prompt, options.to_vec())
                    .with_starting_cursor(starting_cursor(options, default))
                    .prompt()?;
                return Ok(answer.to_string());
            }
            Input::Stream(reader) => reader,
        };

        let question = format!("{} ({})", prompt, options.join("/"));
        loop {
            self.write_question(&question, default)?;

            let mut line = String::new();
            if reader.borrow_mut().read_line(&mut line)? == 0 {
                return Ok(default.unwrap_or_default().to_string());
            }

            let answer = line.trim();
            if answer.is_empty() {
                if let Some(default) = default {
                    return Ok(default.to_string());
                }
            }
            if let Some(option) = options.iter().find(|o| o.eq_ignore_ascii_case(answer)) {
                return Ok(option.to_string());
            }
        }
    }

    fn write_question(&self, question: &str, default: Option<&str>) -> Result<()> {
        let prompt = match default {
            Some(default) => format!("<question>{}</question> [{}]\n> ", question, default),
            None => format!("<question>{}</question>\n> ", question),
        };
        self.out.borrow_mut().write(&prompt, 0)?;
        Ok(())
    }
}

/// Index of `default` among `options`, so a terminal select starts on it.
fn starting_cursor(options: &[&str], default: Option<&str>) -> usize {
    default
        .and_then(|default| options.iter().position(|o| o.eq_ignore_ascii_case(default)))
        .unwrap_or(0)
}

impl Default for ConsoleIo {
    fn default() -> Self {
        ConsoleIo::new()
    }
}
