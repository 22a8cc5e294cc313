use nu_ansi_term::{Color, Style};
use std::rc::Rc;
use taskshell::context::Context;
use taskshell::dispatcher::ShellDispatcher;
use taskshell::io::ConsoleIo;
use taskshell::repl::Repl;
use taskshell::shell::commands::register;
use taskshell::{Error, Result};

fn run() -> Result<()> {
    let context = register(Context::init()?);
    let level = context.config().logging.level.clone();
    let dispatcher = ShellDispatcher::new(Rc::new(context), Rc::new(ConsoleIo::new()));

    let hinter_style = Style::new().dimmed().fg(Color::DarkGray);

    let mut repl = Repl::new(dispatcher)
        .with_logger(&level)?
        .with_history(1000)
        .with_hinter_style(hinter_style);

    repl.run()
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(Error::Stop(status)) => std::process::exit(status),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
