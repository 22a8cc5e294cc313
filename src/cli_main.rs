use clap::Parser;
use std::path::PathBuf;
use std::rc::Rc;
use taskshell::context::{Config, Context};
use taskshell::dispatcher::ShellDispatcher;
use taskshell::io::ConsoleIo;
use taskshell::logger::system_logger;
use taskshell::shell::commands::register;
use taskshell::Result;

#[derive(Debug, Parser)]
#[command(name = "taskshell", version, about = "Run a shell command and exit.")]
struct CliArgs {
    /// Path to a config file, overriding TASKSHELL_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// <shell> [command] [args...]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    argv: Vec<String>,
}

fn build_context(args: &CliArgs) -> Result<Context> {
    let context = match &args.config {
        Some(path) => Context::new(Config::from_toml(path)?),
        None => Context::init()?,
    };
    Ok(register(context))
}

fn main() {
    let args = CliArgs::parse();

    let context = match build_context(&args) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let io = ConsoleIo::new();
    let logging = &context.config().logging;
    if let Err(e) = system_logger(logging.dir.as_deref(), &logging.level, io.log_switch()) {
        eprintln!("Error initializing logger: {}", e);
    }

    let dispatcher = ShellDispatcher::new(Rc::new(context), Rc::new(io));
    let status = dispatcher.run(&args.argv);

    std::process::exit(status);
}
