pub mod completion;
pub mod plugin;

use crate::context::Context;
use completion::CompletionShell;
use plugin::{LoadTask, PluginShell};

/// Registers the built-in shells and their tasks.
pub fn register(context: Context) -> Context {
    context
        .with_shell("Completion", |_| Box::new(CompletionShell))
        .with_shell("Plugin", |_| Box::new(PluginShell))
        .with_task("Load", |_| Box::new(LoadTask))
}
