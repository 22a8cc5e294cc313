use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Logger error: {0}")]
    LoggerError(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("Reedline Error: {0}")]
    Reedline(#[from] reedline::ReedlineError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),
    #[error("Usage error: {0}")]
    UsageError(#[from] clap::Error),
    #[error("Shell class {0} could not be found.")]
    MissingShell(String),
    #[error("Task class {0} could not be found.")]
    MissingTask(String),
    #[error("Plugin {0} could not be found.")]
    MissingPlugin(String),
    #[error("Task cycle detected: {0}")]
    TaskCycle(String),
    #[error("Stopped with status {0}")]
    Stop(i32),
}

impl Error {
    /// Process exit status this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Stop(status) => *status,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code() {
        assert_eq!(Error::Stop(3).exit_code(), 3);
        assert_eq!(Error::MissingShell("Nope".to_string()).exit_code(), 1);
    }
}
