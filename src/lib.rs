pub mod context;
pub mod dispatcher;
pub mod error;
pub mod io;
pub mod logger;
pub mod parser;
pub mod repl;
pub mod shell;
pub mod utils;

pub use error::{Error, Result};
