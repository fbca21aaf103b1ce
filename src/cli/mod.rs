pub mod args;
pub mod commands;
pub mod search;
pub mod sharing;
pub mod table_definition;

pub use args::{Cli, Command};
pub use commands::{run, Console};
