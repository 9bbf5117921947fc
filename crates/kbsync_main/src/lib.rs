mod app;
mod cli;
mod console;

pub use app::run;
pub use cli::{Cli, Command, ThrottleArgs};
pub use console::ConsoleReporter;
