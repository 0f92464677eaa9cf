//! A tiny interactive command interpreter.
//!
//! Each input line is split into words; the first word names either a builtin
//! (`exit`, `env`, `cp`) executed in-process, or a program found on `PATH` that is
//! run in a child process and waited for. An external command whose first argument
//! is a positive integer runs that many times in a row (see [`Config`]).
//!
//! The main entry point is [`Interpreter`], which runs commands by name or drives a
//! whole session through [`Interpreter::repl`]. The public modules [`command`] and
//! [`env`] expose traits and types for implementing your own commands and for
//! controlling what the interpreter sees of the process environment.

mod builtin;
pub mod command;
mod config;
pub mod env;
mod error;
mod external;
mod interpreter;
mod lexer;
#[cfg(test)]
mod test_support;

pub use config::Config;
pub use env::Environment;
pub use error::ShellError;
pub use external::{parse_repeat_count, resolve};
pub use interpreter::{EXIT_MESSAGE, Interpreter, LineReader, PlainLines};
pub use lexer::split_into_tokens;
