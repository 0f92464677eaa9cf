use crate::command::{CommandFactory, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::ExternalFactory;
use crate::lexer;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Message printed when input runs out.
pub const EXIT_MESSAGE: &str = "Exiting shell....";

/// Factory allows creating instances of builtin commands.
///
/// One factory per builtin type; see [`BuiltinCommand`](crate::builtin) implementations.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Source of command lines for the REPL.
pub trait LineReader {
    /// Show `prompt` and read one line. Returns `None` at end of input.
    ///
    /// `stdout` is the stream the interpreter writes to; readers that don't own a
    /// terminal print the prompt there.
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Option<String>>;
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str, _stdout: &mut dyn Write) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                // in-memory only, never saved
                self.add_history_entry(line.as_str())?;
                Ok(Some(line))
            }
            Err(err) if ends_session(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Ctrl-D and Ctrl-C at the prompt both end the session with the exit message.
///
/// No SIGINT handler is installed: a Ctrl-C while a child runs reaches the child
/// through the terminal's process group, and the shell goes on to the next prompt.
fn ends_session(err: &ReadlineError) -> bool {
    matches!(err, ReadlineError::Eof | ReadlineError::Interrupted)
}

/// Lines from any buffered reader, e.g. a pipe on standard input.
pub struct PlainLines<R> {
    input: R,
}

impl<R: BufRead> PlainLines<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for PlainLines<R> {
    fn read_line(&mut self, prompt: &str, stdout: &mut dyn Write) -> Result<Option<String>> {
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. Builtin factories come first,
/// so a builtin always shadows an external program of the same name.
///
/// Example
/// ```
/// use tsh::{Config, Environment, Interpreter};
/// let mut sh = Interpreter::new(Environment::with_vars([("A", "1")], "/"), Config::default());
/// let mut out: Vec<u8> = Vec::new();
/// let code = sh.run("env", &[], &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"A=1\n");
/// ```
pub struct Interpreter {
    env: Environment,
    config: Config,
    commands: Vec<Box<dyn CommandFactory>>,
    last_exit: ExitCode,
}

impl Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `env`, `cp`
    /// - external command launcher
    pub fn new(env: Environment, config: Config) -> Self {
        use crate::builtin::*;
        let commands: Vec<Box<dyn CommandFactory>> = vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Env>::default()),
            Box::new(Factory::<Cp>::default()),
            Box::new(ExternalFactory::new(config.repeat_count())),
        ];
        Self::with_commands(env, config, commands)
    }

    /// Create a new interpreter with a custom set of command factories.
    pub fn with_commands(
        env: Environment,
        config: Config,
        commands: Vec<Box<dyn CommandFactory>>,
    ) -> Self {
        Self {
            env,
            config,
            commands,
            last_exit: 0,
        }
    }

    /// Exit code of the most recent command.
    pub fn last_exit(&self) -> ExitCode {
        self.last_exit
    }

    /// Whether `exit` has been run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code, [`ShellError::NotFound`] when no factory
    /// recognizes the name, or whatever error the command itself fails with.
    pub fn run(&mut self, name: &str, args: &[&str], stdout: &mut dyn Write) -> Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                return cmd.execute(stdout, &mut self.env);
            }
        }
        Err(ShellError::NotFound(name.to_owned()).into())
    }

    /// Tokenize and run one input line.
    ///
    /// Blank lines are skipped. Recoverable errors are reported (one line each) and
    /// recorded as exit code 1; fatal ones are returned to the caller.
    pub fn eval(&mut self, line: &str, stdout: &mut dyn Write) -> Result<()> {
        let argv = lexer::split_into_tokens(line);
        log::debug!("argv = {argv:?}");
        let Some((name, args)) = argv.split_first() else {
            return Ok(());
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        match self.run(name, &args, stdout) {
            Ok(code) => self.last_exit = code,
            Err(err) if self.is_fatal(&err) => return Err(err),
            Err(err) => {
                match err.downcast_ref::<ShellError>() {
                    Some(ShellError::NotFound(_)) => writeln!(stdout, "{err}")?,
                    _ => eprintln!("{err:#}"),
                }
                self.last_exit = 1;
            }
        }
        Ok(())
    }

    /// The Read-Eval-Print Loop.
    ///
    /// Returns the session's exit status: 0 after `exit` or end of input, 1 after a
    /// fatal error (which has already been reported). `Err` is reserved for failures
    /// of the line reader or of `stdout` itself.
    pub fn repl(&mut self, reader: &mut dyn LineReader, stdout: &mut dyn Write) -> Result<ExitCode> {
        loop {
            let Some(line) = reader.read_line(&self.config.prompt, stdout)? else {
                writeln!(stdout, "{EXIT_MESSAGE}")?;
                return Ok(0);
            };
            if let Err(err) = self.eval(&line, stdout) {
                log::warn!("session ended by fatal error: {err:?}");
                stdout.flush()?;
                eprintln!("{err:#}");
                return Ok(1);
            }
            if self.env.should_exit {
                return Ok(0);
            }
        }
    }

    fn is_fatal(&self, err: &anyhow::Error) -> bool {
        match err.downcast_ref::<ShellError>() {
            Some(ShellError::Copy { .. }) => !self.config.lenient_copy,
            Some(err) => err.is_fatal(),
            None => false,
        }
    }
}
