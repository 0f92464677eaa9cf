use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::FromArgs;
use std::fs::File;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. A builtin shadows any external
/// program of the same name.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "env" or "cp".
    fn name() -> &'static str;

    /// Build the command from its arguments.
    ///
    /// `None` means the arguments don't fit, and the name is handed on to
    /// path resolution like any other command.
    fn parse(args: &[&str]) -> Option<Self> {
        Self::from_args(&[Self::name()], args).ok()
    }

    /// Executes the command using the provided output stream and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        T::execute(*self, stdout, env)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        let cmd = T::parse(args);
        if cmd.is_none() {
            log::debug!("{name}: arguments {args:?} don't fit the builtin, falling through");
        }
        cmd.map(|cmd| Box::new(cmd) as Box<dyn ExecutableCommand>)
    }
}

#[derive(FromArgs)]
/// Exit the shell. Arguments are ignored.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn parse(_args: &[&str]) -> Option<Self> {
        Some(Exit {})
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print every environment variable as KEY=VALUE, one per line. Arguments are ignored.
pub struct Env {}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    fn parse(_args: &[&str]) -> Option<Self> {
        Some(Env {})
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        for (key, value) in env.vars() {
            stdout.write_all(key.as_bytes())?;
            stdout.write_all(b"=")?;
            stdout.write_all(value.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Copy the bytes of SRC into DST, creating or truncating DST.
pub struct Cp {
    #[argh(positional)]
    /// file to read from.
    pub src: PathBuf,

    #[argh(positional)]
    /// file to write to.
    pub dst: PathBuf,
}

impl BuiltinCommand for Cp {
    fn name() -> &'static str {
        "cp"
    }

    /// Exactly two words, taken literally: `-n` or `--` are file names here.
    fn parse(args: &[&str]) -> Option<Self> {
        match args {
            [src, dst] => Some(Cp {
                src: PathBuf::from(src),
                dst: PathBuf::from(dst),
            }),
            _ => None,
        }
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let mut reader =
            File::open(env.current_dir.join(&self.src)).map_err(|source| ShellError::Copy {
                path: self.src.clone(),
                source,
            })?;
        let mut writer =
            File::create(env.current_dir.join(&self.dst)).map_err(|source| ShellError::Copy {
                path: self.dst.clone(),
                source,
            })?;

        let copied = io::copy(&mut reader, &mut writer).with_context(|| {
            format!("cp: {} -> {}", self.src.display(), self.dst.display())
        })?;
        log::debug!("cp: copied {copied} bytes");
        Ok(0)
    }
}
