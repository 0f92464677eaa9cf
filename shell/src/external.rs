use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use anyhow::Result;
use nix::unistd::{AccessFlags, access};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Name of the variable holding the executable search path.
pub const PATH_VAR: &str = "PATH";

/// Command that is not a builtin.
///
/// Runs `program` `repeat` times in a row, each run in a fresh child process that
/// is waited for before the next one starts.
pub struct ExternalCommand {
    program: PathBuf,
    name: String,
    args: Vec<String>,
    repeat: usize,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, name: String, args: Vec<String>, repeat: usize) -> Self {
        Self {
            program,
            name,
            args,
            repeat,
        }
    }

    /// Spawn one child and block until it exits.
    fn run_once(&self, env: &Environment) -> Result<ExitCode, ShellError> {
        let program = env.current_dir.join(&self.program);
        let mut command = std::process::Command::new(&program);
        command.arg0(&self.name).args(&self.args);
        env.configure(&mut command);
        let mut child = command
            .spawn()
            .map_err(|source| classify_spawn_error(&self.program, source))?;
        log::debug!("spawned {} as pid {}", program.display(), child.id());

        let exit_status = child.wait().map_err(|source| ShellError::Exec {
            path: self.program.clone(),
            source,
        })?;
        log::debug!("pid {} exited with {}", child.id(), exit_status);
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

/// Creates [`ExternalCommand`]s for names that resolve on the search path.
pub(crate) struct ExternalFactory {
    repeat_count: bool,
}

impl ExternalFactory {
    /// When `repeat_count` is set, a positive integer first argument is consumed as
    /// the number of times to run the command instead of being passed to it.
    pub(crate) fn new(repeat_count: bool) -> Self {
        Self { repeat_count }
    }
}

impl CommandFactory for ExternalFactory {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let executable = resolve(env, name)?;
        let (repeat, args) = match args.split_first() {
            Some((first, rest)) if self.repeat_count => match parse_repeat_count(first) {
                Some(n) => (n, rest),
                None => (1, args),
            },
            _ => (1, args),
        };
        log::debug!("{name} resolved to {}, repeat {repeat}", executable.display());
        Some(Box::new(ExternalCommand::new(
            executable,
            name.to_owned(),
            args.iter().map(|x| x.to_string()).collect(),
            repeat,
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        // Children write to the inherited stream; anything buffered goes first.
        stdout.flush()?;
        let mut last_exit = 0;
        for _ in 0..self.repeat {
            last_exit = match self.run_once(env) {
                Ok(code) => code,
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    eprintln!("{err}");
                    1
                }
            };
        }
        Ok(last_exit)
    }
}

/// Parse a repeat count: a strictly positive decimal integer.
pub fn parse_repeat_count(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok().filter(|&n| n > 0)
}

/// Failure to create a process at all is fatal; anything else is a failed launch.
fn classify_spawn_error(program: &Path, source: io::Error) -> ShellError {
    match source.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => ShellError::Spawn(source),
        _ => ShellError::Exec {
            path: program.to_owned(),
            source,
        },
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

/// Resolve a command name to an executable location.
///
/// Behavior:
/// - `PATH` unset: never resolves, not even from the current directory.
/// - `PATH` set but empty: resolves only to `command` itself, when it names a regular
///   owner-executable file relative to the current directory.
/// - Otherwise each `PATH` entry is tried left to right as `dir/command`; the first
///   regular file the real user may execute (`access(2)` with `X_OK`) wins.
///   Directories and files without execute permission for us are skipped.
///   When no entry matches, `command` itself is tried as above.
/// - Empty `command`: returns `None`.
///
/// The search path is read from `env` on every call.
pub fn resolve(env: &Environment, command: &str) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }
    let search_paths = env.get_var(PATH_VAR)?;
    if search_paths.is_empty() {
        return find_in_current_dir(env, command);
    }
    find_in_path(env, &search_paths, command).or_else(|| find_in_current_dir(env, command))
}

fn find_in_path(env: &Environment, search_paths: &OsStr, cmd: &str) -> Option<PathBuf> {
    let dirs = search_paths
        .as_bytes()
        .split(|&b| b == b':')
        .filter(|dir| !dir.is_empty());
    for dir in dirs {
        let mut candidate = OsString::from(OsStr::from_bytes(dir));
        candidate.push("/");
        candidate.push(cmd);
        let candidate = PathBuf::from(candidate);
        log::trace!("trying {}", candidate.display());
        if is_accessible_executable(&env.current_dir.join(&candidate)) {
            return Some(candidate);
        }
    }
    None
}

fn find_in_current_dir(env: &Environment, cmd: &str) -> Option<PathBuf> {
    if is_owner_executable(&env.current_dir.join(cmd)) {
        Some(PathBuf::from(cmd))
    } else {
        None
    }
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}

/// A regular file (after following symlinks) the real user may execute.
fn is_accessible_executable(path: &Path) -> bool {
    is_regular_file(path) && access(path, AccessFlags::X_OK).is_ok()
}

/// A regular file (after following symlinks) with the owner execute bit.
fn is_owner_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o100 != 0)
        .unwrap_or(false)
}
