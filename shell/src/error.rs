//! Errors raised while resolving and running commands.

use std::io;
use std::path::PathBuf;

/// Failures of the command pipeline, split by how the interpreter reacts to them.
///
/// Every variant renders as exactly one line of diagnostic text.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// No builtin matched and the name did not resolve to an executable.
    #[error("Command not found: {0}")]
    NotFound(String),

    /// The operating system refused to create a new process.
    #[error("tsh: fork error: {0}")]
    Spawn(#[source] io::Error),

    /// A process was created but the resolved program could not be launched or reaped.
    #[error("Error: {}: {source}", path.display())]
    Exec {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `cp` could not open one of its files.
    #[error("Error: {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    /// Whether the error ends the whole session rather than the current line.
    ///
    /// `Copy` is fatal unless the interpreter is configured with lenient copies.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Spawn(_) | ShellError::Copy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let e = ShellError::NotFound("frobnicate".into());
        assert_eq!(format!("{e}"), "Command not found: frobnicate");
        assert!(!e.is_fatal());
    }

    #[test]
    fn exec_error_is_recoverable() {
        let e = ShellError::Exec {
            path: PathBuf::from("/bin/broken"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(format!("{e}").starts_with("Error: /bin/broken: "));
        assert!(!e.is_fatal());
    }

    #[test]
    fn spawn_and_copy_errors_are_fatal() {
        let spawn = ShellError::Spawn(io::Error::from(io::ErrorKind::OutOfMemory));
        let copy = ShellError::Copy {
            path: PathBuf::from("missing.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(spawn.is_fatal());
        assert!(copy.is_fatal());
        assert!(format!("{spawn}").starts_with("tsh: fork error: "));
    }
}
