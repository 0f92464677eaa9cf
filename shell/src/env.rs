use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Command;

/// Where variable lookups are answered from.
#[derive(Debug, Clone)]
enum Vars {
    /// Live view of the host process environment, read on every lookup.
    Process,
    /// A fixed table, kept in insertion order.
    Fixed(Vec<(OsString, OsString)>),
}

/// Read-only view of the environment handed to commands by the interpreter.
///
/// The environment contains:
/// - the variable table (e.g. `PATH`), either the live process environment or an
///   injected fixed table;
/// - `current_dir`: the directory relative command names are resolved against and
///   the working directory of spawned children;
/// - `should_exit`: a flag the REPL loop checks after every command.
///
/// Names and values are kept as raw OS strings. The interpreter never modifies the
/// variable table.
#[derive(Debug, Clone)]
pub struct Environment {
    vars: Vars,
    /// The current working directory for command resolution and execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// An environment backed by the current process.
    ///
    /// Variables are not snapshotted: every lookup observes the process
    /// environment as it is at that moment. `current_dir` is captured from
    /// `std::env::current_dir()`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars: Vars::Process,
            current_dir,
            should_exit: false,
        }
    }

    /// An environment with a fixed variable table, enumerated in the given order.
    pub fn with_vars<I, K, V>(vars: I, current_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: Vars::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            current_dir: current_dir.into(),
            should_exit: false,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Distinguishes an absent variable (`None`) from one set to the empty string.
    pub fn get_var(&self, key: &str) -> Option<OsString> {
        match &self.vars {
            Vars::Process => stdenv::var_os(key),
            Vars::Fixed(vars) => vars
                .iter()
                .find(|(k, _)| k.as_os_str() == OsStr::new(key))
                .map(|(_, v)| v.clone()),
        }
    }

    /// All variables in the environment's native enumeration order.
    pub fn vars(&self) -> Vec<(OsString, OsString)> {
        match &self.vars {
            Vars::Process => stdenv::vars_os().collect(),
            Vars::Fixed(vars) => vars.clone(),
        }
    }

    /// Give a child process this environment.
    ///
    /// The live process environment is inherited untouched; a fixed table replaces
    /// whatever the child would have inherited.
    pub(crate) fn configure(&self, command: &mut Command) {
        if let Vars::Fixed(vars) = &self.vars {
            command.env_clear().envs(vars.iter().map(|(k, v)| (k, v)));
        }
        command.current_dir(&self.current_dir);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::env as stdenv;
    use std::ffi::{OsStr, OsString};
    use std::os::unix::ffi::OsStringExt;
    use std::process::Command;

    #[test]
    fn test_fixed_vars_lookup() {
        let env = Environment::with_vars([("KEY", "VALUE"), ("EMPTY", "")], "/");

        assert_eq!(env.get_var("KEY"), Some(OsString::from("VALUE")));
        assert_eq!(env.get_var("EMPTY"), Some(OsString::new()));
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);
    }

    #[test]
    fn test_fixed_vars_keep_order() {
        let env = Environment::with_vars([("B", "2"), ("A", "1"), ("C", "3")], "/");
        let keys: Vec<OsString> = env.vars().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_fixed_vars_keep_raw_bytes() {
        let raw = OsString::from_vec(b"a\xffb".to_vec());
        let env = Environment::with_vars([(OsString::from("RAW"), raw.clone())], "/");

        assert_eq!(env.get_var("RAW"), Some(raw.clone()));
        assert_eq!(env.vars(), vec![(OsString::from("RAW"), raw)]);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert_eq!(env.get_var("PATH"), stdenv::var_os("PATH"));
        assert_eq!(env.vars().len(), stdenv::vars_os().count());
        assert!(!env.should_exit);
    }

    #[test]
    fn test_process_env_is_inherited_not_rebuilt() {
        let env = Environment::new();
        let mut cmd = Command::new("/bin/true");
        env.configure(&mut cmd);

        assert_eq!(cmd.get_envs().count(), 0);
        assert_eq!(cmd.get_current_dir(), Some(env.current_dir.as_path()));
    }

    #[test]
    fn test_fixed_env_replaces_child_env() {
        let env = Environment::with_vars([("ONLY", "this")], "/");
        let mut cmd = Command::new("/bin/true");
        env.configure(&mut cmd);

        let envs: Vec<_> = cmd.get_envs().collect();
        assert_eq!(envs, vec![(OsStr::new("ONLY"), Some(OsStr::new("this")))]);
    }
}
