//! Helpers shared by the unit tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that create executables or spawn children.
///
/// A file that is still open for writing in one thread while another thread forks
/// can fail to exec with `ETXTBSY`.
pub(crate) fn lock_spawn() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Writes `content` to `dir/name` with the given permission bits.
pub(crate) fn write_file(dir: &Path, name: &str, content: &str, mode: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write file");
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod");
    path
}

/// Creates an executable shell script that appends `start ARGS` and `end` to `log`.
///
/// The short sleep between the two lines makes interleaved runs visible.
pub(crate) fn write_recorder(dir: &Path, name: &str, log: &Path) -> PathBuf {
    let script = format!(
        "#!/bin/sh\necho \"start $*\" >> '{log}'\nsleep 0.05\necho end >> '{log}'\n",
        log = log.display()
    );
    write_file(dir, name, &script, 0o755)
}

/// Lines appended by a recorder script, or none if it never ran.
pub(crate) fn recorded(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(str::to_owned)
        .collect()
}
