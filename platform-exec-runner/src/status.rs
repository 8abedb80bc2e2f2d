use std::fmt;
use std::process::ExitStatus;

/// The status returned by the platform's command-execution primitive,
/// unmodified.
///
/// On unix this is the `wait(2)`-encoded status, so a shell that ran
/// `exit 7` yields `0x0700`, not `7`. On Windows it is the process exit code.
/// `-1` is the sentinel for "no shell could be started".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawStatus(i32);

impl RawStatus {
    pub const SPAWN_FAILED: RawStatus = RawStatus(-1);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Encodes a normal exit with `code`, as the shell's own exit would be
    /// reported.
    #[cfg(unix)]
    pub const fn from_exit_code(code: u8) -> Self {
        Self((code as i32) << 8)
    }

    #[cfg(windows)]
    pub const fn from_exit_code(code: u8) -> Self {
        Self(code as i32)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    #[cfg(unix)]
    pub fn termination(self) -> Termination {
        let raw = self.0;
        if raw == Self::SPAWN_FAILED.0 {
            Termination::SpawnFailed
        } else if libc::WIFEXITED(raw) {
            Termination::Exited(libc::WEXITSTATUS(raw))
        } else if libc::WIFSIGNALED(raw) {
            Termination::Signaled(libc::WTERMSIG(raw))
        } else if libc::WIFSTOPPED(raw) {
            Termination::Stopped(libc::WSTOPSIG(raw))
        } else {
            Termination::Unknown(raw)
        }
    }

    #[cfg(windows)]
    pub fn termination(self) -> Termination {
        if self.0 == Self::SPAWN_FAILED.0 {
            Termination::SpawnFailed
        } else {
            Termination::Exited(self.0)
        }
    }

    pub fn success(self) -> bool {
        self.termination() == Termination::Exited(0)
    }

    pub fn exit_code(self) -> Option<i32> {
        match self.termination() {
            Termination::Exited(code) => Some(code),
            _ => None,
        }
    }
}

impl From<ExitStatus> for RawStatus {
    #[cfg(unix)]
    fn from(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self(status.into_raw())
    }

    #[cfg(windows)]
    fn from(status: ExitStatus) -> Self {
        Self(status.code().unwrap_or(Self::SPAWN_FAILED.0))
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.termination())
    }
}

/// How the shell process ended, decoded from a [`RawStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
    SpawnFailed,
    Unknown(i32),
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exited with {code}"),
            Termination::Signaled(sig) => write!(f, "killed by signal {sig}"),
            Termination::Stopped(sig) => write!(f, "stopped by signal {sig}"),
            Termination::SpawnFailed => f.write_str("shell could not be started"),
            Termination::Unknown(raw) => write!(f, "unrecognised status {raw:#x}"),
        }
    }
}
