//! Termination primitives for supervised children.
//!
//! On unix every child (servers and builds) leads its own process group, so signals
//! go to the whole group and reach grandchildren (`npm` → `node`, shell
//! wrappers). Elsewhere the only primitive is a forced kill.

use std::io;
use tokio::process::Child;

/// Ask the child to terminate (SIGTERM to its process group).
#[cfg(unix)]
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::Signal;
    signal_group(child, Signal::SIGTERM)
}

/// Without POSIX signals there is no graceful request; kill outright.
#[cfg(not(unix))]
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    force_kill(child)
}

/// Forcefully kill the child (SIGKILL to its process group).
#[cfg(unix)]
pub fn force_kill(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::Signal;
    signal_group(child, Signal::SIGKILL)?;
    ignore_exited(child.start_kill())
}

#[cfg(not(unix))]
pub fn force_kill(child: &mut Child) -> io::Result<()> {
    ignore_exited(child.start_kill())
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    // Already reaped: nothing left to signal.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pgid = i32::try_from(pid).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    match killpg(Pid::from_raw(pgid), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

fn ignore_exited(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}
