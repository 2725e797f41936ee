use crate::error::Error;
use crate::touchpad::Touchpad;
use std::io;
use std::sync::Arc;
use std::thread;
use tracing::info;

/// SIGINT and SIGTERM, blocked for the whole process and collected with
/// `sigwait` on a dedicated thread.
pub struct TerminationSignals {
    set: libc::sigset_t,
}

impl TerminationSignals {
    /// Must run before any other thread is spawned so every thread inherits
    /// the mask.
    pub fn block() -> Result<Self, Error> {
        let mut set: libc::sigset_t = unsafe { std::mem::zeroed() };
        unsafe {
            libc::sigemptyset(&mut set);
            libc::sigaddset(&mut set, libc::SIGINT);
            libc::sigaddset(&mut set, libc::SIGTERM);
        }
        let ret = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut()) };
        if ret != 0 {
            return Err(Error::Signal(io::Error::from_raw_os_error(ret)));
        }
        Ok(Self { set })
    }

    pub fn wait(&self) -> Result<libc::c_int, Error> {
        let mut signum: libc::c_int = 0;
        loop {
            let ret = unsafe { libc::sigwait(&self.set, &mut signum) };
            match ret {
                0 => return Ok(signum),
                libc::EINTR => continue,
                _ => return Err(Error::Signal(io::Error::from_raw_os_error(ret))),
            }
        }
    }

    /// Closes `touchpad` when a termination signal arrives. The thread is
    /// never joined.
    pub fn spawn_watcher(self, touchpad: Arc<Touchpad>) {
        thread::spawn(move || {
            match self.wait() {
                Ok(signum) => info!(signum, "termination signal received, shutting down"),
                Err(e) => tracing::error!("{}", e),
            }
            touchpad.close();
        });
    }
}
