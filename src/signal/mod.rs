//! Asynchronous-signal-to-event bridge.
//!
//! This module converts OS signal delivery into ordinary readable data
//! on a descriptor, so the reactor can treat signals as readiness
//! events instead of running logic in signal-handler context.
//!
//! The handler installed here does exactly one thing: it writes the
//! signal number as a single byte to the write end of a socket pair,
//! saving and restoring `errno` around the write. Everything else
//! (deciding what the signal means, sweeping timers, stopping the
//! server) happens on the reactor thread after it reads the byte.
//!
//! Signals consumed:
//! - `SIGALRM` — housekeeping cadence; the reactor re-arms the alarm
//!   after every sweep because one `alarm(2)` fires one signal,
//! - `SIGTERM` — graceful-stop request.

use crate::reactor::poller::platform::{sys_close, sys_read, sys_socketpair, sys_write};

use libc::{SA_RESTART, SIG_DFL, SIGALRM, SIGTERM, c_int, sigaction, sigfillset};
use std::io;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use std::{mem, ptr};

/// Write end of the installed bridge's socket pair.
///
/// The handler runs in signal context and cannot reach instance state,
/// so this is the one process-global the bridge needs. `-1` means no
/// bridge is installed.
static NOTIFY_FD: AtomicI32 = AtomicI32::new(-1);

/// The signal handler: forward the signal number as one byte.
///
/// Only async-signal-safe operations are allowed here. No allocation,
/// no locking, no formatting; a single non-blocking `write` with
/// `errno` saved and restored.
extern "C" fn forward_signal(sig: c_int) {
    let fd = NOTIFY_FD.load(Ordering::Relaxed);
    if fd < 0 {
        return;
    }

    let saved_errno = unsafe { *libc::__errno_location() };

    let byte = [sig as u8];
    sys_write(fd, &byte);

    unsafe {
        *libc::__errno_location() = saved_errno;
    }
}

/// Installs `forward_signal` for one signal.
///
/// `SA_RESTART` keeps unrelated slow syscalls from failing with `EINTR`
/// behind our back; the poll itself still wakes because the pipe
/// becomes readable. The handler mask blocks all other signals for the
/// duration of the handler.
fn install_handler(sig: c_int) -> io::Result<()> {
    let mut sa: sigaction = unsafe { mem::zeroed() };

    let handler: extern "C" fn(c_int) = forward_signal;
    sa.sa_sigaction = handler as usize;
    sa.sa_flags = SA_RESTART;

    unsafe {
        sigfillset(&mut sa.sa_mask);
    }

    let rc = unsafe { sigaction(sig, &sa, ptr::null_mut()) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Restores the default disposition for one signal.
fn restore_default(sig: c_int) {
    let mut sa: sigaction = unsafe { mem::zeroed() };
    sa.sa_sigaction = SIG_DFL;

    unsafe {
        sigaction(sig, &sa, ptr::null_mut());
    }
}

/// Signals observed by a [`SignalBridge::drain`] call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Drained {
    /// `SIGALRM` was delivered: a timer sweep is due. Deferred, not
    /// executed immediately; I/O dispatch has priority over
    /// housekeeping.
    pub sweep: bool,

    /// `SIGTERM` was delivered: stop the server after the current
    /// event batch.
    pub stop: bool,
}

/// Handle for requesting stop or sweep without an OS signal.
///
/// Writes the same bytes to the same pipe the handler writes to, so a
/// programmatic request takes exactly the path a real signal takes.
/// Embedders and tests use this to stop a running server from another
/// thread.
#[derive(Clone)]
pub struct Notifier {
    write_fd: RawFd,
}

impl Notifier {
    /// Requests a graceful stop, as if `SIGTERM` had been delivered.
    pub fn request_stop(&self) {
        sys_write(self.write_fd, &[SIGTERM as u8]);
    }

    /// Requests a timer sweep, as if `SIGALRM` had fired.
    pub fn request_sweep(&self) {
        sys_write(self.write_fd, &[SIGALRM as u8]);
    }
}

/// The installed signal bridge.
///
/// Owns the socket pair and the signal dispositions. At most one bridge
/// exists per process at a time; dropping it restores the default
/// dispositions, disarms the alarm, and closes both descriptors.
pub struct SignalBridge {
    /// Read end, registered with the poller.
    read_fd: RawFd,

    /// Write end, reachable from the handler via [`NOTIFY_FD`].
    write_fd: RawFd,
}

impl SignalBridge {
    /// Creates the socket pair and installs the handlers.
    ///
    /// # Errors
    ///
    /// Fails if a bridge is already installed in this process, or if
    /// the socket pair or either `sigaction` call fails.
    pub fn install() -> io::Result<SignalBridge> {
        let (read_fd, write_fd) = sys_socketpair()?;

        if NOTIFY_FD
            .compare_exchange(-1, write_fd, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            sys_close(read_fd);
            sys_close(write_fd);
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "a signal bridge is already installed",
            ));
        }

        let bridge = SignalBridge { read_fd, write_fd };

        install_handler(SIGALRM)?;
        install_handler(SIGTERM)?;

        Ok(bridge)
    }

    /// Returns the readable descriptor to register with the poller.
    pub(crate) fn fd(&self) -> RawFd {
        self.read_fd
    }

    /// Returns a handle for programmatic stop/sweep requests.
    pub fn notifier(&self) -> Notifier {
        Notifier {
            write_fd: self.write_fd,
        }
    }

    /// Drains all pending signal bytes and reports what they mean.
    ///
    /// Called by the reactor when the bridge descriptor reads ready.
    /// Unknown bytes are ignored; the engine installs handlers for
    /// exactly two signals.
    pub(crate) fn drain(&self) -> Drained {
        let mut drained = Drained::default();
        let mut buf = [0u8; 1024];

        loop {
            let n = sys_read(self.read_fd, &mut buf);
            if n <= 0 {
                break;
            }

            for &byte in &buf[..n as usize] {
                match byte as c_int {
                    SIGALRM => drained.sweep = true,
                    SIGTERM => drained.stop = true,
                    _ => {}
                }
            }
        }

        drained
    }
}

impl Drop for SignalBridge {
    /// Uninstalls the bridge.
    ///
    /// Restores `SIG_DFL` for both signals, disarms any pending alarm,
    /// detaches the handler's global, and closes both descriptors, in
    /// that order: the dispositions must go before the write end
    /// closes, or a late signal would write to a dead descriptor.
    fn drop(&mut self) {
        restore_default(SIGALRM);
        restore_default(SIGTERM);

        disarm_alarm();

        NOTIFY_FD.store(-1, Ordering::Release);

        sys_close(self.read_fd);
        sys_close(self.write_fd);
    }
}

/// Arms the process alarm to fire `SIGALRM` after `interval`.
///
/// `alarm(2)` has whole-second resolution; the server builder enforces
/// an interval of at least one second.
pub(crate) fn arm_alarm(interval: Duration) {
    unsafe {
        libc::alarm(interval.as_secs() as u32);
    }
}

/// Cancels any pending alarm.
pub(crate) fn disarm_alarm() {
    unsafe {
        libc::alarm(0);
    }
}
