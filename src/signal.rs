//! Process-wide shutdown flag driven by SIGINT and SIGTERM.

use libc::{SIG_IGN, SIGINT, SIGPIPE, SIGTERM, c_int, sigaction, sigemptyset, sighandler_t};
use std::io;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signal: c_int) {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Installs the handlers and returns the flag they raise.
///
/// No `SA_RESTART`: a blocked `poll`/`select` returns `EINTR` and the loop
/// re-checks the flag. `SIGPIPE` is ignored; writes to a vanished peer fail
/// with `EPIPE` instead.
pub fn install() -> io::Result<&'static AtomicBool> {
    let handler = request_shutdown as extern "C" fn(c_int) as sighandler_t;

    unsafe {
        let mut action: sigaction = mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_flags = 0;
        sigemptyset(&mut action.sa_mask);

        for signal in [SIGINT, SIGTERM] {
            if libc::sigaction(signal, &action, ptr::null_mut()) < 0 {
                return Err(io::Error::last_os_error());
            }
        }

        if libc::signal(SIGPIPE, SIG_IGN) == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }

    Ok(&SHUTDOWN)
}
