//! Termination Signals
//!
//! The carrier keeps transmitting after the process exits unless the pin
//! and generator are reset, so termination signals are blocked up front and
//! collected with `sigwait`. Cleanup then runs as ordinary code on the main
//! thread instead of inside a signal handler.

use core::fmt;
use std::io;

use nix::errno::Errno;
use nix::sys::signal::{self as posix, SigSet};

/// Signals that end the transmission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// SIGINT (ctrl-c)
    Interrupt,
    /// SIGQUIT (ctrl-\)
    Quit,
    /// SIGTERM
    Terminate,
    /// SIGHUP (terminal closed)
    Hangup,
}

impl Signal {
    /// Every signal that stops the carrier
    pub const ALL: [Self; 4] = [Self::Interrupt, Self::Quit, Self::Terminate, Self::Hangup];

    const fn posix(self) -> posix::Signal {
        match self {
            Self::Interrupt => posix::Signal::SIGINT,
            Self::Quit => posix::Signal::SIGQUIT,
            Self::Terminate => posix::Signal::SIGTERM,
            Self::Hangup => posix::Signal::SIGHUP,
        }
    }

    /// Raw signal number
    #[must_use]
    pub const fn number(self) -> i32 {
        self.posix() as i32
    }

    /// Map a raw signal number
    #[must_use]
    pub fn from_number(number: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|signal| signal.number() == number)
    }

    /// Process exit status after stopping on this signal (the signal number)
    #[must_use]
    pub fn exit_code(self) -> u8 {
        u8::try_from(self.number()).unwrap_or(1)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.posix().as_str())
    }
}

/// Termination signals blocked for the calling thread
pub struct TerminationSignals {
    set: SigSet,
}

impl TerminationSignals {
    /// Block [`Signal::ALL`] so they queue until [`TerminationSignals::wait`]
    ///
    /// Call before spawning threads; new threads inherit the mask.
    pub fn block() -> io::Result<Self> {
        let mut set = SigSet::empty();
        for signal in Signal::ALL {
            set.add(signal.posix());
        }
        set.thread_block()?;
        Ok(Self { set })
    }

    /// Sleep until one of the blocked signals arrives
    pub fn wait(&self) -> io::Result<Signal> {
        loop {
            match self.set.wait() {
                Ok(received) => {
                    if let Some(signal) = Signal::from_number(received as i32) {
                        return Ok(signal);
                    }
                    log::debug!("ignoring signal {}", received);
                }
                Err(Errno::EINTR) => {}
                Err(errno) => return Err(errno.into()),
            }
        }
    }
}

impl fmt::Debug for TerminationSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminationSignals").finish_non_exhaustive()
    }
}
